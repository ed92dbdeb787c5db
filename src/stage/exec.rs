//! Execution of external tools: explicit argument vectors, no shell.

use std::{
    io::{self, Write},
    fs::{File, OpenOptions},
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, Stdio},
    time::Instant,
};
use crate::{
    ext,
    err::add_path,
};
use super::{
    config::Verbosity,
    tools::Tool,
};

/// External command: program, arguments, environment and an optional file that receives standard output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolCmd {
    program: PathBuf,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
    stdout: Option<PathBuf>,
}

impl ToolCmd {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            stdout: None,
        }
    }

    pub fn arg(&mut self, arg: impl AsRef<OsStr>) -> &mut Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    pub fn args<I, S>(&mut self, args: I) -> &mut Self
    where I: IntoIterator<Item = S>,
          S: AsRef<OsStr>,
    {
        for arg in args {
            self.arg(arg);
        }
        self
    }

    /// Appends `<flag><path>` as a single argument, for example `-d=in.fa`.
    pub fn arg_joined(&mut self, flag: &str, path: &Path) -> &mut Self {
        let mut s = OsString::from(flag);
        s.push(path.as_os_str());
        self.args.push(s);
        self
    }

    /// Splits user-provided argument string on whitespace.
    pub fn user_args(&mut self, s: &str) -> &mut Self {
        self.args(s.split_whitespace())
    }

    pub fn env(&mut self, key: impl AsRef<OsStr>, val: impl AsRef<OsStr>) -> &mut Self {
        self.envs.push((key.as_ref().to_owned(), val.as_ref().to_owned()));
        self
    }

    /// Redirect standard output into a file.
    pub fn stdout_to(&mut self, path: &Path) -> &mut Self {
        self.stdout = Some(path.to_owned());
        self
    }

    pub fn get_program(&self) -> &Path {
        &self.program
    }

    pub fn get_args(&self) -> &[OsString] {
        &self.args
    }

    pub fn get_envs(&self) -> &[(OsString, OsString)] {
        &self.envs
    }

    pub fn get_stdout(&self) -> Option<&Path> {
        self.stdout.as_deref()
    }

    /// Command line as it would be typed in a shell.
    pub fn to_cmd_string(&self) -> String {
        let mut s = ext::fmt::command(self.program.as_os_str(), self.args.iter().map(OsString::as_os_str));
        if let Some(path) = &self.stdout {
            s.push_str(" > ");
            s.push_str(&ext::fmt::path(path));
        }
        s
    }
}

/// Destination of the external tools output, as well as of the command headers.
#[derive(Debug)]
pub enum LogSink {
    Discard,
    File(File, PathBuf),
    Stderr,
}

impl LogSink {
    /// Opens log sink according to the verbosity.
    /// Log file is truncated if `overwrite` is true, and appended to otherwise.
    pub fn open(verbosity: Verbosity, path: &Path, overwrite: bool) -> crate::Result<Self> {
        Ok(match verbosity {
            Verbosity::Quiet => Self::Discard,
            Verbosity::LogFile => {
                let file = OpenOptions::new()
                    .create(true)
                    .write(true)
                    .truncate(overwrite)
                    .append(!overwrite)
                    .open(path).map_err(add_path!(path))?;
                Self::File(file, path.to_owned())
            }
            Verbosity::Stderr => Self::Stderr,
        })
    }

    /// Standard stream for a child process.
    fn stdio(&self) -> io::Result<Stdio> {
        Ok(match self {
            Self::Discard => Stdio::null(),
            Self::File(file, _) => Stdio::from(file.try_clone()?),
            Self::Stderr => Stdio::inherit(),
        })
    }

    /// Writes lines to the log.
    pub fn write(&self, text: &str) -> crate::Result<()> {
        match self {
            Self::Discard => Ok(()),
            Self::File(file, path) => {
                let mut f: &File = file;
                writeln!(f, "{}", text).and_then(|_| f.flush()).map_err(add_path!(path))
            }
            Self::Stderr => writeln!(io::stderr(), "{}", text).map_err(add_path!(!)),
        }
    }
}

/// Starts external processes. Implemented by the system launcher, and can be replaced in tests.
pub trait Launcher {
    /// Runs the command until it finishes; returns true if the exit status is zero.
    /// Standard output (unless redirected) and standard error go to the `sink`.
    fn launch(&mut self, cmd: &ToolCmd, work_dir: &Path, sink: &LogSink) -> io::Result<bool>;
}

/// Runs commands as child processes of the current one.
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&mut self, cmd: &ToolCmd, work_dir: &Path, sink: &LogSink) -> io::Result<bool> {
        let mut command = Command::new(&cmd.program);
        command.args(&cmd.args)
            .envs(cmd.envs.iter().map(|(k, v)| (k, v)))
            .current_dir(work_dir)
            .stdin(Stdio::null())
            .stderr(sink.stdio()?);
        match &cmd.stdout {
            Some(path) => command.stdout(File::create(path)?),
            None => command.stdout(sink.stdio()?),
        };
        Ok(command.status()?.success())
    }
}

/// Runs tools one after another, logging command lines and running times.
pub struct Executor<'a> {
    launcher: &'a mut dyn Launcher,
    sink: LogSink,
    work_dir: PathBuf,
}

impl<'a> Executor<'a> {
    pub fn new(launcher: &'a mut dyn Launcher, sink: LogSink, work_dir: PathBuf) -> Self {
        Self { launcher, sink, work_dir }
    }

    pub fn sink(&self) -> &LogSink {
        &self.sink
    }

    /// Directory where the tools are executed, and where they leave their temporary files.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Runs the command and requires it to finish with zero exit status.
    pub fn run(&mut self, tool: Tool, title: &str, cmd: &ToolCmd) -> crate::Result<()> {
        let cmd_str = cmd.to_cmd_string();
        self.sink.write(&format!("###\n###\t{}\t{}", title, ext::fmt::timestamp()))?;
        self.sink.write(&format!("###\tCommand-line\t{}\n###", cmd_str))?;
        log::debug!("    {}", cmd_str);

        let start = Instant::now();
        let success = self.launcher.launch(cmd, &self.work_dir, &self.sink)
            .map_err(|e| tool.failed(format!("cannot execute {}: {}", ext::fmt::path(&cmd.program), e)))?;
        let elapsed = ext::fmt::Duration(start.elapsed());
        if !success {
            return Err(tool.failed(format!("non-zero exit status after {}", elapsed)));
        }
        self.sink.write(&format!("###\tTime\t{}\n###", elapsed))?;
        log::debug!("    Finished in {}", elapsed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_string() {
        let mut cmd = ToolCmd::new("mafft");
        cmd.user_args("  --auto   --quiet ").arg("in.fa").stdout_to(Path::new("out.mft"));
        assert_eq!(cmd.get_args(), &["--auto", "--quiet", "in.fa"].map(OsString::from));
        assert_eq!(cmd.to_cmd_string(), "mafft --auto --quiet in.fa > out.mft");

        let mut cmd = ToolCmd::new("prank");
        cmd.arg_joined("-d=", Path::new("in.fa"));
        assert_eq!(cmd.get_args(), &[OsString::from("-d=in.fa")]);
    }

    #[test]
    fn log_file_modes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fam.log");
        LogSink::open(Verbosity::LogFile, &path, true).unwrap().write("first").unwrap();
        LogSink::open(Verbosity::LogFile, &path, false).unwrap().write("second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
        LogSink::open(Verbosity::LogFile, &path, true).unwrap().write("third").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "third\n");

        let quiet = dir.path().join("quiet.log");
        LogSink::open(Verbosity::Quiet, &quiet, true).unwrap().write("nothing").unwrap();
        assert!(!quiet.exists());
    }

    #[cfg(unix)]
    #[test]
    fn system_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let sink = LogSink::Discard;
        let mut cmd = ToolCmd::new("sh");
        cmd.args(["-c", "echo $GREETING; pwd"]).env("GREETING", "hello").stdout_to(&out);
        assert!(SystemLauncher.launch(&cmd, dir.path(), &sink).unwrap());
        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.starts_with("hello\n"));

        let mut fail = ToolCmd::new("sh");
        fail.args(["-c", "exit 3"]);
        assert!(!SystemLauncher.launch(&fail, dir.path(), &sink).unwrap());
        assert!(SystemLauncher.launch(&ToolCmd::new(dir.path().join("absent")), dir.path(), &sink).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn executor_statuses() {
        use crate::stage::tools::Aligner;
        let dir = tempfile::tempdir().unwrap();
        let mut launcher = SystemLauncher;
        let mut exec = Executor::new(&mut launcher, LogSink::Discard, dir.path().to_owned());
        let mut ok = ToolCmd::new("sh");
        ok.args(["-c", "true"]);
        assert!(exec.run(Tool::Readal, "readAl", &ok).is_ok());

        let mut fail = ToolCmd::new("sh");
        fail.args(["-c", "false"]);
        let err = exec.run(Tool::Aligner(Aligner::Kalign), "KALIGN", &fail).unwrap_err();
        assert_eq!(err.exit_code(), 89);
        let err = exec.run(Tool::Trimmer, "trimAl", &ToolCmd::new(dir.path().join("absent"))).unwrap_err();
        assert_eq!(err.exit_code(), 82);
    }
}
