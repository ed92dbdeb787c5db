use std::{
    path::PathBuf,
    time::Instant,
};
use colored::Colorize;
use crate::{
    ext,
    err::{error, validate_param},
    stage::{
        self,
        config::{Config, ConfigFile, Verbosity, DEFAULT_MIN_SEQS},
    },
};

struct Args {
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    output: Option<PathBuf>,
    prefix: Option<String>,
    cds: Option<PathBuf>,

    min_seqs: Option<usize>,
    verbosity: Option<Verbosity>,
    replace: bool,
}

impl Default for Args {
    fn default() -> Self {
        Self {
            input: None,
            config: None,
            output: None,
            prefix: None,
            cds: None,

            min_seqs: None,
            verbosity: None,
            replace: false,
        }
    }
}

impl Args {
    fn validate(mut self) -> crate::Result<Self> {
        validate_param!(self.input.is_some(), "Input FASTA file is not provided (see -i/--input)");
        validate_param!(self.config.is_some(), "Configuration file is not provided (see -c/--config)");
        validate_param!(self.output.is_some(), "Output directory is not provided (see -o/--output)");
        if let Some(n) = self.min_seqs {
            validate_param!(n >= 1, "Minimal number of sequences ({}) must be positive", n);
        }
        let input = self.input.as_ref().unwrap();
        validate_param!(input.is_file(), "Input file {} does not exist", ext::fmt::path(input));
        if let Some(cds) = &self.cds {
            validate_param!(cds.is_file(), "CDS file {} does not exist", ext::fmt::path(cds));
        }
        if self.prefix.is_none() {
            let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
            validate_param!(!stem.is_empty(), "Cannot select output prefix based on the input file, see -p/--prefix");
            self.prefix = Some(stem);
        }
        Ok(self)
    }

    /// Loads the configuration file and applies command-line values on top of it.
    fn into_config(self) -> crate::Result<Config> {
        let mut file = ConfigFile::load(self.config.as_ref().unwrap())?;
        file.resolve_binaries()?;
        file.check_paths()?;
        let mut config = Config::from_file(&file,
            ext::sys::absolute(self.input.as_ref().unwrap())?,
            ext::sys::absolute(self.output.as_ref().unwrap())?,
            self.prefix.unwrap())?;
        if let Some(cds) = self.cds {
            config.cds = Some(ext::sys::absolute(&cds)?);
        }
        if let Some(n) = self.min_seqs {
            config.min_seqs = n;
        }
        if let Some(verbosity) = self.verbosity {
            config.verbosity = verbosity;
        }
        config.replace = self.replace;
        config.validate()?;
        Ok(config)
    }
}

fn print_help() {
    const KEY: usize = 16;
    const VAL: usize = 5;
    const EMPTY: &'static str = const_format::str_repeat!(" ", KEY + VAL + 5);

    println!("{}", "Reconstruct multiple sequence alignment using one or several external aligners.".yellow());

    print!("\n{}", "Usage:".bold());
    println!(" {} align -i seqs.fa -c config.txt -o out_dir [args]", super::PROGRAM);

    println!("\n{}", "Input/output arguments:".bold());
    println!("    {:KEY$} {:VAL$}  Input FASTA file with homologous sequences.",
        "-i, --input".green(), "FILE".yellow());
    println!("    {:KEY$} {:VAL$}  Configuration file: one option per line `name type value`.\n\
        {EMPTY}  Binaries with empty paths are searched in the {}.",
        "-c, --config".green(), "FILE".yellow(), "PATH".underline());
    println!("    {:KEY$} {:VAL$}  Output directory.",
        "-o, --output".green(), "DIR".yellow());
    println!("    {:KEY$} {:VAL$}  Prefix of all output files [input file name].",
        "-p, --prefix".green(), "STR".yellow());
    println!("    {:KEY$} {:VAL$}  Coding sequences for back-translation (requires\n\
        {EMPTY}  residue_datatype prot2codon or prot2nuc in the configuration).",
        "    --cds".green(), "FILE".yellow());

    println!("\n{}", "Stage arguments:".bold());
    println!("    {:KEY$} {:VAL$}  Minimal number of sequences to build an alignment [{}].",
        "    --min-seqs".green(), "INT".yellow(), super::fmt_def(DEFAULT_MIN_SEQS));
    println!("    {:KEY$} {:VAL$}  Output of the external tools: 0/none, 1/logfile\n\
        {EMPTY}  or 2/stderr [{}].",
        "-v, --verbose".green(), "STR".yellow(), super::fmt_def(Verbosity::LogFile));
    println!("    {:KEY$} {:VAL$}  Replace existing output files.",
        "-r, --replace".green(), super::flag());

    println!("\n{}", "Other arguments:".bold());
    println!("    {:KEY$} {:VAL$}  Output trace messages.", "    --debug".green(), super::flag());
    println!("    {:KEY$} {:VAL$}  Show this help message.", "-h, --help".green(), "");
    println!("    {:KEY$} {:VAL$}  Show version.", "-V, --version".green(), "");
}

fn parse_args(argv: &[String]) -> crate::Result<Args> {
    if argv.is_empty() {
        print_help();
        std::process::exit(1);
    }
    use lexopt::prelude::*;
    let mut args = Args::default();
    let mut parser = lexopt::Parser::from_args(argv);

    while let Some(arg) = parser.next()? {
        match arg {
            Short('i') | Long("input") => args.input = Some(parser.value()?.parse()?),
            Short('c') | Long("config") => args.config = Some(parser.value()?.parse()?),
            Short('o') | Long("output") => args.output = Some(parser.value()?.parse()?),
            Short('p') | Long("prefix") => args.prefix = Some(parser.value()?.parse()?),
            Long("cds") => args.cds = Some(parser.value()?.parse()?),

            Long("min-seqs") => args.min_seqs = Some(parser.value()?.parse()?),
            Short('v') | Long("verbose") => {
                let val: String = parser.value()?.parse()?;
                args.verbosity = Some(val.parse()?);
            }
            Short('r') | Long("replace") => args.replace = true,
            // Processed together with the logger initialization.
            Long("debug") => {}

            Short('V') | Long("version") => {
                super::print_version();
                std::process::exit(0);
            }
            Short('h') | Long("help") => {
                print_help();
                std::process::exit(0);
            }
            _ => Err(arg.unexpected())?,
        }
    }
    Ok(args)
}

pub(super) fn run(argv: &[String]) -> crate::Result<()> {
    let args = parse_args(argv)?.validate()?;
    super::greet();
    let timer = Instant::now();
    let config = args.into_config()?;
    log::debug!("Configuration:\n{}", config.describe());

    let out = stage::run_in_place(&config)?;
    if !out.final_artifact.exists() {
        return Err(error!(InvalidData, "Final alignment {} was not created", ext::fmt::path(&out.final_artifact)));
    }
    println!("{}", out.final_artifact.display());
    log::info!("Success! Total time: {}", ext::fmt::Duration(timer.elapsed()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_owned).collect()
    }

    #[test]
    fn parse() {
        let args = parse_args(&argv("-i seqs.fa -c conf.txt -o out --min-seqs 5 -v stderr -r --debug")).unwrap();
        assert_eq!(args.input, Some(PathBuf::from("seqs.fa")));
        assert_eq!(args.config, Some(PathBuf::from("conf.txt")));
        assert_eq!(args.min_seqs, Some(5));
        assert_eq!(args.verbosity, Some(Verbosity::Stderr));
        assert!(args.replace);
        assert!(parse_args(&argv("-i seqs.fa -v 7")).is_err());
        assert!(parse_args(&argv("-i seqs.fa --threads 2")).is_err());
    }

    #[test]
    fn cli_config() {
        let dir = tempfile::tempdir().unwrap();
        let seqs = dir.path().join("family.fa");
        std::fs::write(&seqs, ">a\nMK\n>b\nMK\n>c\nMK\n").unwrap();
        let conf = dir.path().join("conf.txt");
        let bin = std::env::current_exe().unwrap();
        std::fs::write(&conf, format!("mafft binary {0}\nreadal binary {0}\nalignment list mafft\n\
            verbose parameter 0\n", bin.display())).unwrap();

        let s = format!("-i {} -c {} -o {} --min-seqs 2 -v 2", seqs.display(), conf.display(),
            dir.path().join("out").display());
        let config = parse_args(&argv(&s)).unwrap().validate().unwrap().into_config().unwrap();
        assert_eq!(config.prefix, "family");
        assert_eq!(config.min_seqs, 2);
        assert_eq!(config.verbosity, Verbosity::Stderr);
        assert!(!config.replace);

        let missing = format!("-i {} -c {} -o out", dir.path().join("absent.fa").display(), conf.display());
        assert!(parse_args(&argv(&missing)).unwrap().validate().is_err());
    }
}
