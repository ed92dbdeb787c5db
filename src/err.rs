use std::{
    io,
    fmt::Write,
    path::PathBuf,
};
use colored::Colorize;
use crate::ext;

/// Exit status when there are too few input sequences to build an alignment.
pub const EXIT_INSUFFICIENT: i32 = 80;
/// Exit status for invalid configuration, command-line arguments and other general errors.
pub const EXIT_GENERAL: i32 = 1;
/// Exit status for tools that have no dedicated support.
pub const EXIT_UNSUPPORTED: i32 = 95;

/// General enum, representing possible errors.
#[derive(Debug)]
pub enum Error {
    Io(io::Error, Vec<PathBuf>),
    /// Error, produced by an argument parser.
    Lexopt(lexopt::Error),
    /// Executable not found.
    NoExec(PathBuf),
    /// Configuration is incomplete or contradictory.
    InvalidInput(String),
    InvalidData(String),
    ParsingError(String),
    /// Not enough sequences to reconstruct an alignment: `(found, required)`.
    InsufficientSeqs(usize, usize),
    /// External tool could not be started or finished with non-zero status: `(tool, exit code, description)`.
    Subprocess(&'static str, i32, String),
    /// External tool finished successfully, but its output lost or corrupted sequences.
    Integrity(&'static str, i32, String),
    /// Tool name that has no command-line convention.
    Unsupported(String),
}

impl From<lexopt::Error> for Error {
    fn from(e: lexopt::Error) -> Self {
        Self::Lexopt(e)
    }
}

impl Error {
    /// Exit status of the process, if this error terminates it.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InsufficientSeqs(..) => EXIT_INSUFFICIENT,
            Self::Subprocess(_, code, _) | Self::Integrity(_, code, _) => *code,
            Self::Unsupported(_) => EXIT_UNSUPPORTED,
            _ => EXIT_GENERAL,
        }
    }

    /// Format error message.
    pub fn display(&self) -> String {
        let mut s = String::new();
        match self {
            Self::Io(e, files) => {
                write!(s, "{} in relation to ", "Input/Output error".red()).unwrap();
                if files.is_empty() {
                    write!(s, "unnamed streams").unwrap();
                } else {
                    write!(s, "{}", files.iter().map(|f| ext::fmt::path(f).cyan().to_string())
                        .collect::<Vec<_>>().join(", ")).unwrap();
                }
                write!(s, ": {}", e.kind()).unwrap();
                if let Some(e2) = e.get_ref() {
                    write!(s, ", {}", e2).unwrap();
                }
            }
            Self::Lexopt(e) => write!(s, "{} to parse command-line arguments: {}", "Failed".red(), e).unwrap(),
            Self::NoExec(path) => write!(s, "{} at {}", "Could not find executable".red(),
                ext::fmt::path(path).cyan()).unwrap(),
            Self::InvalidInput(e) => write!(s, "{}: {}", "Invalid configuration".red(), e).unwrap(),
            Self::InvalidData(e) => write!(s, "{}: {}", "Invalid data".red(), e).unwrap(),
            Self::ParsingError(e) => write!(s, "{}: {}", "Parsing error".red(), e).unwrap(),
            Self::InsufficientSeqs(found, required) => write!(s, "{}: at least {} sequences are required, found {}",
                "Not enough sequences".red(), required, found).unwrap(),
            Self::Subprocess(tool, _, e) => write!(s, "{} {}: {}", "Execution failed:".red(),
                tool.to_uppercase().cyan(), e).unwrap(),
            Self::Integrity(tool, _, e) => write!(s, "{} {} [file check]: {}", "Execution failed:".red(),
                tool.to_uppercase().cyan(), e).unwrap(),
            Self::Unsupported(tool) => write!(s, "{}: {}", "Program not supported".red(), tool.cyan()).unwrap(),
        };
        s
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e, Vec::new())
    }
}

macro_rules! validate_param {
    ($cond:expr, $($arg:expr),+) => {{
        if !($cond) {
            (
                Err($crate::Error::InvalidInput(format!($($arg),+)))
            ?)
        }
    }};
}
pub(crate) use validate_param;

macro_rules! add_path {
    (!) => {
        |e| $crate::Error::Io(e, Vec::new())
    };
    ($path:expr) => {
        |e| $crate::Error::Io(e, vec![std::convert::AsRef::<std::path::Path>::as_ref(&$path).to_owned()])
    };
    ($($path:expr),+) => {
        |e| {
            let mut v = Vec::new();
            $(
                v.push(std::convert::AsRef::<std::path::Path>::as_ref(&$path).to_owned());
            )*
            $crate::Error::Io(e, v)
        }
    };
}
pub(crate) use add_path;

macro_rules! error {
    ($var:ident, $($arg:expr),+ $(,)?) => {
        $crate::Error::$var(format!($($arg),+))
    }
}
pub(crate) use error;

/// Wrapper around the standard result.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(Error::InsufficientSeqs(2, 3).exit_code(), 80);
        assert_eq!(Error::Unsupported("probcons".to_string()).exit_code(), 95);
        assert_eq!(Error::Subprocess("mafft", 87, String::new()).exit_code(), 87);
        assert_eq!(Error::Integrity("muscle", 86, String::new()).exit_code(), 86);
        assert_eq!(error!(InvalidInput, "missing {}", "readal").exit_code(), 1);
    }

    #[test]
    fn validate_macro() {
        fn check(n: usize) -> Result<()> {
            validate_param!(n >= 1, "Minimum number of sequences ({}) must be positive", n);
            Ok(())
        }
        assert!(check(3).is_ok());
        assert!(matches!(check(0), Err(Error::InvalidInput(_))));
    }
}
