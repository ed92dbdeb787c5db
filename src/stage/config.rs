//! Configuration of the alignment stage.
//!
//! Configuration file contains one option per line: `name type value...`.
//! Empty lines and lines starting with `#` are ignored.
//! Options of type `binary` with an empty value are searched in the `PATH`.

use std::{
    fmt,
    io::BufRead,
    str::FromStr,
    path::{Path, PathBuf},
    collections::HashMap,
};
use crate::{
    Error,
    ext,
    err::{validate_param, error},
    seq::rare::SubstTable,
};
use super::tools::{Aligner, READAL};

/// Default minimal number of sequences, required to build an alignment.
pub const DEFAULT_MIN_SEQS: usize = 3;

/// Where to write the output of the external tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verbosity {
    /// Discard tool output.
    Quiet,
    /// Write to `<prefix>.log` in the output directory.
    LogFile,
    /// Write to the standard error.
    Stderr,
}

impl FromStr for Verbosity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match &s.to_lowercase() as &str {
            "0" | "none" => Ok(Self::Quiet),
            "1" | "logfile" => Ok(Self::LogFile),
            "2" | "stderr" => Ok(Self::Stderr),
            _ => Err(error!(InvalidInput, "Unknown verbosity `{}` (available: 0/none, 1/logfile, 2/stderr)", s)),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::Quiet => "none",
            Self::LogFile => "logfile",
            Self::Stderr => "stderr",
        })
    }
}

/// Type of residues in the final alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Datatype {
    /// Keep residues of the input sequences.
    Plain,
    /// Back-translate protein alignment into codons.
    Prot2Codon,
    /// Back-translate protein alignment into nucleotides.
    Prot2Nuc,
}

impl Datatype {
    /// Protein alignment is back-translated using coding sequences.
    pub fn back_translates(self) -> bool {
        self != Self::Plain
    }
}

impl FromStr for Datatype {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "" => Ok(Self::Plain),
            "prot2codon" => Ok(Self::Prot2Codon),
            "prot2nuc" => Ok(Self::Prot2Nuc),
            _ => Err(error!(InvalidInput, "Unknown residue datatype `{}` (available: prot2codon, prot2nuc)", s)),
        }
    }
}

/// Aligner together with its executable and arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlignerSpec {
    pub aligner: Aligner,
    pub binary: PathBuf,
    pub params: String,
}

/// Trimming tool together with its executable and arguments.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrimmerSpec {
    pub name: String,
    pub binary: PathBuf,
    /// Arguments for all runs.
    pub params: String,
    /// Additional arguments when several alignments are compared.
    pub compare: String,
    /// Arguments for back-translation.
    pub cds: String,
}

/// One option of the configuration file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub kind: String,
    pub value: String,
}

/// Raw configuration file: option name -> (type, value).
#[derive(Clone, Debug, Default)]
pub struct ConfigFile {
    entries: HashMap<String, Entry>,
}

impl ConfigFile {
    /// Parses configuration from a stream. Later lines override earlier ones.
    pub fn parse(stream: impl BufRead) -> crate::Result<Self> {
        let mut entries = HashMap::new();
        for (i, line) in stream.lines().enumerate() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut fields = line.split_whitespace();
            let name = fields.next().unwrap_or_default();
            let kind = fields.next().ok_or_else(|| error!(ParsingError,
                "Configuration line {} (`{}`) has no option type", i + 1, line))?;
            let value = fields.collect::<Vec<_>>().join(" ");
            entries.insert(name.to_owned(), Entry { kind: kind.to_lowercase(), value });
        }
        Ok(Self { entries })
    }

    /// Loads configuration file, possibly gzipped.
    pub fn load(path: &Path) -> crate::Result<Self> {
        Self::parse(ext::sys::open(path)?).map_err(|e| match e {
            Error::Io(e, _) => Error::Io(e, vec![path.to_owned()]),
            Error::ParsingError(s) => error!(ParsingError, "{}: {}", ext::fmt::path(path), s),
            e => e,
        })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|entry| &entry.value as &str)
    }

    /// Searches binaries with empty paths in the `PATH`.
    pub fn resolve_binaries(&mut self) -> crate::Result<()> {
        for (name, entry) in self.entries.iter_mut() {
            if entry.kind == "binary" && entry.value.is_empty() {
                let path = ext::sys::find_exe(name)?;
                log::debug!("Found {} at {}", name, ext::fmt::path(&path));
                entry.value = path.to_string_lossy().into_owned();
            }
        }
        Ok(())
    }

    /// Checks that all binaries and files, named in the configuration, exist.
    pub fn check_paths(&self) -> crate::Result<()> {
        for (name, entry) in self.entries.iter() {
            if entry.kind == "binary" || entry.kind == "files" {
                validate_param!(Path::new(&entry.value).exists(), "Cannot find {} `{}` at {}",
                    entry.kind, name, entry.value);
            }
        }
        Ok(())
    }

    /// Binary, required for the program `name`.
    fn binary(&self, name: &str) -> crate::Result<PathBuf> {
        match self.get(name) {
            Some(path) if !path.is_empty() => Ok(PathBuf::from(path)),
            Some(_) => Err(error!(InvalidInput, "Program `{}` has no path, and was not searched in the PATH", name)),
            None => Err(error!(InvalidInput,
                "Selected program `{}` is not available according to the configuration file", name)),
        }
    }

    /// Argument string for the program, empty if not set.
    fn args(&self, name: &str, suffix: &str) -> String {
        self.get(&format!("{}_{}", name, suffix)).unwrap_or_default().to_owned()
    }

    fn aligner_spec(&self, name: &str) -> crate::Result<AlignerSpec> {
        let aligner: Aligner = name.parse()?;
        Ok(AlignerSpec {
            aligner,
            binary: self.binary(name)?,
            params: self.args(name, "params"),
        })
    }

    /// First name of the list-valued option.
    fn first(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|value| value.split_whitespace().next())
    }
}

/// Configuration of the whole stage, checked once before any tool is executed.
#[derive(Clone, Debug)]
pub struct Config {
    pub in_file: PathBuf,
    pub out_dir: PathBuf,
    pub prefix: String,
    /// Aligners in the order of execution.
    pub aligners: Vec<AlignerSpec>,
    /// Sequence/alignment utility (reversal and format conversion).
    pub readal: PathBuf,
    /// Tool that builds consensus between several alignments.
    pub consensus: Option<AlignerSpec>,
    pub trimmer: Option<TrimmerSpec>,
    /// Coding sequences, used for back-translation.
    pub cds: Option<PathBuf>,
    pub datatype: Datatype,
    /// Align sequences in the forward, as well as in the reverse order.
    pub both_directions: bool,
    pub min_seqs: usize,
    pub subst: SubstTable,
    /// Replace existing output files.
    pub replace: bool,
    pub verbosity: Verbosity,
}

impl Config {
    /// Builds configuration from the configuration file.
    pub fn from_file(file: &ConfigFile, in_file: PathBuf, out_dir: PathBuf, prefix: String) -> crate::Result<Self> {
        let names = file.get("alignment").ok_or_else(|| error!(InvalidInput,
            "Check your configuration file: there is no definition for the alignment step"))?;
        let mut aligners = Vec::new();
        for name in names.split_whitespace() {
            let spec = file.aligner_spec(name)?;
            if !aligners.iter().any(|other: &AlignerSpec| other.aligner == spec.aligner) {
                aligners.push(spec);
            }
        }

        let readal = file.binary(READAL).map_err(|_| error!(InvalidInput,
            "Check your configuration file: `{}` is not available", READAL))?;
        let consensus = file.first("consensus").map(|name| file.aligner_spec(name)).transpose()?;
        let trimmer = match file.first("trimming") {
            Some(name) => Some(TrimmerSpec {
                name: name.to_owned(),
                binary: file.binary(name)?,
                params: file.args(name, "params"),
                compare: file.args(name, "compare"),
                cds: file.args(name, "cds"),
            }),
            None => None,
        };

        let both_directions = match file.get("both_direction") {
            None => true,
            Some(s) => parse_bool(s)?,
        };
        let min_seqs = match file.get("min_seqs") {
            None => DEFAULT_MIN_SEQS,
            Some(s) => s.parse().map_err(|_| error!(InvalidInput, "Cannot parse min_seqs `{}`", s))?,
        };
        let subst = match file.get("in_letter") {
            None => SubstTable::default(),
            Some(s) => s.parse()?,
        };
        let verbosity = match file.get("verbose") {
            None => Verbosity::LogFile,
            Some(s) => s.parse()?,
        };
        Ok(Self {
            in_file, out_dir, prefix, aligners, readal, consensus, trimmer,
            cds: file.get("cds").filter(|s| !s.is_empty()).map(PathBuf::from),
            datatype: file.get("residue_datatype").unwrap_or_default().parse()?,
            both_directions, min_seqs, subst,
            replace: false,
            verbosity,
        })
    }

    /// Checks that the configuration is complete and consistent.
    pub fn validate(&self) -> crate::Result<()> {
        validate_param!(!self.aligners.is_empty(), "At least one aligner must be selected");
        validate_param!(self.min_seqs >= 1, "Minimal number of sequences ({}) must be positive", self.min_seqs);
        validate_param!(!self.prefix.is_empty(), "Output prefix must not be empty");
        validate_param!(self.cds.is_none() || self.datatype.back_translates(),
            "To use an additional CDS file, residue_datatype must be either prot2codon or prot2nuc");
        validate_param!(self.cds.is_some() || !self.datatype.back_translates(),
            "When residue_datatype is prot2codon or prot2nuc, an input CDS file is needed");
        validate_param!(self.trimmer.is_some() || !self.datatype.back_translates(),
            "Back-translation requires a trimming program (see `trimming` option)");
        Ok(())
    }

    /// Same configuration, with the input file replaced by the final output of the stage.
    pub fn with_input(&self, in_file: PathBuf) -> Self {
        Self { in_file, ..self.clone() }
    }

    /// Writes all options to the log.
    pub fn describe(&self) -> String {
        let mut s = String::new();
        let mut line = |key: &str, val: String| s.push_str(&format!("{:<16}\t{}\n", key, val));
        line("in_file", ext::fmt::path(&self.in_file));
        line("out_directory", ext::fmt::path(&self.out_dir));
        line("prefix", self.prefix.clone());
        line("alignment", self.aligners.iter().map(|spec| spec.aligner.to_str()).collect::<Vec<_>>().join(" "));
        line("readal", ext::fmt::path(&self.readal));
        if let Some(spec) = &self.consensus {
            line("consensus", spec.aligner.to_string());
        }
        if let Some(spec) = &self.trimmer {
            line("trimming", spec.name.clone());
        }
        if let Some(cds) = &self.cds {
            line("cds", ext::fmt::path(cds));
        }
        line("both_direction", self.both_directions.to_string());
        line("min_seqs", self.min_seqs.to_string());
        line("in_letter", self.subst.to_string());
        line("replace", self.replace.to_string());
        line("verbose", self.verbosity.to_string());
        s
    }
}

fn parse_bool(s: &str) -> crate::Result<bool> {
    match &s.to_lowercase() as &str {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(error!(InvalidInput, "Cannot parse boolean value `{}`", s)),
    }
}
