//! External programs, their names in the configuration, and exit statuses.

use std::{
    fmt,
    str::FromStr,
};
use crate::Error;

/// Exit status when the sequence/alignment utility (readAl) fails.
pub const EXIT_READAL: i32 = 81;
/// Exit status when the trimming tool (trimAl) fails.
pub const EXIT_TRIMAL: i32 = 82;

/// Name of the sequence/alignment utility in the configuration.
pub const READAL: &str = "readal";

/// Supported multiple sequence aligners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Aligner {
    Prank,
    Mafft,
    Kalign,
    Muscle,
    ClustalW,
    TCoffee,
    MCoffee,
    DialignTx,
    ClustalOmega,
}

impl Aligner {
    pub const ALL: [Aligner; 9] = [Self::Prank, Self::Mafft, Self::Kalign, Self::Muscle, Self::ClustalW,
        Self::TCoffee, Self::MCoffee, Self::DialignTx, Self::ClustalOmega];

    /// Name, as it appears in the configuration.
    pub fn to_str(self) -> &'static str {
        match self {
            Self::Prank => "prank",
            Self::Mafft => "mafft",
            Self::Kalign => "kalign",
            Self::Muscle => "muscle",
            Self::ClustalW => "clustalw",
            Self::TCoffee => "t_coffee",
            Self::MCoffee => "m_coffee",
            Self::DialignTx => "dialign_tx",
            Self::ClustalOmega => "clustal_omega",
        }
    }

    /// Extension of the alignment files, produced by this aligner.
    pub fn extension(self) -> String {
        match self {
            Self::Prank => "prk".to_string(),
            Self::Mafft => "mft".to_string(),
            Self::Kalign => "kal".to_string(),
            Self::Muscle => "msl".to_string(),
            Self::ClustalW => "clw".to_string(),
            Self::TCoffee => "tce".to_string(),
            Self::DialignTx => "dtx".to_string(),
            Self::ClustalOmega => "clo".to_string(),
            // First two and the last letter of the name.
            Self::MCoffee => {
                let name = self.to_str();
                format!("{}{}", &name[..2], &name[name.len() - 1..])
            }
        }
    }

    /// Exit status when the aligner fails or produces inconsistent output.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Prank => 92,
            Self::Mafft => 87,
            Self::Kalign => 89,
            Self::Muscle => 86,
            Self::TCoffee | Self::MCoffee => 90,
            Self::DialignTx => 88,
            Self::ClustalW => 91,
            Self::ClustalOmega => 92,
        }
    }

    /// T-Coffee and its flavours need lock/temporary directories and leave guide trees behind.
    pub fn is_coffee(self) -> bool {
        matches!(self, Self::TCoffee | Self::MCoffee)
    }
}

impl FromStr for Aligner {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        Self::ALL.iter().copied().find(|aligner| aligner.to_str() == s)
            .ok_or_else(|| Error::Unsupported(s.to_owned()))
    }
}

impl fmt::Display for Aligner {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Any external tool, invoked during the stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    Aligner(Aligner),
    /// Sequence/alignment utility: reversal and format conversion.
    Readal,
    /// Trimming and back-translation.
    Trimmer,
}

impl Tool {
    pub fn label(self) -> &'static str {
        match self {
            Self::Aligner(aligner) => aligner.to_str(),
            Self::Readal => READAL,
            Self::Trimmer => "trimal",
        }
    }

    pub fn exit_code(self) -> i32 {
        match self {
            Self::Aligner(aligner) => aligner.exit_code(),
            Self::Readal => EXIT_READAL,
            Self::Trimmer => EXIT_TRIMAL,
        }
    }

    /// Error: the tool could not be started or failed.
    pub fn failed(self, desc: impl Into<String>) -> Error {
        Error::Subprocess(self.label(), self.exit_code(), desc.into())
    }

    /// Error: the tool finished, but its output is inconsistent with the input.
    pub fn inconsistent(self, desc: impl Into<String>) -> Error {
        Error::Integrity(self.label(), self.exit_code(), desc.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("prank", "prk", 92)]
    #[case("mafft", "mft", 87)]
    #[case("kalign", "kal", 89)]
    #[case("muscle", "msl", 86)]
    #[case("clustalw", "clw", 91)]
    #[case("t_coffee", "tce", 90)]
    #[case("m_coffee", "m_e", 90)]
    #[case("dialign_tx", "dtx", 88)]
    #[case("clustal_omega", "clo", 92)]
    fn aligners(#[case] name: &str, #[case] ext: &str, #[case] code: i32) {
        let aligner: Aligner = name.parse().unwrap();
        assert_eq!(aligner.to_string(), name);
        assert_eq!(aligner.extension(), ext);
        assert_eq!(aligner.exit_code(), code);
        assert_eq!(Tool::Aligner(aligner).failed("x").exit_code(), code);
    }

    #[test]
    fn unsupported() {
        let err = "probcons".parse::<Aligner>().unwrap_err();
        assert!(matches!(&err, Error::Unsupported(name) if name == "probcons"));
        assert_eq!(err.exit_code(), 95);
        assert!("MAFFT".parse::<Aligner>().is_err());
    }

    #[test]
    fn helper_tools() {
        assert_eq!(Tool::Readal.failed("").exit_code(), 81);
        assert_eq!(Tool::Trimmer.inconsistent("").exit_code(), 82);
    }
}
