//! Consistency check between the sequences before and after an alignment-producing step.

use std::{
    path::Path,
    time::Duration,
    collections::{HashMap, hash_map::Entry},
};
use crate::{ext, Error};
use super::{fastx, residues};

/// Result of the comparison of two sequence collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    /// File is absent or empty.
    Missing,
    /// The same identifier appears twice in one file.
    Duplicate(String),
    /// Identifier is present in only one of the files.
    Unpaired(String),
    /// Residues of the sequence differ.
    Residues(String),
}

impl Mismatch {
    pub fn describe(&self, a: &Path, b: &Path) -> String {
        let (a, b) = (ext::fmt::path(a), ext::fmt::path(b));
        match self {
            Self::Missing => format!("Output file {} was not produced", b),
            Self::Duplicate(name) => format!("Repeated sequence '{}' in {} or {}", name, a, b),
            Self::Unpaired(name) =>
                format!("Non-overlapping sequence identifier '{}' between input {} and output {}", name, a, b),
            Self::Residues(name) =>
                format!("Different sequence composition for '{}' between input {} and output {}", name, a, b),
        }
    }
}

/// Compares residue content of two FASTA files.
#[derive(Clone, Debug)]
pub struct Validator {
    /// How many times to check that the output file exists.
    pub attempts: u32,
    /// Delay between attempts.
    pub delay: Duration,
}

impl Default for Validator {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_secs(1),
        }
    }
}

/// Loads residues of all sequences, returns Err if some name appears twice.
fn load_residues(path: &Path) -> crate::Result<Result<HashMap<String, Vec<u8>>, Mismatch>> {
    let mut map = HashMap::new();
    let mut duplicate = None;
    fastx::for_each_record(path, |record| {
        if duplicate.is_none() {
            match map.entry(record.id().to_owned()) {
                Entry::Occupied(entry) => duplicate = Some(Mismatch::Duplicate(entry.key().clone())),
                Entry::Vacant(entry) => { entry.insert(residues(record.seq())); }
            }
        }
        Ok(())
    })?;
    Ok(match duplicate {
        Some(mismatch) => Err(mismatch),
        None => Ok(map),
    })
}

impl Validator {
    /// Checks that both files contain the same sequence identifiers, and that all sequences
    /// contain the same residues after removing all non-letters and converting to upper case.
    ///
    /// Returns `Ok(None)` if the files are consistent, `Ok(Some(mismatch))` otherwise,
    /// and Err if any file cannot be parsed.
    pub fn compare(&self, a: &Path, b: &Path) -> Result<Option<Mismatch>, Error> {
        if !ext::sys::nonempty_file(a) || !ext::sys::wait_for_file(b, self.attempts, self.delay) {
            return Ok(Some(Mismatch::Missing));
        }
        let seqs_a = match load_residues(a)? {
            Ok(map) => map,
            Err(mismatch) => return Ok(Some(mismatch)),
        };
        let seqs_b = match load_residues(b)? {
            Ok(map) => map,
            Err(mismatch) => return Ok(Some(mismatch)),
        };
        if let Some(name) = seqs_a.keys().find(|name| !seqs_b.contains_key(*name))
                .or_else(|| seqs_b.keys().find(|name| !seqs_a.contains_key(*name))) {
            return Ok(Some(Mismatch::Unpaired(name.clone())));
        }
        for (name, res_a) in seqs_a.iter() {
            if seqs_b.get(name) != Some(res_a) {
                return Ok(Some(Mismatch::Residues(name.clone())));
            }
        }
        Ok(None)
    }

    /// Same as `compare`, but only returns true or false. Parsing errors are treated as inconsistencies.
    pub fn consistent(&self, a: &Path, b: &Path) -> bool {
        match self.compare(a, b) {
            Ok(None) => true,
            Ok(Some(mismatch)) => {
                log::error!("{}", mismatch.describe(a, b));
                false
            }
            Err(e) => {
                log::error!("{}", e.display());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;

    const INPUT: &str = ">s1\nMKVLA\n>s2\nMKLLA\n>s3\nMKIA\n";

    fn validator() -> Validator {
        Validator { attempts: 2, delay: Duration::ZERO }
    }

    #[rstest]
    #[case::identical(INPUT, None)]
    #[case::aligned_reordered(">s3\nMK-IA-\n>s1\nmkvla-\n>s2\nMKLLA-\n", None)]
    #[case::wrapped_with_dots(">s1\nMK.V\nLA\n>s2\nMKL*LA\n>s3\nM-K-I-A\n", None)]
    #[case::changed_residue(">s1\nMKVLA\n>s2\nMKLIA\n>s3\nMKIA\n", Some(Mismatch::Residues("s2".to_string())))]
    #[case::dropped(">s1\nMKVLA\n>s2\nMKLLA\n", Some(Mismatch::Unpaired("s3".to_string())))]
    #[case::renamed(">s1\nMKVLA\n>s2\nMKLLA\n>s4\nMKIA\n", Some(Mismatch::Unpaired("s3".to_string())))]
    #[case::duplicate(">s1\nMKVLA\n>s2\nMKLLA\n>s3\nMKIA\n>s1\nMKVLA\n", Some(Mismatch::Duplicate("s1".to_string())))]
    #[case::empty("", Some(Mismatch::Missing))]
    fn compare_files(#[case] output: &str, #[case] expected: Option<Mismatch>) {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("in.fa");
        let b = dir.path().join("out.fa");
        fs::write(&a, INPUT).unwrap();
        fs::write(&b, output).unwrap();
        assert_eq!(validator().compare(&a, &b).unwrap(), expected);
        assert_eq!(validator().consistent(&a, &b), expected.is_none());
    }

    #[test]
    fn absent_output() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("in.fa");
        fs::write(&a, INPUT).unwrap();
        assert_eq!(validator().compare(&a, &dir.path().join("absent.fa")).unwrap(), Some(Mismatch::Missing));
        assert_eq!(validator().compare(&dir.path().join("absent.fa"), &a).unwrap(), Some(Mismatch::Missing));
    }

    #[test]
    fn symmetric() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.fa");
        let b = dir.path().join("b.fa");
        fs::write(&a, INPUT).unwrap();
        fs::write(&b, ">s1\nMKVLA\n>s2\nMKLLA\n>s3\nMKIA\n>s4\nMK\n").unwrap();
        assert_eq!(validator().compare(&a, &b).unwrap(), Some(Mismatch::Unpaired("s4".to_string())));
        assert_eq!(validator().compare(&b, &a).unwrap(), Some(Mismatch::Unpaired("s4".to_string())));
    }
}
