//! Single pass over the input sequences before anything is aligned.

use std::path::Path;
use super::fastx;

/// Selenocysteine.
pub const SELENOCYSTEINE: u8 = b'U';
/// Pyrrolysine.
pub const PYRROLYSINE: u8 = b'O';

/// Summary of an input sequence collection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Inspection {
    /// Number of records.
    pub count: usize,
    /// Is there at least one selenocysteine (`U`/`u`)?
    pub selenocysteine: bool,
    /// Is there at least one pyrrolysine (`O`/`o`)?
    pub pyrrolysine: bool,
}

impl Inspection {
    /// Are there residues, which need to be substituted before alignment?
    pub fn has_rare(&self) -> bool {
        self.selenocysteine || self.pyrrolysine
    }

    fn update(&mut self, seq: &[u8]) {
        self.count += 1;
        for c in seq.iter().map(u8::to_ascii_uppercase) {
            match c {
                SELENOCYSTEINE => self.selenocysteine = true,
                PYRROLYSINE => self.pyrrolysine = true,
                _ => {}
            }
        }
    }
}

/// Counts sequences in the FASTA file and detects rare amino acids.
pub fn inspect(path: &Path) -> crate::Result<Inspection> {
    let mut res = Inspection::default();
    fastx::for_each_record(path, |record| {
        res.update(record.seq());
        Ok(())
    })?;
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::plain(">a\nMKV\n>b\nMKL\n>c\nMKI\n", 3, false, false)]
    #[case::selenocys(">a\nMKUV\n>b\nMKL\n", 2, true, false)]
    #[case::pyrrolys_lower(">a\nMKoV\n", 1, false, true)]
    #[case::both(">a\nUUU\n>b\nO\n>c\nM\n>d\nK\n", 4, true, true)]
    #[case::empty("", 0, false, false)]
    fn inspection(#[case] content: &str, #[case] count: usize, #[case] sec: bool, #[case] pyl: bool) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.fa");
        std::fs::write(&path, content).unwrap();
        let res = inspect(&path).unwrap();
        assert_eq!(res, Inspection { count, selenocysteine: sec, pyrrolysine: pyl });
        assert_eq!(res.has_rare(), sec || pyl);
    }
}
