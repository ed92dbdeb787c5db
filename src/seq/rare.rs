//! Substitution of rare amino acids (selenocysteine, pyrrolysine) by placeholder residues,
//! which all aligners understand, and restoration of the original residues after alignment.

use std::{
    fmt,
    io::Write,
    path::Path,
    str::FromStr,
    collections::HashMap,
};
use crate::{
    Error,
    ext,
    err::{add_path, error},
};
use super::{fastx, NamedSeq};

/// Mapping `rare code -> placeholder`. Both are stored in upper case, letter case of the sequences is preserved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubstTable {
    pairs: Vec<(u8, u8)>,
}

impl Default for SubstTable {
    /// Selenocysteine is aligned as cysteine, pyrrolysine as lysine.
    fn default() -> Self {
        Self { pairs: vec![(b'U', b'C'), (b'O', b'K')] }
    }
}

impl FromStr for SubstTable {
    type Err = Error;

    /// Parses whitespace-separated `code:placeholder` pairs, for example `U:C O:K`.
    fn from_str(s: &str) -> Result<Self, Error> {
        let mut pairs: Vec<(u8, u8)> = Vec::new();
        for entry in s.split_whitespace() {
            let (code, placeholder) = entry.split_once(':')
                .and_then(|(a, b)| Some((single_letter(a)?, single_letter(b)?)))
                .ok_or_else(|| error!(InvalidInput,
                    "Cannot parse residue substitution `{}`: expected two letters separated by colon", entry))?;
            if code == placeholder {
                return Err(error!(InvalidInput, "Residue substitution `{}` replaces a residue with itself", entry));
            }
            if pairs.iter().any(|&(c, _)| c == code) {
                return Err(error!(InvalidInput, "Residue '{}' is substituted more than once", char::from(code)));
            }
            pairs.push((code, placeholder));
        }
        if pairs.is_empty() {
            return Err(error!(InvalidInput, "Residue substitution table is empty"));
        }
        if let Some(&(_, p)) = pairs.iter().find(|(_, p)| pairs.iter().any(|(c, _)| c == p)) {
            return Err(error!(InvalidInput,
                "Placeholder '{}' is itself substituted, substitution would not be reversible", char::from(p)));
        }
        Ok(Self { pairs })
    }
}

fn single_letter(s: &str) -> Option<u8> {
    match s.as_bytes() {
        &[c] if c.is_ascii_alphabetic() => Some(c.to_ascii_uppercase()),
        _ => None,
    }
}

impl fmt::Display for SubstTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, &(code, placeholder)) in self.pairs.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}:{}", char::from(code), char::from(placeholder))?;
        }
        Ok(())
    }
}

/// Keeps letter case of `like`.
#[inline]
fn same_case(c: u8, like: u8) -> u8 {
    if like.is_ascii_lowercase() { c.to_ascii_lowercase() } else { c }
}

impl SubstTable {
    /// Placeholder for the residue, if it needs to be substituted.
    pub fn placeholder(&self, residue: u8) -> Option<u8> {
        let upper = residue.to_ascii_uppercase();
        self.pairs.iter().find(|(c, _)| *c == upper).map(|&(_, p)| same_case(p, residue))
    }

    /// Replaces all rare residues in place, returns the number of replaced residues for each code.
    pub fn substitute(&self, seq: &mut [u8], counts: &mut Counts) {
        for c in seq.iter_mut() {
            if let Some(p) = self.placeholder(*c) {
                counts.add(c.to_ascii_uppercase(), p.to_ascii_uppercase());
                *c = p;
            }
        }
    }

    /// Puts rare residues back into an aligned sequence.
    /// This is not an inversion of the table: with `U:C` a blind `C -> U` replacement would turn
    /// native cysteines into selenocysteines. Instead, `original` (the sequence before substitution,
    /// possibly with gaps) serves as a template, and only its residues are used.
    /// A placeholder is replaced only where the original sequence contained the corresponding rare code,
    /// therefore placeholders that were present in the input sequences stay untouched.
    pub fn restore(&self, aligned: &mut [u8], original: &[u8], counts: &mut Counts) -> Result<(), String> {
        let mut orig_residues = original.iter().copied().filter(u8::is_ascii_alphabetic);
        for c in aligned.iter_mut().filter(|c| c.is_ascii_alphabetic()) {
            let orig = orig_residues.next().ok_or("aligned sequence has more residues than the original")?
                .to_ascii_uppercase();
            if let Some(p) = self.placeholder(orig) {
                if c.to_ascii_uppercase() == p {
                    counts.add(p, orig);
                    *c = same_case(orig, *c);
                }
            }
        }
        if orig_residues.next().is_some() {
            Err("aligned sequence has fewer residues than the original".to_string())
        } else {
            Ok(())
        }
    }
}

/// Number of replacements for each `(from, to)` residue pair.
#[derive(Default, Debug, Clone)]
pub struct Counts(Vec<((u8, u8), u64)>);

impl Counts {
    fn add(&mut self, from: u8, to: u8) {
        match self.0.iter_mut().find(|(key, _)| *key == (from, to)) {
            Some((_, count)) => *count += 1,
            None => self.0.push(((from, to), 1)),
        }
    }

    /// Number of replacements `from -> to`.
    pub fn get(&self, from: u8, to: u8) -> u64 {
        self.0.iter().find(|(key, _)| *key == (from, to)).map(|(_, count)| *count).unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.iter().map(|(_, count)| count).sum()
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, ((from, to), count)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "|\t")?;
            }
            write!(f, "'{}' > '{}'\tfreq: {}", char::from(*from), char::from(*to), count)?;
        }
        Ok(())
    }
}

/// Substitutes rare residues in all sequences of `in_path`, and writes them to `out_path`.
pub fn substitute_file(in_path: &Path, out_path: &Path, table: &SubstTable) -> crate::Result<Counts> {
    let mut counts = Counts::default();
    let mut out = ext::sys::create(out_path)?;
    fastx::for_each_record(in_path, |record| {
        let mut seq = record.seq().to_vec();
        table.substitute(&mut seq, &mut counts);
        fastx::write_fasta(&mut out, record.id(), &seq).map_err(add_path!(out_path))
    })?;
    out.flush().map_err(add_path!(out_path))?;
    Ok(counts)
}

/// Restores rare residues in the alignment `aligned_path`, and writes the result to `out_path`.
/// `original_path` contains the same sequences before substitution.
pub fn restore_file(
    aligned_path: &Path,
    original_path: &Path,
    out_path: &Path,
    table: &SubstTable,
) -> crate::Result<Counts>
{
    let originals: HashMap<String, Vec<u8>> = fastx::read_all(original_path)?.into_iter()
        .map(|entry| {
            let name = entry.name().to_owned();
            (name, entry.seq().to_vec())
        })
        .collect();
    let mut aligned: Vec<NamedSeq> = fastx::read_all(aligned_path)?;
    let mut counts = Counts::default();
    for entry in aligned.iter_mut() {
        let original = originals.get(entry.name()).ok_or_else(|| error!(InvalidData,
            "Sequence {} from {} is absent from {}", entry.name(),
            ext::fmt::path(aligned_path), ext::fmt::path(original_path)))?;
        let name = entry.name().to_owned();
        table.restore(entry.seq_mut(), original, &mut counts)
            .map_err(|e| error!(InvalidData, "Cannot restore rare residues in sequence {}: {}", name, e))?;
    }

    let mut out = ext::sys::create(out_path)?;
    for entry in aligned.iter() {
        fastx::write_fasta(&mut out, entry.name(), entry.seq()).map_err(add_path!(out_path))?;
    }
    out.flush().map_err(add_path!(out_path))?;
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("U:C O:K", vec![(b'U', b'C'), (b'O', b'K')])]
    #[case("  u:x\to:z ", vec![(b'U', b'X'), (b'O', b'Z')])]
    #[case("U:X O:X", vec![(b'U', b'X'), (b'O', b'X')])]
    fn parse_table(#[case] s: &str, #[case] pairs: Vec<(u8, u8)>) {
        assert_eq!(s.parse::<SubstTable>().unwrap(), SubstTable { pairs });
    }

    #[rstest]
    #[case::empty("")]
    #[case::no_colon("UC")]
    #[case::long("U:CC")]
    #[case::identity("U:U")]
    #[case::twice("U:C U:K")]
    #[case::chained("U:O O:K")]
    #[case::digit("U:1")]
    fn bad_table(#[case] s: &str) {
        assert!(matches!(s.parse::<SubstTable>(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn display_and_lookup() {
        let table: SubstTable = "U:X O:X".parse().unwrap();
        assert_eq!(table.to_string(), "U:X O:X");
        assert_eq!(table.placeholder(b'o'), Some(b'x'));
        assert_eq!(SubstTable::default().placeholder(b'C'), None);
    }

    #[test]
    fn round_trip() {
        let table = SubstTable::default();
        let original = b"MCUKOuoCK".to_vec();
        let mut seq = original.clone();
        let mut counts = Counts::default();
        table.substitute(&mut seq, &mut counts);
        assert_eq!(seq, b"MCCKKckCK");
        assert_eq!(counts.get(b'U', b'C'), 2);
        assert_eq!(counts.get(b'O', b'K'), 2);

        // Alignment inserted gaps and changed nothing else.
        let mut aligned = b"-MC--CKK-ckCK-".to_vec();
        let mut back = Counts::default();
        table.restore(&mut aligned, &original, &mut back).unwrap();
        assert_eq!(aligned, b"-MC--UKO-uoCK-");
        assert_eq!(back.total(), 4);
        assert_eq!(crate::seq::residues(&aligned), crate::seq::residues(&original));
    }

    #[test]
    fn shared_placeholder_round_trip() {
        let table: SubstTable = "U:X O:X".parse().unwrap();
        let original = b"XUAOX".to_vec();
        let mut seq = original.clone();
        table.substitute(&mut seq, &mut Counts::default());
        assert_eq!(seq, b"XXAXX");
        let mut aligned = b"X-XA-XX".to_vec();
        table.restore(&mut aligned, &original, &mut Counts::default()).unwrap();
        assert_eq!(aligned, b"X-UA-OX");
    }

    #[test]
    fn restore_length_mismatch() {
        let table = SubstTable::default();
        assert!(table.restore(&mut b"MC-K".to_vec(), b"MU", &mut Counts::default()).is_err());
        assert!(table.restore(&mut b"M-".to_vec(), b"MU", &mut Counts::default()).is_err());
    }

    #[test]
    fn files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.fa");
        let subst = dir.path().join("in.no_rare_aa");
        let aligned = dir.path().join("aln.no_rare_aa");
        let restored = dir.path().join("aln");
        std::fs::write(&input, ">s1 desc\nMKUVL\n>s2\nMKVOL\n>s3\nMKVL\n").unwrap();

        let table = SubstTable::default();
        let counts = substitute_file(&input, &subst, &table).unwrap();
        assert_eq!(counts.to_string(), "'U' > 'C'\tfreq: 1|\t'O' > 'K'\tfreq: 1");
        assert_eq!(std::fs::read_to_string(&subst).unwrap(), ">s1\nMKCVL\n>s2\nMKVKL\n>s3\nMKVL\n");

        std::fs::write(&aligned, ">s2\nMKVKL\n>s1\nMKCVL\n>s3\nMK-VL\n").unwrap();
        let counts = restore_file(&aligned, &input, &restored, &table).unwrap();
        assert_eq!(counts.total(), 2);
        assert_eq!(std::fs::read_to_string(&restored).unwrap(), ">s2\nMKVOL\n>s1\nMKUVL\n>s3\nMK-VL\n");
    }
}
