//! Sequence collections and the transformations applied to them between aligner runs.

pub mod fastx;
pub mod inspect;
pub mod rare;
pub mod check;

/// Keeps only alphabetic characters (residues) and converts them to upper case.
/// Gaps, stop codons, digits and whitespace are removed.
pub fn residues(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .filter(|c| c.is_ascii_alphabetic())
        .map(u8::to_ascii_uppercase)
        .collect()
}

/// Sequence with its name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedSeq {
    name: String,
    seq: Vec<u8>,
}

impl NamedSeq {
    /// Constructs new named sequence.
    pub fn new(name: String, seq: Vec<u8>) -> Self {
        Self { name, seq }
    }

    /// Returns reference to the name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns reference to the sequence.
    pub fn seq(&self) -> &[u8] {
        &self.seq
    }

    /// Returns mutable sequence reference.
    pub fn seq_mut(&mut self) -> &mut Vec<u8> {
        &mut self.seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn residue_content() {
        assert_eq!(residues(b"ac-GT..u*x"), b"ACGTUX".to_vec());
        assert_eq!(residues(b"---"), Vec::<u8>::new());
    }
}
