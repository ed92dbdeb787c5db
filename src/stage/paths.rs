//! Names of all files, produced during the alignment stage.
//! Later runs and downstream stages locate previous output only by these names.

use std::path::{Path, PathBuf};
use crate::ext::sys::append_path;
use super::direction::Direction;

/// Placeholder-substituted files contain this tag.
const NO_RARE: &str = "no_rare_aa";

/// All artifact paths are `<output directory>/<prefix>.<stage tag>...`.
#[derive(Clone, Debug)]
pub struct Artifacts {
    base: PathBuf,
}

impl Artifacts {
    pub fn new(out_dir: &Path, prefix: &str) -> Self {
        Self { base: out_dir.join(prefix) }
    }

    fn with(&self, suffix: &str) -> PathBuf {
        append_path(&self.base, suffix)
    }

    /// Tool output log: `<prefix>.log`.
    pub fn log(&self) -> PathBuf {
        self.with(".log")
    }

    /// Input sequences with reversed residue order: `<prefix>.seqs.reverse`.
    pub fn reversed_seqs(&self) -> PathBuf {
        self.with(".seqs.reverse")
    }

    /// Input sequences (in the given direction) without rare residues: `<prefix>.seqs.no_rare_aa[.reverse]`.
    pub fn substituted_seqs(&self, direction: Direction) -> PathBuf {
        match direction {
            Direction::Forward => self.with(&format!(".seqs.{}", NO_RARE)),
            Direction::Reverse => self.with(&format!(".seqs.{}.reverse", NO_RARE)),
        }
    }

    /// Raw aligner output: `<prefix>.alg.[no_rare_aa.]<direction>.<ext>`.
    pub fn alignment(&self, direction: Direction, ext: &str, substituted: bool) -> PathBuf {
        if substituted {
            self.with(&format!(".alg.{}.{}.{}", NO_RARE, direction, ext))
        } else {
            self.with(&format!(".alg.{}.{}", direction, ext))
        }
    }

    /// Reverse alignment, with residues put back into the original order: `<prefix>.alg.reverse.forw.<ext>`.
    pub fn reverse_forw(&self, ext: &str) -> PathBuf {
        self.with(&format!(".alg.reverse.forw.{}", ext))
    }

    /// Consensus of several alignments: `<prefix>.alg.metalig`.
    pub fn metalig(&self) -> PathBuf {
        self.with(".alg.metalig")
    }

    /// List of all produced alignments: `<prefix>.alg.paths`.
    pub fn path_list(&self) -> PathBuf {
        self.with(".alg.paths")
    }

    /// Trimmed alignment: `<prefix>.alg.clean`.
    pub fn clean(&self) -> PathBuf {
        self.with(".alg.clean")
    }
}

/// Back-translated version of an alignment: `<path>_cds`.
pub fn cds(path: &Path) -> PathBuf {
    append_path(path, "_cds")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names() {
        let a = Artifacts::new(Path::new("/out"), "fam");
        assert_eq!(a.log(), PathBuf::from("/out/fam.log"));
        assert_eq!(a.reversed_seqs(), PathBuf::from("/out/fam.seqs.reverse"));
        assert_eq!(a.substituted_seqs(Direction::Forward), PathBuf::from("/out/fam.seqs.no_rare_aa"));
        assert_eq!(a.substituted_seqs(Direction::Reverse), PathBuf::from("/out/fam.seqs.no_rare_aa.reverse"));
        assert_eq!(a.alignment(Direction::Forward, "mft", false), PathBuf::from("/out/fam.alg.forward.mft"));
        assert_eq!(a.alignment(Direction::Reverse, "msl", true),
            PathBuf::from("/out/fam.alg.no_rare_aa.reverse.msl"));
        assert_eq!(a.reverse_forw("kal"), PathBuf::from("/out/fam.alg.reverse.forw.kal"));
        assert_eq!(a.metalig(), PathBuf::from("/out/fam.alg.metalig"));
        assert_eq!(a.path_list(), PathBuf::from("/out/fam.alg.paths"));
        assert_eq!(cds(&a.clean()), PathBuf::from("/out/fam.alg.clean_cds"));
    }
}
