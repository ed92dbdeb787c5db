//! Propagation of the "regenerate everything downstream" flag.

/// What a single step did with its output artifact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Output already existed and was kept.
    Reused,
    /// Output was (re)written.
    Generated,
}

/// Staleness of the downstream artifacts.
///
/// Starts with the user-requested replace flag. As soon as any step writes a new artifact,
/// all following artifacts become stale and must be regenerated.
/// Once set, the flag is never cleared within one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Staleness {
    replace: bool,
}

impl Staleness {
    pub fn new(replace: bool) -> Self {
        Self { replace }
    }

    /// Should existing artifacts be replaced?
    pub fn replace(self) -> bool {
        self.replace
    }

    /// Returns true if the artifact needs to be (re)generated:
    /// either it does not exist (or is empty), or upstream files were regenerated.
    pub fn must_generate(self, artifact: &std::path::Path) -> bool {
        self.replace || !crate::ext::sys::nonempty_file(artifact)
    }

    /// Folds step outcome into the flag.
    #[must_use]
    pub fn after(self, outcome: Outcome) -> Self {
        Self { replace: self.replace || outcome == Outcome::Generated }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotonic() {
        let s = Staleness::new(false);
        assert!(!s.after(Outcome::Reused).replace());
        let s = s.after(Outcome::Generated);
        assert!(s.replace());
        assert!(s.after(Outcome::Reused).replace());
        assert!(Staleness::new(true).after(Outcome::Reused).replace());
    }

    #[test]
    fn regeneration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fam.alg.forward.msl");
        assert!(Staleness::new(false).must_generate(&path));
        std::fs::write(&path, ">a\nM\n").unwrap();
        assert!(!Staleness::new(false).must_generate(&path));
        assert!(Staleness::new(true).must_generate(&path));
    }
}
