//! Processing of sequences in the forward and the reverse residue order.

use std::{
    fmt,
    path::Path,
};
use super::{
    exec::{Executor, ToolCmd},
    state::{Outcome, Staleness},
    tools::Tool,
};

/// Order of residues in the sequences given to the aligners.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// Directions to process: forward only, or forward followed by reverse.
    pub fn all(both: bool) -> &'static [Direction] {
        if both {
            &[Self::Forward, Self::Reverse]
        } else {
            &[Self::Forward]
        }
    }

    pub fn to_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Reverses residue order in all sequences of `in_path` (both unaligned sequences and alignments),
/// and writes them to `out_path`.
/// Existing output is kept unless downstream files are stale.
pub fn reverse(
    exec: &mut Executor,
    readal: &Path,
    in_path: &Path,
    out_path: &Path,
    staleness: Staleness,
) -> crate::Result<Outcome>
{
    if !staleness.must_generate(out_path) {
        log::debug!("    Skipping reversal, {} exists", crate::ext::fmt::path(out_path));
        return Ok(Outcome::Reused);
    }
    let mut cmd = ToolCmd::new(readal);
    cmd.arg("-in").arg(in_path).arg("-out").arg(out_path).arg("-reverse");
    exec.run(Tool::Readal, "readAl - reverse", &cmd)?;
    Ok(Outcome::Generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directions() {
        assert_eq!(Direction::all(false), &[Direction::Forward]);
        assert_eq!(Direction::all(true), &[Direction::Forward, Direction::Reverse]);
        assert_eq!(format!("{}.{}", Direction::Reverse, "kal"), "reverse.kal");
    }
}
