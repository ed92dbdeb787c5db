//! Trimming and back-translation of the alignment.

use std::path::Path;
use crate::ext;
use super::{
    exec::{Executor, ToolCmd},
    state::{Outcome, Staleness},
    tools::Tool,
};

/// Input files of the trimming tool.
#[derive(Default, Clone, Copy, Debug)]
pub struct TrimInput<'a> {
    /// Single input alignment.
    pub alignment: Option<&'a Path>,
    /// File with paths to several alignments, that are compared to each other.
    pub compare_set: Option<&'a Path>,
    /// Alignment, selected from the compare set regardless of its score.
    pub force_select: Option<&'a Path>,
    /// Coding sequences for back-translation.
    pub cds: Option<&'a Path>,
}

pub fn command(binary: &Path, args: &str, input: &TrimInput, out_path: &Path) -> ToolCmd {
    let mut cmd = ToolCmd::new(binary);
    if let Some(cds) = input.cds {
        cmd.arg("-backtrans").arg(cds);
    }
    if let Some(set) = input.compare_set {
        cmd.arg("-compareset").arg(set);
    }
    if let Some(reference) = input.force_select {
        cmd.arg("-forceselect").arg(reference);
    }
    if let Some(aln) = input.alignment {
        cmd.arg("-in").arg(aln);
    }
    cmd.arg("-out").arg(out_path).user_args(args);
    cmd
}

/// Trims (or back-translates) the alignment, and writes it to `out_path`.
/// Existing output is kept unless downstream files are stale.
pub fn run(
    exec: &mut Executor,
    binary: &Path,
    args: &str,
    input: &TrimInput,
    out_path: &Path,
    staleness: Staleness,
) -> crate::Result<Outcome>
{
    if !staleness.must_generate(out_path) {
        log::debug!("    Skipping trimming, {} exists", ext::fmt::path(out_path));
        return Ok(Outcome::Reused);
    }
    let title = if input.cds.is_some() { "trimAl - back-translation" } else { "trimAl" };
    exec.run(Tool::Trimmer, title, &command(binary, args, input, out_path))?;
    Ok(Outcome::Generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_lines() {
        let bin = Path::new("trimal");
        let single = TrimInput { alignment: Some(Path::new("fam.alg.forward.msl")), ..TrimInput::default() };
        assert_eq!(command(bin, "-phylip  -gappyout", &single, Path::new("fam.alg.clean")).to_cmd_string(),
            "trimal -in fam.alg.forward.msl -out fam.alg.clean -phylip -gappyout");

        let compare = TrimInput {
            compare_set: Some(Path::new("fam.alg.paths")),
            force_select: Some(Path::new("fam.alg.metalig")),
            cds: Some(Path::new("cds.fa")),
            ..TrimInput::default()
        };
        assert_eq!(command(bin, "-ct", &compare, Path::new("fam.alg.clean_cds")).to_cmd_string(),
            "trimal -backtrans cds.fa -compareset fam.alg.paths -forceselect fam.alg.metalig \
            -out fam.alg.clean_cds -ct");
    }
}
