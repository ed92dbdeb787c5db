//! Consensus between several alignments, and conversion of the untrimmed alignment.

use std::{
    io::Write,
    ffi::OsString,
    path::{Path, PathBuf},
};
use crate::{
    ext,
    err::add_path,
    seq::check::Validator,
};
use super::{
    align,
    config::AlignerSpec,
    exec::{Executor, ToolCmd},
    state::{Outcome, Staleness},
    tools::Tool,
};

/// Writes alignment paths, one per line.
pub fn write_path_list(path: &Path, alignments: &[PathBuf]) -> crate::Result<()> {
    let mut f = ext::sys::create(path)?;
    for aln in alignments {
        writeln!(f, "{}", aln.display()).map_err(add_path!(path))?;
    }
    f.flush().map_err(add_path!(path))
}

/// Builds a meta-alignment out of `alignments`.
/// The consensus tool receives the original sequences `in_path` and all alignments (`-aln P1 P2 ...`),
/// and its output `out_path` must contain the same sequences as `in_path`.
/// List of alignments is saved to `path_list`.
pub fn build(
    exec: &mut Executor,
    spec: &AlignerSpec,
    in_path: &Path,
    alignments: &[PathBuf],
    path_list: &Path,
    out_path: &Path,
    staleness: Staleness,
    validator: &Validator,
) -> crate::Result<Outcome>
{
    write_path_list(path_list, alignments)?;
    log::info!("    Consensus between {} alignments ({})", alignments.len(), spec.aligner);
    let mut extra = Vec::with_capacity(alignments.len() + 1);
    extra.push(OsString::from("-aln"));
    extra.extend(alignments.iter().map(|path| path.as_os_str().to_owned()));
    align::run(exec, spec, &extra, in_path, out_path, staleness, validator)
}

/// Converts the alignment into PHYLIP format in place.
/// Existing files are only converted if they were regenerated during this run.
pub fn to_phylip(exec: &mut Executor, readal: &Path, path: &Path, staleness: Staleness) -> crate::Result<()> {
    if !staleness.replace() {
        log::debug!("    Skipping format conversion of {}", ext::fmt::path(path));
        return Ok(());
    }
    let mut cmd = ToolCmd::new(readal);
    cmd.arg("-in").arg(path).arg("-out").arg(path).arg("-phylip");
    exec.run(Tool::Readal, "readAl - phylip", &cmd)
}
