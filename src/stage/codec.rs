//! Steps that hide rare residues from the aligners and bring them back afterwards.

use std::path::Path;
use crate::{
    ext,
    Error,
    seq::{
        check::Validator,
        rare::{self, SubstTable},
    },
};
use super::{
    exec::Executor,
    state::{Outcome, Staleness},
    tools::Tool,
};

/// Replaces rare residues in `in_path` with placeholders, and writes sequences to `out_path`.
pub fn substitute(
    exec: &Executor,
    table: &SubstTable,
    in_path: &Path,
    out_path: &Path,
    staleness: Staleness,
) -> crate::Result<Outcome>
{
    if !staleness.must_generate(out_path) {
        log::debug!("    Skipping residue substitution, {} exists", ext::fmt::path(out_path));
        return Ok(Outcome::Reused);
    }
    let counts = rare::substitute_file(in_path, out_path, table)?;
    exec.sink().write(&format!("###\n###\tReplacing rare residues ({})\t{}\n###\t{}\n###",
        table, ext::fmt::timestamp(), counts))?;
    log::debug!("    Replaced {} rare residues in {}", counts.total(), ext::fmt::path(in_path));
    Ok(Outcome::Generated)
}

/// Puts rare residues back into the alignment `aligned_path`, and writes it to `out_path`.
/// `original_path` stores the same sequences before substitution.
/// Restored alignment must contain the same residues as `original_path`,
/// otherwise the error is attributed to the aligner `tool`.
pub fn restore(
    exec: &Executor,
    table: &SubstTable,
    aligned_path: &Path,
    original_path: &Path,
    out_path: &Path,
    staleness: Staleness,
    validator: &Validator,
    tool: Tool,
) -> crate::Result<Outcome>
{
    if !staleness.must_generate(out_path) {
        log::debug!("    Skipping residue restoration, {} exists", ext::fmt::path(out_path));
        return Ok(Outcome::Reused);
    }
    let counts = rare::restore_file(aligned_path, original_path, out_path, table).map_err(|e| match e {
        Error::InvalidData(s) => tool.inconsistent(s),
        e => e,
    })?;
    exec.sink().write(&format!("###\n###\tRestoring rare residues\t{}\n###\t{}\n###",
        ext::fmt::timestamp(), counts))?;
    log::debug!("    Restored {} rare residues in {}", counts.total(), ext::fmt::path(out_path));

    match validator.compare(original_path, out_path)? {
        None => Ok(Outcome::Generated),
        Some(mismatch) => Err(tool.inconsistent(mismatch.describe(original_path, out_path))),
    }
}
