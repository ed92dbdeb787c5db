//! Execution of a single aligner, followed by the mandatory output check.

use std::{
    fs,
    ffi::OsString,
    path::{Path, PathBuf},
};
use crate::{
    ext,
    err::add_path,
    seq::check::Validator,
};
use super::{
    config::AlignerSpec,
    exec::{Executor, ToolCmd},
    state::{Outcome, Staleness},
    tools::{Aligner, Tool},
};

/// Lock and temporary directories of T-Coffee are created here, separately for each user.
const COFFEE_TMP: &str = "/tmp/tcoffee";

/// Environment variables, that point T-Coffee to its lock and temporary directories.
const COFFEE_ENV: [&str; 2] = ["LOCKDIR_4_TCOFFEE", "TMP_4_TCOFFEE"];

fn coffee_tmp_dir() -> PathBuf {
    Path::new(COFFEE_TMP).join(ext::sys::current_user())
}

/// Builds the command line for the aligner. `extra` arguments follow user-provided arguments.
pub fn command(spec: &AlignerSpec, extra: &[OsString], in_path: &Path, out_path: &Path) -> ToolCmd {
    let mut cmd = ToolCmd::new(&spec.binary);
    match spec.aligner {
        Aligner::Muscle | Aligner::Kalign => {
            cmd.user_args(&spec.params).args(extra).arg("-in").arg(in_path).arg("-out").arg(out_path);
        }
        Aligner::ClustalW => {
            cmd.user_args(&spec.params).args(extra)
                .arg_joined("-INFILE=", in_path).arg_joined("-OUTFILE=", out_path);
        }
        Aligner::ClustalOmega => {
            cmd.user_args(&spec.params).args(extra).arg("--in").arg(in_path).arg("--out").arg(out_path);
        }
        Aligner::Mafft => {
            cmd.user_args(&spec.params).args(extra).arg(in_path).stdout_to(out_path);
        }
        Aligner::Prank => {
            cmd.user_args(&spec.params).args(extra).arg_joined("-d=", in_path).arg_joined("-o=", out_path);
        }
        Aligner::DialignTx => {
            cmd.user_args(&spec.params).args(extra).arg(in_path).arg(out_path);
        }
        Aligner::TCoffee | Aligner::MCoffee => {
            cmd.arg(in_path).user_args(&spec.params).args(extra).arg("-outfile").arg(out_path);
            let tmp_dir = coffee_tmp_dir();
            for key in COFFEE_ENV {
                cmd.env(key, &tmp_dir);
            }
        }
    }
    cmd
}

/// Extension that PRANK appends to its output file, depending on the requested output format.
fn prank_suffix(params: &str) -> &'static str {
    if !params.contains("-f=") {
        ".best.fas"
    } else if params.contains("-f=nexus") {
        ".best.nex"
    } else {
        ".best.phy"
    }
}

/// Moves aligner output into the expected location, and removes temporary files.
fn finalize(exec: &Executor, spec: &AlignerSpec, in_path: &Path, out_path: &Path) -> crate::Result<()> {
    let tool = Tool::Aligner(spec.aligner);
    if spec.aligner == Aligner::Prank {
        // Some PRANK builds write directly to the output file, then the validator decides.
        let produced = ext::sys::append_path(out_path, prank_suffix(&spec.params));
        if ext::sys::nonempty_file(&produced) {
            fs::rename(&produced, out_path).map_err(|e| tool.failed(format!("cannot move {} to {}: {}",
                ext::fmt::path(&produced), ext::fmt::path(out_path), e)))?;
        }
    }
    if spec.aligner.is_coffee() {
        if let Some(stem) = in_path.file_stem() {
            // T-Coffee only strips the last extension: `fam.seqs.reverse` -> `fam.seqs.dnd`.
            let tree = ext::sys::append_path(&exec.work_dir().join(stem), ".dnd");
            if tree.exists() {
                log::trace!("    Removing guide tree {}", ext::fmt::path(&tree));
                fs::remove_file(&tree).map_err(add_path!(tree))?;
            }
        }
    }
    Ok(())
}

/// Aligns sequences from `in_path` and writes the alignment to `out_path`.
/// Output alignment must contain exactly the same sequences as the input.
/// Existing output is kept unless downstream files are stale.
pub fn run(
    exec: &mut Executor,
    spec: &AlignerSpec,
    extra: &[OsString],
    in_path: &Path,
    out_path: &Path,
    staleness: Staleness,
    validator: &Validator,
) -> crate::Result<Outcome>
{
    if !staleness.must_generate(out_path) {
        log::debug!("    Skipping {}, {} exists", spec.aligner, ext::fmt::path(out_path));
        return Ok(Outcome::Reused);
    }
    if spec.aligner.is_coffee() {
        ext::sys::mkdir_shared(&coffee_tmp_dir())?;
    }
    let tool = Tool::Aligner(spec.aligner);
    let cmd = command(spec, extra, in_path, out_path);
    exec.run(tool, &spec.aligner.to_str().to_uppercase(), &cmd)?;
    finalize(exec, spec, in_path, out_path)?;

    match validator.compare(in_path, out_path) {
        Ok(None) => Ok(Outcome::Generated),
        Ok(Some(mismatch)) => Err(tool.inconsistent(mismatch.describe(in_path, out_path))),
        Err(e) => Err(tool.inconsistent(format!("cannot read {}: {}", ext::fmt::path(out_path), e.display()))),
    }
}
