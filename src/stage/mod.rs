//! Multiple sequence alignment stage: runs aligners in one or both directions,
//! builds consensus between several alignments, trims and back-translates the result.
//! Every step is skipped if its output exists, unless some of the previous steps regenerated their output.

pub mod config;
pub mod tools;
pub mod exec;
pub mod state;
pub mod paths;
pub mod direction;
pub mod align;
pub mod codec;
pub mod consensus;
pub mod trim;

use std::{
    path::PathBuf,
    time::Instant,
};
use crate::{
    Error,
    ext,
    err::error,
    seq::{
        inspect,
        check::Validator,
    },
};
pub use self::{
    config::Config,
    direction::Direction,
    exec::{Launcher, SystemLauncher},
    paths::Artifacts,
    state::{Outcome, Staleness},
};
use self::{
    exec::{Executor, LogSink},
    tools::Tool,
    trim::TrimInput,
};

/// Result of the whole stage.
#[derive(Debug)]
pub struct StageOutput {
    /// Alignment to be used in the downstream stages.
    pub final_artifact: PathBuf,
    /// All alignments, produced by the aligners, in the order of generation.
    pub alignments: Vec<PathBuf>,
    /// Were any files regenerated during the run?
    pub staleness: Staleness,
    /// Input configuration, where the input file is replaced by the final artifact.
    pub config: Config,
}

/// Joins two argument strings.
fn join_args(a: &str, b: &str) -> String {
    format!("{} {}", a, b).trim().to_owned()
}

/// Runs the alignment stage. All external tools are started using the `launcher`.
pub fn run(config: &Config, launcher: &mut dyn Launcher, validator: &Validator) -> crate::Result<StageOutput> {
    let timer = Instant::now();
    ext::sys::mkdir(&config.out_dir)?;
    let artifacts = Artifacts::new(&config.out_dir, &config.prefix);
    let sink = LogSink::open(config.verbosity, &artifacts.log(), config.replace)?;
    sink.write(&format!("###\n###\tSTEP\tMultiple Sequence Alignment\tSTART\t{}\n###", ext::fmt::timestamp()))?;
    sink.write(&config.describe())?;
    let mut exec = Executor::new(launcher, sink, config.out_dir.clone());

    let inspection = inspect::inspect(&config.in_file)?;
    if inspection.count < config.min_seqs {
        exec.sink().write(&format!("### INFO: It is necessary, at least, {} sequences to reconstruct an alignment ({})",
            config.min_seqs, inspection.count))?;
        log::info!("Too few sequences in {} ({} < {}), alignment is not possible",
            ext::fmt::path(&config.in_file), inspection.count, config.min_seqs);
        return Err(Error::InsufficientSeqs(inspection.count, config.min_seqs));
    }
    log::info!("Aligning {} sequences from {}", inspection.count, ext::fmt::path(&config.in_file));

    let mut staleness = Staleness::new(config.replace);
    let directions = Direction::all(config.both_directions);
    let rare = inspection.has_rare();
    if config.both_directions {
        staleness = staleness.after(direction::reverse(&mut exec, &config.readal, &config.in_file,
            &artifacts.reversed_seqs(), staleness)?);
    }
    // Unaligned sequences in the given direction, before placeholder substitution.
    let unaligned = |dir: Direction| match dir {
        Direction::Forward => config.in_file.clone(),
        Direction::Reverse => artifacts.reversed_seqs(),
    };
    if rare {
        log::info!("    Input contains rare residues (selenocysteine: {}, pyrrolysine: {})",
            inspection.selenocysteine, inspection.pyrrolysine);
        for &dir in directions {
            staleness = staleness.after(codec::substitute(&exec, &config.subst, &unaligned(dir),
                &artifacts.substituted_seqs(dir), staleness)?);
        }
    }

    let mut alignments: Vec<PathBuf> = Vec::new();
    for spec in config.aligners.iter() {
        let ext = spec.aligner.extension();
        let tool = Tool::Aligner(spec.aligner);
        for &dir in directions {
            log::info!("    {} ({})", spec.aligner, dir);
            let original = unaligned(dir);
            let input = if rare { artifacts.substituted_seqs(dir) } else { original.clone() };
            let mut aln = artifacts.alignment(dir, &ext, rare);
            staleness = staleness.after(align::run(&mut exec, spec, &[], &input, &aln, staleness, validator)?);

            if rare {
                let restored = artifacts.alignment(dir, &ext, false);
                staleness = staleness.after(codec::restore(&exec, &config.subst, &aln, &original, &restored,
                    staleness, validator, tool)?);
                aln = restored;
            }
            if dir == Direction::Reverse {
                let forw = artifacts.reverse_forw(&ext);
                let outcome = direction::reverse(&mut exec, &config.readal, &aln, &forw, staleness)?;
                if outcome == Outcome::Generated {
                    if let Some(mismatch) = validator.compare(&config.in_file, &forw)? {
                        return Err(Tool::Readal.inconsistent(mismatch.describe(&config.in_file, &forw)));
                    }
                }
                staleness = staleness.after(outcome);
                aln = forw;
            }
            if !alignments.contains(&aln) {
                alignments.push(aln);
            }
        }
    }

    let untrimmed = match &config.consensus {
        Some(spec) if alignments.len() > 1 => {
            let metalig = artifacts.metalig();
            staleness = staleness.after(consensus::build(&mut exec, spec, &config.in_file, &alignments,
                &artifacts.path_list(), &metalig, staleness, validator)?);
            metalig
        }
        _ => alignments.first().cloned().ok_or_else(|| error!(InvalidInput, "No alignments were produced"))?,
    };
    consensus::to_phylip(&mut exec, &config.readal, &untrimmed, staleness)?;

    let mut final_artifact = untrimmed.clone();
    let cds_file = if config.datatype.back_translates() {
        Some(config.cds.as_deref().ok_or_else(|| error!(InvalidInput, "Back-translation requires a CDS file"))?)
    } else {
        None
    };
    if let Some(cds_file) = cds_file {
        let trimmer = config.trimmer.as_ref()
            .ok_or_else(|| error!(InvalidInput, "Back-translation requires a trimming program"))?;
        let out = paths::cds(&untrimmed);
        let input = TrimInput { alignment: Some(&untrimmed), cds: Some(cds_file), ..TrimInput::default() };
        staleness = staleness.after(trim::run(&mut exec, &trimmer.binary, &trimmer.cds, &input, &out, staleness)?);
        consensus::to_phylip(&mut exec, &config.readal, &out, staleness)?;
        final_artifact = out;
    }

    if let Some(trimmer) = &config.trimmer {
        let clean = artifacts.clean();
        let path_list = artifacts.path_list();
        let mut args = trimmer.params.clone();
        let mut input = if alignments.len() > 1 {
            args = join_args(&args, &trimmer.compare);
            consensus::write_path_list(&path_list, &alignments)?;
            TrimInput { compare_set: Some(&path_list), force_select: Some(&untrimmed), ..TrimInput::default() }
        } else {
            TrimInput { alignment: Some(&untrimmed), ..TrimInput::default() }
        };
        staleness = staleness.after(trim::run(&mut exec, &trimmer.binary, &args, &input, &clean, staleness)?);
        final_artifact = clean;

        if let Some(cds_file) = cds_file {
            let clean_cds = paths::cds(&final_artifact);
            input.cds = Some(cds_file);
            staleness = staleness.after(trim::run(&mut exec, &trimmer.binary, &join_args(&args, &trimmer.cds),
                &input, &clean_cds, staleness)?);
            final_artifact = clean_cds;
        }
    }

    let elapsed = ext::fmt::Duration(timer.elapsed());
    exec.sink().write(&format!("###\n###\tSTEP\tMultiple Sequence Alignment\tEND\t{}", ext::fmt::timestamp()))?;
    exec.sink().write(&format!("###\tTOTAL Time\tMultiple Sequence Alignment\t{}\n###", elapsed))?;
    log::info!("Final alignment: {} ({})", ext::fmt::path(&final_artifact), elapsed);
    Ok(StageOutput {
        config: config.with_input(final_artifact.clone()),
        final_artifact,
        alignments,
        staleness,
    })
}

/// Runs the stage with the system launcher from within the output directory.
pub fn run_in_place(config: &Config) -> crate::Result<StageOutput> {
    ext::sys::mkdir(&config.out_dir)?;
    let _guard = ext::sys::DirGuard::new(&config.out_dir)?;
    run(config, &mut SystemLauncher, &Validator::default())
}
