//! Genome-wide exchangeability test of the samples of a PLINK binary fileset.
//!
//! The fileset is split into per-chromosome filesets with an external PLINK executable. Each of them
//! yields a condensed cityblock distance vector between samples, and the collection of vectors is fed to
//! a permutation test of exchangeability.
use std::{ffi::OsString, path::{Path, PathBuf}, time::Instant};

#[macro_use]
extern crate log;

use located_error::prelude::*;
use parser::Cli;
use pdist::{pdist, CondensedDistances, Metric};
use plink_io::{ChrIdx, Extraction, GenotypeMatrix, IntermediateFiles, PlinkCommand, BED_EXT};
use v_stat::DistDataTest;

use indicatif::{ProgressBar, ProgressIterator, ProgressStyle};

pub mod writer;

mod report;
pub use report::{ChromosomeSummary, ExchangeabilityReport, ResultFiles, RESULTS_EXT};

const PROGRESS_TEMPLATE: &str = "{msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

/// Run the whole pipeline: extraction, distances, cleanup, exchangeability test.
///
/// Chromosomes are processed strictly one after the other, and only a single genotype matrix is ever held
/// in memory. Intermediate filesets are only removed once every chromosome was successfully processed:
/// they are left in place for inspection if any step fails.
///
/// # Errors
/// - if any requested output file already exists, and `--overwrite` was not provided.
/// - if the fileset of a chromosome cannot be read (typically after a failed extraction).
/// - if the intermediate filesets cannot be removed.
/// - if the exchangeability test cannot be carried out (no permutations, non-finite statistic).
pub fn run(cli: &Cli) -> Result<ExchangeabilityReport> {
    let start = Instant::now();

    // ----------------------------- Resolve outputs before doing any work.
    let result_files = ResultFiles::new(cli)?;
    let chromosomes  = cli.chromosomes()?;

    // ----------------------------- Per-chromosome pairwise distances
    let plink = PlinkCommand::new(&cli.plink);
    debug!("Splitting {} with {}", cli.input.display(), plink.executable().display());
    let mut intermediates = IntermediateFiles::new();
    let mut summaries     = Vec::with_capacity(chromosomes.len());
    let mut dist_list     = Vec::with_capacity(chromosomes.len());
    for chr in chromosomes.into_iter().map(ChrIdx::from) {
        let chr_start = Instant::now();
        info!("Computing pairwise distances for Chr{chr}");

        let extraction = plink.extract_chromosome(&cli.input, chr);
        intermediates.push(&extraction.prefix);

        let (mut summary, distances) = chromosome_distances(&extraction)
            .with_loc(|| format!("While processing chromosome {chr}"))?;
        summary.elapsed = chr_start.elapsed();
        info!("Time elapsed: {:.3} sec", summary.elapsed.as_secs_f64());

        summaries.push(summary);
        dist_list.push(distances);
    }

    // ----------------------------- Cleanup
    let removed = intermediates.remove_all().loc("While removing intermediate filesets")?;
    debug!("Removed {removed} intermediate files");

    // ----------------------------- Exchangeability test
    info!("Running the exchangeability test over {} chromosomes ({} permutations)", dist_list.len(), cli.num_perms);
    let test_start = Instant::now();
    let test = DistDataTest::new(&dist_list).loc("While preparing the exchangeability test")?;
    let mut rng = fastrand::Rng::with_seed(cli.seed);
    let progress = permutations_progress_bar(cli.num_perms)?;
    let outcome = test.run_with(test.permutations(cli.num_perms, &mut rng).progress_with(progress.clone()));
    progress.finish_and_clear();
    let outcome = outcome.loc("While running the exchangeability test")?;
    let test_elapsed = test_start.elapsed();

    let report = ExchangeabilityReport {
        seed       : cli.seed,
        chromosomes: summaries,
        distances  : dist_list,
        outcome,
        elapsed    : start.elapsed(),
    };

    println!("Exchangeability p-value: {}", report.p_value());
    println!("Time elapsed: {:.3} sec", test_elapsed.as_secs_f64());
    info!("Total time elapsed: {:.3} sec", report.elapsed.as_secs_f64());
    report.write(&result_files)?;
    Ok(report)
}

/// Read the fileset of an extracted chromosome, and compute the cityblock distance between all of its samples.
/// The genotype matrix is dropped as soon as distances are obtained.
fn chromosome_distances(extraction: &Extraction) -> Result<(ChromosomeSummary, CondensedDistances)> {
    let Extraction{chr, prefix, success} = extraction;
    if ! success {
        warn!("Attempting to read Chr{chr}, even though its extraction did not succeed.");
    }

    let genotypes = GenotypeMatrix::read(bed_path(prefix))?;
    let summary = ChromosomeSummary {
        chr          : *chr,
        n_samples    : genotypes.n_samples(),
        n_variants   : genotypes.n_variants(),
        missing_calls: genotypes.missing_calls(),
        elapsed      : std::time::Duration::ZERO,
    };

    let distances = pdist(genotypes.view(), Metric::Cityblock);
    Ok((summary, distances))
}

/// `<prefix>.bed`. The prefix may already contain dots, which `Path::with_extension` would truncate.
fn bed_path(prefix: &Path) -> PathBuf {
    let mut bed = OsString::from(prefix);
    bed.push(format!(".{BED_EXT}"));
    PathBuf::from(bed)
}

/// Progress bar of the permutation loop, drawn through the logger's `MultiProgress` so that log lines do not
/// tear it apart. Hidden if the logger was never initialized, or if info messages are disabled.
fn permutations_progress_bar(num_perms: u32) -> Result<ProgressBar> {
    let progress = match logger::Logger::multi() {
        Some(multi) if log_enabled!(log::Level::Info) => multi.add(ProgressBar::new(u64::from(num_perms))),
        _ => return Ok(ProgressBar::hidden()),
    };
    let style = ProgressStyle::with_template(PROGRESS_TEMPLATE)
        .loc("Failed to parse progress bar template")?
        .progress_chars("=> ");
    progress.set_style(style);
    progress.set_message("Permutations");
    Ok(progress)
}
