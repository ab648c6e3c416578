use std::{fmt::{self, Display, Formatter}, path::{Path, PathBuf}, time::Duration};

use located_error::prelude::*;
use log::info;
use parser::Cli;
use pdist::CondensedDistances;
use plink_io::ChrIdx;
use v_stat::TestOutcome;

use crate::writer::GenericWriter;

const DISPL_SEP             : &str  = " - ";
const CHR_FORMAT_LEN        : usize = 5;
const COUNT_FORMAT_LEN      : usize = 9;
const STAT_FORMAT_LEN       : usize = 12;
const FLOAT_FORMAT_PRECISION: usize = 5;

/// Extension of the results tables written within `--output-dir`
pub const RESULTS_EXT: &str = "exch";

/// What was read and computed for a single chromosome.
#[derive(Debug, Clone)]
pub struct ChromosomeSummary {
    pub chr          : ChrIdx,
    pub n_samples    : usize,
    pub n_variants   : usize,
    pub missing_calls: usize,
    pub elapsed      : Duration,
}

impl ChromosomeSummary {
    pub fn header() -> String {
        format!(
            "{: <CHR_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {}",
            "Chr", "Samples", "Variants", "Missing", "Elapsed(s)"
        )
    }
}

impl Display for ChromosomeSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f,
            "{: <CHR_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {:.3}",
            self.chr, self.n_samples, self.n_variants, self.missing_calls, self.elapsed.as_secs_f64()
        )
    }
}

/// Outcome of a genome-wide exchangeability run.
#[derive(Debug)]
pub struct ExchangeabilityReport {
    pub seed       : u64,
    pub chromosomes: Vec<ChromosomeSummary>,
    /// One condensed distance vector per chromosome, in the same order as `chromosomes`.
    pub distances  : Vec<CondensedDistances>,
    pub outcome    : TestOutcome,
    pub elapsed    : Duration,
}

impl ExchangeabilityReport {
    pub fn p_value(&self) -> f64 {
        self.outcome.p_value
    }

    pub fn outcome_header() -> String {
        format!(
            "{: <STAT_FORMAT_LEN$}{DISPL_SEP}\
             {: <STAT_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {}",
            "V", "P-value", "Perms", "Greater", "Lower", "Seed"
        )
    }

    /// `[header, values]` of the permutation test outcome.
    pub fn outcome_table(&self) -> [String; 2] {
        let TestOutcome{statistic, p_value, num_perms, n_greater, n_lower} = self.outcome;
        let values = format!(
            "{: <STAT_FORMAT_LEN$.FLOAT_FORMAT_PRECISION$}{DISPL_SEP}\
             {: <STAT_FORMAT_LEN$.FLOAT_FORMAT_PRECISION$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {: <COUNT_FORMAT_LEN$}{DISPL_SEP}\
             {}",
            statistic, p_value, num_perms, n_greater, n_lower, self.seed
        );
        [Self::outcome_header(), values]
    }

    /// Header line, followed by one line per chromosome.
    pub fn chromosome_table(&self) -> Vec<String> {
        std::iter::once(ChromosomeSummary::header())
            .chain(self.chromosomes.iter().map(ToString::to_string))
            .collect()
    }

    /// Write both results tables within `--output-dir`. Does nothing if no output directory was requested.
    pub fn write(&self, files: &ResultFiles) -> Result<()> {
        let Some((outcome_file, chromosome_file)) = files.paths() else {
            return Ok(())
        };
        info!("Writing exchangeability test results in {}", outcome_file.display());
        GenericWriter::new(Some(outcome_file))?.write_iter(self.outcome_table())
            .loc("While writing exchangeability test results")?;

        info!("Writing per-chromosome summary in {}", chromosome_file.display());
        GenericWriter::new(Some(chromosome_file))?.write_iter(self.chromosome_table())
            .loc("While writing per-chromosome summary")
    }
}

impl Display for ExchangeabilityReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for line in self.chromosome_table() {
            writeln!(f, "{line}")?;
        }
        let [header, values] = self.outcome_table();
        writeln!(f, "\n{header}\n{values}")
    }
}

/// Output paths of a run: '<output-dir>/<input>.exch' and '<output-dir>/<input>.chromosomes.exch'
#[derive(Debug, Default)]
pub struct ResultFiles {
    outcome    : Option<PathBuf>,
    chromosomes: Option<PathBuf>,
}

impl ResultFiles {
    /// Resolve the output paths requested by `cli`, and check they can be written before any work is done.
    ///
    /// # Errors
    /// if any of the output files already exists and `--overwrite` was not set.
    pub fn new(cli: &Cli) -> Result<Self> {
        let Some(prefix) = cli.get_file_prefix()? else {
            return Ok(Self::default())
        };
        let outcome     = Self::with_suffix(&prefix, RESULTS_EXT);
        let chromosomes = Self::with_suffix(&prefix, &format!("chromosomes.{RESULTS_EXT}"));
        for file in [&outcome, &chromosomes] {
            cli.can_write_file(file)?;
        }
        Ok(Self{outcome: Some(outcome), chromosomes: Some(chromosomes)})
    }

    pub fn paths(&self) -> Option<(&Path, &Path)> {
        Some((self.outcome.as_deref()?, self.chromosomes.as_deref()?))
    }

    fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
        let mut path = prefix.as_os_str().to_os_string();
        path.push(format!(".{suffix}"));
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mock_report() -> ExchangeabilityReport {
        let chromosomes = (1..=2).map(|chr| ChromosomeSummary{
            chr: ChrIdx(chr), n_samples: 5, n_variants: 3 * chr as usize, missing_calls: 0, elapsed: Duration::from_millis(1500)
        }).collect();
        let distances = vec![CondensedDistances::new(vec![0.0; 10]).unwrap(); 2];
        let outcome = TestOutcome{statistic: 1.5, p_value: 0.04, num_perms: 100, n_greater: 2, n_lower: 98};
        ExchangeabilityReport{seed: 42, chromosomes, distances, outcome, elapsed: Duration::from_secs(3)}
    }

    #[test]
    fn chromosome_table() {
        let report = mock_report();
        let table = report.chromosome_table();
        assert_eq!(table.len(), 3);
        assert!(table[0].starts_with("Chr   - Samples"));
        assert_eq!(table[2], format!("2{}{DISPL_SEP}5{}{DISPL_SEP}6{}{DISPL_SEP}0{}{DISPL_SEP}1.500",
            " ".repeat(CHR_FORMAT_LEN - 1), " ".repeat(COUNT_FORMAT_LEN - 1), " ".repeat(COUNT_FORMAT_LEN - 1), " ".repeat(COUNT_FORMAT_LEN - 1)
        ));
    }

    #[test]
    fn write_tsv_tables() -> Result<()> {
        let tmpdir = tempfile::tempdir()?;
        let prefix = tmpdir.path().join("1KG.phase3");
        let files = ResultFiles{
            outcome: Some(ResultFiles::with_suffix(&prefix, RESULTS_EXT)),
            chromosomes: Some(ResultFiles::with_suffix(&prefix, "chromosomes.exch")),
        };
        mock_report().write(&files)?;

        let outcome = std::fs::read_to_string(tmpdir.path().join("1KG.phase3.exch"))?;
        assert_eq!(outcome, "V\tP-value\tPerms\tGreater\tLower\tSeed\n1.50000\t0.04000\t100\t2\t98\t42\n");

        let chromosomes = std::fs::read_to_string(tmpdir.path().join("1KG.phase3.chromosomes.exch"))?;
        assert_eq!(chromosomes, "Chr\tSamples\tVariants\tMissing\tElapsed(s)\n1\t5\t3\t0\t1.500\n2\t5\t6\t0\t1.500\n");
        Ok(())
    }

    #[test]
    fn no_output_dir_writes_nothing() -> Result<()> {
        mock_report().write(&ResultFiles::default())
    }
}
