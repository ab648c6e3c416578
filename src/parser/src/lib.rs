use std::{
    fs::File,
    path::{Path, PathBuf},
    str::FromStr,
    ops::RangeInclusive,
    fmt::{self, Display, Formatter}, ffi::OsStr
};

use located_error::*;

use clap::Parser;
use serde::{Serialize, Deserialize};
use log::debug;
use anyhow::{anyhow, Result};

mod error;
pub use error::ParserError;

use plink_io::BED_EXT;

/// Default set of chromosomes of a genome-wide run: the human autosomes.
pub const DEFAULT_CHROMOSOMES: &str = "1-22";

#[derive(Parser, Debug, Serialize, Deserialize)]
#[clap(name="exchangeability-rs", author, version, about, long_about = None)]
/// Test the exchangeability of samples, using per-chromosome pairwise distances computed from a PLINK fileset.
pub struct Cli {
    ///Set the verbosity level (-v -vv -vvv)
    ///
    /// Set the verbosity level of this program. Multiple levels allowed {n}
    ///
    /// -v: Debug  |  -vv: Trace {n}
    ///
    /// Note that the program still outputs progress messages and warnings by default, even when this flag is off.
    /// Use The --quiet/-q to disable them
    #[clap(short='v', long, parse(from_occurrences), global=true)]
    pub verbose: u8,

    /// Disable progress messages and warnings.
    ///
    /// By default, progress messages and warnings are emmited and redirected to the console, even when verbose
    /// mode is off. Use this argument to disable this. Only errors will be displayed.
    #[clap(short='q', long, global=true)]
    pub quiet: bool,

    /// PLINK binary fileset prefix.
    ///
    /// '<input>.bed', '<input>.bim' and '<input>.fam' are expected to exist. Per-chromosome
    /// intermediate filesets are written next to them as '<input>_<chr>.*', and removed at the
    /// end of the run.
    #[clap(short='i', long, parse(try_from_os_str=valid_input_prefix))]
    pub input: PathBuf,

    /// Path to the PLINK executable.
    ///
    /// Used to split the input fileset into per-chromosome filesets
    /// (i.e.: 'plink --bfile <input> --chr <chr> --make-bed --out <input>_<chr>').
    /// A bare program name is looked up within $PATH.
    #[clap(short='p', long)]
    pub plink: PathBuf,

    /// Number of permutations used to estimate the exchangeability p-value.
    ///
    /// Higher values increase the resolution of the p-value estimate, at the cost of runtime.
    #[clap(short='n', long="num-perms", alias="num_perms")]
    pub num_perms: u32,

    /// Restrict the analysis to a given set of chromosomes.
    ///
    /// Argument may accept slices (inclusive) such as '--chr 9-11' and/or discrete integers such as '--chr 1 4 13'.{n}
    /// Example:{n}
    ///   specifying          : '--chr 9-11 13 19-22 '{n}
    ///   ...will be parsed as: [9, 10, 11, 13, 19, 20, 21, 22]
    ///
    #[clap(short='c', long, multiple_values(true), default_values(&[DEFAULT_CHROMOSOMES]))]
    pub chr: Vec<String>,

    /// Seed of the permutation random number generator.
    ///
    /// Randomly assigned if none is provided. Note that the seed is always printed in the results,
    /// so that a run can be replicated.
    #[clap(short='s', long, required(false), default_value_t=fastrand::u64(u64::MIN..=u64::MAX))]
    pub seed: u64,

    /// Output directory where the serialized arguments and the results table will be written.
    ///
    /// Note that the leaf directory will be created if it is not present, but that parent directories
    /// are never created. If unspecified, results are only printed on the console.
    #[clap(short='o', long, parse(try_from_os_str=valid_output_dir))]
    pub output_dir: Option<PathBuf>,

    /// Overwrite existing output files.
    ///
    /// By default, existing results files within --output-dir are never overwritten. Use this flag
    /// to force this behaviour.
    #[clap(short='w', long)]
    pub overwrite: bool,
}

impl Cli {
    /// Serialize command line arguments within a `.yaml` file.
    ///
    /// # Behavior
    /// - Arguments are always printed at the debug level.
    /// - If `--output-dir` was provided, they are written in '{current time}-exchangeability.yaml', where current
    ///   time follows the format `YYYY`-`MM`-`DD`T`hhmmss`
    pub fn serialize(&self) -> Result<()> {
        let serialized = serde_yaml::to_string(&self)
            .loc("Failed to serialize command line arguments")?;

        debug!("\n---- Command line args ----\n{}\n---", serialized);

        let Some(output_dir) = &self.output_dir else {
            return Ok(())
        };

        let current_time = chrono::offset::Local::now().format("%Y-%m-%dT%H%M%S").to_string();
        let output_file = output_dir.join(format!("{current_time}-exchangeability.yaml"));
        std::fs::write(&output_file, serialized)
            .with_loc(|| format!("Unable to serialize arguments into {}", output_file.display()))
    }

    /// Deserialize a `.yaml` file into Command line arguments.
    ///
    /// # Errors
    /// - if the provided `.yaml` does not exist or lacks read permissions.
    /// - if `serde_yaml` fails to parse the provided file into `Self`.
    pub fn deserialize(yaml: &Path) -> Result<Self> {
        let file = File::open(yaml).with_loc(|| format!("Failed to open {}", yaml.display()))?;
        serde_yaml::from_reader(file).with_loc(|| format!("Unable to deserialize arguments from {}", yaml.display()))
    }

    /// Parse the requested `--chr` ranges into a sorted, deduplicated list of chromosome indices.
    ///
    /// # Errors
    /// - if any range is malformed, if the list is empty, or if it contains chromosome '0'
    pub fn chromosomes(&self) -> Result<Vec<u8>> {
        let chromosomes: Vec<u8> = parse_user_ranges(&self.chr, "chr").loc("While parsing --chr")?;
        if chromosomes.is_empty() {
            return Err(anyhow!(ParserError::EmptyChromosomes)).loc("While parsing --chr")
        }
        if let Some(invalid) = chromosomes.iter().find(|&&chr| chr == 0) {
            return Err(anyhow!(ParserError::InvalidChromosome(*invalid))).loc("While parsing --chr")
        }
        Ok(chromosomes)
    }

    /// Get the path/filename-prefix of all of our outputs: '<output-dir>/<input filestem>'. `None` if no
    /// `--output-dir` was requested.
    ///
    /// # Errors
    /// - if no filestem can be extracted from `--input`
    pub fn get_file_prefix(&self) -> Result<Option<PathBuf>> {
        let Some(output_dir) = &self.output_dir else {
            return Ok(None)
        };
        let file_stem = self.input.file_name()
            .ok_or_else(|| anyhow!(ParserError::ParseOutputPrefix))
            .loc("While parsing command line arguments")?;
        Ok(Some(output_dir.join(file_stem)))
    }

    /// Check if a given file already exists ; raise an error if such is the case, and the user did not explicitly
    /// allow file overwriting.
    pub fn can_write_file(&self, pathbuf: &Path) -> Result<bool> {
        if ! self.overwrite && pathbuf.exists() {
            return Err(ParserError::CannotOverwrite(pathbuf.display().to_string()))
                .loc("While parsing command line arguments")
        }
        Ok(true)
    }

    /// Verbosity level of the logger: Info by default, `--quiet` takes precedence.
    pub fn verbosity(&self) -> u8 {
        if self.quiet {0} else {self.verbose.saturating_add(2)}
    }
}

#[derive(Debug, Clone, Copy)]
pub enum FileEntity {File, Directory}

impl Display for FileEntity {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::File      => write!(f, "File"),
            Self::Directory => write!(f, "Directory"),
        }
    }
}

impl FileEntity {
    fn validate(&self, path: &Path) -> Result<(), ParserError> {
        use ParserError::InvalidFileEntity;
        let valid = match self {
            Self::File      => path.is_file(),
            Self::Directory => path.is_dir()
        };

        if valid {
            Ok(())
        } else {
            Err(InvalidFileEntity(*self, path.display().to_string()))
        }
    }
}

fn assert_filesystem_entity_is_valid(path: &Path, entity: &FileEntity) -> Result<()> {
    use ParserError::MissingFileEntity;
    if ! path.exists() {
        return Err(MissingFileEntity(*entity, path.display().to_string()))
            .loc("While parsing arguments.")
    }

    entity.validate(path).loc("While parsing arguments.")
}

/// `--input` is a fileset prefix: check that '<prefix>.bed' exists, but keep the prefix as is.
fn valid_input_prefix(s: &OsStr) -> Result<PathBuf> {
    let mut bed = s.to_os_string();
    bed.push(format!(".{BED_EXT}"));
    assert_filesystem_entity_is_valid(Path::new(&bed), &FileEntity::File)
        .loc("While checking for PLINK fileset validity")?;
    Ok(PathBuf::from(s))
}

fn valid_output_dir(s: &OsStr) -> Result<PathBuf> {
    let path = Path::new(s);
    if ! path.exists() {
        std::fs::create_dir(path)
            .with_loc(|| format!("Failed to create output directory {}", path.display()))?;
    }
    assert_filesystem_entity_is_valid(path, &FileEntity::Directory)
        .loc("While checking for directory validity")?;
    Ok(PathBuf::from(s))
}

/// Convert a user-defined string "range" into a vector of integers.
/// "9-14" thus becomes [9, 10, 11, 12, 13, 14]
/// Note that the range is fully inclusive.
fn parse_user_range<T>(s: &str) -> Result<Vec<T>, <T as FromStr>::Err>
where   T                : FromStr,
        RangeInclusive<T>: Iterator<Item = T>,
{
    match s.split_once('-') {
        Some((start, end)) => Ok((start.parse::<T>()?..=end.parse::<T>()?).collect::<Vec<T>>()),
        None               => Ok(vec![s.parse::<T>()?])
    }
}

/// Convert a vector of Strings with user-input ranges to a single, sorted and deduplicated vector of integers.
///
/// ```text
/// --> ["1-6", "8"] for the user, becomes [1, 2, 3, 4, 5, 6, 8] for our program.
/// ```
///
/// # Example
///```
///use parser::parse_user_ranges;
///let user_input  : Vec<String> = vec!["5".into(), "1-3".into(), "7".into()];
///let parsed_input: Vec<u8>     = parse_user_ranges(&user_input, "chr").expect("error");
///assert_eq!(parsed_input, vec![1, 2, 3, 5, 7])
///```
///
/// # Errors
///  returns a `ParserError::ParseArg` if the provided ranges cannot be parsed into integers.
pub fn parse_user_ranges<T>(ranges: &[String], arg: &str) -> Result<Vec<T>, ParserError>
where   T                   : FromStr + Ord,
        RangeInclusive<T>   : Iterator<Item = T>,
        <T as FromStr>::Err : ToString,
{
    let mut parsed_ranges = Vec::new();
    for range in ranges {
        let values = parse_user_range(range)
            .map_err(|err| ParserError::ParseArg{arg: arg.to_string(), err: err.to_string()})?;
        parsed_ranges.extend(values);
    }
    parsed_ranges.sort();
    parsed_ranges.dedup();
    Ok(parsed_ranges)
}
