use std::path::Path;

use bed_reader::{Bed, ReadOptions};
use log::{debug, info, warn};
use ndarray::{Array2, ArrayView2};

use located_error::prelude::*;

mod error;
pub use error::GenotypeReaderError;

/// Extension of a PLINK binary genotype file.
pub const BED_EXT: &str = "bed";

/// Missing-call sentinel of `bed-reader` when reading genotypes as `i8`
const MISSING_I8: i8 = -127;

/// Samples x variants matrix of allele counts (0, 1, 2), read from a PLINK `.bed` file.
///
/// Counts are those of allele 1 (PLINK's default). Missing calls are encoded as `NaN`
#[derive(Debug, Clone)]
pub struct GenotypeMatrix {
    values: Array2<f64>,
}

impl GenotypeMatrix {
    /// Load the complete genotype matrix of a `.bed` file. The accompanying `.bim` and `.fam`
    /// files are expected to share its prefix.
    ///
    /// # Errors
    /// - if `path` does not exist
    /// - if the fileset cannot be opened, or is malformed (invalid magic number, truncated file,
    ///   mismatching `.fam`/`.bim` line counts ...)
    /// - if the fileset does not contain any sample.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        use GenotypeReaderError::{MissingFile, Open, Read, NoSamples};
        let path = path.as_ref();
        let display = path.display().to_string();
        if ! path.is_file() {
            return Err(MissingFile(display)).loc("While reading genotypes")
        }

        debug!("Opening {display}");
        let mut bed = Bed::new(path)
            .map_err(|e| Open(display.clone(), e))
            .loc("While reading genotypes")?;

        // Read as i8 first: a full f64 read would temporarily hold the matrix twice at 8 bytes per call.
        let counts = ReadOptions::builder()
            .i8()
            .count_a1()
            .read(&mut bed)
            .map_err(|e| Read(display.clone(), e))
            .loc("While reading genotypes")?;

        let (n_samples, n_variants) = counts.dim();
        if n_samples == 0 {
            return Err(NoSamples(display)).loc("While reading genotypes")
        }

        let values = Array2::from_shape_fn((n_samples, n_variants), |(i, j)| match counts[[i, j]] {
            MISSING_I8 => f64::NAN,
            count      => f64::from(count),
        });
        drop(counts);

        let matrix = Self { values };
        info!("Loaded {n_samples} samples and {n_variants} variants from {display}");
        if n_variants == 0 {
            warn!("{display} does not contain any variant. All pairwise distances will be null.");
        }
        let missing = matrix.missing_calls();
        if missing > 0 {
            warn!("{display} contains {missing} missing genotype calls. Distances involving them will be NaN.");
        }
        Ok(matrix)
    }

    pub fn n_samples(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_variants(&self) -> usize {
        self.values.ncols()
    }

    /// Number of missing genotype calls.
    pub fn missing_calls(&self) -> usize {
        self.values.iter().filter(|call| call.is_nan()).count()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }
}
