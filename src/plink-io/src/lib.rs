//! PLINK binary fileset plumbing: per-chromosome extraction through an external PLINK executable,
//! genotype matrix loading, and removal of the intermediate filesets.

mod chr_index;
pub use chr_index::{ChrIdx, ChrIdxError};

pub mod command;
pub use command::{PlinkCommand, Extraction};

pub mod reader;
pub use reader::{GenotypeMatrix, GenotypeReaderError, BED_EXT};

pub mod intermediate;
pub use intermediate::IntermediateFiles;

#[cfg(test)]
mod tests;
