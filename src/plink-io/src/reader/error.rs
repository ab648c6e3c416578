use thiserror::Error;
use bed_reader::BedErrorPlus;

#[derive(Error, Debug)]
pub enum GenotypeReaderError {
    #[error("Genotype file {0} does not exist. Did the per-chromosome extraction fail?")]
    MissingFile(String),

    #[error("Failed to open PLINK fileset {0}")]
    Open(String, #[source] Box<BedErrorPlus>),

    #[error("Failed to read the genotype matrix of {0}")]
    Read(String, #[source] Box<BedErrorPlus>),

    #[error("Genotype matrix of {0} does not contain any sample")]
    NoSamples(String),
}
