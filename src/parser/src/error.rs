use thiserror::Error;
use crate::FileEntity;

#[derive(Error, Debug)]
pub enum ParserError{
    #[error("Invalid slice or value format for --{arg}. [{err}]")]
    ParseArg{arg: String, err: String},

    #[error("{0} {1} does not exist")]
    MissingFileEntity(FileEntity, String),

    #[error("{1} is not a {0}")]
    InvalidFileEntity(FileEntity, String),

    #[error("No chromosome was requested through --chr")]
    EmptyChromosomes,

    #[error("Invalid chromosome index '{0}'. Chromosome indices are 1-based")]
    InvalidChromosome(u8),

    #[error("Failed to generate an output file prefix. Note that file prefixes are generated from the --input filestem")]
    ParseOutputPrefix,

    #[error("{0} already exists. Use --overwrite to force.")]
    CannotOverwrite(String)
}
