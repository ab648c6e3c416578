use thiserror::Error;

#[derive(Error, Debug)]
pub enum VStatError {
    #[error("Cannot run an exchangeability test without any distance vector")]
    EmptyDistList,

    #[error("Distance vector #{block} spans {got} samples, while the first one spans {expected}")]
    SampleCountMismatch{block: usize, expected: usize, got: usize},

    #[error("At least 2 samples are required to test exchangeability. Got {0}")]
    TooFewSamples(usize),

    #[error("The number of permutations must be greater than zero")]
    NoPermutations,

    #[error("The observed V statistic is not finite ({0}). Do some of the distances carry missing values?")]
    NonFiniteStatistic(f64),
}
