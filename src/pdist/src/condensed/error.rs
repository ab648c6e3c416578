use thiserror::Error;

#[derive(Error, Debug)]
pub enum CondensedError {
    #[error("A condensed distance vector of length {0} does not match any number of samples (expected n*(n-1)/2)")]
    NotTriangular(usize),
}
