use crate::registry::HashAlgorithm;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum BenchError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Algorithm {0:?} is not registered")]
    AlgorithmUnavailable(HashAlgorithm),
    #[error("{algorithm:?} produced a {actual}-byte digest, expected {expected} bytes")]
    AlgorithmFailure {
        algorithm: HashAlgorithm,
        expected: usize,
        actual: usize,
    },
    #[error("Cannot flip a bit of an empty block")]
    EmptyInput,
}
