use thiserror::Error;

/// Errors reported by graph construction and the rank estimators.
///
/// All parameter and graph checks run before any computation starts, so an
/// error never comes with a partial rank vector.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("no convergence after {iterations} iterations (max delta {max_delta})")]
    NonConvergence { iterations: usize, max_delta: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
