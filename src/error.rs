use thiserror::Error;

/// Errors surfaced by the scheduling core.
///
/// The core never retries; every variant here is terminal from the
/// caller's point of view (spec.md §7).
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid horizon: {0}")]
    InvalidHorizon(String),

    #[error("invalid order: {0}")]
    InvalidOrder(String),

    #[error("MILP has no feasible assignment: {0}")]
    Infeasible(String),

    #[error("solver reached its time limit with no incumbent solution")]
    SolverTimeout,

    #[error("solver process failed: {0}")]
    SolverError(String),
}

impl From<std::io::Error> for CoreError {
    fn from(err: std::io::Error) -> Self {
        CoreError::SolverError(err.to_string())
    }
}

impl From<anyhow::Error> for CoreError {
    fn from(err: anyhow::Error) -> Self {
        CoreError::SolverError(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
