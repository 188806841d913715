use thiserror::Error;

/// Everything that can stop a query before (or outside of) a solver verdict.
///
/// Solver-reported infeasibility and timeouts are not errors, see
/// [`crate::solver::SolveStatus`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid tournament parameters: {reason}")]
    InvalidParams { reason :String },

    #[error("invalid query: {reason}")]
    InvalidQuery { reason :String },

    #[error("conflicting query: {reason}")]
    ConflictingQuery { reason :String },

    #[error("infeasible by construction: {reason}")]
    InfeasibleByConstruction { reason :String },

    #[error("solver failure: {0}")]
    Solver(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path :String,
        #[source]
        source :std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path :String,
        #[source]
        source :serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn params(reason :impl Into<String>) -> Self {
        Error::InvalidParams { reason: reason.into() }
    }

    pub fn query(reason :impl Into<String>) -> Self {
        Error::InvalidQuery { reason: reason.into() }
    }

    pub fn conflict(reason :impl Into<String>) -> Self {
        Error::ConflictingQuery { reason: reason.into() }
    }

    pub fn infeasible(reason :impl Into<String>) -> Self {
        Error::InfeasibleByConstruction { reason: reason.into() }
    }
}
