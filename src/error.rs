use std::path::PathBuf;
use thiserror::Error as ThisError;

///
/// EtlError
///

#[derive(Debug, ThisError)]
pub enum EtlError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("building HTTP client")]
    HttpClient(#[source] reqwest::Error),

    #[error("GET {url} failed")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("page structure mismatch: {0}")]
    Structure(String),

    #[error("malformed GDP value {value:?} for {country}")]
    Numeric { country: String, value: String },

    #[error("writing {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error on {}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("store error while {action}")]
    Store {
        action: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("query failed: {sql}")]
    Query {
        sql: String,
        #[source]
        source: duckdb::Error,
    },

    #[error("appending to progress log {}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

///
/// FailureKind
/// coarse classification of where a run stopped
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FailureKind {
    Config,
    Network,
    Structure,
    Numeric,
    Persistence,
    Query,
    Log,
}

/// What the pipeline does when a stage fails.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Policy {
    Abort,
}

impl FailureKind {
    /// Every failure aborts the run; nothing is retried.
    pub const fn policy(self) -> Policy {
        Policy::Abort
    }
}

impl EtlError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Config(_) | Self::HttpClient(_) => FailureKind::Config,
            Self::Network { .. } => FailureKind::Network,
            Self::Structure(_) => FailureKind::Structure,
            Self::Numeric { .. } => FailureKind::Numeric,
            Self::Io { .. } | Self::Csv { .. } | Self::Store { .. } => FailureKind::Persistence,
            Self::Query { .. } => FailureKind::Query,
            Self::Log { .. } => FailureKind::Log,
        }
    }

    pub(crate) fn store(action: impl Into<String>, source: duckdb::Error) -> Self {
        Self::Store {
            action: action.into(),
            source,
        }
    }
}

pub type Result<T, E = EtlError> = std::result::Result<T, E>;
