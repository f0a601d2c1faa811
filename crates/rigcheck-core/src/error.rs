use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RigcheckError {
    #[error("cannot read town root {}: {source}", path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("record store unavailable at {}: {reason}", location.display())]
    StoreUnavailable { location: PathBuf, reason: String },

    #[error("record not found: {0}")]
    RecordNotFound(String),

    #[error("unable to parse timestamp: {0}")]
    UnparseableTimestamp(String),

    #[error("invalid duration '{0}': expected forms like 1h, 90m, 1h30m, 45s")]
    InvalidDuration(String),

    #[error("invalid threshold '{0}': duration must be > 0")]
    InvalidThreshold(String),

    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, RigcheckError>;
