use thiserror::Error;

pub type Result<T, E = RoadwatchError> = std::result::Result<T, E>;

/// Unified error type covering common failure scenarios across subsystems.
#[derive(Debug, Error)]
pub enum RoadwatchError {
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Raised by a data source; the message is shown to the user verbatim.
    #[error("{0}")]
    FetchFailed(String),
    #[error("poller error: {0}")]
    Poller(String),
    #[error("preference store error: {0}")]
    Preferences(String),
    #[error("unknown sort key: {0}")]
    UnknownSortKey(String),
    #[error("invalid setting: {0}")]
    InvalidSetting(String),
    #[error("operational error: {0}")]
    Ops(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
