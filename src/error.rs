use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Broker file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No profile has been stored yet: {0}")]
    NotFound(PathBuf),

    #[error(
        "Profile exists at {payload} but its key file {key} is missing; \
         restore the key from backup or delete the profile and collect it again"
    )]
    KeyMissing { payload: PathBuf, key: PathBuf },

    #[error("Decryption error: {0}")]
    Crypto(String),

    #[error(
        "Cannot write {path}: {source}. Check that you own the file and its directory, \
         or export your brokers to a writable location"
    )]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No quotes available")]
    EmptyCache,

    #[error("Broker not found: {0}")]
    UnknownBroker(usize),

    #[error("Opt-out link for '{0}' has not been opened yet")]
    NotPresented(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Classify a write failure, pulling permission problems out into their
    /// own variant so callers can show remediation text.
    pub fn from_write(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            AppError::PermissionDenied {
                path: path.into(),
                source: err,
            }
        } else {
            AppError::Io(err)
        }
    }
}
