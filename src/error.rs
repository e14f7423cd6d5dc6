//! Error types for the linkage engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors spanning the core (§7) and the ambient transport/persistence
/// layers around it.
#[derive(Error, Debug)]
pub enum Error {
    /// A raw PII field failed normalization (bad birthdate, unparseable
    /// phone, etc). Carries the offending field name.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An uploaded `AlgorithmConfig` failed validation (§4.8).
    #[error("invalid algorithm: {0}")]
    InvalidAlgorithm(String),

    /// The normalized-and-cleaned record has nothing left to compare or
    /// persist.
    #[error("record is empty after normalization and cleaning")]
    EmptyRecord,

    /// The repository could not be reached or a transient failure occurred.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A uniqueness or state constraint was violated (e.g. re-uploading an
    /// existing algorithm label).
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("connection pool error: {0}")]
    Pool(String),

    #[error("api error: {0}")]
    Api(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn invalid_algorithm(msg: impl Into<String>) -> Self {
        Error::InvalidAlgorithm(msg.into())
    }

    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Error::StorageUnavailable(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Error::Internal(msg.into())
    }
}

impl From<diesel::r2d2::Error> for Error {
    fn from(e: diesel::r2d2::Error) -> Self {
        Error::Pool(e.to_string())
    }
}
