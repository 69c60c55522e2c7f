//! Unified error types for kennel.
//!
//! Every failure the data layer can observe collapses into [`Error`]. The
//! rendering side never shows the raw message: it asks for
//! [`Error::friendly_message`], which only depends on the [`ErrorKind`].

use std::time::Duration;

use tokio_rusqlite::rusqlite;

/// Unified error types for the kennel data layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Network call exceeded its bound.
    #[error("FETCH_TIMEOUT: request exceeded {0:?}")]
    Timeout(Duration),

    /// Non-2xx response or an application-level failure status.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// No network and no usable cache.
    #[error("OFFLINE: {0}")]
    Offline(String),

    /// Transport failure before any response was received.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Payload did not have the expected shape.
    #[error("MALFORMED_DATA: {0}")]
    MalformedData(String),

    /// Database operation failed.
    #[error("STORAGE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// A value could not be serialized for storage.
    #[error("STORAGE_ERROR: serialization failed: {0}")]
    Serialization(String),

    /// Migration failed to apply.
    #[error("STORAGE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A query parameter name outside the declared set.
    #[error("INVALID_PARAM: {0}")]
    UnknownParam(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),
}

/// Coarse classification used to pick user-facing wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Timeout,
    Http,
    Offline,
    Network,
    MalformedData,
    Storage,
    Invalid,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Timeout(_) => ErrorKind::Timeout,
            Error::HttpError(_) => ErrorKind::Http,
            Error::Offline(_) => ErrorKind::Offline,
            Error::Network(_) => ErrorKind::Network,
            Error::MalformedData(_) => ErrorKind::MalformedData,
            Error::Database(_) | Error::Serialization(_) | Error::MigrationFailed(_) => ErrorKind::Storage,
            Error::UnknownParam(_) | Error::InvalidUrl(_) => ErrorKind::Invalid,
        }
    }

    /// Message suitable for an error view, derived from the kind only.
    pub fn friendly_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Offline => "You're offline and no cached data is available.",
            ErrorKind::Timeout => "The request took too long to complete. Please try again.",
            ErrorKind::Network => "Unable to reach the server. Check your connection and try again.",
            ErrorKind::Http | ErrorKind::MalformedData => {
                "The server returned an unexpected response. Please try again later."
            }
            ErrorKind::Storage | ErrorKind::Invalid => "Something went wrong. Please try again.",
        }
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
