//! Error type shared by the option store, the config reader and the JNI bridge.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A key or value that can never be stored (null, empty, or containing
    /// characters the config format cannot represent).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("keys and values differ in length ({keys} keys, {values} values)")]
    LengthMismatch { keys: usize, values: usize },

    /// A string could not be converted across the JNI boundary.
    #[error("string marshaling failed: {0}")]
    Marshal(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("an option bridge is already installed")]
    AlreadyInstalled,
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    /// True for errors caused by the caller's arguments rather than by the
    /// environment. These surface in Java as `IllegalArgumentException`.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument(_) | Error::LengthMismatch { .. })
    }
}
