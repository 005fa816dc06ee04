//! Error types for the catalog library

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for catalog and cache operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed line in a catalog index
    #[error("Invalid catalog line {line}: {message}")]
    Parse {
        /// 1-based line number (0 when parsing a lone line)
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// Catalog index file could not be loaded
    #[error("Failed to load catalog {}: {source}", path.display())]
    Index {
        /// Path to the `.cat` file
        path: PathBuf,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Entry path is unusable as a cache location
    #[error("Invalid entry path {path:?}: {reason}")]
    InvalidPath {
        /// Path as written in the index
        path: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// Missing archive files or unusable cache directory
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Read or write failure while extracting one entry
    #[error("Failed to extract {entry}: {source}")]
    Extraction {
        /// Entry path inside the archive
        entry: String,
        /// Underlying I/O failure
        #[source]
        source: io::Error,
    },

    /// Blob is shorter than the sum of its index entries
    #[error("Blob {} too short: index requires {expected} bytes, found {actual}", blob.display())]
    BlobTooShort {
        /// Path to the `.dat` file
        blob: PathBuf,
        /// Bytes required by the index
        expected: u64,
        /// Actual blob length
        actual: u64,
    },

    /// Extracted bytes do not match the hash recorded in the index
    #[error("Hash mismatch for {entry}: expected {expected}, got {actual}")]
    HashMismatch {
        /// Entry path inside the archive
        entry: String,
        /// Hash from the index
        expected: String,
        /// Hash of the extracted bytes
        actual: String,
    },
}

impl Error {
    /// Create a new Parse error
    pub fn parse<S: Into<String>>(line: usize, message: S) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    /// Create a new Configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Wrap an I/O failure with the entry being extracted
    pub fn extraction<S: Into<String>>(entry: S, source: io::Error) -> Self {
        Error::Extraction {
            entry: entry.into(),
            source,
        }
    }

    /// Check if this error indicates a corrupted archive
    pub fn is_corruption(&self) -> bool {
        match self {
            Error::Parse { .. }
            | Error::InvalidPath { .. }
            | Error::BlobTooShort { .. }
            | Error::HashMismatch { .. } => true,
            Error::Index { source, .. } => source.is_corruption(),
            _ => false,
        }
    }

    /// Check if this error comes from the environment rather than the data
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
