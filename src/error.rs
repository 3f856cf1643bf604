//! Extraction errors.
//!
//! Every variant except `Config` is fatal to a run. Records that were already
//! handed to the sink stay valid; the pipeline flushes the sink before the
//! error is returned.

use std::io;

/// Errors that can occur while extracting articles from a dump.
#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("Corrupt archive: {message}")]
    CorruptArchive { message: String },

    #[error("Malformed dump structure at byte {position}: {message}")]
    MalformedStructure { position: u64, message: String },

    #[error("Failed to write article: {0}")]
    Sink(#[source] io::Error),

    #[error("Failed to read dump: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ExtractError {
    pub(crate) fn malformed(position: u64, message: impl Into<String>) -> Self {
        Self::MalformedStructure {
            position,
            message: message.into(),
        }
    }

    /// Whether the error came from the decompression layer.
    pub fn is_corrupt_archive(&self) -> bool {
        matches!(self, Self::CorruptArchive { .. })
    }

    /// Whether the error came from the XML structure of the dump.
    pub fn is_malformed_structure(&self) -> bool {
        matches!(self, Self::MalformedStructure { .. })
    }
}

/// Result alias used throughout the library.
pub type ExtractResult<T> = Result<T, ExtractError>;
