//! Core types for the BLF engine
//!
//! This module defines the error taxonomy shared by every stage of the engine
//! and the small enums used by the file-level API.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, BlfError>;

/// Errors that can occur while reading or writing a log file
#[derive(Debug, thiserror::Error)]
pub enum BlfError {
    /// Bad signature, or a header size/version outside the two known layouts
    #[error("Corrupt object header: {0}")]
    CorruptHeader(String),

    /// A record claims more bytes than remain in its buffer or stream
    #[error("Truncated record (object type {object_type}): needed {needed} bytes, {available} available")]
    TruncatedRecord {
        object_type: u32,
        needed: usize,
        available: usize,
    },

    /// Inflated container length differs from the length declared on disk
    #[error("Container size mismatch: declared {declared} bytes, inflated {actual} bytes")]
    DecompressionSizeMismatch { declared: u64, actual: u64 },

    #[error("Invalid configuration: {0}")]
    ConfigurationError(String),

    /// Cooperative shutdown, not a failure
    #[error("Operation aborted")]
    Aborted,

    #[error("Invalid file header: {0}")]
    InvalidFileHeader(String),

    #[error("Unsupported compression method: {0}")]
    UnsupportedCompression(u8),

    #[error("Record too large to encode: {0}")]
    RecordTooLarge(String),

    #[error("File is not open for {0}")]
    WrongMode(OpenMode),

    #[error("File is not open")]
    NotOpen,

    #[error("Invalid seek to offset {0}")]
    InvalidSeek(u64),

    #[error("Worker thread '{0}' panicked")]
    WorkerPanicked(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl BlfError {
    /// True for errors raised by cooperative shutdown rather than a fault
    pub fn is_aborted(&self) -> bool {
        matches!(self, BlfError::Aborted)
    }
}

/// Direction a log file is opened in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenMode {
    Read,
    Write,
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenMode::Read => write!(f, "reading"),
            OpenMode::Write => write!(f, "writing"),
        }
    }
}

/// Conventional stream status flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStatus {
    /// End of data reached
    pub eof: bool,
    /// Last operation could not be fully satisfied
    pub fail: bool,
}

impl StreamStatus {
    pub fn good(&self) -> bool {
        !self.eof && !self.fail
    }
}
