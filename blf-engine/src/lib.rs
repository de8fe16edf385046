//! BLF Engine Library
//!
//! Reads and writes binary bus log files: streams of tagged records (CAN,
//! LIN, FlexRay, MOST, Ethernet, ...) stored in individually compressed
//! containers behind a statistics header, with a restore-point index for
//! seeking.
//!
//! # Architecture
//!
//! Opening a file starts a two-stage pipeline on dedicated threads:
//!
//! - Write: caller -> record queue -> encode -> uncompressed stream -> compress -> disk
//! - Read: disk -> decompress -> uncompressed stream -> decode -> record queue -> caller
//!
//! Both the record queue and the uncompressed stream are bounded, so a slow
//! consumer throttles its producer instead of growing memory. Records are
//! stored byte-exact: unknown object types and trailing bytes the codec does
//! not understand are carried through unchanged.
//!
//! The library does NOT interpret bus traffic (no signal decoding, no
//! database lookups); that belongs to the application.
//!
//! # Example Usage
//!
//! ```no_run
//! use blf_engine::{BlfFile, EngineConfig, OpenMode, Record};
//! use blf_engine::records::CanMessage;
//!
//! let config = EngineConfig::new()
//!     .with_container_size(64 * 1024)
//!     .with_compression_level(6);
//!
//! let mut out = BlfFile::open_with("trace.blf", OpenMode::Write, config)?;
//! out.write(Record::CanMessage(CanMessage {
//!     id: 0x123,
//!     dlc: 2,
//!     data: [0xAB, 0xCD, 0, 0, 0, 0, 0, 0],
//!     ..Default::default()
//! }))?;
//! out.close()?;
//!
//! let mut input = BlfFile::open("trace.blf", OpenMode::Read)?;
//! while let Some(record) = input.read()? {
//!     println!("{} {:?}", record.name(), record.timestamp_ns());
//! }
//! # Ok::<(), blf_engine::BlfError>(())
//! ```

// Public modules
pub mod config;
pub mod container;
pub mod file;
pub mod pipeline;
pub mod queue;
pub mod records;
pub mod store;
pub mod stream;
pub mod sync;
pub mod types;

// Re-export main types for convenience
pub use config::{EngineConfig, Strictness};
pub use file::BlfFile;
pub use records::{ObjectType, Record, UnknownObject};
pub use store::{FileStatistics, RestorePoint};
pub use types::{BlfError, OpenMode, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: defaults are usable as-is
        assert!(EngineConfig::default().validate().is_ok());
        assert_eq!(Record::new(ObjectType::CanMessage).object_type(), 1);
        assert!(!VERSION.is_empty());
    }
}
