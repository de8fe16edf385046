//! Engine configuration types
//!
//! One immutable [`EngineConfig`] value is built before a file is opened and
//! handed to every component of the pipeline. Nothing is read from global
//! state after `open`.

use crate::types::{BlfError, Result};
use serde::{Deserialize, Serialize};

/// Highest supported compression level ("best compression")
pub const MAX_COMPRESSION_LEVEL: u32 = 9;

/// Default target size of one container in bytes
pub const DEFAULT_CONTAINER_SIZE: usize = 0x2_0000;

/// How the read pipeline treats malformed records
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Any corrupt header fails the open file
    #[default]
    Strict,
    /// Skip to the next valid header; pass short known records through as unknown
    Lenient,
}

/// Configuration for one open log file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Target size of one uncompressed container (bytes)
    #[serde(default = "default_container_size")]
    pub container_size: usize,

    /// 0 stores containers raw, 1..=9 selects the zlib level
    #[serde(default = "default_compression_level")]
    pub compression_level: u32,

    /// Unread bytes the uncompressed stream may hold before writers block
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Records held by the queue between the caller and the codec thread
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Containers between two restore points (0 = no restore-point index)
    #[serde(default = "default_restore_point_interval")]
    pub restore_point_interval: u32,

    #[serde(default)]
    pub strictness: Strictness,
}

fn default_container_size() -> usize {
    DEFAULT_CONTAINER_SIZE
}

fn default_compression_level() -> u32 {
    1
}

fn default_buffer_size() -> usize {
    4 * DEFAULT_CONTAINER_SIZE
}

fn default_queue_capacity() -> usize {
    10
}

fn default_restore_point_interval() -> u32 {
    16
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            container_size: default_container_size(),
            compression_level: default_compression_level(),
            buffer_size: default_buffer_size(),
            queue_capacity: default_queue_capacity(),
            restore_point_interval: default_restore_point_interval(),
            strictness: Strictness::default(),
        }
    }
}

impl EngineConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the container target size.
    ///
    /// The buffer grows along with it so that it keeps holding four
    /// containers; call [`with_buffer_size`](Self::with_buffer_size)
    /// afterwards to pick a different bound.
    pub fn with_container_size(mut self, bytes: usize) -> Self {
        self.container_size = bytes;
        self.buffer_size = self.buffer_size.max(bytes.saturating_mul(4));
        self
    }

    /// Builder method: set the compression level (0..=9)
    pub fn with_compression_level(mut self, level: u32) -> Self {
        self.compression_level = level;
        self
    }

    /// Builder method: set the uncompressed stream buffer size
    pub fn with_buffer_size(mut self, bytes: usize) -> Self {
        self.buffer_size = bytes;
        self
    }

    /// Builder method: set the record queue capacity
    pub fn with_queue_capacity(mut self, records: usize) -> Self {
        self.queue_capacity = records;
        self
    }

    /// Builder method: set the restore-point interval in containers
    pub fn with_restore_point_interval(mut self, containers: u32) -> Self {
        self.restore_point_interval = containers;
        self
    }

    /// Builder method: set the malformed-record policy
    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Check the configuration before any thread is started.
    ///
    /// A buffer smaller than one container would leave the writer blocked on a
    /// container the compressor can never receive, so it is rejected here.
    pub fn validate(&self) -> Result<()> {
        if self.container_size == 0 {
            return Err(BlfError::ConfigurationError(
                "container size must be greater than zero".to_string(),
            ));
        }
        if u32::try_from(self.container_size).is_err() {
            return Err(BlfError::ConfigurationError(format!(
                "container size {} does not fit the on-disk u32 length",
                self.container_size
            )));
        }
        if self.buffer_size < self.container_size {
            return Err(BlfError::ConfigurationError(format!(
                "buffer size {} is smaller than one container ({} bytes)",
                self.buffer_size, self.container_size
            )));
        }
        if self.compression_level > MAX_COMPRESSION_LEVEL {
            return Err(BlfError::ConfigurationError(format!(
                "compression level {} exceeds maximum {}",
                self.compression_level, MAX_COMPRESSION_LEVEL
            )));
        }
        if self.queue_capacity == 0 {
            return Err(BlfError::ConfigurationError(
                "queue capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn is_lenient(&self) -> bool {
        self.strictness == Strictness::Lenient
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_builder() {
        let config = EngineConfig::new()
            .with_container_size(64 * 1024)
            .with_compression_level(6)
            .with_queue_capacity(32)
            .with_restore_point_interval(4)
            .with_strictness(Strictness::Lenient);

        assert_eq!(config.container_size, 64 * 1024);
        assert_eq!(config.compression_level, 6);
        assert_eq!(config.queue_capacity, 32);
        assert_eq!(config.restore_point_interval, 4);
        assert!(config.is_lenient());
        assert!(config.buffer_size >= config.container_size);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.container_size, 131072);
        assert_eq!(config.buffer_size, 4 * 131072);
        assert_eq!(config.strictness, Strictness::Strict);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_small_buffer() {
        let config = EngineConfig::new()
            .with_container_size(4096)
            .with_buffer_size(1024);
        assert!(matches!(
            config.validate(),
            Err(BlfError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_rejects_bad_level_and_capacity() {
        let config = EngineConfig::new().with_compression_level(10);
        assert!(config.validate().is_err());

        let config = EngineConfig::new().with_queue_capacity(0);
        assert!(config.validate().is_err());

        let config = EngineConfig::new().with_container_size(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"compression_level": 0, "strictness": "lenient"}"#).unwrap();
        assert_eq!(config.compression_level, 0);
        assert_eq!(config.container_size, DEFAULT_CONTAINER_SIZE);
        assert_eq!(config.strictness, Strictness::Lenient);
    }
}
