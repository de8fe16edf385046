//! Configuration loading and parsing

use anyhow::{Context, Result};
use blf_engine::{EngineConfig, Strictness};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Application configuration (loaded from an optional config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Per-type record counts in `info`
    #[serde(default)]
    pub census: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl AppConfig {
    /// Apply command-line flags on top of file values
    pub fn with_overrides(mut self, json: bool, lenient: bool) -> Self {
        if json {
            self.output.format = OutputFormat::Json;
        }
        if lenient {
            self.engine.strictness = Strictness::Lenient;
        }
        self
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config
        .engine
        .validate()
        .with_context(|| format!("Invalid [engine] section in {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [engine]
            container_size = 65536
            buffer_size = 262144
            compression_level = 9
            strictness = "lenient"

            [output]
            format = "json"
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.engine.container_size, 65536);
        assert_eq!(config.engine.compression_level, 9);
        assert_eq!(config.engine.queue_capacity, EngineConfig::default().queue_capacity);
        assert!(config.engine.is_lenient());
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.engine.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.engine, EngineConfig::default());
        assert_eq!(config.output.format, OutputFormat::Text);

        let config = config.with_overrides(true, true);
        assert_eq!(config.output.format, OutputFormat::Json);
        assert_eq!(config.engine.strictness, Strictness::Lenient);
    }

    #[test]
    fn test_invalid_engine_section_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[engine]\ncompression_level = 12\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("compression"));
    }
}
