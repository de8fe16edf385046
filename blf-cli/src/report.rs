//! Report generation
//!
//! Collects what `info` and `dump` print, in a form that renders either as
//! aligned text or as JSON.

use anyhow::{Context, Result};
use blf_engine::{BlfFile, EngineConfig, FileStatistics, OpenMode, Record, RestorePoint};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Everything `info` knows about one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub statistics: FileStatistics,
    pub restore_points: Vec<RestorePoint>,
    /// Records per object type name, when a census was requested
    #[serde(skip_serializing_if = "Option::is_none")]
    pub census: Option<BTreeMap<String, u64>>,
}

/// One line of `dump`
#[derive(Debug, Clone, Serialize)]
pub struct RecordLine {
    pub index: u64,
    pub object_type: u32,
    pub name: &'static str,
    pub timestamp_ns: Option<u64>,
    pub size: usize,
}

impl RecordLine {
    pub fn new(index: u64, record: &Record) -> Self {
        Self {
            index,
            object_type: record.object_type(),
            name: record.name(),
            timestamp_ns: record.timestamp_ns(),
            size: record.calculate_size(),
        }
    }

    pub fn to_text(&self) -> String {
        let time = match self.timestamp_ns {
            Some(ns) => format!("{:>14.6}", ns as f64 / 1e9),
            None => format!("{:>14}", "-"),
        };
        format!(
            "{:>8}  {}  {:>3}  {:<28} {:>6} bytes",
            self.index, time, self.object_type, self.name, self.size
        )
    }
}

/// Census key: known types by name, unknown ones by tag
pub fn census_key(record: &Record) -> String {
    match record {
        Record::Unknown(u) => format!("Unknown({})", u.object_type()),
        known => known.name().to_string(),
    }
}

/// Read the header and index of `path`, and optionally every record
pub fn inspect(path: &Path, config: &EngineConfig, census: bool) -> Result<FileReport> {
    let mut file = BlfFile::open_with(path, OpenMode::Read, config.clone())
        .with_context(|| format!("Failed to open {:?}", path))?;

    let counts = if census {
        let mut counts = BTreeMap::new();
        while let Some(record) = file
            .read()
            .with_context(|| format!("Failed to read {:?}", path))?
        {
            *counts.entry(census_key(&record)).or_insert(0u64) += 1;
        }
        Some(counts)
    } else {
        None
    };

    let report = FileReport {
        path: path.to_path_buf(),
        statistics: file.statistics().clone(),
        restore_points: file.restore_points().to_vec(),
        census: counts,
    };
    file.close()
        .with_context(|| format!("Failed to close {:?}", path))?;
    Ok(report)
}

fn format_time(time: Option<chrono::NaiveDateTime>) -> String {
    time.map(|t| t.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
        .unwrap_or_else(|| "-".to_string())
}

impl FileReport {
    pub fn to_text(&self, show_restore_points: bool) -> String {
        let stats = &self.statistics;
        let mut out = String::new();
        out.push_str(&format!("═══ {} ═══\n", self.path.display()));
        out.push_str(&format!("  Objects:           {}\n", stats.object_count));
        out.push_str(&format!("  File size:         {} bytes\n", stats.file_size));
        out.push_str(&format!(
            "  Uncompressed:      {} bytes\n",
            stats.uncompressed_file_size
        ));
        let ratio = stats
            .compression_ratio()
            .map(|r| format!("{:.1}%", r * 100.0))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "  Compression:       level {} ({} of original)\n",
            stats.compression_level, ratio
        ));
        out.push_str(&format!(
            "  Application:       id {} v{}.{} build {}\n",
            stats.application_id,
            stats.application_major,
            stats.application_minor,
            stats.application_build
        ));
        out.push_str(&format!(
            "  Measurement start: {}\n",
            format_time(stats.measurement_start())
        ));
        out.push_str(&format!(
            "  Last object:       {}\n",
            format_time(stats.last_object())
        ));
        out.push_str(&format!(
            "  Restore points:    {}\n",
            self.restore_points.len()
        ));

        if show_restore_points {
            for (i, point) in self.restore_points.iter().enumerate() {
                out.push_str(&format!(
                    "    #{:<4} logical {:>12}  file {:>12}\n",
                    i, point.logical_offset, point.file_offset
                ));
            }
        }

        if let Some(census) = &self.census {
            out.push_str("  Object types:\n");
            for (name, count) in census {
                out.push_str(&format!("    {:<28} {:>10}\n", name, count));
            }
        }
        out
    }
}
