//! Compressed store: the on-disk file
//!
//! The store is the only component that touches the file system. Layout:
//!
//! ```text
//! FileStatistics (144 bytes)
//! CompressedBlock * n
//! restore-point index (optional)
//! ```
//!
//! [`StoreWriter`] writes a placeholder header on creation and rewrites it on
//! [`StoreWriter::finish`]. [`StoreReader`] loads the header and the index
//! once at open and then yields blocks sequentially.

pub mod restore;
pub mod statistics;

pub use restore::RestorePoint;
pub use statistics::{FileStatistics, SystemTime};

use crate::config::EngineConfig;
use crate::container::{CompressedBlock, Container};
use crate::types::{BlfError, Result};
use std::fs::File;
use std::io::{BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::Path;

/// Sink for sealed containers
pub struct StoreWriter {
    file: BufWriter<File>,
    /// Next write offset in the file
    position: u64,
    compression_level: u32,
    restore_point_interval: u32,
    restore_points: Vec<RestorePoint>,
    containers: u64,
    uncompressed_size: u64,
}

impl StoreWriter {
    /// Create (or truncate) `path` and write a placeholder header
    pub fn create(path: &Path, config: &EngineConfig) -> Result<Self> {
        let mut file = BufWriter::new(File::create(path)?);
        let placeholder = FileStatistics::new(config.compression_level);
        placeholder.write_to(&mut file)?;
        Ok(Self {
            file,
            position: statistics::FILE_STATISTICS_SIZE as u64,
            compression_level: config.compression_level,
            restore_point_interval: config.restore_point_interval,
            restore_points: Vec::new(),
            containers: 0,
            uncompressed_size: 0,
        })
    }

    /// Compress and append one container
    pub fn write_container(&mut self, container: &Container) -> Result<()> {
        if self.restore_point_interval > 0
            && self.containers % self.restore_point_interval as u64 == 0
        {
            self.restore_points
                .push(RestorePoint::new(container.file_position(), self.position));
        }

        let block = container.compress(self.compression_level)?;
        block.write_to(&mut self.file)?;
        log::debug!(
            "Container {} at logical {}: {} -> {} bytes",
            self.containers,
            container.file_position(),
            container.size(),
            block.data.len()
        );

        self.position += block.disk_size();
        self.uncompressed_size += container.size() as u64;
        self.containers += 1;
        Ok(())
    }

    pub fn containers_written(&self) -> u64 {
        self.containers
    }

    pub fn restore_points(&self) -> &[RestorePoint] {
        &self.restore_points
    }

    /// Append the restore-point index and rewrite the header.
    ///
    /// `statistics` supplies the application metadata; sizes, compression
    /// level and the index offset are filled in here.
    pub fn finish(mut self, mut statistics: FileStatistics) -> Result<(FileStatistics, Vec<RestorePoint>)> {
        statistics.restore_points_offset = 0;
        if !self.restore_points.is_empty() {
            statistics.restore_points_offset = self.position;
            restore::write_index(&mut self.file, &self.restore_points)?;
            self.position += restore::index_size(&self.restore_points);
        }
        statistics.statistics_size = statistics::FILE_STATISTICS_SIZE;
        statistics.compression_level = self.compression_level.min(u8::MAX as u32) as u8;
        statistics.file_size = self.position;
        statistics.uncompressed_file_size = self.uncompressed_size;

        self.file.seek(SeekFrom::Start(0))?;
        statistics.write_to(&mut self.file)?;
        self.file.flush()?;
        self.file.get_ref().sync_all()?;

        log::info!(
            "Closed store: {} containers, {} bytes on disk, {} uncompressed, {} restore points",
            self.containers,
            statistics.file_size,
            statistics.uncompressed_file_size,
            self.restore_points.len()
        );
        Ok((statistics, self.restore_points))
    }
}

/// Source of compressed blocks
pub struct StoreReader {
    file: BufReader<File>,
    statistics: FileStatistics,
    restore_points: Vec<RestorePoint>,
    position: u64,
    /// Offset where block data ends (the index, or end of file)
    data_end: u64,
}

impl StoreReader {
    /// Open `path`, validate the header and load the restore-point index
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let file_len = file.metadata()?.len();
        let mut file = BufReader::new(file);
        let statistics = FileStatistics::read_from(&mut file)?;
        let data_start = statistics.statistics_size as u64;

        let mut restore_points = Vec::new();
        let mut data_end = file_len;
        if statistics.restore_points_offset != 0 {
            let offset = statistics.restore_points_offset;
            if offset < data_start || offset >= file_len {
                return Err(BlfError::InvalidFileHeader(format!(
                    "restore point index at {} is outside the file ({} bytes)",
                    offset, file_len
                )));
            }
            file.seek(SeekFrom::Start(offset))?;
            restore_points = restore::read_index(&mut file)?;
            data_end = offset;
            file.seek(SeekFrom::Start(data_start))?;
        }

        log::info!(
            "Opened store {}: {} objects, {} bytes uncompressed, {} restore points",
            path.display(),
            statistics.object_count,
            statistics.uncompressed_file_size,
            restore_points.len()
        );
        Ok(Self {
            file,
            statistics,
            restore_points,
            position: data_start,
            data_end,
        })
    }

    pub fn statistics(&self) -> &FileStatistics {
        &self.statistics
    }

    pub fn restore_points(&self) -> &[RestorePoint] {
        &self.restore_points
    }

    /// Continue reading at the container a restore point refers to
    pub fn seek_to(&mut self, point: &RestorePoint) -> Result<()> {
        if point.file_offset < self.statistics.statistics_size as u64 || point.file_offset >= self.data_end {
            return Err(BlfError::InvalidSeek(point.file_offset));
        }
        self.file.seek(SeekFrom::Start(point.file_offset))?;
        self.position = point.file_offset;
        Ok(())
    }

    /// Next block, or `None` at the end of the container data
    pub fn read_block(&mut self) -> Result<Option<CompressedBlock>> {
        if self.position >= self.data_end {
            return Ok(None);
        }
        let block = match CompressedBlock::read_from(&mut self.file)? {
            Some(block) => block,
            None => return Ok(None),
        };
        self.position += block.disk_size();
        if self.position > self.data_end {
            return Err(BlfError::InvalidFileHeader(format!(
                "container block overlaps the restore point index at {}",
                self.data_end
            )));
        }
        Ok(Some(block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn container(position: u64, fill: u8, len: usize) -> Container {
        Container::from_bytes(position, vec![fill; len])
    }

    #[test]
    fn test_store_layout_and_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.blf");
        let config = EngineConfig::new()
            .with_compression_level(6)
            .with_restore_point_interval(2);

        let mut writer = StoreWriter::create(&path, &config).unwrap();
        for i in 0..5u8 {
            writer.write_container(&container(i as u64 * 100, i, 100)).unwrap();
        }
        let (stats, points) = writer.finish(FileStatistics::new(6)).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], RestorePoint::new(0, 144));
        assert_eq!(points[1].logical_offset, 200);
        assert_eq!(points[2].logical_offset, 400);
        assert_eq!(stats.uncompressed_file_size, 500);
        assert_eq!(stats.file_size, std::fs::metadata(&path).unwrap().len());

        let mut reader = StoreReader::open(&path).unwrap();
        assert_eq!(reader.statistics(), &stats);
        assert_eq!(reader.restore_points(), points.as_slice());

        let mut inflated = Vec::new();
        while let Some(block) = reader.read_block().unwrap() {
            inflated.push(block.decompress().unwrap());
        }
        assert_eq!(inflated.len(), 5);
        assert_eq!(inflated[3], vec![3; 100]);
    }

    #[test]
    fn test_seek_to_restore_point() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("seek.blf");
        let config = EngineConfig::new().with_restore_point_interval(1);

        let mut writer = StoreWriter::create(&path, &config).unwrap();
        for i in 0..4u8 {
            writer.write_container(&container(i as u64 * 10, i, 10)).unwrap();
        }
        let (_, points) = writer.finish(FileStatistics::default()).unwrap();

        let mut reader = StoreReader::open(&path).unwrap();
        reader.seek_to(&points[2]).unwrap();
        let block = reader.read_block().unwrap().unwrap();
        assert_eq!(block.decompress().unwrap(), vec![2; 10]);
        assert!(reader.read_block().unwrap().is_some());
        assert!(reader.read_block().unwrap().is_none());

        let bogus = RestorePoint::new(0, 1 << 40);
        assert!(matches!(reader.seek_to(&bogus), Err(BlfError::InvalidSeek(_))));
    }

    #[test]
    fn test_store_without_index() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("plain.blf");
        let config = EngineConfig::new().with_restore_point_interval(0);

        let mut writer = StoreWriter::create(&path, &config).unwrap();
        writer.write_container(&container(0, 9, 32)).unwrap();
        let (stats, points) = writer.finish(FileStatistics::default()).unwrap();
        assert!(points.is_empty());
        assert_eq!(stats.restore_points_offset, 0);

        let mut reader = StoreReader::open(&path).unwrap();
        assert!(reader.read_block().unwrap().is_some());
        assert!(reader.read_block().unwrap().is_none());
    }

    #[test]
    fn test_not_a_log_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("junk.bin");
        std::fs::write(&path, vec![0u8; 200]).unwrap();
        assert!(matches!(
            StoreReader::open(&path),
            Err(BlfError::InvalidFileHeader(_))
        ));
    }
}
