//! File-level API
//!
//! [`BlfFile`] is the only type an application needs. Opening a file starts
//! two worker threads for the chosen direction; the caller only ever touches
//! the bounded record queue through [`BlfFile::read`] and [`BlfFile::write`].
//!
//! Errors raised inside a worker are returned by the next `read`, `write` or
//! `close` call on the caller's thread.

use crate::config::EngineConfig;
use crate::pipeline::{self, EncodeSummary, ErrorSlot, Worker};
use crate::queue::{BoundedQueue, Dequeued};
use crate::records::Record;
use crate::store::{FileStatistics, RestorePoint, StoreReader, StoreWriter, SystemTime};
use crate::stream::UncompressedStream;
use crate::sync::AbortToken;
use crate::types::{BlfError, OpenMode, Result};
use std::path::{Path, PathBuf};

enum Pipeline {
    Write {
        queue: BoundedQueue<Record>,
        encoder: Worker<EncodeSummary>,
        compressor: Worker<StoreWriter>,
    },
    Read {
        queue: BoundedQueue<Record>,
        decompressor: Worker<u64>,
        decoder: Worker<u64>,
    },
}

/// An open log file
///
/// # Example
///
/// ```no_run
/// use blf_engine::{BlfFile, OpenMode};
///
/// let mut file = BlfFile::open("trace.blf", OpenMode::Read)?;
/// while let Some(record) = file.read()? {
///     println!("{} at {:?} ns", record.name(), record.timestamp_ns());
/// }
/// file.close()?;
/// # Ok::<(), blf_engine::BlfError>(())
/// ```
pub struct BlfFile {
    path: PathBuf,
    mode: OpenMode,
    config: EngineConfig,
    abort: AbortToken,
    errors: ErrorSlot,
    pipeline: Option<Pipeline>,
    statistics: FileStatistics,
    restore_points: Vec<RestorePoint>,
    object_count: u64,
    eof: bool,
    failed: bool,
}

impl BlfFile {
    /// Open with the default configuration
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode) -> Result<Self> {
        Self::open_with(path, mode, EngineConfig::default())
    }

    /// Open with an explicit configuration, validated here
    pub fn open_with<P: AsRef<Path>>(path: P, mode: OpenMode, config: EngineConfig) -> Result<Self> {
        match mode {
            OpenMode::Read => Self::start_reader(path.as_ref(), config, None),
            OpenMode::Write => Self::start_writer(path.as_ref(), config),
        }
    }

    /// Open for reading, starting at the container a restore point refers to
    pub fn open_at<P: AsRef<Path>>(path: P, config: EngineConfig, point: &RestorePoint) -> Result<Self> {
        Self::start_reader(path.as_ref(), config, Some(point))
    }

    fn start_reader(path: &Path, config: EngineConfig, point: Option<&RestorePoint>) -> Result<Self> {
        config.validate()?;
        let mut reader = StoreReader::open(path)?;
        let statistics = reader.statistics().clone();
        let restore_points = reader.restore_points().to_vec();

        let abort = AbortToken::new();
        let errors = ErrorSlot::new();
        let stream = UncompressedStream::new(&config, abort.clone());
        if let Some(point) = point {
            reader.seek_to(point)?;
            stream.start_at(point.logical_offset)?;
            log::info!(
                "Reading {} from logical offset {}",
                path.display(),
                point.logical_offset
            );
        }
        let queue = BoundedQueue::new(config.queue_capacity, abort.clone());

        let decompressor = {
            let stream = stream.clone();
            Worker::spawn("decompress", &abort, &errors, move || {
                pipeline::decompress_stage(reader, stream)
            })?
        };
        let decoder = {
            let (queue, abort_token, strictness) = (queue.clone(), abort.clone(), config.strictness);
            Worker::spawn("decode", &abort, &errors, move || {
                pipeline::decode_stage(stream, queue, abort_token, strictness)
            })
        };
        let decoder = match decoder {
            Ok(decoder) => decoder,
            Err(e) => {
                abort.abort();
                stop_worker(path, decompressor);
                return Err(e);
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            mode: OpenMode::Read,
            config,
            abort,
            errors,
            pipeline: Some(Pipeline::Read {
                queue,
                decompressor,
                decoder,
            }),
            statistics,
            restore_points,
            object_count: 0,
            eof: false,
            failed: false,
        })
    }

    fn start_writer(path: &Path, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let writer = StoreWriter::create(path, &config)?;

        let abort = AbortToken::new();
        let errors = ErrorSlot::new();
        let stream = UncompressedStream::new(&config, abort.clone());
        let queue = BoundedQueue::new(config.queue_capacity, abort.clone());

        let compressor = {
            let stream = stream.clone();
            Worker::spawn("compress", &abort, &errors, move || {
                pipeline::compress_stage(stream, writer)
            })?
        };
        let encoder = {
            let queue = queue.clone();
            Worker::spawn("encode", &abort, &errors, move || {
                pipeline::encode_stage(queue, stream)
            })
        };
        let encoder = match encoder {
            Ok(encoder) => encoder,
            Err(e) => {
                abort.abort();
                stop_worker(path, compressor);
                return Err(e);
            }
        };

        log::info!(
            "Writing {} (container {} bytes, level {}, buffer {} bytes)",
            path.display(),
            config.container_size,
            config.compression_level,
            config.buffer_size
        );
        Ok(Self {
            path: path.to_path_buf(),
            mode: OpenMode::Write,
            statistics: FileStatistics::new(config.compression_level),
            config,
            abort,
            errors,
            pipeline: Some(Pipeline::Write {
                queue,
                encoder,
                compressor,
            }),
            restore_points: Vec::new(),
            object_count: 0,
            eof: false,
            failed: false,
        })
    }

    /// Surface a worker error stored since the last call
    fn check_worker_error(&mut self) -> Result<()> {
        match self.errors.take() {
            Some(e) => {
                self.failed = true;
                Err(e)
            }
            None => Ok(()),
        }
    }

    fn abort_error(&mut self) -> BlfError {
        self.failed = true;
        self.errors.take().unwrap_or(BlfError::Aborted)
    }

    /// Next record, or `None` at the end of the file. Blocks while the
    /// decode stage has nothing ready.
    pub fn read(&mut self) -> Result<Option<Record>> {
        self.check_worker_error()?;
        let next = match &self.pipeline {
            Some(Pipeline::Read { queue, .. }) => queue.dequeue(),
            Some(Pipeline::Write { .. }) => return Err(BlfError::WrongMode(OpenMode::Read)),
            None => return Err(BlfError::NotOpen),
        };
        match next {
            Dequeued::Item(record) => {
                self.object_count += 1;
                Ok(Some(record))
            }
            Dequeued::EndOfStream => {
                self.eof = true;
                Ok(None)
            }
            Dequeued::Aborted => Err(self.abort_error()),
        }
    }

    /// Queue a record for writing; blocks only while the queue is full
    pub fn write(&mut self, record: Record) -> Result<()> {
        self.check_worker_error()?;
        let queued = match &self.pipeline {
            Some(Pipeline::Write { queue, .. }) => queue.enqueue(record),
            Some(Pipeline::Read { .. }) => return Err(BlfError::WrongMode(OpenMode::Write)),
            None => return Err(BlfError::NotOpen),
        };
        match queued {
            Ok(()) => {
                self.object_count += 1;
                Ok(())
            }
            Err(_) => Err(self.abort_error()),
        }
    }

    /// Drain and stop the workers, then finalize the file.
    ///
    /// In write mode every queued record is written, followed by the
    /// restore-point index and the final statistics header. In read mode
    /// the workers are aborted. Closing a closed file is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let pipeline = match self.pipeline.take() {
            Some(pipeline) => pipeline,
            None => return Ok(()),
        };
        let result = match pipeline {
            Pipeline::Write {
                queue,
                encoder,
                compressor,
            } => self.finish_writer(queue, encoder, compressor),
            Pipeline::Read {
                decompressor,
                decoder,
                ..
            } => {
                self.abort.abort();
                let decoded = decoder.join();
                let inflated = decompressor.join();
                decoded.and(inflated).map(|_| ())
            }
        };

        if let Some(e) = self.errors.take() {
            self.failed = true;
            return Err(e);
        }
        if result.is_err() {
            self.failed = true;
        }
        log::info!("Closed {} after {} objects", self.path.display(), self.object_count);
        result
    }

    fn finish_writer(
        &mut self,
        queue: BoundedQueue<Record>,
        encoder: Worker<EncodeSummary>,
        compressor: Worker<StoreWriter>,
    ) -> Result<()> {
        queue.close();
        let encoded = encoder.join();
        let compressed = compressor.join();
        let (summary, writer) = match (encoded?, compressed?) {
            (Some(summary), Some(writer)) => (summary, writer),
            _ => return Err(self.errors.take().unwrap_or(BlfError::Aborted)),
        };

        let mut statistics = self.statistics.clone();
        statistics.object_count = u32::try_from(summary.objects).unwrap_or(u32::MAX);
        if let (Some(start), Some(ts)) = (statistics.measurement_start(), summary.last_timestamp_ns) {
            let offset = chrono::Duration::nanoseconds(i64::try_from(ts).unwrap_or(i64::MAX));
            if let Some(last) = start.checked_add_signed(offset) {
                statistics.last_object_time = SystemTime::from_naive(&last);
            }
        }

        let (statistics, restore_points) = writer.finish(statistics)?;
        self.statistics = statistics;
        self.restore_points = restore_points;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.pipeline.is_some()
    }

    /// Open, not at the end and no error seen
    pub fn good(&self) -> bool {
        self.is_open() && !self.eof && !self.failed && !self.errors.has_error()
    }

    pub fn eof(&self) -> bool {
        self.eof
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Header as read at open, or as finalized by `close` in write mode
    pub fn statistics(&self) -> &FileStatistics {
        &self.statistics
    }

    /// Application metadata to store in the header of a file being written
    pub fn statistics_mut(&mut self) -> &mut FileStatistics {
        &mut self.statistics
    }

    /// Index loaded at open, or written by `close` in write mode
    pub fn restore_points(&self) -> &[RestorePoint] {
        &self.restore_points
    }

    /// Records read or written so far
    pub fn object_count(&self) -> u64 {
        self.object_count
    }

    /// Token that aborts every blocked call on this file from another thread
    pub fn abort_handle(&self) -> AbortToken {
        self.abort.clone()
    }
}

/// Join a stage that was started before a later start-up step failed
fn stop_worker<T: Send + 'static>(path: &Path, worker: Worker<T>) {
    if let Err(e) = worker.join() {
        log::warn!("Stopping a stage of {} failed: {}", path.display(), e);
    }
}

impl Drop for BlfFile {
    fn drop(&mut self) {
        if self.is_open() {
            if let Err(e) = self.close() {
                log::warn!("Closing {} on drop failed: {}", self.path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{AppText, CanMessage, ObjectHeader};
    use tempfile::TempDir;

    fn can(i: u32) -> Record {
        Record::CanMessage(CanMessage {
            header: ObjectHeader::with_time_ns(i as u64 * 1_000),
            channel: 1,
            dlc: 8,
            id: 0x100 + i,
            data: (i as u64).to_le_bytes(),
            ..Default::default()
        })
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("roundtrip.blf");

        let mut file = BlfFile::open(&path, OpenMode::Write).unwrap();
        assert!(file.is_open());
        for i in 0..100 {
            file.write(can(i)).unwrap();
        }
        file.write(Record::AppText(AppText {
            text: b"end of test".to_vec(),
            ..Default::default()
        }))
        .unwrap();
        file.close().unwrap();
        assert!(!file.is_open());
        assert_eq!(file.statistics().object_count, 101);

        let mut file = BlfFile::open(&path, OpenMode::Read).unwrap();
        assert_eq!(file.statistics().object_count, 101);
        for i in 0..100 {
            assert_eq!(file.read().unwrap(), Some(can(i)));
        }
        assert!(matches!(file.read().unwrap(), Some(Record::AppText(_))));
        assert!(file.good());
        assert_eq!(file.read().unwrap(), None);
        assert!(file.eof());
        assert!(!file.good());
        file.close().unwrap();
        file.close().unwrap();
    }

    #[test]
    fn test_wrong_mode_and_closed_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("modes.blf");

        let mut file = BlfFile::open(&path, OpenMode::Write).unwrap();
        assert!(matches!(file.read(), Err(BlfError::WrongMode(OpenMode::Read))));
        file.close().unwrap();
        assert!(matches!(file.write(can(0)), Err(BlfError::NotOpen)));

        let mut file = BlfFile::open(&path, OpenMode::Read).unwrap();
        assert!(matches!(file.write(can(0)), Err(BlfError::WrongMode(OpenMode::Write))));
        assert_eq!(file.read().unwrap(), None);
    }

    #[test]
    fn test_invalid_configuration_is_rejected_at_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.blf");
        let config = EngineConfig::new()
            .with_container_size(1 << 16)
            .with_buffer_size(1024);
        assert!(matches!(
            BlfFile::open_with(&path, OpenMode::Write, config),
            Err(BlfError::ConfigurationError(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_finalizes_written_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dropped.blf");
        {
            let mut file = BlfFile::open(&path, OpenMode::Write).unwrap();
            file.write(can(7)).unwrap();
        }
        let mut file = BlfFile::open(&path, OpenMode::Read).unwrap();
        assert_eq!(file.statistics().object_count, 1);
        assert_eq!(file.read().unwrap(), Some(can(7)));
    }

    #[test]
    fn test_stop_worker_absorbs_panicked_stage() {
        let abort = AbortToken::new();
        let errors = ErrorSlot::new();
        let worker: Worker<()> =
            Worker::spawn("start-up", &abort, &errors, || panic!("stage failed to start")).unwrap();
        stop_worker(Path::new("start-up.blf"), worker);
        assert!(abort.is_aborted());
        assert!(!errors.has_error());
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            BlfFile::open(dir.path().join("nope.blf"), OpenMode::Read),
            Err(BlfError::IoError(_))
        ));
    }
}
