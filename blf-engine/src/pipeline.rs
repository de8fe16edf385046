//! Worker stages connecting the record queue, the uncompressed stream and the store
//!
//! # Write direction
//!
//! ```text
//! caller -> BoundedQueue -> [encode] -> UncompressedStream -> [compress] -> StoreWriter
//! ```
//!
//! # Read direction
//!
//! ```text
//! StoreReader -> [decompress] -> UncompressedStream -> [decode] -> BoundedQueue -> caller
//! ```
//!
//! Every stage runs on its own thread through [`Worker`]. A stage that fails
//! stores its error in the shared [`ErrorSlot`] (first error wins) and aborts
//! the file's [`AbortToken`] so that the other stages and the caller unblock.
//! [`BlfError::Aborted`] is the normal way a stage leaves after an abort and is
//! never recorded.

use crate::config::Strictness;
use crate::queue::{BoundedQueue, Dequeued};
use crate::records::header::{BaseHeader, BASE_HEADER_SIZE};
use crate::records::{self, Record};
use crate::store::{StoreReader, StoreWriter};
use crate::stream::UncompressedStream;
use crate::sync::AbortToken;
use crate::types::{BlfError, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// First error raised by any stage of one open file
#[derive(Clone, Default)]
pub struct ErrorSlot {
    inner: Arc<Mutex<Option<BlfError>>>,
}

impl ErrorSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep `err` unless an error is already stored. Aborts are ignored.
    pub fn record(&self, err: BlfError) {
        if err.is_aborted() {
            return;
        }
        let mut slot = self.inner.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    pub fn take(&self) -> Option<BlfError> {
        self.inner.lock().take()
    }

    pub fn has_error(&self) -> bool {
        self.inner.lock().is_some()
    }
}

/// Aborts the token if the owning thread unwinds
struct AbortOnPanic(AbortToken);

impl Drop for AbortOnPanic {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.abort();
        }
    }
}

/// A named stage thread
pub struct Worker<T> {
    name: &'static str,
    handle: JoinHandle<Option<T>>,
}

impl<T: Send + 'static> Worker<T> {
    /// Run `stage` on a new thread named `blf-<name>`
    pub fn spawn<F>(name: &'static str, abort: &AbortToken, errors: &ErrorSlot, stage: F) -> Result<Self>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        let abort = abort.clone();
        let errors = errors.clone();
        let handle = thread::Builder::new()
            .name(format!("blf-{}", name))
            .spawn(move || {
                let _guard = AbortOnPanic(abort.clone());
                match stage() {
                    Ok(value) => Some(value),
                    Err(e) => {
                        if !e.is_aborted() {
                            log::error!("{} stage failed: {}", name, e);
                            errors.record(e);
                        }
                        abort.abort();
                        None
                    }
                }
            })?;
        Ok(Self { name, handle })
    }

    /// Wait for the stage; `None` when it failed or was aborted
    pub fn join(self) -> Result<Option<T>> {
        let Worker { name, handle } = self;
        handle
            .join()
            .map_err(|_| BlfError::WorkerPanicked(name.to_string()))
    }
}

/// What the encode stage saw
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EncodeSummary {
    pub objects: u64,
    pub last_timestamp_ns: Option<u64>,
}

/// Encode queued records into the stream until the queue is closed
pub fn encode_stage(queue: BoundedQueue<Record>, stream: UncompressedStream) -> Result<EncodeSummary> {
    let mut summary = EncodeSummary::default();
    let mut buf = Vec::new();
    loop {
        match queue.dequeue() {
            Dequeued::Item(record) => {
                buf.clear();
                record.encode(&mut buf)?;
                stream.write(&buf)?;
                log::trace!("Encoded {} ({} bytes)", record.name(), buf.len());
                summary.objects += 1;
                if let Some(ts) = record.timestamp_ns() {
                    summary.last_timestamp_ns = Some(ts);
                }
            }
            Dequeued::EndOfStream => {
                stream.finish();
                log::debug!("Encode stage done after {} objects", summary.objects);
                return Ok(summary);
            }
            Dequeued::Aborted => return Err(BlfError::Aborted),
        }
    }
}

/// Move sealed containers from the stream into the store
pub fn compress_stage(stream: UncompressedStream, mut writer: StoreWriter) -> Result<StoreWriter> {
    while let Some(container) = stream.read_container()? {
        writer.write_container(&container)?;
    }
    Ok(writer)
}

/// Inflate every remaining block into the stream; returns the block count
pub fn decompress_stage(mut reader: StoreReader, stream: UncompressedStream) -> Result<u64> {
    let mut blocks = 0u64;
    while let Some(block) = reader.read_block()? {
        let data = block.decompress()?;
        log::debug!(
            "Inflated container {}: {} -> {} bytes",
            blocks,
            block.data.len(),
            data.len()
        );
        stream.write_container(data)?;
        blocks += 1;
    }
    stream.finish();
    Ok(blocks)
}

/// Decode records from the stream into the queue; returns the record count
pub fn decode_stage(
    stream: UncompressedStream,
    queue: BoundedQueue<Record>,
    abort: AbortToken,
    strictness: Strictness,
) -> Result<u64> {
    let mut objects = 0u64;
    while let Some(record) = read_next_record(&stream, &abort, strictness)? {
        log::trace!("Decoded {} at {:?} ns", record.name(), record.timestamp_ns());
        queue.enqueue(record)?;
        objects += 1;
    }
    queue.close();
    log::debug!("Decode stage done after {} objects", objects);
    Ok(objects)
}

/// Pull the next whole record from the stream.
///
/// Returns `None` at the end of the stream. Leftover bytes too short for a
/// header are ignored with a warning. In lenient mode a corrupt header is
/// skipped one byte at a time until a valid header appears; so is a header
/// whose object size is larger than the stream could ever buffer.
pub fn read_next_record(
    stream: &UncompressedStream,
    abort: &AbortToken,
    strictness: Strictness,
) -> Result<Option<Record>> {
    let mut buf = stream.read(BASE_HEADER_SIZE);
    let mut skipped = 0u64;
    loop {
        let base = match next_header(stream, abort, strictness, &mut buf, &mut skipped)? {
            Some(base) => base,
            None => return Ok(None),
        };

        let body_len = base.object_size as usize - BASE_HEADER_SIZE;
        let body = stream.read(body_len);
        if abort.is_aborted() {
            return Err(BlfError::Aborted);
        }
        if body.len() < body_len && stream.is_stalled(body_len) {
            if strictness == Strictness::Lenient {
                buf.remove(0);
                buf.extend(stream.read(1));
                skipped += 1;
                continue;
            }
            return Err(BlfError::TruncatedRecord {
                object_type: base.object_type,
                needed: base.object_size as usize,
                available: buf.len() + stream.available() as usize,
            });
        }

        if skipped > 0 {
            log::warn!(
                "Skipped {} corrupt bytes, resynchronised at offset {}",
                skipped,
                stream.tell_read() - (buf.len() + body.len()) as u64
            );
        }
        buf.extend_from_slice(&body);
        if buf.len() < base.object_size as usize {
            return Err(BlfError::TruncatedRecord {
                object_type: base.object_type,
                needed: base.object_size as usize,
                available: buf.len(),
            });
        }
        return records::decode_with(&buf, strictness).map(Some);
    }
}

/// Find the next valid base header in `buf`, refilling it from the stream
fn next_header(
    stream: &UncompressedStream,
    abort: &AbortToken,
    strictness: Strictness,
    buf: &mut Vec<u8>,
    skipped: &mut u64,
) -> Result<Option<BaseHeader>> {
    loop {
        if abort.is_aborted() {
            return Err(BlfError::Aborted);
        }
        if buf.len() < BASE_HEADER_SIZE {
            if *skipped > 0 {
                log::warn!("Skipped {} bytes without finding another object", skipped);
            }
            if !buf.is_empty() {
                log::warn!("Ignoring {} trailing bytes at end of stream", buf.len());
            }
            return Ok(None);
        }
        match BaseHeader::parse(&buf[..]) {
            Ok(base) => return Ok(Some(base)),
            Err(_) if strictness == Strictness::Lenient => {
                buf.remove(0);
                buf.extend(stream.read(1));
                *skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{CanMessage, ObjectType};

    fn can(id: u32) -> Record {
        Record::CanMessage(CanMessage {
            id,
            dlc: 8,
            data: [id as u8; 8],
            ..Default::default()
        })
    }

    fn stream_with(bytes: &[u8]) -> UncompressedStream {
        let stream = UncompressedStream::with_sizes(64, 1024, AbortToken::new());
        stream.write_container(bytes.to_vec()).unwrap();
        stream.finish();
        stream
    }

    #[test]
    fn test_error_slot_first_wins() {
        let slot = ErrorSlot::new();
        slot.record(BlfError::Aborted);
        assert!(!slot.has_error());
        slot.record(BlfError::NotOpen);
        slot.record(BlfError::InvalidSeek(1));
        assert!(matches!(slot.take(), Some(BlfError::NotOpen)));
        assert!(slot.take().is_none());
    }

    #[test]
    fn test_worker_records_error_and_aborts() {
        let abort = AbortToken::new();
        let errors = ErrorSlot::new();
        let worker: Worker<()> = Worker::spawn("failing", &abort, &errors, || {
            Err(BlfError::UnsupportedCompression(7))
        })
        .unwrap();
        assert_eq!(worker.join().unwrap(), None);
        assert!(abort.is_aborted());
        assert!(matches!(errors.take(), Some(BlfError::UnsupportedCompression(7))));
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let abort = AbortToken::new();
        let errors = ErrorSlot::new();
        let worker: Worker<()> =
            Worker::spawn("panicking", &abort, &errors, || panic!("stage blew up")).unwrap();
        assert!(matches!(worker.join(), Err(BlfError::WorkerPanicked(name)) if name == "panicking"));
        assert!(abort.is_aborted());
    }

    #[test]
    fn test_read_records_in_order() {
        let mut bytes = Vec::new();
        for id in 0..3 {
            bytes.extend(can(id).to_bytes().unwrap());
        }
        let stream = stream_with(&bytes);
        let abort = AbortToken::new();
        for id in 0..3 {
            let record = read_next_record(&stream, &abort, Strictness::Strict).unwrap().unwrap();
            assert_eq!(record, can(id));
        }
        assert!(read_next_record(&stream, &abort, Strictness::Strict).unwrap().is_none());
    }

    #[test]
    fn test_lenient_resynchronises_after_garbage() {
        let mut bytes = can(1).to_bytes().unwrap();
        bytes.extend_from_slice(b"garbage!");
        bytes.extend(can(2).to_bytes().unwrap());
        let abort = AbortToken::new();

        let strict = stream_with(&bytes);
        assert_eq!(read_next_record(&strict, &abort, Strictness::Strict).unwrap().unwrap(), can(1));
        assert!(matches!(
            read_next_record(&strict, &abort, Strictness::Strict),
            Err(BlfError::CorruptHeader(_))
        ));

        let lenient = stream_with(&bytes);
        assert_eq!(read_next_record(&lenient, &abort, Strictness::Lenient).unwrap().unwrap(), can(1));
        assert_eq!(read_next_record(&lenient, &abort, Strictness::Lenient).unwrap().unwrap(), can(2));
        assert!(read_next_record(&lenient, &abort, Strictness::Lenient).unwrap().is_none());
    }

    #[test]
    fn test_truncated_final_record() {
        let bytes = Record::new(ObjectType::CanMessage).to_bytes().unwrap();
        let stream = stream_with(&bytes[..bytes.len() - 4]);
        let abort = AbortToken::new();
        assert!(matches!(
            read_next_record(&stream, &abort, Strictness::Strict),
            Err(BlfError::TruncatedRecord { object_type: 1, .. })
        ));
    }

    /// One container per record, buffer of two containers; record 1 claims 16 MiB
    fn stalling_stream(abort: &AbortToken) -> (UncompressedStream, thread::JoinHandle<()>) {
        let stream = UncompressedStream::with_sizes(48, 96, abort.clone());
        let producer = {
            let stream = stream.clone();
            thread::spawn(move || {
                for id in 0..10 {
                    let mut bytes = can(id).to_bytes().unwrap();
                    if id == 1 {
                        bytes[8..12].copy_from_slice(&0x00FF_0000u32.to_le_bytes());
                    }
                    if stream.write_container(bytes).is_err() {
                        return;
                    }
                }
                stream.finish();
            })
        };
        (stream, producer)
    }

    #[test]
    fn test_oversized_object_is_truncated_not_stuck() {
        let abort = AbortToken::new();
        let (stream, producer) = stalling_stream(&abort);
        assert_eq!(read_next_record(&stream, &abort, Strictness::Strict).unwrap().unwrap(), can(0));
        assert!(matches!(
            read_next_record(&stream, &abort, Strictness::Strict),
            Err(BlfError::TruncatedRecord { object_type: 1, needed: 0x00FF_0000, .. })
        ));
        abort.abort();
        producer.join().unwrap();
    }

    #[test]
    fn test_lenient_skips_oversized_object() {
        let abort = AbortToken::new();
        let (stream, producer) = stalling_stream(&abort);
        let mut ids = Vec::new();
        while let Some(record) = read_next_record(&stream, &abort, Strictness::Lenient).unwrap() {
            if let Record::CanMessage(msg) = record {
                ids.push(msg.id);
            }
        }
        producer.join().unwrap();
        assert_eq!(ids, vec![0, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_encode_then_compress_stages() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("stages.blf");
        let config = crate::config::EngineConfig::new().with_container_size(256);
        let abort = AbortToken::new();
        let queue = BoundedQueue::new(4, abort.clone());
        let stream = UncompressedStream::new(&config, abort.clone());
        let writer = StoreWriter::create(&path, &config).unwrap();

        let errors = ErrorSlot::new();
        let encoder = {
            let (queue, stream) = (queue.clone(), stream.clone());
            Worker::spawn("encode", &abort, &errors, move || encode_stage(queue, stream)).unwrap()
        };
        let compressor = {
            let stream = stream.clone();
            Worker::spawn("compress", &abort, &errors, move || compress_stage(stream, writer)).unwrap()
        };
        for id in 0..50 {
            queue.enqueue(can(id)).unwrap();
        }
        queue.close();

        let summary = encoder.join().unwrap().unwrap();
        assert_eq!(summary.objects, 50);
        let writer = compressor.join().unwrap().unwrap();
        assert!(writer.containers_written() > 1);
        assert!(!errors.has_error());
    }
}
