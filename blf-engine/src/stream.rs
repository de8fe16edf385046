//! Thread-safe uncompressed byte stream over an ordered list of containers
//!
//! The stream sits between the record codec and the compressed store. One
//! thread produces at the tail and one consumes from the head:
//!
//! - **Write mode**: the encode stage calls [`UncompressedStream::write`] with
//!   whole records and the compress stage takes sealed containers with
//!   [`UncompressedStream::read_container`].
//! - **Read mode**: the decompress stage pushes inflated containers with
//!   [`UncompressedStream::write_container`] and the decode stage pulls bytes
//!   with [`UncompressedStream::read`].
//!
//! Producers block while `write - read >= buffer_size`; consumers block until
//! enough bytes are available, the declared end is reached, or the shared
//! [`AbortToken`] fires. Containers fully behind the read cursor are evicted.

use crate::config::EngineConfig;
use crate::container::{Append, Container};
use crate::sync::{AbortToken, Wake};
use crate::types::{BlfError, Result, StreamStatus};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::collections::VecDeque;
use std::sync::{Arc, Weak};

struct StreamState {
    containers: VecDeque<Container>,
    write_pos: u64,
    read_pos: u64,
    /// Set once the producer has finished; reads past it are end-of-file
    declared_size: Option<u64>,
    status: StreamStatus,
    peak_resident: usize,
}

impl StreamState {
    fn available(&self) -> u64 {
        self.write_pos.saturating_sub(self.read_pos)
    }

    /// Bytes a read of `n` can return before hitting the declared end
    fn wanted(&self, n: usize) -> u64 {
        match self.declared_size {
            Some(declared) => (n as u64).min(declared.saturating_sub(self.read_pos)),
            None => n as u64,
        }
    }

    fn note_resident(&mut self) {
        self.peak_resident = self.peak_resident.max(self.containers.len());
    }

    /// Copy up to `n` bytes starting at the read cursor and advance it
    fn copy_out(&mut self, n: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(n);
        let mut pos = self.read_pos;
        for container in &self.containers {
            if out.len() == n {
                break;
            }
            if container.end() <= pos {
                continue;
            }
            let start = (pos - container.file_position()) as usize;
            let take = (n - out.len()).min(container.size() - start);
            out.extend_from_slice(&container.data()[start..start + take]);
            pos += take as u64;
        }
        self.read_pos = pos;
        out
    }

    fn drop_old(&mut self) -> usize {
        let limit = self
            .read_pos
            .min(self.write_pos)
            .min(self.declared_size.unwrap_or(u64::MAX));
        let mut dropped = 0;
        while let Some(front) = self.containers.front() {
            if !front.is_sealed() || front.end() > limit {
                break;
            }
            self.containers.pop_front();
            dropped += 1;
        }
        dropped
    }
}

struct Shared {
    state: Mutex<StreamState>,
    changed: Condvar,
    buffer_size: u64,
    container_size: usize,
    abort: AbortToken,
}

impl Wake for Shared {
    fn wake(&self) {
        let _guard = self.state.lock();
        self.changed.notify_all();
    }
}

/// Handle to a shared uncompressed stream; clones refer to the same stream
#[derive(Clone)]
pub struct UncompressedStream {
    shared: Arc<Shared>,
}

impl UncompressedStream {
    /// Create an empty stream starting at logical offset 0
    pub fn new(config: &EngineConfig, abort: AbortToken) -> Self {
        Self::with_sizes(config.container_size, config.buffer_size, abort)
    }

    pub fn with_sizes(container_size: usize, buffer_size: usize, abort: AbortToken) -> Self {
        let shared = Arc::new(Shared {
            state: Mutex::new(StreamState {
                containers: VecDeque::new(),
                write_pos: 0,
                read_pos: 0,
                declared_size: None,
                status: StreamStatus::default(),
                peak_resident: 0,
            }),
            changed: Condvar::new(),
            buffer_size: buffer_size.max(1) as u64,
            container_size: container_size.max(1),
            abort: abort.clone(),
        });
        let weak: Weak<dyn Wake> = Arc::downgrade(&shared) as Weak<dyn Wake>;
        abort.register(weak);
        Self { shared }
    }

    fn lock(&self) -> MutexGuard<'_, StreamState> {
        self.shared.state.lock()
    }

    fn aborted(&self) -> bool {
        self.shared.abort.is_aborted()
    }

    /// Block the producer until the consumer is less than one buffer behind
    fn wait_for_space(&self, state: &mut MutexGuard<'_, StreamState>) -> Result<()> {
        while state.available() >= self.shared.buffer_size && !self.aborted() {
            self.shared.changed.wait(state);
        }
        if self.aborted() {
            state.status.fail = true;
            return Err(BlfError::Aborted);
        }
        Ok(())
    }

    /// Start both cursors at `offset`, used when reading from a restore point
    pub fn start_at(&self, offset: u64) -> Result<()> {
        let mut state = self.lock();
        if !state.containers.is_empty() || state.write_pos != 0 {
            return Err(BlfError::InvalidSeek(offset));
        }
        state.write_pos = offset;
        state.read_pos = offset;
        Ok(())
    }

    /// Append one encoded record.
    ///
    /// The bytes go into the tail container while it is below its target
    /// size, otherwise into a fresh container. A record is never split.
    pub fn write(&self, bytes: &[u8]) -> Result<()> {
        let mut state = self.lock();
        self.wait_for_space(&mut state)?;

        let appended = match state.containers.back_mut() {
            Some(tail) => tail.append(bytes) == Append::Accepted,
            None => false,
        };
        if !appended {
            let mut container = Container::new(state.write_pos, self.shared.container_size);
            container.append(bytes);
            state.containers.push_back(container);
            state.note_resident();
        }
        state.write_pos += bytes.len() as u64;
        let write_pos = state.write_pos;
        if let Some(declared) = state.declared_size.as_mut() {
            *declared = (*declared).max(write_pos);
        }
        self.shared.changed.notify_all();
        Ok(())
    }

    /// Append one inflated container at the write cursor
    pub fn write_container(&self, data: Vec<u8>) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let mut state = self.lock();
        self.wait_for_space(&mut state)?;

        let container = Container::from_bytes(state.write_pos, data);
        state.write_pos = container.end();
        state.containers.push_back(container);
        state.note_resident();
        self.shared.changed.notify_all();
        Ok(())
    }

    /// Mark the producer as done: seal the tail and declare the total size
    pub fn finish(&self) {
        let mut state = self.lock();
        let tail_is_empty = state.containers.back().map(Container::is_empty);
        if tail_is_empty == Some(true) {
            state.containers.pop_back();
        } else if let Some(tail) = state.containers.back_mut() {
            tail.finalize();
        }
        state.declared_size = Some(state.write_pos);
        self.shared.changed.notify_all();
    }

    /// Read up to `n` bytes.
    ///
    /// Blocks until `n` bytes are available. Returns a short read with eof
    /// and fail set when the declared end is reached first, or whatever is
    /// available with fail set when the stream is aborted.
    ///
    /// When the producer is held back by the buffer limit and `n` bytes can
    /// never arrive, nothing is consumed: the result is empty and only fail
    /// is set (see [`UncompressedStream::is_stalled`]).
    pub fn read(&self, n: usize) -> Vec<u8> {
        let mut state = self.lock();
        while state.available() < state.wanted(n)
            && state.available() < self.shared.buffer_size
            && !self.aborted()
        {
            self.shared.changed.wait(&mut state);
        }

        let want = state.wanted(n);
        if state.available() < want && !self.aborted() {
            log::debug!(
                "Read of {} bytes at offset {} cannot complete: {} buffered, limit {}",
                n,
                state.read_pos,
                state.available(),
                self.shared.buffer_size
            );
            state.status.fail = true;
            return Vec::new();
        }

        let ready = state.available().min(want) as usize;
        let out = state.copy_out(ready);
        if out.len() < n {
            if self.aborted() {
                state.status.fail = true;
            } else {
                state.status.eof = true;
                state.status.fail = true;
            }
        }
        state.drop_old();
        self.shared.changed.notify_all();
        out
    }

    /// Take the next sealed container from the head.
    ///
    /// Returns `None` once the stream is finished and drained.
    pub fn read_container(&self) -> Result<Option<Container>> {
        let mut state = self.lock();
        loop {
            if self.aborted() {
                state.status.fail = true;
                return Err(BlfError::Aborted);
            }
            let front_ready = state.containers.front().map(Container::is_sealed);
            match front_ready {
                Some(true) => break,
                None if state.declared_size.is_some() => {
                    state.status.eof = true;
                    return Ok(None);
                }
                _ => self.shared.changed.wait(&mut state),
            }
        }

        let container = state.containers.pop_front();
        if let Some(container) = &container {
            state.read_pos = container.end();
        }
        self.shared.changed.notify_all();
        Ok(container)
    }

    /// Move the read cursor within the resident range
    pub fn seek(&self, offset: u64) -> Result<()> {
        let mut state = self.lock();
        let oldest = state
            .containers
            .front()
            .map(Container::file_position)
            .unwrap_or(state.read_pos);
        if offset < oldest || offset > state.write_pos {
            return Err(BlfError::InvalidSeek(offset));
        }
        state.read_pos = offset;
        state.status = StreamStatus::default();
        self.shared.changed.notify_all();
        Ok(())
    }

    /// Bytes written but not yet read
    pub fn available(&self) -> u64 {
        self.lock().available()
    }

    /// True when a read of `n` bytes would wait on a producer that is itself
    /// waiting for the reader
    pub fn is_stalled(&self, n: usize) -> bool {
        let state = self.lock();
        let available = state.available();
        available < state.wanted(n) && available >= self.shared.buffer_size
    }

    pub fn tell_read(&self) -> u64 {
        self.lock().read_pos
    }

    pub fn tell_write(&self) -> u64 {
        self.lock().write_pos
    }

    pub fn declared_size(&self) -> Option<u64> {
        self.lock().declared_size
    }

    pub fn status(&self) -> StreamStatus {
        self.lock().status
    }

    pub fn good(&self) -> bool {
        self.status().good()
    }

    pub fn eof(&self) -> bool {
        self.status().eof
    }

    /// Evict leading containers that lie fully behind both cursors.
    ///
    /// Returns the number of containers released.
    pub fn drop_old_data(&self) -> usize {
        let mut state = self.lock();
        let dropped = state.drop_old();
        if dropped > 0 {
            self.shared.changed.notify_all();
        }
        dropped
    }

    pub fn resident_containers(&self) -> usize {
        self.lock().containers.len()
    }

    /// Highest number of containers resident at once
    pub fn peak_resident(&self) -> usize {
        self.lock().peak_resident
    }

    pub fn abort(&self) {
        self.shared.abort.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn stream(container: usize, buffer: usize) -> UncompressedStream {
        UncompressedStream::with_sizes(container, buffer, AbortToken::new())
    }

    #[test]
    fn test_records_are_not_split() {
        let s = stream(10, 100);
        s.write(&[1; 6]).unwrap();
        s.write(&[2; 6]).unwrap();
        s.write(&[3; 6]).unwrap();
        s.finish();

        let first = s.read_container().unwrap().unwrap();
        assert_eq!(first.file_position(), 0);
        assert_eq!(first.size(), 12);
        let second = s.read_container().unwrap().unwrap();
        assert_eq!(second.file_position(), 12);
        assert_eq!(second.data(), &[3; 6]);
        assert!(s.read_container().unwrap().is_none());
        assert_eq!(s.tell_read(), 18);
    }

    #[test]
    fn test_read_crosses_containers() {
        let s = stream(4, 64);
        s.write_container(vec![0, 1, 2, 3]).unwrap();
        s.write_container(vec![4, 5, 6, 7]).unwrap();
        s.write_container(vec![8, 9]).unwrap();
        s.finish();

        assert_eq!(s.read(3), vec![0, 1, 2]);
        assert_eq!(s.read(4), vec![3, 4, 5, 6]);
        // The first container is fully consumed and released
        assert_eq!(s.resident_containers(), 2);
        assert!(s.good());

        assert_eq!(s.read(5), vec![7, 8, 9]);
        assert!(s.eof());
        assert!(!s.good());
        assert_eq!(s.read(1), Vec::<u8>::new());
    }

    #[test]
    fn test_start_at_offset() {
        let s = stream(4, 64);
        s.start_at(1000).unwrap();
        s.write_container(vec![1, 2, 3]).unwrap();
        s.finish();
        assert_eq!(s.tell_write(), 1003);
        assert_eq!(s.read(3), vec![1, 2, 3]);
        assert_eq!(s.tell_read(), 1003);
        assert!(s.start_at(0).is_err());
    }

    #[test]
    fn test_seek_within_resident_range() {
        let s = stream(8, 64);
        s.write_container(vec![10, 11, 12, 13]).unwrap();
        assert_eq!(s.read(2), vec![10, 11]);
        s.seek(0).unwrap();
        assert_eq!(s.read(4), vec![10, 11, 12, 13]);
        assert!(matches!(s.seek(5), Err(BlfError::InvalidSeek(5))));
    }

    #[test]
    fn test_writer_blocks_until_reader_catches_up() {
        let s = stream(4, 8);
        let writer = {
            let s = s.clone();
            thread::spawn(move || {
                for i in 0..64u8 {
                    s.write(&[i; 4]).unwrap();
                }
                s.finish();
            })
        };

        let mut seen = Vec::new();
        while let Some(container) = s.read_container().unwrap() {
            assert!(s.tell_write() - s.tell_read() <= 8 + 4);
            seen.extend_from_slice(container.data());
            thread::sleep(Duration::from_millis(1));
        }
        writer.join().unwrap();
        let expected: Vec<u8> = (0..64u8).flat_map(|i| [i; 4]).collect();
        assert_eq!(seen, expected);
        assert!(s.peak_resident() <= 3);
    }

    #[test]
    fn test_abort_releases_blocked_reader() {
        let s = stream(4, 64);
        s.write_container(vec![1, 2]).unwrap();
        let reader = {
            let s = s.clone();
            thread::spawn(move || s.read(10))
        };
        thread::sleep(Duration::from_millis(20));
        s.abort();
        assert_eq!(reader.join().unwrap(), vec![1, 2]);
        assert!(s.status().fail);
        assert!(!s.eof());
    }

    #[test]
    fn test_read_beyond_buffer_does_not_wait_forever() {
        let s = stream(4, 8);
        let producer = {
            let s = s.clone();
            thread::spawn(move || {
                for i in 0..4u8 {
                    s.write_container(vec![i; 4]).unwrap();
                }
                s.finish();
            })
        };
        // Two containers fill the buffer, so 12 bytes can never be ready at once
        let out = s.read(12);
        assert!(out.is_empty());
        assert!(s.status().fail);
        assert!(!s.eof());
        assert!(s.is_stalled(12));
        assert_eq!(s.tell_read(), 0);

        // Smaller reads still drain the stream and let the producer finish
        assert_eq!(s.read(4), vec![0; 4]);
        assert_eq!(s.read(4), vec![1; 4]);
        assert_eq!(s.read(8), [vec![2; 4], vec![3; 4]].concat());
        producer.join().unwrap();
        assert_eq!(s.read(1), Vec::<u8>::new());
        assert!(s.eof());
    }

    #[test]
    fn test_abort_releases_blocked_writer() {
        let s = stream(4, 4);
        s.write(&[0; 4]).unwrap();
        let writer = {
            let s = s.clone();
            thread::spawn(move || s.write(&[1; 4]))
        };
        thread::sleep(Duration::from_millis(20));
        s.abort();
        assert!(matches!(writer.join().unwrap(), Err(BlfError::Aborted)));
    }
}
