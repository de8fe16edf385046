//! Bounded record queue between the application and the pipeline
//!
//! Built on a `crossbeam-channel` bounded channel. The producer blocks while
//! the channel is full and the consumer while it is empty.
//! [`BoundedQueue::close`] drops the shared sender: the consumer drains what
//! is left and then sees [`Dequeued::EndOfStream`] instead of blocking
//! forever. An abort through the shared [`AbortToken`] disconnects a second
//! signal channel that every blocking call also selects on, releasing both
//! sides at once.

use crate::sync::{AbortToken, Wake};
use crate::types::{BlfError, Result};
use crossbeam_channel::{bounded, select, Receiver, Sender};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Outcome of [`BoundedQueue::dequeue`]
#[derive(Debug, PartialEq, Eq)]
pub enum Dequeued<T> {
    Item(T),
    /// Closed and fully drained
    EndOfStream,
    Aborted,
}

/// Disconnects its channel when the token fires
struct AbortSignal {
    sender: Mutex<Option<Sender<()>>>,
}

impl Wake for AbortSignal {
    fn wake(&self) {
        self.sender.lock().take();
    }
}

struct Shared<T> {
    /// `None` once closed
    sender: Mutex<Option<Sender<T>>>,
    receiver: Receiver<T>,
    aborted: Receiver<()>,
    _signal: Arc<AbortSignal>,
    capacity: usize,
    abort: AbortToken,
}

/// Multi-producer multi-consumer FIFO with a fixed capacity.
///
/// Clones are handles to the same queue.
pub struct BoundedQueue<T> {
    shared: Arc<Shared<T>>,
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: Send + 'static> BoundedQueue<T> {
    /// Create a queue holding at most `capacity` items (at least one)
    pub fn new(capacity: usize, abort: AbortToken) -> Self {
        let capacity = capacity.max(1);
        let (sender, receiver) = bounded(capacity);
        let (signal_tx, aborted) = bounded(0);
        let signal = Arc::new(AbortSignal {
            sender: Mutex::new(Some(signal_tx)),
        });
        let weak: Weak<dyn Wake> = Arc::downgrade(&signal) as Weak<dyn Wake>;
        abort.register(weak);
        Self {
            shared: Arc::new(Shared {
                sender: Mutex::new(Some(sender)),
                receiver,
                aborted,
                _signal: signal,
                capacity,
                abort,
            }),
        }
    }

    /// Append an item, blocking while the queue is full.
    ///
    /// Fails with [`BlfError::Aborted`] when the token is aborted or the
    /// queue has already been closed.
    pub fn enqueue(&self, item: T) -> Result<()> {
        let shared = &*self.shared;
        if shared.abort.is_aborted() {
            return Err(BlfError::Aborted);
        }
        let sender = shared.sender.lock().clone().ok_or(BlfError::Aborted)?;
        select! {
            send(sender, item) -> sent => sent.map_err(|_| BlfError::Aborted),
            recv(shared.aborted) -> _ => Err(BlfError::Aborted),
        }
    }

    /// Take the oldest item, blocking while the queue is empty and open
    pub fn dequeue(&self) -> Dequeued<T> {
        let shared = &*self.shared;
        if shared.abort.is_aborted() {
            return Dequeued::Aborted;
        }
        select! {
            recv(shared.receiver) -> item => match item {
                _ if shared.abort.is_aborted() => Dequeued::Aborted,
                Ok(item) => Dequeued::Item(item),
                Err(_) => Dequeued::EndOfStream,
            },
            recv(shared.aborted) -> _ => Dequeued::Aborted,
        }
    }

    /// Mark the end of input; producers blocked in `enqueue` still finish
    pub fn close(&self) {
        self.shared.sender.lock().take();
    }

    pub fn abort(&self) {
        self.shared.abort.abort();
    }

    pub fn is_closed(&self) -> bool {
        self.shared.sender.lock().is_none()
    }

    pub fn len(&self) -> usize {
        self.shared.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.receiver.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_fifo_and_drain_after_close() {
        let queue = BoundedQueue::new(4, AbortToken::new());
        for i in 0..3 {
            queue.enqueue(i).unwrap();
        }
        queue.close();
        assert!(queue.enqueue(99).is_err());
        assert_eq!(queue.dequeue(), Dequeued::Item(0));
        assert_eq!(queue.dequeue(), Dequeued::Item(1));
        assert_eq!(queue.dequeue(), Dequeued::Item(2));
        assert_eq!(queue.dequeue(), Dequeued::EndOfStream);
        assert_eq!(queue.dequeue(), Dequeued::EndOfStream);
    }

    #[test]
    fn test_producer_blocks_when_full() {
        let queue = BoundedQueue::new(2, AbortToken::new());
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..100u32 {
                    queue.enqueue(i).unwrap();
                }
                queue.close();
            })
        };

        let mut received = Vec::new();
        loop {
            assert!(queue.len() <= 2);
            match queue.dequeue() {
                Dequeued::Item(i) => received.push(i),
                Dequeued::EndOfStream => break,
                Dequeued::Aborted => panic!("unexpected abort"),
            }
        }
        producer.join().unwrap();
        assert_eq!(received, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_abort_releases_blocked_consumer() {
        let token = AbortToken::new();
        let queue: BoundedQueue<u32> = BoundedQueue::new(1, token.clone());
        let consumer = {
            let queue = queue.clone();
            thread::spawn(move || queue.dequeue())
        };
        thread::sleep(Duration::from_millis(20));
        token.abort();
        assert_eq!(consumer.join().unwrap(), Dequeued::Aborted);
    }

    #[test]
    fn test_abort_wins_over_queued_items() {
        let token = AbortToken::new();
        let queue = BoundedQueue::new(4, token.clone());
        queue.enqueue(1u32).unwrap();
        queue.enqueue(2u32).unwrap();
        token.abort();
        assert_eq!(queue.dequeue(), Dequeued::Aborted);
        assert!(matches!(queue.enqueue(3), Err(BlfError::Aborted)));

        // A queue created from an aborted token is released at once
        let late: BoundedQueue<u32> = BoundedQueue::new(1, token);
        assert_eq!(late.dequeue(), Dequeued::Aborted);
    }

    #[test]
    fn test_abort_releases_blocked_producer() {
        let token = AbortToken::new();
        let queue = BoundedQueue::new(1, token.clone());
        queue.enqueue(1u32).unwrap();
        let producer = {
            let queue = queue.clone();
            thread::spawn(move || queue.enqueue(2))
        };
        thread::sleep(Duration::from_millis(20));
        queue.abort();
        assert!(matches!(producer.join().unwrap(), Err(BlfError::Aborted)));
    }
}
