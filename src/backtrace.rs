//! Bounded per-logger history of recent records, replayed on demand (e.g. dump the last N debug
//! lines when an error shows up) instead of paying for formatting and I/O on every record.

use crate::record::LogRecord;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Default)]
struct Ring {
    capacity: usize,
    records: VecDeque<LogRecord<'static>>,
}

impl Ring {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            records: VecDeque::with_capacity(capacity),
        }
    }

    fn push(&mut self, record: LogRecord<'static>) {
        if self.capacity == 0 {
            return;
        }
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }
}

/// Fixed-capacity, overwrite-oldest ring of owned records.
///
/// Created disabled with capacity 0. Capture copies the record, so borrowed payloads never
/// outlive the logging call that produced them.
#[derive(Debug, Default)]
pub struct Backtracer {
    enabled: AtomicBool,
    ring: Mutex<Ring>,
}

impl Backtracer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts capturing into a fresh, empty buffer of `capacity` records. Previous contents are
    /// discarded. A capacity of 0 is legal and keeps nothing.
    pub fn enable(&self, capacity: usize) {
        let mut ring = self.ring.lock();
        self.enabled.store(true, Ordering::Relaxed);
        *ring = Ring::with_capacity(capacity);
    }

    /// Stops accepting records. Already captured records stay drainable.
    pub fn disable(&self) {
        let _ring = self.ring.lock();
        self.enabled.store(false, Ordering::Relaxed);
    }

    /// Lock-free check callers make before paying for the copy in [`capture`](Self::capture).
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Copies `record` into the ring, evicting the oldest entry when full. Dropped when disabled.
    pub fn capture(&self, record: &LogRecord<'_>) {
        let mut ring = self.ring.lock();
        if !self.is_enabled() {
            return;
        }
        ring.push(record.to_owned_record());
    }

    /// Removes records oldest-first, handing each to `visit`, until the buffer is empty.
    ///
    /// Works while disabled. If `visit` fails, the error is returned immediately and the failing
    /// record plus everything after it stay in the buffer for a later drain.
    ///
    /// # Errors
    /// The first error returned by `visit`.
    pub fn drain<E>(
        &self,
        mut visit: impl FnMut(&LogRecord<'static>) -> Result<(), E>,
    ) -> Result<(), E> {
        let mut ring = self.ring.lock();
        while let Some(front) = ring.records.front() {
            visit(front)?;
            ring.records.pop_front();
        }
        Ok(())
    }

    /// Infallible form of [`drain`](Self::drain).
    pub fn foreach_pop(&self, mut visit: impl FnMut(&LogRecord<'static>)) {
        let _ = self.drain(|record| {
            visit(record);
            Ok::<(), std::convert::Infallible>(())
        });
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ring.lock().records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.lock().records.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity
    }

    /// Copies another backtracer's state into this one. Only one lock is held at a time, and
    /// assigning a backtracer to itself is a no-op.
    pub fn assign_from(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }
        let (enabled, snapshot) = other.snapshot();
        let mut ring = self.ring.lock();
        self.enabled.store(enabled, Ordering::Relaxed);
        *ring = snapshot;
    }

    fn snapshot(&self) -> (bool, Ring) {
        let ring = self.ring.lock();
        (self.is_enabled(), ring.clone())
    }
}

impl Clone for Backtracer {
    fn clone(&self) -> Self {
        let (enabled, ring) = self.snapshot();
        Self {
            enabled: AtomicBool::new(enabled),
            ring: Mutex::new(ring),
        }
    }
}
