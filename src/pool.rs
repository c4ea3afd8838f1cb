//! Worker threads that async loggers hand records to, so the calling thread only pays for a
//! copy and a queue push.
//!
//! The queue is bounded: producers block when it is full rather than dropping records.

use crate::Error;
use crate::internal;
use crate::logger::Dispatch;
use crate::record::LogRecord;
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub const DEFAULT_QUEUE_SIZE: usize = 8192;
pub const DEFAULT_THREADS: usize = 1;

pub(crate) enum Task {
    Log {
        dispatch: Arc<Dispatch>,
        record: LogRecord<'static>,
    },
    Flush(Arc<Dispatch>),
}

impl Task {
    fn run(self) {
        match self {
            Self::Log { dispatch, record } => dispatch.sink_it(&record),
            Self::Flush(dispatch) => dispatch.flush_sinks(),
        }
    }
}

/// Shared worker pool. Dropping the last handle closes the queue, lets the workers drain what
/// is left, and joins them.
pub struct ThreadPool {
    sender: Mutex<Option<Sender<Task>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    queue_size: usize,
}

impl ThreadPool {
    /// Spawns `threads` named workers (at least one) over a queue of `queue_size` slots.
    ///
    /// # Errors
    /// I/O errors from spawning a worker thread.
    pub fn new(queue_size: usize, threads: usize) -> Result<Self, Error> {
        let (sender, receiver) = crossbeam_channel::bounded::<Task>(queue_size);

        let workers = (0..threads.max(1))
            .map(|i| {
                let receiver = receiver.clone();
                thread::Builder::new()
                    .name(format!("logcore-worker-{i}"))
                    .spawn(move || worker_loop(&receiver))
            })
            .collect::<Result<Vec<_>, _>>()?;

        internal::debug(
            "POOL",
            &format!(
                "Started {} worker(s), queue size {queue_size}",
                workers.len()
            ),
        );

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(workers),
            queue_size,
        })
    }

    /// Pool with the default queue size and a single worker.
    ///
    /// # Errors
    /// I/O errors from spawning the worker thread.
    pub fn with_defaults() -> Result<Self, Error> {
        Self::new(DEFAULT_QUEUE_SIZE, DEFAULT_THREADS)
    }

    #[must_use]
    pub const fn queue_size(&self) -> usize {
        self.queue_size
    }

    #[must_use]
    pub fn thread_count(&self) -> usize {
        self.workers.lock().len()
    }

    /// Blocks while the queue is full. The sender lock is released before sending so a full
    /// queue never stalls [`shutdown`](Self::shutdown).
    pub(crate) fn post(&self, task: Task, logger_name: &str) -> Result<(), Error> {
        let sender = self.sender.lock().clone();
        let Some(sender) = sender else {
            return Err(Error::PoolGone(logger_name.to_string()));
        };
        sender
            .send(task)
            .map_err(|_| Error::PoolGone(logger_name.to_string()))
    }

    /// Closes the queue and joins the workers once they have drained it. Idempotent.
    pub fn shutdown(&self) {
        let Some(sender) = self.sender.lock().take() else {
            return;
        };
        drop(sender);

        let current = thread::current().id();
        let workers = std::mem::take(&mut *self.workers.lock());
        for worker in workers {
            // A sink that logs through an async logger can drop the last pool handle on a
            // worker thread; that worker can't join itself.
            if worker.thread().id() == current {
                continue;
            }
            if worker.join().is_err() {
                internal::error("POOL", "Worker thread panicked");
            }
        }
        internal::debug("POOL", "Worker pool stopped");
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Each worker owns a receiver clone; the loop ends once every sender is gone and the queue
/// is empty.
fn worker_loop(receiver: &Receiver<Task>) {
    for task in receiver {
        task.run();
    }
}
