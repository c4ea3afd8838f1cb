//! Background thread that runs a callback on a fixed interval until stopped.

use crate::Error;
use crate::internal;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Stopping closes the channel the thread waits on, then joins it, so no tick can race a
/// final flush done after the worker is gone.
pub(crate) struct PeriodicWorker {
    interval: Duration,
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicWorker {
    pub(crate) fn start(
        name: &str,
        interval: Duration,
        callback: impl Fn() + Send + 'static,
    ) -> Result<Self, Error> {
        let (stop, stopped) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                loop {
                    match stopped.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => callback(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })?;
        internal::debug(
            "FLUSHER",
            &format!("Started '{name}' every {}ms", interval.as_millis()),
        );
        Ok(Self {
            interval,
            stop: Some(stop),
            handle: Some(handle),
        })
    }

    pub(crate) const fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for PeriodicWorker {
    fn drop(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            // The callback itself may drop the worker (e.g. shutdown from a flush); never self-join.
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                internal::error("FLUSHER", "Periodic worker panicked");
            }
        }
        internal::debug("FLUSHER", "Periodic worker stopped");
    }
}
