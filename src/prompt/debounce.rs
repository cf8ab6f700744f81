//! Debounced recomputation
//!
//! Collapses bursts of calls into a single handler invocation that receives
//! the most recent value. The invocation happens once the input has been
//! quiet for `wait`, or `max_wait` after the first call of a burst if the
//! input never quiets down.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// Default quiet period before a recompute
pub const DEFAULT_WAIT: Duration = Duration::from_millis(250);

/// Default upper bound between the first edit and the recompute
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_millis(500);

enum Command<T> {
    Call(T),
    Flush,
}

/// Handle to a debounced handler running on its own task
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Command<T>>,
    driver: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the driver task. Must be called inside a tokio runtime.
    pub fn new<F>(wait: Duration, max_wait: Duration, handler: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let max_wait = max_wait.max(wait);
        let driver = tokio::spawn(drive(rx, wait, max_wait, handler));
        Self { tx, driver }
    }

    /// Record a new value, restarting the quiet period
    pub fn call(&self, value: T) {
        if self.tx.send(Command::Call(value)).is_err() {
            tracing::warn!("Debounce driver stopped, dropping call");
        }
    }

    /// Run a pending invocation now
    pub fn flush(&self) {
        let _ = self.tx.send(Command::Flush);
    }

    /// Flush any pending value and wait for the driver to stop
    pub async fn finish(self) {
        drop(self.tx);
        if let Err(e) = self.driver.await {
            tracing::error!("Debounce driver failed: {}", e);
        }
    }
}

async fn drive<T, F>(
    mut rx: mpsc::UnboundedReceiver<Command<T>>,
    wait: Duration,
    max_wait: Duration,
    mut handler: F,
) where
    F: FnMut(T),
{
    let mut pending: Option<T> = None;
    let mut quiet_deadline = Instant::now();
    let mut max_deadline = Instant::now();

    loop {
        if pending.is_none() {
            match rx.recv().await {
                Some(Command::Call(value)) => {
                    let now = Instant::now();
                    pending = Some(value);
                    quiet_deadline = now + wait;
                    max_deadline = now + max_wait;
                }
                Some(Command::Flush) => {}
                None => break,
            }
            continue;
        }

        let deadline = quiet_deadline.min(max_deadline);

        tokio::select! {
            msg = rx.recv() => match msg {
                Some(Command::Call(value)) => {
                    pending = Some(value);
                    quiet_deadline = Instant::now() + wait;
                }
                Some(Command::Flush) => {
                    if let Some(value) = pending.take() {
                        handler(value);
                    }
                }
                None => {
                    if let Some(value) = pending.take() {
                        handler(value);
                    }
                    break;
                }
            },
            _ = sleep_until(deadline) => {
                if let Some(value) = pending.take() {
                    tracing::trace!("Debounce window elapsed");
                    handler(value);
                }
            }
        }
    }
}
