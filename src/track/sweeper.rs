//! Background expiry sweep.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use tracing::{debug, info};

use super::tracker::ResourceTracker;

/// Periodic expiry sweep over a shared [`ResourceTracker`].
///
/// The sweep runs on its own thread on a fixed interval, independent of
/// request traffic. Dropping the handle (or calling [`stop`](Self::stop))
/// signals the thread and joins it, so the host process owns the
/// lifecycle explicitly.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use cleave::{ResourceTracker, Sweeper};
///
/// let tracker = Arc::new(ResourceTracker::new());
/// let sweeper = Sweeper::start(Arc::clone(&tracker), Duration::from_secs(300));
/// // ... serve requests ...
/// sweeper.stop();
/// ```
pub struct Sweeper {
    shutdown: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Spawn the sweep thread.
    pub fn start(tracker: Arc<ResourceTracker>, interval: Duration) -> Self {
        let (shutdown, signal) = bounded::<()>(1);
        let handle = std::thread::spawn(move || {
            debug!(?interval, "sweeper started");
            loop {
                match signal.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        // A failed deletion is logged by the tracker and
                        // retried on the next pass; the loop never aborts.
                        let removed = tracker.sweep_expired();
                        if removed > 0 {
                            info!(removed, "sweep removed expired resources");
                        }
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
            debug!("sweeper stopped");
        });
        Self {
            shutdown,
            handle: Some(handle),
        }
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.shutdown_and_join();
    }

    fn shutdown_and_join(&mut self) {
        let _ = self.shutdown.try_send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.shutdown_and_join();
    }
}
