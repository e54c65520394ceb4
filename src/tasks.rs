//! Background work that reports back to the interactive flow over a channel.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    time::Duration,
};

/// Result channel of one background task
#[derive(Debug)]
pub struct TaskHandle<T> {
    receiver: mpsc::Receiver<T>,
    cancelled: Arc<AtomicBool>,
}

/// Runs `work` on its own thread; the result arrives through the returned handle
pub fn spawn<T, F>(work: F) -> TaskHandle<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&cancelled);

    std::thread::spawn(move || {
        let result = work();
        if flag.load(Ordering::SeqCst) {
            tracing::debug!("discarding result of cancelled task");
            return;
        }
        let _ = tx.send(result);
    });

    TaskHandle {
        receiver: rx,
        cancelled,
    }
}

impl<T> TaskHandle<T> {
    /// Marks the task abandoned; a late result is dropped
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Non-blocking poll
    pub fn try_result(&self) -> Option<T> {
        if self.is_cancelled() {
            return None;
        }
        self.receiver.try_recv().ok()
    }

    /// Blocks until the task finishes; `None` if it was cancelled or panicked
    pub fn wait(self) -> Option<T> {
        if self.is_cancelled() {
            return None;
        }
        self.receiver.recv().ok().filter(|_| !self.is_cancelled())
    }

    /// Blocks for at most `timeout`
    pub fn wait_timeout(&self, timeout: Duration) -> Option<T> {
        if self.is_cancelled() {
            return None;
        }
        self.receiver
            .recv_timeout(timeout)
            .ok()
            .filter(|_| !self.is_cancelled())
    }
}

impl<T> Drop for TaskHandle<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}
