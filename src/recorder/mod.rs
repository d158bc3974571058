//! Sequential task queue
//!
//! The recorder is the single serialization point of a test run: every
//! DSL call submits exactly one named asynchronous task, and one worker
//! runs them strictly in submission order, one at a time. A failing task
//! marks the queue-wide failure state and fails its own handle, but the
//! queue keeps draining the tasks behind it; `drain` surfaces the stored
//! failure to its caller exactly once.

use crate::error::StepError;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, warn};

/// Boxed future used for queued task actions.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

struct QueuedTask {
    name: String,
    seq: u64,
    action: BoxFuture<Result<(), StepError>>,
    done: oneshot::Sender<Result<(), StepError>>,
}

struct Shared {
    /// First failure recorded since the last drain/reset
    failure: Mutex<Option<StepError>>,

    /// Tasks queued or running; drain waits for this to hit zero
    pending: watch::Sender<usize>,

    seq: AtomicU64,
}

/// The sequential task queue.
///
/// Cloning hands out another submitter for the same queue; all clones
/// share one worker and one ordering.
#[derive(Clone)]
pub struct Recorder {
    tx: mpsc::UnboundedSender<QueuedTask>,
    shared: Arc<Shared>,
}

impl Recorder {
    /// Create a queue and spawn its worker. Requires a tokio runtime.
    pub fn new() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<QueuedTask>();
        let (pending, _) = watch::channel(0usize);
        let shared = Arc::new(Shared {
            failure: Mutex::new(None),
            pending,
            seq: AtomicU64::new(0),
        });

        let worker_shared = Arc::clone(&shared);
        tokio::spawn(async move {
            // One task in flight at a time; the next is pulled only after
            // the previous action settles.
            while let Some(task) = rx.recv().await {
                debug!("running task #{} '{}'", task.seq, task.name);
                let result = task.action.await;
                if let Err(err) = &result {
                    warn!("task #{} '{}' failed: {}", task.seq, task.name, err);
                    if let Ok(mut failure) = worker_shared.failure.lock() {
                        if failure.is_none() {
                            *failure = Some(err.clone());
                        }
                    }
                }
                // The submitter may have dropped its handle; that is fine.
                let _ = task.done.send(result);
                worker_shared.pending.send_modify(|count| *count -= 1);
            }
        });

        Recorder { tx, shared }
    }

    /// Enqueue a named unit of work.
    ///
    /// Submission is synchronous: the task's position in the global order
    /// is fixed before this returns. The handle resolves once the task
    /// (and everything queued before it) has completed. Re-entrant
    /// submission from inside a running task is legal and appends after
    /// the currently running task.
    pub fn add<F>(&self, name: impl Into<String>, action: F) -> TaskHandle
    where
        F: Future<Output = Result<(), StepError>> + Send + 'static,
    {
        let name = name.into();
        let seq = self.shared.seq.fetch_add(1, Ordering::SeqCst);
        let (done, handle_rx) = oneshot::channel();

        self.shared.pending.send_modify(|count| *count += 1);
        let task = QueuedTask {
            name: name.clone(),
            seq,
            action: Box::pin(action),
            done,
        };
        if self.tx.send(task).is_err() {
            // Worker is gone; the dropped sender resolves the handle
            // with QueueClosed.
            self.shared.pending.send_modify(|count| *count -= 1);
        }

        TaskHandle {
            name,
            seq,
            rx: handle_rx,
        }
    }

    /// Record a failure without failing the current task's handle.
    ///
    /// Usable from inside a running task, or by an external timing
    /// supervisor treating the in-flight task as failed. Only the first
    /// failure since the last drain/reset is retained.
    pub fn fail(&self, err: StepError) {
        if let Ok(mut failure) = self.shared.failure.lock() {
            if failure.is_none() {
                *failure = Some(err);
            }
        }
    }

    /// Whether a failure has been recorded and not yet drained.
    pub fn has_failed(&self) -> bool {
        self.shared
            .failure
            .lock()
            .map(|failure| failure.is_some())
            .unwrap_or(false)
    }

    /// Number of tasks queued or running.
    pub fn pending(&self) -> usize {
        *self.shared.pending.borrow()
    }

    /// Wait until the queue is empty and idle.
    ///
    /// If a failure was recorded, it is propagated to this caller exactly
    /// once and then cleared; a subsequent drain of an untouched queue
    /// succeeds.
    pub async fn drain(&self) -> Result<(), StepError> {
        let mut pending = self.shared.pending.subscribe();
        pending
            .wait_for(|count| *count == 0)
            .await
            .map_err(|_| StepError::QueueClosed)?;

        let failure = self
            .shared
            .failure
            .lock()
            .ok()
            .and_then(|mut failure| failure.take());
        match failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Clear failure state, as at the start of a fresh queue.
    pub fn reset(&self) {
        if let Ok(mut failure) = self.shared.failure.lock() {
            *failure = None;
        }
    }
}

impl Default for Recorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to one submitted task.
///
/// Resolves with the task's own result once the worker has run it.
#[derive(Debug)]
pub struct TaskHandle {
    name: String,
    seq: u64,
    rx: oneshot::Receiver<Result<(), StepError>>,
}

impl TaskHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in the queue-wide submission order.
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

impl Future for TaskHandle {
    type Output = Result<(), StepError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(StepError::QueueClosed)),
            Poll::Pending => Poll::Pending,
        }
    }
}
