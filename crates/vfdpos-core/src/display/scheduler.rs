//! Display job scheduler
//!
//! Accepts asynchronous "display this now" requests, guarantees the
//! freshest request wins, and bounds how long any render occupies the
//! device. Exactly one job may be writing at a time; the session lock
//! provides total ordering of device writes.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use super::session::SessionManager;
use crate::config::SchedulerConfig;
use crate::error::DisplayError;
use crate::order::Order;

/// What a display job should render
#[derive(Debug, Clone)]
pub enum JobPayload {
    /// Static welcome banner
    Welcome(String),
    /// A validated customer order
    Order(Order),
}

/// Snapshot returned by the status endpoint
#[derive(Debug, Clone, Serialize)]
pub struct DisplayStatus {
    /// Whether the serial link currently answers a liveness probe
    pub connected: bool,
    /// Item count of the last fully rendered order
    pub current_order_item_count: usize,
}

struct ActiveJob {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Serializes render jobs onto the single device session.
///
/// Holds one active-job slot: submitting while a job is in flight
/// cancels the old job, waits briefly for it to stop, then starts the
/// new one. Jobs themselves only ever touch the device while holding
/// the session lock, so even a job that missed its cancellation window
/// cannot interleave bytes with its successor.
pub struct DisplayScheduler {
    session: Arc<Mutex<SessionManager>>,
    active: Mutex<Option<ActiveJob>>,
    config: SchedulerConfig,
}

impl DisplayScheduler {
    /// Create a scheduler over a shared session
    pub fn new(session: Arc<Mutex<SessionManager>>, config: SchedulerConfig) -> Self {
        Self {
            session,
            active: Mutex::new(None),
            config,
        }
    }

    /// Submit a render job, superseding any in-flight one.
    ///
    /// Resolves once the new job's write step finishes (success or
    /// failure); the job itself lives on until its dwell ceiling
    /// elapses or a newer job replaces it. A job cancelled before it
    /// reached the device resolves as [`DisplayError::Timeout`] and is
    /// guaranteed never to write afterwards.
    pub async fn submit(&self, payload: JobPayload) -> Result<(), DisplayError> {
        let mut slot = self.active.lock().await;

        if let Some(previous) = slot.take() {
            previous.cancel.cancel();
            if tokio::time::timeout(self.config.cancel_wait, previous.handle)
                .await
                .is_err()
            {
                // The stale job still holds or awaits the session lock;
                // it will observe cancellation before its write and its
                // leftover output is superseded by ours under the lock
                warn!("superseded job did not stop within cancel window, proceeding");
            }
        }

        let cancel = CancellationToken::new();
        let (done_tx, done_rx) = oneshot::channel();
        let session = Arc::clone(&self.session);
        let token = cancel.clone();
        let dwell = self.config.dwell;

        let handle = tokio::spawn(async move {
            let outcome = {
                let mut session = session.lock().await;
                if token.is_cancelled() {
                    debug!("job cancelled before reaching the device");
                    let _ = done_tx.send(Err(DisplayError::Timeout));
                    return;
                }
                match &payload {
                    JobPayload::Welcome(text) => session.show_welcome(text),
                    JobPayload::Order(order) => session.show_order(order),
                }
            };

            let rendered = outcome.is_ok();
            let _ = done_tx.send(outcome);

            if rendered {
                // Keep the job alive for its dwell window so the next
                // submit supersedes it explicitly; the device is not
                // cleared when the window ends
                tokio::select! {
                    _ = token.cancelled() => debug!("job superseded during dwell"),
                    _ = tokio::time::sleep(dwell) => debug!("job dwell elapsed"),
                }
            }
        });

        *slot = Some(ActiveJob { cancel, handle });
        drop(slot);

        match done_rx.await {
            Ok(result) => result,
            // Job task dropped the sender without reporting (aborted)
            Err(_) => Err(DisplayError::Timeout),
        }
    }

    /// Health probe for the status endpoint; never mutates the
    /// displayed snapshot.
    pub async fn status(&self) -> DisplayStatus {
        let mut session = self.session.lock().await;
        DisplayStatus {
            connected: session.probe(),
            current_order_item_count: session.current_order().map(Order::len).unwrap_or(0),
        }
    }

    /// Cancel the active job and close the device session.
    pub async fn shutdown(&self) {
        let mut slot = self.active.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel.cancel();
            let _ = tokio::time::timeout(self.config.cancel_wait, previous.handle).await;
        }
        drop(slot);
        self.session.lock().await.shutdown();
    }
}
