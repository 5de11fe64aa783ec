//! One-way progress notifications from generation workers to the UI.
//!
//! Delivery is best effort: one attempt per event, no acknowledgement, and
//! events published while nobody listens are dropped. The job registry stays
//! the source of truth.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub job_id: Uuid,
    pub current_page: u32,
    pub total_pages: u32,
}

pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Forwards events into an unbounded channel (used by the SSE endpoint).
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelObserver {
    pub fn new(sender: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&self, event: &ProgressEvent) {
        if self.sender.send(event.clone()).is_err() {
            log::debug!("Progress subscriber went away, dropping event");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Holds at most one observer; registering another replaces it.
#[derive(Default)]
pub struct ProgressChannel {
    slot: Mutex<Option<(ObserverId, Arc<dyn ProgressObserver>)>>,
    next_id: AtomicU64,
}

impl ProgressChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, observer: Arc<dyn ProgressObserver>) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        if self.slot.lock().replace((id, observer)).is_some() {
            log::info!("Progress observer replaced by a new subscriber");
        }
        id
    }

    /// Clear the slot if `id` is still the active observer.
    pub fn unregister(&self, id: ObserverId) -> bool {
        let mut slot = self.slot.lock();
        if slot.as_ref().map(|(active, _)| *active) != Some(id) {
            return false;
        }
        *slot = None;
        true
    }

    pub fn has_observer(&self) -> bool {
        self.slot.lock().is_some()
    }

    pub fn publish(&self, event: ProgressEvent) {
        // Never call out to the observer while holding the slot lock.
        let observer = self.slot.lock().as_ref().map(|(_, o)| o.clone());
        match observer {
            Some(observer) => observer.on_progress(&event),
            None => log::trace!(
                "No progress observer, dropping event for job {}",
                event.job_id
            ),
        }
    }
}
