//! Completion-notification channel.
//!
//! Single writer, multiple readers. Publishing is fire-and-forget with no
//! backpressure: every live subscriber receives every notification, a
//! publish without subscribers is dropped silently, and a subscriber that
//! falls behind simply refreshes on the next signal it sees.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::debug;

/// Signal broadcast once an event's writes have settled. Carries no
/// payload; consumers re-issue their own queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notification {
    Refresh,
}

/// Broadcast channel for completion notifications.
#[derive(Debug, Clone)]
pub struct EventBus {
    notifier: broadcast::Sender<Notification>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (notifier, _) = broadcast::channel(capacity);
        Self { notifier }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.notifier.receiver_count()
    }

    /// Broadcasts a refresh signal to every subscriber.
    pub fn notify_refresh(&self) {
        // no subscribers is fine, the signal is simply dropped
        let _ = self.notifier.send(Notification::Refresh);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

/// A visualization or any other party interested in event completions.
/// On notification it must treat previously fetched data as stale and
/// re-fetch.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    async fn refresh(&self);
}

/// Wires a consumer to the bus: refreshes on every notification until the
/// bus is dropped. A lagged receiver refreshes immediately, since a
/// refresh already covers all missed signals.
pub fn spawn_refresh_loop(bus: &EventBus, consumer: Arc<dyn EventConsumer>) -> JoinHandle<()> {
    let mut receiver = bus.subscribe();
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(Notification::Refresh) => consumer.refresh().await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    debug!(missed, "refresh loop lagged, refreshing once");
                    consumer.refresh().await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}
