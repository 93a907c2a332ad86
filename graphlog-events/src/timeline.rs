//! The timeline feed.
//!
//! Replays the full event log into renderable entries: all events ordered
//! by time, each classified through its stored description and given a
//! human-readable message, newest first. Events whose description cannot
//! be classified (for instance, written by an older vocabulary) are
//! skipped rather than failing the whole feed.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::warn;

use graphlog_client::GraphStore;

use crate::bus::EventConsumer;
use crate::event::GraphEvent;

/// One renderable row of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub event: GraphEvent,
    pub message: String,
    /// Clock-time label, `HH:MM:SS`.
    pub date_string: String,
}

impl TimelineEntry {
    fn from_event(event: GraphEvent) -> Self {
        Self {
            message: event.message(),
            date_string: event.time.format("%H:%M:%S").to_string(),
            event,
        }
    }
}

/// Pull-based view over the event log, caching one replay per refresh.
pub struct TimelineFeed {
    store: Arc<dyn GraphStore>,
    entries: RwLock<Vec<TimelineEntry>>,
}

impl TimelineFeed {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Fetches and classifies the full event log, newest first.
    pub async fn load(&self) -> Result<Vec<TimelineEntry>> {
        let mut records = self.store.all_events().await?;
        records.sort_by_key(|r| r.time);

        let mut entries = Vec::with_capacity(records.len());
        for record in records {
            let description = self.store.event_description(&record.id).await?;
            match GraphEvent::from_description(&record.id, &description) {
                Some(event) => entries.push(TimelineEntry::from_event(event)),
                None => warn!(event = %record.id, "skipping unclassifiable event"),
            }
        }
        entries.reverse();
        Ok(entries)
    }

    /// The entries of the most recent replay.
    pub async fn entries(&self) -> Vec<TimelineEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl EventConsumer for TimelineFeed {
    /// Discards the cached replay and re-fetches the full log.
    async fn refresh(&self) {
        match self.load().await {
            Ok(entries) => *self.entries.write().await = entries,
            Err(err) => warn!(%err, "timeline refresh failed, keeping stale entries"),
        }
    }
}
