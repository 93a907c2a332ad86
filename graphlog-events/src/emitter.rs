//! The event emitter.
//!
//! Single intake for all mutation requests. Each request becomes one
//! event: the delta is built, the add set goes to the store as one bulk
//! write while every removal is issued as an individual delete, all
//! concurrently in flight. Once both halves have settled, win or lose, one
//! completion notification is broadcast.
//!
//! There is no atomicity across the two halves and no retry: a failed
//! write is logged and abandoned, and the half that succeeded stays in the
//! repository. Callers get fire-and-forget semantics only.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, error, warn};

use graphlog_client::GraphStore;

use crate::bus::EventBus;
use crate::delta::{build_delta, EventDelta};
use crate::mutation::MutationRequest;

/// Emitter bound to one repository connection.
#[derive(Clone)]
pub struct EventEmitter {
    store: Arc<dyn GraphStore>,
    bus: EventBus,
}

impl EventEmitter {
    pub fn new(store: Arc<dyn GraphStore>, bus: EventBus) -> Self {
        Self { store, bus }
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Accepts a mutation request and returns immediately. Persistence
    /// happens in a background task; completion is observable only through
    /// the bus.
    pub fn submit(&self, request: MutationRequest) {
        let emitter = self.clone();
        tokio::spawn(async move {
            emitter.process(request).await;
        });
    }

    /// Runs one request to completion. Exposed for embedders that want to
    /// await settlement instead of subscribing to the bus.
    pub async fn process(&self, request: MutationRequest) {
        debug!(?request.event_type, ?request.action, "processing mutation request");

        let delta = match build_delta(self.store.as_ref(), &request).await {
            Ok(delta) => delta,
            Err(err) => {
                // the request dies here: no triples were written, so no
                // notification fires for it
                error!(%err, "failed to build event delta");
                return;
            }
        };

        self.persist(&delta).await;
        self.bus.notify_refresh();
    }

    /// Issues the add set and the remove set as concurrently in-flight
    /// requests and waits for both to settle. Failures are logged and
    /// swallowed; sibling deletes proceed regardless.
    async fn persist(&self, delta: &EventDelta) {
        let event_id = delta.event.id.as_str();

        let add_half = async {
            match self.store.insert(&delta.to_add).await {
                Ok(()) => debug!(event = event_id, count = delta.to_add.len(), "event data stored"),
                Err(err) => error!(event = event_id, %err, "failed to store event data"),
            }
        };

        let remove_half = async {
            let deletes = delta.to_remove.iter().map(|triple| async move {
                if let Err(err) = self.store.delete(triple).await {
                    warn!(
                        event = event_id,
                        subject = %triple.subject,
                        predicate = %triple.predicate,
                        %err,
                        "failed to delete statement"
                    );
                }
            });
            join_all(deletes).await;
        };

        tokio::join!(add_half, remove_half);
    }
}
