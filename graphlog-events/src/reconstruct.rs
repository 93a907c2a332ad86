//! Batch reconstruction of event history.
//!
//! For repositories that carry content but no event log, synthesizes one
//! creation event per domain instance and one per relation, as if the log
//! had existed all along. The source data has no timestamps, so events get
//! a synthetic strictly-increasing sequence: the current instant at the
//! start, stepping by a fixed increment per event, all instance events
//! before all relation events.
//!
//! Intended to run at most once per repository. There is no guard against
//! re-running: a second run synthesizes a second, duplicate set of events.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use graphlog_client::GraphStore;
use graphlog_core::Triple;

use crate::event::{EventKind, GraphEvent};

/// Seconds between consecutive synthetic timestamps.
pub const SYNTHETIC_STEP_SECS: i64 = 10;

/// Scans the repository's content and writes a synthesized event log in
/// one bulk add. Returns the number of events created.
pub async fn synthesize_history(store: &dyn GraphStore) -> Result<usize> {
    synthesize_history_from(store, Utc::now()).await
}

/// As [`synthesize_history`], with an explicit timestamp baseline.
pub async fn synthesize_history_from(
    store: &dyn GraphStore,
    baseline: DateTime<Utc>,
) -> Result<usize> {
    let instances = store.instance_creation_statements().await?;
    let relations = store.instance_relation_statements().await?;
    debug!(
        instances = instances.len(),
        relations = relations.len(),
        "scanned repository content"
    );

    let step = Duration::seconds(SYNTHETIC_STEP_SECS);
    let mut time = baseline;
    let mut triples: Vec<Triple> = Vec::new();

    for (instance, entity_type) in &instances {
        let event = GraphEvent::reconstructed(
            time,
            EventKind::Instance {
                subject: instance.clone(),
                entity_type: entity_type.clone(),
                added: true,
            },
        );
        // the type triple already exists, only the event is written
        triples.extend(event.to_triples());
        time += step;
    }

    for (subject, relation, object) in &relations {
        let event = GraphEvent::reconstructed(
            time,
            EventKind::Relation {
                subject: subject.clone(),
                object: object.clone(),
                relation: relation.clone(),
                added: true,
            },
        );
        // likewise, the relation triple itself is not re-emitted
        triples.extend(event.to_triples());
        time += step;
    }

    store.insert(&triples).await?;

    let count = instances.len() + relations.len();
    info!(events = count, "synthesized event history");
    Ok(count)
}
