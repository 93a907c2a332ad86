//! The graph-store contract consumed by the event core.
//!
//! The trait captures the repository operations the workspace relies on at
//! the level the core reasons about them: batched statement inserts,
//! single-statement deletes and the handful of semantic reads behind event
//! emission, reconstruction and the timeline. Implementations translate
//! these into their own query language; callers never build SPARQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use graphlog_core::{vocab, Triple};

use crate::Result;

/// Fallback value substituted when an expected literal is absent.
pub const MISSING_LITERAL: &str = "N/A";

/// One row of the event log: identifier plus emission time.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: String,
    pub time: DateTime<Utc>,
}

/// Read/write contract of a triple repository.
///
/// All identifiers are CURIEs. Writes carry no atomicity guarantee across
/// calls; a batch insert is one repository operation, a delete removes one
/// statement.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Implementation name, for diagnostics.
    fn name(&self) -> &'static str;

    /// Adds a batch of statements in one repository operation.
    async fn insert(&self, triples: &[Triple]) -> Result<()>;

    /// Deletes a single statement.
    async fn delete(&self, triple: &Triple) -> Result<()>;

    /// One-hop description of an instance: every statement where it appears
    /// as subject or object, excluding statements whose subject is an event
    /// instance. Event history survives instance removal.
    async fn instance_description(&self, instance: &str) -> Result<Vec<Triple>>;

    /// True when the exact statement exists.
    async fn triple_exists(&self, subject: &str, predicate: &str, object: &str) -> Result<bool>;

    /// True when some statement with this predicate connects an instance of
    /// `source_type` to an instance of `target_type`.
    async fn relation_exists_between_types(
        &self,
        source_type: &str,
        target_type: &str,
        relation: &str,
    ) -> Result<bool>;

    /// All `(instance, type)` pairs that record creation of a domain
    /// instance. Schema/meta types, transparent join types and events are
    /// excluded (the shared denylist in [`vocab`]).
    async fn instance_creation_statements(&self) -> Result<Vec<(String, String)>>;

    /// All `(subject, predicate, object)` statements relating two typed
    /// domain instances. Type assertions, literal objects and statements
    /// touching meta or transparent types are excluded.
    async fn instance_relation_statements(&self) -> Result<Vec<(String, String, String)>>;

    /// All event instances with their emission times, unordered.
    async fn all_events(&self) -> Result<Vec<EventRecord>>;

    /// Full description of one event instance.
    async fn event_description(&self, event: &str) -> Result<Vec<Triple>>;

    /// Distinct non-trivial types present in the repository.
    async fn non_trivial_types(&self) -> Result<Vec<String>>;

    /// Instances of a type; `custom_query` overrides the default listing
    /// query when a view carries its own.
    async fn instances_of_type(
        &self,
        entity_type: &str,
        custom_query: Option<&str>,
    ) -> Result<Vec<String>>;

    /// The literal value of `(instance, predicate, ?)`, or
    /// [`MISSING_LITERAL`] when absent.
    async fn literal_of(&self, instance: &str, predicate: &str) -> Result<String>;

    /// The object of `(subject, predicate, ?)`, shortened, when present.
    async fn object_of(&self, subject: &str, predicate: &str) -> Result<Option<String>>;
}

/// True when the instance heads an RDF collection (has an `rdf:first`).
pub async fn is_collection(store: &dyn GraphStore, instance: &str) -> Result<bool> {
    Ok(store.object_of(instance, vocab::rdf::FIRST).await?.is_some())
}

/// Walks an RDF collection from its head, returning the member instances
/// in list order. Non-collections yield an empty list.
pub async fn fetch_collection(store: &dyn GraphStore, instance: &str) -> Result<Vec<String>> {
    let mut members = Vec::new();
    let Some(first) = store.object_of(instance, vocab::rdf::FIRST).await? else {
        return Ok(members);
    };
    members.push(first);

    let mut rest = store.object_of(instance, vocab::rdf::REST).await?;
    while let Some(cell) = rest {
        if cell == vocab::rdf::NIL {
            break;
        }
        if let Some(member) = store.object_of(&cell, vocab::rdf::FIRST).await? {
            members.push(member);
        }
        rest = store.object_of(&cell, vocab::rdf::REST).await?;
    }
    Ok(members)
}
