//! In-memory [`GraphStore`] for development and tests.
//!
//! Answers the semantic reads of the contract directly from a statement
//! set, with the same exclusion rules the RDF4J implementation expresses
//! as SPARQL filters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use graphlog_core::{vocab, Triple};

use crate::store::{EventRecord, GraphStore, MISSING_LITERAL};
use crate::Result;

/// Memory-backed repository. Cloning shares the underlying statement set.
#[derive(Clone, Default)]
pub struct MemoryRepository {
    triples: Arc<RwLock<Vec<Triple>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored statement.
    pub async fn triples(&self) -> Vec<Triple> {
        self.triples.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.triples.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.triples.read().await.is_empty()
    }

    pub async fn contains(&self, triple: &Triple) -> bool {
        self.triples.read().await.iter().any(|t| t == triple)
    }

    /// Statements with the given subject.
    pub async fn about(&self, subject: &str) -> Vec<Triple> {
        self.triples
            .read()
            .await
            .iter()
            .filter(|t| t.subject == subject)
            .cloned()
            .collect()
    }

    /// Subjects carrying the given type assertion.
    pub async fn subjects_of_type(&self, entity_type: &str) -> Vec<String> {
        self.typed_subjects(&*self.triples.read().await, entity_type)
    }

    fn typed_subjects(&self, triples: &[Triple], entity_type: &str) -> Vec<String> {
        let mut subjects: Vec<String> = triples
            .iter()
            .filter(|t| {
                t.predicate == vocab::rdf::TYPE && t.object.as_iri() == Some(entity_type)
            })
            .map(|t| t.subject.clone())
            .collect();
        subjects.dedup();
        subjects
    }
}

fn has_type(triples: &[Triple], subject: &str, entity_type: &str) -> bool {
    triples.iter().any(|t| {
        t.subject == subject
            && t.predicate == vocab::rdf::TYPE
            && t.object.as_iri() == Some(entity_type)
    })
}

fn has_any_type(triples: &[Triple], subject: &str) -> bool {
    triples
        .iter()
        .any(|t| t.subject == subject && t.predicate == vocab::rdf::TYPE)
}

#[async_trait]
impl GraphStore for MemoryRepository {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn insert(&self, triples: &[Triple]) -> Result<()> {
        let mut stored = self.triples.write().await;
        for triple in triples {
            // repository semantics: a statement set, duplicates collapse
            if !stored.iter().any(|t| t == triple) {
                stored.push(triple.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, triple: &Triple) -> Result<()> {
        let mut stored = self.triples.write().await;
        stored.retain(|t| t != triple);
        Ok(())
    }

    async fn instance_description(&self, instance: &str) -> Result<Vec<Triple>> {
        let stored = self.triples.read().await;
        Ok(stored
            .iter()
            .filter(|t| t.subject == instance || t.object.as_iri() == Some(instance))
            .filter(|t| !has_type(&stored, &t.subject, vocab::event::TYPE))
            .cloned()
            .collect())
    }

    async fn triple_exists(&self, subject: &str, predicate: &str, object: &str) -> Result<bool> {
        let stored = self.triples.read().await;
        Ok(stored.iter().any(|t| {
            t.subject == subject
                && t.predicate == predicate
                && t.object.lexical_value() == object
        }))
    }

    async fn relation_exists_between_types(
        &self,
        source_type: &str,
        target_type: &str,
        relation: &str,
    ) -> Result<bool> {
        let stored = self.triples.read().await;
        Ok(stored.iter().any(|t| {
            t.predicate == relation
                && has_type(&stored, &t.subject, source_type)
                && t.object
                    .as_iri()
                    .is_some_and(|o| has_type(&stored, o, target_type))
        }))
    }

    async fn instance_creation_statements(&self) -> Result<Vec<(String, String)>> {
        let stored = self.triples.read().await;
        let exclusions = vocab::creation_scan_exclusions();
        Ok(stored
            .iter()
            .filter(|t| t.predicate == vocab::rdf::TYPE)
            .filter_map(|t| {
                let entity_type = t.object.as_iri()?;
                if exclusions.contains(&entity_type) || vocab::is_trivial_curie(entity_type) {
                    return None;
                }
                Some((t.subject.clone(), entity_type.to_string()))
            })
            .collect())
    }

    async fn instance_relation_statements(&self) -> Result<Vec<(String, String, String)>> {
        let stored = self.triples.read().await;
        let exclusions = vocab::relation_scan_exclusions();
        Ok(stored
            .iter()
            .filter(|t| t.predicate != vocab::rdf::TYPE)
            .filter_map(|t| {
                let object = t.object.as_iri()?;
                if !has_any_type(&stored, &t.subject) || !has_any_type(&stored, object) {
                    return None;
                }
                let excluded = exclusions.iter().any(|ex| {
                    has_type(&stored, &t.subject, ex) || has_type(&stored, object, ex)
                });
                if excluded {
                    return None;
                }
                Some((t.subject.clone(), t.predicate.clone(), object.to_string()))
            })
            .collect())
    }

    async fn all_events(&self) -> Result<Vec<EventRecord>> {
        let stored = self.triples.read().await;
        let mut events = Vec::new();
        for id in self.typed_subjects(&stored, vocab::event::TYPE) {
            let Some(time) = stored
                .iter()
                .find(|t| t.subject == id && t.predicate == vocab::event::TIME)
                .map(|t| t.object.lexical_value().to_string())
            else {
                continue;
            };
            match DateTime::parse_from_rfc3339(&time) {
                Ok(parsed) => events.push(EventRecord {
                    id,
                    time: parsed.with_timezone(&Utc),
                }),
                Err(err) => warn!(event = %id, %err, "skipping event with unparseable timestamp"),
            }
        }
        Ok(events)
    }

    async fn event_description(&self, event: &str) -> Result<Vec<Triple>> {
        Ok(self.about(event).await)
    }

    async fn non_trivial_types(&self) -> Result<Vec<String>> {
        let stored = self.triples.read().await;
        let mut types: Vec<String> = stored
            .iter()
            .filter(|t| t.predicate == vocab::rdf::TYPE || t.predicate == vocab::rdfs::TYPE)
            .filter_map(|t| t.object.as_iri())
            .filter(|ty| !vocab::is_trivial_curie(ty))
            .map(str::to_string)
            .collect();
        types.sort();
        types.dedup();
        Ok(types)
    }

    async fn instances_of_type(
        &self,
        entity_type: &str,
        custom_query: Option<&str>,
    ) -> Result<Vec<String>> {
        if custom_query.is_some() {
            warn!("memory repository ignores custom listing queries");
        }
        Ok(self.subjects_of_type(entity_type).await)
    }

    async fn literal_of(&self, instance: &str, predicate: &str) -> Result<String> {
        let stored = self.triples.read().await;
        Ok(stored
            .iter()
            .find(|t| t.subject == instance && t.predicate == predicate && t.object.is_literal())
            .map(|t| t.object.lexical_value().to_string())
            .unwrap_or_else(|| MISSING_LITERAL.to_string()))
    }

    async fn object_of(&self, subject: &str, predicate: &str) -> Result<Option<String>> {
        let stored = self.triples.read().await;
        Ok(stored
            .iter()
            .find(|t| t.subject == subject && t.predicate == predicate)
            .map(|t| t.object.lexical_value().to_string()))
    }
}
