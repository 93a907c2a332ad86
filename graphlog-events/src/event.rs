//! The event model.
//!
//! An event is one atomic user-visible change to the graph, persisted as a
//! set of triples under its own identifier. The enum shape guarantees that
//! an event describes either an instance change or a relation change,
//! never both.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use graphlog_core::{vocab, Term, Triple};

/// What an event describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Creation or removal of an entity.
    Instance {
        subject: String,
        entity_type: String,
        added: bool,
    },
    /// Creation or removal of a relation between two entities.
    Relation {
        subject: String,
        object: String,
        relation: String,
        added: bool,
    },
}

/// One atomic change to the graph, immutable once written. Corrections are
/// expressed as new events; events referencing since-removed entities stay
/// in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEvent {
    /// Fresh identifier under the reserved event prefix, never reused.
    pub id: String,
    pub time: DateTime<Utc>,
    /// True when produced by a live action in this session.
    pub is_local: bool,
    pub kind: EventKind,
}

impl GraphEvent {
    /// Allocates a fresh event identifier.
    pub fn allocate_id() -> String {
        format!("{}{}", vocab::event::ID_PREFIX, Uuid::new_v4())
    }

    /// A live event stamped with the current instant.
    pub fn local(kind: EventKind) -> Self {
        Self {
            id: Self::allocate_id(),
            time: Utc::now(),
            is_local: true,
            kind,
        }
    }

    /// A reconstructed event with a synthetic timestamp.
    pub fn reconstructed(time: DateTime<Utc>, kind: EventKind) -> Self {
        Self {
            id: Self::allocate_id(),
            time,
            is_local: false,
            kind,
        }
    }

    pub fn is_for_instance(&self) -> bool {
        matches!(self.kind, EventKind::Instance { .. })
    }

    pub fn is_added(&self) -> bool {
        match &self.kind {
            EventKind::Instance { added, .. } => *added,
            EventKind::Relation { added, .. } => *added,
        }
    }

    /// The universal header triples every event carries.
    pub fn header_triples(&self) -> Vec<Triple> {
        vec![
            Triple::iri(&self.id, vocab::rdf::TYPE, vocab::event::TYPE),
            Triple::new(
                &self.id,
                vocab::event::TIME,
                Term::literal(self.time.to_rfc3339_opts(SecondsFormat::Millis, true)),
            ),
            Triple::new(&self.id, vocab::event::IS_LOCAL, Term::boolean(self.is_local)),
        ]
    }

    /// The kind-specific description triples.
    pub fn description_triples(&self) -> Vec<Triple> {
        match &self.kind {
            EventKind::Instance {
                subject,
                entity_type,
                added,
            } => vec![
                Triple::new(&self.id, vocab::event::IS_FOR_INSTANCE, Term::boolean(true)),
                Triple::new(&self.id, vocab::event::IS_ADDED, Term::boolean(*added)),
                Triple::iri(&self.id, vocab::event::IS_FOR, subject),
                Triple::iri(&self.id, vocab::event::HAS_TYPE, entity_type),
            ],
            EventKind::Relation {
                subject,
                object,
                relation,
                added,
            } => vec![
                Triple::new(
                    &self.id,
                    vocab::event::IS_FOR_INSTANCE,
                    Term::boolean(false),
                ),
                Triple::new(&self.id, vocab::event::IS_ADDED, Term::boolean(*added)),
                Triple::iri(&self.id, vocab::event::IS_FOR_SUBJECT, subject),
                Triple::iri(&self.id, vocab::event::IS_FOR_OBJECT, object),
                Triple::iri(&self.id, vocab::event::HAS_TYPE, relation),
            ],
        }
    }

    /// All triples persisting this event.
    pub fn to_triples(&self) -> Vec<Triple> {
        let mut triples = self.header_triples();
        triples.extend(self.description_triples());
        triples
    }

    /// Rebuilds an event from its stored description. Returns `None` when
    /// the description lacks the discriminators, which consumers treat as
    /// an unclassifiable log entry and skip.
    pub fn from_description(id: &str, triples: &[Triple]) -> Option<Self> {
        let value_of = |predicate: &str| {
            triples
                .iter()
                .find(|t| t.subject == id && t.predicate == predicate)
                .map(|t| t.object.lexical_value().to_string())
        };

        let time = DateTime::parse_from_rfc3339(&value_of(vocab::event::TIME)?)
            .ok()?
            .with_timezone(&Utc);
        let is_local = value_of(vocab::event::IS_LOCAL)? == "true";
        let is_for_instance = value_of(vocab::event::IS_FOR_INSTANCE)? == "true";
        let added = value_of(vocab::event::IS_ADDED)? == "true";

        let kind = if is_for_instance {
            EventKind::Instance {
                subject: value_of(vocab::event::IS_FOR)?,
                entity_type: value_of(vocab::event::HAS_TYPE)?,
                added,
            }
        } else {
            EventKind::Relation {
                subject: value_of(vocab::event::IS_FOR_SUBJECT)?,
                object: value_of(vocab::event::IS_FOR_OBJECT)?,
                relation: value_of(vocab::event::HAS_TYPE)?,
                added,
            }
        };

        Some(Self {
            id: id.to_string(),
            time,
            is_local,
            kind,
        })
    }

    /// Human-readable message for the timeline.
    pub fn message(&self) -> String {
        match &self.kind {
            EventKind::Instance {
                subject,
                entity_type,
                added,
            } => {
                if *added {
                    format!("Added a new {} {}", entity_type, subject)
                } else {
                    format!("Removed a {} {}", entity_type, subject)
                }
            }
            EventKind::Relation {
                subject,
                object,
                relation,
                added,
            } => {
                if *added {
                    format!(
                        "Added a new relation {} between {} and {}",
                        relation, subject, object
                    )
                } else {
                    format!(
                        "Removed existing relation {} between {} and {}",
                        relation, subject, object
                    )
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instance_event() -> GraphEvent {
        GraphEvent::local(EventKind::Instance {
            subject: "data:users_1".to_string(),
            entity_type: "pxio:User".to_string(),
            added: true,
        })
    }

    fn relation_event() -> GraphEvent {
        GraphEvent::local(EventKind::Relation {
            subject: "data:group_1".to_string(),
            object: "data:users_1".to_string(),
            relation: "foaf:member".to_string(),
            added: false,
        })
    }

    #[test]
    fn fresh_ids_are_unique() {
        let ids: Vec<String> = (0..100).map(|_| GraphEvent::allocate_id()).collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
        assert!(ids.iter().all(|id| id.starts_with("pxio:event_")));
    }

    #[test]
    fn instance_event_triples() {
        let event = instance_event();
        let triples = event.to_triples();
        // 3 header triples + 4 description triples
        assert_eq!(triples.len(), 7);
        assert!(triples
            .iter()
            .any(|t| t.predicate == "rdf:type" && t.object.as_iri() == Some("pxio:Event")));
        assert!(triples
            .iter()
            .any(|t| t.predicate == "pxio:isFor" && t.object.as_iri() == Some("data:users_1")));
        assert!(triples
            .iter()
            .any(|t| t.predicate == "pxio:hasType" && t.object.as_iri() == Some("pxio:User")));
        // an instance event never carries relation predicates
        assert!(!triples.iter().any(|t| t.predicate == "pxio:isForSubject"));
        assert!(!triples.iter().any(|t| t.predicate == "pxio:isForObject"));
    }

    #[test]
    fn relation_event_triples() {
        let event = relation_event();
        let triples = event.to_triples();
        assert_eq!(triples.len(), 8);
        assert!(triples.iter().any(
            |t| t.predicate == "pxio:isForSubject" && t.object.as_iri() == Some("data:group_1")
        ));
        assert!(triples.iter().any(
            |t| t.predicate == "pxio:isForObject" && t.object.as_iri() == Some("data:users_1")
        ));
        assert!(!triples.iter().any(|t| t.predicate == "pxio:isFor"));
    }

    #[test]
    fn description_roundtrip() {
        for event in [instance_event(), relation_event()] {
            let triples = event.to_triples();
            let rebuilt = GraphEvent::from_description(&event.id, &triples).unwrap();
            assert_eq!(rebuilt.kind, event.kind);
            assert_eq!(rebuilt.is_local, event.is_local);
            // millisecond precision survives the wire format
            assert_eq!(
                rebuilt.time.timestamp_millis(),
                event.time.timestamp_millis()
            );
        }
    }

    #[test]
    fn incomplete_description_is_rejected() {
        let event = instance_event();
        let mut triples = event.to_triples();
        triples.retain(|t| t.predicate != "pxio:isForInstance");
        assert!(GraphEvent::from_description(&event.id, &triples).is_none());
    }

    #[test]
    fn timeline_messages() {
        assert_eq!(
            instance_event().message(),
            "Added a new pxio:User data:users_1"
        );
        assert_eq!(
            relation_event().message(),
            "Removed existing relation foaf:member between data:group_1 and data:users_1"
        );
    }
}
