//! Triple-delta construction.
//!
//! Translates a [`MutationRequest`] into the full set of triples one event
//! writes: the universal event header, the kind-specific content triples
//! and the event description, partitioned into an add set and a remove
//! set. Removal deltas delegate the one-hop description fetch to the graph
//! store; everything else is built structurally.

use anyhow::{bail, Context, Result};
use uuid::Uuid;

use graphlog_client::GraphStore;
use graphlog_core::{vocab, Term, Triple};

use crate::event::{EventKind, GraphEvent};
use crate::mutation::{ActionKind, EventType, MutationRequest};

/// The complete write set of one event.
#[derive(Debug, Clone)]
pub struct EventDelta {
    pub event: GraphEvent,
    /// Content triples plus event triples, stored in one bulk write.
    pub to_add: Vec<Triple>,
    /// Content triples queued for individual deletion.
    pub to_remove: Vec<Triple>,
}

/// Builds the delta for a mutation request. Allocates the event identifier
/// and, for instance creation, the fresh subject identifier.
pub async fn build_delta(
    store: &dyn GraphStore,
    request: &MutationRequest,
) -> Result<EventDelta> {
    match request.event_type {
        EventType::AddInstance => build_add_instance(request),
        EventType::RemoveInstance => build_remove_instance(store, request).await,
        EventType::AddRelation => build_add_relation(request),
        EventType::RemoveRelation => build_remove_relation(request),
    }
}

fn build_add_instance(request: &MutationRequest) -> Result<EventDelta> {
    let subject_type = request
        .subject_type
        .clone()
        .context("instance creation requires a subject type")?;

    let (subject, attribute_params): (String, &[(&str, &str)]) = match request.action {
        ActionKind::AddUser => (
            fresh_id(vocab::ids::USER),
            &[
                ("name", vocab::foaf::NAME),
                ("firstname", vocab::foaf::FIRST_NAME),
                ("lastname", vocab::foaf::LAST_NAME),
            ],
        ),
        ActionKind::AddGroup => (fresh_id(vocab::ids::GROUP), &[("name", vocab::foaf::NAME)]),
        ActionKind::AddDisplayGroup => (
            fresh_id(vocab::ids::DISPLAY_GROUP),
            &[("name", vocab::foaf::NAME)],
        ),
        other => bail!("action {:?} does not create an instance", other),
    };

    let mut to_add = Vec::new();
    for (param, predicate) in attribute_params.iter().copied() {
        if let Some(value) = request.param(param) {
            to_add.push(Triple::new(&subject, predicate, Term::literal(value)));
        }
    }
    to_add.push(Triple::iri(&subject, vocab::rdf::TYPE, &subject_type));

    let event = GraphEvent::local(EventKind::Instance {
        subject,
        entity_type: subject_type,
        added: true,
    });
    to_add.extend(event.to_triples());

    Ok(EventDelta {
        event,
        to_add,
        to_remove: Vec::new(),
    })
}

async fn build_remove_instance(
    store: &dyn GraphStore,
    request: &MutationRequest,
) -> Result<EventDelta> {
    let subject = request
        .subject
        .clone()
        .context("instance removal requires a subject")?;
    let subject_type = request
        .subject_type
        .clone()
        .context("instance removal requires a subject type")?;

    // every statement touching the instance goes, but never event history
    let to_remove = store.instance_description(&subject).await?;

    let event = GraphEvent::local(EventKind::Instance {
        subject,
        entity_type: subject_type,
        added: false,
    });
    let to_add = event.to_triples();

    Ok(EventDelta {
        event,
        to_add,
        to_remove,
    })
}

fn build_add_relation(request: &MutationRequest) -> Result<EventDelta> {
    let (subject, predicate, object) = relation_fields(request)?;

    let mut to_add = vec![Triple::iri(&subject, &predicate, &object)];
    if request.action == ActionKind::AddDisplayToGroup {
        to_add.extend(display_in_group_triples(&subject, &object));
    }
    // TODO: Project actions should also describe the projection instance
    // (geometry and source mapping) once the projection model is settled

    let event = GraphEvent::local(EventKind::Relation {
        subject,
        object,
        relation: predicate,
        added: true,
    });
    to_add.extend(event.to_triples());

    Ok(EventDelta {
        event,
        to_add,
        to_remove: Vec::new(),
    })
}

fn build_remove_relation(request: &MutationRequest) -> Result<EventDelta> {
    let (subject, predicate, object) = relation_fields(request)?;

    let to_remove = vec![Triple::iri(&subject, &predicate, &object)];
    let event = GraphEvent::local(EventKind::Relation {
        subject,
        object,
        relation: predicate,
        added: false,
    });
    let to_add = event.to_triples();

    Ok(EventDelta {
        event,
        to_add,
        to_remove,
    })
}

fn relation_fields(request: &MutationRequest) -> Result<(String, String, String)> {
    Ok((
        request
            .subject
            .clone()
            .context("relation change requires a subject")?,
        request
            .predicate
            .clone()
            .context("relation change requires a predicate")?,
        request
            .object
            .clone()
            .context("relation change requires an object")?,
    ))
}

/// The join entity attaching a display to a display group, placed at the
/// group origin with a default extent.
fn display_in_group_triples(display: &str, group: &str) -> Vec<Triple> {
    let join = fresh_id(vocab::ids::DISPLAY_IN_DG);
    vec![
        Triple::iri(
            &join,
            vocab::rdf::TYPE,
            vocab::entities::DISPLAY_IN_DISPLAY_GROUP,
        ),
        Triple::iri(&join, vocab::placement::IS_FROM, display),
        Triple::iri(&join, vocab::placement::BELONGS_TO, group),
        Triple::new(&join, vocab::placement::X, Term::integer(0)),
        Triple::new(&join, vocab::placement::Y, Term::integer(0)),
        Triple::new(&join, vocab::placement::Z, Term::integer(0)),
        Triple::new(&join, vocab::placement::WIDTH, Term::integer(100)),
        Triple::new(&join, vocab::placement::HEIGHT, Term::integer(100)),
    ]
}

fn fresh_id(prefix: &str) -> String {
    format!("{}{}", prefix, Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphlog_client::MemoryRepository;
    use std::collections::HashMap;

    fn user_params() -> HashMap<String, String> {
        HashMap::from([
            ("name".to_string(), "Jane Doe".to_string()),
            ("firstname".to_string(), "Jane".to_string()),
            ("lastname".to_string(), "Doe".to_string()),
        ])
    }

    #[tokio::test]
    async fn add_user_delta_shape() {
        let store = MemoryRepository::new();
        let request =
            MutationRequest::add_instance(ActionKind::AddUser, "pxio:User", user_params());
        let delta = build_delta(&store, &request).await.unwrap();

        assert!(delta.to_remove.is_empty());
        let subject = match &delta.event.kind {
            EventKind::Instance { subject, .. } => subject.clone(),
            other => panic!("expected instance event, got {:?}", other),
        };
        assert!(subject.starts_with("data:users_"));

        // name, firstName, lastName plus the type assertion
        let content: Vec<&Triple> = delta
            .to_add
            .iter()
            .filter(|t| t.subject == subject)
            .collect();
        assert_eq!(content.len(), 4);
        assert!(content.iter().any(|t| t.predicate == "foaf:name"
            && t.object.lexical_value() == "Jane Doe"));
        assert!(content.iter().any(|t| t.predicate == "foaf:firstName"));
        assert!(content.iter().any(|t| t.predicate == "foaf:lastName"));
        assert!(content
            .iter()
            .any(|t| t.predicate == "rdf:type" && t.object.as_iri() == Some("pxio:User")));

        // event description points at the fresh subject
        assert!(delta.to_add.iter().any(
            |t| t.predicate == "pxio:isFor" && t.object.as_iri() == Some(subject.as_str())
        ));
        assert!(delta
            .to_add
            .iter()
            .any(|t| t.predicate == "pxio:hasType" && t.object.as_iri() == Some("pxio:User")));
    }

    #[tokio::test]
    async fn add_group_only_takes_a_name() {
        let store = MemoryRepository::new();
        let request = MutationRequest::add_instance(
            ActionKind::AddGroup,
            "pxio:UserGroup",
            HashMap::from([("name".to_string(), "Devs".to_string())]),
        );
        let delta = build_delta(&store, &request).await.unwrap();
        let subject = match &delta.event.kind {
            EventKind::Instance { subject, .. } => subject.clone(),
            other => panic!("expected instance event, got {:?}", other),
        };
        assert!(subject.starts_with("data:group_"));
        let content: Vec<&Triple> = delta
            .to_add
            .iter()
            .filter(|t| t.subject == subject)
            .collect();
        assert_eq!(content.len(), 2);
    }

    #[tokio::test]
    async fn add_instance_with_relation_action_is_rejected() {
        let store = MemoryRepository::new();
        let request = MutationRequest::add_instance(
            ActionKind::AddUserToGroup,
            "pxio:User",
            HashMap::new(),
        );
        assert!(build_delta(&store, &request).await.is_err());
    }

    #[tokio::test]
    async fn display_to_group_synthesizes_the_join_entity() {
        let store = MemoryRepository::new();
        let request = MutationRequest::add_relation(
            ActionKind::AddDisplayToGroup,
            "entities:display_1",
            "pxio:isIn",
            "data:dg_1",
        );
        let delta = build_delta(&store, &request).await.unwrap();

        // the relation triple itself
        assert!(delta.to_add.contains(&Triple::iri(
            "entities:display_1",
            "pxio:isIn",
            "data:dg_1"
        )));

        let join_subject = delta
            .to_add
            .iter()
            .find(|t| t.object.as_iri() == Some("entities:DisplayInDisplayGroup"))
            .map(|t| t.subject.clone())
            .expect("join entity type assertion");
        assert!(join_subject.starts_with("pxio:display_in_dg_"));

        let join: Vec<&Triple> = delta
            .to_add
            .iter()
            .filter(|t| t.subject == join_subject)
            .collect();
        assert_eq!(join.len(), 8);
        let value = |p: &str| {
            join.iter()
                .find(|t| t.predicate == p)
                .map(|t| t.object.lexical_value().to_string())
        };
        assert_eq!(value("pxio:isFrom").as_deref(), Some("entities:display_1"));
        assert_eq!(value("pxio:belongsTo").as_deref(), Some("data:dg_1"));
        assert_eq!(value("pxio:x").as_deref(), Some("0"));
        assert_eq!(value("pxio:y").as_deref(), Some("0"));
        assert_eq!(value("pxio:z").as_deref(), Some("0"));
        assert_eq!(value("pxio:width").as_deref(), Some("100"));
        assert_eq!(value("pxio:height").as_deref(), Some("100"));
    }

    #[tokio::test]
    async fn plain_relation_add_carries_no_auxiliary_triples() {
        let store = MemoryRepository::new();
        let request = MutationRequest::add_relation(
            ActionKind::AddUserToGroup,
            "data:group_1",
            "foaf:member",
            "data:users_1",
        );
        let delta = build_delta(&store, &request).await.unwrap();
        // one relation triple + 3 header + 5 description triples
        assert_eq!(delta.to_add.len(), 9);
        assert!(delta.to_remove.is_empty());
    }

    #[tokio::test]
    async fn remove_relation_queues_exactly_one_deletion() {
        let store = MemoryRepository::new();
        let request = MutationRequest::remove_relation(
            ActionKind::RemoveUserFromGroup,
            "data:group_1",
            "foaf:member",
            "data:users_1",
        );
        let delta = build_delta(&store, &request).await.unwrap();
        assert_eq!(
            delta.to_remove,
            vec![Triple::iri("data:group_1", "foaf:member", "data:users_1")]
        );
        assert!(!delta.event.is_added());
        assert!(!delta.event.is_for_instance());
    }

    #[tokio::test]
    async fn remove_instance_pulls_the_description_but_not_events() {
        let store = MemoryRepository::new();
        store
            .insert(&[
                Triple::iri("data:users_1", "rdf:type", "pxio:User"),
                Triple::new("data:users_1", "foaf:name", Term::literal("Jane")),
                Triple::iri("data:group_1", "foaf:member", "data:users_1"),
                Triple::iri("pxio:event_0", "rdf:type", "pxio:Event"),
                Triple::iri("pxio:event_0", "pxio:isFor", "data:users_1"),
            ])
            .await
            .unwrap();

        let request =
            MutationRequest::remove_instance(ActionKind::RemoveUser, "data:users_1", "pxio:User");
        let delta = build_delta(&store, &request).await.unwrap();

        assert_eq!(delta.to_remove.len(), 3);
        assert!(delta.to_remove.iter().all(|t| t.subject != "pxio:event_0"));
        // the removal event itself is added, never removed
        assert!(delta
            .to_add
            .iter()
            .any(|t| t.predicate == "pxio:isAdded" && t.object.lexical_value() == "false"));
    }
}
