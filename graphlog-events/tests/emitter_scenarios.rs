//! End-to-end emitter scenarios against the in-memory repository.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, timeout};

use graphlog_client::{EventRecord, GraphStore, MemoryRepository, Result as ClientResult};
use graphlog_core::{Term, Triple};
use graphlog_events::{
    ActionKind, EventBus, EventEmitter, MutationRequest, Notification,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn user_params() -> HashMap<String, String> {
    HashMap::from([
        ("name".to_string(), "Jane Doe".to_string()),
        ("firstname".to_string(), "Jane".to_string()),
        ("lastname".to_string(), "Doe".to_string()),
    ])
}

fn emitter_over(store: Arc<dyn GraphStore>) -> EventEmitter {
    EventEmitter::new(store, EventBus::default())
}

#[tokio::test]
async fn add_user_writes_content_and_event_triples() {
    let store = Arc::new(MemoryRepository::new());
    let emitter = emitter_over(store.clone());

    emitter
        .process(MutationRequest::add_instance(
            ActionKind::AddUser,
            "pxio:User",
            user_params(),
        ))
        .await;

    let users = store.subjects_of_type("pxio:User").await;
    assert_eq!(users.len(), 1);
    let subject = &users[0];
    assert!(subject.starts_with("data:users_"));

    // name, firstName, lastName and the type assertion
    let content = store.about(subject).await;
    assert_eq!(content.len(), 4);
    assert!(content
        .iter()
        .any(|t| t.predicate == "foaf:name" && t.object.lexical_value() == "Jane Doe"));

    let events = store.subjects_of_type("pxio:Event").await;
    assert_eq!(events.len(), 1);
    let event = store.about(&events[0]).await;
    let value = |p: &str| {
        event
            .iter()
            .find(|t| t.predicate == p)
            .map(|t| t.object.lexical_value().to_string())
    };
    assert_eq!(value("pxio:isForInstance").as_deref(), Some("true"));
    assert_eq!(value("pxio:isAdded").as_deref(), Some("true"));
    assert_eq!(value("pxio:isLocal").as_deref(), Some("true"));
    assert_eq!(value("pxio:isFor").as_deref(), Some(subject.as_str()));
    assert_eq!(value("pxio:hasType").as_deref(), Some("pxio:User"));
}

#[tokio::test]
async fn event_identifiers_are_never_reused() {
    let store = Arc::new(MemoryRepository::new());
    let emitter = emitter_over(store.clone());

    for _ in 0..5 {
        emitter
            .process(MutationRequest::add_instance(
                ActionKind::AddGroup,
                "pxio:UserGroup",
                HashMap::from([("name".to_string(), "Devs".to_string())]),
            ))
            .await;
    }

    let mut events = store.subjects_of_type("pxio:Event").await;
    assert_eq!(events.len(), 5);
    events.sort();
    events.dedup();
    assert_eq!(events.len(), 5);
}

#[tokio::test]
async fn remove_instance_spares_event_history() {
    let store = Arc::new(MemoryRepository::new());
    store
        .insert(&[
            Triple::iri("data:users_1", "rdf:type", "pxio:User"),
            Triple::new("data:users_1", "foaf:name", Term::literal("Jane")),
            Triple::iri("data:group_1", "foaf:member", "data:users_1"),
            // a prior event referencing the instance
            Triple::iri("pxio:event_0", "rdf:type", "pxio:Event"),
            Triple::new(
                "pxio:event_0",
                "pxio:time",
                Term::literal("2023-01-01T00:00:00.000Z"),
            ),
            Triple::new("pxio:event_0", "pxio:isLocal", Term::boolean(false)),
            Triple::iri("pxio:event_0", "pxio:isFor", "data:users_1"),
        ])
        .await
        .unwrap();

    let emitter = emitter_over(store.clone());
    emitter
        .process(MutationRequest::remove_instance(
            ActionKind::RemoveUser,
            "data:users_1",
            "pxio:User",
        ))
        .await;

    // content is gone in both directions
    assert!(store.about("data:users_1").await.is_empty());
    assert!(
        !store
            .contains(&Triple::iri("data:group_1", "foaf:member", "data:users_1"))
            .await
    );

    // the prior event still references the removed instance
    assert!(
        store
            .contains(&Triple::iri("pxio:event_0", "pxio:isFor", "data:users_1"))
            .await
    );

    // and the removal itself produced a second event
    assert_eq!(store.subjects_of_type("pxio:Event").await.len(), 2);
}

#[tokio::test]
async fn display_to_group_produces_the_join_entity() {
    let store = Arc::new(MemoryRepository::new());
    let emitter = emitter_over(store.clone());

    emitter
        .process(MutationRequest::add_relation(
            ActionKind::AddDisplayToGroup,
            "entities:display_1",
            "pxio:isIn",
            "data:dg_1",
        ))
        .await;

    assert!(
        store
            .contains(&Triple::iri("entities:display_1", "pxio:isIn", "data:dg_1"))
            .await
    );

    let joins = store
        .subjects_of_type("entities:DisplayInDisplayGroup")
        .await;
    assert_eq!(joins.len(), 1);
    let join = store.about(&joins[0]).await;
    assert_eq!(join.len(), 8);
    let value = |p: &str| {
        join.iter()
            .find(|t| t.predicate == p)
            .map(|t| t.object.lexical_value().to_string())
    };
    assert_eq!(value("pxio:isFrom").as_deref(), Some("entities:display_1"));
    assert_eq!(value("pxio:belongsTo").as_deref(), Some("data:dg_1"));
    for (predicate, expected) in [
        ("pxio:x", "0"),
        ("pxio:y", "0"),
        ("pxio:z", "0"),
        ("pxio:width", "100"),
        ("pxio:height", "100"),
    ] {
        assert_eq!(value(predicate).as_deref(), Some(expected));
    }
}

/// Store wrapper that slows writes down, making the completion join
/// observable.
struct SlowStore {
    inner: MemoryRepository,
    insert_delay: Duration,
    delete_delay: Duration,
}

#[async_trait]
impl GraphStore for SlowStore {
    fn name(&self) -> &'static str {
        "slow-memory"
    }

    async fn insert(&self, triples: &[Triple]) -> ClientResult<()> {
        sleep(self.insert_delay).await;
        self.inner.insert(triples).await
    }

    async fn delete(&self, triple: &Triple) -> ClientResult<()> {
        sleep(self.delete_delay).await;
        self.inner.delete(triple).await
    }

    async fn instance_description(&self, instance: &str) -> ClientResult<Vec<Triple>> {
        self.inner.instance_description(instance).await
    }

    async fn triple_exists(
        &self,
        subject: &str,
        predicate: &str,
        object: &str,
    ) -> ClientResult<bool> {
        self.inner.triple_exists(subject, predicate, object).await
    }

    async fn relation_exists_between_types(
        &self,
        source_type: &str,
        target_type: &str,
        relation: &str,
    ) -> ClientResult<bool> {
        self.inner
            .relation_exists_between_types(source_type, target_type, relation)
            .await
    }

    async fn instance_creation_statements(&self) -> ClientResult<Vec<(String, String)>> {
        self.inner.instance_creation_statements().await
    }

    async fn instance_relation_statements(&self) -> ClientResult<Vec<(String, String, String)>> {
        self.inner.instance_relation_statements().await
    }

    async fn all_events(&self) -> ClientResult<Vec<EventRecord>> {
        self.inner.all_events().await
    }

    async fn event_description(&self, event: &str) -> ClientResult<Vec<Triple>> {
        self.inner.event_description(event).await
    }

    async fn non_trivial_types(&self) -> ClientResult<Vec<String>> {
        self.inner.non_trivial_types().await
    }

    async fn instances_of_type(
        &self,
        entity_type: &str,
        custom_query: Option<&str>,
    ) -> ClientResult<Vec<String>> {
        self.inner.instances_of_type(entity_type, custom_query).await
    }

    async fn literal_of(&self, instance: &str, predicate: &str) -> ClientResult<String> {
        self.inner.literal_of(instance, predicate).await
    }

    async fn object_of(&self, subject: &str, predicate: &str) -> ClientResult<Option<String>> {
        self.inner.object_of(subject, predicate).await
    }
}

#[tokio::test]
async fn notification_fires_once_after_both_write_halves() {
    init_tracing();
    let inner = MemoryRepository::new();
    inner
        .insert(&[Triple::iri("data:group_1", "foaf:member", "data:users_1")])
        .await
        .unwrap();
    let store = Arc::new(SlowStore {
        inner: inner.clone(),
        insert_delay: Duration::from_millis(80),
        delete_delay: Duration::from_millis(20),
    });

    let bus = EventBus::default();
    let mut receiver = bus.subscribe();
    let emitter = EventEmitter::new(store, bus);

    // fire-and-forget: submit returns without blocking on persistence
    emitter.submit(MutationRequest::remove_relation(
        ActionKind::RemoveUserFromGroup,
        "data:group_1",
        "foaf:member",
        "data:users_1",
    ));

    let notification = timeout(Duration::from_secs(2), receiver.recv())
        .await
        .expect("notification must arrive")
        .unwrap();
    assert_eq!(notification, Notification::Refresh);

    // by notification time both halves have settled: the relation is gone
    // and the event triples are in place
    assert!(
        !inner
            .contains(&Triple::iri("data:group_1", "foaf:member", "data:users_1"))
            .await
    );
    assert_eq!(inner.subjects_of_type("pxio:Event").await.len(), 1);

    // and it fired exactly once
    sleep(Duration::from_millis(50)).await;
    assert!(receiver.try_recv().is_err());
}

#[tokio::test]
async fn failed_delta_construction_stays_silent() {
    let store = Arc::new(MemoryRepository::new());
    let bus = EventBus::default();
    let mut receiver = bus.subscribe();
    let emitter = EventEmitter::new(store.clone(), bus);

    // instance creation without a subject type cannot be translated
    let mut request =
        MutationRequest::add_instance(ActionKind::AddUser, "pxio:User", user_params());
    request.subject_type = None;
    emitter.process(request).await;

    assert!(store.is_empty().await);
    assert!(receiver.try_recv().is_err());
}
