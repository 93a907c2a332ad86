//! Drag behaviors.
//!
//! A drag behavior is a user-declared rule mapping a pair of entity types
//! to a toggleable relation: dragging an instance of one type onto an
//! instance of the other offers to create the relation when it is absent
//! and to remove it when it is present. Behaviors live in an in-memory,
//! session-scoped registry and can be serialized to graph triples as part
//! of a template.
//!
//! Behaviors are not deduplicated on insertion; declaring the same rule
//! twice yields two menu entries.

use anyhow::Result;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use graphlog_client::GraphStore;
use graphlog_core::{vocab, Term, Triple};

use crate::mutation::{ActionKind, MutationRequest};

/// A declarative drag rule between two entity types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragBehavior {
    pub source_type: String,
    pub target_type: String,
    pub relation: String,
    /// Menu label when the relation does not exist yet.
    pub add_text: String,
    /// Menu label when the relation already exists.
    pub remove_text: String,
}

/// Parameters for declaring a behavior through the configuration dialog.
#[derive(Debug, Clone)]
pub struct NewBehavior {
    pub source_type: String,
    pub target_type: String,
    pub relation: String,
    pub add_text: String,
    pub remove_text: String,
    /// When set, the repository decides which of the two types is the
    /// actual relation subject; source and target swap if no statement
    /// runs in the declared direction.
    pub verify_direction: bool,
}

/// Session-scoped list of drag behaviors.
#[derive(Debug, Default)]
pub struct BehaviorRegistry {
    behaviors: RwLock<Vec<DragBehavior>>,
}

impl BehaviorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a behavior, optionally letting the repository settle the
    /// relation direction first.
    pub async fn add(&self, store: &dyn GraphStore, params: NewBehavior) -> Result<DragBehavior> {
        let mut source = params.source_type;
        let mut target = params.target_type;
        if params.verify_direction {
            let declared_direction_exists = store
                .relation_exists_between_types(&source, &target, &params.relation)
                .await?;
            if !declared_direction_exists {
                std::mem::swap(&mut source, &mut target);
                debug!(relation = %params.relation, "swapped drag behavior direction");
            }
        }
        let behavior = DragBehavior {
            source_type: source,
            target_type: target,
            relation: params.relation,
            add_text: params.add_text,
            remove_text: params.remove_text,
        };
        self.insert(behavior.clone());
        Ok(behavior)
    }

    pub fn insert(&self, behavior: DragBehavior) {
        self.behaviors.write().push(behavior);
    }

    /// Removes every copy of the behavior.
    pub fn remove(&self, behavior: &DragBehavior) {
        self.behaviors.write().retain(|b| b != behavior);
    }

    pub fn all(&self) -> Vec<DragBehavior> {
        self.behaviors.read().clone()
    }

    pub fn len(&self) -> usize {
        self.behaviors.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.read().is_empty()
    }

    /// Behaviors applicable to a drag between the two types, in either
    /// orientation.
    pub fn matching(&self, source_type: &str, target_type: &str) -> Vec<DragBehavior> {
        self.behaviors
            .read()
            .iter()
            .filter(|b| {
                (b.source_type == source_type && b.target_type == target_type)
                    || (b.source_type == target_type && b.target_type == source_type)
            })
            .cloned()
            .collect()
    }

    /// Serializes the registry as template triples.
    pub fn to_template_triples(&self) -> Vec<Triple> {
        let behaviors = self.behaviors.read();
        let mut triples = vec![Triple::new(
            vocab::template::DRAG_DATA,
            vocab::template::BEHAVIOR_COUNT,
            Term::integer(behaviors.len() as i64),
        )];
        for behavior in behaviors.iter() {
            let subject = format!("{}{}", vocab::template::ID_PREFIX, Uuid::new_v4());
            triples.push(Triple::iri(
                vocab::template::DRAG_DATA,
                vocab::template::HAS_BEHAVIOR,
                &subject,
            ));
            triples.push(Triple::iri(
                &subject,
                vocab::template::HAS_SOURCE,
                &behavior.source_type,
            ));
            triples.push(Triple::iri(
                &subject,
                vocab::template::HAS_TARGET,
                &behavior.target_type,
            ));
            triples.push(Triple::iri(
                &subject,
                vocab::template::HAS_RELATION,
                &behavior.relation,
            ));
            triples.push(Triple::new(
                &subject,
                vocab::template::HAS_ADD_TEXT,
                Term::literal(&behavior.add_text),
            ));
            triples.push(Triple::new(
                &subject,
                vocab::template::HAS_REMOVE_TEXT,
                Term::literal(&behavior.remove_text),
            ));
        }
        triples
    }

    /// Replaces the registry with the behaviors found in template triples.
    /// Incomplete behavior records are skipped.
    pub fn import_template(&self, triples: &[Triple]) {
        let items: Vec<&str> = triples
            .iter()
            .filter(|t| {
                t.subject == vocab::template::DRAG_DATA
                    && t.predicate == vocab::template::HAS_BEHAVIOR
            })
            .filter_map(|t| t.object.as_iri())
            .collect();

        let field = |subject: &str, predicate: &str| {
            triples
                .iter()
                .find(|t| t.subject == subject && t.predicate == predicate)
                .map(|t| t.object.lexical_value().to_string())
        };

        let mut imported = Vec::with_capacity(items.len());
        for item in items {
            let behavior = (|| {
                Some(DragBehavior {
                    source_type: field(item, vocab::template::HAS_SOURCE)?,
                    target_type: field(item, vocab::template::HAS_TARGET)?,
                    relation: field(item, vocab::template::HAS_RELATION)?,
                    add_text: field(item, vocab::template::HAS_ADD_TEXT)?,
                    remove_text: field(item, vocab::template::HAS_REMOVE_TEXT)?,
                })
            })();
            match behavior {
                Some(behavior) => imported.push(behavior),
                None => warn!(item, "skipping incomplete drag behavior record"),
            }
        }
        debug!(count = imported.len(), "imported drag behaviors");
        *self.behaviors.write() = imported;
    }
}

/// The context-menu label for dropping `source_instance` onto
/// `target_instance`: the remove wording when the relation already exists,
/// the add wording otherwise.
pub async fn menu_label(
    store: &dyn GraphStore,
    behavior: &DragBehavior,
    source_instance: &str,
    target_instance: &str,
) -> Result<String> {
    let exists = store
        .triple_exists(source_instance, &behavior.relation, target_instance)
        .await?;
    Ok(if exists {
        behavior.remove_text.clone()
    } else {
        behavior.add_text.clone()
    })
}

/// Builds the mutation request that toggles the behavior's relation
/// between two instances: removal when the relation exists, creation
/// otherwise.
pub async fn toggle_request(
    store: &dyn GraphStore,
    behavior: &DragBehavior,
    source_instance: &str,
    target_instance: &str,
    action: ActionKind,
) -> Result<MutationRequest> {
    let exists = store
        .triple_exists(source_instance, &behavior.relation, target_instance)
        .await?;
    let mut request = if exists {
        MutationRequest::remove_relation(
            action,
            source_instance,
            &behavior.relation,
            target_instance,
        )
    } else {
        MutationRequest::add_relation(action, source_instance, &behavior.relation, target_instance)
    };
    request.subject_type = Some(behavior.source_type.clone());
    request.object_type = Some(behavior.target_type.clone());
    Ok(request)
}
