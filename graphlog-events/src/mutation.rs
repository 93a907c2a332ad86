//! Mutation requests: a user's intent before it becomes triples.
//!
//! A request is transient and in-memory only. The `event_type` selects the
//! delta branch, the `action` selects which auxiliary triples the branch
//! synthesizes, and the remaining fields carry the kind-specific
//! parameters.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The four mutation shapes the event log records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    AddInstance,
    RemoveInstance,
    AddRelation,
    RemoveRelation,
}

/// The concrete workspace action behind a mutation, driving auxiliary
/// triple synthesis and context-menu wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    AddUser,
    RemoveUser,
    AddGroup,
    RemoveGroup,
    AddDisplayGroup,
    RemoveDisplayGroup,
    AddUserToGroup,
    RemoveUserFromGroup,
    AddDisplayToGroup,
    RemoveDisplayFromGroup,
    Project,
    RemoveProjection,
    ShareDisplayGroupWithUser,
    ShareDisplayGroupWithGroup,
    ShareSourceWithUser,
    ShareSourceWithGroup,
    UnshareDisplayGroupWithUser,
    UnshareDisplayGroupWithGroup,
    UnshareSourceWithUser,
    UnshareSourceWithGroup,
    /// A relation declared at runtime through a drag behavior.
    Custom,
}

impl ActionKind {
    /// Menu label shown for this action.
    pub fn label(&self) -> &'static str {
        match self {
            ActionKind::AddUser => "Add User",
            ActionKind::RemoveUser => "Remove User",
            ActionKind::AddGroup => "Add Group",
            ActionKind::RemoveGroup => "Remove Group",
            ActionKind::AddDisplayGroup => "Add Display Group",
            ActionKind::RemoveDisplayGroup => "Remove Display Group",
            ActionKind::AddUserToGroup => "Add User to Group",
            ActionKind::RemoveUserFromGroup => "Remove User from Group",
            ActionKind::AddDisplayToGroup => "Add Display to Display Group",
            ActionKind::RemoveDisplayFromGroup => "Remove Display from Display Group",
            ActionKind::Project => "Project Source on Display Group",
            ActionKind::RemoveProjection => "Remove Source Projection from Display Group",
            ActionKind::ShareDisplayGroupWithUser => "Share Display Group with User",
            ActionKind::ShareDisplayGroupWithGroup => "Share Display Group with User Group",
            ActionKind::ShareSourceWithUser => "Share Pixel Source with User",
            ActionKind::ShareSourceWithGroup => "Share Pixel Source with User Group",
            ActionKind::UnshareDisplayGroupWithUser => {
                "Remove Sharing between Display Group and User"
            }
            ActionKind::UnshareDisplayGroupWithGroup => {
                "Remove Sharing between Display Group and User Group"
            }
            ActionKind::UnshareSourceWithUser => "Remove Sharing between Pixel Source and User",
            ActionKind::UnshareSourceWithGroup => {
                "Remove Sharing between Pixel Source and User Group"
            }
            ActionKind::Custom => "Toggle Relation",
        }
    }
}

/// A mutation request as pushed onto the emitter's intake.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationRequest {
    pub event_type: EventType,
    pub action: ActionKind,
    pub subject: Option<String>,
    pub predicate: Option<String>,
    pub object: Option<String>,
    pub subject_type: Option<String>,
    pub object_type: Option<String>,
    /// Free-form attribute values for instance creation, keyed by
    /// parameter name (`name`, `firstname`, `lastname`).
    pub params: HashMap<String, String>,
}

impl MutationRequest {
    /// Creation of a new instance; the subject identifier is allocated
    /// during delta construction.
    pub fn add_instance(
        action: ActionKind,
        subject_type: impl Into<String>,
        params: HashMap<String, String>,
    ) -> Self {
        Self {
            event_type: EventType::AddInstance,
            action,
            subject: None,
            predicate: None,
            object: None,
            subject_type: Some(subject_type.into()),
            object_type: None,
            params,
        }
    }

    pub fn remove_instance(
        action: ActionKind,
        subject: impl Into<String>,
        subject_type: impl Into<String>,
    ) -> Self {
        Self {
            event_type: EventType::RemoveInstance,
            action,
            subject: Some(subject.into()),
            predicate: None,
            object: None,
            subject_type: Some(subject_type.into()),
            object_type: None,
            params: HashMap::new(),
        }
    }

    pub fn add_relation(
        action: ActionKind,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            event_type: EventType::AddRelation,
            action,
            subject: Some(subject.into()),
            predicate: Some(predicate.into()),
            object: Some(object.into()),
            subject_type: None,
            object_type: None,
            params: HashMap::new(),
        }
    }

    pub fn remove_relation(
        action: ActionKind,
        subject: impl Into<String>,
        predicate: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            event_type: EventType::RemoveRelation,
            action,
            subject: Some(subject.into()),
            predicate: Some(predicate.into()),
            object: Some(object.into()),
            subject_type: None,
            object_type: None,
            params: HashMap::new(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}
