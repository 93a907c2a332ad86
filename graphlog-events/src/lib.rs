//! # graphlog Events
//!
//! The event/versioning core of the workspace. Every user-initiated graph
//! mutation is captured as an immutable, time-ordered, self-describing
//! event stored in the same repository as the content it describes:
//!
//! - [`mutation`] describes a user's intent before it becomes triples
//! - [`delta`] translates a mutation into content and event triples,
//!   partitioned into an add set and a remove set
//! - [`emitter`] persists both sets concurrently and broadcasts one
//!   completion notification once both have settled
//! - [`reconstruct`] synthesizes a full event history for repositories
//!   that predate the event log
//! - [`timeline`] replays the ordered log into human-readable entries
//! - [`behavior`] holds the session's drag behaviors and their
//!   relation-toggling decisions
//! - [`session`] ties one repository connection's parts together

pub mod behavior;
pub mod bus;
pub mod delta;
pub mod emitter;
pub mod event;
pub mod mutation;
pub mod reconstruct;
pub mod session;
pub mod timeline;

pub use behavior::{BehaviorRegistry, DragBehavior, NewBehavior};
pub use bus::{spawn_refresh_loop, EventBus, EventConsumer, Notification};
pub use delta::{build_delta, EventDelta};
pub use emitter::EventEmitter;
pub use event::{EventKind, GraphEvent};
pub use mutation::{ActionKind, EventType, MutationRequest};
pub use session::Session;
pub use timeline::{TimelineEntry, TimelineFeed};
