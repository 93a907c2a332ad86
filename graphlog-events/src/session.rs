//! The per-repository session context.
//!
//! One `Session` exists per active repository connection and owns every
//! piece of shared state the workspace needs: the store handle, the
//! prefix codec, the notification bus, the drag-behavior registry and the
//! event emitter. Parts are handed down explicitly; there is no ambient
//! global state.

use std::sync::Arc;

use graphlog_client::{GraphStore, Rdf4jRepository, RepositoryConfig};
use graphlog_core::PrefixMap;

use crate::behavior::BehaviorRegistry;
use crate::bus::EventBus;
use crate::emitter::EventEmitter;
use crate::mutation::MutationRequest;
use crate::timeline::TimelineFeed;

/// Application root for one repository connection.
pub struct Session {
    store: Arc<dyn GraphStore>,
    prefixes: PrefixMap,
    bus: EventBus,
    behaviors: BehaviorRegistry,
    emitter: EventEmitter,
}

impl Session {
    /// Builds a session over an already-constructed store.
    pub fn new(store: Arc<dyn GraphStore>, prefixes: PrefixMap) -> Self {
        let bus = EventBus::default();
        let emitter = EventEmitter::new(store.clone(), bus.clone());
        Self {
            store,
            prefixes,
            bus,
            behaviors: BehaviorRegistry::new(),
            emitter,
        }
    }

    /// Connects to an RDF4J repository, discovering its namespaces.
    pub async fn connect(config: RepositoryConfig) -> graphlog_client::Result<Self> {
        let repository = Rdf4jRepository::connect(config).await?;
        let prefixes = repository.prefixes().clone();
        Ok(Self::new(Arc::new(repository), prefixes))
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn behaviors(&self) -> &BehaviorRegistry {
        &self.behaviors
    }

    pub fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Shorthand for pushing a mutation request onto the emitter.
    pub fn submit(&self, request: MutationRequest) {
        self.emitter.submit(request);
    }

    /// A fresh timeline view over this session's store.
    pub fn timeline(&self) -> TimelineFeed {
        TimelineFeed::new(self.store.clone())
    }
}
