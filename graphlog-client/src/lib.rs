//! # graphlog Client
//!
//! The graph-store boundary of the workspace: a semantic read/write
//! contract ([`GraphStore`]) consumed by the event core, an RDF4J REST
//! implementation over HTTP ([`Rdf4jRepository`]) and an in-memory
//! implementation for development and tests ([`MemoryRepository`]).
//!
//! All identifiers cross this boundary in shortened CURIE form; expansion
//! to full IRIs happens inside the RDF4J implementation.

pub mod config;
pub mod memory;
pub mod rdf4j;
pub mod results;
pub mod store;

pub use config::RepositoryConfig;
pub use memory::MemoryRepository;
pub use rdf4j::Rdf4jRepository;
pub use results::{AskResults, SparqlBinding, SparqlResults, SparqlValue};
pub use store::{fetch_collection, is_collection, EventRecord, GraphStore, MISSING_LITERAL};

use graphlog_core::CoreError;

/// Client error type
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("repository returned {status}: {body}")]
    Endpoint { status: u16, body: String },
    #[error("malformed results payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;
