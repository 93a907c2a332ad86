//! # graphlog Core
//!
//! Foundational RDF types shared by the graphlog workspace:
//!
//! - Terms and triples in shortened (CURIE) form, the canonical identifier
//!   form everywhere in graphlog
//! - The namespace-prefix codec that maps between full IRIs and CURIEs
//! - The reserved event vocabulary and the classification of trivial
//!   schema/meta types that content-level operations must ignore
//! - Turtle and N-Triples rendering of triples for the repository wire
//!   protocol

pub mod prefix;
pub mod term;
pub mod turtle;
pub mod vocab;

pub use prefix::PrefixMap;
pub use term::{Literal, Term, Triple};

/// Core error type for graphlog operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("unknown namespace prefix: {0}")]
    UnknownPrefix(String),
    #[error("malformed CURIE: {0}")]
    MalformedCurie(String),
}

/// Result type alias for graphlog core operations
pub type Result<T> = std::result::Result<T, CoreError>;
