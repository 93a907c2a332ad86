//! Repository connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a repository connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    /// Full repository URI, e.g.
    /// `http://localhost:8080/rdf4j-server/repositories/workspace`.
    pub endpoint: String,
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl RepositoryConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/rdf4j-server/repositories/workspace".to_string(),
            request_timeout: Duration::from_secs(30),
            user_agent: format!("graphlog/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
