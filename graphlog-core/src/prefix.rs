//! Namespace-prefix codec.
//!
//! Shortens full IRIs into CURIEs against a prefix table and expands them
//! back. The table is normally discovered from the repository's
//! `/namespaces` endpoint; [`PrefixMap::well_known`] seeds the standard
//! vocabularies for offline use and tests.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{CoreError, Result};

/// Bidirectional prefix/namespace table.
///
/// Shortening picks the longest matching namespace so that nested
/// namespaces (`http://example.org/` vs `http://example.org/ns#`) resolve
/// to the most specific prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefixMap {
    prefix_to_namespace: BTreeMap<String, String>,
}

impl PrefixMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table seeded with the standard vocabularies the workspace relies
    /// on, matching the namespace bindings of a stock repository.
    pub fn well_known() -> Self {
        let mut map = Self::new();
        map.insert("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        map.insert("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        map.insert("owl", "http://www.w3.org/2002/07/owl#");
        map.insert("xsd", "http://www.w3.org/2001/XMLSchema#");
        map.insert("sh", "http://www.w3.org/ns/shacl#");
        map.insert("sp", "http://spinrdf.org/sp#");
        map.insert("foaf", "http://xmlns.com/foaf/0.1/");
        map.insert("pxio", "http://www.pxio.de/rdf#");
        map.insert("entities", "http://www.pxio.de/entities#");
        map.insert("data", "http://www.pxio.de/data#");
        map
    }

    pub fn insert(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefix_to_namespace
            .insert(prefix.into(), namespace.into());
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.prefix_to_namespace.get(prefix).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.prefix_to_namespace.is_empty()
    }

    pub fn len(&self) -> usize {
        self.prefix_to_namespace.len()
    }

    /// Shortens a full IRI to CURIE form against the longest matching
    /// namespace. Unknown namespaces pass through unchanged.
    pub fn shorten(&self, iri: &str) -> String {
        let best = self
            .prefix_to_namespace
            .iter()
            .filter(|(_, ns)| iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len());
        match best {
            Some((prefix, ns)) => format!("{}:{}", prefix, &iri[ns.len()..]),
            None => iri.to_string(),
        }
    }

    /// Shortens only values that still look like full IRIs; CURIEs pass
    /// through untouched.
    pub fn shorten_if_needed(&self, value: &str) -> String {
        if value.starts_with("http://") || value.starts_with("https://") {
            self.shorten(value)
        } else {
            value.to_string()
        }
    }

    /// Expands a CURIE back to its full IRI.
    pub fn expand(&self, curie: &str) -> Result<String> {
        let (prefix, local) = curie
            .split_once(':')
            .ok_or_else(|| CoreError::MalformedCurie(curie.to_string()))?;
        let namespace = self
            .prefix_to_namespace
            .get(prefix)
            .ok_or_else(|| CoreError::UnknownPrefix(prefix.to_string()))?;
        Ok(format!("{}{}", namespace, local))
    }

    /// Renders an identifier as a bracketed N-Triples IRI, expanding CURIEs
    /// where the prefix is known and bracketing full IRIs as-is.
    pub fn n_triples_iri(&self, value: &str) -> String {
        if value.starts_with("http://") || value.starts_with("https://") {
            return format!("<{}>", value);
        }
        match self.expand(value) {
            Ok(full) => format!("<{}>", full),
            Err(_) => format!("<{}>", value),
        }
    }

    /// The `PREFIX p: <ns>` header prepended to every SPARQL query issued
    /// against the repository.
    pub fn sparql_header(&self) -> String {
        let mut header = String::new();
        for (prefix, namespace) in &self.prefix_to_namespace {
            header.push_str(&format!("PREFIX {}: <{}> ", prefix, namespace));
        }
        header
    }

    /// The `@prefix` declaration block of a Turtle document.
    pub fn turtle_header(&self) -> String {
        let mut header = String::new();
        for (prefix, namespace) in &self.prefix_to_namespace {
            header.push_str(&format!("@prefix {}: <{}> .\n", prefix, namespace));
        }
        header
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefix_to_namespace
            .iter()
            .map(|(p, ns)| (p.as_str(), ns.as_str()))
    }
}
