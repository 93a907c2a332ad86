//! RDF4J REST implementation of [`GraphStore`].
//!
//! Speaks the repository REST protocol: SPARQL reads as GET with a `query`
//! parameter (or POST form-encoded for oversized queries), bulk statement
//! uploads as Turtle POSTed to `/statements?context=null`, and
//! single-statement deletes as DELETE with `subj`/`pred`/`obj` parameters
//! in N-Triples form. Namespace bindings are discovered from the
//! `/namespaces` endpoint and seed the prefix codec.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response};
use tracing::{debug, warn};

use graphlog_core::{turtle, vocab, PrefixMap, Term, Triple};

use crate::results::{bound_value, AskResults, SparqlBinding, SparqlResults};
use crate::store::{EventRecord, GraphStore, MISSING_LITERAL};
use crate::{ClientError, RepositoryConfig, Result};

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
const TURTLE: &str = "application/x-turtle";

/// Queries above this length are submitted as POST form bodies instead of
/// GET parameters.
const GET_QUERY_LIMIT: usize = 4096;

/// HTTP client for one RDF4J repository.
pub struct Rdf4jRepository {
    client: Client,
    config: RepositoryConfig,
    prefixes: PrefixMap,
}

impl Rdf4jRepository {
    /// Connects to the repository and discovers its namespace bindings.
    pub async fn connect(config: RepositoryConfig) -> Result<Self> {
        let client = http_client(&config)?;
        let prefixes = fetch_namespaces(&client, &config.endpoint).await?;
        debug!(
            endpoint = %config.endpoint,
            prefixes = prefixes.len(),
            "connected to repository"
        );
        Ok(Self {
            client,
            config,
            prefixes,
        })
    }

    /// Builds a client with a known prefix table, skipping discovery.
    pub fn with_prefixes(config: RepositoryConfig, prefixes: PrefixMap) -> Result<Self> {
        let client = http_client(&config)?;
        Ok(Self {
            client,
            config,
            prefixes,
        })
    }

    pub fn prefixes(&self) -> &PrefixMap {
        &self.prefixes
    }

    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }

    /// Runs a raw SELECT, prepending the repository's `PREFIX` header.
    pub async fn select(&self, query: &str) -> Result<SparqlResults> {
        let query = format!("{}{}", self.prefixes.sparql_header(), query);
        let response = if query.len() > GET_QUERY_LIMIT {
            self.client
                .post(&self.config.endpoint)
                .form(&[("query", query.as_str())])
                .header(ACCEPT, SPARQL_RESULTS_JSON)
                .send()
                .await?
        } else {
            self.client
                .get(&self.config.endpoint)
                .query(&[("query", query.as_str())])
                .header(ACCEPT, SPARQL_RESULTS_JSON)
                .send()
                .await?
        };
        let body = ensure_success(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Runs a raw ASK, prepending the repository's `PREFIX` header.
    pub async fn ask(&self, query: &str) -> Result<bool> {
        let query = format!("{}{}", self.prefixes.sparql_header(), query);
        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[("query", query.as_str())])
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await?;
        let body = ensure_success(response).await?;
        let ask: AskResults = serde_json::from_str(&body)?;
        Ok(ask.boolean)
    }

    fn binding_to_triple(&self, binding: &SparqlBinding) -> Option<Triple> {
        let s = binding.get("s")?;
        let p = binding.get("p")?;
        let o = binding.get("o")?;
        Some(Triple {
            subject: self.prefixes.shorten_if_needed(&s.value),
            predicate: self.prefixes.shorten_if_needed(&p.value),
            object: o.to_term(&self.prefixes),
        })
    }
}

fn http_client(config: &RepositoryConfig) -> Result<Client> {
    Ok(Client::builder()
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .build()?)
}

async fn ensure_success(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ClientError::Endpoint {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}

/// Fetches the repository's namespace bindings.
async fn fetch_namespaces(client: &Client, endpoint: &str) -> Result<PrefixMap> {
    let response = client
        .get(format!("{}/namespaces", endpoint))
        .header(ACCEPT, SPARQL_RESULTS_JSON)
        .send()
        .await?;
    let body = ensure_success(response).await?;
    let results: SparqlResults = serde_json::from_str(&body)?;

    let mut prefixes = PrefixMap::new();
    for binding in results.bindings() {
        if let (Some(prefix), Some(namespace)) = (
            bound_value(binding, "prefix"),
            bound_value(binding, "namespace"),
        ) {
            prefixes.insert(prefix, namespace);
        }
    }
    Ok(prefixes)
}

#[async_trait]
impl GraphStore for Rdf4jRepository {
    fn name(&self) -> &'static str {
        "rdf4j"
    }

    async fn insert(&self, triples: &[Triple]) -> Result<()> {
        if triples.is_empty() {
            return Ok(());
        }
        let document = turtle::render_document(triples, &self.prefixes);
        let response = self
            .client
            .post(format!("{}/statements", self.config.endpoint))
            .query(&[("context", "null")])
            .header(reqwest::header::CONTENT_TYPE, TURTLE)
            .body(document)
            .send()
            .await?;
        ensure_success(response).await?;
        debug!(count = triples.len(), "stored statement batch");
        Ok(())
    }

    async fn delete(&self, triple: &Triple) -> Result<()> {
        let object = match &triple.object {
            Term::Iri(iri) => self.prefixes.n_triples_iri(iri),
            Term::Literal(lit) => lit.to_n_triples(&self.prefixes),
        };
        let response = self
            .client
            .delete(format!("{}/statements", self.config.endpoint))
            .query(&[
                ("subj", self.prefixes.n_triples_iri(&triple.subject)),
                ("pred", self.prefixes.n_triples_iri(&triple.predicate)),
                ("obj", object),
            ])
            .header(ACCEPT, "text/boolean")
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn instance_description(&self, instance: &str) -> Result<Vec<Triple>> {
        let results = self.select(&instance_description_query(instance)).await?;
        Ok(results
            .bindings()
            .iter()
            .filter_map(|b| self.binding_to_triple(b))
            .collect())
    }

    async fn triple_exists(&self, subject: &str, predicate: &str, object: &str) -> Result<bool> {
        self.ask(&format!("ASK {{ {} {} {} }}", subject, predicate, object))
            .await
    }

    async fn relation_exists_between_types(
        &self,
        source_type: &str,
        target_type: &str,
        relation: &str,
    ) -> Result<bool> {
        self.ask(&format!(
            "ASK {{ ?s {rel} ?o . ?s {ty} {src} . ?o {ty} {tgt} }}",
            rel = relation,
            ty = vocab::rdf::TYPE,
            src = source_type,
            tgt = target_type,
        ))
        .await
    }

    async fn instance_creation_statements(&self) -> Result<Vec<(String, String)>> {
        let results = self.select(&creation_scan_query()).await?;
        Ok(results
            .bindings()
            .iter()
            .filter_map(|b| {
                let instance = bound_value(b, "instance")?;
                let entity_type = bound_value(b, "type")?;
                Some((
                    self.prefixes.shorten_if_needed(instance),
                    self.prefixes.shorten_if_needed(entity_type),
                ))
            })
            .collect())
    }

    async fn instance_relation_statements(&self) -> Result<Vec<(String, String, String)>> {
        let results = self.select(&relation_scan_query()).await?;
        Ok(results
            .bindings()
            .iter()
            .filter_map(|b| {
                let s = bound_value(b, "s")?;
                let p = bound_value(b, "p")?;
                let o = bound_value(b, "o")?;
                Some((
                    self.prefixes.shorten_if_needed(s),
                    self.prefixes.shorten_if_needed(p),
                    self.prefixes.shorten_if_needed(o),
                ))
            })
            .collect())
    }

    async fn all_events(&self) -> Result<Vec<EventRecord>> {
        let results = self.select(&all_events_query()).await?;
        let mut events = Vec::new();
        for binding in results.bindings() {
            let (Some(id), Some(time)) =
                (bound_value(binding, "event"), bound_value(binding, "time"))
            else {
                continue;
            };
            match DateTime::parse_from_rfc3339(time) {
                Ok(parsed) => events.push(EventRecord {
                    id: self.prefixes.shorten_if_needed(id),
                    time: parsed.with_timezone(&Utc),
                }),
                Err(err) => {
                    warn!(event = id, %err, "skipping event with unparseable timestamp");
                }
            }
        }
        Ok(events)
    }

    async fn event_description(&self, event: &str) -> Result<Vec<Triple>> {
        let results = self.select(&event_description_query(event)).await?;
        Ok(results
            .bindings()
            .iter()
            .filter_map(|b| self.binding_to_triple(b))
            .collect())
    }

    async fn non_trivial_types(&self) -> Result<Vec<String>> {
        let results = self.select(&types_query()).await?;
        Ok(results
            .bindings()
            .iter()
            .filter_map(|b| bound_value(b, "type"))
            .filter(|t| !vocab::is_trivial_type(t))
            .map(|t| self.prefixes.shorten_if_needed(t))
            .collect())
    }

    async fn instances_of_type(
        &self,
        entity_type: &str,
        custom_query: Option<&str>,
    ) -> Result<Vec<String>> {
        let query = match custom_query {
            Some(custom) => custom.to_string(),
            None => instances_query(entity_type),
        };
        let results = self.select(&query).await?;
        Ok(results
            .bindings()
            .iter()
            .filter_map(|b| bound_value(b, "subject"))
            .map(|s| self.prefixes.shorten_if_needed(s))
            .collect())
    }

    async fn literal_of(&self, instance: &str, predicate: &str) -> Result<String> {
        let results = self
            .select(&format!(
                "SELECT ?label WHERE {{ {} {} ?label }}",
                instance, predicate
            ))
            .await?;
        Ok(results
            .bindings()
            .first()
            .and_then(|b| bound_value(b, "label"))
            .map(|v| self.prefixes.shorten_if_needed(v))
            .unwrap_or_else(|| MISSING_LITERAL.to_string()))
    }

    async fn object_of(&self, subject: &str, predicate: &str) -> Result<Option<String>> {
        let results = self
            .select(&format!(
                "SELECT ?object WHERE {{ {} {} ?object }}",
                subject, predicate
            ))
            .await?;
        Ok(results
            .bindings()
            .first()
            .and_then(|b| bound_value(b, "object"))
            .map(|v| self.prefixes.shorten_if_needed(v)))
    }
}

fn instance_description_query(instance: &str) -> String {
    format!(
        "SELECT ?s ?p ?o WHERE {{ \
         ?s ?p ?o \
         FILTER (?s = {inst} || ?o = {inst}) \
         FILTER NOT EXISTS {{ ?s {ty} {event} }} \
         }}",
        inst = instance,
        ty = vocab::rdf::TYPE,
        event = vocab::event::TYPE,
    )
}

fn creation_scan_query() -> String {
    let filters: String = vocab::creation_scan_exclusions()
        .iter()
        .map(|t| format!("FILTER(?type != {}) ", t))
        .collect();
    format!(
        "SELECT ?instance ?type WHERE {{ ?instance {ty} ?type {filters}}}",
        ty = vocab::rdf::TYPE,
        filters = filters,
    )
}

fn relation_scan_query() -> String {
    let ty = vocab::rdf::TYPE;
    let mut query = format!(
        "SELECT ?s ?p ?o WHERE {{ \
         ?s ?p ?o \
         FILTER(?p != {ty}) \
         FILTER(!isLiteral(?o)) \
         FILTER EXISTS {{ ?s {ty} ?stype . ?o {ty} ?otype . }} ",
        ty = ty,
    );
    for excluded in vocab::relation_scan_exclusions() {
        query.push_str(&format!(
            "FILTER NOT EXISTS {{ ?s {ty} {ex} }} \
             FILTER NOT EXISTS {{ ?o {ty} {ex} }} ",
            ty = ty,
            ex = excluded,
        ));
    }
    query.push('}');
    query
}

fn all_events_query() -> String {
    format!(
        "SELECT ?event ?time WHERE {{ ?event {ty} {event} . ?event {time} ?time }}",
        ty = vocab::rdf::TYPE,
        event = vocab::event::TYPE,
        time = vocab::event::TIME,
    )
}

fn event_description_query(event: &str) -> String {
    format!(
        "SELECT ?s ?p ?o WHERE {{ ?s ?p ?o FILTER (?s = {}) }}",
        event
    )
}

fn types_query() -> String {
    format!(
        "SELECT DISTINCT ?type WHERE {{ ?s ?p ?type FILTER (?p = {} || ?p = {}) }}",
        vocab::rdf::TYPE,
        vocab::rdfs::TYPE,
    )
}

fn instances_query(entity_type: &str) -> String {
    format!(
        "SELECT DISTINCT ?subject WHERE {{ ?subject {} {} . }}",
        vocab::rdf::TYPE,
        entity_type
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_query_excludes_event_subjects() {
        let query = instance_description_query("data:users_1");
        assert!(query.contains("FILTER (?s = data:users_1 || ?o = data:users_1)"));
        assert!(query.contains("FILTER NOT EXISTS { ?s rdf:type pxio:Event }"));
    }

    #[test]
    fn creation_scan_query_filters_denylist() {
        let query = creation_scan_query();
        assert!(query.contains("?instance rdf:type ?type"));
        assert!(query.contains("FILTER(?type != owl:Ontology)"));
        assert!(query.contains("FILTER(?type != entities:DisplayInDisplayGroup)"));
        assert!(query.contains("FILTER(?type != pxio:Event)"));
    }

    #[test]
    fn relation_scan_query_filters_both_ends() {
        let query = relation_scan_query();
        assert!(query.contains("FILTER(?p != rdf:type)"));
        assert!(query.contains("FILTER(!isLiteral(?o))"));
        assert!(query.contains("FILTER NOT EXISTS { ?s rdf:type pxio:Event }"));
        assert!(query.contains("FILTER NOT EXISTS { ?o rdf:type pxio:Event }"));
        assert!(query.contains("FILTER NOT EXISTS { ?s rdf:type entities:DisplayInDisplayGroup }"));
    }

    #[test]
    fn events_query_requires_type_and_time() {
        let query = all_events_query();
        assert!(query.contains("?event rdf:type pxio:Event"));
        assert!(query.contains("?event pxio:time ?time"));
    }
}
