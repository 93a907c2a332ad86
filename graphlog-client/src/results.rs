//! SPARQL results JSON model.
//!
//! Mirrors the `application/sparql-results+json` shape returned by the
//! repository: `head.vars` plus `results.bindings`, each binding a map from
//! variable name to a typed value.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use graphlog_core::{Literal, PrefixMap, Term};

/// SPARQL query results structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparqlResults {
    pub head: SparqlHead,
    pub results: SparqlResultsData,
}

impl SparqlResults {
    pub fn empty() -> Self {
        Self {
            head: SparqlHead { vars: Vec::new() },
            results: SparqlResultsData {
                bindings: Vec::new(),
            },
        }
    }

    pub fn bindings(&self) -> &[SparqlBinding] {
        &self.results.bindings
    }
}

/// SPARQL results head
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparqlHead {
    #[serde(default)]
    pub vars: Vec<String>,
}

/// SPARQL results data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SparqlResultsData {
    #[serde(default)]
    pub bindings: Vec<SparqlBinding>,
}

/// A single SPARQL binding (variable -> value mapping)
pub type SparqlBinding = HashMap<String, SparqlValue>;

/// Response shape of an ASK query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResults {
    pub boolean: bool,
}

/// A single bound SPARQL value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SparqlValue {
    #[serde(rename = "type")]
    pub value_type: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(
        default,
        rename = "xml:lang",
        skip_serializing_if = "Option::is_none"
    )]
    pub lang: Option<String>,
}

impl SparqlValue {
    pub fn iri(iri: impl Into<String>) -> Self {
        Self {
            value_type: "uri".to_string(),
            value: iri.into(),
            datatype: None,
            lang: None,
        }
    }

    pub fn literal(value: impl Into<String>, datatype: Option<String>) -> Self {
        Self {
            value_type: "literal".to_string(),
            value: value.into(),
            datatype,
            lang: None,
        }
    }

    pub fn is_literal(&self) -> bool {
        // older endpoints report "typed-literal" for datatyped values
        self.value_type == "literal" || self.value_type == "typed-literal"
    }

    pub fn is_iri(&self) -> bool {
        self.value_type == "uri"
    }

    /// Converts the bound value into a [`Term`] in shortened form.
    pub fn to_term(&self, prefixes: &PrefixMap) -> Term {
        if self.is_literal() {
            Term::Literal(Literal {
                value: self.value.clone(),
                datatype: self
                    .datatype
                    .as_ref()
                    .map(|dt| prefixes.shorten_if_needed(dt)),
            })
        } else {
            Term::Iri(prefixes.shorten_if_needed(&self.value))
        }
    }
}

/// Looks up the string value of a bound variable.
pub fn bound_value<'a>(binding: &'a SparqlBinding, var: &str) -> Option<&'a str> {
    binding.get(var).map(|v| v.value.as_str())
}
