//! Turtle document rendering.
//!
//! The repository's bulk-statement endpoint accepts `application/x-turtle`
//! bodies. Statements are rendered in CURIE form under an `@prefix` block,
//! leaving IRI expansion to the store.

use crate::{PrefixMap, Triple};

/// Renders a full Turtle document: prefix declarations followed by one
/// statement line per triple.
pub fn render_document(triples: &[Triple], prefixes: &PrefixMap) -> String {
    let mut doc = prefixes.turtle_header();
    if !doc.is_empty() {
        doc.push('\n');
    }
    for triple in triples {
        doc.push_str(&triple.to_turtle_line());
        doc.push('\n');
    }
    doc
}
