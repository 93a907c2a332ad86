//! Shared vocabularies and type classification.
//!
//! All identifiers are kept in CURIE form, the canonical identifier form of
//! the workspace. The `event` module is the reserved wire vocabulary of the
//! event log; its names are fixed for interoperability with existing graph
//! content and must not change.

/// The reserved event vocabulary.
///
/// Every event instance lives under [`event::ID_PREFIX`] and is described
/// exclusively through these predicates.
pub mod event {
    /// Type of every event instance.
    pub const TYPE: &str = "pxio:Event";
    /// Emission timestamp, an ISO-8601 instant.
    pub const TIME: &str = "pxio:time";
    /// True when the event was produced by a live action in this session.
    pub const IS_LOCAL: &str = "pxio:isLocal";
    /// Discriminator: instance event when true, relation event when false.
    pub const IS_FOR_INSTANCE: &str = "pxio:isForInstance";
    /// True for creation, false for removal.
    pub const IS_ADDED: &str = "pxio:isAdded";
    /// Instance events: the created or removed entity.
    pub const IS_FOR: &str = "pxio:isFor";
    /// Instance events: the entity's type. Relation events: the predicate.
    pub const HAS_TYPE: &str = "pxio:hasType";
    /// Relation events: the relation subject.
    pub const IS_FOR_SUBJECT: &str = "pxio:isForSubject";
    /// Relation events: the relation object.
    pub const IS_FOR_OBJECT: &str = "pxio:isForObject";

    /// Identifier prefix of freshly allocated event instances.
    pub const ID_PREFIX: &str = "pxio:event_";

    /// Full IRI of the event type, for classification of unshortened values.
    pub const TYPE_IRI: &str = "http://www.pxio.de/rdf#Event";
}

pub mod rdf {
    pub const TYPE: &str = "rdf:type";
    pub const FIRST: &str = "rdf:first";
    pub const REST: &str = "rdf:rest";
    pub const NIL: &str = "rdf:nil";
}

pub mod rdfs {
    pub const CLASS: &str = "rdfs:Class";
    pub const TYPE: &str = "rdfs:type";
}

pub mod xsd {
    pub const BOOLEAN: &str = "xsd:boolean";
    pub const INTEGER: &str = "xsd:integer";
    pub const STRING: &str = "xsd:string";
}

pub mod foaf {
    pub const NAME: &str = "foaf:name";
    pub const FIRST_NAME: &str = "foaf:firstName";
    pub const LAST_NAME: &str = "foaf:lastName";
    pub const MEMBER: &str = "foaf:member";
}

/// Domain entity vocabulary.
pub mod entities {
    /// Join entity attaching a display to a display group. Transparent to
    /// content queries: its creation is tracked as a relation event, never
    /// as an instance event.
    pub const DISPLAY_IN_DISPLAY_GROUP: &str = "entities:DisplayInDisplayGroup";

    pub const USER: &str = "pxio:User";
    pub const USER_GROUP: &str = "pxio:UserGroup";
    pub const DISPLAY: &str = "entities:Display";
    pub const DISPLAY_GROUP: &str = "entities:DisplayGroup";
}

/// Predicates of the display-in-group join entity.
pub mod placement {
    pub const IS_FROM: &str = "pxio:isFrom";
    pub const BELONGS_TO: &str = "pxio:belongsTo";
    pub const X: &str = "pxio:x";
    pub const Y: &str = "pxio:y";
    pub const Z: &str = "pxio:z";
    pub const WIDTH: &str = "pxio:width";
    pub const HEIGHT: &str = "pxio:height";
}

/// Identifier prefixes of freshly allocated instances, scoped by kind.
pub mod ids {
    pub const USER: &str = "data:users_";
    pub const GROUP: &str = "data:group_";
    pub const DISPLAY_GROUP: &str = "data:dg_";
    pub const DISPLAY_IN_DG: &str = "pxio:display_in_dg_";
}

/// Vocabulary of drag-behavior templates persisted to the graph.
pub mod template {
    pub const DRAG_DATA: &str = "pxio:dragData";
    pub const BEHAVIOR_COUNT: &str = "pxio:behaviorCount";
    pub const HAS_BEHAVIOR: &str = "pxio:hasBehavior";
    pub const HAS_SOURCE: &str = "pxio:hasSource";
    pub const HAS_TARGET: &str = "pxio:hasTarget";
    pub const HAS_RELATION: &str = "pxio:hasRelation";
    pub const HAS_ADD_TEXT: &str = "pxio:hasAddText";
    pub const HAS_REMOVE_TEXT: &str = "pxio:hasRemoveText";
    pub const ID_PREFIX: &str = "pxio:db_";
}

/// Namespaces whose types are schema/vocabulary machinery rather than
/// domain content. Kept in one place so reconstruction queries and the
/// repository type listing stay in sync.
pub const TRIVIAL_TYPE_NAMESPACES: &[&str] = &[
    "http://www.w3.org/2002/07/owl#",
    "http://www.w3.org/2001/XMLSchema#",
    "http://www.w3.org/2000/01/rdf-schema#",
    "http://www.w3.org/1999/02/22-rdf-syntax-ns#",
    "http://www.w3.org/ns/shacl#",
    "http://spinrdf.org/spin#",
    "http://spinrdf.org/sp#",
    "http://purl.org/dc/elements/1.1/",
];

/// CURIE prefixes corresponding to [`TRIVIAL_TYPE_NAMESPACES`], for
/// classification of already-shortened identifiers.
pub const TRIVIAL_TYPE_PREFIXES: &[&str] = &["owl", "xsd", "rdfs", "rdf", "sh", "spin", "sp", "dc"];

/// Schema/meta type CURIEs excluded from the instance-creation scan.
pub const TRIVIAL_TYPE_CURIES: &[&str] = &[
    "owl:Ontology",
    "owl:ObjectProperty",
    "owl:Class",
    "rdf:Property",
    "rdfs:Class",
    "sh:NodeShape",
    "sp:Construct",
];

/// True for types that never count as domain content: schema/vocabulary
/// machinery and the event type itself. Accepts full IRIs.
pub fn is_trivial_type(type_iri: &str) -> bool {
    if type_iri == event::TYPE_IRI {
        return true;
    }
    TRIVIAL_TYPE_NAMESPACES
        .iter()
        .any(|ns| type_iri.starts_with(ns))
}

/// CURIE-form counterpart of [`is_trivial_type`].
pub fn is_trivial_curie(curie: &str) -> bool {
    if curie == event::TYPE {
        return true;
    }
    match curie.split_once(':') {
        Some((prefix, _)) => TRIVIAL_TYPE_PREFIXES.contains(&prefix),
        None => false,
    }
}

/// The full type denylist of the instance-creation scan: schema/meta types,
/// transparent join types and the event type.
pub fn creation_scan_exclusions() -> Vec<&'static str> {
    let mut exclusions = TRIVIAL_TYPE_CURIES.to_vec();
    exclusions.push(entities::DISPLAY_IN_DISPLAY_GROUP);
    exclusions.push(event::TYPE);
    exclusions
}

/// Types whose presence on either end excludes a statement from the
/// relation scan.
pub fn relation_scan_exclusions() -> Vec<&'static str> {
    vec![
        rdfs::CLASS,
        entities::DISPLAY_IN_DISPLAY_GROUP,
        event::TYPE,
    ]
}
