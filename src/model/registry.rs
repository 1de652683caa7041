//! Static tables describing the model's collections and attribute placement.
//!
//! Both tables are plain data. Adding a collection or an attribute context
//! means adding a row here; the import and export passes read these tables
//! and have no per-collection code.

/// One registered collection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollectionDescriptor {
    /// Name of the wrapping element in the document (`<locations>`).
    pub container: &'static str,
    /// Canonical collection name on the model (`locations`).
    pub plural: &'static str,
    /// Entity name; also the repeated child element name (`<location>`).
    pub singular: &'static str,
}

/// All registered collections, in model order.
///
/// `items` and `data` share the `assets` container in the document.
#[rustfmt::skip]
pub const COLLECTIONS: &[CollectionDescriptor] = &[
    CollectionDescriptor { container: "actors", plural: "actors", singular: "actor" },
    CollectionDescriptor { container: "edges", plural: "edges", singular: "edge" },
    CollectionDescriptor { container: "locations", plural: "locations", singular: "location" },
    CollectionDescriptor { container: "policies", plural: "policies", singular: "policy" },
    CollectionDescriptor { container: "predicates", plural: "predicates", singular: "predicate" },
    CollectionDescriptor { container: "processes", plural: "processes", singular: "process" },
    CollectionDescriptor { container: "assets", plural: "items", singular: "item" },
    CollectionDescriptor { container: "assets", plural: "data", singular: "data" },
];

/// Well-known collection names.
pub mod names {
    pub const ACTORS: &str = "actors";
    pub const EDGES: &str = "edges";
    pub const LOCATIONS: &str = "locations";
    pub const POLICIES: &str = "policies";
    pub const PREDICATES: &str = "predicates";
    pub const PROCESSES: &str = "processes";
    pub const ITEMS: &str = "items";
    pub const DATA: &str = "data";
}

/// Field holding an entity's location references.
pub const AT_LOCATIONS: &str = "atLocations";

/// Field holding a predicate's argument tuples.
pub const PREDICATE_VALUE: &str = "value";

/// Field names that live in a node's attribute bag, keyed by context.
///
/// A context is the field name a record is nested under. Fields not listed
/// for a context are child elements.
#[rustfmt::skip]
pub const KNOWN_ATTRIBUTES: &[(&str, &[&str])] = &[
    // scenario
    ("scenario", &["xmlns", "xmlns:xsi", "xsi:schemaLocation", "author", "version", "date", "id"]),
    ("assetGoal", &["attacker", "profit"]),
    // model
    (
        "system",
        &["xmlns", "xmlns:xsi", "xsi:schemaLocation", "author", "version", "date", "id", "anm_data"],
    ),
    ("location", &["id", "type", "name"]),
    ("actor", &["id", "type", "name"]),
    ("edge", &["directed", "kind"]),
    ("item", &["id", "name", "type"]),
    ("data", &["id", "name", "value", "type"]),
    ("credLocation", &["id"]),
    ("credData", &["name"]),
    ("credItem", &["name"]),
    ("credPredicate", &["name"]),
    ("process", &["id"]),
    ("in", &["loc"]),
    ("out", &["loc"]),
    ("predicate", &["id", "arity"]),
    ("policy", &["id"]),
    ("metric", &["namespace", "name", "value"]),
];

/// Look up a collection by its canonical plural name.
pub fn descriptor(plural: &str) -> Option<&'static CollectionDescriptor> {
    COLLECTIONS.iter().find(|c| c.plural == plural)
}

/// Singular (entity type) name for a collection.
///
/// Unknown collection names yield `None`; there is no identity fallback.
pub fn singular(plural: &str) -> Option<&'static str> {
    descriptor(plural).map(|c| c.singular)
}

/// Canonical collection names, in model order.
pub fn collection_names() -> impl Iterator<Item = &'static str> {
    COLLECTIONS.iter().map(|c| c.plural)
}

/// Distinct document container names, in first-seen model order.
pub fn containers() -> impl Iterator<Item = &'static str> {
    COLLECTIONS
        .iter()
        .enumerate()
        .filter(|(i, c)| !COLLECTIONS[..*i].iter().any(|prev| prev.container == c.container))
        .map(|(_, c)| c.container)
}

/// Collections stored in the given document container.
pub fn collections_in(container: &str) -> impl Iterator<Item = &'static CollectionDescriptor> + '_ {
    COLLECTIONS.iter().filter(move |c| c.container == container)
}

/// Attribute names for a context, if the context has an entry.
pub fn known_attributes(context: &str) -> Option<&'static [&'static str]> {
    KNOWN_ATTRIBUTES
        .iter()
        .find(|(key, _)| *key == context)
        .map(|(_, attrs)| *attrs)
}
