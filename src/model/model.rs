//! Canonical in-memory model.
//!
//! A [`Model`] holds one metadata record plus one ordered collection per
//! registered collection name. Models are values: every update returns a new
//! model and leaves the receiver untouched. Collections are persistent
//! vectors, so a derived model shares all untouched entities with its parent.
//!
//! ```text
//! Model
//! ├── system: Arc<Metadata>              (author, version, title, id, ...)
//! └── collections: plural -> Vector<Record>
//!     ├── actors, edges, locations, policies,
//!     └── predicates, processes, items, data
//! ```

use im::Vector;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::registry::{self, COLLECTIONS, names};
use super::value::{Record, Value};
use crate::interchange::{InterchangeError, TEXT_KEY};

/// Schema namespace constants written on the document root.
pub mod namespace {
    /// TREsPASS model namespace.
    pub const MODEL: &str = "https://www.trespass-project.eu/schemas/TREsPASS_model";
    /// XSI namespace.
    pub const XSI: &str = "http://www.w3.org/2001/XMLSchema-instance";
    /// Model schema location.
    pub const MODEL_SCHEMA_LOCATION: &str = "https://www.trespass-project.eu/schemas/TREsPASS_model https://www.trespass-project.eu/schemas/TREsPASS_model.xsd";
}

/// Default author written by this library.
pub const DEFAULT_AUTHOR: &str = "trespass.js";
/// Default model version.
pub const DEFAULT_VERSION: &str = "0.0.0";
/// Default model title.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Model metadata (the `system` element's scalar properties).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub xmlns: String,
    #[serde(rename = "xmlns:xsi")]
    pub xmlns_xsi: String,
    #[serde(rename = "xsi:schemaLocation")]
    pub schema_location: String,
    pub author: String,
    pub version: String,
    pub title: String,
    /// Model identifier. Required for export.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Export timestamp; filled in on export when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Embedded sub-document (itself a canonical model dump).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anm_data: Option<Value>,
    /// Unrecognized `system` fields, kept verbatim.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub extra: Record,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            xmlns: namespace::MODEL.to_string(),
            xmlns_xsi: namespace::XSI.to_string(),
            schema_location: namespace::MODEL_SCHEMA_LOCATION.to_string(),
            author: DEFAULT_AUTHOR.to_string(),
            version: DEFAULT_VERSION.to_string(),
            title: DEFAULT_TITLE.to_string(),
            id: None,
            date: None,
            anm_data: None,
            extra: Record::new(),
        }
    }
}

impl Metadata {
    /// Set a metadata field from its document name.
    ///
    /// Unrecognized names land in [`Metadata::extra`].
    pub fn set_field(&mut self, key: &str, value: Value) {
        if key == "anm_data" {
            self.anm_data = Some(value);
            return;
        }
        if key == "title" {
            self.set_title(value);
            return;
        }
        let text = value.join_words();
        match key {
            "xmlns" => self.xmlns = text.unwrap_or_default(),
            "xmlns:xsi" => self.xmlns_xsi = text.unwrap_or_default(),
            "xsi:schemaLocation" => self.schema_location = text.unwrap_or_default(),
            "author" => self.author = text.unwrap_or_default(),
            "version" => self.version = text.unwrap_or_default(),
            "id" => self.id = text,
            "date" => self.date = text,
            _ => {
                self.extra.insert(Arc::from(key), value);
            }
        }
    }

    /// A title element with attributes keeps its full record in `extra`;
    /// its text becomes the title.
    fn set_title(&mut self, value: Value) {
        match value {
            Value::Record(fields) => {
                self.title = fields
                    .get(TEXT_KEY)
                    .and_then(Value::join_words)
                    .unwrap_or_default();
                self.extra.insert(Arc::from("title"), Value::Record(fields));
            }
            other => {
                self.title = other.join_words().unwrap_or_default();
                self.extra.shift_remove("title");
            }
        }
    }

    /// Metadata as a record keyed by document field names.
    ///
    /// `anm_data` is emitted as-is; the export pass serializes it.
    pub fn to_record(&self) -> Record {
        let mut record = Record::new();
        let mut put = |key: &str, value: Value| {
            record.insert(Arc::from(key), value);
        };
        put("xmlns", self.xmlns.as_str().into());
        put("xmlns:xsi", self.xmlns_xsi.as_str().into());
        put("xsi:schemaLocation", self.schema_location.as_str().into());
        put("author", self.author.as_str().into());
        put("version", self.version.as_str().into());
        if let Some(date) = &self.date {
            put("date", date.as_str().into());
        }
        if let Some(id) = &self.id {
            put("id", id.as_str().into());
        }
        if let Some(anm_data) = &self.anm_data {
            put("anm_data", anm_data.clone());
        }
        put("title", self.title.as_str().into());
        for (key, value) in &self.extra {
            let value = match value {
                Value::Record(fields) if key.as_ref() == "title" => {
                    let mut fields = fields.clone();
                    fields.insert(Arc::from(TEXT_KEY), self.title.as_str().into());
                    Value::Record(fields)
                }
                other => other.clone(),
            };
            record.insert(key.clone(), value);
        }
        record
    }
}

/// The canonical model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Model metadata.
    pub system: Arc<Metadata>,
    /// Entities per collection, keyed by plural name.
    #[serde(flatten)]
    collections: IndexMap<Arc<str>, Vector<Record>>,
}

impl Default for Model {
    fn default() -> Self {
        Self::new()
    }
}

impl Model {
    /// Create an empty model: every collection empty, metadata defaulted.
    pub fn new() -> Self {
        Self {
            system: Arc::new(Metadata::default()),
            collections: COLLECTIONS
                .iter()
                .map(|c| (Arc::from(c.plural), Vector::new()))
                .collect(),
        }
    }

    /// Entities of a collection. Unknown names yield `None`.
    pub fn collection(&self, plural: &str) -> Option<&Vector<Record>> {
        self.collections.get(plural)
    }

    /// Iterate `(plural, entities)` in model order.
    pub fn collections(&self) -> impl Iterator<Item = (&str, &Vector<Record>)> {
        COLLECTIONS
            .iter()
            .filter_map(|c| self.collections.get(c.plural).map(|v| (c.plural, v)))
    }

    /// Total number of entities across all collections.
    pub fn entity_count(&self) -> usize {
        self.collections.values().map(Vector::len).sum()
    }

    pub fn actors(&self) -> &Vector<Record> {
        self.registered(names::ACTORS)
    }

    pub fn edges(&self) -> &Vector<Record> {
        self.registered(names::EDGES)
    }

    pub fn locations(&self) -> &Vector<Record> {
        self.registered(names::LOCATIONS)
    }

    pub fn policies(&self) -> &Vector<Record> {
        self.registered(names::POLICIES)
    }

    pub fn predicates(&self) -> &Vector<Record> {
        self.registered(names::PREDICATES)
    }

    pub fn processes(&self) -> &Vector<Record> {
        self.registered(names::PROCESSES)
    }

    pub fn items(&self) -> &Vector<Record> {
        self.registered(names::ITEMS)
    }

    pub fn data(&self) -> &Vector<Record> {
        self.registered(names::DATA)
    }

    fn registered(&self, plural: &'static str) -> &Vector<Record> {
        static EMPTY: std::sync::OnceLock<Vector<Record>> = std::sync::OnceLock::new();
        self.collections
            .get(plural)
            .unwrap_or_else(|| EMPTY.get_or_init(Vector::new))
    }

    /// Append a record to the named collection.
    ///
    /// Returns [`InterchangeError::UnknownCollection`] for names outside the
    /// registry.
    pub fn add_to_collection(&self, plural: &str, record: Record) -> Result<Self, InterchangeError> {
        let descriptor = registry::descriptor(plural)
            .ok_or_else(|| InterchangeError::UnknownCollection(plural.to_string()))?;
        Ok(self.push(descriptor.plural, record))
    }

    /// Restore the collection invariant after deserialization: every
    /// registered collection present, in registry order, nothing else.
    pub(crate) fn normalized(mut self) -> Self {
        let mut collections = IndexMap::with_capacity(COLLECTIONS.len());
        for descriptor in COLLECTIONS {
            let entities = self.collections.shift_remove(descriptor.plural).unwrap_or_default();
            collections.insert(Arc::from(descriptor.plural), entities);
        }
        for name in self.collections.keys() {
            tracing::warn!("dropping unknown collection `{name}`");
        }
        self.collections = collections;
        self
    }

    /// Replace a whole collection. Used by the import pass.
    pub(crate) fn with_collection(&self, plural: &'static str, entities: Vector<Record>) -> Self {
        let mut next = self.clone();
        next.collections.insert(Arc::from(plural), entities);
        next
    }

    fn push(&self, plural: &'static str, record: Record) -> Self {
        let mut next = self.clone();
        next.collections
            .entry(Arc::from(plural))
            .or_default()
            .push_back(record);
        next
    }

    pub fn add_actor(&self, actor: Record) -> Self {
        self.push(names::ACTORS, actor)
    }

    pub fn add_item(&self, item: Record) -> Self {
        self.push(names::ITEMS, item)
    }

    /// Add a data asset. `name` defaults to the data's `id`.
    pub fn add_data(&self, mut data: Record) -> Self {
        let has_name = data.get("name").is_some_and(Value::is_truthy);
        if !has_name {
            if let Some(id) = data.get("id").cloned() {
                data.insert(Arc::from("name"), id);
            }
        }
        self.push(names::DATA, data)
    }

    /// Add an edge. `directed` defaults to `true`.
    pub fn add_edge(&self, mut edge: Record) -> Self {
        if !edge.contains_key("directed") {
            edge.shift_insert(0, Arc::from("directed"), Value::Boolean(true));
        }
        self.push(names::EDGES, edge)
    }

    pub fn add_policy(&self, policy: Record) -> Self {
        self.push(names::POLICIES, policy)
    }

    pub fn add_predicate(&self, predicate: Record) -> Self {
        self.push(names::PREDICATES, predicate)
    }

    pub fn add_process(&self, process: Record) -> Self {
        self.push(names::PROCESSES, process)
    }

    pub fn add_location(&self, location: Record) -> Self {
        self.push(names::LOCATIONS, location)
    }

    #[deprecated(note = "use `add_location` instead")]
    pub fn add_room(&self, room: Record) -> Self {
        tracing::warn!("add_room() is deprecated, use add_location()");
        self.add_location(room)
    }

    /// Return a model with updated metadata.
    ///
    /// Collections are shared with `self`.
    pub fn update_metadata(&self, update: impl FnOnce(&mut Metadata)) -> Self {
        let mut next = self.clone();
        update(Arc::make_mut(&mut next.system));
        next
    }

    pub fn with_id(&self, id: impl Into<String>) -> Self {
        let id = id.into();
        self.update_metadata(|m| m.id = Some(id))
    }

    pub fn with_title(&self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.update_metadata(|m| m.title = title)
    }

    pub fn with_author(&self, author: impl Into<String>) -> Self {
        let author = author.into();
        self.update_metadata(|m| m.author = author)
    }

    pub fn with_date(&self, date: impl Into<String>) -> Self {
        let date = date.into();
        self.update_metadata(|m| m.date = Some(date))
    }
}
