//! Import pass: decoded document tree -> canonical model.
//!
//! The XML codec leaves three ambiguities in the tree that this pass
//! resolves:
//!
//! - a container with one child element holds a bare node instead of a list
//! - attributes and child elements live in separate bags
//! - list-valued fields (`atLocations`, predicate tuples) arrive as
//!   space-separated text
//!
//! String reshaping depends on where a value sits, so the walk carries a
//! [`Trace`] of the field names from the collection down to the value.
//! The trace is an immutable linked list on the call stack; sibling
//! branches never see each other's entries.

use im::Vector;
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::InterchangeError;
use super::tree::{Document, Element, Node, TEXT_KEY};
use crate::model::registry::{self, AT_LOCATIONS, COLLECTIONS, CollectionDescriptor, PREDICATE_VALUE};
use crate::model::value::{Record, Value, collapse_whitespace, split_words};
use crate::model::{Metadata, Model};

/// Root element name of a model document.
pub const MODEL_ROOT: &str = "system";

/// Field names from the collection entity down to the current value.
///
/// Repeated elements push their own name again instead of an index, so a
/// value nested in a list still sees the field it belongs to.
#[derive(Clone, Copy, Debug)]
pub struct Trace<'a> {
    key: &'a str,
    parent: Option<&'a Trace<'a>>,
}

impl<'a> Trace<'a> {
    pub fn root(key: &'a str) -> Self {
        Self { key, parent: None }
    }

    /// Extend the trace by one field name.
    pub fn push<'b>(&'b self, key: &'b str) -> Trace<'b> {
        Trace {
            key,
            parent: Some(self),
        }
    }

    /// Name of the innermost field.
    pub fn key(&self) -> &'a str {
        self.key
    }

    /// The `n`th name from the end; `nth_back(1)` is [`Trace::key`].
    pub fn nth_back(&self, n: usize) -> Option<&'a str> {
        let mut current = self;
        for _ in 1..n {
            current = current.parent?;
        }
        (n > 0).then_some(current.key)
    }

    /// Whether this value is one tuple of a predicate's `value` list.
    fn in_predicate_value(&self) -> bool {
        self.nth_back(4) == Some("predicate") && self.nth_back(2) == Some(PREDICATE_VALUE)
    }
}

/// Import a decoded document whose root must be `<system>`.
pub fn normalize_document(document: &Document) -> Result<Model, InterchangeError> {
    if document.root.as_ref() != MODEL_ROOT {
        return Err(InterchangeError::missing_element(MODEL_ROOT));
    }
    Ok(normalize(&document.node))
}

/// Normalize the `<system>` node into a canonical model.
///
/// Odd shapes (empty containers, stray placeholders, singleton children)
/// are recovered silently; run validation afterwards for strictness.
pub fn normalize(system: &Node) -> Model {
    let empty = Element::new();
    let element = match system {
        Node::Element(element) => element,
        _ => &empty,
    };

    let metadata = normalize_metadata(element);
    let mut model = Model::new().update_metadata(|m| *m = metadata);

    for descriptor in COLLECTIONS {
        if let Some(entities) = normalize_collection(element, descriptor) {
            model = model.with_collection(descriptor.plural, entities);
        }
    }
    model
}

fn normalize_metadata(system: &Element) -> Metadata {
    let mut metadata = Metadata::default();

    for (key, value) in &system.attributes {
        metadata.set_field(key, value.clone());
    }

    let containers: Vec<_> = registry::containers().collect();
    for (key, child) in &system.children {
        if containers.iter().any(|c| *c == key.as_ref()) {
            continue;
        }
        match child {
            Node::Leaf(value) if key.as_ref() == "title" => metadata.set_field(key, value.clone()),
            other => {
                let value = normalize_node(other, &Trace::root(key));
                metadata.set_field(key, value);
            }
        }
    }

    if let Some(Value::String(raw)) = &metadata.anm_data {
        match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => metadata.anm_data = Some(parsed),
            Err(e) => warn!("anm_data is not valid JSON, keeping it as text: {e}"),
        }
    }

    metadata
}

/// Entities of one collection, or `None` if its container is absent.
fn normalize_collection(system: &Element, descriptor: &CollectionDescriptor) -> Option<Vector<Record>> {
    let container = system.child(descriptor.container)?;

    let containers: Vec<&Node> = match container {
        Node::Repeated(nodes) => nodes.iter().collect(),
        node => vec![node],
    };

    let mut payload: Vec<&Node> = Vec::new();
    for node in containers {
        match node {
            Node::Element(element) => match element.child(descriptor.singular) {
                Some(Node::Repeated(entries)) => payload.extend(entries),
                Some(entry) => payload.push(entry),
                None => {}
            },
            // `<locations>   </locations>` decodes to text
            _ => debug!("<{}> container is empty", descriptor.container),
        }
    }

    let before = payload.len();
    payload.retain(|node| !node.is_empty_leaf());
    if payload.len() < before {
        debug!(
            "dropped {} empty <{}> placeholder(s)",
            before - payload.len(),
            descriptor.singular
        );
    }

    let root = Trace::root(descriptor.singular);
    let entry_trace = root.push(descriptor.singular);
    let entities = payload
        .into_iter()
        .map(|node| match normalize_node(node, &entry_trace) {
            Value::Record(record) => record,
            other => {
                trace!("<{}> entry without fields, keeping its text", descriptor.singular);
                Record::from([(Arc::from(TEXT_KEY), other)])
            }
        })
        .collect();
    Some(entities)
}

/// Normalize one node found under `trace`.
pub fn normalize_node(node: &Node, trace: &Trace<'_>) -> Value {
    match node {
        Node::Leaf(value) => normalize_scalar(value, trace),
        Node::Repeated(items) => {
            let item_trace = trace.push(trace.key());
            Value::List(items.iter().map(|item| normalize_node(item, &item_trace)).collect())
        }
        Node::Element(element) => Value::Record(normalize_element(element, trace)),
    }
}

/// Merge attributes and children into one record.
fn normalize_element(element: &Element, trace: &Trace<'_>) -> Record {
    let mut record = Record::with_capacity(element.attributes.len() + element.children.len());

    for (key, value) in &element.attributes {
        record.insert(key.clone(), normalize_scalar(value, &trace.push(key)));
    }

    let is_predicate = trace.key() == "predicate";
    for (key, child) in &element.children {
        if record.contains_key(key) {
            // attribute wins over a same-named child
            continue;
        }
        let child_trace = trace.push(key);
        let value = match child {
            // a single tuple still makes a list of tuples
            Node::Leaf(_) if is_predicate && key.as_ref() == PREDICATE_VALUE => {
                normalize_node(&Node::Repeated(vec![child.clone()]), &child_trace)
            }
            _ => normalize_node(child, &child_trace),
        };
        record.insert(key.clone(), value);
    }

    if let Some(text) = &element.text {
        let text = Value::String(text.clone());
        record.insert(Arc::from(TEXT_KEY), normalize_scalar(&text, &trace.push(TEXT_KEY)));
    }

    record
}

fn normalize_scalar(value: &Value, trace: &Trace<'_>) -> Value {
    let Value::String(raw) = value else {
        return value.clone();
    };
    let text = collapse_whitespace(raw);

    if trace.key() == AT_LOCATIONS || trace.in_predicate_value() {
        return Value::List(split_words(&text));
    }
    Value::String(Arc::from(text.as_ref()))
}
