//! Export pass: canonical model -> document tree.
//!
//! The inverse of [`super::import`]. Decisions are made on the key a value
//! is stored under; the canonical model is flat per entity, so one level of
//! context is enough:
//!
//! - records under a key with a known-attribute entry are split into an
//!   attribute bag and children
//! - `atLocations` lists are joined into one space-separated string
//! - tuples in a `value` list are joined into one string each
//! - collections are wrapped as `<plural><singular/>...</plural>`, with
//!   `items` and `data` sharing `<assets>`; empty containers are dropped

use chrono::Local;
use std::sync::Arc;
use tracing::debug;

use super::InterchangeError;
use super::import::MODEL_ROOT;
use super::tree::{Document, Element, Node, TEXT_KEY};
use crate::model::registry::{self, AT_LOCATIONS, PREDICATE_VALUE, known_attributes};
use crate::model::value::{Record, Value};
use crate::model::{Model, Scenario};

/// Timestamp format written into the `date` attribute.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Root element name of a scenario document.
pub const SCENARIO_ROOT: &str = "scenario";

/// Current local time in [`DATE_FORMAT`].
pub fn timestamp() -> String {
    Local::now().format(DATE_FORMAT).to_string()
}

/// The model's id; exporting an unidentified model is refused.
pub fn require_id(model: &Model) -> Result<&str, InterchangeError> {
    match model.system.id.as_deref() {
        Some(id) if !id.is_empty() => Ok(id),
        _ => Err(InterchangeError::missing_attribute("system id")),
    }
}

/// Fill in the export timestamp if the model has none.
pub fn stamp(model: &Model) -> Model {
    if model.system.date.is_some() {
        return model.clone();
    }
    debug!("model has no date, using current time");
    model.with_date(timestamp())
}

/// Build the document tree for a model.
///
/// Fails before building anything if the model has no id.
pub fn prepare(model: &Model) -> Result<Document, InterchangeError> {
    require_id(model)?;

    let mut system = model.system.to_record();
    if let Some(anm_data) = system.get_mut("anm_data") {
        if !anm_data.is_scalar() {
            let json = serde_json::to_string(&*anm_data)
                .map_err(|e| InterchangeError::json(format!("anm_data: {e}")))?;
            *anm_data = Value::String(json.into());
        }
    }

    for container in registry::containers() {
        let mut holder = Record::new();
        for descriptor in registry::collections_in(container) {
            let Some(entities) = model.collection(descriptor.plural) else {
                continue;
            };
            if entities.is_empty() {
                continue;
            }
            let list = entities.iter().cloned().map(Value::Record).collect();
            holder.insert(Arc::from(descriptor.singular), Value::List(list));
        }
        if !holder.is_empty() {
            system.insert(Arc::from(container), Value::Record(holder));
        }
    }

    Ok(Document::new(MODEL_ROOT, prepare_value(&Value::Record(system), MODEL_ROOT)))
}

/// Build the document tree for a scenario.
pub fn prepare_scenario(scenario: &Scenario) -> Result<Document, InterchangeError> {
    if scenario.id.as_deref().is_none_or(str::is_empty) {
        return Err(InterchangeError::missing_attribute("scenario id"));
    }
    let record = scenario.to_record();
    Ok(Document::new(
        SCENARIO_ROOT,
        prepare_value(&Value::Record(record), SCENARIO_ROOT),
    ))
}

/// Split `record` into `(children, attributes)`.
///
/// Attributes come out in the order of `names`; children keep record order.
pub fn separate_attributes(names: &[&str], record: &Record) -> (Record, Record) {
    let attributes: Record = names
        .iter()
        .filter_map(|name| record.get_key_value(*name))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let children: Record = record
        .iter()
        .filter(|(k, _)| !names.iter().any(|name| *name == k.as_ref()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    (children, attributes)
}

/// Turn a value stored under `key` into a tree node.
pub fn prepare_value(value: &Value, key: &str) -> Node {
    match value {
        Value::List(items) => Node::Repeated(
            items
                .iter()
                .map(|item| match item {
                    Value::List(_) if key == PREDICATE_VALUE => {
                        Node::Leaf(Value::String(item.join_words().unwrap_or_default().into()))
                    }
                    _ => prepare_value(item, key),
                })
                .collect(),
        ),
        Value::Record(record) => Node::Element(prepare_record(record, key)),
        scalar => Node::Leaf(scalar.clone()),
    }
}

fn prepare_record(record: &Record, key: &str) -> Element {
    let (children, attributes) = match known_attributes(key) {
        Some(names) => separate_attributes(names, record),
        None => (record.clone(), Record::new()),
    };

    let mut element = Element::new();
    let mut complex_attributes = Record::new();
    for (name, value) in attributes {
        if value.is_scalar() {
            element.attributes.insert(name, value);
        } else {
            complex_attributes.insert(name, value);
        }
    }

    for (name, value) in children.iter().chain(&complex_attributes) {
        if name.as_ref() == TEXT_KEY {
            element.text = value.join_words().map(Arc::from);
            continue;
        }
        let node = match value {
            Value::List(_) if name.as_ref() == AT_LOCATIONS => {
                Node::Leaf(Value::String(value.join_words().unwrap_or_default().into()))
            }
            _ => prepare_value(value, name),
        };
        element.children.insert(name.clone(), node);
    }

    element
}
