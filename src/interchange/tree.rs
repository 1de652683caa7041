//! Decoded document tree.
//!
//! This is the shape the XML codec produces and consumes. It mirrors the
//! document closely and keeps its ambiguities: an element with exactly one
//! `<location>` child holds a bare node, while two or more become
//! [`Node::Repeated`]. The import pass resolves these; the export pass
//! produces them.
//!
//! ```text
//! <system id="m1">            Element { attributes: {id}, children: {title, locations} }
//!   <title>T</title>            Leaf("T")
//!   <locations>                 Element { children: {location} }
//!     <location id="a"/>          Repeated([Element{id=a}, Element{id=b}])
//!     <location id="b"/>
//!   </locations>
//! </system>
//! ```

use indexmap::IndexMap;
use std::sync::Arc;

use crate::model::Value;

/// Reserved field holding an element's own text when it also has
/// attributes or children.
pub const TEXT_KEY: &str = "_text";

/// A decoded document: root element name plus its node.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub root: Arc<str>,
    pub node: Node,
}

impl Document {
    pub fn new(root: impl Into<Arc<str>>, node: Node) -> Self {
        Self {
            root: root.into(),
            node,
        }
    }
}

/// One node of the tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// Text-only element without attributes (`<title>T</title>`, `<a/>`).
    Leaf(Value),
    /// Element with attributes and/or child elements.
    Element(Element),
    /// Several same-named sibling elements.
    Repeated(Vec<Node>),
}

impl Node {
    /// Leaf holding a string.
    pub fn text(text: impl Into<Arc<str>>) -> Self {
        Self::Leaf(Value::String(text.into()))
    }

    /// Whether this is an empty text leaf, as produced by `<a/>`.
    pub fn is_empty_leaf(&self) -> bool {
        matches!(self, Self::Leaf(Value::String(s)) if s.is_empty())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(element) => Some(element),
            _ => None,
        }
    }
}

/// Attribute bag plus children of one element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    pub attributes: IndexMap<Arc<str>, Value>,
    pub children: IndexMap<Arc<str>, Node>,
    /// Own text content, when the element also has attributes or children.
    pub text: Option<Arc<str>>,
}

impl Element {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, key: impl Into<Arc<str>>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add a child. A second child under the same name turns the entry
    /// into [`Node::Repeated`].
    pub fn with_child(mut self, key: impl Into<Arc<str>>, child: Node) -> Self {
        self.push_child(key, child);
        self
    }

    /// Add a child, collapsing same-named siblings into one repeated entry.
    pub fn push_child(&mut self, key: impl Into<Arc<str>>, child: Node) {
        let key = key.into();
        match self.children.get_mut(&key) {
            Some(Node::Repeated(items)) => items.push(child),
            Some(existing) => {
                let first = std::mem::replace(existing, Node::Repeated(Vec::new()));
                *existing = Node::Repeated(vec![first, child]);
            }
            None => {
                self.children.insert(key, child);
            }
        }
    }

    pub fn child(&self, key: &str) -> Option<&Node> {
        self.children.get(key)
    }

    /// Whether the element has no attributes, children or text.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty() && self.text.is_none()
    }
}
