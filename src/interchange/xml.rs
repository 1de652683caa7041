//! TREsPASS model XML support.
//!
//! The codec maps XML text onto the [`Document`] tree and back; the
//! [`import`](super::import) and [`export`](super::export) passes do the
//! context-sensitive reshaping.
//!
//! ## Document Structure
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
//! <system xmlns="https://www.trespass-project.eu/schemas/TREsPASS_model"
//!         id="model-1" author="trespass.js" version="0.0.0" date="2016-01-17 23:20:21">
//!   <title>Office</title>
//!   <locations>
//!     <location id="hall"/>
//!     <location id="desk"><atLocations>hall</atLocations></location>
//!   </locations>
//!   <predicates>
//!     <predicate id="isUserId" arity="2">
//!       <value>user1 userId1</value>
//!       <value>user2 userId2</value>
//!     </predicate>
//!   </predicates>
//!   <assets>
//!     <item id="laptop" name="Laptop"><atLocations>desk</atLocations></item>
//!   </assets>
//! </system>
//! ```

use std::sync::Arc;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use tracing::trace;

use super::tree::{Document, Element, Node};
use super::{InterchangeError, ModelFormat, export, import};
use crate::model::{Model, Scenario, Value};

/// Output layout of the XML writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XmlOptions {
    /// Indentation character.
    pub indent_char: u8,
    /// Indentation characters per level.
    pub indent_size: usize,
    /// Write the `<?xml ...?>` declaration.
    pub declaration: bool,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            indent_char: b'\t',
            indent_size: 1,
            declaration: true,
        }
    }
}

/// TREsPASS model XML format handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xml {
    options: XmlOptions,
}

impl Xml {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: XmlOptions) -> Self {
        Self { options }
    }

    /// Render a scenario as XML. Requires an id; fills in the date.
    pub fn write_scenario(&self, scenario: &Scenario) -> Result<Vec<u8>, InterchangeError> {
        let mut scenario = scenario.clone();
        if scenario.date.is_none() {
            scenario.date = Some(export::timestamp());
        }
        let document = export::prepare_scenario(&scenario)?;
        encode(&document, &self.options).map(String::into_bytes)
    }
}

impl ModelFormat for Xml {
    fn name(&self) -> &'static str {
        "TREsPASS XML"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["xml"]
    }

    fn mime_type(&self) -> &'static str {
        "application/xml"
    }

    fn read(&self, input: &[u8]) -> Result<Model, InterchangeError> {
        let text = std::str::from_utf8(input)
            .map_err(|e| InterchangeError::xml(format!("Invalid UTF-8: {e}")))?;
        let document = decode(text)?;
        import::normalize_document(&document)
    }

    fn write(&self, model: &Model) -> Result<Vec<u8>, InterchangeError> {
        export::require_id(model)?;
        let document = export::prepare(&export::stamp(model))?;
        encode(&document, &self.options).map(String::into_bytes)
    }

    fn validate(&self, input: &[u8]) -> Result<(), InterchangeError> {
        let content = std::str::from_utf8(input)
            .map_err(|e| InterchangeError::xml(format!("Invalid UTF-8: {e}")))?;
        if !content.contains("<system") {
            return Err(InterchangeError::xml("Missing <system> root element"));
        }
        Ok(())
    }
}

// ============================================================================
// DECODING
// ============================================================================

/// An element being read: its name, attributes, children and text so far.
struct Frame {
    name: Arc<str>,
    element: Element,
    text: String,
}

impl Frame {
    fn open(start: &BytesStart<'_>) -> Result<Self, InterchangeError> {
        let name = std::str::from_utf8(start.name().as_ref())
            .map_err(|e| InterchangeError::xml(format!("Invalid tag name: {e}")))?
            .to_string();

        let mut element = Element::new();
        for attr_result in start.attributes() {
            let attr = attr_result
                .map_err(|e| InterchangeError::xml(format!("Attribute error: {e}")))?;
            let key = std::str::from_utf8(attr.key.as_ref())
                .map_err(|e| InterchangeError::xml(format!("Attribute key error: {e}")))?;
            let value = attr
                .unescape_value()
                .map_err(|e| InterchangeError::xml(format!("Attribute value error: {e}")))?;
            element
                .attributes
                .insert(Arc::from(key), Value::String(Arc::from(value.as_ref())));
        }

        Ok(Self {
            name: name.into(),
            element,
            text: String::new(),
        })
    }

    /// Text-only elements without attributes become leaves.
    fn close(self) -> (Arc<str>, Node) {
        let Self {
            name,
            mut element,
            text,
        } = self;
        let text = text.trim();
        let node = if element.attributes.is_empty() && element.children.is_empty() {
            Node::text(text)
        } else {
            if !text.is_empty() {
                element.text = Some(Arc::from(text));
            }
            Node::Element(element)
        };
        (name, node)
    }
}

/// Decode XML text into a document tree.
pub fn decode(text: &str) -> Result<Document, InterchangeError> {
    let mut reader = Reader::from_reader(text.as_bytes());
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Document> = None;
    let mut buf = Vec::new();

    loop {
        let position = reader.buffer_position();
        match reader.read_event_into(&mut buf).map_err(|e| {
            InterchangeError::xml(format!("XML parse error at position {position}: {e}"))
        })? {
            Event::Start(ref e) => stack.push(Frame::open(e)?),
            Event::Empty(ref e) => {
                let (name, node) = Frame::open(e)?.close();
                attach(&mut stack, &mut root, name, node)?;
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| InterchangeError::xml("Unexpected closing tag"))?;
                let (name, node) = frame.close();
                attach(&mut stack, &mut root, name, node)?;
            }
            Event::Text(ref e) => {
                let text = e
                    .unescape()
                    .map_err(|e| InterchangeError::xml(format!("Text error: {e}")))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&text);
                }
            }
            Event::CData(e) => {
                let raw = e.into_inner();
                let text = std::str::from_utf8(&raw)
                    .map_err(|e| InterchangeError::xml(format!("CDATA error: {e}")))?;
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(text);
                }
            }
            Event::Eof => break,
            // declarations, comments, processing instructions, doctype
            _ => {}
        }
        buf.clear();
    }

    if let Some(frame) = stack.last() {
        return Err(InterchangeError::xml(format!("Unclosed element <{}>", frame.name)));
    }
    root.ok_or_else(|| InterchangeError::missing_element("root"))
}

fn attach(
    stack: &mut [Frame],
    root: &mut Option<Document>,
    name: Arc<str>,
    node: Node,
) -> Result<(), InterchangeError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.element.push_child(name, node);
            Ok(())
        }
        None if root.is_some() => Err(InterchangeError::xml(format!(
            "Multiple root elements: <{name}>"
        ))),
        None => {
            trace!("decoded <{name}> root");
            *root = Some(Document::new(name, node));
            Ok(())
        }
    }
}

// ============================================================================
// ENCODING
// ============================================================================

fn write_error(e: impl std::fmt::Display) -> InterchangeError {
    InterchangeError::xml(format!("Write error: {e}"))
}

/// Encode a document tree as XML text.
pub fn encode(document: &Document, options: &XmlOptions) -> Result<String, InterchangeError> {
    let mut writer = Writer::new_with_indent(Vec::new(), options.indent_char, options.indent_size);

    if options.declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(write_error)?;
    }
    write_node(&mut writer, &document.root, &document.node)?;

    let mut output = String::from_utf8(writer.into_inner()).map_err(write_error)?;
    output.push('\n');
    Ok(output)
}

fn write_node<W: std::io::Write>(
    writer: &mut Writer<W>,
    name: &str,
    node: &Node,
) -> Result<(), InterchangeError> {
    match node {
        Node::Repeated(items) => {
            for item in items {
                write_node(writer, name, item)?;
            }
            Ok(())
        }
        Node::Leaf(value) => {
            let text = value.join_words().unwrap_or_default();
            write_text_element(writer, BytesStart::new(name), &text)
        }
        Node::Element(element) => {
            let mut start = BytesStart::new(name);
            for (key, value) in &element.attributes {
                let text = value.join_words().unwrap_or_default();
                start.push_attribute((key.as_ref(), text.as_str()));
            }

            if element.children.is_empty() {
                let text = element.text.as_deref().unwrap_or_default();
                return write_text_element(writer, start, text);
            }

            writer.write_event(Event::Start(start)).map_err(write_error)?;
            if let Some(text) = &element.text {
                writer
                    .write_event(Event::Text(BytesText::new(text)))
                    .map_err(write_error)?;
            }
            for (key, child) in &element.children {
                write_node(writer, key, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(name)))
                .map_err(write_error)?;
            Ok(())
        }
    }
}

/// `<name>text</name>`, or `<name/>` when there is no text.
fn write_text_element<W: std::io::Write>(
    writer: &mut Writer<W>,
    start: BytesStart<'_>,
    text: &str,
) -> Result<(), InterchangeError> {
    if text.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start)).map_err(write_error)?;
    writer
        .write_event(Event::Text(BytesText::new(text)))
        .map_err(write_error)?;
    writer.write_event(Event::End(end)).map_err(write_error)
}
