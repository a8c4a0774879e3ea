use std::borrow::Cow;
use std::io::Write;

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;
use thiserror::Error;

use super::node::{XmlChild, XmlNode};
use crate::util::strip_invalid_xml_chars;

/// Errors that can occur while rendering a tree to text.
#[derive(Debug, Error)]
pub enum WriteError {
    /// The XML writer failed to emit an event.
    #[error("Failed to write XML: {0}")]
    Xml(String),

    /// The sink rejected raw output.
    #[error("Failed to write to output: {0}")]
    Io(#[from] std::io::Error),

    /// Rendered bytes were not valid UTF-8.
    #[error("Generated XML contains invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

fn emit<'a, W: Write>(writer: &mut Writer<W>, event: Event<'a>) -> Result<(), WriteError> {
    writer
        .write_event(event)
        .map_err(|e| WriteError::Xml(e.to_string()))
}

/// Escapes an attribute value. Tab, newline and carriage return become
/// character references so attribute-value normalization keeps them.
fn attribute_value(value: &str) -> String {
    let cleaned = strip_invalid_xml_chars(value);
    let escaped = escape(&*cleaned).into_owned();
    if !escaped.contains(['\t', '\n', '\r']) {
        return escaped;
    }
    escaped
        .replace('\t', "&#9;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
}

/// Writes `node` and its subtree.
///
/// Attribute values and text are escaped, and characters XML 1.0 forbids are
/// dropped. An element whose content is empty is written in self-closed form.
pub fn write_node<W: Write>(writer: &mut Writer<W>, node: &XmlNode) -> Result<(), WriteError> {
    let mut start = BytesStart::new(node.tag.as_str());
    for (key, value) in node.attributes.iter() {
        start.push_attribute(Attribute {
            key: QName(key.as_bytes()),
            value: Cow::Owned(attribute_value(value).into_bytes()),
        });
    }

    if node.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    write_children(writer, &node.children)?;
    emit(writer, Event::End(BytesEnd::new(node.tag.as_str())))
}

fn write_children<W: Write>(
    writer: &mut Writer<W>,
    children: &[XmlChild],
) -> Result<(), WriteError> {
    for child in children {
        match child {
            XmlChild::Element(node) => write_node(writer, node)?,
            XmlChild::Text(text) => {
                let text = strip_invalid_xml_chars(text);
                if !text.is_empty() {
                    emit(writer, Event::Text(BytesText::new(&text)))?;
                }
            }
        }
    }
    Ok(())
}

/// Renders a complete document: the XML prologue followed by `root`.
///
/// The sink is handed back once everything has been written so callers can
/// recover buffers.
pub fn write_document<W: Write>(sink: W, root: &XmlNode) -> Result<W, WriteError> {
    let mut writer = Writer::new(sink);

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)),
    )?;
    writer.get_mut().write_all(b"\n")?;
    write_node(&mut writer, root)?;
    writer.get_mut().write_all(b"\n")?;

    Ok(writer.into_inner())
}

/// Renders a complete document into a `String`.
pub fn document_to_string(root: &XmlNode) -> Result<String, WriteError> {
    let bytes = write_document(Vec::new(), root)?;
    Ok(String::from_utf8(bytes)?)
}

/// Renders only the children of `node`, without its own tags.
pub fn inner_markup(node: &XmlNode) -> Result<String, WriteError> {
    let mut writer = Writer::new(Vec::new());
    write_children(&mut writer, &node.children)?;
    Ok(String::from_utf8(writer.into_inner())?)
}
