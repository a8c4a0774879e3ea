use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use thiserror::Error;

use super::node::{Attributes, XmlChild, XmlNode};

/// SEC-003: Maximum nesting depth accepted in a markup fragment.
/// Keeps the recursive writer walk bounded for hostile input.
pub const MAX_FRAGMENT_DEPTH: usize = 256;

/// Errors raised while turning markup text into an [`XmlNode`] tree.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The underlying reader rejected the markup.
    #[error("XML parse error: {0}")]
    Xml(String),

    /// Input ended while an element was still open.
    #[error("Unclosed element <{0}> at end of fragment")]
    UnclosedElement(String),

    /// SEC-003: Nesting depth exceeds safety limit.
    #[error("Fragment nesting depth exceeds maximum of {0} levels")]
    MaxDepthExceeded(usize),
}

/// Parses a markup fragment into its top-level children.
///
/// A fragment may hold several sibling elements and bare text, so the result
/// is a list rather than a single root. Comments, processing instructions and
/// doctype declarations are dropped; CDATA sections become text.
///
/// # Errors
///
/// Returns [`ParseError`] for malformed markup: mismatched or stray end tags,
/// elements left open at the end of input, unknown entities, or nesting deeper
/// than [`MAX_FRAGMENT_DEPTH`].
///
/// # Security
///
/// SEC-002: quick-xml (0.37) never expands `<!ENTITY>` declarations. Only the
/// five XML builtins and numeric character references are resolved, so
/// `&custom;` yields an error rather than injected content.
pub fn parse_fragment(markup: &str) -> Result<Vec<XmlChild>, ParseError> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().trim_text(false);

    let mut roots: Vec<XmlChild> = Vec::new();
    // Elements opened but not yet closed, innermost last.
    let mut open: Vec<XmlNode> = Vec::new();
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if open.len() >= MAX_FRAGMENT_DEPTH {
                    return Err(ParseError::MaxDepthExceeded(MAX_FRAGMENT_DEPTH));
                }
                open.push(element_from_start(&e, &reader)?);
            }
            Ok(Event::Empty(e)) => {
                let node = element_from_start(&e, &reader)?;
                push_child(&mut open, &mut roots, XmlChild::Element(node));
            }
            Ok(Event::End(_)) => {
                // check_end_names is on, so quick-xml has already matched the name.
                let node = open
                    .pop()
                    .ok_or_else(|| ParseError::Xml("unexpected end tag".to_string()))?;
                push_child(&mut open, &mut roots, XmlChild::Element(node));
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| ParseError::Xml(e.to_string()))?;
                push_text(&mut open, &mut roots, &text);
            }
            Ok(Event::CData(e)) => {
                let bytes = e.into_inner();
                push_text(&mut open, &mut roots, &String::from_utf8_lossy(&bytes));
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ParseError::Xml(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if let Some(node) = open.pop() {
        return Err(ParseError::UnclosedElement(node.tag));
    }

    tracing::trace!(nodes = roots.len(), "Parsed markup fragment");
    Ok(roots)
}

fn element_from_start(e: &BytesStart<'_>, reader: &Reader<&[u8]>) -> Result<XmlNode, ParseError> {
    let tag = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Attributes::new();
    let decoder = reader.decoder();

    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| ParseError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .decode_and_unescape_value(decoder)
            .map_err(|e| ParseError::Xml(e.to_string()))?;
        attributes.set(key, value.into_owned());
    }

    Ok(XmlNode {
        tag,
        attributes,
        children: Vec::new(),
    })
}

fn push_child(open: &mut [XmlNode], roots: &mut Vec<XmlChild>, child: XmlChild) {
    match open.last_mut() {
        Some(parent) => parent.children.push(child),
        None => roots.push(child),
    }
}

/// Appends text, merging with a preceding text run (CDATA splits them).
fn push_text(open: &mut [XmlNode], roots: &mut Vec<XmlChild>, text: &str) {
    if text.is_empty() {
        return;
    }
    let siblings = match open.last_mut() {
        Some(parent) => &mut parent.children,
        None => roots,
    };
    match siblings.last_mut() {
        Some(XmlChild::Text(prev)) => prev.push_str(text),
        _ => siblings.push(XmlChild::Text(text.to_string())),
    }
}
