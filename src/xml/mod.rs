//! Minimal XML tree shared by feeds, entries and content fragments.
//!
//! - [`node`] - The [`XmlNode`] element type and its ordered attributes
//! - [`parser`] - Markup fragment parsing on top of `quick-xml`
//! - [`writer`] - Escaping serializer that renders trees back to text

mod node;
mod parser;
mod writer;

pub use node::{Attributes, XmlChild, XmlNode};
pub use parser::{parse_fragment, ParseError, MAX_FRAGMENT_DEPTH};
pub use writer::{document_to_string, inner_markup, write_document, write_node, WriteError};
