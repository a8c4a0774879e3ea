//! Normalization of caller input into typed content and author constructs.
//!
//! Callers classify their input once, at the boundary, by picking a variant
//! of [`ContentNode`] / [`AuthorNode`] (or relying on the `From` impls). The
//! rest of the crate only ever matches on those closed sets.

use quick_xml::escape::escape;

use crate::config::AuthorConfig;
use crate::xml::{inner_markup, parse_fragment, ParseError, WriteError, XmlChild, XmlNode};

/// XML namespace for XHTML content.
pub const XHTML_NS: &str = "http://www.w3.org/1999/xhtml";

/// A typed Atom text construct, ready to become `content` or `summary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    /// Plain text; rendered without a `type` attribute.
    Text(String),
    /// HTML markup carried as a string; escaped on output.
    Html(String),
    /// An XHTML `div` element wrapping the fragment.
    Xhtml(XmlNode),
}

impl ContentNode {
    /// Value of the `type` attribute, `None` for plain text.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            ContentNode::Text(_) => None,
            ContentNode::Html(_) => Some("html"),
            ContentNode::Xhtml(_) => Some("xhtml"),
        }
    }

    /// Recovers the construct from a rendered `content`/`summary` field,
    /// dispatching on its `type` attribute.
    pub fn from_field(field: &XmlNode) -> Self {
        match field.attr("type") {
            Some("html") => ContentNode::Html(field.text()),
            Some("xhtml") => match field.child("div") {
                Some(div) => ContentNode::Xhtml(div.clone()),
                None => {
                    let mut div = XmlNode::new("div").with_attr("xmlns", XHTML_NS);
                    div.children = field.children.clone();
                    ContentNode::Xhtml(div)
                }
            },
            _ => ContentNode::Text(field.text()),
        }
    }

    /// Renders the construct as an HTML string.
    ///
    /// Text is escaped, HTML passes through and XHTML has its wrapping `div`
    /// stripped and its children serialized.
    pub fn to_html(&self) -> Result<String, WriteError> {
        match self {
            ContentNode::Text(text) => Ok(escape(text.as_str()).into_owned()),
            ContentNode::Html(html) => Ok(html.clone()),
            ContentNode::Xhtml(div) => inner_markup(div),
        }
    }
}

/// Raw XHTML input: markup still to be parsed, or an already built tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XhtmlInput {
    Markup(String),
    Tree(Vec<XmlChild>),
}

impl From<&str> for XhtmlInput {
    fn from(markup: &str) -> Self {
        XhtmlInput::Markup(markup.to_string())
    }
}

impl From<String> for XhtmlInput {
    fn from(markup: String) -> Self {
        XhtmlInput::Markup(markup)
    }
}

impl From<XmlNode> for XhtmlInput {
    fn from(node: XmlNode) -> Self {
        XhtmlInput::Tree(vec![XmlChild::Element(node)])
    }
}

impl From<Vec<XmlChild>> for XhtmlInput {
    fn from(children: Vec<XmlChild>) -> Self {
        XhtmlInput::Tree(children)
    }
}

pub fn massage_text(content: impl Into<String>) -> ContentNode {
    ContentNode::Text(content.into())
}

/// Wraps `content` as HTML. The string is stored verbatim; no validation.
pub fn massage_html(content: impl Into<String>) -> ContentNode {
    ContentNode::Html(content.into())
}

/// Builds XHTML content: markup is parsed, trees are used as given, and the
/// result is always wrapped in a `div` in the XHTML namespace.
///
/// # Errors
///
/// Returns [`ParseError`] when markup input is not a well-formed fragment.
pub fn massage_xhtml(content: impl Into<XhtmlInput>) -> Result<ContentNode, ParseError> {
    let children = match content.into() {
        XhtmlInput::Markup(markup) => parse_fragment(&markup)?,
        XhtmlInput::Tree(children) => children,
    };

    let mut div = XmlNode::new("div").with_attr("xmlns", XHTML_NS);
    div.children = children;
    Ok(ContentNode::Xhtml(div))
}

/// Author input, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorNode {
    /// Use the configured default name and email.
    Default,
    /// A full name; no email is emitted, even if a default email is configured.
    NameOnly(String),
    NameAndEmail(String, String),
    /// A complete `author` element, used verbatim.
    Raw(XmlNode),
}

impl From<&str> for AuthorNode {
    fn from(name: &str) -> Self {
        AuthorNode::NameOnly(name.to_string())
    }
}

impl From<String> for AuthorNode {
    fn from(name: String) -> Self {
        AuthorNode::NameOnly(name)
    }
}

impl<N: Into<String>, E: Into<String>> From<(N, E)> for AuthorNode {
    fn from((name, email): (N, E)) -> Self {
        AuthorNode::NameAndEmail(name.into(), email.into())
    }
}

impl From<XmlNode> for AuthorNode {
    fn from(node: XmlNode) -> Self {
        AuthorNode::Raw(node)
    }
}

/// Turns author input into an `author` element.
///
/// An absent author behaves like [`AuthorNode::Default`]: `name` from the
/// configuration, plus `email` when one is configured.
pub fn resolve_author(author: Option<AuthorNode>, defaults: &AuthorConfig) -> XmlNode {
    let element = XmlNode::new("author");
    match author.unwrap_or(AuthorNode::Default) {
        AuthorNode::Default => {
            let node = element.with_child(XmlNode::simple("name", defaults.name.as_str()));
            match &defaults.email {
                Some(email) => node.with_child(XmlNode::simple("email", email.as_str())),
                None => node,
            }
        }
        AuthorNode::NameOnly(name) => element.with_child(XmlNode::simple("name", name)),
        AuthorNode::NameAndEmail(name, email) => element
            .with_child(XmlNode::simple("name", name))
            .with_child(XmlNode::simple("email", email)),
        AuthorNode::Raw(node) => node,
    }
}
