use std::io::Write;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset};

use super::massage::{
    massage_html, massage_text, massage_xhtml, resolve_author, AuthorNode, ContentNode,
    XhtmlInput,
};
use crate::config::AuthorConfig;
use crate::util::{format_time, Clock, SystemClock};
use crate::xml::{
    document_to_string, write_document, Attributes, ParseError, WriteError, XmlChild, XmlNode,
};

/// XML namespace for Atom feeds.
pub const ATOM_NS: &str = "http://www.w3.org/2005/Atom";

/// Media type advertised by a feed's self link.
pub const ATOM_MEDIA_TYPE: &str = "application/atom+xml";

// ============================================================================
// Fields
// ============================================================================

/// Attributes and children for a field element; the tag is supplied by the
/// field name it is stored under.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValue {
    pub attributes: Attributes,
    pub children: Vec<XmlChild>,
}

impl FieldValue {
    fn into_node(self, name: &str) -> XmlNode {
        XmlNode {
            tag: name.to_string(),
            attributes: self.attributes,
            children: self.children,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        text.to_string().into()
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self {
            attributes: Attributes::new(),
            children: vec![XmlChild::Text(text)],
        }
    }
}

impl From<ContentNode> for FieldValue {
    fn from(content: ContentNode) -> Self {
        let mut attributes = Attributes::new();
        if let Some(kind) = content.content_type() {
            attributes.set("type", kind);
        }
        let child = match content {
            ContentNode::Text(text) | ContentNode::Html(text) => XmlChild::Text(text),
            ContentNode::Xhtml(div) => XmlChild::Element(div),
        };
        Self {
            attributes,
            children: vec![child],
        }
    }
}

/// Takes the node's attributes and children; its tag is discarded.
impl From<XmlNode> for FieldValue {
    fn from(node: XmlNode) -> Self {
        Self {
            attributes: node.attributes,
            children: node.children,
        }
    }
}

impl From<Link> for FieldValue {
    fn from(link: Link) -> Self {
        let mut attributes = Attributes::new();
        attributes.set("href", link.href);
        if let Some(rel) = link.rel {
            attributes.set("rel", rel);
        }
        if let Some(media_type) = link.media_type {
            attributes.set("type", media_type);
        }
        Self {
            attributes,
            children: Vec::new(),
        }
    }
}

/// An Atom `link` element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub rel: Option<String>,
    pub media_type: Option<String>,
}

impl Link {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: None,
            media_type: None,
        }
    }

    /// The feed's own location: `rel="self"` with the Atom media type.
    pub fn self_ref(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            rel: Some("self".to_string()),
            media_type: Some(ATOM_MEDIA_TYPE.to_string()),
        }
    }
}

/// Ordered field elements of a feed or entry.
///
/// Two mutations exist: [`set_singleton`](Self::set_singleton) updates the
/// first field with a given name in place, or appends it, and
/// [`append_repeatable`](Self::append_repeatable) always appends. Field order
/// is insertion order and is preserved on output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet(Vec<XmlNode>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the attributes and children of field `name`, keeping its
    /// position, or appends a new field if there is none yet.
    pub fn set_singleton(&mut self, name: &str, value: impl Into<FieldValue>) -> &mut XmlNode {
        let value = value.into();
        match self.0.iter().position(|field| field.tag == name) {
            Some(index) => {
                let field = &mut self.0[index];
                field.attributes = value.attributes;
                field.children = value.children;
                field
            }
            None => self.push(value.into_node(name)),
        }
    }

    /// Appends a field even if one with the same name already exists.
    pub fn append_repeatable(&mut self, name: &str, value: impl Into<FieldValue>) -> &mut XmlNode {
        self.push(value.into().into_node(name))
    }

    fn push(&mut self, node: XmlNode) -> &mut XmlNode {
        let index = self.0.len();
        self.0.push(node);
        &mut self.0[index]
    }

    /// First field named `name`.
    pub fn get(&self, name: &str) -> Option<&XmlNode> {
        self.0.iter().find(|field| field.tag == name)
    }

    /// All fields named `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> + 'a {
        self.0.iter().filter(move |field| field.tag == name)
    }

    /// Direct text of the first field named `name`.
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(XmlNode::text)
    }

    pub fn iter(&self) -> impl Iterator<Item = &XmlNode> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ============================================================================
// Entry
// ============================================================================

/// Inputs for a new entry. `C` is the raw content type the chosen
/// `add_*_entry` method knows how to massage.
#[derive(Debug, Clone)]
pub struct EntryOptions<C> {
    pub title: String,
    pub link: String,
    pub content: C,
    pub summary: Option<C>,
    /// Defaults to the feed clock's current time.
    pub updated: Option<DateTime<FixedOffset>>,
    /// Defaults to `link`.
    pub id: Option<String>,
}

impl<C> EntryOptions<C> {
    pub fn new(title: impl Into<String>, link: impl Into<String>, content: impl Into<C>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            content: content.into(),
            summary: None,
            updated: None,
            id: None,
        }
    }

    pub fn summary(mut self, summary: impl Into<C>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn updated(mut self, updated: DateTime<FixedOffset>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    fn map<D>(self, mut f: impl FnMut(C) -> D) -> EntryOptions<D> {
        EntryOptions {
            title: self.title,
            link: self.link,
            content: f(self.content),
            summary: self.summary.map(&mut f),
            updated: self.updated,
            id: self.id,
        }
    }

    fn try_map<D, E>(self, mut f: impl FnMut(C) -> Result<D, E>) -> Result<EntryOptions<D>, E> {
        Ok(EntryOptions {
            title: self.title,
            link: self.link,
            content: f(self.content)?,
            summary: self.summary.map(&mut f).transpose()?,
            updated: self.updated,
            id: self.id,
        })
    }
}

/// One `entry` of a feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    fields: FieldSet,
}

impl Entry {
    /// Builds an entry with fields in Atom order: title, link, id, updated,
    /// summary (if any), content.
    fn build(options: EntryOptions<ContentNode>, now: DateTime<FixedOffset>) -> Self {
        let mut fields = FieldSet::new();
        fields.set_singleton("title", options.title);
        fields.set_singleton("link", Link::new(options.link.clone()));
        fields.set_singleton("id", options.id.unwrap_or(options.link));
        fields.set_singleton("updated", format_time(&options.updated.unwrap_or(now)));
        if let Some(summary) = options.summary {
            fields.set_singleton("summary", summary);
        }
        fields.set_singleton("content", options.content);
        Self { fields }
    }

    /// See [`FieldSet::set_singleton`].
    pub fn set_singleton(&mut self, name: &str, value: impl Into<FieldValue>) -> &mut XmlNode {
        self.fields.set_singleton(name, value)
    }

    /// See [`FieldSet::append_repeatable`].
    pub fn append_repeatable(&mut self, name: &str, value: impl Into<FieldValue>) -> &mut XmlNode {
        self.fields.append_repeatable(name, value)
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn title(&self) -> Option<String> {
        self.fields.text("title")
    }

    pub fn id(&self) -> Option<String> {
        self.fields.text("id")
    }

    pub fn link(&self) -> Option<&str> {
        self.fields.get("link").and_then(|link| link.attr("href"))
    }

    pub fn updated(&self) -> Option<String> {
        self.fields.text("updated")
    }

    pub fn to_node(&self) -> XmlNode {
        XmlNode {
            tag: "entry".to_string(),
            attributes: Attributes::new(),
            children: self.fields.iter().cloned().map(XmlChild::Element).collect(),
        }
    }
}

// ============================================================================
// Feed
// ============================================================================

/// Inputs for [`Feed::create`].
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub title: String,
    pub link: String,
    /// `None` falls back to the configured default author.
    pub author: Option<AuthorNode>,
    pub self_link: Option<String>,
    /// Defaults to the clock's current time.
    pub updated: Option<DateTime<FixedOffset>>,
    /// Defaults to `link`.
    pub id: Option<String>,
}

impl FeedOptions {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            author: None,
            self_link: None,
            updated: None,
            id: None,
        }
    }

    pub fn author(mut self, author: impl Into<AuthorNode>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn self_link(mut self, href: impl Into<String>) -> Self {
        self.self_link = Some(href.into());
        self
    }

    pub fn updated(mut self, updated: DateTime<FixedOffset>) -> Self {
        self.updated = Some(updated);
        self
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// An Atom feed under construction.
///
/// Created once with [`Feed::create`], then mutated in place: singleton fields
/// are updated with [`set_singleton`](Self::set_singleton) and entries are
/// appended with the `add_*_entry` methods. Required fields are not
/// validated; a feed missing them still renders, as incomplete Atom.
#[derive(Debug, Clone)]
pub struct Feed {
    fields: FieldSet,
    entries: Vec<Entry>,
    clock: Arc<dyn Clock>,
}

impl Feed {
    /// Creates a feed using the system clock for defaulted timestamps.
    pub fn create(options: FeedOptions, defaults: &AuthorConfig) -> Self {
        Self::create_with_clock(options, defaults, Arc::new(SystemClock))
    }

    /// Creates a feed whose defaulted timestamps come from `clock`.
    pub fn create_with_clock(
        options: FeedOptions,
        defaults: &AuthorConfig,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let updated = options.updated.unwrap_or_else(|| clock.now());

        let mut fields = FieldSet::new();
        fields.set_singleton("title", options.title.as_str());
        fields.set_singleton("link", Link::new(options.link.clone()));
        if let Some(href) = options.self_link {
            fields.append_repeatable("link", Link::self_ref(href));
        }
        fields.set_singleton("author", resolve_author(options.author, defaults));
        fields.set_singleton("updated", format_time(&updated));
        fields.set_singleton("id", options.id.unwrap_or(options.link));

        tracing::debug!(title = %options.title, "Created feed");
        Self {
            fields,
            entries: Vec::new(),
            clock,
        }
    }

    /// See [`FieldSet::set_singleton`].
    pub fn set_singleton(&mut self, name: &str, value: impl Into<FieldValue>) -> &mut XmlNode {
        self.fields.set_singleton(name, value)
    }

    /// See [`FieldSet::append_repeatable`].
    pub fn append_repeatable(&mut self, name: &str, value: impl Into<FieldValue>) -> &mut XmlNode {
        self.fields.append_repeatable(name, value)
    }

    pub fn set_subtitle(&mut self, subtitle: impl Into<String>) -> &mut XmlNode {
        self.fields.set_singleton("subtitle", subtitle.into())
    }

    /// Appends an entry whose content is already typed.
    pub fn add_entry(&mut self, options: EntryOptions<ContentNode>) -> &mut Entry {
        let entry = Entry::build(options, self.clock.now());
        self.entries.push(entry);
        let index = self.entries.len() - 1;
        tracing::debug!(entries = self.entries.len(), "Added entry");
        &mut self.entries[index]
    }

    /// Appends an entry with plain-text content and summary.
    pub fn add_text_entry(&mut self, options: EntryOptions<String>) -> &mut Entry {
        self.add_entry(options.map(massage_text))
    }

    /// Appends an entry with HTML content and summary.
    pub fn add_html_entry(&mut self, options: EntryOptions<String>) -> &mut Entry {
        self.add_entry(options.map(massage_html))
    }

    /// Appends an entry with XHTML content and summary.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] if markup input is malformed. The feed is left
    /// unchanged in that case.
    pub fn add_xhtml_entry(
        &mut self,
        options: EntryOptions<XhtmlInput>,
    ) -> Result<&mut Entry, ParseError> {
        let options = options.try_map(massage_xhtml)?;
        Ok(self.add_entry(options))
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [Entry] {
        &mut self.entries
    }

    pub fn title(&self) -> Option<String> {
        self.fields.text("title")
    }

    pub fn id(&self) -> Option<String> {
        self.fields.text("id")
    }

    /// The first (alternate) link's `href`.
    pub fn link(&self) -> Option<&str> {
        self.fields.get("link").and_then(|link| link.attr("href"))
    }

    pub fn updated(&self) -> Option<String> {
        self.fields.text("updated")
    }

    /// The whole document as a tree: `feed` in the Atom namespace holding the
    /// feed fields, then the entries in append order.
    pub fn to_node(&self) -> XmlNode {
        let fields = self.fields.iter().cloned().map(XmlChild::Element);
        let entries = self.entries.iter().map(|entry| XmlChild::Element(entry.to_node()));
        XmlNode {
            tag: "feed".to_string(),
            attributes: [("xmlns", ATOM_NS)].into_iter().collect(),
            children: fields.chain(entries).collect(),
        }
    }

    /// Writes the feed as an Atom document to `sink`, handing the sink back.
    pub fn write_to<W: Write>(&self, sink: W) -> Result<W, WriteError> {
        tracing::debug!(entries = self.entries.len(), "Writing Atom feed");
        write_document(sink, &self.to_node())
    }

    pub fn to_xml_string(&self) -> Result<String, WriteError> {
        document_to_string(&self.to_node())
    }
}
