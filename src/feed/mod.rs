//! Atom feed document model and its renderings.
//!
//! This module provides the core functionality for building feeds:
//!
//! - **Document**: Feed and entry fields with in-place update and append
//! - **Massaging**: Typed content (text, HTML, XHTML) and author constructs
//! - **RSS**: An RSS 2.0 view of the same feed
//!
//! # Architecture
//!
//! The module is organized into three submodules:
//!
//! - [`document`] - [`Feed`], [`Entry`] and the [`FieldSet`] backing them
//! - [`massage`] - Content massager and author resolver
//! - [`rss`] - RSS 2.0 conversion
//!
//! # Example
//!
//! ```
//! use atomize::config::AuthorConfig;
//! use atomize::feed::{EntryOptions, Feed, FeedOptions};
//!
//! let mut feed = Feed::create(
//!     FeedOptions::new("My feed", "http://example.org"),
//!     &AuthorConfig::new("Jane Doe", None),
//! );
//! feed.add_text_entry(EntryOptions::new(
//!     "Hello world",
//!     "http://example.org/hello",
//!     "Hello the world!",
//! ));
//! let xml = feed.to_xml_string().unwrap();
//! assert!(xml.contains("<title>My feed</title>"));
//! ```

mod document;
mod massage;
mod rss;

pub use document::{
    Entry, EntryOptions, Feed, FeedOptions, FieldSet, FieldValue, Link, ATOM_MEDIA_TYPE, ATOM_NS,
};
pub use massage::{
    massage_html, massage_text, massage_xhtml, resolve_author, AuthorNode, ContentNode,
    XhtmlInput, XHTML_NS,
};
pub use rss::{to_rss, RSS_MEDIA_TYPE};
