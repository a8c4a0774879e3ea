//! Build Atom 1.0 feeds in memory and render them as well-formed XML.
//!
//! - [`feed`] - Feed/entry document model, content massaging, RSS view
//! - [`xml`] - Generic XML tree, fragment parser and serializer
//! - [`util`] - RFC3339 timestamps and tag-URI identifiers
//! - [`config`] - Default author configuration

pub mod config;
pub mod feed;
pub mod util;
pub mod xml;
