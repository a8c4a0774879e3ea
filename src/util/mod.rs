//! Utility functions for timestamps and identifiers.
//!
//! This module provides reusable utilities for:
//!
//! - **Timestamps**: RFC3339 (Atom) and RFC 822 (RSS) formatting, plus the
//!   [`Clock`] used for "now" defaults
//! - **Identifiers**: Stable tag URIs derived from a link and a creation time
//! - **Text**: Removing characters XML 1.0 cannot carry
//!
//! # Examples
//!
//! ```
//! use atomize::util::{format_time, generate_id, Clock, SystemClock};
//!
//! let now = SystemClock.now();
//! let updated = format_time(&now);
//! let id = generate_id("https://example.com/posts/1", &now).unwrap();
//! assert!(id.starts_with("tag:example.com,"));
//! ```

mod tag_uri;
mod text;
mod time;

pub use tag_uri::{generate_id, IdError};
pub use text::{is_xml_char, strip_invalid_xml_chars};
pub use time::{format_rfc822, format_time, Clock, FixedClock, SystemClock};
