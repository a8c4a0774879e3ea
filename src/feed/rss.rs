//! RSS 2.0 rendering of an Atom [`Feed`].
//!
//! The Atom document stays the source of truth; this module reads its fields
//! back and maps them onto the RSS `channel`/`item` vocabulary.

use std::io::Write;

use chrono::DateTime;

use super::document::{Entry, Feed, ATOM_NS};
use super::massage::ContentNode;
use crate::util::format_rfc822;
use crate::xml::{document_to_string, write_document, WriteError, XmlNode};

/// Media type advertised by an RSS self link.
pub const RSS_MEDIA_TYPE: &str = "application/rss+xml";

/// Builds the RSS 2.0 tree for `feed`.
///
/// `rss_self` is where the RSS document itself will be served; when given, an
/// `atom:link rel="self"` is added to the channel. Timestamps are re-parsed as
/// RFC3339 and rendered as RFC 822; a value that does not parse (because the
/// caller replaced it with free text) is passed through unchanged.
pub fn to_rss(feed: &Feed, rss_self: Option<&str>) -> Result<XmlNode, WriteError> {
    let fields = feed.fields();
    let title = feed.title().unwrap_or_default();
    let description = fields.text("subtitle").unwrap_or_else(|| title.clone());

    let mut channel = XmlNode::new("channel")
        .with_child(XmlNode::simple("title", title))
        .with_child(XmlNode::simple("link", feed.link().unwrap_or_default()))
        .with_child(XmlNode::simple("description", description));

    if let Some(href) = rss_self {
        channel = channel.with_child(
            XmlNode::new("atom:link")
                .with_attr("href", href)
                .with_attr("rel", "self")
                .with_attr("type", RSS_MEDIA_TYPE),
        );
    }
    if let Some(updated) = feed.updated() {
        channel = channel.with_child(XmlNode::simple("pubDate", rss_time(&updated)));
    }
    for entry in feed.entries() {
        channel = channel.with_child(item(entry)?);
    }

    Ok(XmlNode::new("rss")
        .with_attr("version", "2.0")
        .with_attr("xmlns:atom", ATOM_NS)
        .with_child(channel))
}

fn item(entry: &Entry) -> Result<XmlNode, WriteError> {
    let mut item = XmlNode::new("item")
        .with_child(XmlNode::simple("title", entry.title().unwrap_or_default()))
        .with_child(XmlNode::simple("link", entry.link().unwrap_or_default()))
        .with_child(
            XmlNode::simple("guid", entry.id().unwrap_or_default())
                .with_attr("isPermaLink", "false"),
        );

    if let Some(updated) = entry.updated() {
        item = item.with_child(XmlNode::simple("pubDate", rss_time(&updated)));
    }

    let fields = entry.fields();
    if let Some(body) = fields.get("content").or_else(|| fields.get("summary")) {
        let html = ContentNode::from_field(body).to_html()?;
        item = item.with_child(XmlNode::simple("description", html));
    }
    Ok(item)
}

fn rss_time(stamp: &str) -> String {
    match DateTime::parse_from_rfc3339(stamp) {
        Ok(time) => format_rfc822(&time),
        Err(e) => {
            tracing::warn!(
                stamp = %stamp,
                error = %e,
                "Timestamp is not RFC3339, copying verbatim"
            );
            stamp.to_string()
        }
    }
}

impl Feed {
    /// Writes the feed as an RSS 2.0 document to `sink`, handing the sink back.
    pub fn write_rss_to<W: Write>(&self, sink: W, rss_self: Option<&str>) -> Result<W, WriteError> {
        tracing::debug!(entries = self.entries().len(), "Writing RSS feed");
        write_document(sink, &to_rss(self, rss_self)?)
    }

    pub fn to_rss_string(&self, rss_self: Option<&str>) -> Result<String, WriteError> {
        document_to_string(&to_rss(self, rss_self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthorConfig;
    use crate::feed::{EntryOptions, FeedOptions};
    use crate::util::FixedClock;
    use chrono::FixedOffset;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn t(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn test_feed() -> Feed {
        Feed::create_with_clock(
            FeedOptions::new("My feed", "http://example.org"),
            &AuthorConfig::default(),
            Arc::new(FixedClock(t("2011-05-14T18:30:05+02:00"))),
        )
    }

    fn child_text(node: &XmlNode, tag: &str) -> Option<String> {
        node.child(tag).map(XmlNode::text)
    }

    #[test]
    fn test_channel_metadata() {
        let rss = to_rss(&test_feed(), Some("http://example.org/rss.xml")).unwrap();
        assert_eq!(rss.attr("version"), Some("2.0"));

        let channel = rss.child("channel").unwrap();
        assert_eq!(child_text(channel, "title").as_deref(), Some("My feed"));
        assert_eq!(child_text(channel, "link").as_deref(), Some("http://example.org"));
        assert_eq!(child_text(channel, "description").as_deref(), Some("My feed"));
        assert_eq!(
            child_text(channel, "pubDate").as_deref(),
            Some("Sat, 14 May 2011 18:30:05 +0200")
        );
        let self_link = channel.child("atom:link").unwrap();
        assert_eq!(self_link.attr("href"), Some("http://example.org/rss.xml"));
        assert_eq!(self_link.attr("type"), Some(RSS_MEDIA_TYPE));
    }

    #[test]
    fn test_subtitle_becomes_description() {
        let mut feed = test_feed();
        feed.set_subtitle("All about things");
        let rss = to_rss(&feed, None).unwrap();
        let channel = rss.child("channel").unwrap();
        assert_eq!(
            child_text(channel, "description").as_deref(),
            Some("All about things")
        );
        assert!(channel.child("atom:link").is_none());
    }

    #[test]
    fn test_items_follow_entries() {
        let mut feed = test_feed();
        feed.add_text_entry(EntryOptions::new("One", "http://example.org/1", "a < b"));
        feed.add_html_entry(EntryOptions::new("Two", "http://example.org/2", "<b>bold</b>"));
        feed.add_xhtml_entry(EntryOptions::new("Three", "http://example.org/3", "<p>Hi</p>"))
            .unwrap();

        let rss = to_rss(&feed, None).unwrap();
        let items: Vec<_> = rss
            .child("channel")
            .unwrap()
            .child_elements()
            .filter(|n| n.tag == "item")
            .collect();
        assert_eq!(items.len(), 3);

        let descriptions: Vec<_> = items
            .iter()
            .filter_map(|item| child_text(item, "description"))
            .collect();
        assert_eq!(descriptions, vec!["a &lt; b", "<b>bold</b>", "<p>Hi</p>"]);

        let guid = items[0].child("guid").unwrap();
        assert_eq!(guid.text(), "http://example.org/1");
        assert_eq!(guid.attr("isPermaLink"), Some("false"));
    }

    #[test]
    fn test_non_rfc3339_updated_passes_through() {
        let mut feed = test_feed();
        feed.set_singleton("updated", "sometime");
        let rss = to_rss(&feed, None).unwrap();
        assert_eq!(
            child_text(rss.child("channel").unwrap(), "pubDate").as_deref(),
            Some("sometime")
        );
    }

    #[test]
    fn test_rss_string_is_escaped_document() {
        let mut feed = test_feed();
        feed.add_html_entry(EntryOptions::new("h", "http://example.org/h", "<b>x</b>"));
        let out = feed.to_rss_string(None).unwrap();
        assert!(out.starts_with("<?xml"));
        assert!(out.contains("<description>&lt;b&gt;x&lt;/b&gt;</description>"));
    }
}
