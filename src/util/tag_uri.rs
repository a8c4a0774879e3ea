use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use thiserror::Error;
use url::Url;

/// Errors raised when a permanent link cannot anchor a tag URI.
#[derive(Error, Debug)]
pub enum IdError {
    /// The link string could not be parsed.
    #[error("Invalid link: {0}")]
    InvalidLink(#[from] url::ParseError),
    /// The link has no host to use as the tagging authority.
    #[error("Link has no host: {0}")]
    MissingHost(String),
}

/// Builds a stable RFC 4151 tag URI for a feed or entry.
///
/// The result has the shape `tag:<host>,<YYYY-MM-DD>:/<YYYYMMDDHHMMSS>`: the
/// host comes from `link` (scheme, port and path dropped) and both date parts
/// come from `created`, read in its own timezone. The function is pure, so the
/// same `(link, created)` pair always yields the same identifier. Keep
/// `created` fixed for a logical entry and its id survives link changes.
///
/// # Errors
///
/// Returns [`IdError`] if `link` does not parse as a URL or has no host.
///
/// # Examples
///
/// ```
/// use atomize::util::generate_id;
/// use chrono::DateTime;
///
/// let t = DateTime::parse_from_rfc3339("2011-05-14T18:30:05+02:00").unwrap();
/// let id = generate_id("http://example.org/blog/hello", &t).unwrap();
/// assert_eq!(id, "tag:example.org,2011-05-14:/20110514183005");
/// ```
pub fn generate_id<Tz: TimeZone>(link: &str, created: &DateTime<Tz>) -> Result<String, IdError>
where
    Tz::Offset: Display,
{
    let url = Url::parse(link)?;
    let host = url
        .host_str()
        .ok_or_else(|| IdError::MissingHost(link.to_owned()))?;

    Ok(format!(
        "tag:{},{}:/{}",
        host,
        created.format("%Y-%m-%d"),
        created.format("%Y%m%d%H%M%S")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use proptest::prelude::*;

    fn t(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_strips_scheme_port_and_path() {
        let link = "https://Blog.Example.com:8443/2011/05/post?x=1";
        let id = generate_id(link, &t("2011-05-14T08:00:00+00:00")).unwrap();
        assert_eq!(id, "tag:blog.example.com,2011-05-14:/20110514080000");
    }

    #[test]
    fn test_uses_timezone_of_creation_time() {
        // 23:30 UTC on the 13th is already the 14th at +02:00
        let utc = Utc.with_ymd_and_hms(2011, 5, 13, 23, 30, 0).unwrap();
        let local = utc.with_timezone(&FixedOffset::east_opt(2 * 3600).unwrap());
        assert_eq!(
            generate_id("http://example.org", &utc).unwrap(),
            "tag:example.org,2011-05-13:/20110513233000"
        );
        assert_eq!(
            generate_id("http://example.org", &local).unwrap(),
            "tag:example.org,2011-05-14:/20110514013000"
        );
    }

    #[test]
    fn test_deterministic() {
        let when = t("2020-01-01T00:00:00+01:00");
        assert_eq!(
            generate_id("http://example.org/a", &when).unwrap(),
            generate_id("http://example.org/a", &when).unwrap()
        );
    }

    #[test]
    fn test_link_path_does_not_change_id() {
        let when = t("2020-01-01T00:00:00+01:00");
        assert_eq!(
            generate_id("http://example.org/old-slug", &when).unwrap(),
            generate_id("http://example.org/new-slug", &when).unwrap()
        );
    }

    #[test]
    fn test_invalid_link_rejected() {
        let when = t("2020-01-01T00:00:00+00:00");
        assert!(matches!(
            generate_id("not a url", &when),
            Err(IdError::InvalidLink(_))
        ));
    }

    #[test]
    fn test_hostless_link_rejected() {
        let when = t("2020-01-01T00:00:00+00:00");
        assert!(matches!(
            generate_id("mailto:jane@example.org", &when),
            Err(IdError::MissingHost(_))
        ));
    }

    proptest! {
        #[test]
        fn test_distinct_inputs_give_distinct_ids(
            a in 0i64..4_102_444_800,
            b in 0i64..4_102_444_800,
            host_a in "[a-z]{1,12}",
            host_b in "[a-z]{1,12}",
        ) {
            let ta = Utc.timestamp_opt(a, 0).unwrap();
            let tb = Utc.timestamp_opt(b, 0).unwrap();
            let id_a = generate_id(&format!("http://{host_a}.example/x"), &ta).unwrap();
            let id_b = generate_id(&format!("http://{host_b}.example/x"), &tb).unwrap();
            prop_assert_eq!(id_a == id_b, a == b && host_a == host_b);
        }
    }
}
