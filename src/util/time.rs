use std::fmt::{self, Display};

use chrono::{DateTime, FixedOffset, Local, TimeZone};

/// Source of "now" for timestamps that the caller leaves unspecified.
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant, for reproducible output.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Formats `time` as an RFC3339 timestamp, `YYYY-MM-DDTHH:MM:SS+HH:MM`.
///
/// strftime's `%z` renders the offset as `+HHMM`, so the colon is spliced in
/// before the final two digits afterwards. The offset is always numeric, UTC
/// included (`+00:00`, never `Z`).
///
/// # Examples
///
/// ```
/// use atomize::util::format_time;
/// use chrono::DateTime;
///
/// let t = DateTime::parse_from_rfc3339("2011-05-14T18:30:00+02:00").unwrap();
/// assert_eq!(format_time(&t), "2011-05-14T18:30:00+02:00");
/// ```
pub fn format_time<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    let mut stamp = time.format("%Y-%m-%dT%H:%M:%S%z").to_string();
    let split = stamp.len().saturating_sub(2);
    stamp.insert(split, ':');
    stamp
}

/// Formats `time` the way RSS 2.0 `pubDate` expects (RFC 822/2822).
pub fn format_rfc822<Tz: TimeZone>(time: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    time.to_rfc2822()
}
