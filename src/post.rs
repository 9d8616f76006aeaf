//! Defines the [`PostMetadata`] and [`Post`] types, plus the date helpers
//! used to order and display them. Posts are immutable once loaded; see
//! [`crate::parser`] for how they are read from disk.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use serde::Serialize;
use std::fmt;
use url::Url;

use crate::markdown;

/// The title given to posts whose frontmatter has no usable `title`.
pub const DEFAULT_TITLE: &str = "Untitled";

/// Who wrote a post. Anything other than `ai` in the frontmatter is treated
/// as [`WrittenBy::Human`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WrittenBy {
    Human,
    Ai,
}

impl Default for WrittenBy {
    fn default() -> Self {
        WrittenBy::Human
    }
}

impl WrittenBy {
    /// Interprets a raw frontmatter value, ignoring case and surrounding
    /// whitespace.
    pub fn coerce(raw: &str) -> WrittenBy {
        match raw.trim().to_lowercase().as_str() {
            "ai" => WrittenBy::Ai,
            _ => WrittenBy::Human,
        }
    }
}

impl fmt::Display for WrittenBy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            WrittenBy::Human => write!(f, "human"),
            WrittenBy::Ai => write!(f, "ai"),
        }
    }
}

/// The listing-level view of a post. This is what index pages, search, the
/// tag index, and the feed operate on; it never carries the post body.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMetadata {
    /// The post title, [`DEFAULT_TITLE`] if the frontmatter has none.
    pub title: String,

    /// The post date as written in the frontmatter (ISO-8601 by
    /// convention). Only used for ordering and display.
    pub date: String,

    /// Trimmed, deduplicated tags in frontmatter order. Case-sensitive.
    pub tags: Vec<String>,

    /// The source file name less its `.md` extension.
    pub slug: String,

    pub featured: bool,

    /// Plain-text preview of the body. See [`markdown::excerpt`].
    pub excerpt: String,

    /// Estimated reading time in minutes. See [`markdown::reading_time`].
    pub reading_time: usize,

    pub written_by: WrittenBy,
}

impl PostMetadata {
    /// Returns the parsed post date, or `None` if the date isn't a
    /// recognizable ISO-8601 date.
    pub fn published(&self) -> Option<DateTime<Utc>> {
        parse_date(&self.date)
    }

    /// Returns true if the post carries exactly `tag`.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A full post: metadata plus the raw markdown body. Returned by
/// single-post fetches.
#[derive(Clone, Debug, PartialEq)]
pub struct Post {
    pub metadata: PostMetadata,
    pub content: String,
}

impl Post {
    /// Renders the body to HTML. Relative links to other `.md` posts are
    /// rewritten to their post URLs under `blog_url`.
    pub fn to_html(&self, blog_url: &Url) -> String {
        markdown::to_html(blog_url, &self.content)
    }
}

/// Sorts posts newest first. Posts with unparseable dates sink to the end;
/// ties keep their existing order.
pub fn sort_posts(posts: &mut [PostMetadata]) {
    posts.sort_by_key(|p| std::cmp::Reverse(p.published()));
}

/// Parses the date formats that show up in frontmatter: full RFC 3339
/// timestamps, zone-less timestamps (read as UTC), and bare dates (midnight
/// UTC).
pub fn parse_date(date: &str) -> Option<DateTime<Utc>> {
    let date = date.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(date) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(date, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// Formats a post date for display, e.g. `January 15, 2024`. Unparseable
/// dates are returned as-is.
pub fn format_date(date: &str) -> String {
    match parse_date(date) {
        Some(dt) => dt.format("%B %-d, %Y").to_string(),
        None => date.to_owned(),
    }
}

/// Formats a timestamp the way RSS expects it, e.g.
/// `Mon, 15 Jan 2024 00:00:00 GMT`.
pub fn rfc1123(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// The frontmatter date assigned to posts without one.
pub fn default_date(now: &DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}
