//! Support for creating the RSS 2.0 feed from a list of posts.

use crate::post::{parse_date, rfc1123, PostMetadata};
use crate::url::{display_url, feed_url, post_url};
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::Write;
use tracing::warn;
use url::Url;

/// The channel title.
pub const TITLE: &str = "Personal Knowledge Blog";

/// The channel description.
pub const DESCRIPTION: &str = "Personal knowledge blog and portfolio";

/// The channel language.
pub const LANGUAGE: &str = "en-us";

/// The default number of items in the feed.
pub const FEED_SIZE: usize = 20;

/// Bundled configuration for creating a feed.
pub struct FeedConfig<'a> {
    /// The blog's root URL, e.g. `https://example.com/Blog/`.
    pub blog_url: &'a Url,

    /// Reported as the channel's `lastBuildDate`.
    pub build_date: DateTime<Utc>,

    /// The most items the feed will hold.
    pub size: usize,
}

/// Creates the feed for `posts` and writes it to a [`std::io::Write`]. The
/// writer is flushed before returning so buffered write errors surface here.
pub fn write_feed<W: Write>(config: &FeedConfig, posts: &[PostMetadata], mut w: W) -> Result<()> {
    w.write_all(rss(config, posts)?.as_bytes())?;
    w.flush()?;
    Ok(())
}

/// Renders the feed for `posts` as an RSS 2.0 document. `posts` is expected
/// newest first; only the first [`FeedConfig::size`] are included, in the
/// order given. The output depends only on the arguments.
pub fn rss(config: &FeedConfig, posts: &[PostMetadata]) -> Result<String> {
    let blog = display_url(config.blog_url);
    let self_link = feed_url(config.blog_url).ok_or_else(|| Error::InvalidBlogUrl(config.blog_url.clone()))?;

    let items = posts
        .iter()
        .take(config.size)
        .map(|post| item(config.blog_url, post))
        .collect::<Result<Vec<String>>>()?;

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n");
    out.push_str("  <channel>\n");
    out.push_str(&format!("    <title>{}</title>\n", escape(TITLE)));
    out.push_str(&format!("    <link>{}</link>\n", escape(blog)));
    out.push_str(&format!("    <description>{}</description>\n", escape(DESCRIPTION)));
    out.push_str(&format!("    <language>{}</language>\n", LANGUAGE));
    out.push_str(&format!(
        "    <lastBuildDate>{}</lastBuildDate>\n",
        rfc1123(&config.build_date)
    ));
    out.push_str(&format!(
        "    <atom:link href=\"{}\" rel=\"self\" type=\"application/rss+xml\"/>\n",
        escape(self_link.as_str())
    ));
    if !items.is_empty() {
        out.push_str(&items.join("\n"));
        out.push('\n');
    }
    out.push_str("  </channel>\n");
    out.push_str("</rss>");
    Ok(out)
}

fn item(blog_url: &Url, post: &PostMetadata) -> Result<String> {
    let link = post_url(blog_url, &post.slug).ok_or_else(|| Error::InvalidBlogUrl(blog_url.clone()))?;
    let link = escape(link.as_str());

    let mut out = String::new();
    out.push_str("    <item>\n");
    out.push_str(&format!("      <title>{}</title>\n", escape(&post.title)));
    out.push_str(&format!("      <link>{}</link>\n", link));
    out.push_str(&format!("      <guid isPermaLink=\"true\">{}</guid>\n", link));
    match parse_date(&post.date) {
        Some(date) => out.push_str(&format!("      <pubDate>{}</pubDate>\n", rfc1123(&date))),
        None => warn!(slug = %post.slug, date = %post.date, "omitting pubDate for unparseable date"),
    }
    out.push_str(&format!("      <description>{}</description>\n", cdata(&post.excerpt)));
    out.push_str("    </item>");
    Ok(out)
}

/// Escapes text for an XML element. `&` goes first so the entities added
/// for `<` and `>` aren't escaped again.
pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Wraps text in a CDATA section. A `]]>` in the text would end the section
/// early, so it is split across two sections.
pub fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when post URLs can't be built under the blog URL (i.e., it
    /// cannot be a base URL).
    InvalidBlogUrl(Url),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::InvalidBlogUrl(url) => {
                write!(f, "can't build post URLs under `{}`", url)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::InvalidBlogUrl(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::post::WrittenBy;

    fn post(slug: &str, title: &str, date: &str, excerpt: &str) -> PostMetadata {
        PostMetadata {
            title: title.to_owned(),
            date: date.to_owned(),
            tags: Vec::new(),
            slug: slug.to_owned(),
            featured: false,
            excerpt: excerpt.to_owned(),
            reading_time: 1,
            written_by: WrittenBy::Human,
        }
    }

    fn config(blog_url: &Url) -> FeedConfig {
        FeedConfig {
            blog_url,
            build_date: parse_date("2024-05-01T12:00:00Z").unwrap(),
            size: FEED_SIZE,
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("A & B < C"), "A &amp; B &lt; C");
        assert_eq!(escape("&lt;"), "&amp;lt;");
        assert_eq!(escape("x > y"), "x &gt; y");
    }

    #[test]
    fn test_cdata() {
        assert_eq!(cdata("a < b"), "<![CDATA[a < b]]>");
        assert_eq!(cdata("x]]>y"), "<![CDATA[x]]]]><![CDATA[>y]]>");
    }

    #[test]
    fn test_rss() -> Result<()> {
        let blog = Url::parse("https://example.com/Blog/").unwrap();
        let posts = vec![post("a-b", "A & B < C", "2024-04-02", "Some <b>bold</b> text")];
        let wanted = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>Personal Knowledge Blog</title>
    <link>https://example.com/Blog</link>
    <description>Personal knowledge blog and portfolio</description>
    <language>en-us</language>
    <lastBuildDate>Wed, 01 May 2024 12:00:00 GMT</lastBuildDate>
    <atom:link href="https://example.com/Blog/rss.xml" rel="self" type="application/rss+xml"/>
    <item>
      <title>A &amp; B &lt; C</title>
      <link>https://example.com/Blog/post/a-b</link>
      <guid isPermaLink="true">https://example.com/Blog/post/a-b</guid>
      <pubDate>Tue, 02 Apr 2024 00:00:00 GMT</pubDate>
      <description><![CDATA[Some <b>bold</b> text]]></description>
    </item>
  </channel>
</rss>"#;
        assert_eq!(rss(&config(&blog), &posts)?, wanted);
        Ok(())
    }

    #[test]
    fn test_rss_limits_and_keeps_order() -> Result<()> {
        let blog = Url::parse("https://example.com/").unwrap();
        let posts: Vec<PostMetadata> = (0..25)
            .map(|i| post(&format!("p{}", i), "t", "2024-01-01", ""))
            .collect();
        let feed = rss(&config(&blog), &posts)?;
        assert_eq!(feed.matches("<item>").count(), FEED_SIZE);
        let first = feed.find("/post/p0<").unwrap();
        let second = feed.find("/post/p1<").unwrap();
        assert!(first < second);
        assert!(!feed.contains("/post/p20<"));
        Ok(())
    }

    #[test]
    fn test_rss_empty_and_undated() -> Result<()> {
        let blog = Url::parse("https://example.com/").unwrap();
        let empty = rss(&config(&blog), &[])?;
        assert!(!empty.contains("<item>"));
        assert!(empty.ends_with("/>\n  </channel>\n</rss>"));

        let undated = rss(&config(&blog), &[post("x", "x", "whenever", "")])?;
        assert!(undated.contains("<item>"));
        assert!(!undated.contains("<pubDate>"));
        Ok(())
    }

    #[test]
    fn test_rss_is_deterministic() -> Result<()> {
        let blog = Url::parse("https://example.com/").unwrap();
        let posts = vec![post("a", "a", "2024-01-01", "x"), post("b", "b", "2023-01-01", "y")];
        assert_eq!(rss(&config(&blog), &posts)?, rss(&config(&blog), &posts)?);
        Ok(())
    }

    #[test]
    fn test_write_feed() -> Result<()> {
        let blog = Url::parse("https://example.com/").unwrap();
        let mut buf: Vec<u8> = Vec::new();
        write_feed(&config(&blog), &[], &mut buf)?;
        assert!(String::from_utf8(buf).unwrap().starts_with("<?xml"));
        Ok(())
    }

    /// Accepts everything into its buffer and fails once asked to flush, as
    /// a full disk does behind a `BufWriter`.
    struct FailingFlush;

    impl Write for FailingFlush {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "device full"))
        }
    }

    #[test]
    fn test_write_feed_reports_flush_errors() {
        let blog = Url::parse("https://example.com/").unwrap();
        let result = write_feed(&config(&blog), &[], std::io::BufWriter::new(FailingFlush));
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_invalid_blog_url() {
        let blog = Url::parse("mailto:me@example.com").unwrap();
        assert!(rss(&config(&blog), &[]).is_err());
    }
}
