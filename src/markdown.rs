//! Markdown handling: rendering post bodies to HTML, and deriving the
//! plain-text excerpt and reading time shown in listings.

use crate::url::Converter as LinkConverter;
use once_cell::sync::Lazy;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};
use regex::Regex;
use url::Url;

/// Maximum number of characters in an excerpt, not counting the ellipsis.
pub const EXCERPT_LENGTH: usize = 200;

/// Reading speed used by [`reading_time`].
pub const WORDS_PER_MINUTE: usize = 200;

static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"#+\s").unwrap());
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`[^`]+`").unwrap());

/// Converts a post body to HTML.
pub fn to_html(blog_url: &Url, markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let converter = LinkConverter::new(blog_url);
    let events = Parser::new_ext(markdown, options).map(|ev| match ev {
        // Links between posts are written against source files (`foo.md`)
        // and need to point at the published post instead.
        Event::Start(Tag::Link(link_type, url, title)) => {
            let converted = converter.convert(&url).into_owned();
            Event::Start(Tag::Link(link_type, CowStr::from(converted), title))
        }
        _ => ev,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events);
    out
}

/// Derives a plain-text preview of a markdown body. Heading markers, link
/// targets, and inline code spans are stripped and newlines collapsed to
/// spaces. Text longer than [`EXCERPT_LENGTH`] characters is cut and gets a
/// trailing `...`.
pub fn excerpt(markdown: &str) -> String {
    let text = HEADING.replace_all(markdown, "");
    let text = LINK.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "");
    let text = text.replace('\n', " ");
    let text = text.trim();

    if text.chars().count() <= EXCERPT_LENGTH {
        return text.to_owned();
    }
    let truncated: String = text.chars().take(EXCERPT_LENGTH).collect();
    format!("{}...", truncated.trim())
}

/// Estimated minutes to read a markdown body, rounded up. An empty body
/// takes zero minutes.
pub fn reading_time(markdown: &str) -> usize {
    let words = markdown.split_whitespace().count();
    (words + WORDS_PER_MINUTE - 1) / WORDS_PER_MINUTE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_strips_markdown() {
        let body = "# Intro\n\nRead [the docs](https://docs.rs) and run `cargo doc`.\n## Next";
        assert_eq!(excerpt(body), "Intro  Read the docs and run . Next");
    }

    #[test]
    fn test_excerpt_short_passes_through() {
        assert_eq!(excerpt("Just a sentence."), "Just a sentence.");
        assert_eq!(excerpt(""), "");
    }

    #[test]
    fn test_excerpt_truncates() {
        let body = "word ".repeat(100);
        let got = excerpt(&body);
        assert!(got.ends_with("..."));
        let without_ellipsis = got.trim_end_matches("...");
        assert_eq!(without_ellipsis.chars().count(), 199);
        assert_eq!(without_ellipsis, body[..199].trim());
    }

    #[test]
    fn test_excerpt_counts_characters_not_bytes() {
        let body = "é".repeat(EXCERPT_LENGTH);
        assert_eq!(excerpt(&body), body);

        let longer = "é".repeat(EXCERPT_LENGTH + 1);
        assert_eq!(excerpt(&longer), format!("{}...", body));
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), 0);
        assert_eq!(reading_time("one"), 1);
        assert_eq!(reading_time(&"w ".repeat(200)), 1);
        assert_eq!(reading_time(&"w ".repeat(201)), 2);
    }

    #[test]
    fn test_to_html_rewrites_post_links() {
        let blog = Url::parse("https://example.com/Blog/").unwrap();
        let html = to_html(&blog, "See [the other post](other.md) or [Rust](https://rust-lang.org).");
        assert_eq!(
            html,
            "<p>See <a href=\"https://example.com/Blog/post/other\">the other post</a> \
             or <a href=\"https://rust-lang.org\">Rust</a>.</p>\n"
        );
    }

    #[test]
    fn test_to_html_tables() {
        let blog = Url::parse("https://example.com/").unwrap();
        let html = to_html(&blog, "| a |\n|---|\n| 1 |\n");
        assert!(html.contains("<table>"));
    }
}
