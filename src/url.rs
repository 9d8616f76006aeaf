//! URL helpers for the blog: building post URLs from a blog root and
//! rewriting links between posts inside rendered markdown.

use std::borrow::Cow;
use url::{ParseError, Url};

const MARKDOWN_EXTENSION: &str = ".md";

/// Returns `{blog_url}/post/{slug}`, percent-encoding the slug as a single
/// path segment. Returns `None` only if `blog_url` cannot be a base.
pub fn post_url(blog_url: &Url, slug: &str) -> Option<Url> {
    child_url(blog_url, &["post", slug])
}

/// Returns `{blog_url}/rss.xml`.
pub fn feed_url(blog_url: &Url) -> Option<Url> {
    child_url(blog_url, &["rss.xml"])
}

/// Returns the blog URL without its trailing slash, which is how it is
/// printed as a link.
pub fn display_url(blog_url: &Url) -> &str {
    blog_url.as_str().trim_end_matches('/')
}

fn child_url(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url)
}

/// Rewrites links found in post bodies. Posts live in one flat directory, so
/// a relative link to `some-post.md` (optionally with a query or fragment)
/// becomes the URL of the post with slug `some-post`. Absolute URLs and
/// links to anything else pass through untouched.
pub struct Converter<'a> {
    blog_url: &'a Url,
}

impl<'a> Converter<'a> {
    /// Constructs a new `Converter` rooted at `blog_url`.
    pub fn new(blog_url: &'a Url) -> Converter<'a> {
        Converter { blog_url }
    }

    pub fn convert<'b>(&self, link: &'b str) -> Cow<'b, str> {
        match Url::parse(link) {
            Err(ParseError::RelativeUrlWithoutBase) => {
                match self.convert_relative(link) {
                    Some(url) => Cow::Owned(url),
                    None => Cow::Borrowed(link),
                }
            }
            _ => Cow::Borrowed(link),
        }
    }

    fn convert_relative(&self, link: &str) -> Option<String> {
        let split = link.find(|c| c == '?' || c == '#').unwrap_or(link.len());
        let (path, suffix) = link.split_at(split);
        let file_name = path.rsplit('/').next()?;
        let slug = file_name.strip_suffix(MARKDOWN_EXTENSION)?;
        if slug.is_empty() {
            return None;
        }
        let url = post_url(self.blog_url, slug)?;
        Some(format!("{}{}", url, suffix))
    }
}
