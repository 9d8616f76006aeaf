//! Defines the [`Parser`] and [`Error`] types: the logic for loading posts
//! from the posts directory into memory. Two access patterns are supported,
//! the bulk listing ([`Parser::list_posts`]) used for index pages, search,
//! and the feed, and the by-slug fetch ([`Parser::fetch_post`]) used for a
//! single post.
//!
//! Frontmatter is deliberately forgiving: a missing or malformed field falls
//! back to its default rather than failing the post.

use std::{
    collections::HashSet,
    fmt,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde_yaml::Value;
use tracing::{debug, error};
use walkdir::WalkDir;

use crate::{
    markdown,
    post::{default_date, sort_posts, Post, PostMetadata, WrittenBy, DEFAULT_TITLE},
};

const MARKDOWN_EXTENSION: &str = "md";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// The flat directory holding one `{slug}.md` file per post.
    posts_directory: &'a Path,

    /// The timestamp given to posts without a `date`.
    now: DateTime<Utc>,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser over `posts_directory`. Posts without a date
    /// are dated at construction time.
    pub fn new(posts_directory: &'a Path) -> Parser<'a> {
        Parser::with_now(posts_directory, Utc::now())
    }

    /// Like [`Parser::new`], but with an explicit timestamp for undated
    /// posts.
    pub fn with_now(posts_directory: &'a Path, now: DateTime<Utc>) -> Parser<'a> {
        Parser {
            posts_directory,
            now,
        }
    }

    /// Returns the metadata for every post, newest first. This never fails:
    /// any problem loading the collection is logged and yields an empty
    /// list.
    pub fn list_posts(&self) -> Vec<PostMetadata> {
        match self.parse_posts() {
            Ok(posts) => posts,
            Err(err) => {
                error!(
                    directory = %self.posts_directory.display(),
                    error = %err,
                    "loading post list"
                );
                Vec::new()
            }
        }
    }

    /// Searches the posts directory for post files (extension = `.md`) and
    /// returns their metadata sorted by date (most recent first). Each post
    /// file may start with YAML frontmatter between `---` fences:
    ///
    /// ```md
    /// ---
    /// title: Hello, world!
    /// date: 2021-04-16
    /// tags: [greet]
    /// featured: true
    /// writtenBy: human
    /// ---
    /// # Hello
    ///
    /// World
    /// ```
    ///
    /// Only the top level of the directory is read, so each slug names
    /// exactly one file.
    pub fn parse_posts(&self) -> Result<Vec<PostMetadata>> {
        let mut posts = Vec::new();

        for result in WalkDir::new(self.posts_directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let entry = result?;
            if !entry.file_type().is_file() {
                continue;
            }
            let slug = match slug_for(entry.path()) {
                Some(slug) => slug,
                None => continue,
            };
            posts.push(self.parse_file(slug, entry.path())?.metadata);
        }

        sort_posts(&mut posts);
        debug!(count = posts.len(), "loaded post list");
        Ok(posts)
    }

    /// Fetches a single post by slug. Returns `None` if there is no such
    /// post, or if it couldn't be loaded (the failure is logged).
    pub fn fetch_post(&self, slug: &str) -> Option<Post> {
        match self.parse_post(slug) {
            Ok(post) => post,
            Err(err) => {
                error!(slug, error = %err, "fetching post");
                None
            }
        }
    }

    /// Fetches a single post by slug, keeping "not found" (`Ok(None)`)
    /// distinct from a load failure (`Err`). Slugs that could escape the
    /// posts directory are never found.
    pub fn parse_post(&self, slug: &str) -> Result<Option<Post>> {
        if !is_valid_slug(slug) {
            return Ok(None);
        }
        let path = self
            .posts_directory
            .join(format!("{}.{}", slug, MARKDOWN_EXTENSION));
        if !path.is_file() {
            return Ok(None);
        }
        self.parse_file(slug, &path).map(Some)
    }

    fn parse_file(&self, slug: &str, path: &Path) -> Result<Post> {
        let post = std::fs::read_to_string(path)
            .map_err(|err| Error::Io(path.to_owned(), err))
            .and_then(|contents| self.parse_document(slug, &contents));
        post.map_err(|e| {
            Error::Annotated(format!("parsing post `{}`", path.display()), Box::new(e))
        })
    }

    /// Parses a single [`Post`] from its slug and source text.
    pub fn parse_document(&self, slug: &str, input: &str) -> Result<Post> {
        let input = input.trim_start_matches('\u{feff}');
        let (yaml, body) = split_frontmatter(input)?;
        let frontmatter = match yaml {
            Some(yaml) => Frontmatter::from_yaml(yaml)?,
            None => Frontmatter::default(),
        };
        Ok(frontmatter.into_post(slug, body, &self.now))
    }
}

/// Returns the post slug for a path, i.e. the file name less its `.md`
/// extension, or `None` for anything that isn't a post file.
fn slug_for(path: &Path) -> Option<&str> {
    if path.extension()? != MARKDOWN_EXTENSION {
        return None;
    }
    path.file_stem()?.to_str()
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug != "."
        && slug != ".."
        && !slug.contains(|c| c == '/' || c == '\\' || c == '\0')
}

/// Splits a document into its frontmatter YAML (if any) and body. The
/// frontmatter is present only if the first line is exactly `---`; it runs
/// up to the next line that is exactly `---`.
fn split_frontmatter(input: &str) -> Result<(Option<&str>, &str)> {
    const FENCE: &str = "---";

    let first_end = input.find('\n').unwrap_or_else(|| input.len());
    if input[..first_end].trim_end() != FENCE {
        return Ok((None, input));
    }

    let yaml_start = (first_end + 1).min(input.len());
    let mut offset = yaml_start;
    for line in input[yaml_start..].split_inclusive('\n') {
        if line.trim_end() == FENCE {
            return Ok((
                Some(&input[yaml_start..offset]),
                &input[offset + line.len()..],
            ));
        }
        offset += line.len();
    }
    Err(Error::FrontmatterMissingEndFence)
}

/// The validated form of a post's frontmatter. Every field has a default and
/// values of the wrong shape are coerced or dropped, never rejected.
#[derive(Debug, Default, PartialEq)]
struct Frontmatter {
    title: Option<String>,
    date: Option<String>,
    tags: Vec<String>,
    featured: bool,
    written_by: WrittenBy,
}

impl Frontmatter {
    fn from_yaml(yaml: &str) -> Result<Frontmatter> {
        if yaml.trim().is_empty() {
            return Ok(Frontmatter::default());
        }
        let mapping = match serde_yaml::from_str::<Value>(yaml)? {
            Value::Mapping(mapping) => mapping,
            _ => return Ok(Frontmatter::default()),
        };
        let field = |name: &str| mapping.get(&Value::String(name.to_owned()));

        Ok(Frontmatter {
            title: field("title")
                .and_then(scalar_to_string)
                .filter(|title| !title.is_empty()),
            date: field("date")
                .and_then(scalar_to_string)
                .filter(|date| !date.trim().is_empty()),
            tags: field("tags").map(normalize_tags).unwrap_or_default(),
            featured: matches!(field("featured"), Some(Value::Bool(true))),
            written_by: match field("writtenBy") {
                Some(Value::String(s)) => WrittenBy::coerce(s),
                _ => WrittenBy::Human,
            },
        })
    }

    fn into_post(self, slug: &str, body: &str, now: &DateTime<Utc>) -> Post {
        Post {
            metadata: PostMetadata {
                title: self.title.unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
                date: self.date.unwrap_or_else(|| default_date(now)),
                tags: self.tags,
                slug: slug.to_owned(),
                featured: self.featured,
                excerpt: markdown::excerpt(body),
                reading_time: markdown::reading_time(body),
                written_by: self.written_by,
            },
            content: body.to_owned(),
        }
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Keeps the string entries of a tag sequence, trimmed, without empties or
/// repeats, in their original order. Anything but a sequence yields no tags.
fn normalize_tags(value: &Value) -> Vec<String> {
    let entries = match value {
        Value::Sequence(entries) => entries,
        _ => return Vec::new(),
    };
    let mut seen: HashSet<&str> = HashSet::new();
    let mut tags = Vec::new();
    for entry in entries {
        if let Value::String(tag) = entry {
            let tag = tag.trim();
            if !tag.is_empty() && seen.insert(tag) {
                tags.push(tag.to_owned());
            }
        }
    }
    tags
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading a [`Post`].
#[derive(Debug)]
pub enum Error {
    /// Returned when a post opens a frontmatter fence (`---`) but never
    /// closes it.
    FrontmatterMissingEndFence,

    /// Returned when the frontmatter isn't valid YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when a post file can't be read.
    Io(PathBuf, std::io::Error),

    /// Returned when the posts directory can't be walked.
    WalkDir(walkdir::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::Io(path, err) => {
                write!(f, "reading `{}`: {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::Io(_, err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator while walking the posts directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}
