//! Exports the [`build_site`] function which stitches together the build-time
//! steps: loading the posts ([`crate::parser`]), writing the RSS feed
//! ([`crate::feed`]), and writing the `posts.json` metadata index that the
//! browser-side search and tag pages load.

use crate::config::Config;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::parser::Parser as PostParser;
use crate::post::PostMetadata;
use chrono::{DateTime, Utc};
use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// The feed file name within the output directory.
pub const FEED_FILE: &str = "rss.xml";

/// The metadata index file name within the output directory.
pub const INDEX_FILE: &str = "posts.json";

/// What a build produced.
#[derive(Debug, PartialEq)]
pub struct Summary {
    pub posts: usize,
    pub feed_items: usize,
    pub feed_path: PathBuf,
    pub index_path: PathBuf,
}

/// Builds the site outputs from a [`Config`]. A posts directory that can't be
/// loaded produces an empty feed and index rather than failing the build;
/// only problems writing the outputs are errors.
pub fn build_site(config: &Config, build_date: DateTime<Utc>) -> Result<Summary> {
    let posts = PostParser::with_now(&config.posts_directory, build_date).list_posts();
    info!(count = posts.len(), directory = %config.posts_directory.display(), "loaded posts");

    std::fs::create_dir_all(&config.output_directory).map_err(|err| Error::CreateDir {
        path: config.output_directory.clone(),
        err,
    })?;

    let feed_path = config.output_directory.join(FEED_FILE);
    write_feed(
        &FeedConfig {
            blog_url: &config.blog_url,
            build_date,
            size: config.feed_size,
        },
        &posts,
        BufWriter::new(create(&feed_path)?),
    )?;
    info!(path = %feed_path.display(), "wrote feed");

    let index_path = config.output_directory.join(INDEX_FILE);
    write_index(&posts, &index_path)?;
    info!(path = %index_path.display(), "wrote post index");

    Ok(Summary {
        posts: posts.len(),
        feed_items: posts.len().min(config.feed_size),
        feed_path,
        index_path,
    })
}

fn write_index(posts: &[PostMetadata], path: &Path) -> Result<()> {
    let mut w = BufWriter::new(create(path)?);
    serde_json::to_writer_pretty(&mut w, posts)?;
    w.flush()?;
    Ok(())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|err| Error::Create {
        path: path.to_owned(),
        err,
    })
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building the site outputs.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems creating the output directory.
    CreateDir { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems creating an output file.
    Create { path: PathBuf, err: std::io::Error },

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for errors serializing the post index.
    Json(serde_json::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CreateDir { path, err } => {
                write!(f, "Creating directory '{}': {}", path.display(), err)
            }
            Error::Create { path, err } => {
                write!(f, "Creating file '{}': {}", path.display(), err)
            }
            Error::Feed(err) => err.fmt(f),
            Error::Json(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::CreateDir { path: _, err } => Some(err),
            Error::Create { path: _, err } => Some(err),
            Error::Feed(err) => Some(err),
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<serde_json::Error> for Error {
    /// Converts [`serde_json::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}
