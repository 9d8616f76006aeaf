//! The library code for the `kenning` blog engine. It reads a directory of
//! Markdown posts with YAML frontmatter and serves everything a blog front
//! end needs from them:
//!
//! 1. Loading posts from disk ([`crate::parser`]) into sorted
//!    [`crate::post::PostMetadata`] with derived excerpts and reading times
//! 2. Browsing the post list: search and tag filters ([`crate::search`]),
//!    pagination ([`crate::page`]), and both combined ([`crate::query`])
//! 3. The tag index: counts, topic categories, and prominence
//!    ([`crate::tag`])
//! 4. Build outputs: the RSS 2.0 feed ([`crate::feed`]) and the `posts.json`
//!    metadata index ([`crate::build`])
//!
//! Configuration is loaded from a `kenning.yaml` project file
//! ([`crate::config`]) and passed explicitly to anything that needs it.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod feed;
pub mod markdown;
pub mod page;
pub mod parser;
pub mod post;
pub mod query;
pub mod search;
pub mod tag;
pub mod url;
