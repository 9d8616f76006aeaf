//! Project configuration. A project is a directory containing a
//! `kenning.yaml` file; paths in the file are relative to that directory.
//!
//! ```yaml
//! site_root: https://example.com/Blog/
//! posts_directory: public/posts   # default: posts
//! output_directory: public        # default: public
//! index_page_size: 10             # default: 10
//! feed_size: 20                   # default: 20
//! ```

use crate::feed::FEED_SIZE;
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use url::Url;

/// The name of the project file.
pub const PROJECT_FILE: &str = "kenning.yaml";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

#[derive(Deserialize)]
struct FeedSize(usize);
impl Default for FeedSize {
    fn default() -> Self {
        FeedSize(FEED_SIZE)
    }
}

fn default_posts_directory() -> PathBuf {
    PathBuf::from("posts")
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("public")
}

#[derive(Deserialize)]
struct Project {
    site_root: Url,

    #[serde(default = "default_posts_directory")]
    posts_directory: PathBuf,

    #[serde(default = "default_output_directory")]
    output_directory: PathBuf,

    #[serde(default)]
    index_page_size: PageSize,

    #[serde(default)]
    feed_size: FeedSize,
}

/// The resolved project configuration. This is passed explicitly to
/// everything that needs it.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// The blog's root URL. Post URLs are `{blog_url}/post/{slug}`.
    pub blog_url: Url,

    /// The directory holding the `{slug}.md` post files.
    pub posts_directory: PathBuf,

    /// The directory `rss.xml` and `posts.json` are written to.
    pub output_directory: PathBuf,

    /// Posts per listing page.
    pub index_page_size: usize,

    /// The most items in the RSS feed.
    pub feed_size: usize,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a project file and
    /// loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        for candidate in dir.ancestors() {
            let path = candidate.join(PROJECT_FILE);
            if path.is_file() {
                return Config::from_project_file(&path);
            }
        }
        Err(Error::NotFound(dir.to_owned()))
    }

    /// Loads the project file at `path`.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file)?;
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));
        Config::from_project(project, project_root)
    }

    fn from_project(project: Project, project_root: &Path) -> Result<Config> {
        if project.site_root.cannot_be_a_base() {
            return Err(Error::InvalidSiteRoot(project.site_root));
        }
        if project.index_page_size.0 == 0 {
            return Err(Error::ZeroPageSize);
        }
        Ok(Config {
            blog_url: project.site_root,
            posts_directory: project_root.join(project.posts_directory),
            output_directory: project_root.join(project.output_directory),
            index_page_size: project.index_page_size.0,
            feed_size: project.feed_size.0,
        })
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the project configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no project file exists in the directory or any of its
    /// ancestors.
    NotFound(PathBuf),

    /// Returned for I/O problems opening the project file.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when `site_root` can't have post URLs beneath it (e.g.
    /// `mailto:` URLs).
    InvalidSiteRoot(Url),

    /// Returned when `index_page_size` is zero.
    ZeroPageSize,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound(dir) => write!(
                f,
                "Could not find `{}` in `{}` or any parent directory",
                PROJECT_FILE,
                dir.display()
            ),
            Error::Open { path, err } => {
                write!(f, "Opening project file `{}`: {}", path.display(), err)
            }
            Error::DeserializeYaml(err) => {
                write!(f, "Loading configuration: {}", err)
            }
            Error::InvalidSiteRoot(url) => {
                write!(f, "`site_root` must be a base URL, got `{}`", url)
            }
            Error::ZeroPageSize => {
                write!(f, "`index_page_size` must be at least 1")
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Open { path: _, err } => Some(err),
            Error::DeserializeYaml(err) => Some(err),
            _ => None,
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

#[cfg(test)]
mod tests {
    use super::*;

    fn project(yaml: &str) -> Result<Config> {
        let project: Project = serde_yaml::from_str(yaml)?;
        Config::from_project(project, Path::new("/srv/blog"))
    }

    #[test]
    fn test_defaults() -> Result<()> {
        let config = project("site_root: https://example.com/Blog/\n")?;
        assert_eq!(config.blog_url.as_str(), "https://example.com/Blog/");
        assert_eq!(config.posts_directory, Path::new("/srv/blog/posts"));
        assert_eq!(config.output_directory, Path::new("/srv/blog/public"));
        assert_eq!(config.index_page_size, 10);
        assert_eq!(config.feed_size, FEED_SIZE);
        Ok(())
    }

    #[test]
    fn test_overrides() -> Result<()> {
        let config = project(
            "site_root: https://example.com/\n\
             posts_directory: content/posts\n\
             output_directory: dist\n\
             index_page_size: 6\n\
             feed_size: 5\n",
        )?;
        assert_eq!(config.posts_directory, Path::new("/srv/blog/content/posts"));
        assert_eq!(config.output_directory, Path::new("/srv/blog/dist"));
        assert_eq!(config.index_page_size, 6);
        assert_eq!(config.feed_size, 5);
        Ok(())
    }

    #[test]
    fn test_invalid() {
        assert!(project("posts_directory: posts\n").is_err());
        assert!(project("site_root: not a url\n").is_err());
        assert!(matches!(
            project("site_root: mailto:me@example.com\n"),
            Err(Error::InvalidSiteRoot(_))
        ));
        assert!(matches!(
            project("site_root: https://example.com/\nindex_page_size: 0\n"),
            Err(Error::ZeroPageSize)
        ));
    }

    #[test]
    fn test_from_directory() -> Result<()> {
        let config = Config::from_directory(Path::new("./testdata/project/nested"))?;
        assert_eq!(config.blog_url.as_str(), "https://example.com/Blog/");
        assert_eq!(
            config.posts_directory,
            Path::new("./testdata/project/../posts")
        );
        assert!(matches!(
            Config::from_directory(Path::new("/")),
            Err(Error::NotFound(_))
        ));
        Ok(())
    }
}
