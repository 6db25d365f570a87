//! Site configuration: a read-only value constructed once at startup and
//! passed by reference into every rendering call. Loaded from an optional
//! `reprise.yaml` in the project root; every field has a default, so a
//! project with no configuration file builds the reference site.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

const PROJECT_FILE: &str = "reprise.yaml";

/// The author identity rendered into every page and into feed metadata.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct Author {
    pub name: String,
    pub email: String,
    pub url: String,

    /// External links rendered in the site header, keyed by display label.
    /// A sorted map keeps the rendered order stable between runs.
    pub elsewhere: BTreeMap<String, String>,
}

impl Default for Author {
    fn default() -> Author {
        Author {
            name: "Ron DuPlain".to_owned(),
            email: "ron.duplain@gmail.com".to_owned(),
            url: "http://twitter.com/rduplain".to_owned(),
            elsewhere: vec![
                ("venue", "http://getopenspace.com/"),
                ("lunch", "http://www.ordertopia.com/shop/eppies"),
                (
                    "#beSwarm",
                    "http://search.twitter.com/search?q=%23beSwarm",
                ),
                (
                    "map",
                    "http://maps.google.com/maps?q=455+Second+Street+SE+Suite+100+Charlottesville+VA+22902",
                ),
            ]
            .into_iter()
            .map(|(label, url)| (label.to_owned(), url.to_owned()))
            .collect(),
        }
    }
}

/// The directory roles of a project: entry sources, the scratch build
/// directory, the live public directory, and static assets copied verbatim.
#[derive(Clone, Debug)]
pub struct Dirs {
    pub source: PathBuf,
    pub build: PathBuf,
    pub public: PathBuf,
    pub assets: PathBuf,
}

/// Process-wide site configuration. Never mutated after construction.
#[derive(Clone, Debug)]
pub struct Config {
    pub title: String,
    pub url: String,
    pub author: Author,
    pub analytics: String,
    pub dirs: Dirs,
}

/// The on-disk shape of `reprise.yaml`.
#[derive(Deserialize)]
#[serde(default)]
struct Project {
    title: String,
    url: String,
    author: Author,
    analytics: String,
}

impl Default for Project {
    fn default() -> Project {
        Project {
            title: "beSwarm: an open spaces style meetup in Charlottesville"
                .to_owned(),
            url: "http://beswarm.org".to_owned(),
            author: Author::default(),
            analytics: "UA-13059418-1".to_owned(),
        }
    }
}

impl Config {
    /// Builds the configuration for the project rooted at `root`, reading
    /// `reprise.yaml` when present and falling back to defaults otherwise.
    pub fn from_directory(root: &Path) -> Result<Config> {
        let path = root.join(PROJECT_FILE);
        let project = if path.exists() {
            serde_yaml::from_reader(File::open(&path)?)?
        } else {
            Project::default()
        };
        Ok(Config {
            title: project.title,
            url: project.url,
            author: project.author,
            analytics: project.analytics,
            dirs: Dirs {
                source: root.join("entries"),
                build: root.join("build"),
                public: root.join("public"),
                assets: root.join("assets"),
            },
        })
    }

    /// The canonical site URL without a trailing slash, for joining paths.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// The URL of an entry's detail page.
    pub fn entry_url(&self, slug: &str) -> String {
        format!("{}/{}", self.base_url(), slug)
    }

    /// The URL of the site-root Atom feed.
    pub fn index_feed_url(&self) -> String {
        format!("{}/index.atom", self.base_url())
    }

    /// The URL of a tag's Atom feed.
    pub fn tag_feed_url(&self, tag: &str) -> String {
        format!("{}/tags/{}.atom", self.base_url(), tag)
    }
}

/// Represents the result of a fallible configuration load.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error loading the project configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems opening the project file.
    Io(std::io::Error),

    /// Returned when the project file isn't valid YAML for the expected
    /// shape.
    Deserialize(serde_yaml::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Deserialize(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Deserialize(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator when opening the project file.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator when deserializing the project file.
    fn from(err: serde_yaml::Error) -> Error {
        Error::Deserialize(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_without_project_file() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let config = Config::from_directory(dir.path())?;
        assert_eq!("http://beswarm.org", config.url);
        assert_eq!("Ron DuPlain", config.author.name);
        assert_eq!(dir.path().join("entries"), config.dirs.source);
        assert_eq!(dir.path().join("public"), config.dirs.public);
        Ok(())
    }

    #[test]
    fn test_project_file_overrides_defaults() -> Result<()> {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PROJECT_FILE),
            "title: Example\nurl: https://example.org/\n",
        )
        .unwrap();
        let config = Config::from_directory(dir.path())?;
        assert_eq!("Example", config.title);
        assert_eq!("https://example.org/", config.url);
        // Unspecified fields keep their defaults.
        assert_eq!("Ron DuPlain", config.author.name);
        Ok(())
    }

    #[test]
    fn test_url_builders_normalize_trailing_slash() -> Result<()> {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(PROJECT_FILE),
            "url: https://example.org/\n",
        )
        .unwrap();
        let config = Config::from_directory(dir.path())?;
        assert_eq!("https://example.org/hello", config.entry_url("hello"));
        assert_eq!(
            "https://example.org/index.atom",
            config.index_feed_url()
        );
        assert_eq!(
            "https://example.org/tags/demo.atom",
            config.tag_feed_url("demo")
        );
        Ok(())
    }
}
