//! Renders every view of the site into the build directory: the full index,
//! one filtered index per tag, one detail page per entry, the 404 page, and
//! the combined stylesheet. Template evaluation is delegated to an embedded
//! template set; this module owns which template each view uses, which
//! context fields are handed to it, and the output path each view lands at.

use std::collections::BTreeSet;
use std::fmt;
use std::fs;

use serde::Serialize;
use tera::Tera;
use tracing::debug;

use crate::config::{Author, Config};
use crate::entry::Entry;
use crate::feed;
use crate::markdown;

const SITE_STYLE: &str = include_str!("../templates/style.css");

/// Responsible for templating the site's views and writing them to the
/// build directory.
pub struct Renderer<'a> {
    templates: Tera,
    config: &'a Config,
}

impl<'a> Renderer<'a> {
    /// Parses the embedded template set and constructs a renderer over it.
    pub fn new(config: &'a Config) -> Result<Renderer<'a>> {
        let mut templates = Tera::default();
        templates.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("_entry.html", include_str!("../templates/_entry.html")),
            ("list.html", include_str!("../templates/list.html")),
            ("detail.html", include_str!("../templates/detail.html")),
            ("404.html", include_str!("../templates/404.html")),
        ])?;
        Ok(Renderer { templates, config })
    }

    /// Renders the full entry list and the site-root feed, writing
    /// `index.html` and `index.atom`.
    pub fn generate_index(&self, entries: &[Entry]) -> Result<()> {
        let feed_url = self.config.index_feed_url();
        let html = self.render(
            "list.html",
            &ListContext {
                author: &self.config.author,
                body_title: &self.config.title,
                head_title: self.config.title.clone(),
                analytics: &self.config.analytics,
                entries,
                active_tag: "",
                feed_url: &feed_url,
            },
        )?;
        self.write("index.html", &html)?;

        let atom = feed::generate_atom(self.config, entries, &feed_url)?;
        self.write("index.atom", &atom)
    }

    /// Renders one filtered index and feed per distinct tag, writing
    /// `tags/<tag>.html` and `tags/<tag>.atom`. Tags are visited in sorted
    /// order so repeated runs produce identical output.
    pub fn generate_tag_indices(&self, entries: &[Entry]) -> Result<()> {
        for tag in distinct_tags(entries) {
            let tag_entries: Vec<Entry> = entries
                .iter()
                .filter(|entry| entry.tags.iter().any(|t| t == tag))
                .cloned()
                .collect();
            let feed_url = self.config.tag_feed_url(tag);
            let html = self.render(
                "list.html",
                &ListContext {
                    author: &self.config.author,
                    body_title: &self.config.title,
                    head_title: format!("{}: {}", self.config.title, tag),
                    analytics: &self.config.analytics,
                    entries: &tag_entries,
                    active_tag: tag,
                    feed_url: &feed_url,
                },
            )?;
            self.write(&format!("tags/{}.html", tag), &html)?;

            let atom =
                feed::generate_atom(self.config, &tag_entries, &feed_url)?;
            self.write(&format!("tags/{}.atom", tag), &atom)?;
        }
        Ok(())
    }

    /// Renders one detail page per entry, writing `<slug>.html`. Detail
    /// pages always show the full entry content.
    pub fn generate_details(&self, entries: &[Entry]) -> Result<()> {
        let feed_url = self.config.index_feed_url();
        for entry in entries {
            let html = self.render(
                "detail.html",
                &DetailContext {
                    author: &self.config.author,
                    body_title: &self.config.title,
                    head_title: format!(
                        "{}: {}",
                        self.config.title, entry.title
                    ),
                    analytics: &self.config.analytics,
                    entry,
                    active_tag: "",
                    feed_url: &feed_url,
                },
            )?;
            self.write(&format!("{}.html", entry.slug), &html)?;
        }
        Ok(())
    }

    /// Renders the static not-found page, writing `404.html`.
    pub fn generate_not_found(&self) -> Result<()> {
        let feed_url = self.config.index_feed_url();
        let html = self.render(
            "404.html",
            &NotFoundContext {
                author: &self.config.author,
                body_title: &self.config.title,
                head_title: &self.config.title,
                analytics: &self.config.analytics,
                feed_url: &feed_url,
            },
        )?;
        self.write("404.html", &html)
    }

    /// Writes `style.css`: the site stylesheet followed by the generated
    /// syntax-highlighting rules.
    pub fn generate_style(&self) -> Result<()> {
        let highlight = markdown::highlight_css()?;
        self.write("style.css", &format!("{}\n\n{}", SITE_STYLE, highlight))
    }

    fn render<C: Serialize>(&self, template: &str, context: &C) -> Result<String> {
        Ok(self
            .templates
            .render(template, &tera::Context::from_serialize(context)?)?)
    }

    fn write(&self, relative: &str, contents: &str) -> Result<()> {
        let path = self.config.dirs.build.join(relative);
        debug!("writing {}", path.display());
        fs::write(path, contents)?;
        Ok(())
    }
}

/// The distinct tags across all entries, sorted.
fn distinct_tags(entries: &[Entry]) -> BTreeSet<&str> {
    entries
        .iter()
        .flat_map(|entry| entry.tags.iter().map(String::as_str))
        .collect()
}

/// Template context for the index and tag-index views. `active_tag` is
/// empty on the site index.
#[derive(Serialize)]
struct ListContext<'a> {
    author: &'a Author,
    body_title: &'a str,
    head_title: String,
    analytics: &'a str,
    entries: &'a [Entry],
    active_tag: &'a str,
    feed_url: &'a str,
}

/// Template context for a single entry's detail view.
#[derive(Serialize)]
struct DetailContext<'a> {
    author: &'a Author,
    body_title: &'a str,
    head_title: String,
    analytics: &'a str,
    entry: &'a Entry,
    active_tag: &'a str,
    feed_url: &'a str,
}

/// Template context for the not-found view. It carries no entry data; the
/// advertised feed is the site-root feed.
#[derive(Serialize)]
struct NotFoundContext<'a> {
    author: &'a Author,
    body_title: &'a str,
    head_title: &'a str,
    analytics: &'a str,
    feed_url: &'a str,
}

/// Represents the result of a fallible rendering operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error rendering the site's views.
#[derive(Debug)]
pub enum Error {
    /// An error parsing or evaluating a template.
    Template(tera::Error),

    /// An error building a feed for one of the index views.
    Feed(feed::Error),

    /// An error generating the syntax-highlighting stylesheet.
    Highlight(syntect::Error),

    /// An error writing the output files.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::Highlight(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Feed(err) => Some(err),
            Error::Highlight(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<tera::Error> for Error {
    /// Converts [`tera::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator for fallible template operations.
    fn from(err: tera::Error) -> Error {
        Error::Template(err)
    }
}

impl From<feed::Error> for Error {
    /// Converts [`feed::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator when generating index feeds.
    fn from(err: feed::Error) -> Error {
        Error::Feed(err)
    }
}

impl From<syntect::Error> for Error {
    /// Converts [`syntect::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator when generating highlight styles.
    fn from(err: syntect::Error) -> Error {
        Error::Highlight(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator for fallible I/O operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
