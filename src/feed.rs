//! Support for creating Atom feeds from a list of entries.

use crate::config::Config;
use crate::date::local_midnight;
use crate::entry::Entry;
use atom_syndication::{
    Content, Entry as AtomEntry, Error as AtomError, Feed, Link, Person,
    WriteConfig,
};
use chrono::NaiveDate;
use std::fmt;
use url::Url;

/// The date used in the feed-level tag URI, where no entry date applies.
const FEED_EPOCH: (i32, u32, u32) = (2009, 3, 4);

/// Creates an Atom document from the site configuration and a list of
/// entries, pretty-printed with the Atom namespace declared at the feed
/// root. Entries are assumed to be pre-sorted newest-first; this function
/// does not re-sort them. An empty list produces a well-formed feed whose
/// `updated` element carries the feed epoch date.
pub fn generate_atom(
    config: &Config,
    entries: &[Entry],
    feed_url: &str,
) -> Result<String> {
    let buffer = feed(config, entries, feed_url)?.write_with_config(
        Vec::new(),
        WriteConfig {
            write_document_declaration: true,
            indent_size: Some(2),
        },
    )?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn feed(config: &Config, entries: &[Entry], feed_url: &str) -> Result<Feed> {
    let domain = domain(config)?;
    let updated = match entries.first() {
        Some(newest) => newest.date.stamp,
        None => local_midnight(feed_epoch()),
    };
    Ok(Feed {
        entries: feed_entries(config, &domain, entries),
        title: config.title.clone().into(),
        id: feed_id(&domain),
        updated,
        authors: vec![Person {
            name: config.author.name.clone(),
            email: None,
            uri: None,
            extensions: Default::default(),
        }],
        categories: Vec::new(),
        contributors: Vec::new(),
        generator: None,
        icon: None,
        logo: None,
        rights: None,
        subtitle: None,
        extensions: Default::default(),
        namespaces: Default::default(),
        base: None,
        lang: None,
        links: vec![
            Link {
                href: config.base_url().to_owned(),
                rel: "alternate".to_owned(),
                title: None,
                hreflang: None,
                mime_type: None,
                length: None,
            },
            Link {
                href: feed_url.to_owned(),
                rel: "self".to_owned(),
                title: None,
                hreflang: None,
                mime_type: None,
                length: None,
            },
        ],
    })
}

fn feed_entries(
    config: &Config,
    domain: &str,
    entries: &[Entry],
) -> Vec<AtomEntry> {
    entries
        .iter()
        .map(|entry| AtomEntry {
            id: entry_id(domain, entry),
            title: entry.title.clone().into(),
            updated: entry.date.stamp,
            authors: Vec::new(),
            links: vec![Link {
                href: config.entry_url(&entry.slug),
                rel: "alternate".to_owned(),
                title: None,
                hreflang: None,
                mime_type: None,
                length: None,
            }],
            rights: None,
            summary: None,
            categories: Vec::new(),
            contributors: Vec::new(),
            published: None,
            source: None,
            content: Some(Content {
                base: None,
                lang: None,
                value: Some(entry.content_html.clone()),
                src: None,
                content_type: Some("html".to_owned()),
            }),
            extensions: Default::default(),
            namespaces: Default::default(),
        })
        .collect()
}

/// The feed-level id in the tag URI scheme, keyed by the site's domain and
/// the feed epoch date.
fn feed_id(domain: &str) -> String {
    let (year, month, day) = FEED_EPOCH;
    format!("tag:{},{:04}-{:02}-{:02}:/", domain, year, month, day)
}

/// An entry id in the tag URI scheme, keyed by the site's domain and the
/// entry's display date.
fn entry_id(domain: &str, entry: &Entry) -> String {
    format!("tag:{},{}:/{}", domain, entry.date.display, entry.slug)
}

fn domain(config: &Config) -> Result<String> {
    Url::parse(&config.url)?
        .host_str()
        .map(str::to_owned)
        .ok_or_else(|| Error::MissingDomain(config.url.clone()))
}

fn feed_epoch() -> NaiveDate {
    let (year, month, day) = FEED_EPOCH;
    NaiveDate::from_ymd_opt(year, month, day).unwrap() // always valid
}

/// Represents the result of a fallible feed operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when the configured site URL can't be parsed.
    UrlParse(url::ParseError),

    /// Returned when the configured site URL has no host to key tag URIs
    /// by.
    MissingDomain(String),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Atom(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
            Error::MissingDomain(url) => {
                write!(f, "site URL `{}` has no domain", url)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Atom(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::MissingDomain(_) => None,
        }
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts [`url::ParseError`]s into [`Error`]. This allows us to use
    /// the `?` operator in fallible feed operations.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}
