//! Defines the [`Entry`] type and the logic for parsing entries from the
//! source directory into memory. An entry's source file must be named
//! `YYYY.MM.DD.Title.With.Dots`; the file itself is a block of `Key: value`
//! header lines terminated by a blank line, followed by a Markdown body.
//! File names that don't match the pattern are skipped as a normal filter
//! outcome, never an error.

use std::collections::HashSet;
use std::fmt;
use std::fs::{read_dir, read_to_string};
use std::path::Path;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::date::EntryDate;
use crate::markdown;
use crate::slug::slugify;

static FILE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})\.(\d{2})\.(\d{2})\.(.+)$").unwrap());

const TAGS_HEADER: &str = "Tags";

/// One blog entry. Constructed once per run from a source file and read-only
/// from then on.
#[derive(Clone, Debug, Serialize)]
pub struct Entry {
    /// URL path segment derived from the title. Unique across all entries;
    /// a collision aborts the run.
    pub slug: String,

    /// Display title: the file name's title segment with periods replaced
    /// by spaces.
    pub title: String,

    /// Whitespace-split value of the `Tags` header field, in file order.
    /// Empty when the field is absent.
    pub tags: Vec<String>,

    /// Derived forms of the file name's calendar date.
    pub date: EntryDate,

    /// The body converted to HTML, with smart punctuation applied.
    pub content_html: String,
}

/// The pieces of a dated-entry file name: the date digits and the raw title
/// segment.
struct FileNameMeta {
    year: i32,
    month: u32,
    day: u32,
    title: String,
}

/// Matches `file_name` against the `YYYY.MM.DD.title` pattern. A non-match
/// is a normal outcome, not an error.
fn parse_file_name(file_name: &str) -> Option<FileNameMeta> {
    let captures = FILE_NAME_PATTERN.captures(file_name)?;
    Some(FileNameMeta {
        year: captures[1].parse().ok()?,
        month: captures[2].parse().ok()?,
        day: captures[3].parse().ok()?,
        title: captures[4].to_owned(),
    })
}

/// Splits a source document into its header fields and body: `Key: value`
/// lines are consumed until a blank line, and everything after the blank
/// line is the body, returned verbatim.
fn parse_document(contents: &str) -> Result<(Vec<(String, String)>, &str)> {
    let mut headers = Vec::new();
    let mut rest = contents;
    while !rest.is_empty() {
        let (line, remainder) = match rest.split_once('\n') {
            Some(pair) => pair,
            None => (rest, ""),
        };
        if line.trim().is_empty() {
            rest = remainder;
            break;
        }
        match line.split_once(':') {
            Some((key, value)) => {
                headers.push((key.trim().to_owned(), value.trim().to_owned()));
            }
            None => return Err(Error::MalformedHeader(line.to_owned())),
        }
        rest = remainder;
    }
    Ok((headers, rest))
}

fn parse_entry(path: &Path, meta: FileNameMeta) -> Result<Entry> {
    let date = NaiveDate::from_ymd_opt(meta.year, meta.month, meta.day)
        .ok_or(Error::InvalidDate {
            year: meta.year,
            month: meta.month,
            day: meta.day,
        })?;

    let contents = read_to_string(path)?;
    let (headers, body) = parse_document(&contents)?;
    let tags = headers
        .iter()
        .find(|(key, _)| key == TAGS_HEADER)
        .map(|(_, value)| {
            value.split_whitespace().map(str::to_owned).collect()
        })
        .unwrap_or_default();

    let title = meta.title.replace('.', " ");
    Ok(Entry {
        slug: slugify(&title),
        title,
        tags,
        date: EntryDate::from_naive(date),
        content_html: markdown::to_html(body),
    })
}

/// Scans `source_dir` for dated-entry files and returns the parsed entries
/// newest-first. File names are sorted in reverse lexical order, which the
/// zero-padded `YYYY.MM.DD` prefix makes equivalent to reverse chronological
/// order. Any I/O or parse error aborts the scan.
pub fn read_and_parse_entries(source_dir: &Path) -> Result<Vec<Entry>> {
    let mut file_names = Vec::new();
    for result in read_dir(source_dir)? {
        let entry = result?;
        file_names.push(entry.file_name().to_string_lossy().into_owned());
    }
    file_names.sort_by(|a, b| b.cmp(a));

    let mut entries = Vec::new();
    let mut seen_slugs = HashSet::new();
    for file_name in file_names {
        let meta = match parse_file_name(&file_name) {
            Some(meta) => meta,
            None => {
                debug!("skipping non-entry file: {}", file_name);
                continue;
            }
        };
        let entry = parse_entry(&source_dir.join(&file_name), meta)
            .map_err(|e| {
                Error::Annotated(
                    format!("parsing entry `{}`", file_name),
                    Box::new(e),
                )
            })?;
        if !seen_slugs.insert(entry.slug.clone()) {
            return Err(Error::DuplicateSlug(entry.slug));
        }
        entries.push(entry);
    }
    Ok(entries)
}

/// Represents the result of a fallible entry-parsing operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing entries from the source directory.
#[derive(Debug)]
pub enum Error {
    /// Returned when a file name matches the dated-entry pattern but names
    /// an impossible calendar date.
    InvalidDate { year: i32, month: u32, day: u32 },

    /// Returned when a header line has no `:` separator.
    MalformedHeader(String),

    /// Returned when two entries derive the same slug; the later page would
    /// silently overwrite the earlier one, so the run aborts instead.
    DuplicateSlug(String),

    /// Returned for I/O errors reading the source directory or its files.
    Io(std::io::Error),

    /// An error with an annotation naming the file being parsed.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidDate { year, month, day } => {
                write!(f, "no such calendar date: {}-{}-{}", year, month, day)
            }
            Error::MalformedHeader(line) => {
                write!(f, "header line without `:` separator: `{}`", line)
            }
            Error::DuplicateSlug(slug) => {
                write!(f, "two entries share the slug `{}`", slug)
            }
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidDate { .. } => None,
            Error::MalformedHeader(_) => None,
            Error::DuplicateSlug(_) => None,
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_file_name_match() {
        let meta = parse_file_name("2020.01.15.Hello.World").unwrap();
        assert_eq!(2020, meta.year);
        assert_eq!(1, meta.month);
        assert_eq!(15, meta.day);
        assert_eq!("Hello.World", meta.title);
    }

    #[test]
    fn test_parse_file_name_no_match() {
        assert!(parse_file_name("README").is_none());
        assert!(parse_file_name("2020.1.15.Short.Month").is_none());
        assert!(parse_file_name("2020.01.15").is_none());
    }

    #[test]
    fn test_parse_document_headers_and_body() -> Result<()> {
        let (headers, body) =
            parse_document("Tags: a b\nStatus: draft\n\nbody *text*\n")?;
        assert_eq!(
            vec![
                ("Tags".to_owned(), "a b".to_owned()),
                ("Status".to_owned(), "draft".to_owned()),
            ],
            headers
        );
        assert_eq!("body *text*\n", body);
        Ok(())
    }

    #[test]
    fn test_parse_document_without_body() -> Result<()> {
        let (headers, body) = parse_document("Tags: a\n")?;
        assert_eq!(vec![("Tags".to_owned(), "a".to_owned())], headers);
        assert_eq!("", body);
        Ok(())
    }

    #[test]
    fn test_parse_document_rejects_malformed_header() {
        match parse_document("not a header\n\nbody") {
            Err(Error::MalformedHeader(line)) => {
                assert_eq!("not a header", line)
            }
            other => panic!("expected MalformedHeader, got {:?}", other),
        }
    }

    #[test]
    fn test_read_and_parse_entries() -> Result<()> {
        let dir = source_dir(&[
            ("2020.01.15.Hello.World", "Tags: demo test\n\nHello **world**.\n"),
            ("2020.02.01.Second.Post", "Tags: demo\n\nMore.\n"),
            ("notes.txt", "not an entry\n"),
        ]);
        let entries = read_and_parse_entries(dir.path())?;

        assert_eq!(2, entries.len());
        assert_eq!("second-post", entries[0].slug);
        assert_eq!("hello-world", entries[1].slug);
        assert_eq!("Hello World", entries[1].title);
        assert_eq!(vec!["demo", "test"], entries[1].tags);
        assert_eq!("2020-01-15", entries[1].date.display);
        assert!(entries[1].content_html.contains("<strong>world</strong>"));
        Ok(())
    }

    #[test]
    fn test_entries_are_newest_first() -> Result<()> {
        let dir = source_dir(&[
            ("2019.12.31.Oldest", "Tags: a\n\nx\n"),
            ("2020.06.01.Newest", "Tags: a\n\nx\n"),
            ("2020.01.01.Middle", "Tags: a\n\nx\n"),
        ]);
        let entries = read_and_parse_entries(dir.path())?;
        let displays: Vec<&str> =
            entries.iter().map(|e| e.date.display.as_str()).collect();
        assert_eq!(vec!["2020-06-01", "2020-01-01", "2019-12-31"], displays);
        Ok(())
    }

    #[test]
    fn test_missing_tags_header_means_no_tags() -> Result<()> {
        let dir = source_dir(&[("2020.01.15.Untagged", "Author: me\n\nx\n")]);
        let entries = read_and_parse_entries(dir.path())?;
        assert!(entries[0].tags.is_empty());
        Ok(())
    }

    #[test]
    fn test_duplicate_slug_aborts() {
        let dir = source_dir(&[
            ("2020.01.15.Same.Title", "Tags: a\n\nx\n"),
            ("2020.02.15.Same.Title", "Tags: a\n\nx\n"),
        ]);
        match read_and_parse_entries(dir.path()) {
            Err(Error::DuplicateSlug(slug)) => assert_eq!("same-title", slug),
            other => panic!("expected DuplicateSlug, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_calendar_date_aborts() {
        let dir = source_dir(&[("2020.13.01.Bad.Month", "Tags: a\n\nx\n")]);
        assert!(read_and_parse_entries(dir.path()).is_err());
    }

    fn source_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, contents) in files {
            fs::write(dir.path().join(name), contents).unwrap();
        }
        dir
    }
}
