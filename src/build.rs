//! Exports the [`build_site`] function which stitches together the
//! high-level steps of building the output site: parsing the entries
//! ([`crate::entry`]), copying static assets into a fresh build directory,
//! rendering every view ([`crate::render`]), and swapping the build
//! directory into place as the public directory.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;
use walkdir::WalkDir;

use crate::config::Config;
use crate::entry::{self, Error as ParseError};
use crate::render::{Error as RenderError, Renderer};

/// Builds the site from a [`Config`]. The sequence is strict: templates are
/// parsed first so a broken template aborts before any output exists, then
/// entries are parsed, assets are copied into a fresh build directory, every
/// view is generated, and finally the build directory replaces the public
/// directory. Any failure before the final swap leaves the public directory
/// untouched.
pub fn build_site(config: &Config) -> Result<()> {
    let renderer = Renderer::new(config)?;

    let entries = entry::read_and_parse_entries(&config.dirs.source)?;
    info!(
        "parsed {} entries from {}",
        entries.len(),
        config.dirs.source.display()
    );

    copy_assets(config)?;
    info!("copied assets into {}", config.dirs.build.display());

    renderer.generate_index(&entries)?;
    fs::create_dir(config.dirs.build.join("tags"))?;
    renderer.generate_tag_indices(&entries)?;
    renderer.generate_details(&entries)?;
    renderer.generate_not_found()?;
    renderer.generate_style()?;
    info!("generated all pages");

    publish(config)?;
    info!("published {}", config.dirs.public.display());
    Ok(())
}

/// Recursively copies the assets directory into the build directory. The
/// build directory must not already exist; a leftover from a prior
/// incomplete run is surfaced rather than silently reused.
fn copy_assets(config: &Config) -> Result<()> {
    let build = &config.dirs.build;
    fs::create_dir(build).map_err(|err| Error::CreateBuildDir {
        path: build.clone(),
        err,
    })?;

    let assets = &config.dirs.assets;
    for result in WalkDir::new(assets).min_depth(1) {
        let found = result?;
        // strip_prefix can't fail: every walked path is under `assets`
        let target = build.join(found.path().strip_prefix(assets).unwrap());
        if found.file_type().is_dir() {
            fs::create_dir(&target)?;
        } else {
            fs::copy(found.path(), &target)?;
        }
    }
    Ok(())
}

/// Replaces the public directory with the fully populated build directory.
/// The delete and the rename are two separate filesystem operations; a
/// crash between them leaves no published site.
fn publish(config: &Config) -> Result<()> {
    rmdir(&config.dirs.public)?;
    fs::rename(&config.dirs.build, &config.dirs.public)?;
    Ok(())
}

fn rmdir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

/// Represents the result of a site build.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can occur during entry
/// parsing, rendering, asset copying, cleaning the public directory, and
/// other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors while parsing entries.
    Parse(ParseError),

    /// Returned for errors while rendering views or feeds.
    Render(RenderError),

    /// Returned when the build directory can't be created, including the
    /// case where a prior incomplete run left it behind.
    CreateBuildDir { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while deleting the public directory.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while walking the assets directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Render(err) => err.fmt(f),
            Error::CreateBuildDir { path, err } => write!(
                f,
                "creating build directory '{}' (a previous incomplete run \
                 may have left it behind): {}",
                path.display(),
                err
            ),
            Error::Clean { path, err } => {
                write!(f, "cleaning directory '{}': {}", path.display(), err)
            }
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Render(err) => Some(err),
            Error::CreateBuildDir { path: _, err } => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<RenderError> for Error {
    /// Converts [`RenderError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: RenderError) -> Error {
        Error::Render(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use
    /// the `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
