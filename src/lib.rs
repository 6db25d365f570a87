//! The library code for the `reprise` static site generator. The
//! architecture can be generally broken down into two distinct steps:
//!
//! 1. Parsing entries from source files on disk ([`crate::entry`])
//! 2. Converting the entries into output files on disk ([`crate::build`])
//!
//! The first step scans the source directory for files named
//! `YYYY.MM.DD.Title.With.Dots`, parses each one's header block and
//! Markdown body, and returns the entries newest-first. The second step
//! renders each view of the site from that list: the full index, one
//! filtered index per tag, one detail page per entry, a 404 page, and an
//! Atom feed next to every index. Everything is generated into a scratch
//! build directory which then replaces the public directory wholesale, so
//! a failed run never leaves a half-written site behind.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod date;
pub mod entry;
pub mod feed;
pub mod markdown;
pub mod render;
pub mod slug;
