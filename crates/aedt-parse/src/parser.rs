//! Entry points.

use std::io;
use std::path::Path;
use std::time::Instant;

use aedt_lines::Lines;
use aedt_tree::Document;
use tracing::{debug, info};

use crate::observer::{Diagnostics, IgnoreDiagnostics, ParseObserver};
use crate::walker::{Walker, walk_keyword};
use crate::{Error, ParseError};

/// `AnsoftProject/Desktop/Version(<year>, <release>)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AedtVersion {
    pub year: i64,
    pub release: i64,
}

impl AedtVersion {
    pub const fn new(year: i64, release: i64) -> Self {
        Self { year, release }
    }

    /// Version declared by a decoded project, if it has one.
    pub fn of(doc: &Document) -> Option<Self> {
        let version = doc.get("AnsoftProject/Desktop/Version")?.as_list()?;
        match version {
            [year, release, ..] => Some(Self::new(year.as_i64()?, release.as_i64()?)),
            _ => None,
        }
    }
}

impl std::fmt::Display for AedtVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.year, self.release)
    }
}

/// A whole-file result together with what was recovered silently.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub document: Document,
    pub diagnostics: Diagnostics,
}

/// Parser configuration.
///
/// The parser keeps no state between calls; every call builds its own line
/// buffer and cursor, so one `Parser` can be shared freely across threads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parser {
    /// Block that newer projects write late in the file and that the
    /// whole-file parse fetches with an extra bounded parse.
    pub preview_keyword: String,
    /// The extra parse only runs for versions strictly newer than this.
    pub preview_min_version: AedtVersion,
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            preview_keyword: "ProjectPreview".to_string(),
            preview_min_version: AedtVersion::new(2022, 2),
        }
    }
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read and preprocess a project file without decoding it.
    ///
    /// Pair with the `*_lines` entry points when the lines are needed again
    /// afterwards, e.g. to render a [`ParseError`].
    pub fn read_lines(&self, path: impl AsRef<Path>) -> io::Result<Lines> {
        let path = path.as_ref();
        info!("Parsing {}", path.display());
        Lines::read(path)
    }

    /// Read and decode a whole project file.
    pub fn parse_document(&self, path: impl AsRef<Path>) -> Result<Document, Error> {
        self.parse_document_with_observer(path, &mut IgnoreDiagnostics)
    }

    /// Like [`Parser::parse_document`], also collecting diagnostics.
    pub fn parse_document_report(&self, path: impl AsRef<Path>) -> Result<Parsed, Error> {
        let mut diagnostics = Diagnostics::default();
        let document = self.parse_document_with_observer(path, &mut diagnostics)?;
        Ok(Parsed {
            document,
            diagnostics,
        })
    }

    pub fn parse_document_with_observer(
        &self,
        path: impl AsRef<Path>,
        observer: &mut dyn ParseObserver,
    ) -> Result<Document, Error> {
        let started = Instant::now();
        let lines = self.read_lines(path)?;
        let document = self.parse_document_lines_with_observer(&lines, observer)?;

        info!(elapsed = ?started.elapsed(), "File loaded");
        Ok(document)
    }

    /// Decode lines that are already preprocessed.
    pub fn parse_document_lines(&self, lines: &Lines) -> Result<Document, ParseError> {
        self.parse_document_lines_with_observer(lines, &mut IgnoreDiagnostics)
    }

    pub fn parse_document_lines_with_observer(
        &self,
        lines: &Lines,
        observer: &mut dyn ParseObserver,
    ) -> Result<Document, ParseError> {
        report_skipped(lines, observer);

        let mut document = Walker::new(lines, observer).walk_all()?;

        if let Some(version) = AedtVersion::of(&document)
            && version > self.preview_min_version
            && !document.contains_key(&self.preview_keyword)
        {
            debug!(%version, keyword = %self.preview_keyword, "fetching preview block");
            // The whole-file walk already decoded and reported this block.
            let preview = walk_keyword(lines, &self.preview_keyword, None, &mut IgnoreDiagnostics)?;
            document.merge_missing(preview);
        }

        Ok(document)
    }

    /// Read a project file and decode one block of it.
    ///
    /// The result is `{keyword: block}`, or an empty document when no block
    /// matched. With `design`, the block must come after a
    /// `Name='<design>'` line.
    pub fn parse_keyword(
        &self,
        path: impl AsRef<Path>,
        keyword: &str,
        design: Option<&str>,
    ) -> Result<Document, Error> {
        self.parse_keyword_with_observer(path, keyword, design, &mut IgnoreDiagnostics)
    }

    pub fn parse_keyword_with_observer(
        &self,
        path: impl AsRef<Path>,
        keyword: &str,
        design: Option<&str>,
        observer: &mut dyn ParseObserver,
    ) -> Result<Document, Error> {
        let started = Instant::now();
        let lines = self.read_lines(path)?;
        let document = self.parse_keyword_lines_with_observer(&lines, keyword, design, observer)?;

        info!(elapsed = ?started.elapsed(), "File loaded");
        Ok(document)
    }

    pub fn parse_keyword_lines(
        &self,
        lines: &Lines,
        keyword: &str,
        design: Option<&str>,
    ) -> Result<Document, ParseError> {
        self.parse_keyword_lines_with_observer(lines, keyword, design, &mut IgnoreDiagnostics)
    }

    pub fn parse_keyword_lines_with_observer(
        &self,
        lines: &Lines,
        keyword: &str,
        design: Option<&str>,
        observer: &mut dyn ParseObserver,
    ) -> Result<Document, ParseError> {
        report_skipped(lines, observer);
        walk_keyword(lines, keyword, design, observer)
    }
}

fn report_skipped(lines: &Lines, observer: &mut dyn ParseObserver) {
    for &raw_line in lines.skipped() {
        observer.skipped_line(raw_line);
    }
}
