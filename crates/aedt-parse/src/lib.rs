#![doc = include_str!("../README.md")]
//! Parser for the AEDT project file format.
//!
//! AEDT stores projects as nested `$begin 'Name'` … `$end 'Name'` blocks of
//! one-property-per-line text:
//!
//! ```text
//! $begin 'AnsoftProject'
//!     Created='Thu Mar  4 12:01:24 2021'
//!     $begin 'Desktop'
//!         Version(2023, 1)
//!         InfrastructureVersion(1, 0)
//!     $end 'Desktop'
//! $end 'AnsoftProject'
//! ```
//!
//! [`parse_document`] decodes a whole file into an [`aedt_tree::Document`].
//! [`parse_keyword`] decodes the first block with a given name and stops
//! reading there, which keeps lookups into very large archives cheap.
//!
//! Some blocks (cell matrices, index tables) and line verbs (`WireSeg`, `PC`,
//! `Range`) have their own grammar and decode into their own shapes. When
//! one of them does not match its grammar, it is decoded like any other
//! block instead; pass a [`ParseObserver`] to find out when that happens.

mod diagnostic;
mod error;
mod keywords;
mod observer;
mod parser;
mod property;
mod scalar;
mod walker;

use std::path::Path;

pub use aedt_lines::{Cursor, Lines};
pub use aedt_tree::{Document, Value};
pub use error::{Error, ParseError, ParseErrorKind};
pub use observer::{Diagnostics, IgnoreDiagnostics, KeywordFallback, ParseObserver};
pub use parser::{AedtVersion, Parsed, Parser};
pub use property::decode_property;
pub use scalar::{coerce, parse_list, unquote};

/// Read and decode a whole project file with the default [`Parser`].
pub fn parse_document(path: impl AsRef<Path>) -> Result<Document, Error> {
    Parser::new().parse_document(path)
}

/// Read a project file and decode only the first `keyword` block.
///
/// See [`Parser::parse_keyword`].
pub fn parse_keyword(
    path: impl AsRef<Path>,
    keyword: &str,
    design: Option<&str>,
) -> Result<Document, Error> {
    Parser::new().parse_keyword(path, keyword, design)
}

/// Decode project text held in memory.
pub fn parse_str(source: &str) -> Result<Document, ParseError> {
    parse_lines(&Lines::from_source(source))
}

/// Decode lines that are already preprocessed.
pub fn parse_lines(lines: &Lines) -> Result<Document, ParseError> {
    Parser::new().parse_document_lines(lines)
}
