//! The block walker.
//!
//! Nesting is tracked on an explicit stack of open frames, so arbitrarily
//! deep input cannot exhaust the call stack.

use aedt_lines::{Cursor, Lines};
use aedt_tree::{Document, Value};
use tracing::{debug, trace};

use crate::keywords::{LINE_VERBS, Mismatch, block_keyword, decode_verb_run};
use crate::observer::{KeywordFallback, ParseObserver};
use crate::property::{LineKind, classify, decode_property, leading_verb};
use crate::{ParseError, ParseErrorKind};

/// A block that has been opened but not closed yet.
struct Frame {
    name: String,
    opened_at: Cursor,
    doc: Document,
}

/// How far a walk goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Extent {
    /// Until the end of input.
    All,
    /// Until the block opened on the first line is closed.
    OneBlock,
}

pub(crate) struct Walker<'a> {
    lines: &'a Lines,
    observer: &'a mut dyn ParseObserver,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(lines: &'a Lines, observer: &'a mut dyn ParseObserver) -> Self {
        Self { lines, observer }
    }

    /// Decode every line into one document.
    ///
    /// Property lines outside of any block land in the returned document
    /// next to the top-level blocks.
    pub(crate) fn walk_all(&mut self) -> Result<Document, ParseError> {
        let mut root = Document::new();
        self.run(Cursor::start(), &mut root, Extent::All)?;
        Ok(root)
    }

    /// Decode the single block whose `$begin` is at `begin`.
    ///
    /// Returns `{name: block}` and the cursor just past its `$end`. Nothing
    /// after that line is read.
    pub(crate) fn walk_block(&mut self, begin: Cursor) -> Result<(Document, Cursor), ParseError> {
        let mut root = Document::new();
        let next = self.run(begin, &mut root, Extent::OneBlock)?;
        Ok((root, next))
    }

    fn run(
        &mut self,
        start: Cursor,
        root: &mut Document,
        extent: Extent,
    ) -> Result<Cursor, ParseError> {
        let lines = self.lines;
        let mut stack: Vec<Frame> = Vec::new();
        let mut cursor = start;

        loop {
            let Some(line) = lines.get(cursor) else {
                return match stack.pop() {
                    Some(frame) => Err(ParseError::new(
                        ParseErrorKind::UnexpectedEof { block: frame.name },
                        cursor,
                        Some(frame.opened_at),
                    )),
                    None => Ok(cursor),
                };
            };

            match classify(line) {
                LineKind::Begin(name) => {
                    trace!(line = cursor.line_number(), name, "begin");
                    if let Some(keyword) = block_keyword(name) {
                        match (keyword.decode)(lines, cursor, name) {
                            Ok((value, next)) => {
                                current(&mut stack, root).insert_block(name, value);
                                cursor = next;
                                if extent == Extent::OneBlock && stack.is_empty() {
                                    return Ok(cursor);
                                }
                                continue;
                            }
                            Err(mismatch) => self.fall_back(name, cursor, mismatch),
                        }
                    }
                    stack.push(Frame {
                        name: name.to_string(),
                        opened_at: cursor,
                        doc: Document::new(),
                    });
                    cursor.advance();
                }

                LineKind::End(name) => {
                    trace!(line = cursor.line_number(), name, "end");
                    let Some(frame) = stack.pop() else {
                        return Err(ParseError::new(
                            ParseErrorKind::UnmatchedEnd {
                                name: name.to_string(),
                            },
                            cursor,
                            None,
                        ));
                    };
                    if frame.name != name {
                        return Err(ParseError::new(
                            ParseErrorKind::MismatchedEnd {
                                expected: frame.name,
                                found: name.to_string(),
                            },
                            cursor,
                            Some(frame.opened_at),
                        ));
                    }
                    current(&mut stack, root).insert_block(frame.name, Value::Document(frame.doc));
                    cursor.advance();
                    if extent == Extent::OneBlock && stack.is_empty() {
                        return Ok(cursor);
                    }
                }

                LineKind::Property("") => cursor.advance(),

                LineKind::Property(text) => {
                    if let Some(verb) = leading_verb(text, LINE_VERBS) {
                        match decode_verb_run(lines, cursor, verb) {
                            Ok((rows, next)) => {
                                trace!(line = cursor.line_number(), verb, rows = rows.len(), "rows");
                                current(&mut stack, root).append_rows(verb, rows);
                                cursor = next;
                                continue;
                            }
                            Err(mismatch) => self.fall_back(verb, cursor, mismatch),
                        }
                    }
                    let (key, value) = decode_property(text);
                    trace!(line = cursor.line_number(), key = %key, "property");
                    current(&mut stack, root).insert(key, value);
                    cursor.advance();
                }
            }
        }
    }

    fn fall_back(&mut self, keyword: &str, at: Cursor, mismatch: Mismatch) {
        debug!(
            keyword,
            line = at.line_number(),
            reason = mismatch.reason,
            "keyword decoder gave up, decoding generically"
        );
        self.observer.keyword_fallback(&KeywordFallback {
            keyword: keyword.to_string(),
            line: at.line_number(),
            reason: mismatch.reason,
        });
    }
}

/// The document new entries go into: the innermost open block, or the root.
fn current<'s>(stack: &'s mut [Frame], root: &'s mut Document) -> &'s mut Document {
    match stack.last_mut() {
        Some(frame) => &mut frame.doc,
        None => root,
    }
}

/// Find the first `$begin 'keyword'` and decode that block only.
///
/// With a design name, a `Name='<design>'` line has to come first; blocks
/// with the right name before it are passed over. Returns an empty document
/// when nothing matches.
pub(crate) fn walk_keyword(
    lines: &Lines,
    keyword: &str,
    design: Option<&str>,
    observer: &mut dyn ParseObserver,
) -> Result<Document, ParseError> {
    let marker = design.map(|name| format!("Name='{name}'"));
    let mut armed = marker.is_none();

    for (idx, line) in lines.iter().enumerate() {
        if !armed {
            if let Some(marker) = &marker
                && line.starts_with(marker.as_str())
            {
                trace!(line = idx + 1, "design marker found");
                armed = true;
            }
            continue;
        }
        if classify(line) == LineKind::Begin(keyword) {
            debug!(keyword, line = idx + 1, "keyword block found");
            let (doc, _) = Walker::new(lines, observer).walk_block(Cursor::at(idx))?;
            return Ok(doc);
        }
    }

    debug!(keyword, ?design, "keyword block not found");
    Ok(Document::new())
}
