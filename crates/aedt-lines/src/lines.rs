//! Raw bytes to logical lines.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use crate::Cursor;

/// Marker that joins a line with the one after it.
const CONTINUATION: &str = "\\\n";

/// Preprocessed logical lines of one AEDT file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lines {
    lines: Vec<String>,
    /// 1-based raw line numbers that were not valid UTF-8.
    skipped: Vec<usize>,
}

impl Lines {
    /// Read a file fully, then preprocess it.
    ///
    /// The file is closed before any decoding happens. Open and read errors
    /// are returned unchanged.
    pub fn read(path: impl AsRef<Path>) -> io::Result<Self> {
        let raw = fs::read(path.as_ref())?;
        Ok(Self::from_bytes(&raw))
    }

    /// Preprocess text that is already in memory.
    pub fn from_source(source: &str) -> Self {
        Self::from_bytes(source.as_bytes())
    }

    /// Preprocess raw file content.
    pub fn from_bytes(raw: &[u8]) -> Self {
        let mut kept = Vec::new();
        let mut skipped = Vec::new();

        for (idx, raw_line) in raw_lines(raw).enumerate() {
            match std::str::from_utf8(raw_line) {
                Ok(text) => kept.push(text.trim_end_matches('\r').trim_start_matches([' ', '\t'])),
                Err(err) => {
                    debug!(line = idx + 1, %err, "dropping undecodable line");
                    skipped.push(idx + 1);
                }
            }
        }

        Self {
            lines: join_continuations(&kept),
            skipped,
        }
    }

    /// Number of logical lines.
    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether there are no logical lines at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line under `cursor`, or `None` past the end.
    #[inline]
    pub fn get(&self, cursor: Cursor) -> Option<&str> {
        self.lines.get(cursor.index()).map(String::as_str)
    }

    /// Whether `cursor` is past the last line.
    #[inline]
    pub fn is_eof(&self, cursor: Cursor) -> bool {
        cursor.index() >= self.lines.len()
    }

    /// All logical lines in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Logical lines as a slice.
    pub fn as_slice(&self) -> &[String] {
        &self.lines
    }

    /// Raw line numbers (1-based) dropped because they were not UTF-8.
    pub fn skipped(&self) -> &[usize] {
        &self.skipped
    }

    /// The logical lines as text, each terminated by `\n`.
    ///
    /// Feeding this back into [`Lines::from_source`] yields the same lines.
    pub fn to_text(&self) -> String {
        let mut text = String::with_capacity(self.lines.iter().map(|l| l.len() + 1).sum());
        for line in &self.lines {
            text.push_str(line);
            text.push('\n');
        }
        text
    }

    /// Byte offset of the line at `cursor` inside [`Lines::to_text`].
    ///
    /// Past the end this is the length of the text.
    pub fn line_offset(&self, cursor: Cursor) -> usize {
        self.lines
            .iter()
            .take(cursor.index())
            .map(|l| l.len() + 1)
            .sum()
    }
}

/// Split on `\n`, ignoring the empty tail after a final newline.
fn raw_lines(raw: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = raw.strip_suffix(b"\n").unwrap_or(raw);
    let empty = raw.is_empty();
    body.split(|b| *b == b'\n').filter(move |_| !empty)
}

/// Join `\`-continued lines.
///
/// Works on the concatenated text so that a run of continuations collapses
/// into one logical line.
fn join_continuations(parts: &[&str]) -> Vec<String> {
    if parts.is_empty() {
        return Vec::new();
    }
    let mut text = parts.join("\n");
    if !text.contains(CONTINUATION) {
        return parts.iter().map(|p| (*p).to_string()).collect();
    }
    // A removal can leave a `\` right before the next line break
    // (`a\\` followed by an empty line), so repeat until none is left.
    while text.contains(CONTINUATION) {
        text = text.replace(CONTINUATION, "");
    }
    text.split('\n').map(str::to_string).collect()
}
