//! Decoders for blocks and lines with their own micro-grammar.
//!
//! The generic rule (nested blocks, one property per line) does not fit a
//! handful of AEDT structures. Those are listed here in two closed tables:
//! block keywords, dispatched on `$begin 'Name'`, and line verbs, dispatched
//! on `Verb(…)`. A decoder either consumes its whole structure or reports a
//! [`Mismatch`]; on a mismatch the walker decodes the same line generically.

use aedt_lines::{Cursor, Lines};
use aedt_tree::{Document, Value};

use crate::property::{LineKind, classify, verb_row};
use crate::scalar::{coerce, parse_list};

/// Why a keyword decoder gave up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Mismatch {
    pub reason: &'static str,
}

impl Mismatch {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// Output of a block decoder: the value and the cursor just past `$end`.
pub(crate) type Decoded = (Value, Cursor);

type BlockDecodeFn = fn(&Lines, Cursor, &str) -> Result<Decoded, Mismatch>;

/// A block name with a dedicated decoder.
pub(crate) struct BlockKeyword {
    pub name: &'static str,
    pub decode: BlockDecodeFn,
}

/// Block keywords, matched on the exact name.
static BLOCK_KEYWORDS: &[BlockKeyword] = &[
    BlockKeyword {
        name: "CellActivityMatrix",
        decode: decode_matrix,
    },
    BlockKeyword {
        name: "CellRotationMatrix",
        decode: decode_matrix,
    },
    BlockKeyword {
        name: "IDMap",
        decode: decode_index_table,
    },
    BlockKeyword {
        name: "Curves",
        decode: decode_index_table,
    },
];

/// Line verbs whose rows accumulate instead of overwriting each other.
pub(crate) static LINE_VERBS: &[&str] = &["WireSeg", "PC", "Range"];

/// Look up the decoder for a block name.
pub(crate) fn block_keyword(name: &str) -> Option<&'static BlockKeyword> {
    BLOCK_KEYWORDS.iter().find(|k| k.name == name)
}

/// Collect consecutive `verb(…)` lines starting at `at`.
///
/// Returns the rows and the cursor on the first line that is not a row.
pub(crate) fn decode_verb_run(
    lines: &Lines,
    at: Cursor,
    verb: &str,
) -> Result<(Vec<Value>, Cursor), Mismatch> {
    let mut rows = Vec::new();
    let mut cursor = at;
    while let Some(row) = lines.get(cursor).and_then(|line| verb_row(line, verb)) {
        rows.push(row);
        cursor.advance();
    }
    if rows.is_empty() {
        return Err(Mismatch::new("row is not closed by `)`"));
    }
    Ok((rows, cursor))
}

/// Cell matrix:
///
/// ```text
/// $begin 'CellActivityMatrix'
///     m=2
///     n=3
///     $begin 'r0'
///         c(1) c(0) c(1)
///     $end 'r0'
///     $begin 'r1'
///         c(1), c(1), c(1)
///     $end 'r1'
/// $end 'CellActivityMatrix'
/// ```
///
/// Decodes to `{rows: 2, columns: 3, matrix: [[1, 0, 1], [1, 1, 1]]}`.
fn decode_matrix(lines: &Lines, begin: Cursor, name: &str) -> Result<Decoded, Mismatch> {
    let mut cursor = begin.next();

    let mut rows = None;
    let mut columns = None;
    let (rows, columns) = loop {
        if let (Some(m), Some(n)) = (rows, columns) {
            break (m, n);
        }
        let line = lines.get(cursor).ok_or(Mismatch::new("unterminated matrix"))?;
        if let Some(m) = header(line, "m") {
            rows = Some(m);
        } else if let Some(n) = header(line, "n") {
            columns = Some(n);
        } else {
            return Err(Mismatch::new("missing `m=` / `n=` header"));
        }
        cursor.advance();
    };

    let mut matrix = Vec::new();
    loop {
        let line = lines.get(cursor).ok_or(Mismatch::new("unterminated matrix"))?;
        match classify(line) {
            LineKind::End(end) if end == name => {
                cursor.advance();
                break;
            }
            LineKind::Begin(row) if is_row_name(row) => {
                let (cells, next) = decode_row(lines, cursor, row)?;
                if cells.len() != columns {
                    return Err(Mismatch::new("row length differs from `n=`"));
                }
                matrix.push(Value::List(cells));
                cursor = next;
            }
            LineKind::Property("") => cursor.advance(),
            _ => return Err(Mismatch::new("unexpected line in matrix")),
        }
    }
    if matrix.len() != rows {
        return Err(Mismatch::new("row count differs from `m=`"));
    }

    let mut doc = Document::new();
    doc.insert("rows", Value::Int(rows as i64));
    doc.insert("columns", Value::Int(columns as i64));
    doc.insert("matrix", Value::List(matrix));
    Ok((Value::Document(doc), cursor))
}

/// `m=3` → 3.
fn header(line: &str, key: &str) -> Option<usize> {
    line.strip_prefix(key)?.strip_prefix('=')?.trim().parse().ok()
}

/// `r0`, `r12`, …
fn is_row_name(name: &str) -> bool {
    name.strip_prefix('r')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

/// Cells of one `$begin 'rN'` … `$end 'rN'` row.
fn decode_row(lines: &Lines, begin: Cursor, row: &str) -> Result<(Vec<Value>, Cursor), Mismatch> {
    let mut cells = Vec::new();
    let mut cursor = begin.next();
    loop {
        let line = lines.get(cursor).ok_or(Mismatch::new("unterminated matrix row"))?;
        cursor.advance();
        match classify(line) {
            LineKind::End(end) if end == row => return Ok((cells, cursor)),
            LineKind::Property(text) => {
                cells.extend(parse_cells(text).ok_or(Mismatch::new("expected `c(value)` cells"))?)
            }
            _ => return Err(Mismatch::new("unexpected block in matrix row")),
        }
    }
}

/// `c(1) c('x'), c(2.5)` → `[1, "x", 2.5]`.
fn parse_cells(text: &str) -> Option<Vec<Value>> {
    let mut cells = Vec::new();
    let mut rest = text;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
        if rest.is_empty() {
            return Some(cells);
        }
        let body = rest.strip_prefix("c(")?;
        let close = closing_paren(body)?;
        cells.push(coerce(body[..close].trim()));
        rest = &body[close + 1..];
    }
}

/// Index of the `)` that closes an already-opened paren, skipping quotes.
fn closing_paren(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quoted = false;
    for (idx, c) in body.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            '(' if !quoted => depth += 1,
            ')' if !quoted => {
                if depth == 0 {
                    return Some(idx);
                }
                depth -= 1;
            }
            _ => {}
        }
    }
    None
}

/// Index table:
///
/// ```text
/// $begin 'Curves'
///     '0'(1.0, 2.0, 3.0)
///     '1'(4.0, 5.0, 6.0)
/// $end 'Curves'
/// ```
///
/// Decodes to `{"0": [1.0, 2.0, 3.0], "1": [4.0, 5.0, 6.0]}`.
fn decode_index_table(lines: &Lines, begin: Cursor, name: &str) -> Result<Decoded, Mismatch> {
    let mut doc = Document::new();
    let mut cursor = begin.next();
    loop {
        let line = lines.get(cursor).ok_or(Mismatch::new("unterminated table"))?;
        cursor.advance();
        match classify(line) {
            LineKind::End(end) if end == name => return Ok((Value::Document(doc), cursor)),
            LineKind::Property("") => {}
            LineKind::Property(text) => {
                let (index, values) =
                    index_tuple(text).ok_or(Mismatch::new("expected `'index'(values)` rows"))?;
                doc.insert(index, Value::List(values));
            }
            _ => return Err(Mismatch::new("unexpected block in table")),
        }
    }
}

/// `'3'(a, b)` → `("3", [a, b])`.
fn index_tuple(text: &str) -> Option<(&str, Vec<Value>)> {
    let quoted = text.strip_prefix('\'')?;
    let end = quoted.find('\'')?;
    let index = &quoted[..end];
    index.parse::<i64>().ok()?;
    let inner = quoted[end + 1..].strip_prefix('(')?.trim_end().strip_suffix(')')?;
    Some((index, parse_list(inner)))
}
