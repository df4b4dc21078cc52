//! Line classification and key/value decoding.
//!
//! Every logical line is one of:
//!
//! ```text
//! $begin 'Name'          opens a block
//! $end 'Name'            closes it
//! Name(1, 2, 'x')        list property ('quoted name'(…) also allowed)
//! Name[3: 1, 2, 3]       list property, bracket form with optional count
//! Name=value             assignment ('quoted name'=value also allowed)
//! anything else          pseudo-key: the whole line, mapped to Null
//! ```

use aedt_tree::Value;

use crate::scalar::{coerce, is_fully_quoted, parse_list};

/// Structural role of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    Begin(&'a str),
    End(&'a str),
    Property(&'a str),
}

/// Classify a logical line.
pub(crate) fn classify(line: &str) -> LineKind<'_> {
    if let Some(name) = block_name(line, "$begin") {
        LineKind::Begin(name)
    } else if let Some(name) = block_name(line, "$end") {
        LineKind::End(name)
    } else {
        LineKind::Property(line)
    }
}

/// `$begin 'Name'` → `Name`.
fn block_name<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    let rest = rest.trim_start_matches([' ', '\t']).trim_end();
    let name = rest.strip_prefix('\'')?.strip_suffix('\'')?;
    (!name.is_empty()).then_some(name)
}

/// Split a line into its key and the text that follows it.
///
/// The key is either a quoted name or everything up to the first `(`,
/// `[` or `=`. Returns the key, whether it was quoted, and the rest of the
/// line starting at the delimiter.
fn split_key(line: &str) -> Option<(&str, bool, &str)> {
    if let Some(quoted) = line.strip_prefix('\'') {
        let end = quoted.find('\'')?;
        return Some((&quoted[..end], true, &quoted[end + 1..]));
    }
    let end = line.find(['(', '[', '='])?;
    Some((&line[..end], false, &line[end..]))
}

/// Decode one property line into a key and a value.
pub fn decode_property(line: &str) -> (String, Value) {
    let pseudo = || (line.to_string(), Value::Null);

    let Some((key, quoted, rest)) = split_key(line) else {
        return pseudo();
    };
    let bare_key_ok = quoted || (!key.is_empty() && !key.contains(char::is_whitespace));

    if bare_key_ok
        && let Some(inner) = rest.strip_prefix('(').and_then(|r| r.strip_suffix(')'))
    {
        return (key.to_string(), Value::List(parse_list(inner)));
    }

    if bare_key_ok
        && let Some(inner) = rest.strip_prefix('[').and_then(|r| r.strip_suffix(']'))
    {
        return (key.to_string(), Value::List(parse_list(strip_count(inner))));
    }

    if let Some(value) = rest.strip_prefix('=') {
        if !value.contains(char::is_whitespace) || is_fully_quoted(value) {
            return (key.to_string(), coerce(value));
        }
        return pseudo();
    }

    pseudo()
}

/// `3: a, b, c` → `a, b, c`.
fn strip_count(inner: &str) -> &str {
    match inner.split_once(':') {
        Some((count, rest)) if count.trim().parse::<usize>().is_ok() => rest,
        _ => inner,
    }
}

/// If `line` is `VERB(…)` for one of `verbs`, return that verb.
pub(crate) fn leading_verb<'v>(line: &str, verbs: &[&'v str]) -> Option<&'v str> {
    verbs.iter().copied().find(|verb| {
        line.strip_prefix(*verb)
            .is_some_and(|rest| rest.starts_with('('))
    })
}

/// `VERB(a, b)` → the decoded list, when the line is well formed.
pub(crate) fn verb_row(line: &str, verb: &str) -> Option<Value> {
    let inner = line
        .strip_prefix(verb)?
        .strip_prefix('(')?
        .trim_end()
        .strip_suffix(')')?;
    Some(Value::List(parse_list(inner)))
}
