//! Value types for decoded AEDT documents.
//!
//! Every property of an AEDT block decodes to one of:
//! - a scalar (`true`, `3`, `1.5`, `'text'`),
//! - `Null`, for lines kept verbatim as pseudo-keys,
//! - a list, for `Name(a, b, c)` and `Name[n: a, b]` properties, or for
//!   blocks whose name repeated,
//! - a nested [`Document`], for `$begin 'Name'` … `$end 'Name'` blocks.

use indexmap::IndexMap;
use indexmap::map::Entry;

/// A decoded value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Pseudo-key marker: the key carries the whole line.
    Null,
    /// `true` / `false`.
    Bool(bool),
    /// Integer literal.
    Int(i64),
    /// Floating-point literal.
    Float(f64),
    /// Anything else, with one layer of single quotes removed.
    Str(String),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested block.
    Document(Document),
}

/// An ordered map of property and block names to values.
///
/// Insertion order follows the source file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    entries: IndexMap<String, Value>,
}

impl Value {
    /// Create a string value.
    pub fn string(text: impl Into<String>) -> Self {
        Value::Str(text.into())
    }

    /// Check if this is the pseudo-key marker.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get as bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as float. Integers widen.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get as string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get as list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get as nested document.
    pub fn as_document(&self) -> Option<&Document> {
        match self {
            Value::Document(doc) => Some(doc),
            _ => None,
        }
    }

    /// The documents behind a block key.
    ///
    /// A block name that appeared once maps to a document; one that repeated
    /// maps to a list of documents. This yields them in order either way.
    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        let items: &[Value] = match self {
            Value::List(items) => items,
            other => std::slice::from_ref(other),
        };
        items.iter().filter_map(Value::as_document)
    }

    /// Whether this is a non-empty list holding only documents.
    fn is_block_list(&self) -> bool {
        match self {
            Value::List(items) => {
                !items.is_empty() && items.iter().all(|v| matches!(v, Value::Document(_)))
            }
            _ => false,
        }
    }

    /// Get a value by path.
    ///
    /// Segments are separated by `/`. Use `[n]` for list indexing, either
    /// as its own segment or right after a key (`Version[0]`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(self);
        }

        let (segment, rest) = split_path(path);

        let value = if let Some(idx) = index_segment(segment) {
            self.as_list()?.get(idx)?
        } else {
            self.as_document()?.entries.get(segment)?
        };

        value.get(rest)
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check if key exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Get a direct child.
    pub fn get_key(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Get a mutable direct child.
    pub fn get_key_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    /// Get a value by `/`-separated path (see [`Value::get`]).
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return None;
        }

        let (segment, rest) = split_path(path);
        let value = self.entries.get(segment)?;
        value.get(rest)
    }

    /// Iterate over entries in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keys in source order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Plain assignment.
    ///
    /// A key that is already present keeps its position and gets the new
    /// value, like a later `key=value` line overriding an earlier one.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    /// Remove a key, keeping the order of the others.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    /// Add a decoded block.
    ///
    /// The first block with a given name is stored as is. When the name
    /// comes again at the same level, the stored value is wrapped in a list
    /// (unless it already is a list of blocks) and the new block appended.
    pub fn insert_block(&mut self, name: impl Into<String>, block: Value) {
        match self.entries.entry(name.into()) {
            Entry::Vacant(slot) => {
                slot.insert(block);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if !existing.is_block_list() {
                    let first = std::mem::replace(existing, Value::Null);
                    *existing = Value::List(vec![first]);
                }
                if let Value::List(items) = existing {
                    items.push(block);
                }
            }
        }
    }

    /// Append rows under `key`.
    ///
    /// Used for properties that legitimately repeat inside one block: rows
    /// already stored under `key` are kept and the new ones follow them.
    pub fn append_rows(&mut self, key: impl Into<String>, rows: Vec<Value>) {
        match self.entries.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(Value::List(rows));
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::List(items) => items.extend(rows),
                other => {
                    let first = std::mem::replace(other, Value::Null);
                    let mut items = Vec::with_capacity(rows.len() + 1);
                    items.push(first);
                    items.extend(rows);
                    *other = Value::List(items);
                }
            },
        }
    }

    /// Copy every entry of `other` that this document does not have yet.
    pub fn merge_missing(&mut self, other: Document) {
        for (key, value) in other.entries {
            self.entries.entry(key).or_insert(value);
        }
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Document(doc)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut doc = Document::new();
        for (key, value) in iter {
            doc.insert(key, value);
        }
        doc
    }
}

impl IntoIterator for Document {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Split off the first path segment.
///
/// `Version[0]/x` splits into `Version` and `[0]/x`; `[0]/x` into `[0]`
/// and `x`.
fn split_path(path: &str) -> (&str, &str) {
    if path.starts_with('[')
        && let Some(end) = path.find(']')
    {
        let segment = &path[..=end];
        let rest = &path[end + 1..];
        let rest = rest.strip_prefix('/').unwrap_or(rest);
        return (segment, rest);
    }

    let slash_pos = path.find('/');
    let bracket_pos = path.find('[');

    match (slash_pos, bracket_pos) {
        (Some(s), Some(b)) if b < s => (&path[..b], &path[b..]),
        (Some(s), _) => (&path[..s], &path[s + 1..]),
        (None, Some(b)) => (&path[..b], &path[b..]),
        (None, None) => (path, ""),
    }
}

fn index_segment(segment: &str) -> Option<usize> {
    segment.strip_prefix('[')?.strip_suffix(']')?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    fn block(pairs: &[(&str, i64)]) -> Value {
        Value::Document(pairs.iter().map(|(k, v)| (*k, Value::Int(*v))).collect())
    }

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut doc = Document::new();
        doc.insert("A", Value::Int(1));
        doc.insert("B", Value::Int(2));
        doc.insert("A", Value::Int(3));
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(doc.get("A"), Some(&Value::Int(3)));
    }

    #[test]
    fn test_insert_block_collapses_repeats() {
        let mut doc = Document::new();
        doc.insert_block("Choice", block(&[("a", 1)]));
        assert!(doc.get("Choice").unwrap().as_document().is_some());

        doc.insert_block("Choice", block(&[("b", 2)]));
        doc.insert_block("Choice", block(&[("c", 3)]));

        let items = doc.get("Choice").unwrap().as_list().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0], block(&[("a", 1)]));
        assert_eq!(items[2], block(&[("c", 3)]));
    }

    #[test]
    fn test_insert_block_wraps_non_block_list() {
        // A list property that shares its name with a later block.
        let mut doc = Document::new();
        doc.insert("Ports", Value::List(vec![Value::Int(1), Value::Int(2)]));
        doc.insert_block("Ports", block(&[("x", 1)]));

        let items = doc.get("Ports").unwrap().as_list().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], Value::List(vec![Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_documents_single_or_many() {
        let mut doc = Document::new();
        doc.insert_block("One", block(&[("a", 1)]));
        doc.insert_block("Two", block(&[("a", 1)]));
        doc.insert_block("Two", block(&[("a", 2)]));

        assert_eq!(doc.get("One").unwrap().documents().count(), 1);
        assert_eq!(doc.get("Two").unwrap().documents().count(), 2);
        assert_eq!(Value::Int(3).documents().count(), 0);
    }

    #[test]
    fn test_append_rows() {
        let mut doc = Document::new();
        doc.append_rows("Range", vec![Value::List(vec![Value::Int(1)])]);
        doc.insert("Other", Value::Bool(true));
        doc.append_rows("Range", vec![Value::List(vec![Value::Int(2)])]);

        let rows = doc.get("Range").unwrap().as_list().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(doc.keys().collect::<Vec<_>>(), vec!["Range", "Other"]);
    }

    #[test]
    fn test_path_lookup() {
        let desktop: Document = [(
            "Version",
            Value::List(vec![Value::Int(2023), Value::Int(1)]),
        )]
        .into_iter()
        .collect();
        let project: Document = [("Desktop", Value::Document(desktop))].into_iter().collect();
        let mut root = Document::new();
        root.insert_block("AnsoftProject", Value::Document(project));

        assert_eq!(
            root.get("AnsoftProject/Desktop/Version[1]"),
            Some(&Value::Int(1))
        );
        assert_eq!(
            root.get("AnsoftProject/Desktop/Version/[0]"),
            Some(&Value::Int(2023))
        );
        assert_eq!(root.get("AnsoftProject/Missing"), None);
        assert_eq!(root.get("AnsoftProject/Desktop/Version[5]"), None);
        assert_eq!(root.get(""), None);
    }

    #[test]
    fn test_path_through_repeated_blocks() {
        let mut root = Document::new();
        root.insert_block("Choice", block(&[("a", 1)]));
        root.insert_block("Choice", block(&[("a", 2)]));
        assert_eq!(root.get("Choice[1]/a"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_merge_missing_keeps_existing() {
        let mut doc: Document = [("A", Value::Int(1))].into_iter().collect();
        let other: Document = [("A", Value::Int(9)), ("B", Value::Int(2))]
            .into_iter()
            .collect();
        doc.merge_missing(other);
        assert_eq!(doc.get("A"), Some(&Value::Int(1)));
        assert_eq!(doc.get("B"), Some(&Value::Int(2)));
    }
}
