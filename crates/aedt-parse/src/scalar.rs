//! Scalar coercion and list splitting.

use aedt_tree::Value;

/// Turn one token into a typed value.
///
/// Order: the exact literals `true`/`false`, then integer, then float, then
/// a string with one layer of surrounding single quotes removed. Integers
/// that do not fit in `i64` come back as floats.
pub fn coerce(token: &str) -> Value {
    match token {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = token.parse::<i64>() {
        return Value::Int(i);
    }
    if let Ok(f) = token.parse::<f64>() {
        return Value::Float(f);
    }
    Value::Str(unquote(token).to_string())
}

/// Remove one layer of surrounding single quotes, if present.
pub fn unquote(token: &str) -> &str {
    if token.len() >= 2 && token.starts_with('\'') && token.ends_with('\'') {
        &token[1..token.len() - 1]
    } else {
        token
    }
}

/// Whether `token` is a single quoted string with no quote inside.
pub(crate) fn is_fully_quoted(token: &str) -> bool {
    let inner = unquote(token);
    inner.len() + 2 == token.len() && !inner.contains('\'')
}

/// Split list content on top-level commas and coerce every element.
///
/// Commas inside quotes, parentheses or brackets do not split. Empty
/// content is an empty list.
pub fn parse_list(inner: &str) -> Vec<Value> {
    split_list(inner).into_iter().map(coerce).collect()
}

/// Split list content on top-level commas, trimming every element.
pub(crate) fn split_list(inner: &str) -> Vec<&str> {
    if inner.trim().is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (idx, c) in inner.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                items.push(inner[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    items.push(inner[start..].trim());
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_testhelpers::test;

    #[test]
    fn test_literals() {
        assert_eq!(coerce("true"), Value::Bool(true));
        assert_eq!(coerce("false"), Value::Bool(false));
        // Only the exact lowercase spelling is a bool.
        assert_eq!(coerce("True"), Value::string("True"));
        assert_eq!(coerce("FALSE"), Value::string("FALSE"));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(coerce("3"), Value::Int(3));
        assert_eq!(coerce("-42"), Value::Int(-42));
        assert_eq!(coerce("1.5"), Value::Float(1.5));
        assert_eq!(coerce("1e-3"), Value::Float(0.001));
        assert_eq!(coerce("99999999999999999999"), Value::Float(1e20));
    }

    #[test]
    fn test_strings() {
        assert_eq!(coerce("'abc'"), Value::string("abc"));
        assert_eq!(coerce("''"), Value::string(""));
        assert_eq!(coerce("'"), Value::string("'"));
        assert_eq!(coerce("1GHz"), Value::string("1GHz"));
        // Quoted numbers stay strings.
        assert_eq!(coerce("'3'"), Value::string("3"));
    }

    #[test]
    fn test_fully_quoted() {
        assert!(is_fully_quoted("'a b'"));
        assert!(is_fully_quoted("''"));
        assert!(!is_fully_quoted("'a' 'b'"));
        assert!(!is_fully_quoted("a b"));
        assert!(!is_fully_quoted("'"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(split_list("1, 2, 'three'"), vec!["1", "2", "'three'"]);
        assert_eq!(split_list("'a, b', (1, 2), [3, 4]"), vec!["'a, b'", "(1, 2)", "[3, 4]"]);
        assert_eq!(split_list(""), Vec::<&str>::new());
        assert_eq!(split_list("  "), Vec::<&str>::new());
        assert_eq!(split_list("x"), vec!["x"]);
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(
            parse_list("1, 2, 'three'"),
            vec![Value::Int(1), Value::Int(2), Value::string("three")]
        );
    }
}
