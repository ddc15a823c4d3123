//! Field stripping — drop noise keys from a value before ZOON encoding.
//!
//! Schema inference pays for every key it sees: noise fields (cache tags,
//! hypermedia links, API resource-kind markers) widen the header and the
//! rows without carrying information an LLM needs. This module removes
//! them by dotted-path pattern before encoding.
//!
//! # Pattern syntax
//!
//! - `"etag"` — remove the top-level key named `etag`
//! - `"items.etag"` — remove `etag` inside `items`
//! - `"*.etag"` — remove `etag` at any depth (including the top level)
//! - `"attendees.*.self"` — remove `self` one level below `attendees`
//!
//! Arrays are transparent: patterns pass through to every element without
//! consuming a segment, so `"items.etag"` works whether `items` is an
//! object or an array of objects.

use serde_json::{Map, Value};

use crate::error::Result;

/// One pattern segment: a literal key name or the `*` wildcard.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Segment<'a> {
    Name(&'a str),
    Any,
}

fn parse_pattern(pattern: &str) -> Vec<Segment<'_>> {
    pattern
        .split('.')
        .map(|part| if part == "*" { Segment::Any } else { Segment::Name(part) })
        .collect()
}

/// Remove fields matching `patterns` from a value.
///
/// Returns a new value; the input is untouched. Patterns that match
/// nothing are no-ops, and an empty pattern list returns a plain clone.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use zoon_core::filter_fields;
///
/// let value = json!({"name": "Alice", "etag": "abc", "kind": "event"});
/// let kept = filter_fields(&value, &["etag", "kind"]);
/// assert_eq!(kept, json!({"name": "Alice"}));
/// ```
pub fn filter_fields(value: &Value, patterns: &[&str]) -> Value {
    if patterns.is_empty() {
        return value.clone();
    }
    let parsed: Vec<Vec<Segment<'_>>> = patterns.iter().map(|p| parse_pattern(p)).collect();
    let active: Vec<&[Segment<'_>]> = parsed.iter().map(Vec::as_slice).collect();
    retain(value, &active)
}

/// Strip matching fields, then encode the remainder to ZOON.
///
/// # Errors
///
/// Returns an error if the input is not valid JSON.
///
/// # Examples
///
/// ```
/// use zoon_core::filter_and_encode;
///
/// let json = r#"{"name":"Alice","etag":"abc"}"#;
/// let zoon = filter_and_encode(json, &["etag"]).unwrap();
/// assert_eq!(zoon, "name=Alice");
/// ```
pub fn filter_and_encode(json: &str, patterns: &[&str]) -> Result<String> {
    let value: Value = serde_json::from_str(json)?;
    Ok(crate::encoder::encode_value(&filter_fields(&value, patterns)))
}

/// Recursive walk. Objects drop matched keys and narrow the pattern set
/// for each child; arrays forward every pattern to every element.
fn retain(value: &Value, patterns: &[&[Segment<'_>]]) -> Value {
    match value {
        Value::Object(map) => retain_object(map, patterns),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| retain(item, patterns)).collect())
        }
        other => other.clone(),
    }
}

fn retain_object(map: &Map<String, Value>, patterns: &[&[Segment<'_>]]) -> Value {
    let mut kept: Map<String, Value> = Map::new();
    for (key, child) in map {
        let mut narrowed: Vec<&[Segment<'_>]> = Vec::new();
        if patterns
            .iter()
            .any(|pattern| collect_for_key(pattern, key, &mut narrowed))
        {
            continue;
        }
        if narrowed.is_empty() {
            kept.insert(key.clone(), child.clone());
        } else {
            kept.insert(key.clone(), retain(child, &narrowed));
        }
    }
    Value::Object(kept)
}

/// Apply one pattern at one object key. Returns `true` when the key
/// itself must be removed; otherwise pushes the narrowed pattern(s) that
/// should descend into the key's value.
///
/// A leading `*` matches this level three ways: as a terminal (`*.key`
/// removes `key` here), as one consumed level (the remainder descends
/// when its head matches the key), and as an unconsumed wildcard (the
/// full pattern also descends, so it can match deeper).
fn collect_for_key<'p, 'a>(
    pattern: &'p [Segment<'a>],
    key: &str,
    narrowed: &mut Vec<&'p [Segment<'a>]>,
) -> bool {
    let Some((head, rest)) = pattern.split_first() else {
        return false;
    };
    match head {
        Segment::Any => {
            if rest.is_empty() {
                // Bare "*": remove every key at this level.
                return true;
            }
            if rest.len() == 1 && rest[0] == Segment::Name(key) {
                return true;
            }
            if matches!(rest[0], Segment::Any) || rest[0] == Segment::Name(key) {
                narrowed.push(&rest[1..]);
            }
            narrowed.push(pattern);
            false
        }
        Segment::Name(name) if *name == key => {
            if rest.is_empty() {
                return true;
            }
            narrowed.push(rest);
            false
        }
        Segment::Name(_) => false,
    }
}
