//! ZOON Encoder — converts JSON values into compact header-plus-rows text.
//!
//! The encoder infers a schema from the input and emits the smallest of the
//! format's document shapes:
//!
//! - **Tabular**: a non-empty array of objects becomes a `#` header line plus
//!   one space-separated line per row, with constant hoisting (`@key=…`),
//!   typed columns (`key:s`, `key:i`, …), enum columns (`key=a|b`, `key!a|b`),
//!   auto-increment columns (`key:i+`), and `%`-aliases for shared key prefixes
//! - **Inline**: a single object becomes one line of `key:value` tokens
//! - **Simple list**: a scalar array becomes `[v1,v2,v3]`
//! - **Scalar**: a bare primitive becomes its inline token
//!
//! All schema analysis happens on *flattened* rows: nested objects are
//! replaced by dotted paths (`a.b.c`) before type inference, and the decoder
//! rebuilds the nesting. Strings trade underscores for spaces on the wire,
//! which is the format's one documented lossy transform.
//!
//! # Example
//! ```
//! use zoon_core::encode;
//! let json = r#"[{"id":1,"name":"Alice"},{"id":2,"name":"Bob"}]"#;
//! let zoon = encode(json).unwrap();
//! assert_eq!(zoon, "# id:i+ name:s\nAlice\nBob");
//! ```

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::{Map, Value};

use crate::error::Result;
use crate::types::{
    Column, TypeCode, BOOL_FALSE, BOOL_TRUE, INLINE_BOOL_FALSE, INLINE_BOOL_TRUE, NULL_MARKER,
};

/// Encode a JSON string into ZOON format.
///
/// Parses the input as JSON, then infers a schema and emits the compact
/// text form. Returns an error only if the input is not valid JSON.
pub fn encode(json: &str) -> Result<String> {
    let value: Value = serde_json::from_str(json)?;
    Ok(encode_value(&value))
}

/// Encode a value into ZOON format. Total — every value kind has a
/// defined emission.
///
/// Dispatch: a non-empty array of objects takes the tabular path, an
/// object takes the inline path, any other array becomes a simple list
/// (the empty array encodes to the empty string), and scalars emit their
/// bare inline token.
pub fn encode_value(value: &Value) -> String {
    match value {
        Value::Array(rows) if !rows.is_empty() && rows.iter().all(Value::is_object) => {
            encode_tabular(rows)
        }
        Value::Object(map) => encode_inline(map),
        Value::Array(items) if items.is_empty() => String::new(),
        Value::Array(items) => encode_simple_list(items),
        other => encode_token(other, true),
    }
}

// ============================================================================
// Tabular encoding
// ============================================================================

/// Encode a non-empty array of objects as header + rows.
///
/// Pipeline: flatten every row, union the keys (sorted), hoist constants,
/// infer a column type per remaining key, discover prefix aliases, then
/// emit the header line(s) and the row body. When every column is
/// auto-increment the body is elided and the header carries `+N` instead.
fn encode_tabular(rows: &[Value]) -> String {
    let flat_rows: Vec<Map<String, Value>> = rows
        .iter()
        .filter_map(Value::as_object)
        .map(flatten_object)
        .collect();

    let mut keys = BTreeSet::new();
    for row in &flat_rows {
        keys.extend(row.keys().cloned());
    }

    let (constants, active_keys) = split_constants(&flat_rows, &keys);
    let columns: Vec<Column> = active_keys
        .iter()
        .map(|key| infer_column(key, &flat_rows))
        .collect();
    let aliases = detect_aliases(&active_keys);

    let mut lines: Vec<String> = Vec::new();
    if !aliases.is_empty() {
        let defs: Vec<String> = aliases
            .iter()
            .map(|(prefix, alias)| format!("%{alias}={prefix}"))
            .collect();
        lines.push(defs.join(" "));
    }

    let mut header: Vec<String> = vec!["#".to_string()];
    for (key, value) in &constants {
        let key = apply_alias(key, &aliases).replace(' ', "_");
        match value {
            Value::Bool(b) => {
                let tok = if *b { INLINE_BOOL_TRUE } else { INLINE_BOOL_FALSE };
                header.push(format!("@{key}:{tok}"));
            }
            Value::Number(n) => header.push(format!("@{key}:{}", format_number(n))),
            Value::String(s) => header.push(format!("@{key}={}", encode_string(s))),
            other => header.push(format!("@{key}={}", encode_token(other, false))),
        }
    }
    for column in &columns {
        let key = apply_alias(&column.key, &aliases).replace(' ', "_");
        match &column.enum_values {
            Some(values) => {
                let sep = if column.indexed { '!' } else { '=' };
                let listed: Vec<String> = values.iter().map(|v| encode_string(v)).collect();
                header.push(format!("{key}{sep}{}", listed.join("|")));
            }
            None => header.push(format!("{key}:{}", column.ty.as_code())),
        }
    }

    let has_consuming = columns.iter().any(|c| c.ty != TypeCode::AutoInc);
    if !has_consuming && !flat_rows.is_empty() {
        header.push(format!("+{}", flat_rows.len()));
    }
    lines.push(header.join(" "));

    if has_consuming {
        for row in &flat_rows {
            lines.push(encode_row(row, &columns));
        }
    }
    lines.join("\n")
}

/// Split the key union into hoisted constants and active (column) keys.
///
/// A key is constant only when the table has more than one row and the key
/// holds the identical value in every row. Nulls are never hoisted, and
/// neither are values the header's untyped-constant coercion cannot carry
/// back faithfully: numbers that render as `0` or `1` (which would decode
/// as booleans) and non-scalar leaves.
fn split_constants(
    flat_rows: &[Map<String, Value>],
    keys: &BTreeSet<String>,
) -> (Vec<(String, Value)>, Vec<String>) {
    let mut constants = Vec::new();
    let mut active = Vec::new();
    if flat_rows.len() < 2 {
        return (constants, keys.iter().cloned().collect());
    }
    for key in keys {
        let first = flat_rows[0].get(key);
        let same_everywhere = flat_rows.iter().all(|row| row.get(key) == first);
        match first {
            Some(value) if same_everywhere && hoistable(value) => {
                constants.push((key.clone(), value.clone()));
            }
            _ => active.push(key.clone()),
        }
    }
    (constants, active)
}

/// Whether a constant value survives the header round trip.
///
/// The float check matters as much as the integer one: `1.0` renders as
/// `1` in the header, which the untyped coercion reads back as a boolean.
fn hoistable(value: &Value) -> bool {
    match value {
        Value::Null | Value::Array(_) | Value::Object(_) => false,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && f != 1.0),
        _ => true,
    }
}

/// Infer the column descriptor for one active key from its value multiset.
fn infer_column(key: &str, flat_rows: &[Map<String, Value>]) -> Column {
    let values: Vec<Option<&Value>> = flat_rows.iter().map(|row| row.get(key)).collect();
    let non_null: Vec<&Value> = values
        .iter()
        .flatten()
        .filter(|v| !v.is_null())
        .copied()
        .collect();

    let base = infer_type(&non_null);
    let mut column = Column {
        key: key.to_string(),
        ty: base,
        enum_values: None,
        indexed: false,
    };

    if base == TypeCode::Int && is_auto_increment(&values) {
        column.ty = TypeCode::AutoInc;
        return column;
    }

    if base == TypeCode::Str {
        if let Some(strings) = all_strings(&non_null) {
            if let Some((enum_values, indexed)) = detect_enum(&strings, flat_rows.len()) {
                column.enum_values = Some(enum_values);
                column.indexed = indexed;
            } else if average_len(&strings) > 30.0 {
                column.ty = TypeCode::Text;
            }
        }
    }
    column
}

/// Base type from the non-null values: the first value picks the branch,
/// and an integer column downgrades to `n` if any later value is a float.
fn infer_type(non_null: &[&Value]) -> TypeCode {
    let Some(first) = non_null.first() else {
        return TypeCode::Str;
    };
    match first {
        Value::Bool(_) => TypeCode::Bool,
        Value::Number(n) if is_integer(n) => {
            if non_null
                .iter()
                .all(|v| v.as_number().is_some_and(is_integer))
            {
                TypeCode::Int
            } else {
                TypeCode::Num
            }
        }
        Value::Number(_) => TypeCode::Num,
        _ => TypeCode::Str,
    }
}

fn is_integer(n: &serde_json::Number) -> bool {
    n.is_i64() || n.is_u64()
}

/// An auto-increment column must be reconstructible as 1..N by a bare
/// counter: null-free, at least two rows, starting at 1, ascending by
/// exactly one.
fn is_auto_increment(values: &[Option<&Value>]) -> bool {
    if values.len() < 2 {
        return false;
    }
    let ints: Vec<i64> = values
        .iter()
        .map(|v| v.and_then(Value::as_i64))
        .collect::<Option<Vec<i64>>>()
        .unwrap_or_default();
    ints.len() == values.len()
        && ints.first() == Some(&1)
        && ints.windows(2).all(|pair| pair[1] == pair[0] + 1)
}

/// The string views of a column's non-null values, or `None` if any value
/// is not a string (mixed columns skip enum/text refinement).
fn all_strings<'a>(non_null: &[&'a Value]) -> Option<Vec<&'a str>> {
    non_null.iter().map(|v| v.as_str()).collect()
}

fn average_len(strings: &[&str]) -> f64 {
    if strings.is_empty() {
        return 0.0;
    }
    strings.iter().map(|s| s.len()).sum::<usize>() as f64 / strings.len() as f64
}

/// Decide whether a string column is an enum, and whether its cells should
/// carry indices or literals.
///
/// Candidate when the deduped value set has between 2 and 10 members and
/// repeats enough (unique count at most half the non-null count). Indexed
/// form wins when there are at least 3 members and writing literals in
/// every row costs more than the header list plus one small index per row.
fn detect_enum(strings: &[&str], row_count: usize) -> Option<(Vec<String>, bool)> {
    if strings.len() < 2 {
        return None;
    }
    let mut seen = BTreeSet::new();
    let mut unique: Vec<String> = Vec::new();
    for s in strings {
        if seen.insert(*s) {
            unique.push((*s).to_string());
        }
    }
    unique.sort();
    if unique.len() < 2 || unique.len() > strings.len() / 2 || unique.len() > 10 {
        return None;
    }
    let avg_len = unique.iter().map(String::len).sum::<usize>() as f64 / unique.len() as f64;
    let literal_cost = avg_len * row_count as f64;
    let index_cost = (unique.join("|").len() + row_count * 2) as f64;
    let indexed = unique.len() >= 3 && literal_cost > index_cost;
    Some((unique, indexed))
}

/// Emit one body line: cells for every consuming column, space-separated.
fn encode_row(row: &Map<String, Value>, columns: &[Column]) -> String {
    let mut cells: Vec<String> = Vec::new();
    for column in columns {
        if column.ty == TypeCode::AutoInc {
            continue;
        }
        let value = row.get(&column.key).filter(|v| !v.is_null());
        let Some(value) = value else {
            cells.push(NULL_MARKER.to_string());
            continue;
        };
        cells.push(encode_cell(value, column));
    }
    cells.join(" ")
}

fn encode_cell(value: &Value, column: &Column) -> String {
    if let Some(enum_values) = &column.enum_values {
        if column.indexed {
            if let Some(idx) = value.as_str().and_then(|s| {
                enum_values.iter().position(|candidate| candidate == s)
            }) {
                return idx.to_string();
            }
        }
        return encode_token(value, false);
    }
    match (column.ty, value) {
        (TypeCode::Bool, Value::Bool(b)) => {
            let tok = if *b { BOOL_TRUE } else { BOOL_FALSE };
            tok.to_string()
        }
        (TypeCode::Int | TypeCode::Num, Value::Number(n)) => format_number(n),
        (_, Value::Array(items)) => encode_simple_list(items),
        (TypeCode::Text, Value::String(s)) => format!("\"{}\"", s.replace('"', "\\\"")),
        _ => encode_token(value, false),
    }
}

// ============================================================================
// Alias detection
// ============================================================================

/// Discover dotted-path prefixes worth abbreviating, in assignment order.
///
/// Every proper prefix of every multi-segment key is a candidate, scored
/// by net characters saved: `(len - 2) * uses - (len + 4)`, where the
/// subtracted term is the cost of the `%xy=prefix ` definition. Winners
/// are assigned greedily from the highest net, each claiming the keys it
/// covers; a prefix whose unclaimed coverage drops below two keys is
/// skipped. At most 10 aliases per document.
fn detect_aliases(active_keys: &[String]) -> Vec<(String, String)> {
    let mut prefix_counts: BTreeMap<String, usize> = BTreeMap::new();
    for key in active_keys {
        let segments: Vec<&str> = key.split('.').collect();
        if segments.len() < 2 {
            continue;
        }
        for end in 1..segments.len() {
            *prefix_counts
                .entry(segments[..end].join("."))
                .or_insert(0) += 1;
        }
    }

    let mut scored: Vec<(String, i64)> = prefix_counts
        .into_iter()
        .filter_map(|(prefix, count)| {
            let len = prefix.len() as i64;
            let net = (len - 2) * count as i64 - (len + 4);
            (net > 0).then_some((prefix, net))
        })
        .collect();
    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut aliases: Vec<(String, String)> = Vec::new();
    let mut used_names: HashSet<String> = HashSet::new();
    let mut claimed: HashSet<&String> = HashSet::new();
    let mut fallback = 0u8;

    for (prefix, _net) in scored {
        let covered: Vec<&String> = active_keys
            .iter()
            .filter(|key| {
                key.starts_with(&prefix)
                    && key[prefix.len()..].starts_with('.')
                    && !claimed.contains(key)
            })
            .collect();
        if covered.len() < 2 {
            continue;
        }

        let mut name: String = prefix
            .split('.')
            .filter_map(|segment| segment.chars().next())
            .collect::<String>()
            .to_lowercase();
        if name.len() < 2 || used_names.contains(&name) {
            // Collision fallback: single letters a, b, c, … local to this
            // encode call.
            name.clear();
            while fallback < 26 {
                let candidate = char::from(b'a' + fallback).to_string();
                fallback += 1;
                if !used_names.contains(&candidate) {
                    name = candidate;
                    break;
                }
            }
            if name.is_empty() {
                continue;
            }
        }

        used_names.insert(name.clone());
        claimed.extend(covered);
        aliases.push((prefix, name));
        if aliases.len() >= 10 {
            break;
        }
    }
    aliases
}

/// Substitute the first matching alias into a dotted path. A prefix
/// matches the whole path or any `prefix.`-led extension of it.
fn apply_alias(path: &str, aliases: &[(String, String)]) -> String {
    for (prefix, alias) in aliases {
        if path == prefix {
            return format!("%{alias}");
        }
        if path.starts_with(prefix) && path[prefix.len()..].starts_with('.') {
            return format!("%{alias}{}", &path[prefix.len()..]);
        }
    }
    path.to_string()
}

// ============================================================================
// Flattening
// ============================================================================

/// Flatten nested objects into dotted paths. Arrays of any shape stay as
/// single leaves — objects inside arrays are opaque to schema analysis.
fn flatten_object(map: &Map<String, Value>) -> Map<String, Value> {
    let mut flat = Map::new();
    flatten_into(map, "", &mut flat);
    flat
}

fn flatten_into(map: &Map<String, Value>, prefix: &str, out: &mut Map<String, Value>) {
    for (key, value) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Object(inner) => flatten_into(inner, &path, out),
            leaf => {
                out.insert(path, leaf.clone());
            }
        }
    }
}

// ============================================================================
// Inline, list, and token encoding
// ============================================================================

/// Encode an object as one line of space-separated tokens.
///
/// Strings use `key=value` (underscore-encoded); everything else uses
/// `key:` — `y`/`n` booleans, bare numbers, `~` for null, `{…}` for
/// nested objects, `[…]` for arrays.
///
/// ```
/// use zoon_core::encode;
/// let zoon = encode(r#"{"name":"Alice","age":30,"active":true}"#).unwrap();
/// assert_eq!(zoon, "name=Alice age:30 active:y");
/// ```
fn encode_inline(map: &Map<String, Value>) -> String {
    let mut parts: Vec<String> = Vec::new();
    for (key, value) in map {
        match value {
            Value::Object(inner) => parts.push(format!("{key}:{{{}}}", encode_inline(inner))),
            Value::Bool(b) => {
                let tok = if *b { INLINE_BOOL_TRUE } else { INLINE_BOOL_FALSE };
                parts.push(format!("{key}:{tok}"));
            }
            Value::Number(n) => parts.push(format!("{key}:{}", format_number(n))),
            Value::Null => parts.push(format!("{key}:{NULL_MARKER}")),
            Value::Array(items) => parts.push(format!("{key}:{}", encode_simple_list(items))),
            Value::String(s) => parts.push(format!("{key}={}", encode_string(s))),
        }
    }
    parts.join(" ")
}

/// `[v1,v2,v3]` with inline-form scalars.
fn encode_simple_list(items: &[Value]) -> String {
    let encoded: Vec<String> = items.iter().map(|v| encode_token(v, true)).collect();
    format!("[{}]", encoded.join(","))
}

/// Encode a single value token. `inline` selects `y`/`n` booleans (inline
/// and list positions) over the tabular cells' `1`/`0`.
fn encode_token(value: &Value, inline: bool) -> String {
    match value {
        Value::Null => NULL_MARKER.to_string(),
        Value::Bool(b) => match (inline, *b) {
            (true, true) => INLINE_BOOL_TRUE,
            (true, false) => INLINE_BOOL_FALSE,
            (false, true) => BOOL_TRUE,
            (false, false) => BOOL_FALSE,
        }
        .to_string(),
        Value::Number(n) => format_number(n),
        Value::String(s) => encode_string(s),
        Value::Array(items) => encode_simple_list(items),
        Value::Object(map) => format!("{{{}}}", encode_inline(map)),
    }
}

/// The wire form of a string: spaces become underscores. Deliberately
/// lossy for strings that already contain underscores.
fn encode_string(s: &str) -> String {
    s.replace(' ', "_")
}

/// Canonical decimal form: integers as-is, floats via shortest display
/// (whole floats render without a fraction), negative zero normalized.
fn format_number(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) => format!("{f}"),
        None => NULL_MARKER.to_string(),
    }
}
