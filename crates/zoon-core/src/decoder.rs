//! ZOON Decoder — rebuilds values from header-plus-rows text.
//!
//! The decoder is maximally permissive: malformed tokens degrade to raw
//! string values instead of raising. It recovers the schema entirely from
//! the document itself — alias lines (`%ab=some.prefix`), the `#` header
//! (constants, typed columns, enum lists, `+N` row counts), then one row
//! per line — and reverses the encoder's flattening by splitting dotted
//! paths back into nested objects and deep-merging hoisted constants into
//! every row.
//!
//! # Key design decisions
//!
//! - **Quote-aware row tokenization**: `t` cells are quoted and may contain
//!   spaces, so rows cannot be split blindly on whitespace; a `"…"` run
//!   (with `\"` escapes) is one token.
//! - **Untyped constant coercion**: `@key:v` constants carry no type code,
//!   so the value is coerced by cascade — `y`/`1` true, `n`/`0` false,
//!   integer, float, fallback string.
//! - **Counter-driven auto-increment**: `i+` columns consume no tokens;
//!   each row takes the next value of a per-column counter starting at 1.

use std::collections::HashMap;

use serde_json::{Map, Number, Value};

use crate::error::Result;
use crate::types::{Column, TypeCode, BOOL_TRUE, NULL_MARKER};

/// Decode a ZOON string into minified JSON.
///
/// ```
/// use zoon_core::decode;
/// let json = decode("# id:i+ name:s\nAlice\nBob").unwrap();
/// assert_eq!(json, r#"[{"id":1,"name":"Alice"},{"id":2,"name":"Bob"}]"#);
/// ```
pub fn decode(zoon: &str) -> Result<String> {
    Ok(serde_json::to_string(&decode_value(zoon))?)
}

/// Decode a ZOON string into a value. Total — never fails on any input.
///
/// Dispatch: empty input is null; leading `%` lines register aliases; the
/// first `#` line starts a tabular document; otherwise a leading `[` means
/// a simple list and anything else is read as the inline object form.
pub fn decode_value(zoon: &str) -> Value {
    let input = zoon.trim();
    if input.is_empty() {
        return Value::Null;
    }

    let lines: Vec<&str> = input.lines().collect();
    let mut aliases: HashMap<String, String> = HashMap::new();
    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with('%') {
            parse_alias_line(line, &mut aliases);
            continue;
        }
        if line.starts_with('#') {
            return decode_tabular(&lines[i..], &aliases);
        }
        break;
    }

    if input.starts_with('[') {
        return decode_simple_list(input);
    }
    decode_inline(input)
}

/// Register `%name=prefix` definitions from one alias line.
fn parse_alias_line(line: &str, aliases: &mut HashMap<String, String>) {
    for token in line.split_whitespace() {
        if let Some((name, prefix)) = token.split_once('=') {
            if let Some(name) = name.strip_prefix('%') {
                aliases.insert(name.to_string(), prefix.to_string());
            }
        }
    }
}

// ============================================================================
// Tabular decoding
// ============================================================================

/// Decode a header line plus row lines into an array of objects.
fn decode_tabular(lines: &[&str], aliases: &HashMap<String, String>) -> Value {
    let Some(header_line) = lines.first() else {
        return Value::Array(Vec::new());
    };
    let (columns, constants, explicit_rows) = parse_header(header_line, aliases);
    let constant_obj = unflatten(&constants);

    let mut counters = vec![0i64; columns.len()];
    let mut rows: Vec<Value> = Vec::new();

    if explicit_rows > 0 {
        for _ in 0..explicit_rows {
            rows.push(materialize_row(&[], &columns, &mut counters, &constant_obj));
        }
    } else {
        for line in &lines[1..] {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let tokens = tokenize_row(line);
            rows.push(materialize_row(&tokens, &columns, &mut counters, &constant_obj));
        }
    }
    Value::Array(rows)
}

/// Parse the `#` header line into columns, hoisted constants, and an
/// optional explicit row count.
///
/// Header parts are classified by shape, in precedence order: `+N` row
/// count, `@key…` constant, `:i+` auto-increment, `!`-separated indexed
/// enum, `=`-separated literal enum, `:`-typed column. Parts matching no
/// shape are skipped.
fn parse_header(
    header_line: &str,
    aliases: &HashMap<String, String>,
) -> (Vec<Column>, Map<String, Value>, usize) {
    let body = header_line.trim().trim_start_matches('#').trim();
    let mut columns: Vec<Column> = Vec::new();
    let mut constants: Map<String, Value> = Map::new();
    let mut explicit_rows = 0usize;

    for part in body.split_whitespace() {
        if let Some(count) = part.strip_prefix('+') {
            if let Ok(n) = count.parse::<usize>() {
                explicit_rows = n;
                continue;
            }
        }

        if let Some(rest) = part.strip_prefix('@') {
            if let Some((key, value)) = rest.split_once('=') {
                let key = resolve_alias(key, aliases);
                constants.insert(key, Value::String(decode_string(value)));
            } else if let Some((key, value)) = rest.split_once(':') {
                let key = resolve_alias(key, aliases);
                constants.insert(key, coerce_untyped(value));
            }
            continue;
        }

        if part.contains(":i+") {
            let key = part.split_once(':').map_or(part, |(key, _)| key);
            columns.push(Column {
                key: resolve_alias(key, aliases),
                ty: TypeCode::AutoInc,
                enum_values: None,
                indexed: false,
            });
        } else if let Some((key, listed)) = part.split_once('!') {
            columns.push(enum_column(resolve_alias(key, aliases), listed, true));
        } else if let Some((key, listed)) = part.split_once('=') {
            columns.push(enum_column(resolve_alias(key, aliases), listed, false));
        } else if let Some((key, code)) = part.split_once(':') {
            columns.push(Column {
                key: resolve_alias(key, aliases),
                ty: TypeCode::from_code(code),
                enum_values: None,
                indexed: false,
            });
        }
    }
    (columns, constants, explicit_rows)
}

fn enum_column(key: String, listed: &str, indexed: bool) -> Column {
    Column {
        key,
        ty: TypeCode::Str,
        enum_values: Some(listed.split('|').map(str::to_string).collect()),
        indexed,
    }
}

/// Expand a `%`-prefixed key against the alias table. Unknown aliases
/// leave the key verbatim.
fn resolve_alias(key: &str, aliases: &HashMap<String, String>) -> String {
    if let Some(rest) = key.strip_prefix('%') {
        if let Some((name, suffix)) = rest.split_once('.') {
            if let Some(prefix) = aliases.get(name) {
                return format!("{prefix}.{suffix}");
            }
        } else if let Some(prefix) = aliases.get(rest) {
            return prefix.clone();
        }
    }
    key.to_string()
}

/// Coerce an untyped `@key:value` constant: `y`/`1` and `n`/`0` are
/// booleans, then integer, then float, then the raw string.
fn coerce_untyped(value: &str) -> Value {
    match value {
        "y" | "1" => return Value::Bool(true),
        "n" | "0" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(i) = value.parse::<i64>() {
        return Value::Number(Number::from(i));
    }
    if let Ok(f) = value.parse::<f64>() {
        if let Some(n) = Number::from_f64(f) {
            return Value::Number(n);
        }
    }
    Value::String(value.to_string())
}

/// Split a row line into tokens on whitespace, keeping quoted `"…"` runs
/// (with `\"` escapes) together as single tokens.
fn tokenize_row(line: &str) -> Vec<String> {
    let bytes = line.as_bytes();
    let mut tokens: Vec<String> = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_whitespace() {
            i += 1;
            continue;
        }
        let start = i;
        if bytes[i] == b'"' {
            i += 1;
            while i < bytes.len() {
                if bytes[i] == b'\\' {
                    i += 2;
                } else if bytes[i] == b'"' {
                    i += 1;
                    break;
                } else {
                    i += 1;
                }
            }
            i = i.min(bytes.len());
        } else {
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
        }
        tokens.push(line[start..i].to_string());
    }
    tokens
}

/// Build one row object: consume a token per non-auto-increment column,
/// unflatten the dotted keys, then deep-merge the constants on top.
/// Columns left without tokens become null.
fn materialize_row(
    tokens: &[String],
    columns: &[Column],
    counters: &mut [i64],
    constant_obj: &Map<String, Value>,
) -> Value {
    let mut flat: Map<String, Value> = Map::new();
    let mut next = 0usize;
    for (idx, column) in columns.iter().enumerate() {
        if column.ty == TypeCode::AutoInc {
            counters[idx] += 1;
            flat.insert(column.key.clone(), Value::Number(Number::from(counters[idx])));
            continue;
        }
        let value = match tokens.get(next) {
            Some(token) => {
                next += 1;
                decode_cell(token, column)
            }
            None => Value::Null,
        };
        flat.insert(column.key.clone(), value);
    }

    let mut row = unflatten(&flat);
    deep_merge(&mut row, constant_obj);
    Value::Object(row)
}

/// Interpret one cell token under its column. A string-typed cell that
/// reads as `[…]` is a simple list — the row writer emits array leaves
/// that way, so the cell reader must take them back.
fn decode_cell(token: &str, column: &Column) -> Value {
    if token == NULL_MARKER {
        return Value::Null;
    }
    if let Some(enum_values) = &column.enum_values {
        if column.indexed {
            if let Some(value) = token
                .parse::<usize>()
                .ok()
                .and_then(|idx| enum_values.get(idx))
            {
                return Value::String(decode_string(value));
            }
        }
        return Value::String(decode_string(token));
    }
    match column.ty {
        TypeCode::Bool => Value::Bool(token == BOOL_TRUE),
        TypeCode::Int | TypeCode::Num => decode_number(token),
        TypeCode::Text => decode_text(token),
        _ => {
            if token.starts_with('[') && token.ends_with(']') {
                return decode_simple_list(token);
            }
            Value::String(decode_string(token))
        }
    }
}

/// `.` selects float parsing, otherwise integer; parse failures keep the
/// raw token as a string.
fn decode_number(token: &str) -> Value {
    if token.contains('.') {
        if let Some(n) = token.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    } else if let Ok(i) = token.parse::<i64>() {
        return Value::Number(Number::from(i));
    } else if let Ok(u) = token.parse::<u64>() {
        return Value::Number(Number::from(u));
    }
    Value::String(token.to_string())
}

/// A quoted `t` cell unescapes verbatim (underscores survive); an
/// unquoted one falls back to the plain string transform.
fn decode_text(token: &str) -> Value {
    if token.len() >= 2 && token.starts_with('"') && token.ends_with('"') {
        let inner = &token[1..token.len() - 1];
        return Value::String(inner.replace("\\\"", "\""));
    }
    Value::String(decode_string(token))
}

// ============================================================================
// Unflattening and merging
// ============================================================================

/// Rebuild nesting from dotted keys: `a.b.c` walks/creates intermediate
/// objects. On a path collision (a segment already holding a non-object)
/// the right-most assignment wins.
fn unflatten_insert(cursor: &mut Map<String, Value>, segments: &[&str], leaf: &str, value: Value) {
    let Some((segment, rest)) = segments.split_first() else {
        cursor.insert(leaf.to_string(), value);
        return;
    };
    let slot = cursor
        .entry(segment.to_string())
        .or_insert_with(|| Value::Object(Map::new()));
    if !slot.is_object() {
        *slot = Value::Object(Map::new());
    }
    let Value::Object(inner) = slot else {
        return;
    };
    unflatten_insert(inner, rest, leaf, value);
}

fn unflatten(flat: &Map<String, Value>) -> Map<String, Value> {
    let mut root: Map<String, Value> = Map::new();
    for (path, value) in flat {
        let mut segments: Vec<&str> = path.split('.').collect();
        let Some(leaf) = segments.pop() else {
            continue;
        };
        unflatten_insert(&mut root, &segments, leaf, value.clone());
    }
    root
}

/// Recursive map union: where both sides hold objects, recurse; otherwise
/// the source wins.
fn deep_merge(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        match (target.get_mut(key), incoming) {
            (Some(Value::Object(existing)), Value::Object(nested)) => {
                deep_merge(existing, nested);
            }
            _ => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

// ============================================================================
// Inline and simple-list decoding
// ============================================================================

/// Decode the one-line object form: `key:value` / `key=value` tokens,
/// with `{…}` recursing into a nested object. Text between recognizable
/// tokens is skipped.
fn decode_inline(input: &str) -> Value {
    let bytes = input.as_bytes();
    let mut map: Map<String, Value> = Map::new();
    let mut i = 0;
    while i < bytes.len() {
        if !is_ident_byte(bytes[i]) {
            i += 1;
            continue;
        }
        let key_start = i;
        while i < bytes.len() && is_ident_byte(bytes[i]) {
            i += 1;
        }
        let key = &input[key_start..i];
        if i >= bytes.len() || (bytes[i] != b':' && bytes[i] != b'=') {
            continue;
        }
        i += 1;

        if i < bytes.len() && bytes[i] == b'{' {
            match matching_brace(bytes, i) {
                Some(close) => {
                    let inner = &input[i + 1..close];
                    map.insert(key.to_string(), decode_inline(inner));
                    i = close + 1;
                }
                // Unbalanced braces: nothing else can parse reliably.
                None => break,
            }
        } else {
            let value_start = i;
            while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i > value_start {
                map.insert(key.to_string(), decode_scalar(&input[value_start..i]));
            }
        }
    }
    Value::Object(map)
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Index of the `}` closing the `{` at `open`, tracking nesting.
fn matching_brace(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decode `[v1,v2,v3]` into an array of scalars.
fn decode_simple_list(input: &str) -> Value {
    let inner = input.strip_prefix('[').unwrap_or(input);
    let inner = inner.strip_suffix(']').unwrap_or(inner);
    if inner.is_empty() {
        return Value::Array(Vec::new());
    }
    Value::Array(inner.split(',').map(|item| decode_scalar(item.trim())).collect())
}

/// The shared scalar cascade for inline values and list elements:
/// booleans, null, nested list, integer, float (token contains `.`),
/// else underscore-decoded string.
fn decode_scalar(token: &str) -> Value {
    match token {
        "y" | "yes" | "true" => return Value::Bool(true),
        "n" | "no" | "false" => return Value::Bool(false),
        NULL_MARKER => return Value::Null,
        _ => {}
    }
    if token.starts_with('[') && token.ends_with(']') {
        return decode_simple_list(token);
    }
    if token.contains('.') {
        if let Some(n) = token.parse::<f64>().ok().and_then(Number::from_f64) {
            return Value::Number(n);
        }
    } else if let Ok(i) = token.parse::<i64>() {
        return Value::Number(Number::from(i));
    } else if let Ok(u) = token.parse::<u64>() {
        return Value::Number(Number::from(u));
    }
    Value::String(decode_string(token))
}

/// Reverse of the wire string form: underscores become spaces.
fn decode_string(s: &str) -> String {
    s.replace('_', " ")
}
