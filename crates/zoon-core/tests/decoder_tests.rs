/// Decoder contract tests: header grammar, row materialization,
/// unflattening, constant merging, and the permissive degradation rules.
use serde_json::{json, Value};
use zoon_core::{decode, decode_value};

// ============================================================================
// Top-level dispatch
// ============================================================================

#[test]
fn decode_empty_input_is_null() {
    assert_eq!(decode_value(""), Value::Null);
    assert_eq!(decode_value("   \n\t  "), Value::Null);
}

#[test]
fn decode_returns_minified_json() {
    let out = decode("# id:i+ name:s\nAlice\nBob").unwrap();
    assert_eq!(out, r#"[{"id":1,"name":"Alice"},{"id":2,"name":"Bob"}]"#);
}

// ============================================================================
// Tabular documents
// ============================================================================

#[test]
fn decode_simple_tabular() {
    let zoon = "# id:i+ name:s role=admin|user\nAlice admin\nBob user\nCarol user";
    let value = decode_value(zoon);
    assert_eq!(
        value,
        json!([
            {"id": 1, "name": "Alice", "role": "admin"},
            {"id": 2, "name": "Bob", "role": "user"},
            {"id": 3, "name": "Carol", "role": "user"}
        ])
    );
}

#[test]
fn decode_null_marker() {
    let zoon = "# name:s value:s\nAlice test\nBob ~";
    assert_eq!(
        decode_value(zoon),
        json!([
            {"name": "Alice", "value": "test"},
            {"name": "Bob", "value": null}
        ])
    );
}

#[test]
fn decode_boolean_cells() {
    let zoon = "# name:s active:b\nAlice 1\nBob 0";
    assert_eq!(
        decode_value(zoon),
        json!([
            {"name": "Alice", "active": true},
            {"name": "Bob", "active": false}
        ])
    );
}

#[test]
fn decode_number_cells() {
    let zoon = "# name:s price:n\nWidget 19.99\nGadget 29.50";
    assert_eq!(
        decode_value(zoon),
        json!([
            {"name": "Widget", "price": 19.99},
            {"name": "Gadget", "price": 29.5}
        ])
    );
}

#[test]
fn decode_integer_cells() {
    let zoon = "# count:i\n5\n-3";
    assert_eq!(decode_value(zoon), json!([{"count": 5}, {"count": -3}]));
}

#[test]
fn decode_unparseable_number_keeps_raw_token() {
    let zoon = "# v:i\nabc";
    assert_eq!(decode_value(zoon), json!([{"v": "abc"}]));
}

#[test]
fn decode_short_rows_fill_with_null() {
    let zoon = "# a:s b:s c:s\nonly";
    assert_eq!(
        decode_value(zoon),
        json!([{"a": "only", "b": null, "c": null}])
    );
}

#[test]
fn decode_skips_blank_row_lines() {
    let zoon = "# a:s\n\nx\n\ny";
    assert_eq!(decode_value(zoon), json!([{"a": "x"}, {"a": "y"}]));
}

#[test]
fn decode_skips_unrecognized_header_parts() {
    let zoon = "# a:s junk b:i\nx 1";
    assert_eq!(decode_value(zoon), json!([{"a": "x", "b": 1}]));
}

#[test]
fn decode_unknown_type_code_as_string() {
    let zoon = "# a:q\nfoo_bar";
    assert_eq!(decode_value(zoon), json!([{"a": "foo bar"}]));
}

#[test]
fn decode_bracketed_cells_as_lists() {
    let zoon = "# id:i+ tags:s\n[a,b]\n[c]\n[]";
    assert_eq!(
        decode_value(zoon),
        json!([
            {"id": 1, "tags": ["a", "b"]},
            {"id": 2, "tags": ["c"]},
            {"id": 3, "tags": []}
        ])
    );
}

#[test]
fn decode_list_cells_use_the_scalar_cascade() {
    let zoon = "# v:s\n[1,2.5,y,~,two_words]";
    assert_eq!(
        decode_value(zoon),
        json!([{"v": [1, 2.5, true, null, "two words"]}])
    );
}

// ============================================================================
// Enum columns
// ============================================================================

#[test]
fn decode_indexed_enum() {
    let zoon = "# s!alpha|beta|gamma\n0\n2\n1";
    assert_eq!(
        decode_value(zoon),
        json!([{"s": "alpha"}, {"s": "gamma"}, {"s": "beta"}])
    );
}

#[test]
fn decode_indexed_enum_out_of_range_falls_back_to_literal() {
    let zoon = "# s!a|b\n7\nx_y";
    assert_eq!(decode_value(zoon), json!([{"s": "7"}, {"s": "x y"}]));
}

#[test]
fn decode_enum_values_underscore_decoded() {
    let zoon = "# mode=fast_lane|slow\nfast_lane\nslow";
    assert_eq!(
        decode_value(zoon),
        json!([{"mode": "fast lane"}, {"mode": "slow"}])
    );
}

#[test]
fn decode_indexed_enum_header_values_underscore_decoded() {
    let zoon = "# tier!free_plan|pro_plan\n1\n0";
    assert_eq!(
        decode_value(zoon),
        json!([{"tier": "pro plan"}, {"tier": "free plan"}])
    );
}

// ============================================================================
// Auto-increment and explicit row counts
// ============================================================================

#[test]
fn decode_auto_increment_counts_from_one() {
    let zoon = "# id:i+ name:s\nAlice\nBob\nCarol";
    assert_eq!(
        decode_value(zoon),
        json!([
            {"id": 1, "name": "Alice"},
            {"id": 2, "name": "Bob"},
            {"id": 3, "name": "Carol"}
        ])
    );
}

#[test]
fn decode_explicit_row_count_synthesizes_rows() {
    let zoon = "# @status=static id:i+ +3";
    assert_eq!(
        decode_value(zoon),
        json!([
            {"id": 1, "status": "static"},
            {"id": 2, "status": "static"},
            {"id": 3, "status": "static"}
        ])
    );
}

// ============================================================================
// Constants
// ============================================================================

#[test]
fn decode_constants_merge_into_every_row() {
    let zoon = "# @region=us-east-1 @status=ok id:i+ +2";
    assert_eq!(
        decode_value(zoon),
        json!([
            {"id": 1, "region": "us-east-1", "status": "ok"},
            {"id": 2, "region": "us-east-1", "status": "ok"}
        ])
    );
}

#[test]
fn decode_constant_string_underscores() {
    let zoon = "# @msg=hello_world x:s\nv";
    assert_eq!(decode_value(zoon), json!([{"msg": "hello world", "x": "v"}]));
}

#[test]
fn decode_untyped_constant_coercion() {
    let zoon = "# @a:y @b:n @c:5 @d:2.5 x:s\nv";
    assert_eq!(
        decode_value(zoon),
        json!([{"a": true, "b": false, "c": 5, "d": 2.5, "x": "v"}])
    );
}

#[test]
fn decode_untyped_constant_one_and_zero_are_booleans() {
    let zoon = "# @g:1 @h:0 x:s\nv";
    assert_eq!(decode_value(zoon), json!([{"g": true, "h": false, "x": "v"}]));
}

#[test]
fn decode_nested_constant_paths() {
    let zoon = "# @meta.version=2.1.0 id:i+ +2";
    assert_eq!(
        decode_value(zoon),
        json!([
            {"id": 1, "meta": {"version": "2.1.0"}},
            {"id": 2, "meta": {"version": "2.1.0"}}
        ])
    );
}

// ============================================================================
// Aliases and unflattening
// ============================================================================

#[test]
fn decode_alias_prefix_resolution() {
    let zoon = "%ab=metrics.cpu\n# %ab.load:n %ab.temp:n\n0.5 70";
    assert_eq!(
        decode_value(zoon),
        json!([{"metrics": {"cpu": {"load": 0.5, "temp": 70}}}])
    );
}

#[test]
fn decode_alias_matching_whole_key() {
    let zoon = "%ab=metrics\n# %ab:s\nhot";
    assert_eq!(decode_value(zoon), json!([{"metrics": "hot"}]));
}

#[test]
fn decode_multiple_aliases_on_one_line() {
    let zoon = "%aa=left.side %bb=right.side\n# %aa.k:s %bb.k:s\n1 2";
    assert_eq!(
        decode_value(zoon),
        json!([{
            "left": {"side": {"k": "1"}},
            "right": {"side": {"k": "2"}}
        }])
    );
}

#[test]
fn decode_unknown_alias_left_verbatim() {
    let zoon = "# %zz.x:s\nv";
    assert_eq!(decode_value(zoon), json!([{"%zz": {"x": "v"}}]));
}

#[test]
fn decode_deep_dotted_paths_unflatten() {
    let zoon = "# a.b.c:i a.b.d:s\n1 x\n2 y";
    assert_eq!(
        decode_value(zoon),
        json!([
            {"a": {"b": {"c": 1, "d": "x"}}},
            {"a": {"b": {"c": 2, "d": "y"}}}
        ])
    );
}

// ============================================================================
// Text cells
// ============================================================================

#[test]
fn decode_quoted_text_cell_keeps_spaces() {
    let zoon = "# id:i+ note:t\n\"hello world out there\"";
    assert_eq!(
        decode_value(zoon),
        json!([{"id": 1, "note": "hello world out there"}])
    );
}

#[test]
fn decode_quoted_text_cell_unescapes_quotes() {
    let zoon = "# note:t\n\"say \\\"hi\\\" twice\"";
    assert_eq!(decode_value(zoon), json!([{"note": "say \"hi\" twice"}]));
}

#[test]
fn decode_text_preserves_underscores() {
    let zoon = "# n:t\n\"a_b\"";
    assert_eq!(decode_value(zoon), json!([{"n": "a_b"}]));
}

#[test]
fn decode_quoted_cell_followed_by_more_columns() {
    let zoon = "# note:t id:i\n\"two words\" 9";
    assert_eq!(decode_value(zoon), json!([{"note": "two words", "id": 9}]));
}

#[test]
fn decode_unquoted_text_cell_falls_back_to_string_transform() {
    let zoon = "# n:t\nplain_token";
    assert_eq!(decode_value(zoon), json!([{"n": "plain token"}]));
}

// ============================================================================
// Inline documents
// ============================================================================

#[test]
fn decode_inline_object() {
    let zoon = "name=Alice age:30 active:y email:~";
    assert_eq!(
        decode_value(zoon),
        json!({"name": "Alice", "age": 30, "active": true, "email": null})
    );
}

#[test]
fn decode_inline_nested_braces() {
    let zoon = "user:{name=Alice settings:{theme=dark}} debug:n";
    assert_eq!(
        decode_value(zoon),
        json!({
            "user": {"name": "Alice", "settings": {"theme": "dark"}},
            "debug": false
        })
    );
}

#[test]
fn decode_inline_list_value() {
    let zoon = "tags:[a,b] n:3";
    assert_eq!(decode_value(zoon), json!({"tags": ["a", "b"], "n": 3}));
}

#[test]
fn decode_inline_number_forms() {
    let zoon = "a:30 b:1.5 c:-2";
    assert_eq!(decode_value(zoon), json!({"a": 30, "b": 1.5, "c": -2}));
}

#[test]
fn decode_inline_underscored_string() {
    let zoon = "msg=hello_world";
    assert_eq!(decode_value(zoon), json!({"msg": "hello world"}));
}

#[test]
fn decode_inline_skips_stray_tokens() {
    let zoon = "stray name=x";
    assert_eq!(decode_value(zoon), json!({"name": "x"}));
}

#[test]
fn decode_inline_empty_nested_object() {
    let zoon = "cfg:{}";
    assert_eq!(decode_value(zoon), json!({"cfg": {}}));
}

// ============================================================================
// Simple lists
// ============================================================================

#[test]
fn decode_simple_list_scalars() {
    assert_eq!(decode_value("[1,2,3]"), json!([1, 2, 3]));
    assert_eq!(decode_value("[1.5,2.5]"), json!([1.5, 2.5]));
    assert_eq!(decode_value("[y,n,~]"), json!([true, false, null]));
    assert_eq!(decode_value("[hi_there,bye]"), json!(["hi there", "bye"]));
}

#[test]
fn decode_empty_list() {
    assert_eq!(decode_value("[]"), json!([]));
}

#[test]
fn decode_simple_list_trims_elements() {
    assert_eq!(decode_value("[ 1 , 2 ]"), json!([1, 2]));
}
