use luaclear_core::SourceBuffer;
use luaclear_transform::folding::CHAR_CODES;
use luaclear_transform::unroll::RANGE_UNROLL;
use luaclear_transform::{pass, PassConfig, RewriteContext, Transform, CATALOGUE};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Runs every catalogue rule once over `src`.
fn simplify(src: &str, config: &PassConfig) -> (String, usize) {
    let mut cx = RewriteContext::new(config);
    let mut source = SourceBuffer::new(src);
    let rules: Vec<&dyn Transform> = CATALOGUE.iter().map(|r| *r as &dyn Transform).collect();
    pass::run(&mut source, &rules, &mut cx).unwrap();
    (source.into_string(), cx.skips.len())
}

#[test]
fn test_catalogue_order() {
    let names: Vec<_> = CATALOGUE.iter().map(|r| r.name()).collect();
    assert_eq!(
        names,
        [
            "bracket_spacing",
            "function_signature",
            "char_codes",
            "integer_arithmetic",
            "numeric_table_keys",
            "string_index",
            "string_concat",
            "range_unroll",
            "loop_header",
            "conditional_header",
            "loadstring",
            "trailing_whitespace",
        ]
    );
}

#[test]
fn test_char_codes_spell_hello() {
    init_tracing();
    let out = CHAR_CODES
        .rewrite("string.char(72,101,108,108,111)", &PassConfig::default())
        .unwrap();
    assert_eq!(out.text, "\"Hello\"");
}

#[test]
fn test_range_expands_to_three_assignments() {
    init_tracing();
    let out = RANGE_UNROLL
        .rewrite("for i = 1, 3 do end", &PassConfig::default())
        .unwrap();
    assert_eq!(out.text.lines().collect::<Vec<_>>(), ["i = 1", "i = 2", "i = 3"]);
}

#[test]
fn test_folded_bounds_unroll() {
    init_tracing();
    let (out, skips) = simplify("for i = 1, 1 + 1 do go( i ) end", &PassConfig::default());
    assert_eq!(out, "i = 1\ngo(i)\ni = 2\ngo(i)");
    assert_eq!(skips, 0);
}

#[test]
fn test_capped_loop_header_still_erased() {
    init_tracing();
    let config = PassConfig {
        max_unroll: Some(10),
        ..Default::default()
    };
    let (out, skips) = simplify("for i = 1, 100 do f(i) end", &config);
    assert_eq!(out, "for i = ... do f(i) end");
    assert_eq!(skips, 1);
}

#[test]
fn test_rules_leave_strings_alone() {
    init_tracing();
    let src = r#"print("string.char(65) 1 + 2 if (x) then")"#;
    let (out, _) = simplify(src, &PassConfig::default());
    assert_eq!(out, src);
}

#[test]
fn test_obfuscated_snippet() {
    init_tracing();
    let src = "local t = {[1] = string.char(104, 105), [2] = \"a\" .. \"b\"}   \n\
               if (t[1] == game[\"x\"]) then loadstring(t[2])() end";
    let (out, _) = simplify(src, &PassConfig::default());
    assert_eq!(
        out,
        "local t = {\"hi\", \"ab\"}\n\
         if condition then\n-- Decompiled loadstring: t[2]\n end"
    );
}

#[test]
fn test_partial_condition_parentheses_keep_statements() {
    init_tracing();
    let src = "if (a + b) > c then foo() end if (d) then bar() end";
    let (out, _) = simplify(src, &PassConfig::default());
    assert_eq!(out, "if (a + b) > c then foo() end if condition then bar() end");
}

#[test]
fn test_extreme_range_is_skipped() {
    init_tracing();
    let config = PassConfig {
        max_unroll: Some(10),
        ..Default::default()
    };
    let (out, skips) = simplify(
        "for i = -9223372036854775808, 9223372036854775807 do x() end",
        &config,
    );
    assert_eq!(out, "for i = ... do x() end");
    assert_eq!(skips, 1);
}

#[test]
fn test_dots_literal_between_strings_kept() {
    init_tracing();
    let src = r#"a = "foo" b = ".." c = "bar""#;
    let (out, _) = simplify(src, &PassConfig::default());
    assert_eq!(out, src);
}
