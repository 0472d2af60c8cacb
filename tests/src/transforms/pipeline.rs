use luaclear_transform::deobfuscator::{
    create_report, deobfuscate_file, deobfuscate_source, presets, DeobfuscationConfig,
};
use luaclear_transform::rules_from_names;
use luaclear_utils::errors::DeobfuscateError;
use regex::Regex;
use std::fs;
use tempfile::TempDir;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

const SAMPLE: &str = "local a = 1\nfunction f() end\nlocal s = \"ab\" .. \"cd\"";

#[test]
fn test_end_to_end_rename_and_fold() {
    init_tracing();
    let result = deobfuscate_source(SAMPLE, &presets::full()).unwrap();
    let out = &result.output;

    let var = result.variables.get("a").unwrap();
    let func = result.functions.get("f").unwrap();
    assert_ne!(var, func);
    assert!(out.contains(&format!("local {var} = 1")), "{out}");
    assert!(out.contains(&format!("function {func}()")), "{out}");
    assert!(out.contains("\"abcd\""), "{out}");

    for original in ["a", "f"] {
        let standalone = Regex::new(&format!(r"\b{original}\b")).unwrap();
        assert!(!standalone.is_match(out), "`{original}` left in {out}");
    }
    assert_eq!(
        out,
        "local var_1 = 1\nfunction func_1()\nend\nlocal var_2 = \"abcd\"\n"
    );
}

#[test]
fn test_pipeline_is_idempotent_on_its_output() {
    init_tracing();
    let first = deobfuscate_source(SAMPLE, &presets::full()).unwrap();
    let second = deobfuscate_source(&first.output, &presets::full()).unwrap();
    assert_eq!(first.output, second.output);
    assert!(second.metadata.rules_applied.is_empty());
}

#[test]
fn test_name_declared_as_local_and_function_renames_once() {
    init_tracing();
    let src = "local f = 1\nfunction f() end";
    let first = deobfuscate_source(src, &presets::full()).unwrap();
    assert_eq!(first.output, "local var_1 = 1\nfunction var_1()\nend\n");
    assert!(first.functions.is_empty());

    let second = deobfuscate_source(&first.output, &presets::full()).unwrap();
    assert_eq!(second.output, first.output);
}

#[test]
fn test_stage_order_decode_before_rename() {
    init_tracing();
    // the decoded literal carries a declaration-shaped string, so it must be cataloged too
    let src = "local code = base64.decode(\"bG9jYWwgeiA9IDE=\")\nprint(code)";
    let result = deobfuscate_source(src, &presets::rename_only()).unwrap();
    assert_eq!(result.metadata.literals_decoded, 1);
    assert_eq!(result.variables.get("code"), Some("var_1"));
    assert_eq!(result.variables.get("z"), Some("var_2"));
    assert_eq!(
        result.output,
        "local var_1 = \"local var_2 = 1\"\nprint(var_1)\n"
    );
}

#[test]
fn test_skips_are_reported_not_fatal() {
    init_tracing();
    let src = "local x = base64.decode(\"!!\")\nlocal y = string.char(999)";
    let result = deobfuscate_source(src, &presets::full()).unwrap();

    assert!(result.output.contains("base64.decode(\"!!\")"));
    assert!(result.output.contains("string.char(999)"));
    let rules: Vec<_> = result.metadata.skips.iter().map(|s| s.rule.as_str()).collect();
    assert_eq!(rules, ["base64", "char_codes"]);

    let report = create_report(&result);
    assert_eq!(report["skips"].as_array().map(Vec::len), Some(2));
}

#[test]
fn test_deobfuscate_file_and_missing_file() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("in.lua");
    fs::write(&path, "local q = 2 + 3").unwrap();

    let result = deobfuscate_file(&path, &presets::full()).unwrap();
    assert_eq!(result.output, "local var_1 = 5\n");
    assert_eq!(result.source.byte_length, 15);
    assert_eq!(result.source.keccak_hash.len(), 64);

    let err = deobfuscate_file(tmp.path().join("missing.lua"), &presets::full()).unwrap_err();
    assert!(matches!(err, DeobfuscateError::Input(_)));
}

#[test]
fn test_selected_rules_only() {
    init_tracing();
    let config = DeobfuscationConfig {
        rules: rules_from_names(&["string_concat"]).unwrap(),
        ..Default::default()
    };
    let result = deobfuscate_source("x = \"a\" .. \"b\"\ny = 1 + 2", &config).unwrap();
    assert_eq!(result.output, "x = \"ab\"\ny = 1 + 2\n");
}

#[test]
fn test_custom_prefixes() {
    init_tracing();
    let config = DeobfuscationConfig {
        variable_prefix: "v".into(),
        function_prefix: "fn".into(),
        ..Default::default()
    };
    let result = deobfuscate_source("local k = 0\nfunction go() return k end", &config).unwrap();
    assert_eq!(result.output, "local v_1 = 0\nfunction fn_1()\n    return v_1\nend\n");
}

#[test]
fn test_invalid_prefix_is_fatal() {
    init_tracing();
    let config = DeobfuscationConfig {
        variable_prefix: "9lives".into(),
        ..Default::default()
    };
    let err = deobfuscate_source("local k = 0", &config).unwrap_err();
    assert!(matches!(err, DeobfuscateError::Rename(_)));
}
