use luaclear_core::catalog::find_identifiers;
use luaclear_core::rename::RenameMap;
use luaclear_core::{IdentKind, SourceBuffer};
use luaclear_utils::errors::RenameError;
use std::collections::HashSet;

/// Catalogs and renames variables, then functions.
fn rename_all(text: &str) -> String {
    let source = SourceBuffer::new(text);
    let catalog = find_identifiers(&source);
    let vars = RenameMap::build(IdentKind::Variable, "var", catalog.variable_names()).unwrap();
    let funcs = RenameMap::build(IdentKind::Function, "func", catalog.function_names()).unwrap();
    let renamed = vars.apply(&source).unwrap();
    funcs.apply(&renamed).unwrap().into_string()
}

#[test]
fn test_mapping_is_injective() {
    let names = ["q", "w", "q", "e", "r", "w", "t"];
    let map = RenameMap::build(IdentKind::Variable, "var", names).unwrap();

    let synthetic: HashSet<_> = map.iter().map(|(_, s)| s).collect();
    assert_eq!(synthetic.len(), map.len());
    assert_eq!(map.len(), 5);
    assert_eq!(
        map.iter().map(|(o, _)| o).collect::<Vec<_>>(),
        ["q", "w", "e", "r", "t"]
    );
}

#[test]
fn test_whole_token_matching() {
    let map = RenameMap::build(IdentKind::Variable, "var", ["x"]).unwrap();
    let out = map
        .apply(&SourceBuffer::new("x = max(x1, _x, x) + x.y"))
        .unwrap();
    assert_eq!(out.as_str(), "var_1 = max(x1, _x, var_1) + var_1.y");
}

#[test]
fn test_rename_is_idempotent() {
    let src = "local a = 1\nlocal bb = a + 1\nfunction f(n) return n * bb end\nprint(f(a))";
    let once = rename_all(src);
    let twice = rename_all(&once);

    assert_eq!(
        once,
        "local var_1 = 1\nlocal var_2 = var_1 + 1\nfunction func_1(n) return n * var_2 end\nprint(func_1(var_1))"
    );
    assert_eq!(once, twice);
}

#[test]
fn test_conflict_is_an_error_and_input_untouched() {
    let source = SourceBuffer::new("local a = var_1");
    let map = RenameMap::build(IdentKind::Variable, "var", ["a"]).unwrap();

    let err = map.apply(&source).unwrap_err();
    assert!(matches!(
        err,
        RenameError::Conflict { ref original, ref synthetic } if original == "a" && synthetic == "var_1"
    ));
    assert_eq!(source.as_str(), "local a = var_1");
}

#[test]
fn test_numbering_restarts_per_map() {
    let first = RenameMap::build(IdentKind::Function, "func", ["z"]).unwrap();
    let second = RenameMap::build(IdentKind::Function, "func", ["y"]).unwrap();
    assert_eq!(first.get("z"), Some("func_1"));
    assert_eq!(second.get("y"), Some("func_1"));
}
