use luaclear_core::catalog::find_identifiers;
use luaclear_core::{IdentKind, SourceBuffer};

#[test]
fn test_catalog_keeps_order_and_duplicates() {
    let src = SourceBuffer::new(
        "local b = 1\nlocal a = 2\nlocal b = 3\nfunction g(x) end\nlocal function f() end",
    );
    let catalog = find_identifiers(&src);

    assert_eq!(catalog.variable_names().collect::<Vec<_>>(), ["b", "a", "b"]);
    assert_eq!(catalog.function_names().collect::<Vec<_>>(), ["g", "f"]);
    assert!(catalog.functions.iter().all(|i| i.kind == IdentKind::Function));
    assert_eq!(catalog.len(), 5);
}

#[test]
fn test_catalog_offsets_point_at_names() {
    let text = "x = 1; local count = 0";
    let catalog = find_identifiers(&SourceBuffer::new(text));
    let ident = &catalog.variables[0];
    assert_eq!(&text[ident.offset..ident.offset + ident.name.len()], "count");
}

#[test]
fn test_catalog_requires_declaration_shape() {
    let catalog = find_identifiers(&SourceBuffer::new(
        "mylocal x = 1\nlocal y\nlocal a, b = 1, 2\nt.function_x = nil\nfunction(a) end",
    ));
    assert!(catalog.is_empty(), "{catalog:?}");
}
