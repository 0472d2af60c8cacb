use luaclear_core::formatter::{format_source, IndentState};
use luaclear_core::SourceBuffer;

fn fmt(src: &str, width: usize) -> String {
    format_source(&SourceBuffer::new(src), width)
        .buffer
        .into_string()
}

#[test]
fn test_depth_never_negative() {
    let formatted = format_source(&SourceBuffer::new("do\nx = 1\nend\nend"), 4);
    assert_eq!(formatted.final_depth, 0);
    assert_eq!(formatted.clamped, 1);
    assert_eq!(formatted.buffer.as_str(), "do\n    x = 1\nend\nend\n");

    let mut state = IndentState::default();
    state.close();
    state.close();
    assert_eq!(state.depth, 0);
    assert_eq!(state.clamped, 2);
}

#[test]
fn test_nested_blocks() {
    let out = fmt(
        "function f(t)\nfor i = 1, #t do\nif t[i] then print(i) end\nend\nreturn t\nend",
        2,
    );
    assert_eq!(
        out,
        "function f(t)\n  for i = 1, #t do\n    if t[i] then\n      print(i)\n    end\n  end\n  return t\nend\n"
    );
}

#[test]
fn test_repeat_until() {
    assert_eq!(
        fmt("repeat n = n - 1 until n == 0", 4),
        "repeat\n    n = n - 1\nuntil n == 0\n"
    );
}

#[test]
fn test_keywords_in_strings_and_comments_ignored() {
    let out = fmt("print(\"do end\") -- then\nx = 'repeat'", 4);
    assert_eq!(out, "print(\"do end\") -- then\nx = 'repeat'\n");
}

#[test]
fn test_semicolons_split_statements() {
    assert_eq!(fmt("a = 1; b = 2", 4), "a = 1;\nb = 2\n");
}

#[test]
fn test_unclosed_block_reported() {
    let formatted = format_source(&SourceBuffer::new("while true do x()"), 4);
    assert_eq!(formatted.final_depth, 1);
    assert_eq!(formatted.max_depth, 1);
}
