use luaclear_core::decoder::decode_literals;
use luaclear_core::SourceBuffer;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

#[test]
fn test_encoded_calls_both_quote_styles() {
    init_tracing();
    let src = SourceBuffer::new("a = base64.decode(\"SGVsbG8=\")\nb = base64.decode( 'SGVsbG8=' )");
    let decoded = decode_literals(&src);

    assert_eq!(decoded.buffer.as_str(), "a = \"Hello\"\nb = \"Hello\"");
    assert_eq!(decoded.calls_decoded, 2);
    assert!(decoded.skips.is_empty());
}

#[test]
fn test_decoded_quotes_are_escaped() {
    init_tracing();
    let decoded = decode_literals(&SourceBuffer::new("s = base64.decode(\"c2F5ICJoaSI=\")"));
    assert_eq!(decoded.buffer.as_str(), r#"s = "say \"hi\"""#);
}

#[test]
fn test_malformed_payload_is_byte_identical() {
    init_tracing();
    let src = "local s = base64.decode(\"@@not base64@@\") -- keep\nprint(s)";
    let decoded = decode_literals(&SourceBuffer::new(src));

    assert_eq!(decoded.buffer.as_str(), src);
    assert_eq!(decoded.calls_decoded, 0);
    assert_eq!(decoded.skips.len(), 1);
    assert_eq!(decoded.skips[0].rule, "base64");
}

#[test]
fn test_non_utf8_payload_is_skipped() {
    init_tracing();
    let src = "x = base64.decode(\"//4=\")";
    let decoded = decode_literals(&SourceBuffer::new(src));
    assert_eq!(decoded.buffer.as_str(), src);
    assert_eq!(decoded.skips.len(), 1);
}

#[test]
fn test_hex_escapes_become_characters() {
    init_tracing();
    let decoded = decode_literals(&SourceBuffer::new(r#"print("\x48\x69", '\x21')"#));
    assert_eq!(decoded.buffer.as_str(), r#"print("Hi", '!')"#);
    assert_eq!(decoded.escapes_decoded, 3);
}

#[test]
fn test_plain_text_untouched() {
    init_tracing();
    let src = "local decode = base64.decode\nprint(\"\\\\x\")";
    let decoded = decode_literals(&SourceBuffer::new(src));
    assert_eq!(decoded.buffer.as_str(), src);
    assert!(decoded.skips.is_empty());
}

#[test]
fn test_truncated_hex_escape_is_skipped() {
    init_tracing();
    let src = r#"print("\x4z", "\x41")"#;
    let decoded = decode_literals(&SourceBuffer::new(src));
    assert_eq!(decoded.buffer.as_str(), r#"print("\x4z", "A")"#);
    assert_eq!(decoded.escapes_decoded, 1);
    assert_eq!(decoded.skips.len(), 1);
    assert_eq!(decoded.skips[0].rule, "hex_escape");
}
