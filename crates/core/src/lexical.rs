//! Surface scanner shared by the formatter and the rewrite rules.
//!
//! Splits text at block keywords and statement separators while treating string literals and
//! comments as opaque, so a keyword spelled inside `"..."` or after `--` never moves structure.
//! This is not a lexer: numbers, operators and identifiers all stay inside [`TokenKind::Code`].

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

static BOUNDARY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?x)
          --\[\[(?s:.*?)\]\]
        | --\[=\[(?s:.*?)\]=\]
        | --[^\n]*
        | \[\[(?s:.*?)\]\]
        | "(?:[^"\\\n]|\\(?s:.))*"
        | '(?:[^'\\\n]|\\(?s:.))*'
        | \b(?:function|then|do|repeat|elseif|else|end|until)\b
        | ;
        | \n
        "#,
    )
    .expect("boundary pattern is valid")
});

/// Keyword that moves structural depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKeyword {
    Function,
    Then,
    Do,
    Repeat,
    Else,
    ElseIf,
    End,
    Until,
}

impl BlockKeyword {
    /// Keywords that increase depth after they are emitted.
    pub const OPENS: [Self; 5] = [Self::Function, Self::Then, Self::Do, Self::Repeat, Self::Else];
    /// Keywords that decrease depth before they are emitted.
    pub const CLOSES: [Self; 4] = [Self::End, Self::Else, Self::ElseIf, Self::Until];

    pub fn parse(word: &str) -> Option<Self> {
        Some(match word {
            "function" => Self::Function,
            "then" => Self::Then,
            "do" => Self::Do,
            "repeat" => Self::Repeat,
            "else" => Self::Else,
            "elseif" => Self::ElseIf,
            "end" => Self::End,
            "until" => Self::Until,
            _ => return None,
        })
    }

    pub const fn opens(self) -> bool {
        matches!(
            self,
            Self::Function | Self::Then | Self::Do | Self::Repeat | Self::Else
        )
    }

    pub const fn closes(self) -> bool {
        matches!(self, Self::End | Self::Else | Self::ElseIf | Self::Until)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
            Self::Then => "then",
            Self::Do => "do",
            Self::Repeat => "repeat",
            Self::Else => "else",
            Self::ElseIf => "elseif",
            Self::End => "end",
            Self::Until => "until",
        }
    }
}

/// Class of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Anything between boundaries.
    Code,
    /// A string literal or comment.
    Opaque,
    /// A structural keyword.
    Keyword(BlockKeyword),
    /// `;` or `\n`.
    Separator(char),
}

/// A slice of the scanned text with its absolute byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub span: Range<usize>,
}

/// Splits `src` into an ordered, gap-free token sequence.
pub fn scan(src: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in BOUNDARY.find_iter(src) {
        if m.start() > last {
            tokens.push(Token {
                kind: TokenKind::Code,
                text: &src[last..m.start()],
                span: last..m.start(),
            });
        }
        tokens.push(Token {
            kind: classify(m.as_str()),
            text: m.as_str(),
            span: m.range(),
        });
        last = m.end();
    }
    if last < src.len() {
        tokens.push(Token {
            kind: TokenKind::Code,
            text: &src[last..],
            span: last..src.len(),
        });
    }
    tokens
}

fn classify(text: &str) -> TokenKind {
    match text {
        ";" => TokenKind::Separator(';'),
        "\n" => TokenKind::Separator('\n'),
        _ => BlockKeyword::parse(text).map_or(TokenKind::Opaque, TokenKind::Keyword),
    }
}

/// Byte ranges of string literals and comments, in ascending order.
pub fn opaque_spans(src: &str) -> Vec<Range<usize>> {
    scan(src)
        .into_iter()
        .filter(|t| t.kind == TokenKind::Opaque)
        .map(|t| t.span)
        .collect()
}

/// Whether `pos` falls inside one of the sorted `spans`.
pub fn in_spans(spans: &[Range<usize>], pos: usize) -> bool {
    let idx = spans.partition_point(|s| s.end <= pos);
    spans.get(idx).is_some_and(|s| s.start <= pos)
}

/// Finds the `end` that closes a block whose opener ends right before `from`.
///
/// Returns the absolute span of that `end` keyword, or `None` when the block is never closed or
/// is closed by something other than `end` (e.g. a stray `until`).
pub fn matching_end(src: &str, from: usize) -> Option<Range<usize>> {
    let rest = src.get(from..)?;
    let mut depth = 1usize;
    for token in scan(rest) {
        let TokenKind::Keyword(k) = token.kind else {
            continue;
        };
        if k.closes() {
            depth -= 1;
            if depth == 0 {
                return (k == BlockKeyword::End)
                    .then(|| token.span.start + from..token.span.end + from);
            }
        }
        if k.opens() {
            depth += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_inside_strings_are_opaque() {
        let tokens = scan(r#"print("do end") -- then"#);
        assert!(
            tokens
                .iter()
                .all(|t| !matches!(t.kind, TokenKind::Keyword(_)))
        );
        assert_eq!(opaque_spans(r#"x = "a" .. 'b'"#).len(), 2);
    }

    #[test]
    fn test_scan_is_gap_free() {
        let src = "if a then\n  b()\nelse c() end";
        let joined: String = scan(src).iter().map(|t| t.text).collect();
        assert_eq!(joined, src);
    }

    #[test]
    fn test_matching_end_skips_nested_blocks() {
        let src = "for i = 1, 2 do if x then y() end end tail";
        let from = src.find("do").unwrap() + 2;
        let span = matching_end(src, from).unwrap();
        assert_eq!(&src[span.clone()], "end");
        assert_eq!(span.end, src.len() - " tail".len());
    }

    #[test]
    fn test_in_spans() {
        let spans = vec![2..5, 9..12];
        assert!(!in_spans(&spans, 1));
        assert!(in_spans(&spans, 2));
        assert!(!in_spans(&spans, 5));
        assert!(in_spans(&spans, 11));
        assert!(!in_spans(&spans, 12));
    }
}
