//! Shell-like tokenizer for command lines.
//!
//! Splits a line into tokens on Unicode whitespace while honoring single
//! quotes, double quotes and backslash escapes. Flags are opaque here; the
//! option binder decides what a `-flag` token means.
//!
//! ```
//! use cmder::tokenizer::tokenize;
//!
//! let tokens = tokenize(r#"greet -lang en "Ada Lovelace" O\'Brien"#).unwrap();
//! assert_eq!(tokens, ["greet", "-lang", "en", "Ada Lovelace", "O'Brien"]);
//! ```

use crate::error::{QuoteKind, TokenizeError};

/// Split `line` into tokens.
///
/// Rules:
/// - whitespace outside quotes separates tokens; runs of it collapse
/// - `\` escapes the next character (`\n`, `\r`, `\t` become control
///   characters, anything else is taken literally), except inside single
///   quotes where it is an ordinary character
/// - a quoted section glued to other characters merges into the same token
///   (`a'b'c` is `abc`); a quoted section standing alone is a token of its
///   own, even when empty
pub fn tokenize(line: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut quote: Option<(QuoteKind, usize)> = None;
    let mut escape: Option<usize> = None;
    // Set once a non-whitespace, non-escaped character lands in `buf`.
    let mut in_token = false;

    for (pos, ch) in line.char_indices() {
        if escape.take().is_some() {
            buf.push(match ch {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                other => other,
            });
            continue;
        }

        match ch {
            '\\' => match quote {
                Some((QuoteKind::Single, _)) => buf.push(ch),
                _ => escape = Some(pos),
            },
            '\'' | '"' => {
                let kind = if ch == '\'' {
                    QuoteKind::Single
                } else {
                    QuoteKind::Double
                };
                match quote {
                    None => quote = Some((kind, pos)),
                    Some((open, _)) if open == kind => {
                        quote = None;
                        if !in_token {
                            tokens.push(std::mem::take(&mut buf));
                        }
                    }
                    Some(_) => buf.push(ch),
                }
            }
            c if c.is_whitespace() => {
                if quote.is_some() {
                    buf.push(c);
                    continue;
                }
                if !buf.is_empty() {
                    tokens.push(std::mem::take(&mut buf));
                }
                in_token = false;
            }
            c => {
                buf.push(c);
                in_token = true;
            }
        }
    }

    if let Some((kind, pos)) = quote {
        return Err(TokenizeError::UnclosedQuote {
            quote: kind,
            pos,
            tail: line[pos..].to_string(),
        });
    }
    if let Some(pos) = escape {
        return Err(TokenizeError::DanglingEscape { pos });
    }
    if !buf.is_empty() {
        tokens.push(buf);
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(line: &str) -> Vec<String> {
        tokenize(line).unwrap_or_else(|e| panic!("tokenize {line:?}: {e}"))
    }

    #[test]
    fn test_empty_and_blank_lines() {
        assert!(toks("").is_empty());
        assert!(toks("   \t  ").is_empty());
        assert!(toks("\u{3000}").is_empty());
    }

    #[test]
    fn test_plain_words() {
        assert_eq!(toks("a"), ["a"]);
        assert_eq!(toks("   a   "), ["a"]);
        assert_eq!(toks("a b c"), ["a", "b", "c"]);
        assert_eq!(toks("a  \t\n b"), ["a", "b"]);
    }

    #[test]
    fn test_flags_are_opaque() {
        assert_eq!(toks("a -b=123 -c"), ["a", "-b=123", "-c"]);
    }

    #[test]
    fn test_quotes_and_escapes() {
        let line = r#""1" '2' 3\n4 "5\t6" '7\n8' 9\ 0 a'b'c "d'e'f" g"h"i 'j"k"l'"#;
        assert_eq!(
            toks(line),
            [
                "1", "2", "3\n4", "5\t6", "7\\n8", "9 0", "abc", "d'e'f", "ghi", "j\"k\"l"
            ]
        );
    }

    #[test]
    fn test_quoted_whitespace_is_kept() {
        assert_eq!(toks("say 'hello  world'"), ["say", "hello  world"]);
        assert_eq!(toks("\"a b\"c"), ["a bc"]);
    }

    #[test]
    fn test_empty_quotes_yield_empty_token() {
        assert_eq!(toks("a '' b"), ["a", "", "b"]);
        assert_eq!(toks("x\"\""), ["x"]);
    }

    #[test]
    fn test_escaped_quote_outside_quotes() {
        assert_eq!(toks(r"it\'s"), ["it's"]);
        assert_eq!(toks(r#""say \"hi\"""#), ["say \"hi\""]);
        assert_eq!(toks(r"a\\b"), ["a\\b"]);
    }

    #[test]
    fn test_multibyte_characters() {
        assert_eq!(toks("问候 '你 好' ü"), ["问候", "你 好", "ü"]);
    }

    #[test]
    fn test_unclosed_single_quote() {
        let err = tokenize("'abc").unwrap_err();
        assert_eq!(
            err,
            TokenizeError::UnclosedQuote {
                quote: QuoteKind::Single,
                pos: 0,
                tail: "'abc".to_string(),
            }
        );
        assert!(err.to_string().contains("pos 0"));
        assert!(err.to_string().ends_with("'abc"));
    }

    #[test]
    fn test_unclosed_double_quote_reports_byte_offset() {
        let err = tokenize("ab \"cd ef").unwrap_err();
        assert_eq!(
            err.to_string(),
            "parse token: pos 3: not closed double quotation mark(\"): \"cd ef"
        );
    }

    #[test]
    fn test_dangling_escape() {
        let err = tokenize("abc\\").unwrap_err();
        assert_eq!(err, TokenizeError::DanglingEscape { pos: 3 });
    }

    #[test]
    fn test_deterministic() {
        let line = r#"x 'y z' "w""#;
        assert_eq!(tokenize(line), tokenize(line));
    }
}
