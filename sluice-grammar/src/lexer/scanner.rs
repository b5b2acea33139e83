//! Lexer implementation

use super::token::*;
use std::iter::Peekable;
use std::str::CharIndices;

// ============================================================================
// LEXER IMPLEMENTATION
// ============================================================================

/// Lexer for the raw command line.
pub struct Lexer<'a> {
    chars: Peekable<CharIndices<'a>>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    /// Create a new lexer for the given raw command line.
    pub fn new(source: &'a str) -> Self {
        Self {
            chars: source.char_indices().peekable(),
            pos: 0,
        }
    }

    /// Tokenize the entire line into a vector of tokens.
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }

        tokens
    }

    /// Get the next token from the line.
    fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;
        let kind = match self.peek_char() {
            None => TokenKind::Eof,
            Some(_) => self.scan_atom(),
        };

        Token {
            kind,
            span: Span {
                start,
                end: self.pos,
            },
        }
    }

    /// Scan one whitespace-delimited atom, resolving quoted spans and
    /// deciding option-ness (`=` before any quote splits name from value).
    fn scan_atom(&mut self) -> TokenKind {
        let mut text = String::new();
        let mut option_name: Option<String> = None;
        let mut seen_quote = false;

        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                break;
            }
            match c {
                '"' => {
                    seen_quote = true;
                    self.advance();
                    if !self.scan_quoted(&mut text) {
                        return TokenKind::Error("Unterminated quoted value".to_string());
                    }
                }
                '=' if !seen_quote && option_name.is_none() => {
                    self.advance();
                    option_name = Some(std::mem::take(&mut text));
                }
                _ => {
                    self.advance();
                    text.push(c);
                }
            }
        }

        match option_name {
            Some(name) => TokenKind::Option { name, value: text },
            None => TokenKind::Word(text),
        }
    }

    /// Scan the remainder of a double-quoted span into `out`. Returns false
    /// when the closing quote is missing.
    fn scan_quoted(&mut self, out: &mut String) -> bool {
        loop {
            match self.peek_char() {
                None => return false,
                Some('"') => {
                    self.advance();
                    if self.peek_char() == Some('"') {
                        // Doubled quote stays in the value as a single quote
                        self.advance();
                        out.push('"');
                    } else {
                        return true;
                    }
                }
                Some('\\') => {
                    self.advance();
                    if self.peek_char() == Some('"') {
                        self.advance();
                        out.push('"');
                    } else {
                        out.push('\\');
                    }
                }
                Some(c) => {
                    self.advance();
                    out.push(c);
                }
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn advance(&mut self) -> Option<char> {
        if let Some((i, c)) = self.chars.next() {
            self.pos = i + c.len_utf8();
            Some(c)
        } else {
            None
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        let mut tokens = Lexer::new(source).tokenize();
        assert_eq!(tokens.pop().map(|t| t.kind), Some(TokenKind::Eof));
        tokens.into_iter().map(|t| t.kind).collect()
    }

    fn option(name: &str, value: &str) -> TokenKind {
        TokenKind::Option {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn word(text: &str) -> TokenKind {
        TokenKind::Word(text.to_string())
    }

    #[test]
    fn test_tokenize_words_and_options() {
        assert_eq!(
            kinds("sum total=total_date_hour date_hour"),
            vec![
                word("sum"),
                option("total", "total_date_hour"),
                word("date_hour"),
            ]
        );
    }

    #[test]
    fn test_empty_line_is_just_eof() {
        let tokens = Lexer::new("   \t ").tokenize();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Eof);
    }

    #[test]
    fn test_quoted_value_preserves_whitespace() {
        assert_eq!(
            kinds(r#"sum bar="baz qux" f1"#),
            vec![word("sum"), option("bar", "baz qux"), word("f1")]
        );
    }

    #[test]
    fn test_doubled_quote_unescapes() {
        assert_eq!(
            kinds(r#"cmd note="say ""hi"" now""#),
            vec![word("cmd"), option("note", r#"say "hi" now"#)]
        );
    }

    #[test]
    fn test_backslash_quote_unescapes() {
        assert_eq!(
            kinds(r#"cmd note="say \"hi\" now""#),
            vec![word("cmd"), option("note", r#"say "hi" now"#)]
        );
    }

    #[test]
    fn test_other_backslash_is_literal() {
        assert_eq!(
            kinds(r#"cmd path="c:\temp\new""#),
            vec![word("cmd"), option("path", r"c:\temp\new")]
        );
    }

    #[test]
    fn test_equals_after_quote_is_not_an_option() {
        assert_eq!(kinds(r#"cmd "a"=b"#), vec![word("cmd"), word("a=b")]);
    }

    #[test]
    fn test_second_equals_stays_in_value() {
        assert_eq!(kinds("cmd a=b=c"), vec![word("cmd"), option("a", "b=c")]);
    }

    #[test]
    fn test_quoted_field_token() {
        assert_eq!(
            kinds(r#"cmd "date_hour""#),
            vec![word("cmd"), word("date_hour")]
        );
    }

    #[test]
    fn test_empty_quoted_value() {
        assert_eq!(kinds(r#"cmd a="""#), vec![word("cmd"), option("a", "")]);
    }

    #[test]
    fn test_unterminated_quote_is_error_token() {
        let tokens = Lexer::new(r#"cmd a="oops"#).tokenize();
        assert!(tokens
            .iter()
            .any(|t| matches!(t.kind, TokenKind::Error(_))));
    }

    #[test]
    fn test_spans_cover_source() {
        let tokens = Lexer::new("sum total=x").tokenize();
        assert_eq!(tokens[0].span, Span { start: 0, end: 3 });
        assert_eq!(tokens[1].span, Span { start: 4, end: 11 });
        assert_eq!(tokens[1].span.column(), 5);
    }
}
