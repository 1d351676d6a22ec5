//! Lexer for Hydro
//!
//! Converts source text into a gap-free stream of tokens. Whitespace,
//! comments and unrecognized characters are tokens too, so the token spans
//! always partition the scanned range.

use log::trace;

use crate::frontend::token::{is_word_char, Token, TokenKind};
use crate::utils::Span;

/// Source of tokens for a language
///
/// Implementations are stateless factories: every call produces a fresh,
/// lazy token iterator, so one adapter may serve many threads lexing
/// different texts at once. The iterator must
///
/// - cover `[offset, source.len())` with no gaps or overlaps,
/// - produce the same tokens for the same text and offset,
/// - consume at least one character per token,
/// - never fail: unrecognized input becomes `BadCharacter` tokens.
pub trait LexerAdapter: Send + Sync + std::fmt::Debug {
    fn tokens<'src>(
        &self,
        source: &'src str,
        offset: usize,
    ) -> Box<dyn Iterator<Item = Token> + 'src>;

    /// Lex the whole text
    fn tokenize(&self, source: &str) -> Vec<Token> {
        self.tokens(source, 0).collect()
    }
}

/// The Hydro lexer as a `LexerAdapter`
#[derive(Debug, Clone, Copy, Default)]
pub struct HydroLexerAdapter;

impl LexerAdapter for HydroLexerAdapter {
    fn tokens<'src>(
        &self,
        source: &'src str,
        offset: usize,
    ) -> Box<dyn Iterator<Item = Token> + 'src> {
        Box::new(Lexer::starting_at(source, offset))
    }
}

/// The lexer state
#[derive(Debug, Clone)]
pub struct Lexer<'src> {
    source: &'src str,
    /// Current byte position in source
    pos: usize,
    /// Start position of current token
    start: usize,
}

impl<'src> Lexer<'src> {
    /// Create a new lexer for the given source text
    pub fn new(source: &'src str) -> Self {
        Self::starting_at(source, 0)
    }

    /// Create a lexer that resumes at `offset`
    ///
    /// Offsets past the end are clamped, offsets inside a multi-byte
    /// character are moved back to its first byte.
    pub fn starting_at(source: &'src str, offset: usize) -> Self {
        let pos = floor_char_boundary(source, offset);
        if pos != 0 {
            trace!("lexer restart at byte {} of {}", pos, source.len());
        }
        Self {
            source,
            pos,
            start: pos,
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source[self.pos..].chars().next()
    }

    /// Advance to the next character
    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    /// Advance while `pred` holds
    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
    }

    /// Check if we've reached the end of input
    fn is_at_end(&self) -> bool {
        self.pos >= self.source.len()
    }

    /// Create a token spanning from start to the current position
    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, Span::new(self.start, self.pos))
    }

    /// Read a word and decide whether it is a number, type, keyword, ...
    fn read_word(&mut self) -> Token {
        self.eat_while(is_word_char);
        let kind = TokenKind::from_word(&self.source[self.start..self.pos]);
        self.make_token(kind)
    }

    /// Read a `%` comment up to the end of the line
    fn read_comment(&mut self) -> Token {
        self.eat_while(|c| c != '\n');
        self.make_token(TokenKind::Comment)
    }

    /// Read a string literal
    ///
    /// Stops after the closing quote, or before a newline when the string
    /// is unterminated.
    fn read_string(&mut self) -> Token {
        self.advance(); // opening quote
        while let Some(c) = self.peek() {
            match c {
                '"' => {
                    self.advance();
                    break;
                }
                '\\' => {
                    self.advance();
                    if matches!(self.peek(), Some(c) if c != '\n') {
                        self.advance();
                    }
                }
                '\n' => break,
                _ => {
                    self.advance();
                }
            }
        }
        self.make_token(TokenKind::String)
    }

    /// Get the next token, or `None` at the end of input
    pub fn next_token(&mut self) -> Option<Token> {
        self.start = self.pos;
        if self.is_at_end() {
            return None;
        }

        let c = self.peek()?;
        let token = match c {
            c if c.is_whitespace() => {
                self.eat_while(char::is_whitespace);
                self.make_token(TokenKind::Whitespace)
            }
            '%' => self.read_comment(),
            '"' => self.read_string(),
            c if is_word_char(c) => self.read_word(),
            _ => {
                self.advance();
                self.make_token(TokenKind::BadCharacter)
            }
        };
        Some(token)
    }

    /// Tokenize the rest of the source and return all tokens
    pub fn tokenize(&mut self) -> Vec<Token> {
        self.by_ref().collect()
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

fn floor_char_boundary(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Where re-lexing must start so that the tokens after `offset` come out the
/// same as in a full pass: the start of the line containing `offset`
///
/// Only whitespace can cross a line break, so every line start is a token
/// boundary or lies inside a whitespace run.
pub fn safe_restart_offset(source: &str, offset: usize) -> usize {
    let offset = floor_char_boundary(source, offset);
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Check the lexer contract: `tokens` are ordered, non-empty, and exactly
/// partition `[start, end)`
pub fn is_partition(tokens: &[Token], start: usize, end: usize) -> bool {
    let mut cursor = start;
    for token in tokens {
        if token.span.start != cursor || token.span.end <= token.span.start {
            return false;
        }
        cursor = token.span.end;
    }
    cursor == end
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::new(source)
            .filter(|t| t.kind != TokenKind::Whitespace)
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_tokens() {
        let source = "push u128 1 % comment\n\"hi\" true";
        let tokens = Lexer::new(source).tokenize();
        let texts: Vec<(TokenKind, &str)> =
            tokens.iter().map(|t| (t.kind, t.text(source))).collect();

        assert_eq!(
            texts,
            vec![
                (TokenKind::Keyword, "push"),
                (TokenKind::Whitespace, " "),
                (TokenKind::BaseType, "u128"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Number, "1"),
                (TokenKind::Whitespace, " "),
                (TokenKind::Comment, "% comment"),
                (TokenKind::Whitespace, "\n"),
                (TokenKind::String, "\"hi\""),
                (TokenKind::Whitespace, " "),
                (TokenKind::Boolean, "true"),
            ]
        );
        assert!(is_partition(&tokens, 0, source.len()));
    }

    #[test]
    fn test_items() {
        assert_eq!(
            kinds("module main\nlayout point\n\ts128 x"),
            vec![
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Keyword,
                TokenKind::Identifier,
                TokenKind::BaseType,
                TokenKind::Identifier,
            ]
        );
    }

    #[test]
    fn test_comment_stops_word() {
        let source = "call%note";
        let tokens = Lexer::new(source).tokenize();
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text(source), "call");
        assert_eq!(tokens[1].kind, TokenKind::Comment);
        assert_eq!(tokens[1].text(source), "%note");
    }

    #[test]
    fn test_strings() {
        let source = r#"push string "say \"hi\"" pop"#;
        let tokens: Vec<Token> = Lexer::new(source)
            .filter(|t| t.kind == TokenKind::String)
            .collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text(source), r#""say \"hi\"""#);
    }

    #[test]
    fn test_unterminated_string_stops_at_newline() {
        let source = "\"open\nreturn";
        let tokens = Lexer::new(source).tokenize();
        assert_eq!(tokens[0].kind, TokenKind::String);
        assert_eq!(tokens[0].text(source), "\"open");
        assert_eq!(tokens[1].kind, TokenKind::Whitespace);
        assert_eq!(tokens[2].kind, TokenKind::Keyword);
    }

    #[test]
    fn test_bad_characters() {
        let source = "add #é";
        let tokens = Lexer::new(source).tokenize();
        assert_eq!(tokens[2].kind, TokenKind::BadCharacter);
        assert_eq!(tokens[2].text(source), "#");
        assert_eq!(tokens[3].kind, TokenKind::BadCharacter);
        assert_eq!(tokens[3].text(source), "é");
        assert!(is_partition(&tokens, 0, source.len()));
    }

    #[test]
    fn test_empty_source() {
        assert!(Lexer::new("").tokenize().is_empty());
        assert!(is_partition(&[], 0, 0));
    }

    #[test]
    fn test_restart_inside_char() {
        let source = "é add";
        let tokens = Lexer::starting_at(source, 1).tokenize();
        assert_eq!(tokens[0].span.start, 0);
        assert!(Lexer::starting_at(source, 99).tokenize().is_empty());
    }

    #[test]
    fn test_safe_restart_offset() {
        let source = "module main\n\tpush u8 1\n\tcall";
        assert_eq!(safe_restart_offset(source, 0), 0);
        assert_eq!(safe_restart_offset(source, 5), 0);
        assert_eq!(safe_restart_offset(source, 15), 12);
        assert_eq!(safe_restart_offset(source, source.len()), 23);
    }

    #[test]
    fn test_adapter_matches_lexer() {
        let source = "function f body\n\treturn";
        let adapter = HydroLexerAdapter;
        assert_eq!(adapter.tokenize(source), Lexer::new(source).tokenize());
        assert_eq!(
            adapter.tokens(source, 16).collect::<Vec<_>>(),
            Lexer::starting_at(source, 16).tokenize()
        );
    }

    #[test]
    fn test_partition_check_rejects_gaps() {
        let tokens = vec![
            Token::new(TokenKind::Keyword, Span::new(0, 3)),
            Token::new(TokenKind::Identifier, Span::new(4, 6)),
        ];
        assert!(!is_partition(&tokens, 0, 6));
        assert!(!is_partition(&tokens[..1], 0, 6));
    }

    proptest! {
        #[test]
        fn prop_tokens_partition_input(source in any::<String>()) {
            let tokens = Lexer::new(&source).tokenize();
            prop_assert!(is_partition(&tokens, 0, source.len()));
        }

        #[test]
        fn prop_lexing_is_deterministic(source in "[a-z0-9 \t\n%\"\\\\._/#-]{0,64}") {
            prop_assert_eq!(Lexer::new(&source).tokenize(), Lexer::new(&source).tokenize());
        }

        #[test]
        fn prop_restart_at_line_start_matches_full_pass(
            source in "[a-z0-9 \t\n%\"\\\\._/#-]{0,64}",
            at in 0usize..80,
        ) {
            let restart = safe_restart_offset(&source, at);
            let full = Lexer::new(&source).tokenize();
            let resumed = Lexer::starting_at(&source, restart).tokenize();
            prop_assert!(is_partition(&resumed, restart, source.len()));

            let is_ws = |t: &&Token| t.kind == TokenKind::Whitespace;
            let expected: Vec<&Token> = full
                .iter()
                .filter(|t| t.span.start >= restart)
                .skip_while(is_ws)
                .collect();
            let actual: Vec<&Token> = resumed.iter().skip_while(is_ws).collect();
            prop_assert_eq!(expected, actual);
        }
    }
}
