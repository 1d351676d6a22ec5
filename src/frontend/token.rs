//! Token definitions for Hydro

use serde::Serialize;

use crate::utils::Span;

/// A token produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The source text this token covers
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        self.span.text(source)
    }

    /// Whitespace and comments carry no grammar
    pub fn is_trivia(&self) -> bool {
        TokenSet::TRIVIA.contains(self.kind)
    }
}

/// Token kinds
///
/// Kinds are plain tags: two tokens of the same kind are interchangeable
/// for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[non_exhaustive]
pub enum TokenKind {
    /// Character the lexer does not recognize
    BadCharacter,
    /// u8 .. u128, s8 .. s128, string, bool
    BaseType,
    /// % up to end of line
    Comment,
    /// Any other word
    Identifier,
    /// Item and instruction words (module, push, return, ...)
    Keyword,
    /// -12, 3.5, .5
    Number,
    /// true, false
    Boolean,
    /// "..."
    String,
    /// Run of whitespace, newlines included
    Whitespace,
}

impl TokenKind {
    /// Every kind, in declaration order
    pub const ALL: &'static [TokenKind] = &[
        TokenKind::BadCharacter,
        TokenKind::BaseType,
        TokenKind::Comment,
        TokenKind::Identifier,
        TokenKind::Keyword,
        TokenKind::Number,
        TokenKind::Boolean,
        TokenKind::String,
        TokenKind::Whitespace,
    ];

    /// Debug name used by tree dumps, e.g. `HydroTokenType.KEYWORD`
    pub fn debug_name(&self) -> &'static str {
        match self {
            TokenKind::BadCharacter => "BAD_CHARACTER",
            TokenKind::BaseType => "BASETYPE",
            TokenKind::Comment => "COMMENT",
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::Keyword => "KEYWORD",
            TokenKind::Number => "NUMBER",
            TokenKind::Boolean => "BOOLEAN",
            TokenKind::String => "STRING",
            TokenKind::Whitespace => "WHITE_SPACE",
        }
    }

    /// Classify a complete word (a run of word characters)
    pub fn from_word(word: &str) -> TokenKind {
        let lower = word.to_ascii_lowercase();
        let lower = lower.as_str();
        if is_number(lower) {
            TokenKind::Number
        } else if BASE_TYPES.contains(&lower) {
            TokenKind::BaseType
        } else if lower == "true" || lower == "false" {
            TokenKind::Boolean
        } else if ITEM_KEYWORDS.contains(&lower) || INSTRUCTION_KEYWORDS.contains(&lower) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        }
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "HydroTokenType.{}", self.debug_name())
    }
}

/// Built-in value types
pub const BASE_TYPES: &[&str] = &[
    "u8", "u16", "u32", "u64", "u128", "s8", "s16", "s32", "s64", "s128", "string", "bool",
];

/// Keywords that open or qualify a top-level item or operand
pub const ITEM_KEYWORDS: &[&str] = &[
    "module", "using", "layout", "function", "main", "body", "label", "this", "array", "funcp",
    "vref", "iref",
];

/// Opcodes
pub const INSTRUCTION_KEYWORDS: &[&str] = &[
    "alloc",
    "push",
    "pop",
    "duplicate",
    "swap",
    "add",
    "subtract",
    "multiply",
    "divide",
    "modulo",
    "shiftleft",
    "shiftright",
    "bitand",
    "bitor",
    "bitxor",
    "bitnot",
    "and",
    "or",
    "xor",
    "not",
    "equal",
    "notequal",
    "lessthan",
    "lessthanequal",
    "greaterthan",
    "greaterthanequal",
    "jump",
    "branch",
    "call",
    "return",
    "load",
    "store",
    "index",
];

/// Characters that may appear inside a word
pub fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/' | '\\')
}

/// `-?([0-9]+|[0-9]*\.[0-9]+)`
fn is_number(word: &str) -> bool {
    let digits = word.strip_prefix('-').unwrap_or(word);
    match digits.split_once('.') {
        None => !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()),
        Some((int, frac)) => {
            int.bytes().all(|b| b.is_ascii_digit())
                && !frac.is_empty()
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

/// A fixed set of token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSet(&'static [TokenKind]);

impl TokenSet {
    pub const EMPTY: TokenSet = TokenSet(&[]);
    pub const BASE_TYPES: TokenSet = TokenSet(&[TokenKind::BaseType]);
    pub const IDENTIFIERS: TokenSet = TokenSet(&[TokenKind::Identifier]);
    pub const COMMENTS: TokenSet = TokenSet(&[TokenKind::Comment]);
    pub const NUMBERS: TokenSet = TokenSet(&[TokenKind::Number]);
    pub const STRINGS: TokenSet = TokenSet(&[TokenKind::String]);
    pub const KEYWORDS: TokenSet = TokenSet(&[TokenKind::Keyword]);
    pub const TRIVIA: TokenSet = TokenSet(&[TokenKind::Whitespace, TokenKind::Comment]);

    pub const fn new(kinds: &'static [TokenKind]) -> Self {
        TokenSet(kinds)
    }

    pub fn contains(&self, kind: TokenKind) -> bool {
        self.0.contains(&kind)
    }

    pub fn kinds(&self) -> &'static [TokenKind] {
        self.0
    }
}

/// The named token sets host services special-case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSetGroup {
    /// Kinds treated as comments (comment toggling, spell checking)
    pub comments: TokenSet,
    /// Kinds treated as string literals (string-aware editing)
    pub string_literals: TokenSet,
    pub base_types: TokenSet,
    pub identifiers: TokenSet,
    pub numbers: TokenSet,
    pub keywords: TokenSet,
}

impl TokenSetGroup {
    pub const HYDRO: TokenSetGroup = TokenSetGroup {
        comments: TokenSet::COMMENTS,
        string_literals: TokenSet::STRINGS,
        base_types: TokenSet::BASE_TYPES,
        identifiers: TokenSet::IDENTIFIERS,
        numbers: TokenSet::NUMBERS,
        keywords: TokenSet::KEYWORDS,
    };
}
