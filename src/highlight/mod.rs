//! Syntax Highlighting
//!
//! Maps token kinds onto a small fixed palette of display categories and
//! exposes what a color settings page needs: the labelled categories and a
//! demo text that shows every one of them.

pub mod scheme;

use serde::{Deserialize, Serialize};

use crate::frontend::lexer::{safe_restart_offset, LexerAdapter};
use crate::frontend::token::TokenKind;
use crate::language::LanguageDescriptor;
use crate::utils::Span;

// ==================== Display Categories ====================

/// How a token is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayCategory {
    BadCharacter,
    Type,
    Comment,
    Identifier,
    Keyword,
    Number,
    String,
    /// Not highlighted
    None,
}

impl DisplayCategory {
    /// Every category that is actually rendered
    pub const HIGHLIGHTED: &'static [DisplayCategory] = &[
        DisplayCategory::BadCharacter,
        DisplayCategory::Type,
        DisplayCategory::Comment,
        DisplayCategory::Identifier,
        DisplayCategory::Keyword,
        DisplayCategory::Number,
        DisplayCategory::String,
    ];

    /// Text attributes key a host stores user colors under
    pub fn external_name(&self) -> Option<&'static str> {
        match self {
            DisplayCategory::BadCharacter => Some("HYDRO_BAD_CHARACTER"),
            DisplayCategory::Type => Some("HYDRO_BASETYPE"),
            DisplayCategory::Comment => Some("HYDRO_COMMENT"),
            DisplayCategory::Identifier => Some("HYDRO_IDENTIFIER"),
            DisplayCategory::Keyword => Some("HYDRO_KEYWORD"),
            DisplayCategory::Number => Some("HYDRO_NUMBER"),
            DisplayCategory::String => Some("HYDRO_STRING"),
            DisplayCategory::None => None,
        }
    }

    /// The host's stock key this category inherits from when the user has
    /// not customized it
    pub fn fallback_name(&self) -> Option<&'static str> {
        match self {
            DisplayCategory::BadCharacter => Some("BAD_CHARACTER"),
            DisplayCategory::Type => Some("DEFAULT_CLASS_NAME"),
            DisplayCategory::Comment => Some("DEFAULT_LINE_COMMENT"),
            DisplayCategory::Identifier => Some("DEFAULT_IDENTIFIER"),
            DisplayCategory::Keyword => Some("DEFAULT_KEYWORD"),
            DisplayCategory::Number => Some("DEFAULT_NUMBER"),
            DisplayCategory::String => Some("DEFAULT_STRING"),
            DisplayCategory::None => None,
        }
    }
}

/// Classify a token kind
///
/// Booleans share the number style on purpose.
pub fn classify(kind: TokenKind) -> DisplayCategory {
    match kind {
        TokenKind::BadCharacter => DisplayCategory::BadCharacter,
        TokenKind::BaseType => DisplayCategory::Type,
        TokenKind::Comment => DisplayCategory::Comment,
        TokenKind::Identifier => DisplayCategory::Identifier,
        TokenKind::Keyword => DisplayCategory::Keyword,
        TokenKind::String => DisplayCategory::String,
        TokenKind::Boolean => DisplayCategory::Number,
        TokenKind::Number => DisplayCategory::Number,
        _ => DisplayCategory::None,
    }
}

/// Categories to apply to a token kind: empty for unhighlighted kinds,
/// one entry otherwise
pub fn token_highlights(kind: TokenKind) -> &'static [DisplayCategory] {
    match classify(kind) {
        DisplayCategory::BadCharacter => &[DisplayCategory::BadCharacter],
        DisplayCategory::Type => &[DisplayCategory::Type],
        DisplayCategory::Comment => &[DisplayCategory::Comment],
        DisplayCategory::Identifier => &[DisplayCategory::Identifier],
        DisplayCategory::Keyword => &[DisplayCategory::Keyword],
        DisplayCategory::Number => &[DisplayCategory::Number],
        DisplayCategory::String => &[DisplayCategory::String],
        DisplayCategory::None => &[],
    }
}

// ==================== Color Settings ====================

/// Name of the settings page
pub const DISPLAY_NAME: &str = "Hydro";

/// A labelled category on the settings page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttributeDescriptor {
    pub label: &'static str,
    pub category: DisplayCategory,
}

const ATTRIBUTE_DESCRIPTORS: &[AttributeDescriptor] = &[
    AttributeDescriptor {
        label: "Bad characters",
        category: DisplayCategory::BadCharacter,
    },
    AttributeDescriptor {
        label: "Types",
        category: DisplayCategory::Type,
    },
    AttributeDescriptor {
        label: "Comments",
        category: DisplayCategory::Comment,
    },
    AttributeDescriptor {
        label: "Identifiers",
        category: DisplayCategory::Identifier,
    },
    AttributeDescriptor {
        label: "Keywords",
        category: DisplayCategory::Keyword,
    },
    AttributeDescriptor {
        label: "Numbers",
        category: DisplayCategory::Number,
    },
    AttributeDescriptor {
        label: "Strings",
        category: DisplayCategory::String,
    },
];

/// The settings catalog, in display order
pub fn attribute_descriptors() -> &'static [AttributeDescriptor] {
    ATTRIBUTE_DESCRIPTORS
}

const DEMO_TEXT: &str = concat!(
    "% This is a demo to show off the syntax highlighting!!\n",
    "module main\n",
    "layout point\n",
    "\ts128 x\n",
    "\ts128 y\n\n",
    "using another_module\n\n",
    "function fibonacci any body\n",
    "\tduplicate\n",
    "\tduplicate\n",
    "\tpush u128 1\n",
    "\tlessthanequal\n",
    "\tpush bool true\n",
    "\tequal\n",
    "\tbranch finish notfinish\n",
    "\tlabel finish\n",
    "\treturn\n",
    "\tlabel notfinish\n",
    "\tpush u128 1\n",
    "\tsubtract\n",
    "\tpush funcp main fibonacci\n",
    "\tcall\n",
    "\tswap\n",
    "\tpush u128 2\n",
    "\tsubtract\n",
    "\tpush funcp main fibonacci\n",
    "\tcall\n",
    "\tadd\n",
    "\treturn\n\n",
    "main body\n",
    "\tpush string \"example string :)\"",
    "\tpush u128 20\n",
    "\tpush funcp main fibonacci\n",
    "\tcall\n",
    "\treturn\n",
    "\n% characters outside the language are flagged\n",
    "~\n",
);

/// Sample source for the settings preview
///
/// Shows every highlighted category. The closing `~` line is there for the
/// bad-character style, so parsing the demo yields exactly one syntax error,
/// at that `~`; everything above it is valid Hydro.
pub fn demo_text() -> &'static str {
    DEMO_TEXT
}

// ==================== Highlighter ====================

/// A highlighted region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub span: Span,
    pub category: DisplayCategory,
}

/// Lexer plus classifier
#[derive(Debug, Clone, Copy)]
pub struct Highlighter<'a> {
    lexer: &'a dyn LexerAdapter,
}

impl<'a> Highlighter<'a> {
    pub fn new(lexer: &'a dyn LexerAdapter) -> Self {
        Self { lexer }
    }

    pub fn for_language(language: &'a LanguageDescriptor) -> Self {
        Self::new(language.lexer())
    }

    /// Highlight a whole text
    pub fn highlight(&self, source: &str) -> Vec<HighlightSpan> {
        self.highlight_range(source, 0)
    }

    /// Re-highlight after an edit at `offset`
    ///
    /// Returns the offset highlighting restarted from and the regions from
    /// there to the end of the text; everything before the restart offset
    /// is unchanged.
    pub fn highlight_from(&self, source: &str, offset: usize) -> (usize, Vec<HighlightSpan>) {
        let restart = safe_restart_offset(source, offset);
        (restart, self.highlight_range(source, restart))
    }

    fn highlight_range(&self, source: &str, offset: usize) -> Vec<HighlightSpan> {
        self.lexer
            .tokens(source, offset)
            .flat_map(|token| {
                token_highlights(token.kind)
                    .iter()
                    .map(move |&category| HighlightSpan {
                        span: token.span,
                        category,
                    })
            })
            .collect()
    }
}
