//! Error handling for Hydro language support

use crate::utils::Span;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Host-facing error
///
/// Lexing, classification and parsing are total and never produce one of
/// these; only the operations that touch the outside world do.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("No language registered under the name '{name}'")]
    UnknownLanguage { name: String },

    #[error("No language registered for file '{path}'")]
    UnsupportedFile { path: String },

    #[error("Invalid color scheme: {0}")]
    Scheme(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// A recoverable syntax problem recorded by the parser
///
/// The parser wraps the offending tokens in an error node and keeps going,
/// so these are diagnostics rather than failures.
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[error("{message}")]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub span: Span,
}

/// What went wrong, independent of the message wording
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum SyntaxErrorKind {
    /// A token the grammar did not expect, or a missing one
    Unexpected,
    /// A string literal cut off by a newline or the end of the file
    UnterminatedString,
}

impl SyntaxErrorKind {
    /// Stable diagnostic code
    pub fn code(&self) -> &'static str {
        match self {
            SyntaxErrorKind::Unexpected => "H0001",
            SyntaxErrorKind::UnterminatedString => "H0002",
        }
    }
}

impl SyntaxError {
    /// An unexpected or missing token
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            kind: SyntaxErrorKind::Unexpected,
            message: message.into(),
            span,
        }
    }

    pub fn unterminated_string(span: Span) -> Self {
        Self {
            kind: SyntaxErrorKind::UnterminatedString,
            message: "unterminated string literal".to_string(),
            span,
        }
    }
}
