//! Structured Feedback Module
//!
//! Machine-readable output for tools that drive `hydroc`:
//! - JSON diagnostic reports with line/column locations
//! - Token dumps with their display categories
//! - File statistics

use serde::Serialize;

use crate::frontend::ast::SyntaxTree;
use crate::frontend::token::{Token, TokenKind};
use crate::highlight::{classify, DisplayCategory};
use crate::utils::{Span, SyntaxError};

// ==================== Structured Error Report ====================

/// A structured diagnostic
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    /// Error code (e.g., "H0001")
    pub code: String,

    pub severity: Severity,

    /// Human-readable message
    pub message: String,

    pub location: Location,
}

/// Every diagnostic the parser records is an error; there are no lints yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
        }
    }
}

/// 1-based position of a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub end_line: u32,
    pub end_column: u32,
}

impl Location {
    pub fn new(file: &str, span: Span, source: &str) -> Self {
        let (line, column) = span.line_col(source);
        let (end_line, end_column) = Span::new(span.end, span.end).line_col(source);
        Self {
            file: file.to_string(),
            line,
            column,
            end_line,
            end_column,
        }
    }
}

impl ErrorReport {
    /// Create a report from a syntax error
    pub fn from_syntax_error(error: &SyntaxError, file_name: &str, source: &str) -> Self {
        Self {
            code: error.kind.code().to_string(),
            severity: Severity::Error,
            message: error.message.clone(),
            location: Location::new(file_name, error.span, source),
        }
    }

    /// One-line `file:line:col: error[code]: message` form
    pub fn to_line(&self) -> String {
        format!(
            "{}:{}:{}: {}[{}]: {}",
            self.location.file,
            self.location.line,
            self.location.column,
            self.severity.as_str(),
            self.code,
            self.message
        )
    }
}

// ==================== Check Feedback ====================

/// Result of checking one file
#[derive(Debug, Clone, Serialize)]
pub struct CheckFeedback {
    pub success: bool,
    pub source_file: String,
    pub diagnostics: Vec<ErrorReport>,
    pub stats: CheckStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckStats {
    /// Tokens, trivia included
    pub token_count: usize,
    pub node_count: usize,
    pub bad_character_count: usize,
    /// Lines of code
    pub loc: usize,
}

impl CheckFeedback {
    pub fn new(source_file: &str, source: &str, tokens: &[Token], tree: &SyntaxTree) -> Self {
        let diagnostics: Vec<ErrorReport> = tree
            .errors
            .iter()
            .map(|e| ErrorReport::from_syntax_error(e, source_file, source))
            .collect();
        let stats = CheckStats {
            token_count: tokens.len(),
            node_count: tree.root.descendants().len(),
            bad_character_count: tokens
                .iter()
                .filter(|t| t.kind == TokenKind::BadCharacter)
                .count(),
            loc: source.lines().count(),
        };
        Self {
            success: diagnostics.is_empty(),
            source_file: source_file.to_string(),
            diagnostics,
            stats,
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Output as compact JSON (for programmatic use)
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// ==================== Token Dump ====================

/// One token with its classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenReport {
    pub kind: TokenKind,
    pub category: DisplayCategory,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl TokenReport {
    pub fn new(token: &Token, source: &str) -> Self {
        Self {
            kind: token.kind,
            category: classify(token.kind),
            start: token.span.start,
            end: token.span.end,
            text: token.text(source).to_string(),
        }
    }
}

/// Token dump as a JSON array
pub fn tokens_to_json(tokens: &[Token], source: &str) -> String {
    let reports: Vec<TokenReport> = tokens.iter().map(|t| TokenReport::new(t, source)).collect();
    serde_json::to_string_pretty(&reports).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::Lexer;
    use crate::frontend::parser::HydroParser;
    use pretty_assertions::assert_eq;

    fn check(source: &str) -> CheckFeedback {
        let tokens = Lexer::new(source).tokenize();
        let tree = HydroParser::default().parse_source(source);
        CheckFeedback::new("test.h2o", source, &tokens, &tree)
    }

    #[test]
    fn test_clean_file() {
        let feedback = check("module main\nmain body\n\treturn\n");
        assert!(feedback.success);
        assert_eq!(feedback.stats.loc, 3);
        assert_eq!(feedback.stats.bad_character_count, 0);
        assert_eq!(feedback.stats.token_count, 10);
    }

    #[test]
    fn test_diagnostic_location() {
        let feedback = check("module main\nmain body\n\tpush string \"open\n");
        assert!(!feedback.success);
        let report = &feedback.diagnostics[0];
        assert_eq!(report.code, "H0002");
        assert_eq!(report.location.line, 3);
        assert_eq!(report.location.column, 14);
        assert_eq!(report.location.end_column, 19);
        assert_eq!(
            report.to_line(),
            "test.h2o:3:14: error[H0002]: unterminated string literal"
        );
    }

    #[test]
    fn test_code_comes_from_error_kind() {
        let source = "module main\nmain body\n\tpush string \"open";
        let span = Span::new(35, 40);
        let reworded = SyntaxError {
            message: "string literal runs off the end".to_string(),
            ..SyntaxError::unterminated_string(span)
        };
        let report = ErrorReport::from_syntax_error(&reworded, "test.h2o", source);
        assert_eq!(report.code, "H0002");

        let report = ErrorReport::from_syntax_error(
            &SyntaxError::new("unterminated-looking text", span),
            "test.h2o",
            source,
        );
        assert_eq!(report.code, "H0001");
        assert_eq!(report.severity, Severity::Error);
    }

    #[test]
    fn test_json_output() {
        let feedback = check("module main\n~");
        let json: serde_json::Value = serde_json::from_str(&feedback.to_json()).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["diagnostics"][0]["code"], "H0001");
        assert_eq!(json["stats"]["bad_character_count"], 1);
        assert!(!feedback.to_json_compact().contains('\n'));
    }

    #[test]
    fn test_token_dump() {
        let source = "push true";
        let tokens = Lexer::new(source).tokenize();
        let json: serde_json::Value =
            serde_json::from_str(&tokens_to_json(&tokens, source)).unwrap();
        assert_eq!(json[0]["kind"], "Keyword");
        assert_eq!(json[2]["kind"], "Boolean");
        assert_eq!(json[2]["category"], "number");
        assert_eq!(json[2]["text"], "true");
        assert_eq!(json[1]["category"], "none");
    }
}
