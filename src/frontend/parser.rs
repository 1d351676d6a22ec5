//! Parser for Hydro
//!
//! Recursive descent over the token stream. Parsing never aborts: tokens
//! the grammar cannot place are wrapped in `Error` nodes, a `SyntaxError`
//! is recorded, and parsing resumes at the next item or instruction.

use log::debug;

use crate::frontend::ast::{SyntaxElement, SyntaxKind, SyntaxNode, SyntaxTree};
use crate::frontend::lexer::Lexer;
use crate::frontend::token::{Token, TokenKind, INSTRUCTION_KEYWORDS};
use crate::utils::{Span, SyntaxError};

/// Builds a syntax tree from a token stream
///
/// The root of the returned tree is always of kind `file_node_type()`.
pub trait GrammarParser: Send + Sync + std::fmt::Debug {
    fn parse(&self, source: &str, tokens: &[Token]) -> SyntaxTree;

    fn file_node_type(&self) -> SyntaxKind {
        SyntaxKind::File
    }
}

/// Parser options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserConfig {
    /// Keep whitespace and comments as leaves of the tree. When false they
    /// are filtered out before parsing.
    pub retain_trivia: bool,
}

/// The Hydro grammar
#[derive(Debug, Clone, Copy, Default)]
pub struct HydroParser {
    config: ParserConfig,
}

impl HydroParser {
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ParserConfig {
        self.config
    }

    /// Lex and parse in one go
    pub fn parse_source(&self, source: &str) -> SyntaxTree {
        let tokens = Lexer::new(source).tokenize();
        self.parse(source, &tokens)
    }
}

impl GrammarParser for HydroParser {
    fn parse(&self, source: &str, tokens: &[Token]) -> SyntaxTree {
        let tokens: Vec<Token> = if self.config.retain_trivia {
            tokens.to_vec()
        } else {
            tokens.iter().filter(|t| !t.is_trivia()).copied().collect()
        };
        let mut parser = Parser::new(source, tokens);
        let root = parser.parse_file();
        if !parser.errors.is_empty() {
            debug!("parsed with {} syntax errors", parser.errors.len());
        }
        SyntaxTree {
            root,
            errors: parser.errors,
        }
    }
}

/// Words that open a top-level item
const ITEM_STARTS: &[&str] = &["module", "using", "layout", "function", "main"];

/// The parser state
struct Parser<'src> {
    source: &'src str,
    tokens: Vec<Token>,
    /// Index of the next unconsumed token, trivia included
    pos: usize,
    errors: Vec<SyntaxError>,
}

impl<'src> Parser<'src> {
    fn new(source: &'src str, tokens: Vec<Token>) -> Self {
        Self {
            source,
            tokens,
            pos: 0,
            errors: Vec::new(),
        }
    }

    // ==================== Helper Methods ====================

    /// Index of the next token that is not trivia
    fn significant_index(&self) -> Option<usize> {
        (self.pos..self.tokens.len()).find(|&i| !self.tokens[i].is_trivia())
    }

    fn current(&self) -> Option<&Token> {
        self.significant_index().map(|i| &self.tokens[i])
    }

    fn current_kind(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn current_lower(&self) -> Option<String> {
        self.current().map(|t| t.text(self.source).to_ascii_lowercase())
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.current_kind() == Some(kind)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        match self.current() {
            Some(t) if t.kind == TokenKind::Keyword => {
                t.text(self.source).eq_ignore_ascii_case(keyword)
            }
            _ => false,
        }
    }

    fn at_item_start(&self) -> bool {
        ITEM_STARTS.iter().any(|kw| self.at_keyword(kw))
    }

    fn at_instruction_start(&self) -> bool {
        self.at_keyword("label") || INSTRUCTION_KEYWORDS.iter().any(|kw| self.at_keyword(kw))
    }

    fn at_sync(&self) -> bool {
        self.at_item_start() || self.at_instruction_start()
    }

    /// Describe the current token for error messages
    fn found(&self) -> String {
        match self.current() {
            Some(t) => format!("'{}'", t.text(self.source)),
            None => "end of file".to_string(),
        }
    }

    /// Span to report at: the current token, or an empty span at the end
    fn error_span(&self) -> Span {
        match self.current() {
            Some(t) => t.span,
            None => Span::new(self.source.len(), self.source.len()),
        }
    }

    fn error(&mut self, expected: &str) {
        let message = format!("expected {}, found {}", expected, self.found());
        let span = self.error_span();
        self.errors.push(SyntaxError::new(message, span));
    }

    /// Move the next significant token, and any trivia before it, into
    /// `children`
    fn bump(&mut self, children: &mut Vec<SyntaxElement>) {
        let Some(index) = self.significant_index() else {
            return;
        };
        children.extend(
            self.tokens[self.pos..=index]
                .iter()
                .map(|t| SyntaxElement::Token(*t)),
        );
        self.pos = index + 1;

        let token = self.tokens[index];
        if token.kind == TokenKind::String && !is_terminated_string(token.text(self.source)) {
            self.errors.push(SyntaxError::unterminated_string(token.span));
        }
    }

    /// Move trailing trivia into `children`
    fn flush_trivia(&mut self, children: &mut Vec<SyntaxElement>) {
        children.extend(self.tokens[self.pos..].iter().map(|t| SyntaxElement::Token(*t)));
        self.pos = self.tokens.len();
    }

    /// Consume the current token if `accept` holds. Otherwise report it and,
    /// unless it starts something the caller's caller can use, wrap it in
    /// an error node.
    fn expect(
        &mut self,
        children: &mut Vec<SyntaxElement>,
        accept: impl Fn(&Self) -> bool,
        expected: &str,
    ) {
        if self.current().is_some() && accept(self) {
            self.bump(children);
            return;
        }
        self.error(expected);
        if self.current().is_some() && !self.at_sync() {
            let mut bad = Vec::new();
            self.bump(&mut bad);
            children.push(SyntaxElement::Node(SyntaxNode::new(SyntaxKind::Error, bad)));
        }
    }

    fn expect_kind(&mut self, children: &mut Vec<SyntaxElement>, kind: TokenKind, expected: &str) {
        self.expect(children, |p| p.at_kind(kind), expected);
    }

    fn expect_keyword(&mut self, children: &mut Vec<SyntaxElement>, keyword: &str) {
        let expected = format!("'{}'", keyword);
        self.expect(children, |p| p.at_keyword(keyword), &expected);
    }

    /// Report the current token and skip ahead until `stop` holds,
    /// collecting everything skipped into one error node
    fn recover(
        &mut self,
        children: &mut Vec<SyntaxElement>,
        expected: &str,
        stop: fn(&Self) -> bool,
    ) {
        self.error(expected);
        let mut bad = Vec::new();
        self.bump(&mut bad);
        while self.current().is_some() && !stop(self) {
            self.bump(&mut bad);
        }
        debug!("recovered over {} tokens", bad.len());
        children.push(SyntaxElement::Node(SyntaxNode::new(SyntaxKind::Error, bad)));
    }

    // ==================== Parsing Methods ====================

    /// Parse a complete file
    fn parse_file(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        while self.current().is_some() {
            if self.at_item_start() {
                let item = self.parse_item();
                children.push(SyntaxElement::Node(item));
            } else {
                self.recover(
                    &mut children,
                    "'module', 'using', 'layout', 'function' or 'main'",
                    Self::at_item_start,
                );
            }
        }
        self.flush_trivia(&mut children);

        let mut root = SyntaxNode::new(SyntaxKind::File, children);
        root.span = Span::new(0, self.source.len());
        root
    }

    /// Parse a top-level item
    fn parse_item(&mut self) -> SyntaxNode {
        match self.current_lower().as_deref() {
            Some("module") => self.parse_module(),
            Some("using") => self.parse_using(),
            Some("layout") => self.parse_layout(),
            _ => self.parse_function(),
        }
    }

    /// module NAME, then items until the next module
    fn parse_module(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        self.bump(&mut children);
        self.expect(
            &mut children,
            |p| p.at_kind(TokenKind::Identifier) || p.at_keyword("main"),
            "module name",
        );

        while self.current().is_some() && !self.at_keyword("module") {
            if self.at_item_start() {
                let item = self.parse_item();
                children.push(SyntaxElement::Node(item));
            } else {
                self.recover(
                    &mut children,
                    "'using', 'layout', 'function' or 'main'",
                    Self::at_item_start,
                );
            }
        }
        SyntaxNode::new(SyntaxKind::Module, children)
    }

    fn parse_using(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        self.bump(&mut children);
        self.expect_kind(&mut children, TokenKind::Identifier, "module name");
        SyntaxNode::new(SyntaxKind::Using, children)
    }

    /// layout NAME (TYPE NAME)*
    fn parse_layout(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        self.bump(&mut children);
        self.expect_kind(&mut children, TokenKind::Identifier, "layout name");

        while self.at_kind(TokenKind::BaseType) {
            let mut member = Vec::new();
            self.bump(&mut member);
            self.expect_kind(&mut member, TokenKind::Identifier, "member name");
            children.push(SyntaxElement::Node(SyntaxNode::new(
                SyntaxKind::LayoutMember,
                member,
            )));
        }
        SyntaxNode::new(SyntaxKind::Layout, children)
    }

    /// function NAME PARAM* body ..., or main body ...
    fn parse_function(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        let is_main = self.at_keyword("main");
        self.bump(&mut children);

        if !is_main {
            self.expect_kind(&mut children, TokenKind::Identifier, "function name");
            while self.at_kind(TokenKind::Identifier) {
                let mut param = Vec::new();
                self.bump(&mut param);
                children.push(SyntaxElement::Node(SyntaxNode::new(
                    SyntaxKind::Parameter,
                    param,
                )));
            }
        }

        if self.at_keyword("body") {
            let body = self.parse_body();
            children.push(SyntaxElement::Node(body));
        } else {
            self.error("'body'");
        }
        SyntaxNode::new(SyntaxKind::Function, children)
    }

    fn parse_body(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        self.bump(&mut children);

        while self.current().is_some() && !self.at_item_start() {
            if self.at_instruction_start() {
                let inst = self.parse_instruction();
                children.push(SyntaxElement::Node(inst));
            } else {
                self.recover(&mut children, "an instruction", Self::at_sync);
            }
        }
        SyntaxNode::new(SyntaxKind::Body, children)
    }

    fn parse_instruction(&mut self) -> SyntaxNode {
        let mut children = Vec::new();
        let opcode = self.current_lower().unwrap_or_default();
        self.bump(&mut children);

        let mut operand = Vec::new();
        match opcode.as_str() {
            "push" => self.parse_push_operand(&mut operand),
            "alloc" => {
                self.expect_keyword(&mut operand, "layout");
                self.expect(
                    &mut operand,
                    |p| p.at_kind(TokenKind::Identifier) || p.at_keyword("this"),
                    "module name or 'this'",
                );
                self.expect_kind(&mut operand, TokenKind::Identifier, "layout name");
            }
            "jump" => self.expect_target(&mut operand),
            "branch" => {
                self.expect_target(&mut operand);
                self.expect_target(&mut operand);
            }
            "label" => self.expect_kind(&mut operand, TokenKind::Identifier, "label name"),
            _ => {}
        }

        if !operand.is_empty() {
            children.push(SyntaxElement::Node(SyntaxNode::new(
                SyntaxKind::Operand,
                operand,
            )));
        }
        SyntaxNode::new(SyntaxKind::Instruction, children)
    }

    fn expect_target(&mut self, operand: &mut Vec<SyntaxElement>) {
        self.expect(
            operand,
            |p| p.at_kind(TokenKind::Number) || p.at_kind(TokenKind::Identifier),
            "a label or instruction index",
        );
    }

    /// TYPE VALUE | funcp MODULE NAME | vref NAME | iref REF NAME | NAME
    fn parse_push_operand(&mut self, operand: &mut Vec<SyntaxElement>) {
        if self.at_kind(TokenKind::BaseType) {
            self.bump(operand);
            self.expect(
                operand,
                |p| {
                    matches!(
                        p.current_kind(),
                        Some(
                            TokenKind::Number
                                | TokenKind::Boolean
                                | TokenKind::String
                                | TokenKind::Identifier
                        )
                    )
                },
                "a value",
            );
        } else if self.at_keyword("funcp") {
            self.bump(operand);
            self.expect(
                operand,
                |p| {
                    p.at_kind(TokenKind::Identifier) || p.at_keyword("this") || p.at_keyword("main")
                },
                "module name",
            );
            self.expect_kind(operand, TokenKind::Identifier, "function name");
        } else if self.at_keyword("vref") || self.at_keyword("iref") {
            self.parse_reference(operand);
        } else if self.at_kind(TokenKind::Identifier) {
            self.bump(operand);
        } else {
            self.error("a type, 'funcp', 'vref', 'iref' or a name after 'push'");
        }
    }

    /// vref NAME | iref REF NAME
    ///
    /// Iterative: the `iref` prefixes are counted, then one index name is
    /// expected per prefix after the innermost `vref NAME`.
    fn parse_reference(&mut self, operand: &mut Vec<SyntaxElement>) {
        let mut depth = 0usize;
        while self.at_keyword("iref") {
            self.bump(operand);
            depth += 1;
        }

        if self.at_keyword("vref") {
            self.bump(operand);
            self.expect_kind(operand, TokenKind::Identifier, "variable name");
        } else {
            self.error("'vref' or 'iref'");
        }

        for _ in 0..depth {
            self.expect_kind(operand, TokenKind::Identifier, "index name");
        }
    }
}

/// Whether a string token ends with a closing quote of its own
fn is_terminated_string(text: &str) -> bool {
    let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) else {
        return false;
    };
    let trailing_backslashes = inner.chars().rev().take_while(|&c| c == '\\').count();
    trailing_backslashes % 2 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::demo_text;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn parse(source: &str) -> SyntaxTree {
        HydroParser::default().parse_source(source)
    }

    fn significant(source: &str) -> Vec<Token> {
        Lexer::new(source).filter(|t| !t.is_trivia()).collect()
    }

    #[test]
    fn test_demo_text_parses() {
        let source = demo_text();
        let tree = parse(source);
        assert_eq!(tree.root.kind, SyntaxKind::File);

        // The only problem is the deliberately flagged character
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].span.text(source), "~");

        let modules = tree.root.find_all(SyntaxKind::Module);
        assert_eq!(modules.len(), 1);
        assert_eq!(tree.root.find_all(SyntaxKind::Layout).len(), 1);
        assert_eq!(tree.root.find_all(SyntaxKind::LayoutMember).len(), 2);
        assert_eq!(tree.root.find_all(SyntaxKind::Using).len(), 1);
        assert_eq!(tree.root.find_all(SyntaxKind::Function).len(), 2);
        assert_eq!(tree.root.find_all(SyntaxKind::Parameter).len(), 1);
        assert_eq!(tree.root.tokens(), significant(source));
    }

    #[test]
    fn test_instructions_and_operands() {
        let source = concat!(
            "module main\n",
            "main body\n",
            "\tpush u128 20\n",
            "\tpush funcp main fib\n",
            "\tcall\n",
            "\treturn\n",
        );
        let tree = parse(source);
        assert!(!tree.has_errors());

        let insts = tree.root.find_all(SyntaxKind::Instruction);
        assert_eq!(insts.len(), 4);
        assert_eq!(insts[0].tokens().len(), 3);
        assert_eq!(insts[1].tokens().len(), 4);
        assert_eq!(insts[2].child_nodes().count(), 0);
        assert_eq!(tree.root.find_all(SyntaxKind::Operand).len(), 2);
    }

    #[test]
    fn test_references_and_alloc() {
        let source = concat!(
            "module m\n",
            "function f body\n",
            "\tpush iref vref point x\n",
            "\talloc layout this point\n",
            "\tbranch 3 done\n",
            "\tlabel done\n",
        );
        let tree = parse(source);
        assert!(tree.errors.is_empty(), "{:?}", tree.errors);
        assert_eq!(tree.root.find_all(SyntaxKind::Instruction).len(), 4);
    }

    #[test]
    fn test_deeply_nested_index_references() {
        let depth = 200_000;
        let mut source = String::from("module m\nmain body\n\tpush ");
        source.push_str(&"iref ".repeat(depth));
        source.push_str("vref x");
        for i in 0..depth {
            source.push_str(&format!(" i{}", i));
        }
        source.push_str("\n\treturn\n");

        let tree = parse(&source);
        assert!(tree.errors.is_empty(), "{:?}", tree.errors.first());
        assert_eq!(tree.root.find_all(SyntaxKind::Instruction).len(), 2);
        assert_eq!(tree.root.tokens(), significant(&source));
    }

    #[test]
    fn test_unbalanced_index_references() {
        let depth = 200_000;
        let source = format!("module m\nmain body\n\tpush {}vref x y", "iref ".repeat(depth));
        let tree = parse(&source);
        assert_eq!(tree.errors.len(), depth - 1);
        assert!(tree
            .errors
            .iter()
            .all(|e| e.message == "expected index name, found end of file"));

        let tree = parse("module m\nmain body\n\tpush iref iref 3");
        assert_eq!(tree.errors[0].message, "expected 'vref' or 'iref', found '3'");
    }

    #[test]
    fn test_keywords_are_case_insensitive() {
        let tree = parse("MODULE main\nMain BODY\n\tPush U8 1\n\tRETURN");
        assert!(!tree.has_errors());
        assert_eq!(tree.root.find_all(SyntaxKind::Instruction).len(), 2);
    }

    #[test]
    fn test_stray_tokens_at_top_level() {
        let source = "push u8 1 add\nmodule main\nmain body\n\treturn";
        let tree = parse(source);
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].span, Span::new(0, 4));
        assert!(tree.errors[0].message.contains("found 'push'"));

        let errors = tree.root.find_all(SyntaxKind::Error);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].tokens().len(), 4);
        assert_eq!(tree.root.find_all(SyntaxKind::Function).len(), 1);
        assert_eq!(tree.root.tokens(), significant(source));
    }

    #[test]
    fn test_recovers_inside_body() {
        let source = "module main\nfunction f body\n\t# 12\n\tpop\nfunction g body\n\treturn";
        let tree = parse(source);
        assert_eq!(tree.errors.len(), 1);
        assert!(tree.errors[0].message.starts_with("expected an instruction"));
        assert_eq!(tree.root.find_all(SyntaxKind::Function).len(), 2);
        assert_eq!(tree.root.find_all(SyntaxKind::Instruction).len(), 2);
    }

    #[test]
    fn test_missing_pieces() {
        let tree = parse("module\nfunction f\n\tpush\n");
        let messages: Vec<&str> = tree.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "expected module name, found 'function'",
                "expected 'body', found 'push'",
                "expected 'using', 'layout', 'function' or 'main', found 'push'",
            ]
        );
    }

    #[test]
    fn test_error_at_end_of_file() {
        let source = "module main\nmain body\n\tjump";
        let tree = parse(source);
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].span, Span::new(source.len(), source.len()));
        assert!(tree.errors[0].message.ends_with("found end of file"));
    }

    #[test]
    fn test_unterminated_string() {
        let tree = parse("module main\nmain body\n\tpush string \"open\n\treturn");
        assert_eq!(tree.errors.len(), 1);
        assert_eq!(tree.errors[0].message, "unterminated string literal");
        assert_eq!(tree.root.find_all(SyntaxKind::Instruction).len(), 2);
    }

    #[test]
    fn test_string_termination() {
        assert!(is_terminated_string("\"hi\""));
        assert!(is_terminated_string("\"a\\\\\""));
        assert!(!is_terminated_string("\"a\\\""));
        assert!(!is_terminated_string("\"open"));
        assert!(!is_terminated_string("\""));
    }

    #[test]
    fn test_retained_trivia_covers_source() {
        let source = "% header\nmodule main % trailing\nmain body\n\treturn\n";
        let parser = HydroParser::new(ParserConfig {
            retain_trivia: true,
        });
        let tree = parser.parse_source(source);
        assert!(!tree.has_errors());
        assert_eq!(tree.root.tokens(), Lexer::new(source).tokenize());
        assert_eq!(tree.root.span, Span::new(0, source.len()));
    }

    #[test]
    fn test_empty_file() {
        let tree = parse("");
        assert!(!tree.has_errors());
        assert!(tree.root.children.is_empty());
        assert_eq!(HydroParser::default().file_node_type(), SyntaxKind::File);
    }

    proptest! {
        #[test]
        fn prop_tree_keeps_every_token(source in "[a-z0-9 \t\n%\"._#-]{0,80}") {
            let tree = parse(&source);
            prop_assert_eq!(tree.root.kind, SyntaxKind::File);
            prop_assert_eq!(tree.root.tokens(), significant(&source));
        }

        #[test]
        fn prop_keywords_never_panic(
            words in proptest::collection::vec(
                proptest::sample::select(vec![
                    "module", "using", "layout", "function", "main", "body", "push", "funcp",
                    "vref", "iref", "alloc", "label", "jump", "branch", "this", "u8", "x",
                    "1", "true", "\"s\"", "#", "\n",
                ]),
                0..40,
            )
        ) {
            let source = words.join(" ");
            let parser = HydroParser::new(ParserConfig { retain_trivia: true });
            let tree = parser.parse_source(&source);
            prop_assert_eq!(tree.root.tokens(), Lexer::new(&source).tokenize());
        }
    }
}
