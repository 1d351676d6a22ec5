//! Syntax tree definitions for Hydro
//!
//! A concrete tree: every significant token of the file sits in exactly one
//! leaf, in source order. Nodes only group tokens.

use std::fmt::Write as _;

use serde::Serialize;

use crate::frontend::token::Token;
use crate::utils::{Span, SyntaxError};

/// Node types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SyntaxKind {
    /// Root of every tree
    File,
    /// module NAME, followed by the items that belong to it
    Module,
    /// using NAME
    Using,
    /// layout NAME with its members
    Layout,
    /// TYPE NAME inside a layout
    LayoutMember,
    /// function NAME PARAMS body ..., or main body ...
    Function,
    Parameter,
    Body,
    Instruction,
    /// Everything after an opcode
    Operand,
    /// Tokens the grammar could not place
    Error,
}

impl SyntaxKind {
    pub fn is_file(&self) -> bool {
        matches!(self, SyntaxKind::File)
    }

    pub fn debug_name(&self) -> &'static str {
        match self {
            SyntaxKind::File => "FILE",
            SyntaxKind::Module => "MODULE",
            SyntaxKind::Using => "USING",
            SyntaxKind::Layout => "LAYOUT",
            SyntaxKind::LayoutMember => "LAYOUT_MEMBER",
            SyntaxKind::Function => "FUNCTION",
            SyntaxKind::Parameter => "PARAMETER",
            SyntaxKind::Body => "BODY",
            SyntaxKind::Instruction => "INSTRUCTION",
            SyntaxKind::Operand => "OPERAND",
            SyntaxKind::Error => "ERROR_ELEMENT",
        }
    }
}

/// A child of a node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(Token),
}

impl SyntaxElement {
    pub fn span(&self) -> Span {
        match self {
            SyntaxElement::Node(node) => node.span,
            SyntaxElement::Token(token) => token.span,
        }
    }
}

/// An interior node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntaxNode {
    pub kind: SyntaxKind,
    pub span: Span,
    pub children: Vec<SyntaxElement>,
}

impl SyntaxNode {
    /// Build a node whose span covers its children
    pub fn new(kind: SyntaxKind, children: Vec<SyntaxElement>) -> Self {
        let span = match (children.first(), children.last()) {
            (Some(first), Some(last)) => first.span().merge(&last.span()),
            _ => Span::default(),
        };
        Self {
            kind,
            span,
            children,
        }
    }

    /// Child nodes, skipping tokens
    pub fn child_nodes(&self) -> impl Iterator<Item = &SyntaxNode> {
        self.children.iter().filter_map(|child| match child {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        })
    }

    /// All leaf tokens below this node, in source order
    pub fn tokens(&self) -> Vec<Token> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens(&self, out: &mut Vec<Token>) {
        for child in &self.children {
            match child {
                SyntaxElement::Node(node) => node.collect_tokens(out),
                SyntaxElement::Token(token) => out.push(*token),
            }
        }
    }

    /// This node and every node below it, pre-order
    pub fn descendants(&self) -> Vec<&SyntaxNode> {
        let mut out = vec![self];
        for child in self.child_nodes() {
            out.extend(child.descendants());
        }
        out
    }

    /// Every descendant of the given kind
    pub fn find_all(&self, kind: SyntaxKind) -> Vec<&SyntaxNode> {
        self.descendants()
            .into_iter()
            .filter(|n| n.kind == kind)
            .collect()
    }
}

/// A parsed file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyntaxTree {
    pub root: SyntaxNode,
    /// Recovered problems, in the order they were found
    pub errors: Vec<SyntaxError>,
}

impl SyntaxTree {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Indented dump in the style of a PSI viewer
    pub fn dump(&self, source: &str) -> String {
        let mut out = String::new();
        dump_node(&self.root, source, 0, &mut out);
        out
    }
}

fn dump_node(node: &SyntaxNode, source: &str, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    if node.kind.is_file() {
        let _ = writeln!(out, "{}Hydro File({},{})", indent, node.span.start, node.span.end);
    } else {
        let _ = writeln!(
            out,
            "{}HydroElementType.{}({},{})",
            indent,
            node.kind.debug_name(),
            node.span.start,
            node.span.end
        );
    }
    for child in &node.children {
        match child {
            SyntaxElement::Node(child) => dump_node(child, source, depth + 1, out),
            SyntaxElement::Token(token) => {
                let _ = writeln!(
                    out,
                    "{}  {}({},{}) {:?}",
                    indent,
                    token.kind,
                    token.span.start,
                    token.span.end,
                    token.text(source)
                );
            }
        }
    }
}
