//! Frontend module - Tokens, Lexer, Syntax Tree, Parser

pub mod token;
pub mod lexer;
pub mod ast;
pub mod parser;
