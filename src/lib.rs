//! Hydro language support
//!
//! Lexer, parser and syntax highlighting for Hydro (`.h2o`) source files,
//! bound together by a language registry that editor hosts and the
//! `hydroc` tool route files through.

pub mod utils;
pub mod frontend;
pub mod highlight;
pub mod language;
pub mod feedback;

pub use language::{LanguageDescriptor, LanguageRegistry};
pub use utils::{Error, Result};
