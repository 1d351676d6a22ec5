//! Language and file type identity
//!
//! One descriptor per language binds the name, file extension and icon to
//! the lexer, the parser and the token sets host services special-case.
//! Descriptors live in a process-wide registry that is built once and
//! never mutated.

use std::path::Path;
use std::sync::OnceLock;

use log::debug;

use crate::frontend::lexer::{HydroLexerAdapter, LexerAdapter};
use crate::frontend::parser::{GrammarParser, HydroParser};
use crate::frontend::token::TokenSetGroup;
use crate::utils::{Error, Result};

/// Everything a host needs to route a file to this language's tooling
#[derive(Debug)]
pub struct LanguageDescriptor {
    /// Language id, e.g. "Hydro"
    pub name: &'static str,
    pub file_type_name: &'static str,
    pub description: &'static str,
    /// Without the leading dot
    pub default_extension: &'static str,
    pub icon: &'static str,
    pub token_sets: TokenSetGroup,
    lexer: Box<dyn LexerAdapter>,
    parser: Box<dyn GrammarParser>,
}

impl LanguageDescriptor {
    /// The Hydro language
    pub fn hydro() -> Self {
        Self {
            name: "Hydro",
            file_type_name: "Hydro Source File",
            description: "Hydro source file",
            default_extension: "h2o",
            icon: "icons/hydro.svg",
            token_sets: TokenSetGroup::HYDRO,
            lexer: Box::new(HydroLexerAdapter),
            parser: Box::new(HydroParser::default()),
        }
    }

    pub fn lexer(&self) -> &dyn LexerAdapter {
        self.lexer.as_ref()
    }

    pub fn parser(&self) -> &dyn GrammarParser {
        self.parser.as_ref()
    }
}

/// Read-only set of known languages
#[derive(Debug)]
pub struct LanguageRegistry {
    languages: Vec<LanguageDescriptor>,
}

impl LanguageRegistry {
    /// Build a registry from descriptors
    pub fn new(languages: Vec<LanguageDescriptor>) -> Self {
        Self { languages }
    }

    /// The process-wide registry
    pub fn global() -> &'static LanguageRegistry {
        static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| {
            let registry = LanguageRegistry::new(vec![LanguageDescriptor::hydro()]);
            debug!("language registry initialized with {} languages", registry.languages.len());
            registry
        })
    }

    pub fn languages(&self) -> &[LanguageDescriptor] {
        &self.languages
    }

    /// Look up by language name, ignoring case
    pub fn by_name(&self, name: &str) -> Result<&LanguageDescriptor> {
        self.languages
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::UnknownLanguage {
                name: name.to_string(),
            })
    }

    /// Look up by file extension, with or without the leading dot
    pub fn by_extension(&self, extension: &str) -> Option<&LanguageDescriptor> {
        let extension = extension.strip_prefix('.').unwrap_or(extension);
        self.languages
            .iter()
            .find(|l| l.default_extension.eq_ignore_ascii_case(extension))
    }

    /// Look up by the extension of `path`
    pub fn for_path(&self, path: &Path) -> Result<&LanguageDescriptor> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.by_extension(e))
            .ok_or_else(|| Error::UnsupportedFile {
                path: path.display().to_string(),
            })
    }
}
