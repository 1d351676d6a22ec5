//! Hydro command line tool
//!
//! Lexes, highlights and checks Hydro source files.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::{debug, info};

use hydro_lang::feedback::{tokens_to_json, CheckFeedback};
use hydro_lang::frontend::parser::{GrammarParser, HydroParser, ParserConfig};
use hydro_lang::highlight::scheme::ColorScheme;
use hydro_lang::highlight::{self, classify, Highlighter};
use hydro_lang::{LanguageDescriptor, LanguageRegistry};

/// Hydro language tool
#[derive(Parser, Debug)]
#[command(name = "hydroc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Hydro language tool - lexer, highlighter and syntax checker")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token stream of a source file
    Tokens {
        /// Input source file (.h2o)
        input: PathBuf,

        /// Emit JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },
    /// Print a source file with terminal colors
    Highlight {
        /// Input source file (.h2o)
        input: PathBuf,

        /// Color scheme (JSON)
        #[arg(long, value_name = "FILE")]
        scheme: Option<PathBuf>,
    },
    /// Print the syntax tree of a source file
    Tree {
        /// Input source file (.h2o)
        input: PathBuf,

        /// Keep whitespace and comments in the tree
        #[arg(long)]
        keep_trivia: bool,
    },
    /// Check a source file for syntax errors
    Check {
        /// Input source file (.h2o)
        input: PathBuf,

        /// Emit a JSON report
        #[arg(long)]
        json: bool,
    },
    /// Print the highlighted demo text
    Demo {
        /// Color scheme (JSON)
        #[arg(long, value_name = "FILE")]
        scheme: Option<PathBuf>,
    },
    /// List the highlight categories
    Attributes,
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Tokens { input, json } => print_tokens(input, *json),
        Commands::Highlight { input, scheme } => highlight_file(input, scheme.as_deref()),
        Commands::Tree { input, keep_trivia } => print_tree(input, *keep_trivia),
        Commands::Check { input, json } => check_file(input, *json),
        Commands::Demo { scheme } => print_demo(scheme.as_deref()),
        Commands::Attributes => {
            print_attributes();
            Ok(())
        }
        Commands::Version => {
            println!("hydroc {}", env!("CARGO_PKG_VERSION"));
            println!("Hydro language tool");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Resolve the language for `path` and read the file
fn load_source(path: &Path) -> anyhow::Result<(&'static LanguageDescriptor, String)> {
    let language = LanguageRegistry::global().for_path(path)?;
    let source = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    info!("{}: {} bytes as {}", path.display(), source.len(), language.name);
    Ok((language, source))
}

fn load_scheme(path: Option<&Path>) -> anyhow::Result<ColorScheme> {
    match path {
        Some(path) => ColorScheme::load(path)
            .with_context(|| format!("could not load color scheme {}", path.display())),
        None => Ok(ColorScheme::default()),
    }
}

fn print_tokens(input: &Path, json: bool) -> anyhow::Result<()> {
    let (language, source) = load_source(input)?;
    let tokens = language.lexer().tokenize(&source);

    if json {
        println!("{}", tokens_to_json(&tokens, &source));
        return Ok(());
    }
    for token in &tokens {
        println!(
            "{:<14} {:<10} {:>5}..{:<5} {:?}",
            token.kind.debug_name(),
            format!("{:?}", classify(token.kind)),
            token.span.start,
            token.span.end,
            token.text(&source)
        );
    }
    Ok(())
}

fn highlight_file(input: &Path, scheme: Option<&Path>) -> anyhow::Result<()> {
    let (language, source) = load_source(input)?;
    let scheme = load_scheme(scheme)?;
    let highlights = Highlighter::for_language(language).highlight(&source);
    print!("{}", scheme.render_ansi(&source, &highlights));
    Ok(())
}

fn print_tree(input: &Path, keep_trivia: bool) -> anyhow::Result<()> {
    let (language, source) = load_source(input)?;
    let tokens = language.lexer().tokenize(&source);

    let parser = HydroParser::new(ParserConfig {
        retain_trivia: keep_trivia,
    });
    debug!("parsing with {:?}", parser.config());
    let tree = parser.parse(&source, &tokens);

    print!("{}", tree.dump(&source));
    for error in &tree.errors {
        eprintln!("{}: {}", input.display(), error);
    }
    Ok(())
}

fn check_file(input: &Path, json: bool) -> anyhow::Result<()> {
    let (language, source) = load_source(input)?;
    let tokens = language.lexer().tokenize(&source);
    let tree = language.parser().parse(&source, &tokens);

    let file_name = input.display().to_string();
    let feedback = CheckFeedback::new(&file_name, &source, &tokens, &tree);

    if json {
        println!("{}", feedback.to_json());
    } else {
        for report in &feedback.diagnostics {
            eprintln!("{}", report.to_line());
        }
    }

    if !feedback.success {
        bail!("{} syntax error(s) in {}", feedback.diagnostics.len(), file_name);
    }
    if !json {
        println!("✓ {} is syntactically valid", file_name);
    }
    Ok(())
}

fn print_demo(scheme: Option<&Path>) -> anyhow::Result<()> {
    let language = LanguageRegistry::global().by_name(highlight::DISPLAY_NAME)?;
    let scheme = load_scheme(scheme)?;
    let source = highlight::demo_text();
    let highlights = Highlighter::for_language(language).highlight(source);
    print!("{}", scheme.render_ansi(source, &highlights));
    Ok(())
}

fn print_attributes() {
    println!("{}", highlight::DISPLAY_NAME);
    for descriptor in highlight::attribute_descriptors() {
        let category = descriptor.category;
        println!(
            "  {:<16} {:<20} (falls back to {})",
            descriptor.label,
            category.external_name().unwrap_or("-"),
            category.fallback_name().unwrap_or("-")
        );
    }
}
