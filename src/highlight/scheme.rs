//! Color schemes for terminal rendering
//!
//! A scheme is a JSON object keyed by display category:
//!
//! ```json
//! { "keyword": { "fg": "blue", "bold": true }, "comment": { "fg": "bright_black" } }
//! ```
//!
//! Categories left out keep their default style.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crossterm::style::{Attribute, Color as TermColor, ContentStyle};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::highlight::{DisplayCategory, HighlightSpan};
use crate::utils::{Error, Result};

/// Terminal foreground colors, as named in scheme files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl From<Color> for TermColor {
    fn from(color: Color) -> Self {
        match color {
            Color::Black => TermColor::Black,
            Color::Red => TermColor::DarkRed,
            Color::Green => TermColor::DarkGreen,
            Color::Yellow => TermColor::DarkYellow,
            Color::Blue => TermColor::DarkBlue,
            Color::Magenta => TermColor::DarkMagenta,
            Color::Cyan => TermColor::DarkCyan,
            Color::White => TermColor::Grey,
            Color::BrightBlack => TermColor::DarkGrey,
            Color::BrightRed => TermColor::Red,
            Color::BrightGreen => TermColor::Green,
            Color::BrightYellow => TermColor::Yellow,
            Color::BrightBlue => TermColor::Blue,
            Color::BrightMagenta => TermColor::Magenta,
            Color::BrightCyan => TermColor::Cyan,
            Color::BrightWhite => TermColor::White,
        }
    }
}

/// Text attributes for one category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    pub fg: Option<Color>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

impl Style {
    pub const fn fg(color: Color) -> Self {
        Self {
            fg: Some(color),
            bold: false,
            italic: false,
            underline: false,
        }
    }

    /// The equivalent terminal style
    pub fn content_style(&self) -> ContentStyle {
        let mut style = ContentStyle::new();
        style.foreground_color = self.fg.map(TermColor::from);
        if self.bold {
            style.attributes.set(Attribute::Bold);
        }
        if self.italic {
            style.attributes.set(Attribute::Italic);
        }
        if self.underline {
            style.attributes.set(Attribute::Underlined);
        }
        style
    }

    /// `text` wrapped in this style's escape sequences; the plain style
    /// returns it unchanged
    pub fn paint(&self, text: &str) -> String {
        self.content_style().apply(text).to_string()
    }
}

/// Category to style mapping
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorScheme {
    styles: HashMap<DisplayCategory, Style>,
}

impl Default for ColorScheme {
    fn default() -> Self {
        let styles = HashMap::from([
            (
                DisplayCategory::BadCharacter,
                Style {
                    underline: true,
                    ..Style::fg(Color::Red)
                },
            ),
            (DisplayCategory::Type, Style::fg(Color::Cyan)),
            (
                DisplayCategory::Comment,
                Style {
                    italic: true,
                    ..Style::fg(Color::BrightBlack)
                },
            ),
            (DisplayCategory::Identifier, Style::default()),
            (
                DisplayCategory::Keyword,
                Style {
                    bold: true,
                    ..Style::fg(Color::Blue)
                },
            ),
            (DisplayCategory::Number, Style::fg(Color::Magenta)),
            (DisplayCategory::String, Style::fg(Color::Green)),
        ]);
        Self { styles }
    }
}

impl ColorScheme {
    /// Parse a scheme, filling unspecified categories from the default
    pub fn from_json(json: &str) -> Result<Self> {
        let overrides: HashMap<DisplayCategory, Style> =
            serde_json::from_str(json).map_err(|e| Error::Scheme(e.to_string()))?;
        if overrides.contains_key(&DisplayCategory::None) {
            return Err(Error::Scheme(
                "the 'none' category cannot be styled".to_string(),
            ));
        }
        let mut scheme = Self::default();
        debug!("color scheme overrides {} categories", overrides.len());
        scheme.styles.extend(overrides);
        Ok(scheme)
    }

    /// Load a scheme file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn style(&self, category: DisplayCategory) -> Style {
        self.styles.get(&category).copied().unwrap_or_default()
    }

    /// Render `source` with terminal escapes; text outside the highlights is
    /// written as is
    ///
    /// Highlights are expected in source order. Ones that overlap an earlier
    /// highlight, or that do not fall on character boundaries of `source`
    /// (highlights computed for another text), are skipped.
    pub fn render_ansi(&self, source: &str, highlights: &[HighlightSpan]) -> String {
        let mut out = String::with_capacity(source.len() * 2);
        let mut end = 0;
        for highlight in highlights {
            let span = highlight.span;
            if span.start < end {
                continue;
            }
            let gap = source.get(end..span.start);
            let text = source.get(span.start..span.end);
            let (Some(gap), Some(text)) = (gap, text) else {
                debug!("skipping highlight {}..{} outside the text", span.start, span.end);
                continue;
            };
            out.push_str(gap);
            out.push_str(&self.style(highlight.category).paint(text));
            end = span.end;
        }
        out.push_str(source.get(end..).unwrap_or_default());
        out
    }
}
