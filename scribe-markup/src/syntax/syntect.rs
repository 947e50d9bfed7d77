//! Syntect-based syntax highlighting backend enhanced with two-face.
//!
//! Grammars are Sublime Text syntax definitions (the extended set shipped by
//! two-face, which adds TypeScript, TOML, Nix and friends). Themes come from
//! syntect's defaults plus the two-face theme pack.

use std::sync::OnceLock;

use syntect::{
  highlighting::{Theme, ThemeSet},
  html::{ClassStyle, ClassedHTMLGenerator, css_for_theme_with_class_style},
  parsing::SyntaxSet,
  util::LinesWithEndings,
};
use two_face::theme::{EmbeddedLazyThemeSet, EmbeddedThemeName};

use super::{
  error::{SyntaxError, SyntaxResult},
  types::{CLASS_PREFIX, SyntaxConfig, SyntaxHighlighter, SyntaxManager},
};

const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed {
  prefix: CLASS_PREFIX,
};

const EMBEDDED_THEMES: &[(&str, EmbeddedThemeName)] = &[
  ("Ansi", EmbeddedThemeName::Ansi),
  ("Base16", EmbeddedThemeName::Base16),
  ("Base16EightiesDark", EmbeddedThemeName::Base16EightiesDark),
  ("Base16MochaDark", EmbeddedThemeName::Base16MochaDark),
  ("Base16OceanDark", EmbeddedThemeName::Base16OceanDark),
  ("Base16OceanLight", EmbeddedThemeName::Base16OceanLight),
  ("Base16_256", EmbeddedThemeName::Base16_256),
  ("CatppuccinFrappe", EmbeddedThemeName::CatppuccinFrappe),
  ("CatppuccinLatte", EmbeddedThemeName::CatppuccinLatte),
  ("CatppuccinMacchiato", EmbeddedThemeName::CatppuccinMacchiato),
  ("CatppuccinMocha", EmbeddedThemeName::CatppuccinMocha),
  ("ColdarkCold", EmbeddedThemeName::ColdarkCold),
  ("ColdarkDark", EmbeddedThemeName::ColdarkDark),
  ("DarkNeon", EmbeddedThemeName::DarkNeon),
  ("Dracula", EmbeddedThemeName::Dracula),
  ("Github", EmbeddedThemeName::Github),
  ("GruvboxDark", EmbeddedThemeName::GruvboxDark),
  ("GruvboxLight", EmbeddedThemeName::GruvboxLight),
  ("InspiredGithub", EmbeddedThemeName::InspiredGithub),
  ("Leet", EmbeddedThemeName::Leet),
  ("MonokaiExtended", EmbeddedThemeName::MonokaiExtended),
  ("MonokaiExtendedBright", EmbeddedThemeName::MonokaiExtendedBright),
  ("MonokaiExtendedLight", EmbeddedThemeName::MonokaiExtendedLight),
  ("MonokaiExtendedOrigin", EmbeddedThemeName::MonokaiExtendedOrigin),
  ("Nord", EmbeddedThemeName::Nord),
  ("OneHalfDark", EmbeddedThemeName::OneHalfDark),
  ("OneHalfLight", EmbeddedThemeName::OneHalfLight),
  ("SolarizedDark", EmbeddedThemeName::SolarizedDark),
  ("SolarizedLight", EmbeddedThemeName::SolarizedLight),
  ("SublimeSnazzy", EmbeddedThemeName::SublimeSnazzy),
  ("TwoDark", EmbeddedThemeName::TwoDark),
  ("Zenburn", EmbeddedThemeName::Zenburn),
];

/// Syntect-based syntax highlighter
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntectHighlighter;

impl SyntectHighlighter {
  fn syntax_set() -> &'static SyntaxSet {
    static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
    SYNTAX_SET.get_or_init(two_face::syntax::extra_newlines)
  }

  fn theme_set() -> &'static EmbeddedLazyThemeSet {
    static THEME_SET: OnceLock<EmbeddedLazyThemeSet> = OnceLock::new();
    THEME_SET.get_or_init(two_face::theme::extra)
  }

  fn default_theme_set() -> &'static ThemeSet {
    static DEFAULT_THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
    DEFAULT_THEME_SET.get_or_init(ThemeSet::load_defaults)
  }

  /// Find a theme by name, ignoring case.
  fn find_theme(name: &str) -> Option<&'static Theme> {
    let default_themes = &Self::default_theme_set().themes;
    if let Some((_, theme)) = default_themes
      .iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(name))
    {
      return Some(theme);
    }

    EMBEDDED_THEMES
      .iter()
      .find(|(key, _)| key.eq_ignore_ascii_case(name))
      .map(|(_, embedded)| Self::theme_set().get(*embedded))
  }
}

impl SyntaxHighlighter for SyntectHighlighter {
  fn name(&self) -> &'static str {
    "Syntect"
  }

  fn supported_languages(&self) -> Vec<String> {
    Self::syntax_set()
      .syntaxes()
      .iter()
      .flat_map(|syntax| {
        std::iter::once(syntax.name.to_lowercase())
          .chain(syntax.file_extensions.iter().map(|ext| ext.to_lowercase()))
      })
      .collect()
  }

  fn available_themes(&self) -> Vec<String> {
    let mut themes: Vec<String> = Self::default_theme_set()
      .themes
      .keys()
      .cloned()
      .chain(EMBEDDED_THEMES.iter().map(|(name, _)| (*name).to_string()))
      .collect();
    themes.sort();
    themes.dedup();
    themes
  }

  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String> {
    let syntax_set = Self::syntax_set();
    let syntax = syntax_set
      .find_syntax_by_token(language)
      .ok_or_else(|| SyntaxError::UnsupportedLanguage(language.to_string()))?;

    let mut generator =
      ClassedHTMLGenerator::new_with_class_style(syntax, syntax_set, CLASS_STYLE);
    for line in LinesWithEndings::from(code) {
      generator
        .parse_html_for_line_which_includes_newline(line)
        .map_err(|e| SyntaxError::HighlightingFailed(e.to_string()))?;
    }

    Ok(generator.finalize())
  }

  fn theme_css(&self, theme: &str) -> SyntaxResult<String> {
    let resolved = Self::find_theme(theme)
      .ok_or_else(|| SyntaxError::ThemeNotFound(theme.to_string()))?;
    css_for_theme_with_class_style(resolved, CLASS_STYLE).map_err(|e| {
      SyntaxError::Stylesheet {
        theme:   theme.to_string(),
        message: e.to_string(),
      }
    })
  }

  fn language_from_extension(&self, extension: &str) -> Option<String> {
    Self::syntax_set()
      .find_syntax_by_extension(extension)
      .map(|syntax| syntax.name.to_lowercase())
  }
}

/// Create a Syntect-based syntax manager with the default configuration.
#[must_use]
pub fn create_syntect_manager() -> SyntaxManager {
  SyntaxManager::new(Box::new(SyntectHighlighter), SyntaxConfig::default())
}
