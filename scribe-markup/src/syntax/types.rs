//! Core types and traits for syntax highlighting.

use std::collections::HashMap;

use super::error::{SyntaxError, SyntaxResult};
use crate::utils::escape_html;

/// Prefix of every token class emitted by a highlighter.
pub const CLASS_PREFIX: &str = "hl-";

/// Trait for syntax highlighting backends.
///
/// Implementations classify tokens and wrap them in `<span>` elements whose
/// classes start with [`CLASS_PREFIX`]. The text content of the output must
/// equal the input code exactly; only markup may be added.
pub trait SyntaxHighlighter: Send + Sync {
  /// Get the name of this highlighter backend
  fn name(&self) -> &'static str;

  /// Get a list of supported languages
  fn supported_languages(&self) -> Vec<String>;

  /// Get a list of available themes
  fn available_themes(&self) -> Vec<String>;

  /// Check if a language is supported
  fn supports_language(&self, language: &str) -> bool {
    self
      .supported_languages()
      .iter()
      .any(|lang| lang.eq_ignore_ascii_case(language))
  }

  /// Highlight code in the given language (case-insensitive).
  fn highlight(&self, code: &str, language: &str) -> SyntaxResult<String>;

  /// Stylesheet mapping token classes to the colours of `theme`.
  fn theme_css(&self, theme: &str) -> SyntaxResult<String>;

  /// Detect language from a file extension
  fn language_from_extension(&self, extension: &str) -> Option<String>;
}

/// Configuration for syntax highlighting
#[derive(Debug, Clone)]
pub struct SyntaxConfig {
  /// Language aliases for mapping common names to supported languages
  pub language_aliases: HashMap<String, String>,

  /// Theme aliases for names that have no bundled theme of their own
  pub theme_aliases: HashMap<String, String>,

  /// Whether to fall back to plain text for unsupported languages
  pub fallback_to_plain: bool,
}

impl Default for SyntaxConfig {
  fn default() -> Self {
    let language_aliases = [
      ("js", "javascript"),
      ("ts", "typescript"),
      ("py", "python"),
      ("rb", "ruby"),
      ("sh", "bash"),
      ("shell", "bash"),
      ("zsh", "bash"),
      ("yml", "yaml"),
      ("md", "markdown"),
      ("mdx", "markdown"),
    ]
    .into_iter()
    .map(|(alias, language)| (alias.to_string(), language.to_string()))
    .collect();

    let theme_aliases = [
      ("github-dark", "OneHalfDark"),
      ("github-light", "Github"),
      ("github", "Github"),
    ]
    .into_iter()
    .map(|(alias, theme)| (alias.to_string(), theme.to_string()))
    .collect();

    Self {
      language_aliases,
      theme_aliases,
      fallback_to_plain: true,
    }
  }
}

/// High-level syntax highlighting manager.
///
/// Manages a syntax highlighting backend and provides alias resolution and
/// plain-text fallback on top of it.
pub struct SyntaxManager {
  highlighter: Box<dyn SyntaxHighlighter>,
  config:      SyntaxConfig,
}

impl std::fmt::Debug for SyntaxManager {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SyntaxManager")
      .field("highlighter", &self.highlighter.name())
      .field("config", &self.config)
      .finish()
  }
}

impl SyntaxManager {
  /// Create a new syntax manager with the given highlighter and config
  #[must_use]
  pub fn new(
    highlighter: Box<dyn SyntaxHighlighter>,
    config: SyntaxConfig,
  ) -> Self {
    Self {
      highlighter,
      config,
    }
  }

  /// Get the underlying highlighter
  #[must_use]
  pub fn highlighter(&self) -> &dyn SyntaxHighlighter {
    self.highlighter.as_ref()
  }

  /// Get the configuration
  #[must_use]
  pub const fn config(&self) -> &SyntaxConfig {
    &self.config
  }

  /// Resolve a language name using aliases
  #[must_use]
  pub fn resolve_language(&self, language: &str) -> String {
    let lowered = language.to_ascii_lowercase();
    self
      .config
      .language_aliases
      .get(&lowered)
      .cloned()
      .unwrap_or(lowered)
  }

  /// Highlight code with alias resolution and plain-text fallback.
  ///
  /// # Errors
  ///
  /// Returns [`SyntaxError::UnsupportedLanguage`] when the language is
  /// unknown and plain-text fallback is disabled, or the backend's error if
  /// highlighting itself fails.
  pub fn highlight_code(
    &self,
    code: &str,
    language: &str,
  ) -> SyntaxResult<String> {
    let resolved_language = self.resolve_language(language);

    if self.highlighter.supports_language(&resolved_language) {
      return self.highlighter.highlight(code, &resolved_language);
    }

    if self.config.fallback_to_plain {
      return Ok(escape_html(code));
    }

    Err(SyntaxError::UnsupportedLanguage(resolved_language))
  }

  /// Stylesheet for a theme, resolving theme aliases first.
  ///
  /// # Errors
  ///
  /// Returns [`SyntaxError::ThemeNotFound`] if no bundled theme matches.
  pub fn theme_css(&self, theme: &str) -> SyntaxResult<String> {
    let theme = self
      .config
      .theme_aliases
      .get(theme)
      .map_or(theme, String::as_str);
    self.highlighter.theme_css(theme)
  }
}
