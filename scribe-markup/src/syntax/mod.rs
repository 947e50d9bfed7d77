//! Pluggable syntax highlighting.
//!
//! Highlighters emit class-annotated spans rather than inline colours, so the
//! markup for a code block depends only on its text and language. Colours
//! come from a stylesheet generated per theme with
//! [`SyntaxHighlighter::theme_css`]. All grammars and themes are compiled in.

pub mod error;
pub mod types;

pub use error::{SyntaxError, SyntaxResult};
pub use types::{CLASS_PREFIX, SyntaxConfig, SyntaxHighlighter, SyntaxManager};

#[cfg(feature = "syntect")] mod syntect;
#[cfg(feature = "syntect")] pub use self::syntect::*;

/// Create the default syntax manager based on available features.
///
/// # Errors
///
/// Returns [`SyntaxError::NoBackendAvailable`] when the crate was built
/// without a highlighting backend.
pub fn create_default_manager() -> SyntaxResult<SyntaxManager> {
  #[cfg(feature = "syntect")]
  {
    Ok(create_syntect_manager())
  }

  #[cfg(not(feature = "syntect"))]
  {
    Err(SyntaxError::NoBackendAvailable)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_syntax_config_default() {
    let config = SyntaxConfig::default();
    assert!(config.fallback_to_plain);
    assert_eq!(config.language_aliases["js"], "javascript");
    assert_eq!(config.language_aliases["mdx"], "markdown");
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_syntect_highlighter() {
    let highlighter = SyntectHighlighter;
    assert_eq!(highlighter.name(), "Syntect");
    assert!(highlighter.supports_language("rust"));
    assert!(!highlighter.available_themes().is_empty());
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_highlight_uses_classes() {
    let html = SyntectHighlighter
      .highlight("fn main() {}\n", "rust")
      .expect("Failed to highlight code");
    assert!(html.contains(&format!("class=\"{CLASS_PREFIX}")));
    assert!(!html.contains("style="));
    assert!(html.contains("main"));
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_highlight_escapes_markup() {
    let html = SyntectHighlighter
      .highlight("const x = \"a<b>&c\";\n", "js")
      .expect("Failed to highlight code");
    assert!(!html.contains("<b>"));
    assert!(html.contains("&lt;b&gt;"));
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_manager_language_fallback() {
    let manager = create_default_manager().expect("Failed to create manager");
    assert_eq!(manager.resolve_language("js"), "javascript");
    assert_eq!(manager.resolve_language("rust"), "rust");

    let html = manager
      .highlight_code("<not> code", "no-such-language")
      .expect("Plain text fallback should succeed");
    assert_eq!(html, "&lt;not&gt; code");
  }

  #[cfg(feature = "syntect")]
  #[test]
  fn test_theme_css() {
    let manager = create_default_manager().expect("Failed to create manager");
    let css = manager
      .theme_css("github-dark")
      .expect("Default theme should resolve");
    assert!(css.contains(CLASS_PREFIX));

    assert!(manager.theme_css("nord").is_ok());
    assert!(matches!(
      manager.theme_css("no-such-theme"),
      Err(SyntaxError::ThemeNotFound(_))
    ));
  }
}
