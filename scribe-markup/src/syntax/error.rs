//! Errors raised by highlighting backends.

pub type SyntaxResult<T> = Result<T, SyntaxError>;

#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
  /// No grammar matches the fence's language tag or its aliases.
  #[error("no grammar for language '{0}'")]
  UnsupportedLanguage(String),

  #[error("no bundled theme named '{0}'")]
  ThemeNotFound(String),

  /// The backend failed while tokenizing a code block.
  #[error("failed to highlight code: {0}")]
  HighlightingFailed(String),

  #[error("failed to build the stylesheet for theme '{theme}': {message}")]
  Stylesheet { theme: String, message: String },

  #[error("scribe-markup was built without a highlighting backend")]
  NoBackendAvailable,
}
