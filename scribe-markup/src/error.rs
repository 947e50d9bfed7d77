//! Error types for the markup transformer.

use crate::syntax::SyntaxError;

/// Errors raised while transforming a body.
///
/// These only occur when a pipeline stage itself breaks. Problems in the
/// body (malformed components, unknown tags) are diagnostics, not errors.
#[derive(Debug, thiserror::Error)]
pub enum MarkupError {
  #[error("Transformation failed: {0}")]
  Transform(String),

  #[error("Syntax highlighting error: {0}")]
  Syntax(#[from] SyntaxError),
}
