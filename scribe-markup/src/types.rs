//! Types for the scribe-markup public API.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::components::EmbeddedComponent;

/// Represents a heading in a rendered document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
  /// Heading text (inline content, no markup).
  pub text:  String,
  /// Heading level (1-6).
  pub level: u8,
  /// Slug used as the heading's `id`.
  pub id:    String,
}

/// A recoverable problem found while transforming a body.
///
/// Diagnostics never abort a transformation. Positions are 1-based and refer
/// to the body as it was handed to the transformer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
  pub message: String,
  pub line:    usize,
  pub column:  usize,
}

impl Diagnostic {
  #[must_use]
  pub fn new(message: impl Into<String>, line: usize, column: usize) -> Self {
    Self {
      message: message.into(),
      line,
      column,
    }
  }
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}:{}: {}", self.line, self.column, self.message)
  }
}

/// Result of transforming one document body.
///
/// A pure function of the body and the transformer's options: the same body
/// always yields a byte-identical `html`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RenderedMarkup {
  /// Sanitized, highlighted HTML. Embedded components appear verbatim.
  pub html: String,

  /// Headings in document order (for `ToC`, navigation, etc).
  pub headers: Vec<Header>,

  /// Text of the first level-1 heading, if any.
  pub title: Option<String>,

  /// Embedded components in source order, for the rendering layer.
  pub components: Vec<EmbeddedComponent>,

  /// Warnings about malformed or unrecognised embedded components.
  pub diagnostics: Vec<Diagnostic>,
}
