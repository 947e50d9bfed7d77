//! Type definitions for the markup transformer.
//!
//! Contains the configuration options (`MarkupOptions`), the transformer
//! itself (`MarkupTransformer`) and the `Transform` seam used by the cache.
//!
//! # Examples
//!
//! ```
//! use scribe_markup::{MarkupOptions, MarkupTransformer};
//!
//! let options = MarkupOptions {
//!   heading_anchors: false,
//!   ..Default::default()
//! };
//!
//! let transformer = MarkupTransformer::new(options);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
  error::MarkupError,
  syntax::SyntaxManager,
  types::RenderedMarkup,
  widgets::WidgetRegistry,
};

/// Anything that turns a document body into rendered markup.
///
/// Implementations must be pure: the same body always yields the same
/// result, with no side effects. [`crate::TransformCache`] relies on this to
/// share results between callers.
pub trait Transform: Send + Sync {
  /// Transform one body.
  ///
  /// # Errors
  ///
  /// Returns [`MarkupError::Transform`] if a pipeline stage fails. Malformed
  /// embedded components are not errors; they are reported as diagnostics.
  fn transform(&self, body: &str) -> Result<RenderedMarkup, MarkupError>;
}

/// When the rendering layer should show the copy button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CopyVisibility {
  #[default]
  Hover,
  Always,
}

impl CopyVisibility {
  #[must_use]
  pub const fn as_str(self) -> &'static str {
    match self {
      Self::Hover => "hover",
      Self::Always => "always",
    }
  }
}

impl fmt::Display for CopyVisibility {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl std::str::FromStr for CopyVisibility {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.to_ascii_lowercase().as_str() {
      "hover" => Ok(Self::Hover),
      "always" => Ok(Self::Always),
      other => Err(format!("expected 'hover' or 'always', got '{other}'")),
    }
  }
}

/// Settings for the copy-to-clipboard marker injected into code blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyButtonOptions {
  /// Inject the marker at all.
  pub enable:               bool,
  pub visibility:           CopyVisibility,
  /// How long the renderer shows "copied" feedback, in milliseconds.
  pub feedback_duration_ms: u32,
}

impl Default for CopyButtonOptions {
  fn default() -> Self {
    Self {
      enable:               true,
      visibility:           CopyVisibility::Hover,
      feedback_duration_ms: 3000,
    }
  }
}

/// Options for configuring the markup transformer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct MarkupOptions {
  /// Enable GitHub Flavored Markdown (tables, strikethrough, task lists,
  /// footnotes, autolinks).
  pub gfm: bool,

  /// Enable syntax highlighting for code blocks.
  pub highlight_code: bool,

  /// Theme name annotated on code block containers.
  pub theme: String,

  /// Pass raw HTML in the body through instead of omitting it.
  pub allow_raw_html: bool,

  /// Prepend `<a href="#id" class="anchor">` to every heading.
  pub heading_anchors: bool,

  /// Open links that leave the site in a new tab.
  pub external_links_new_tab: bool,

  pub copy_button: CopyButtonOptions,
}

impl Default for MarkupOptions {
  fn default() -> Self {
    Self {
      gfm:                    true,
      highlight_code:         cfg!(feature = "syntect"),
      theme:                  "github-dark".to_string(),
      allow_raw_html:         false,
      heading_anchors:        true,
      external_links_new_tab: true,
      copy_button:            CopyButtonOptions::default(),
    }
  }
}

impl MarkupOptions {
  /// Create options with everything decorative turned off: no highlighting,
  /// anchors, link rewriting or copy marker.
  #[must_use]
  pub fn plain() -> Self {
    Self {
      highlight_code: false,
      heading_anchors: false,
      external_links_new_tab: false,
      copy_button: CopyButtonOptions {
        enable: false,
        ..CopyButtonOptions::default()
      },
      ..Self::default()
    }
  }
}

/// Builder for constructing `MarkupOptions` with method chaining.
#[derive(Debug, Clone, Default)]
pub struct MarkupOptionsBuilder {
  options: MarkupOptions,
}

impl MarkupOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Enable or disable GitHub Flavored Markdown.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.gfm = enabled;
    self
  }

  /// Enable or disable syntax highlighting.
  #[must_use]
  pub const fn highlight_code(mut self, enabled: bool) -> Self {
    self.options.highlight_code = enabled;
    self
  }

  /// Set the highlighting theme.
  #[must_use]
  pub fn theme<S: Into<String>>(mut self, theme: S) -> Self {
    self.options.theme = theme.into();
    self
  }

  #[must_use]
  pub const fn allow_raw_html(mut self, enabled: bool) -> Self {
    self.options.allow_raw_html = enabled;
    self
  }

  #[must_use]
  pub const fn heading_anchors(mut self, enabled: bool) -> Self {
    self.options.heading_anchors = enabled;
    self
  }

  #[must_use]
  pub const fn external_links_new_tab(mut self, enabled: bool) -> Self {
    self.options.external_links_new_tab = enabled;
    self
  }

  /// Configure the copy-to-clipboard marker.
  #[must_use]
  pub const fn copy_button(mut self, copy_button: CopyButtonOptions) -> Self {
    self.options.copy_button = copy_button;
    self
  }

  /// Build the final `MarkupOptions`.
  #[must_use]
  pub fn build(self) -> MarkupOptions {
    self.options
  }
}

/// Converts document bodies into rendered markup.
///
/// The pipeline is parse (markdown plus embedded components), restructure
/// (generic element tree), enrich (highlighting, copy markers, heading slugs,
/// link and image policy) and serialize. Every stage is a pure function of
/// its input, so a transformer can be shared freely between threads.
#[derive(Debug)]
pub struct MarkupTransformer {
  pub(crate) options:        MarkupOptions,
  pub(crate) syntax_manager: Option<SyntaxManager>,
  pub(crate) registry:       WidgetRegistry,
}
