use scribe_macros::Configurable;
use scribe_markup::{CopyButtonOptions, CopyVisibility, MarkupOptions};
use serde::{Deserialize, Serialize};

/// Configuration for the markup transformer.
///
/// Mirrors [`MarkupOptions`] field for field so it can be set from a config
/// file or with `--config markup.KEY=VALUE`.
#[derive(Debug, Clone, Serialize, Deserialize, Configurable)]
#[serde(default)]
#[allow(
  clippy::struct_excessive_bools,
  reason = "Config struct with related boolean flags"
)]
pub struct MarkupConfig {
  /// Whether to enable syntax highlighting for code blocks.
  #[config(key = "highlight_code")]
  pub highlight_code: bool,

  /// Highlighting theme annotated on code block containers.
  #[config(key = "theme")]
  pub theme: String,

  /// Pass raw HTML through instead of omitting it.
  ///
  /// The output is no longer sanitized when this is on.
  #[config(key = "allow_raw_html")]
  pub allow_raw_html: bool,

  /// Whether to inject anchor links into headings.
  #[config(key = "heading_anchors")]
  pub heading_anchors: bool,

  /// Whether links leaving the site open in a new tab.
  #[config(key = "external_links_new_tab")]
  pub external_links_new_tab: bool,

  /// Copy-to-clipboard marker settings.
  #[config(nested)]
  pub copy_button: Option<CopyButtonConfig>,
}

impl Default for MarkupConfig {
  fn default() -> Self {
    let options = MarkupOptions::default();
    Self {
      highlight_code:         options.highlight_code,
      theme:                  options.theme,
      allow_raw_html:         options.allow_raw_html,
      heading_anchors:        options.heading_anchors,
      external_links_new_tab: options.external_links_new_tab,
      copy_button:            None,
    }
  }
}

impl MarkupConfig {
  /// Build transformer options from this configuration.
  #[must_use]
  pub fn to_options(&self) -> MarkupOptions {
    MarkupOptions {
      highlight_code: self.highlight_code,
      theme: self.theme.clone(),
      allow_raw_html: self.allow_raw_html,
      heading_anchors: self.heading_anchors,
      external_links_new_tab: self.external_links_new_tab,
      copy_button: self
        .copy_button
        .as_ref()
        .map(CopyButtonConfig::to_options)
        .unwrap_or_default(),
      ..MarkupOptions::default()
    }
  }
}

/// Configuration for the copy-to-clipboard marker on code blocks.
#[derive(Debug, Clone, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct CopyButtonConfig {
  /// Whether to inject the marker.
  #[config(key = "enable")]
  pub enable: bool,

  /// When the button is shown: `hover` or `always`.
  #[config(key = "visibility")]
  pub visibility: CopyVisibility,

  /// Duration of the "copied" feedback in milliseconds.
  #[config(key = "feedback_duration_ms")]
  pub feedback_duration_ms: u32,
}

impl Default for CopyButtonConfig {
  fn default() -> Self {
    let options = CopyButtonOptions::default();
    Self {
      enable:               options.enable,
      visibility:           options.visibility,
      feedback_duration_ms: options.feedback_duration_ms,
    }
  }
}

impl CopyButtonConfig {
  #[must_use]
  pub const fn to_options(&self) -> CopyButtonOptions {
    CopyButtonOptions {
      enable:               self.enable,
      visibility:           self.visibility,
      feedback_duration_ms: self.feedback_duration_ms,
    }
  }
}
