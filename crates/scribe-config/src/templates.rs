use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// The requested configuration format is not supported.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, with every key explained.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# Scribe Configuration File

# Directory holding the content documents
content_dir = "content"

# File extensions recognized as content documents
extensions = ["mdx"]

# Descend into sub-directories. Slugs become paths relative to content_dir.
recursive = false

# Maximum number of documents read and transformed at the same time
concurrency = 5

# Abort the whole load on the first failing document. When false, failing
# documents are reported and the rest of the corpus is still returned.
fail_fast = true

# JSON file standing in for the persistent document store
store_path = "posts.json"

# Author recorded for documents that do not name one
default_author = "Unknown"

[markup]
# Whether to enable syntax highlighting for code blocks
highlight_code = true

# Theme annotated on code block containers
theme = "github-dark"

# Pass raw HTML in documents through to the output. The output is no longer
# sanitized when this is enabled.
allow_raw_html = false

# Inject <a class="anchor"> links into headings
heading_anchors = true

# Open links that leave the site in a new tab
external_links_new_tab = true

[markup.copy_button]
# Inject a copy-to-clipboard marker into code blocks
enable = true

# When to show the button: "hover" or "always"
visibility = "hover"

# How long the "copied" feedback is shown, in milliseconds
feedback_duration_ms = 3000
"#;

/// Default configuration template in JSON format.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "content_dir": "content",
  "extensions": ["mdx"],
  "recursive": false,
  "concurrency": 5,
  "fail_fast": true,
  "store_path": "posts.json",
  "default_author": "Unknown",
  "markup": {
    "highlight_code": true,
    "theme": "github-dark",
    "allow_raw_html": false,
    "heading_anchors": true,
    "external_links_new_tab": true,
    "copy_button": {
      "enable": true,
      "visibility": "hover",
      "feedback_duration_ms": 3000
    }
  }
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
