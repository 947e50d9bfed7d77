//! Front matter extraction.
//!
//! A content document may open with a YAML block between two `---` lines:
//!
//! ```text
//! ---
//! title: "Post 1"
//! publishedAt: "2024-01-15"
//! ---
//! The body starts here.
//! ```
//!
//! Everything after the closing delimiter line is the body. A document that
//! does not start with a delimiter line has no front matter, and its body is
//! the whole input, byte for byte.

use std::collections::BTreeMap;

use log::debug;
use serde_yaml::Value;

use crate::error::ContentError;

/// Raw key/value map parsed from a front matter block.
pub type FrontMatter = BTreeMap<String, Value>;

const DELIMITER: &str = "---";

/// A document split into its front matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
  pub metadata: FrontMatter,
  pub body:     String,
}

/// Split `source` into front matter and body.
///
/// `document` identifies the source in errors.
///
/// # Errors
///
/// Returns [`ContentError::MetadataParse`] if the block is never closed, is
/// not valid YAML, or is not a mapping. The reported line counts from the
/// start of the document.
pub fn extract(document: &str, source: &str) -> Result<Extracted, ContentError> {
  let text = source.strip_prefix('\u{feff}').unwrap_or(source);

  let Some(after_open) = strip_delimiter_line(text) else {
    return Ok(Extracted {
      metadata: FrontMatter::new(),
      body:     source.to_string(),
    });
  };

  let Some((yaml, body)) = split_at_closing_delimiter(after_open) else {
    return Err(ContentError::MetadataParse {
      document: document.to_string(),
      line:     1,
      message:  "front matter block is never closed".to_string(),
    });
  };

  Ok(Extracted {
    metadata: parse_block(document, yaml)?,
    body:     body.to_string(),
  })
}

/// If `text` starts with a delimiter line, return what follows it.
fn strip_delimiter_line(text: &str) -> Option<&str> {
  let (first, rest) = text.split_once('\n').unwrap_or((text, ""));
  (first.trim_end() == DELIMITER).then_some(rest)
}

/// Find the closing delimiter line, returning the block before it and the
/// body after it.
fn split_at_closing_delimiter(text: &str) -> Option<(&str, &str)> {
  let mut offset = 0;
  for line in text.split_inclusive('\n') {
    if line.trim_end() == DELIMITER {
      return Some((&text[..offset], &text[offset + line.len()..]));
    }
    offset += line.len();
  }
  None
}

fn parse_block(document: &str, yaml: &str) -> Result<FrontMatter, ContentError> {
  let parse_error = |line: usize, message: String| {
    ContentError::MetadataParse {
      document: document.to_string(),
      line,
      message,
    }
  };

  if yaml.trim().is_empty() {
    return Ok(FrontMatter::new());
  }

  // Block lines start after the opening delimiter on line 1
  let value: Value = serde_yaml::from_str(yaml).map_err(|e| {
    let line = e.location().map_or(2, |location| location.line() + 1);
    parse_error(line, e.to_string())
  })?;

  match value {
    Value::Null => Ok(FrontMatter::new()),
    Value::Mapping(mapping) => {
      let mut metadata = FrontMatter::new();
      for (key, value) in mapping {
        let key = match key {
          Value::String(key) => key,
          Value::Number(key) => key.to_string(),
          Value::Bool(key) => key.to_string(),
          other => {
            debug!("Ignoring non-scalar front matter key in {document}: {other:?}");
            continue;
          },
        };
        metadata.insert(key, value);
      }
      Ok(metadata)
    },
    _ => {
      Err(parse_error(
        2,
        "front matter must be a mapping of keys to values".to_string(),
      ))
    },
  }
}
