use std::{cmp::Reverse, sync::Arc};

use jiff::{Timestamp, civil};
use log::warn;
use scribe_markup::{RenderedMarkup, Transform, TransformCache};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::{
  error::ContentError,
  frontmatter::{self, FrontMatter},
};

/// Typed view of a document's front matter.
///
/// Only `title` and `publishedAt` are expected; every field defaults to
/// empty or absent and a missing key is never an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metadata {
  pub title:        String,
  /// Publication date as written, usually `YYYY-MM-DD`.
  pub published_at: String,
  pub summary:      String,
  pub image:        Option<String>,
  pub author:       Option<String>,
  pub template:     Option<String>,
}

impl Metadata {
  /// Pick the recognized keys out of a raw front matter map.
  ///
  /// Scalar values are converted to strings. Empty optional values count as
  /// absent.
  #[must_use]
  pub fn from_front_matter(front_matter: &FrontMatter) -> Self {
    let text = |key: &str| -> Option<String> {
      match front_matter.get(key)? {
        Value::String(value) => Some(value.clone()),
        Value::Number(value) => Some(value.to_string()),
        Value::Bool(value) => Some(value.to_string()),
        _ => None,
      }
    };
    let optional = |key: &str| text(key).filter(|value| !value.trim().is_empty());

    Self {
      title:        text("title").unwrap_or_default(),
      published_at: text("publishedAt").unwrap_or_default(),
      summary:      text("summary").unwrap_or_default(),
      image:        optional("image"),
      author:       optional("author"),
      template:     optional("template"),
    }
  }

  /// The publication date as a calendar date.
  ///
  /// Accepts a plain date (`2024-01-15`), a civil datetime
  /// (`2024-01-15T10:30:00`) or an RFC 3339 timestamp, whose UTC date is used.
  /// Returns `None` when `publishedAt` is empty or unparsable.
  #[must_use]
  pub fn published_date(&self) -> Option<civil::Date> {
    let raw = self.published_at.trim();
    if raw.is_empty() {
      return None;
    }

    // Timestamps first: a civil parse would drop the offset
    raw
      .parse::<Timestamp>()
      .ok()
      .map(|ts| ts.to_zoned(jiff::tz::TimeZone::UTC).date())
      .or_else(|| raw.parse::<civil::Date>().ok())
      .or_else(|| raw.parse::<civil::DateTime>().ok().map(|dt| dt.date()))
  }
}

/// One content document as found on disk.
///
/// Serializes as `{ slug, metadata, source }`, the shape read paths hand to
/// the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
  /// Filename without extension; the document's stable identity.
  pub slug:     String,
  pub metadata: Metadata,
  #[serde(rename = "source")]
  pub body:     String,
}

impl ContentDocument {
  /// Build a document from its slug and raw file contents.
  ///
  /// # Errors
  ///
  /// Returns [`ContentError::MetadataParse`] if the front matter is
  /// malformed.
  pub fn parse(slug: impl Into<String>, source: &str) -> Result<Self, ContentError> {
    let slug = slug.into();
    let extracted = frontmatter::extract(&slug, source)?;
    Ok(Self {
      metadata: Metadata::from_front_matter(&extracted.metadata),
      body: extracted.body,
      slug,
    })
  }

  /// Render the body through `cache`, logging any diagnostics against this
  /// document.
  ///
  /// # Errors
  ///
  /// Returns [`ContentError::Transform`] if the transformer fails.
  pub fn render<T: Transform>(
    &self,
    cache: &TransformCache<T>,
  ) -> Result<Arc<RenderedMarkup>, ContentError> {
    let rendered = cache.get_or_compute(&self.body).map_err(|e| {
      ContentError::Transform {
        document: self.slug.clone(),
        message:  e.to_string(),
      }
    })?;

    for diagnostic in &rendered.diagnostics {
      warn!("{}:{diagnostic}", self.slug);
    }

    Ok(rendered)
  }
}

/// Sort documents by slug.
pub fn sort_by_slug(documents: &mut [ContentDocument]) {
  documents.sort_by(|a, b| a.slug.cmp(&b.slug));
}

/// Sort documents newest first.
///
/// Documents without a parsable `publishedAt` go last. Ties are broken by
/// slug so the order is stable across scans.
pub fn sort_by_published(documents: &mut [ContentDocument]) {
  documents.sort_by_cached_key(|document| {
    (
      Reverse(document.metadata.published_date()),
      document.slug.clone(),
    )
  });
}
