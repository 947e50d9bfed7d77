use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while loading, rendering or syncing content documents.
///
/// Every per-document variant carries the document's identity (its slug or
/// path) so a caller can report which document failed.
#[derive(Debug, Error)]
pub enum ContentError {
  /// The front matter block is not valid structured data.
  #[error("malformed front matter in `{document}` at line {line}: {message}")]
  MetadataParse {
    document: String,
    line:     usize,
    message:  String,
  },

  /// A document could not be read from disk. Not retried.
  #[error("failed to read `{path}`: {source}")]
  FileRead {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  /// A transformer stage failed unexpectedly. Fatal for that document only.
  #[error("failed to transform `{document}`: {message}")]
  Transform { document: String, message: String },

  /// The document store could not be reached.
  #[error("document store unavailable: {0}")]
  StoreUnavailable(#[from] StoreError),

  /// No document with the given slug exists.
  #[error("no document with slug `{0}`")]
  NotFound(String),

  /// An admission pool was asked for zero slots.
  #[error("admission bound must be at least 1, got {0}")]
  InvalidBound(usize),

  /// The admission pool's worker threads could not be started.
  #[error("failed to start the admission pool: {0}")]
  Pool(String),
}

impl ContentError {
  /// The identity of the document this error is about, if any.
  #[must_use]
  pub fn document(&self) -> Option<String> {
    match self {
      Self::MetadataParse { document, .. } | Self::Transform { document, .. } => {
        Some(document.clone())
      },
      Self::FileRead { path, .. } => Some(path.display().to_string()),
      Self::NotFound(slug) => Some(slug.clone()),
      Self::StoreUnavailable(_) | Self::InvalidBound(_) | Self::Pool(_) => None,
    }
  }
}

/// Failures of a [`crate::DocumentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to access store file `{path}`: {source}")]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("store file `{path}` is corrupt: {source}")]
  Corrupt {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("{0}")]
  Unavailable(String),
}
