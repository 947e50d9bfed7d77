//! Concurrency-bounded corpus loading.
//!
//! [`CorpusLoader`] discovers every document in a [`DocumentSource`], then
//! reads and parses them on an [`AdmissionPool`]. Each document yields its
//! own outcome, and a [`LoadPolicy`] decides what a failure means for the
//! batch.
//!
//! The order of the returned documents is not part of the contract. Sort
//! explicitly with [`crate::sort_by_slug`] or [`crate::sort_by_published`]
//! when order matters.
use std::path::Path;

use log::{debug, warn};

use crate::{
  document::ContentDocument,
  error::ContentError,
  pool::{AdmissionPool, DEFAULT_BOUND},
  source::{DirectorySource, DocumentEntry, DocumentSource},
};

/// What a single document's load produced.
pub type LoadOutcome = Result<ContentDocument, ContentError>;

/// How [`CorpusLoader::load_with`] treats failing documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
  /// Abort on the first failure and return it.
  #[default]
  FailFast,
  /// Keep going, collecting failures next to the loaded documents.
  BestEffort,
}

/// The result of a load under [`LoadPolicy::BestEffort`].
#[derive(Debug, Default)]
pub struct Corpus {
  pub documents: Vec<ContentDocument>,
  /// Failed documents; each error names its document.
  pub failures:  Vec<ContentError>,
}

/// Loads every document of a source with bounded concurrency.
#[derive(Debug)]
pub struct CorpusLoader<S = DirectorySource> {
  source: S,
  pool:   AdmissionPool,
}

impl CorpusLoader<DirectorySource> {
  /// Loader for the `.mdx` files directly inside `dir`, with the default
  /// bound of 5.
  ///
  /// # Errors
  ///
  /// Returns [`ContentError::Pool`] if the worker threads cannot be started.
  pub fn for_directory(dir: impl AsRef<Path>) -> Result<Self, ContentError> {
    Self::new(DirectorySource::new(dir.as_ref()), DEFAULT_BOUND)
  }
}

impl<S: DocumentSource> CorpusLoader<S> {
  /// Create a loader admitting at most `bound` documents at a time.
  ///
  /// # Errors
  ///
  /// Returns [`ContentError::InvalidBound`] if `bound` is zero.
  pub fn new(source: S, bound: usize) -> Result<Self, ContentError> {
    Ok(Self::with_pool(source, AdmissionPool::new(bound)?))
  }

  pub const fn with_pool(source: S, pool: AdmissionPool) -> Self {
    Self { source, pool }
  }

  pub const fn source(&self) -> &S {
    &self.source
  }

  #[must_use]
  pub const fn bound(&self) -> usize {
    self.pool.bound()
  }

  /// Load every document, returning one outcome per discovered document.
  ///
  /// # Errors
  ///
  /// Only fails if discovery itself fails. Per-document failures are in the
  /// returned outcomes.
  pub fn load_each(&self) -> Result<Vec<LoadOutcome>, ContentError> {
    let entries = self.source.discover()?;
    debug!(
      "Loading {} documents, at most {} at a time",
      entries.len(),
      self.bound()
    );
    Ok(self.pool.map(entries, |entry| load_entry(&self.source, entry)))
  }

  /// Load every document, failing on the first document that fails.
  ///
  /// Documents not yet started when a failure occurs are skipped.
  ///
  /// # Errors
  ///
  /// Returns the failing document's error, or the discovery error.
  pub fn load(&self) -> Result<Vec<ContentDocument>, ContentError> {
    let entries = self.source.discover()?;
    debug!(
      "Loading {} documents, at most {} at a time",
      entries.len(),
      self.bound()
    );
    let documents = self
      .pool
      .try_map(entries, |entry| load_entry(&self.source, entry))?;
    debug!("Loaded {} documents", documents.len());
    Ok(documents)
  }

  /// Load every document under the given policy.
  ///
  /// # Errors
  ///
  /// Under [`LoadPolicy::FailFast`], returns the first failure. Under
  /// [`LoadPolicy::BestEffort`], only a discovery failure is an error.
  pub fn load_with(&self, policy: LoadPolicy) -> Result<Corpus, ContentError> {
    match policy {
      LoadPolicy::FailFast => {
        Ok(Corpus {
          documents: self.load()?,
          failures:  Vec::new(),
        })
      },
      LoadPolicy::BestEffort => {
        let mut corpus = Corpus::default();
        for outcome in self.load_each()? {
          match outcome {
            Ok(document) => corpus.documents.push(document),
            Err(e) => {
              warn!("Skipping document: {e}");
              corpus.failures.push(e);
            },
          }
        }
        Ok(corpus)
      },
    }
  }

  /// Load the single document with the given slug.
  ///
  /// # Errors
  ///
  /// Returns [`ContentError::NotFound`] if no such document exists, or the
  /// document's read or parse error.
  pub fn load_document(&self, slug: &str) -> LoadOutcome {
    load_by_slug(&self.source, slug)
  }
}

fn load_entry<S: DocumentSource>(source: &S, entry: DocumentEntry) -> LoadOutcome {
  let raw = source.read(&entry)?;
  ContentDocument::parse(entry.slug, &raw)
}

fn load_by_slug<S: DocumentSource>(source: &S, slug: &str) -> LoadOutcome {
  let entry = source
    .locate(slug)?
    .ok_or_else(|| ContentError::NotFound(slug.to_string()))?;
  load_entry(source, entry)
}

/// Load the `.mdx` documents directly inside `dir`, failing fast.
///
/// # Errors
///
/// Returns the first failing document's error.
pub fn load_corpus(dir: impl AsRef<Path>) -> Result<Vec<ContentDocument>, ContentError> {
  CorpusLoader::for_directory(dir)?.load()
}

/// Load one `.mdx` document from `dir` by slug.
///
/// # Errors
///
/// Returns [`ContentError::NotFound`] if `dir` holds no such document.
pub fn load_document(dir: impl AsRef<Path>, slug: &str) -> LoadOutcome {
  load_by_slug(&DirectorySource::new(dir.as_ref()), slug)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use std::fs;

  use super::*;

  fn corpus_dir(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
      fs::write(dir.path().join(name), content).unwrap();
    }
    dir
  }

  #[test]
  fn test_fail_fast_surfaces_document_identity() {
    let dir = corpus_dir(&[
      ("good.mdx", "---\ntitle: Good\n---\nBody"),
      ("bad.mdx", "---\ntitle: [oops\n---\nBody"),
    ]);

    let err = load_corpus(dir.path()).unwrap_err();
    assert_eq!(err.document().as_deref(), Some("bad"));
  }

  #[test]
  fn test_best_effort_collects_failures() {
    let dir = corpus_dir(&[
      ("good.mdx", "---\ntitle: Good\n---\nBody"),
      ("bad.mdx", "---\ntitle: [oops\n---\nBody"),
      ("plain.mdx", "No front matter"),
    ]);

    let loader = CorpusLoader::for_directory(dir.path()).unwrap();
    let mut corpus = loader.load_with(LoadPolicy::BestEffort).unwrap();
    crate::sort_by_slug(&mut corpus.documents);

    let slugs: Vec<_> = corpus.documents.iter().map(|d| d.slug.as_str()).collect();
    assert_eq!(slugs, ["good", "plain"]);
    assert_eq!(corpus.failures.len(), 1);
    assert!(matches!(
      &corpus.failures[0],
      ContentError::MetadataParse { document, .. } if document == "bad"
    ));
  }

  #[test]
  fn test_load_each_reports_every_outcome() {
    let dir = corpus_dir(&[
      ("a.mdx", "A"),
      ("b.mdx", "---\nbroken"),
    ]);
    let loader = CorpusLoader::for_directory(dir.path()).unwrap();
    let outcomes = loader.load_each().unwrap();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
  }

  #[test]
  fn test_load_document() {
    let dir = corpus_dir(&[("hello.mdx", "---\ntitle: Hello\n---\nHi")]);

    let document = load_document(dir.path(), "hello").unwrap();
    assert_eq!(document.metadata.title, "Hello");
    assert_eq!(document.body, "Hi");

    assert!(matches!(
      load_document(dir.path(), "nope"),
      Err(ContentError::NotFound(slug)) if slug == "nope"
    ));
  }

  #[test]
  fn test_empty_directory() {
    let dir = corpus_dir(&[]);
    assert!(load_corpus(dir.path()).unwrap().is_empty());
  }

  #[test]
  fn test_zero_bound() {
    let dir = corpus_dir(&[]);
    assert!(matches!(
      CorpusLoader::new(DirectorySource::new(dir.path()), 0),
      Err(ContentError::InvalidBound(0))
    ));
  }
}
