//! Reconciling a loaded corpus with a persistent store.
//!
//! Sync is insert-only and keyed by title. A document whose title is already
//! stored counts as synced, even if its body has changed since.
use std::collections::HashSet;

use jiff::{Zoned, civil};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{
  document::ContentDocument,
  error::ContentError,
  loader::CorpusLoader,
  source::DocumentSource,
  store::DocumentStore,
};

/// Author recorded for documents that do not name one.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// The documents a sync would insert. Computed, consumed once, discarded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
  pub to_insert: Vec<ContentDocument>,
}

impl SyncPlan {
  #[must_use]
  pub const fn is_empty(&self) -> bool {
    self.to_insert.is_empty()
  }

  #[must_use]
  pub const fn len(&self) -> usize {
    self.to_insert.len()
  }
}

/// Select the documents of `fresh` whose title is not in `existing_titles`.
///
/// Documents are not deduplicated against each other: two fresh documents
/// sharing a new title are both planned for insertion.
#[must_use]
pub fn plan(fresh: Vec<ContentDocument>, existing_titles: &HashSet<String>) -> SyncPlan {
  let to_insert = fresh
    .into_iter()
    .filter(|document| !existing_titles.contains(&document.metadata.title))
    .collect();
  SyncPlan { to_insert }
}

/// One record as kept by a [`DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDocument {
  pub title:    String,
  pub content:  String,
  pub author:   String,
  pub date:     civil::Date,
  pub summary:  String,
  pub template: String,
}

impl StoredDocument {
  /// Build the stored record for `document`.
  ///
  /// A missing author becomes `default_author`. An empty or unparsable
  /// `publishedAt` becomes `today`.
  #[must_use]
  pub fn from_document(
    document: &ContentDocument,
    default_author: &str,
    today: civil::Date,
  ) -> Self {
    let metadata = &document.metadata;
    let date = metadata.published_date().unwrap_or_else(|| {
      if !metadata.published_at.trim().is_empty() {
        warn!(
          "{}: unparsable publishedAt '{}', using {today}",
          document.slug, metadata.published_at
        );
      }
      today
    });

    Self {
      title: metadata.title.clone(),
      content: document.body.clone(),
      author: metadata
        .author
        .clone()
        .unwrap_or_else(|| default_author.to_string()),
      date,
      summary: metadata.summary.clone(),
      template: metadata.template.clone().unwrap_or_default(),
    }
  }
}

/// Knobs for [`sync_corpus`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
  pub default_author: String,
  /// Date recorded for documents without a usable `publishedAt`.
  pub today:          civil::Date,
}

impl Default for SyncOptions {
  fn default() -> Self {
    Self {
      default_author: UNKNOWN_AUTHOR.to_string(),
      today:          Zoned::now().date(),
    }
  }
}

/// Outcome of a successful sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
  pub inserted_count: usize,
}

/// Load the corpus and insert every document whose title the store does not
/// hold yet.
///
/// Idempotent: a second call with unchanged input inserts nothing. When
/// there is nothing to insert the store is not written to at all.
///
/// # Errors
///
/// Returns the loader's first failure, or
/// [`ContentError::StoreUnavailable`] if the store cannot be read or written.
pub fn sync_corpus<S, D>(
  loader: &CorpusLoader<S>,
  store: &D,
  options: &SyncOptions,
) -> Result<SyncReport, ContentError>
where
  S: DocumentSource,
  D: DocumentStore + ?Sized,
{
  let fresh = loader.load()?;
  let existing = store.existing_titles()?;
  debug!(
    "Reconciling {} documents against {} stored titles",
    fresh.len(),
    existing.len()
  );

  let plan = plan(fresh, &existing);
  if plan.is_empty() {
    info!("Store is up to date, nothing to insert");
    return Ok(SyncReport::default());
  }

  let records = plan
    .to_insert
    .iter()
    .map(|document| {
      StoredDocument::from_document(document, &options.default_author, options.today)
    })
    .collect();
  let inserted_count = store.insert_many(records)?;

  info!("Inserted {inserted_count} new documents");
  Ok(SyncReport { inserted_count })
}
