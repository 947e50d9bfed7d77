//! # scribe-content
//!
//! Loading and synchronizing a corpus of content documents.
//!
//! A content document is a Markdown file, optionally opening with a YAML
//! front matter block. This crate
//!
//! - splits documents into metadata and body ([`frontmatter`]),
//! - loads a whole directory of them with a bounded number of documents in
//!   flight ([`CorpusLoader`]),
//! - renders bodies through a shared [`scribe_markup::TransformCache`]
//!   ([`ContentDocument::render`]),
//! - and reconciles a loaded corpus into a [`DocumentStore`] by title
//!   ([`sync_corpus`]).
//!
//! ```no_run
//! use scribe_content::{CorpusLoader, JsonFileStore, SyncOptions, sync_corpus};
//!
//! let loader = CorpusLoader::for_directory("content")?;
//! let store = JsonFileStore::new("posts.json");
//! let report = sync_corpus(&loader, &store, &SyncOptions::default())?;
//! println!("inserted {}", report.inserted_count);
//! # Ok::<(), scribe_content::ContentError>(())
//! ```

pub mod document;
pub mod error;
pub mod frontmatter;
pub mod loader;
pub mod pool;
pub mod source;
pub mod store;
pub mod sync;

pub use crate::{
  document::{ContentDocument, Metadata, sort_by_published, sort_by_slug},
  error::{ContentError, StoreError},
  loader::{Corpus, CorpusLoader, LoadOutcome, LoadPolicy, load_corpus, load_document},
  pool::{AdmissionPool, DEFAULT_BOUND},
  source::{DirectorySource, DocumentEntry, DocumentSource},
  store::{DocumentStore, JsonFileStore, MemoryStore},
  sync::{
    StoredDocument,
    SyncOptions,
    SyncPlan,
    SyncReport,
    UNKNOWN_AUTHOR,
    plan,
    sync_corpus,
  },
};
