//! Persistent document stores.
//!
//! The sync path only needs two things from a store: the titles it already
//! holds, and a way to insert a batch of new records. Anything that can do
//! both implements [`DocumentStore`].
use std::{
  collections::HashSet,
  fs,
  io,
  path::{Path, PathBuf},
  sync::{
    Mutex,
    MutexGuard,
    atomic::{AtomicUsize, Ordering},
  },
};

use log::{debug, trace};

use crate::{error::StoreError, sync::StoredDocument};

/// A persistent collection of [`StoredDocument`] records keyed by title.
///
/// Title uniqueness is assumed by callers, not enforced by the store.
pub trait DocumentStore: Send + Sync {
  /// Every title currently in the store.
  ///
  /// # Errors
  ///
  /// Returns a [`StoreError`] if the store cannot be read.
  fn existing_titles(&self) -> Result<HashSet<String>, StoreError>;

  /// Insert `records` as one batch, returning how many were inserted.
  ///
  /// # Errors
  ///
  /// Returns a [`StoreError`] if the store cannot be written. A failed
  /// batch inserts nothing.
  fn insert_many(&self, records: Vec<StoredDocument>) -> Result<usize, StoreError>;
}

/// An in-process store, mostly useful in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
  records:      Mutex<Vec<StoredDocument>>,
  insert_calls: AtomicUsize,
}

impl MemoryStore {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// A store that already holds `records`.
  #[must_use]
  pub fn with_records(records: Vec<StoredDocument>) -> Self {
    Self {
      records:      Mutex::new(records),
      insert_calls: AtomicUsize::new(0),
    }
  }

  fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredDocument>>, StoreError> {
    self
      .records
      .lock()
      .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
  }

  /// A copy of every stored record, in insertion order.
  ///
  /// # Errors
  ///
  /// Returns [`StoreError::Unavailable`] if the store's lock is poisoned.
  pub fn records(&self) -> Result<Vec<StoredDocument>, StoreError> {
    Ok(self.lock()?.clone())
  }

  /// How many times [`DocumentStore::insert_many`] has been called.
  #[must_use]
  pub fn insert_calls(&self) -> usize {
    self.insert_calls.load(Ordering::SeqCst)
  }
}

impl DocumentStore for MemoryStore {
  fn existing_titles(&self) -> Result<HashSet<String>, StoreError> {
    Ok(self.lock()?.iter().map(|record| record.title.clone()).collect())
  }

  fn insert_many(&self, records: Vec<StoredDocument>) -> Result<usize, StoreError> {
    self.insert_calls.fetch_add(1, Ordering::SeqCst);
    let count = records.len();
    self.lock()?.extend(records);
    Ok(count)
  }
}

/// A store kept as a pretty-printed JSON array in a single file.
///
/// A missing file is an empty store. Writes go to a sibling temporary file
/// that is then renamed over the original, so a failed write leaves the
/// previous contents intact.
#[derive(Debug)]
pub struct JsonFileStore {
  path:       PathBuf,
  // Serializes read-modify-write cycles within this process
  write_lock: Mutex<()>,
}

impl JsonFileStore {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path:       path.into(),
      write_lock: Mutex::new(()),
    }
  }

  #[must_use]
  pub fn path(&self) -> &Path {
    &self.path
  }

  fn io_error(&self, source: io::Error) -> StoreError {
    StoreError::Io {
      path: self.path.clone(),
      source,
    }
  }

  /// Every record in the store file.
  ///
  /// # Errors
  ///
  /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
  /// [`StoreError::Corrupt`] if it is not a JSON array of records.
  pub fn records(&self) -> Result<Vec<StoredDocument>, StoreError> {
    let content = match fs::read_to_string(&self.path) {
      Ok(content) => content,
      Err(e) if e.kind() == io::ErrorKind::NotFound => {
        trace!("Store file {} does not exist yet", self.path.display());
        return Ok(Vec::new());
      },
      Err(e) => return Err(self.io_error(e)),
    };

    if content.trim().is_empty() {
      return Ok(Vec::new());
    }

    serde_json::from_str(&content).map_err(|source| {
      StoreError::Corrupt {
        path: self.path.clone(),
        source,
      }
    })
  }

  fn write_records(&self, records: &[StoredDocument]) -> Result<(), StoreError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
    }

    let json = serde_json::to_string_pretty(records).map_err(|source| {
      StoreError::Corrupt {
        path: self.path.clone(),
        source,
      }
    })?;

    let mut tmp = self.path.clone().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, json).map_err(|e| self.io_error(e))?;
    fs::rename(&tmp, &self.path).map_err(|e| {
      let _ = fs::remove_file(&tmp);
      self.io_error(e)
    })
  }
}

impl DocumentStore for JsonFileStore {
  fn existing_titles(&self) -> Result<HashSet<String>, StoreError> {
    Ok(
      self
        .records()?
        .into_iter()
        .map(|record| record.title)
        .collect(),
    )
  }

  fn insert_many(&self, records: Vec<StoredDocument>) -> Result<usize, StoreError> {
    let _guard = self
      .write_lock
      .lock()
      .map_err(|_| StoreError::Unavailable("store write lock poisoned".to_string()))?;

    let mut stored = self.records()?;
    let count = records.len();
    stored.extend(records);
    self.write_records(&stored)?;

    debug!(
      "Wrote {count} new records to {} ({} total)",
      self.path.display(),
      stored.len()
    );
    Ok(count)
  }
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]

  use jiff::civil;

  use super::*;

  fn record(title: &str) -> StoredDocument {
    StoredDocument {
      title:    title.to_string(),
      content:  format!("Body of {title}"),
      author:   "Unknown".to_string(),
      date:     civil::date(2024, 1, 15),
      summary:  String::new(),
      template: String::new(),
    }
  }

  #[test]
  fn test_memory_store() {
    let store = MemoryStore::with_records(vec![record("A")]);
    assert_eq!(store.insert_many(vec![record("B")]).unwrap(), 1);

    let titles = store.existing_titles().unwrap();
    assert_eq!(titles, HashSet::from(["A".to_string(), "B".to_string()]));
    assert_eq!(store.insert_calls(), 1);
  }

  #[test]
  fn test_json_store_missing_file_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path().join("posts.json"));
    assert!(store.existing_titles().unwrap().is_empty());
  }

  #[test]
  fn test_json_store_appends() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data/posts.json");
    let store = JsonFileStore::new(&path);

    store.insert_many(vec![record("A")]).unwrap();
    store.insert_many(vec![record("B"), record("C")]).unwrap();

    let titles: Vec<_> = store
      .records()
      .unwrap()
      .into_iter()
      .map(|r| r.title)
      .collect();
    assert_eq!(titles, ["A", "B", "C"]);

    let json: serde_json::Value =
      serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json[0]["date"], "2024-01-15");
    assert_eq!(json[0]["author"], "Unknown");
    assert!(!dir.path().join("data/posts.json.tmp").exists());
  }

  #[test]
  fn test_json_store_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("posts.json");
    fs::write(&path, "{ not json").unwrap();

    let store = JsonFileStore::new(&path);
    assert!(matches!(
      store.existing_titles(),
      Err(StoreError::Corrupt { .. })
    ));
    assert!(matches!(
      store.insert_many(vec![record("A")]),
      Err(StoreError::Corrupt { .. })
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), "{ not json");
  }
}
