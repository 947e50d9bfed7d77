//! Where content documents come from.
use std::{
  fs,
  io,
  path::{Component, Path, PathBuf},
};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::ContentError;

/// A document found during discovery, not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
  pub slug: String,
  pub path: PathBuf,
}

/// A collection of raw content documents.
///
/// [`crate::CorpusLoader`] calls `read` from several worker threads at once,
/// hence the `Send + Sync` bound.
pub trait DocumentSource: Send + Sync {
  /// List every document in the collection.
  ///
  /// # Errors
  ///
  /// Returns an error if the collection itself cannot be listed.
  fn discover(&self) -> Result<Vec<DocumentEntry>, ContentError>;

  /// Read one document's raw text.
  ///
  /// # Errors
  ///
  /// Returns [`ContentError::FileRead`] if the document cannot be read.
  fn read(&self, entry: &DocumentEntry) -> Result<String, ContentError>;

  /// Find the document with the given slug.
  ///
  /// # Errors
  ///
  /// Returns an error if the collection cannot be listed.
  fn locate(&self, slug: &str) -> Result<Option<DocumentEntry>, ContentError> {
    Ok(self.discover()?.into_iter().find(|entry| entry.slug == slug))
  }
}

/// Documents stored as files in a directory.
///
/// A file is a document if its extension is one of the recognized ones. Its
/// slug is the file name without extension, or, when walking recursively,
/// the path relative to the root without extension, using `/` separators.
#[derive(Debug, Clone)]
pub struct DirectorySource {
  root:       PathBuf,
  extensions: Vec<String>,
  recursive:  bool,
}

impl DirectorySource {
  /// A non-recursive source recognizing `.mdx` files.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root:       root.into(),
      extensions: vec!["mdx".to_string()],
      recursive:  false,
    }
  }

  /// Replace the recognized extensions. A leading dot is ignored.
  #[must_use]
  pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    self.extensions = extensions
      .into_iter()
      .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
      .filter(|ext| !ext.is_empty())
      .collect();
    self
  }

  #[must_use]
  pub const fn recursive(mut self, recursive: bool) -> Self {
    self.recursive = recursive;
    self
  }

  #[must_use]
  pub fn root(&self) -> &Path {
    &self.root
  }

  #[must_use]
  pub fn extensions(&self) -> &[String] {
    &self.extensions
  }

  fn is_content_file(&self, path: &Path) -> bool {
    path
      .extension()
      .and_then(|ext| ext.to_str())
      .is_some_and(|ext| {
        self
          .extensions
          .iter()
          .any(|known| known.eq_ignore_ascii_case(ext))
      })
  }

  fn slug_for(&self, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(&self.root).ok()?.with_extension("");
    let parts: Option<Vec<&str>> = relative
      .components()
      .map(|component| {
        match component {
          Component::Normal(part) => part.to_str(),
          _ => None,
        }
      })
      .collect();
    Some(parts?.join("/"))
  }
}

impl DocumentSource for DirectorySource {
  fn discover(&self) -> Result<Vec<DocumentEntry>, ContentError> {
    let mut walker = WalkDir::new(&self.root)
      .follow_links(true)
      .min_depth(1)
      .sort_by_file_name();
    if !self.recursive {
      walker = walker.max_depth(1);
    }

    // An unreadable root is an error; unreadable entries below it are not
    if let Err(e) = fs::read_dir(&self.root) {
      return Err(ContentError::FileRead {
        path:   self.root.clone(),
        source: e,
      });
    }

    let mut entries = Vec::new();
    for result in walker {
      let dent = match result {
        Ok(dent) => dent,
        Err(e) => {
          warn!("Skipping unreadable directory entry: {e}");
          continue;
        },
      };

      if !dent.file_type().is_file() || !self.is_content_file(dent.path()) {
        continue;
      }

      let Some(slug) = self.slug_for(dent.path()) else {
        warn!("Skipping file with a non UTF-8 name: {}", dent.path().display());
        continue;
      };
      entries.push(DocumentEntry {
        slug,
        path: dent.into_path(),
      });
    }

    debug!(
      "Discovered {} documents in {}",
      entries.len(),
      self.root.display()
    );
    Ok(entries)
  }

  fn read(&self, entry: &DocumentEntry) -> Result<String, ContentError> {
    fs::read_to_string(&entry.path).map_err(|source| {
      ContentError::FileRead {
        path: entry.path.clone(),
        source,
      }
    })
  }

  fn locate(&self, slug: &str) -> Result<Option<DocumentEntry>, ContentError> {
    // Slugs never climb out of the root
    let relative = Path::new(slug);
    let is_plain = !slug.is_empty()
      && relative
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !is_plain || (!self.recursive && relative.components().count() > 1) {
      return Ok(None);
    }

    // Same matching rule as discovery, so anything listed can be located
    let Some(stem) = relative.file_name() else {
      return Ok(None);
    };
    let dir = relative
      .parent()
      .map_or_else(|| self.root.clone(), |parent| self.root.join(parent));
    let listing = match fs::read_dir(&dir) {
      Ok(listing) => listing,
      Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
      Err(source) => return Err(ContentError::FileRead { path: dir, source }),
    };

    let mut candidates: Vec<PathBuf> = listing
      .filter_map(Result::ok)
      .map(|dent| dent.path())
      .filter(|path| {
        path.file_stem() == Some(stem)
          && path.is_file()
          && self.is_content_file(path)
      })
      .collect();
    candidates.sort();

    Ok(candidates.into_iter().next().map(|path| {
      DocumentEntry {
        slug: slug.to_string(),
        path,
      }
    }))
  }
}
