//! Memoized transformation results.
//!
//! A [`TransformCache`] owns a transformer and remembers what it produced for
//! every body it has seen. The key is the complete body text, so two bodies
//! can only share an entry if they are identical. Entries live as long as the
//! cache; there is no eviction.
//!
//! The cache takes no lock around computation. Two threads asking for the
//! same uncached body may both run the transformer, and the later insert
//! wins. Because transformation is pure, both results are identical and the
//! race only costs time.

use std::sync::{
  Arc,
  atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;

use crate::{
  error::MarkupError,
  processor::{MarkupTransformer, Transform},
  types::RenderedMarkup,
};

/// Counters for cache performance monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
  pub hits:    u64,
  pub misses:  u64,
  /// Number of entries currently stored.
  pub entries: usize,
}

/// Body-keyed cache in front of a [`Transform`].
#[derive(Debug)]
pub struct TransformCache<T = MarkupTransformer> {
  transformer: T,
  entries:     DashMap<String, Arc<RenderedMarkup>>,
  hits:        AtomicU64,
  misses:      AtomicU64,
}

impl<T: Transform> TransformCache<T> {
  #[must_use]
  pub fn new(transformer: T) -> Self {
    Self {
      transformer,
      entries: DashMap::new(),
      hits: AtomicU64::new(0),
      misses: AtomicU64::new(0),
    }
  }

  /// The transformer behind this cache.
  pub const fn transformer(&self) -> &T {
    &self.transformer
  }

  /// Return the rendered markup for `body`, transforming it on a miss.
  ///
  /// # Errors
  ///
  /// Propagates the transformer's error. Failed transformations are not
  /// cached.
  pub fn get_or_compute(
    &self,
    body: &str,
  ) -> Result<Arc<RenderedMarkup>, MarkupError> {
    if let Some(entry) = self.entries.get(body) {
      self.hits.fetch_add(1, Ordering::Relaxed);
      return Ok(Arc::clone(entry.value()));
    }

    self.misses.fetch_add(1, Ordering::Relaxed);
    let rendered = Arc::new(self.transformer.transform(body)?);
    self.entries.insert(body.to_string(), Arc::clone(&rendered));
    Ok(rendered)
  }

  /// Look up a body without computing anything.
  #[must_use]
  pub fn get(&self, body: &str) -> Option<Arc<RenderedMarkup>> {
    self.entries.get(body).map(|entry| Arc::clone(entry.value()))
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  #[must_use]
  pub fn stats(&self) -> CacheStats {
    CacheStats {
      hits:    self.hits.load(Ordering::Relaxed),
      misses:  self.misses.load(Ordering::Relaxed),
      entries: self.entries.len(),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::AtomicUsize;

  use super::*;

  /// Transformer that counts its calls and echoes the body.
  #[derive(Default)]
  struct CountingTransform {
    calls: AtomicUsize,
  }

  impl Transform for CountingTransform {
    fn transform(&self, body: &str) -> Result<RenderedMarkup, MarkupError> {
      self.calls.fetch_add(1, Ordering::SeqCst);
      if body == "fail" {
        return Err(MarkupError::Transform("refused".to_string()));
      }
      Ok(RenderedMarkup {
        html: format!("<p>{body}</p>"),
        ..RenderedMarkup::default()
      })
    }
  }

  #[test]
  fn test_second_lookup_hits() {
    let cache = TransformCache::new(CountingTransform::default());

    let first = cache.get_or_compute("hello").expect("transform failed");
    let second = cache.get_or_compute("hello").expect("transform failed");

    assert_eq!(first, second);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.transformer().calls.load(Ordering::SeqCst), 1);
    assert_eq!(cache.stats(), CacheStats {
      hits:    1,
      misses:  1,
      entries: 1,
    });
  }

  #[test]
  fn test_distinct_bodies_do_not_collide() {
    let cache = TransformCache::new(CountingTransform::default());
    let a = cache.get_or_compute("body a").expect("transform failed");
    let b = cache.get_or_compute("body a ").expect("transform failed");

    assert_ne!(a.html, b.html);
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.transformer().calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn test_errors_are_not_cached() {
    let cache = TransformCache::new(CountingTransform::default());
    assert!(cache.get_or_compute("fail").is_err());
    assert!(cache.get_or_compute("fail").is_err());

    assert!(cache.is_empty());
    assert!(cache.get("fail").is_none());
    assert_eq!(cache.transformer().calls.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn test_concurrent_lookups_agree() {
    let cache = TransformCache::new(CountingTransform::default());

    std::thread::scope(|scope| {
      for _ in 0..8 {
        scope.spawn(|| {
          let rendered = cache.get_or_compute("shared").expect("transform failed");
          assert_eq!(rendered.html, "<p>shared</p>");
        });
      }
    });

    assert_eq!(cache.len(), 1);
    let calls = cache.transformer().calls.load(Ordering::SeqCst);
    assert!((1..=8).contains(&calls));
  }
}
