//! Bounded admission for per-document work.
//!
//! An [`AdmissionPool`] owns a dedicated rayon thread pool with exactly
//! `bound` workers. Each worker runs one item at a time, so no more than
//! `bound` items are ever in flight; the rest wait in the pool's queue until
//! a worker frees up.
use log::debug;
use rayon::{ThreadPool, ThreadPoolBuilder, prelude::*};

use crate::error::ContentError;

/// Default number of documents processed at the same time.
pub const DEFAULT_BOUND: usize = 5;

/// Counting admission limiter backed by a fixed-size worker pool.
#[derive(Debug)]
pub struct AdmissionPool {
  pool:  ThreadPool,
  bound: usize,
}

impl AdmissionPool {
  /// Create a pool admitting at most `bound` concurrent items.
  ///
  /// # Errors
  ///
  /// Returns [`ContentError::InvalidBound`] if `bound` is zero, or
  /// [`ContentError::Pool`] if the worker threads cannot be started.
  pub fn new(bound: usize) -> Result<Self, ContentError> {
    if bound == 0 {
      return Err(ContentError::InvalidBound(bound));
    }

    let pool = ThreadPoolBuilder::new()
      .num_threads(bound)
      .thread_name(|index| format!("scribe-load-{index}"))
      .build()
      .map_err(|e| ContentError::Pool(e.to_string()))?;
    debug!("Started admission pool with {bound} slots");

    Ok(Self { pool, bound })
  }

  /// The maximum number of items in flight.
  #[must_use]
  pub const fn bound(&self) -> usize {
    self.bound
  }

  /// Run `f` on every item, returning the results in input order.
  ///
  /// Blocks the calling thread until every item is done.
  pub fn map<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
  where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync + Send,
  {
    self
      .pool
      .install(|| items.into_par_iter().map(f).collect())
  }

  /// Run `f` on every item until the first error.
  ///
  /// Items not yet admitted when an error occurs are never started. Items
  /// already in flight finish, but their results are discarded.
  ///
  /// # Errors
  ///
  /// Returns an error produced by `f`. When several items fail at about the
  /// same time, which of their errors is returned is unspecified.
  pub fn try_map<T, R, E, F>(&self, items: Vec<T>, f: F) -> Result<Vec<R>, E>
  where
    T: Send,
    R: Send,
    E: Send,
    F: Fn(T) -> Result<R, E> + Sync + Send,
  {
    self
      .pool
      .install(|| items.into_par_iter().map(f).collect())
  }
}
