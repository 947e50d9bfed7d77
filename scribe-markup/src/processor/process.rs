//! Panic containment for transformer stages.
use log::error;

use crate::error::MarkupError;

/// Run one transformation with panic containment.
///
/// A panic inside a stage must not take down a whole batch, so it is caught,
/// logged and turned into [`MarkupError::Transform`] for this body alone.
///
/// # Errors
///
/// Returns the stage's own error, or [`MarkupError::Transform`] if it
/// panicked.
pub fn process_safe<T, F>(content: &str, processor_fn: F) -> Result<T, MarkupError>
where
  F: FnOnce(&str) -> Result<T, MarkupError>,
{
  let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    processor_fn(content)
  }));

  match result {
    Ok(processed) => processed,
    Err(e) => {
      let message = if let Some(message) = e.downcast_ref::<String>() {
        message.clone()
      } else if let Some(message) = e.downcast_ref::<&str>() {
        (*message).to_string()
      } else {
        "unknown panic".to_string()
      };
      error!("Error processing markup: {message}");
      Err(MarkupError::Transform(message))
    },
  }
}
