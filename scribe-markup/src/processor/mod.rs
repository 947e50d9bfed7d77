//! The markup transformer: embedded-component aware markdown to HTML.
mod core;
mod enrich;
pub mod process;
pub mod types;

pub use types::{
  CopyButtonOptions,
  CopyVisibility,
  MarkupOptions,
  MarkupOptionsBuilder,
  MarkupTransformer,
  Transform,
};
