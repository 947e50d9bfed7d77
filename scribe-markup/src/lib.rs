//! # scribe-markup
//!
//! Turns the body of a content document (markdown with embedded JSX-style
//! components) into sanitized, syntax-highlighted HTML.
//!
//! ## Quick Start
//!
//! ```rust
//! use scribe_markup::{MarkupOptions, MarkupTransformer, Transform};
//!
//! let transformer = MarkupTransformer::new(MarkupOptions::default());
//! let rendered = transformer
//!   .transform("# Hello World\n\n<Callout emoji=\"👋\">Hi!</Callout>\n")
//!   .expect("transformation failed");
//!
//! assert_eq!(rendered.title.as_deref(), Some("Hello World"));
//! assert_eq!(rendered.components[0].name, "Callout");
//! ```
//!
//! ## Pipeline
//!
//! 1. **Parse**: embedded components are lifted out of the body and the rest
//!    is parsed as CommonMark (with GFM extensions) by `comrak`.
//! 2. **Restructure**: the markdown tree becomes a generic HTML element tree.
//! 3. **Enrich**: code blocks are highlighted and get a copy-to-clipboard
//!    marker, headings get slug ids, links and images get their policies.
//! 4. **Serialize**: the tree is written out and components are put back
//!    exactly as they were written.
//!
//! Identical bodies always produce byte-identical output, which is what makes
//! [`TransformCache`] safe to share.

pub mod cache;
pub mod components;
mod error;
pub mod processor;
pub mod syntax;
mod types;
pub mod utils;
pub mod widgets;

pub use crate::{
  cache::{CacheStats, TransformCache},
  components::{AttrValue, EmbeddedComponent, Placement},
  error::MarkupError,
  processor::{
    CopyButtonOptions,
    CopyVisibility,
    MarkupOptions,
    MarkupOptionsBuilder,
    MarkupTransformer,
    Transform,
  },
  types::{Diagnostic, Header, RenderedMarkup},
  utils::slugify,
  widgets::{Widget, WidgetKind, WidgetRegistry},
};
