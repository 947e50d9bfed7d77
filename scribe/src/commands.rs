//! Command implementations.
//!
//! Each command returns what it would print so it can be exercised without a
//! terminal; `main` does the printing.
use std::{
  fs,
  path::{Path, PathBuf},
};

use color_eyre::eyre::{Context, Result, bail};
use log::info;
use rayon::prelude::*;
use scribe_config::Config;
use scribe_content::{
  ContentDocument,
  CorpusLoader,
  DirectorySource,
  JsonFileStore,
  LoadPolicy,
  Metadata,
  SyncOptions,
  SyncReport,
  sort_by_published,
  sync_corpus,
};
use scribe_markup::{MarkupTransformer, RenderedMarkup, TransformCache};
use serde::Serialize;

/// One entry of `scribe list`.
#[derive(Debug, Serialize)]
pub struct ListedDocument {
  #[serde(flatten)]
  pub document: ContentDocument,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub html: Option<String>,
}

/// Output of `scribe render`.
#[derive(Debug, Serialize)]
pub struct RenderedDocument {
  pub slug:     String,
  pub metadata: Metadata,
  #[serde(flatten)]
  pub rendered: RenderedMarkup,
}

/// Write the default configuration to `output`.
///
/// # Errors
///
/// Fails if `output` exists and `force` is not set, or if the file cannot be
/// written.
pub fn init(output: &Path, format: &str, force: bool) -> Result<()> {
  if output.exists() && !force {
    bail!(
      "Configuration file already exists: {}. Use --force to overwrite.",
      output.display()
    );
  }

  if let Some(parent) = output.parent()
    && !parent.as_os_str().is_empty()
    && !parent.exists()
  {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
    info!("Created directory: {}", parent.display());
  }

  Config::generate_default_config(format, output).wrap_err_with(|| {
    format!(
      "Failed to generate configuration file: {}",
      output.display()
    )
  })?;

  info!("Configuration file created successfully. Edit it to point scribe at your content.");
  Ok(())
}

/// Apply command line paths on top of `config` and validate the result.
///
/// # Errors
///
/// Fails if the resulting configuration is invalid.
pub fn prepare(
  mut config: Config,
  content_dir: Option<PathBuf>,
  store: Option<PathBuf>,
) -> Result<Config> {
  if let Some(content_dir) = content_dir {
    config.content_dir = content_dir;
  }
  if let Some(store) = store {
    config.store_path = store;
  }

  config.validate()?;
  Ok(config)
}

/// Build a corpus loader from `config`.
///
/// # Errors
///
/// Fails if the admission pool cannot be created.
pub fn loader(config: &Config) -> Result<CorpusLoader> {
  let source = DirectorySource::new(&config.content_dir)
    .with_extensions(&config.extensions)
    .recursive(config.recursive);
  CorpusLoader::new(source, config.concurrency)
    .wrap_err("Failed to set up the corpus loader")
}

fn load(config: &Config, best_effort: bool) -> Result<Vec<ContentDocument>> {
  let policy = if best_effort || !config.fail_fast {
    LoadPolicy::BestEffort
  } else {
    LoadPolicy::FailFast
  };

  let corpus = loader(config)?
    .load_with(policy)
    .wrap_err_with(|| {
      format!("Failed to load corpus from {}", config.content_dir.display())
    })?;

  if !corpus.failures.is_empty() {
    info!(
      "Loaded {} documents, skipped {}",
      corpus.documents.len(),
      corpus.failures.len()
    );
  }
  Ok(corpus.documents)
}

/// Every document of the corpus, newest first, optionally with its HTML.
///
/// # Errors
///
/// Fails if the corpus cannot be loaded or a document cannot be rendered.
pub fn list(
  config: &Config,
  render: bool,
  best_effort: bool,
) -> Result<Vec<ListedDocument>> {
  let mut documents = load(config, best_effort)?;
  sort_by_published(&mut documents);

  if !render {
    return Ok(
      documents
        .into_iter()
        .map(|document| ListedDocument {
          document,
          html: None,
        })
        .collect(),
    );
  }

  let cache = TransformCache::new(MarkupTransformer::new(config.markup_options()));
  let listed = documents
    .into_par_iter()
    .map(|document| -> Result<ListedDocument> {
      let rendered = document.render(&cache)?;
      Ok(ListedDocument {
        html: Some(rendered.html.clone()),
        document,
      })
    })
    .collect::<Result<Vec<_>>>()?;

  let stats = cache.stats();
  info!(
    "Rendered {} documents ({} distinct bodies, {} cache hits)",
    listed.len(),
    stats.entries,
    stats.hits
  );
  Ok(listed)
}

/// Render the document with the given slug.
///
/// # Errors
///
/// Fails if there is no such document or it cannot be rendered.
pub fn render(config: &Config, slug: &str) -> Result<RenderedDocument> {
  let document = loader(config)?
    .load_document(slug)
    .wrap_err_with(|| format!("Failed to load document '{slug}'"))?;

  let cache = TransformCache::new(MarkupTransformer::new(config.markup_options()));
  let rendered = document.render(&cache)?;

  Ok(RenderedDocument {
    rendered: RenderedMarkup::clone(&rendered),
    slug:     document.slug,
    metadata: document.metadata,
  })
}

/// Reconcile the corpus into the configured JSON store.
///
/// # Errors
///
/// Fails if the corpus cannot be loaded or the store cannot be used.
pub fn sync(config: &Config) -> Result<SyncReport> {
  let loader = loader(config)?;
  let store = JsonFileStore::new(&config.store_path);
  let options = SyncOptions {
    default_author: config.default_author.clone(),
    ..SyncOptions::default()
  };

  sync_corpus(&loader, &store, &options).wrap_err_with(|| {
    format!(
      "Failed to sync {} into {}",
      config.content_dir.display(),
      config.store_path.display()
    )
  })
}

/// Stylesheet for the configured highlighting theme.
///
/// # Errors
///
/// Fails if highlighting is disabled or the theme is unknown.
pub fn theme_css(config: &Config) -> Result<String> {
  let options = config.markup_options();
  let theme = options.theme.clone();
  MarkupTransformer::new(options)
    .theme_css()
    .wrap_err_with(|| format!("Failed to generate a stylesheet for theme '{theme}'"))
}
