use std::{
  fs,
  path::{Path, PathBuf},
  sync::OnceLock,
};

use scribe_macros::Configurable;
use scribe_markup::MarkupOptions;
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, markup::MarkupConfig};

/// Configuration for the scribe content pipeline.
///
/// [`Config`] controls where the corpus lives, how it is loaded, where synced
/// records go and how document bodies are rendered. Fields are typically
/// loaded from a TOML or JSON config file, but can also be set with
/// `--config KEY=VALUE` on the command line.
#[derive(Debug, Clone, Serialize, Deserialize, Configurable)]
#[serde(default)]
pub struct Config {
  /// Directory containing the content documents.
  #[config(key = "content_dir")]
  pub content_dir: PathBuf,

  /// File extensions recognized as content documents, without the dot.
  #[config(key = "extensions")]
  pub extensions: Vec<String>,

  /// Whether to descend into sub-directories of the content directory.
  #[config(key = "recursive")]
  pub recursive: bool,

  /// Maximum number of documents in flight while loading.
  #[config(key = "concurrency")]
  pub concurrency: usize,

  /// Abort loading on the first failing document.
  #[config(key = "fail_fast")]
  pub fail_fast: bool,

  /// JSON file used as the document store.
  #[config(key = "store_path")]
  pub store_path: PathBuf,

  /// Author recorded when a document names none.
  #[config(key = "default_author")]
  pub default_author: String,

  /// Markup transformer configuration.
  #[config(nested)]
  pub markup: Option<MarkupConfig>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      content_dir:    PathBuf::from("content"),
      extensions:     vec!["mdx".to_string()],
      recursive:      false,
      concurrency:    5,
      fail_fast:      true,
      store_path:     PathBuf::from("posts.json"),
      default_author: "Unknown".to_string(),
      markup:         None,
    }
  }
}

impl Config {
  /// Options for the markup transformer, falling back to the defaults when
  /// no `[markup]` section is present.
  #[must_use]
  pub fn markup_options(&self) -> MarkupOptions {
    self
      .markup
      .as_ref()
      .map_or_else(MarkupOptions::default, MarkupConfig::to_options)
  }

  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format
  /// is unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| {
      ConfigError::Io {
        path: path.to_path_buf(),
        source,
      }
    })?;

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    match ext.to_lowercase().as_str() {
      "json" => {
        serde_json::from_str(&content).map_err(|source| {
          ConfigError::Json {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      "toml" => {
        toml::from_str(&content).map_err(|source| {
          ConfigError::Toml {
            path: path.to_path_buf(),
            source,
          }
        })
      },
      _ => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from files and overrides.
  ///
  /// Explicit config files are merged in order. Without any, a config file
  /// is looked up in the standard locations, and the defaults are used if
  /// none exists. `KEY=VALUE` overrides are applied last.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded or an override is
  /// invalid.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first)?;
      for config_path in rest {
        merged_config.merge(Self::from_file(config_path)?);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config)?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    Ok(config)
  }

  /// Apply configuration overrides from `KEY=VALUE` strings.
  ///
  /// Nested keys use dots: `markup.copy_button.visibility=always`. List
  /// values are comma-separated: `extensions=mdx,md`.
  ///
  /// # Errors
  ///
  /// Returns an error if an override is not in `KEY=VALUE` form, the key is
  /// not recognized, or the value cannot be parsed as the expected type.
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Merge another config into this one, with the other config's values
  /// taking precedence.
  ///
  /// # Merge Rules
  ///
  /// - Plain fields: the other value always replaces this one
  /// - [`Vec<T>`] fields: entries not already present are appended
  /// - Nested sections: merged key by key when both are present
  pub fn merge(&mut self, other: Self) {
    self.merge_fields(other);
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let current_dir = std::env::current_dir().ok()?;
        for filename in &["scribe.toml", "scribe.json", ".scribe.toml"] {
          let config_path = current_dir.join(filename);
          if config_path.exists() {
            return Some(config_path);
          }
        }

        if let Ok(xdg_config_home) = std::env::var("XDG_CONFIG_HOME") {
          let xdg_config_dir = PathBuf::from(xdg_config_home).join("scribe");
          for filename in &["config.toml", "config.json"] {
            let config_path = xdg_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        if let Ok(home) = std::env::var("HOME") {
          let home_config_dir =
            PathBuf::from(home).join(".config").join("scribe");
          for filename in &["config.toml", "config.json"] {
            let config_path = home_config_dir.join(filename);
            if config_path.exists() {
              return Some(config_path);
            }
          }
        }

        None
      })
      .clone()
  }

  /// Validate the configuration before loading a corpus with it.
  ///
  /// # Errors
  ///
  /// Returns an error listing every problem found: a zero concurrency bound,
  /// an empty extension list, or a content directory that does not exist.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if self.concurrency == 0 {
      errors.push("Concurrency must be at least 1".to_string());
    }

    if self.extensions.iter().all(|ext| ext.trim().is_empty()) {
      errors.push("At least one content extension is required".to_string());
    }

    if !self.content_dir.exists() {
      errors.push(format!(
        "Content directory does not exist: {}",
        self.content_dir.display()
      ));
    } else if !self.content_dir.is_dir() {
      errors.push(format!(
        "Content directory path is not a directory: {}",
        self.content_dir.display()
      ));
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Config(e.to_string()))?;

    fs::write(path, config_content).map_err(|source| {
      ConfigError::Io {
        path: path.to_path_buf(),
        source,
      }
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }
}
