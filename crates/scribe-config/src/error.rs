use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors raised while loading, overriding or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// Invalid keys, values or settings. The message is meant for the user.
  #[error("{0}")]
  Config(String),

  #[error("failed to access config file {}: {source}", path.display())]
  Io {
    path:   PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("invalid JSON in {}: {source}", path.display())]
  Json {
    path:   PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("invalid TOML in {}: {source}", path.display())]
  Toml {
    path:   PathBuf,
    #[source]
    source: toml::de::Error,
  },
}
