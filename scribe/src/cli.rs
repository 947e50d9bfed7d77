use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command line interface for scribe
#[derive(Parser, Debug)]
#[command(author, version, about = "scribe: MDX content pipeline")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Commands,

  /// Enable verbose debug logging
  #[arg(short, long)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times) Multiple files are merged in order, with later files overriding
  /// earlier ones
  #[arg(short = 'c', long = "config-file", action = clap::ArgAction::Append)]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the scribe CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new scribe configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "scribe.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Print every document of the corpus as JSON.
  List {
    /// Directory containing the content documents.
    #[arg(short = 'd', long = "content-dir")]
    content_dir: Option<PathBuf>,

    /// Include the rendered HTML of each document.
    #[arg(long)]
    render: bool,

    /// Skip documents that fail to load instead of aborting.
    #[arg(long = "best-effort")]
    best_effort: bool,
  },

  /// Print the rendered markup of one document as JSON.
  Render {
    /// Slug of the document to render.
    slug: String,

    /// Directory containing the content documents.
    #[arg(short = 'd', long = "content-dir")]
    content_dir: Option<PathBuf>,
  },

  /// Insert documents the store does not hold yet.
  Sync {
    /// Directory containing the content documents.
    #[arg(short = 'd', long = "content-dir")]
    content_dir: Option<PathBuf>,

    /// JSON file used as the document store.
    #[arg(short = 's', long = "store")]
    store: Option<PathBuf>,
  },

  /// Print the stylesheet for the configured highlighting theme.
  ThemeCss,
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
