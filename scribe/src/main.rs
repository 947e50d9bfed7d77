use std::io::{self, Write};

use color_eyre::eyre::{Context, Result};
use log::{LevelFilter, info};
use scribe::{
  cli::{Cli, Commands},
  commands,
};
use scribe_config::Config;

fn main() -> Result<()> {
  color_eyre::install()?;

  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  if let Commands::Init {
    output,
    format,
    force,
  } = &cli.command
  {
    return commands::init(output, format, *force);
  }

  let config = Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")?;

  match cli.command {
    Commands::Init { .. } => Ok(()),

    Commands::List {
      content_dir,
      render,
      best_effort,
    } => {
      let config = commands::prepare(config, content_dir, None)?;
      let documents = commands::list(&config, render, best_effort)?;
      emit(&serde_json::to_string_pretty(&documents)?)
    },

    Commands::Render { slug, content_dir } => {
      let config = commands::prepare(config, content_dir, None)?;
      let rendered = commands::render(&config, &slug)?;
      emit(&serde_json::to_string_pretty(&rendered)?)
    },

    Commands::Sync { content_dir, store } => {
      let config = commands::prepare(config, content_dir, store)?;
      let report = commands::sync(&config)?;
      info!(
        "Sync complete: {} new documents in {}",
        report.inserted_count,
        config.store_path.display()
      );
      emit(&serde_json::to_string(&report)?)
    },

    Commands::ThemeCss => emit(&commands::theme_css(&config)?),
  }
}

/// Write command output to stdout.
fn emit(text: &str) -> Result<()> {
  let mut stdout = io::stdout().lock();
  writeln!(stdout, "{text}").wrap_err("Failed to write to stdout")
}
