use std::{
  fs,
  path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::{Command, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate_to};
use clap_mangen::Man;

const BIN_NAME: &str = "scribe";

#[derive(Parser)]
#[command(author, version, about)]
struct Xtask {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Generate shell completions for the scribe CLI
  Completions {
    /// Output directory for completion scripts.
    #[arg(short, long, default_value = "dist/completions")]
    output_dir: PathBuf,

    /// Shells to generate for. Defaults to every supported shell.
    #[arg(short, long, value_delimiter = ',')]
    shells: Vec<Shell>,
  },

  /// Generate manpages for scribe and each of its subcommands
  Manpages {
    /// Output directory for manpages.
    #[arg(short, long, default_value = "dist/man")]
    output_dir: PathBuf,
  },

  /// Build every distribution artifact
  Dist {
    /// Output directory for generated files.
    #[arg(short, long, default_value = "dist")]
    output_dir: PathBuf,
  },
}

fn main() -> Result<()> {
  match Xtask::parse().command {
    Commands::Completions { output_dir, shells } => {
      generate_completions(&output_dir, &shells)
    },
    Commands::Manpages { output_dir } => generate_manpages(&output_dir),
    Commands::Dist { output_dir } => {
      generate_completions(&output_dir.join("completions"), &[])?;
      generate_manpages(&output_dir.join("man"))
    },
  }
}

fn generate_completions(output_dir: &Path, shells: &[Shell]) -> Result<()> {
  fs::create_dir_all(output_dir).with_context(|| {
    format!("Failed to create {}", output_dir.display())
  })?;

  let shells = if shells.is_empty() {
    Shell::value_variants()
  } else {
    shells
  };

  let mut cmd = scribe::cli::Cli::command();
  for shell in shells {
    let path = generate_to(*shell, &mut cmd, BIN_NAME, output_dir)
      .with_context(|| format!("Failed to generate {shell} completions"))?;
    println!("Wrote {}", path.display());
  }
  Ok(())
}

/// One page for `scribe` itself, plus `scribe-<subcommand>.1` for every
/// subcommand.
fn generate_manpages(output_dir: &Path) -> Result<()> {
  fs::create_dir_all(output_dir).with_context(|| {
    format!("Failed to create {}", output_dir.display())
  })?;

  let cmd = scribe::cli::Cli::command();
  write_manpage(cmd.clone(), &output_dir.join(format!("{BIN_NAME}.1")))?;

  for sub in cmd.get_subcommands() {
    let name = format!("{BIN_NAME}-{}", sub.get_name());
    let page = sub.clone().display_name(name.clone());
    write_manpage(page, &output_dir.join(format!("{name}.1")))?;
  }
  Ok(())
}

fn write_manpage(cmd: Command, path: &Path) -> Result<()> {
  let mut file = fs::File::create(path).with_context(|| {
    format!("Failed to create manpage file at {}", path.display())
  })?;
  Man::new(cmd)
    .render(&mut file)
    .with_context(|| format!("Failed to render {}", path.display()))?;
  println!("Wrote {}", path.display());
  Ok(())
}
