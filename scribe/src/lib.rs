//! Expose scribe's command line and commands for testing and for the xtask
//! crate. The content pipeline itself lives in the `scribe-*` library crates.
pub mod cli;
pub mod commands;
