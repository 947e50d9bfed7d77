#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use std::{fs, path::Path};

use scribe::commands;
use scribe_config::Config;
use tempfile::tempdir;

fn write_corpus(dir: &Path) {
  fs::create_dir_all(dir).expect("Failed to create dir in test");
  fs::write(
    dir.join("post-1.mdx"),
    "---\ntitle: \"Post 1\"\npublishedAt: \"2024-01-15\"\n---\n# Hello\n\n```rust\nfn main() {}\n```\n",
  )
  .expect("Failed to write post-1.mdx in test");
  fs::write(
    dir.join("post-2.mdx"),
    "---\ntitle: \"Post 2\"\npublishedAt: \"2024-03-01\"\n---\nWatch <YouTube videoId=\"abc\" /> now.\n",
  )
  .expect("Failed to write post-2.mdx in test");
}

fn config_for(root: &Path) -> Config {
  let content_dir = root.join("content");
  write_corpus(&content_dir);
  commands::prepare(
    Config::default(),
    Some(content_dir),
    Some(root.join("store/posts.json")),
  )
  .expect("Config should be valid")
}

#[test]
fn test_init_writes_loadable_config() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let output = temp_dir.path().join("nested/scribe.toml");

  commands::init(&output, "toml", false).expect("init failed");
  let config = Config::from_file(&output).expect("generated config should load");
  assert_eq!(config.concurrency, 5);

  let err = commands::init(&output, "toml", false).expect_err("second init should fail");
  assert!(err.to_string().contains("already exists"));

  commands::init(&output, "json", true).expect("forced init failed");
}

#[test]
fn test_prepare_rejects_missing_content_dir() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let err = commands::prepare(
    Config::default(),
    Some(temp_dir.path().join("missing")),
    None,
  )
  .expect_err("missing directory should be rejected");
  assert!(format!("{err:?}").contains("does not exist"));
}

#[test]
fn test_list_newest_first() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let config = config_for(temp_dir.path());

  let listed = commands::list(&config, false, false).expect("list failed");
  let slugs: Vec<_> = listed.iter().map(|d| d.document.slug.as_str()).collect();
  assert_eq!(slugs, ["post-2", "post-1"]);
  assert!(listed.iter().all(|d| d.html.is_none()));

  let json = serde_json::to_value(&listed).expect("list output should serialize");
  assert_eq!(json[0]["slug"], "post-2");
  assert_eq!(json[0]["metadata"]["title"], "Post 2");
  assert!(json[0]["source"].as_str().is_some_and(|s| s.contains("YouTube")));
  assert!(json[0].get("html").is_none());
}

#[test]
fn test_list_with_render() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let config = config_for(temp_dir.path());

  let listed = commands::list(&config, true, false).expect("list failed");
  let html = listed[0].html.as_deref().expect("html should be present");
  assert!(html.contains("<YouTube videoId=\"abc\" />"));

  let html = listed[1].html.as_deref().expect("html should be present");
  assert!(html.contains("data-language=\"rust\""));
}

#[test]
fn test_render_single_document() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let config = config_for(temp_dir.path());

  let rendered = commands::render(&config, "post-1").expect("render failed");
  assert_eq!(rendered.slug, "post-1");
  assert_eq!(rendered.rendered.title.as_deref(), Some("Hello"));

  let json = serde_json::to_value(&rendered).expect("render output should serialize");
  assert_eq!(json["metadata"]["title"], "Post 1");
  assert!(json["html"].as_str().is_some_and(|h| h.contains("<h1")));

  let err = commands::render(&config, "missing").expect_err("missing slug should fail");
  assert!(format!("{err:?}").contains("missing"));
}

#[test]
fn test_sync_twice() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let config = config_for(temp_dir.path());

  assert_eq!(commands::sync(&config).expect("sync failed").inserted_count, 2);
  assert_eq!(commands::sync(&config).expect("sync failed").inserted_count, 0);

  let stored: serde_json::Value = serde_json::from_str(
    &fs::read_to_string(&config.store_path).expect("store should exist"),
  )
  .expect("store should be JSON");
  assert_eq!(stored.as_array().map(Vec::len), Some(2));
}

#[test]
fn test_best_effort_list_skips_broken_documents() {
  let temp_dir = tempdir().expect("Failed to create temp dir in test");
  let config = config_for(temp_dir.path());
  fs::write(
    config.content_dir.join("broken.mdx"),
    "---\ntitle: [unclosed\n---\n",
  )
  .expect("Failed to write broken.mdx in test");

  assert!(commands::list(&config, false, false).is_err());
  let listed = commands::list(&config, false, true).expect("best effort list failed");
  assert_eq!(listed.len(), 2);
}

#[test]
fn test_theme_css() {
  let css = commands::theme_css(&Config::default()).expect("theme css failed");
  assert!(css.contains(".hl-"));
}
