#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use kuchikikiki::NodeRef;
use scribe_markup::{
  CopyButtonOptions,
  MarkupOptions,
  MarkupOptionsBuilder,
  MarkupTransformer,
  RenderedMarkup,
  Transform,
  TransformCache,
};
use tendril::TendrilSink;

fn transform(body: &str) -> RenderedMarkup {
  MarkupTransformer::new(MarkupOptions::default())
    .transform(body)
    .expect("Failed to transform body")
}

fn parse(html: &str) -> NodeRef {
  kuchikikiki::parse_html().one(html)
}

fn attr(node: &NodeRef, selector: &str, name: &str) -> Option<String> {
  let element = node.select_first(selector).ok()?;
  let attributes = element.attributes.borrow();
  attributes.get(name).map(str::to_string)
}

#[test]
fn test_output_is_deterministic() {
  let body = "# Title\n\nSome text with a [link](https://example.com).\n\n```rust\nfn main() {}\n```\n\n<Callout emoji=\"💡\">\nNote\n</Callout>\n";
  let first = transform(body);
  let second = transform(body);
  assert_eq!(first, second);

  // A separately constructed transformer agrees too
  let other = MarkupTransformer::new(MarkupOptions::default())
    .transform(body)
    .expect("Failed to transform body");
  assert_eq!(first.html, other.html);
}

#[test]
fn test_code_text_is_preserved_exactly() {
  let body = "```js\nconst x = \"a<b>&c\";\n```\n";
  let rendered = transform(body);
  let document = parse(&rendered.html);

  let code = document
    .select_first("pre code")
    .expect("Expected a code element");
  assert_eq!(code.text_contents(), "const x = \"a<b>&c\";\n");
}

#[test]
fn test_code_block_container_and_copy_marker() {
  let rendered = transform("```rust\nlet answer = 42;\n```\n");
  let document = parse(&rendered.html);

  assert_eq!(
    attr(&document, "div.code-block", "data-theme").as_deref(),
    Some("github-dark")
  );
  assert_eq!(
    attr(&document, "div.code-block", "data-language").as_deref(),
    Some("rust")
  );

  let button = document
    .select_first("div.code-block > button[data-copy-code]")
    .expect("Expected a copy marker");
  assert_eq!(button.text_contents(), "");
  let attributes = button.attributes.borrow();
  assert!(attributes.contains("hidden"));
  assert_eq!(attributes.get("data-visibility"), Some("hover"));
  assert_eq!(attributes.get("data-feedback-duration"), Some("3000"));

  // The marker never carries the code itself
  assert!(document.select_first("div.code-block > pre > code").is_ok());
}

#[cfg(feature = "syntect")]
#[test]
fn test_code_is_highlighted_with_classes() {
  let rendered = transform("```rust\nfn main() { println!(\"hi\"); }\n```\n");
  let document = parse(&rendered.html);

  assert_eq!(attr(&document, "pre", "class").as_deref(), Some("highlight"));
  assert!(document.select_first("pre code span").is_ok());
  assert!(rendered.html.contains("class=\"hl-"));
  assert!(!rendered.html.contains("style="));
}

#[test]
fn test_plain_options_skip_decoration() {
  let transformer = MarkupTransformer::new(MarkupOptions::plain());
  let rendered = transformer
    .transform("# Head\n\n```rust\nfn main() {}\n```\n\n[x](https://example.com)\n")
    .expect("Failed to transform body");
  let document = parse(&rendered.html);

  assert!(document.select_first("button").is_err());
  assert!(document.select_first("pre code span").is_err());
  assert!(document.select_first("h1 a.anchor").is_err());
  assert_eq!(attr(&document, "a", "target"), None);
  // Headings still get their slug
  assert_eq!(attr(&document, "h1", "id").as_deref(), Some("head"));
}

#[test]
fn test_copy_marker_can_be_disabled() {
  let options = MarkupOptionsBuilder::new()
    .copy_button(CopyButtonOptions {
      enable: false,
      ..CopyButtonOptions::default()
    })
    .build();
  let rendered = MarkupTransformer::new(options)
    .transform("```\nplain\n```\n")
    .expect("Failed to transform body");
  let document = parse(&rendered.html);

  assert!(document.select_first("button").is_err());
  assert_eq!(
    attr(&document, "div.code-block", "data-language").as_deref(),
    Some("plaintext")
  );
}

#[test]
fn test_headings_get_slugs_and_anchors() {
  let rendered = transform("# Hello World\n\n## A & B\n\n### `code` *title*\n");

  let ids: Vec<_> = rendered.headers.iter().map(|h| h.id.as_str()).collect();
  assert_eq!(ids, ["hello-world", "a-and-b", "code-title"]);
  let levels: Vec<_> = rendered.headers.iter().map(|h| h.level).collect();
  assert_eq!(levels, [1, 2, 3]);
  assert_eq!(rendered.title.as_deref(), Some("Hello World"));

  let document = parse(&rendered.html);
  assert_eq!(
    attr(&document, "h2", "id").as_deref(),
    Some("a-and-b")
  );
  assert_eq!(
    attr(&document, "h2 > a.anchor", "href").as_deref(),
    Some("#a-and-b")
  );
}

#[test]
fn test_link_policy() {
  let rendered = transform(
    "[ext](https://example.com) [int](/about) [frag](#intro) <https://auto.example>\n",
  );
  let document = parse(&rendered.html);

  let links: Vec<_> = document
    .select("a")
    .expect("Invalid selector")
    .map(|link| {
      let attributes = link.attributes.borrow();
      (
        attributes.get("href").unwrap_or_default().to_string(),
        attributes.get("target").map(str::to_string),
        attributes.get("rel").map(str::to_string),
      )
    })
    .collect();

  let external = Some("_blank".to_string());
  let rel = Some("noopener noreferrer".to_string());
  assert_eq!(links, vec![
    ("https://example.com".to_string(), external.clone(), rel.clone()),
    ("/about".to_string(), None, None),
    ("#intro".to_string(), None, None),
    ("https://auto.example".to_string(), external, rel),
  ]);
}

#[test]
fn test_images_are_rounded() {
  let rendered = transform("![A cat](/cat.png)\n");
  let document = parse(&rendered.html);
  assert_eq!(attr(&document, "img", "class").as_deref(), Some("rounded-lg"));
  assert_eq!(attr(&document, "img", "alt").as_deref(), Some("A cat"));
}

#[test]
fn test_raw_html_is_omitted_by_default() {
  let body = "<div class=\"note\">raw</div>\n\n<script>alert(1)</script>\n\ntext\n";

  let rendered = transform(body);
  assert!(!rendered.html.contains("<script>"));
  assert!(!rendered.html.contains("class=\"note\""));

  let permissive = MarkupTransformer::new(
    MarkupOptionsBuilder::new().allow_raw_html(true).build(),
  );
  let rendered = permissive
    .transform(body)
    .expect("Failed to transform body");
  assert!(rendered.html.contains("<div class=\"note\">raw</div>"));
  assert!(rendered.html.contains("<script>alert(1)</script>"));
}

#[test]
fn test_inline_component_round_trips_verbatim() {
  let rendered = transform("Watch <YouTube videoId=\"abc\" /> now.\n");
  assert_eq!(
    rendered.html,
    "<p>Watch <YouTube videoId=\"abc\" /> now.</p>\n"
  );
  assert!(rendered.diagnostics.is_empty());
}

#[test]
fn test_block_component_is_not_wrapped() {
  let source = "<Callout emoji=\"💡\">\nSome **bold** text\n</Callout>";
  let rendered = transform(&format!("Intro\n\n{source}\n\nOutro\n"));

  assert!(rendered.html.contains(source));
  assert!(!rendered.html.contains("<p><Callout"));
  assert!(rendered.html.starts_with("<p>Intro</p>"));
  assert!(rendered.html.trim_end().ends_with("<p>Outro</p>"));
  assert_eq!(rendered.components.len(), 1);
  assert_eq!(rendered.components[0].name, "Callout");
}

#[test]
fn test_unknown_component_is_inert_text() {
  let rendered = transform("<Sparkle level=\"9\" />\n");
  assert!(
    rendered
      .html
      .contains("<p>&lt;Sparkle level=&quot;9&quot; /&gt;</p>")
  );
  assert_eq!(rendered.diagnostics.len(), 1);
  assert_eq!(rendered.diagnostics[0].message, "unknown component <Sparkle>");
  assert_eq!(
    (rendered.diagnostics[0].line, rendered.diagnostics[0].column),
    (1, 1)
  );
}

#[test]
fn test_malformed_component_becomes_text() {
  let rendered =
    transform("Before\n\n<Callout emoji=\"x\">\nnever closed\n\nAfter\n");

  assert!(rendered.html.contains("&lt;Callout emoji=\"x\"&gt;"));
  assert!(rendered.html.contains("<p>After</p>"));
  assert!(rendered.components.is_empty());
  assert_eq!(rendered.diagnostics.len(), 1);
  assert_eq!(rendered.diagnostics[0].line, 3);
}

#[test]
fn test_missing_required_attribute_is_diagnosed() {
  let rendered = transform("<Quote text=\"Be kind\" />\n");
  assert_eq!(rendered.diagnostics.len(), 1);
  assert!(rendered.diagnostics[0].message.contains("`author`"));
  // The component still passes through untouched
  assert!(rendered.html.contains("<Quote text=\"Be kind\" />"));
}

#[test]
fn test_component_in_code_stays_code() {
  let rendered = transform("```mdx\n<Callout emoji=\"x\" />\n```\n");
  assert!(rendered.components.is_empty());

  let document = parse(&rendered.html);
  let code = document.select_first("pre code").expect("Expected code");
  assert_eq!(code.text_contents(), "<Callout emoji=\"x\" />\n");
}

#[test]
fn test_component_in_heading_and_alt_text() {
  let rendered = transform("## Setup <Todo text=\"x\" />\n\n![<Todo text=\"y\" />](/a.png)\n");

  assert_eq!(rendered.headers[0].text, "Setup");
  assert_eq!(rendered.headers[0].id, "setup");

  let document = parse(&rendered.html);
  assert_eq!(
    attr(&document, "img", "alt").as_deref(),
    Some("<Todo text=\"y\" />")
  );
}

#[test]
fn test_cache_in_front_of_transformer() {
  let cache = TransformCache::new(MarkupTransformer::new(MarkupOptions::default()));
  let body = "# Cached\n";

  let first = cache.get_or_compute(body).expect("Failed to transform body");
  let second = cache.get_or_compute(body).expect("Failed to transform body");

  assert_eq!(first, second);
  assert_eq!(cache.stats().misses, 1);
  assert_eq!(cache.stats().hits, 1);
}

#[cfg(feature = "syntect")]
#[test]
fn test_theme_stylesheet() {
  let transformer = MarkupTransformer::new(MarkupOptions::default());
  let css = transformer.theme_css().expect("Failed to build theme css");
  assert!(css.contains(".hl-"));
}

#[test]
fn test_widget_attributes_and_children_are_sanitized() {
  let body = "<Callout emoji=\"x\" onmouseover=\"alert(1)\">\n<script>alert(2)</script>\n</Callout>\n\n<script>alert(3)</script>\n";
  let rendered = transform(body);

  assert!(
    rendered
      .html
      .contains("<Callout emoji=\"x\">\n&lt;script>alert(2)&lt;/script>\n</Callout>")
  );
  assert!(!rendered.html.contains("onmouseover"));
  assert!(!rendered.html.contains("<script"));
  // The parsed component still carries everything that was written
  assert!(rendered.components[0].attributes.contains_key("onmouseover"));

  let permissive = MarkupTransformer::new(
    MarkupOptionsBuilder::new().allow_raw_html(true).build(),
  );
  let rendered = permissive
    .transform(body)
    .expect("Failed to transform body");
  assert!(rendered.html.contains("onmouseover=\"alert(1)\""));
}

#[test]
fn test_nested_widgets_survive_sanitizing() {
  let rendered =
    transform("<Tabs>\n<Tab label=\"a\">\nA <b>bold</b>\n</Tab>\n</Tabs>\n");

  assert!(rendered.html.starts_with("<Tabs>"));
  assert!(
    rendered
      .html
      .contains("<Tab label=\"a\">\nA &lt;b>bold&lt;/b>\n</Tab>")
  );
  assert!(rendered.diagnostics.is_empty());
}

#[test]
fn test_component_in_list_item_fence_stays_code() {
  let body = "- item\n\n    ```jsx\n    const a = 1;\n\n    <Callout emoji=\"x\" />\n    ```\n";
  let rendered = MarkupTransformer::new(MarkupOptions::plain())
    .transform(body)
    .expect("Failed to transform body");

  assert!(rendered.components.is_empty());
  assert!(!rendered.html.contains("<Callout"));

  let document = parse(&rendered.html);
  let code = document.select_first("pre code").expect("Expected code");
  assert_eq!(
    code.text_contents(),
    "const a = 1;\n\n<Callout emoji=\"x\" />\n"
  );
}

#[test]
fn test_component_in_blockquote_fence_stays_code() {
  let rendered =
    transform("> ```jsx\n> const a = 1;\n>\n> <Callout emoji=\"x\" />\n> ```\n");

  assert!(rendered.components.is_empty());
  let document = parse(&rendered.html);
  let code = document
    .select_first("blockquote pre code")
    .expect("Expected code");
  assert_eq!(
    code.text_contents(),
    "const a = 1;\n\n<Callout emoji=\"x\" />\n"
  );
}

#[test]
fn test_component_in_indented_code_is_escaped() {
  let rendered = MarkupTransformer::new(MarkupOptions::plain())
    .transform("Text\n\n    <Todo text=\"t\" />\n")
    .expect("Failed to transform body");

  assert!(!rendered.html.contains("<Todo"));
  let document = parse(&rendered.html);
  let code = document.select_first("pre code").expect("Expected code");
  assert_eq!(code.text_contents(), "<Todo text=\"t\" />\n");
}

#[test]
fn test_private_use_text_is_left_alone() {
  let rendered = transform("a \u{E000}0\u{E001} b <Todo text=\"t\" />\n");

  assert_eq!(rendered.html.matches("<Todo").count(), 1);
  assert!(rendered.html.contains("a \u{E000}0\u{E001} b <Todo text=\"t\" />"));
}
