//! DOM enrichment passes run between restructuring and serialization.
use kuchikikiki::{Attribute, ExpandedName, NodeRef};
use log::warn;
use markup5ever::{QualName, local_name, ns};
use tendril::TendrilSink;

use super::types::MarkupTransformer;
use crate::{components::Delimiters, types::Header, utils};

/// Collect matching nodes up front so the tree can be edited while walking
/// the results.
fn select_all(document: &NodeRef, selector: &str) -> Vec<NodeRef> {
  document.select(selector).map_or_else(
    |()| {
      log::error!("Invalid selector: {selector}");
      Vec::new()
    },
    |matches| matches.map(|m| m.as_node().clone()).collect(),
  )
}

fn new_element(name: &str, attributes: &[(&str, &str)]) -> NodeRef {
  NodeRef::new_element(
    QualName::new(None, ns!(html), name.into()),
    attributes.iter().map(|(key, value)| {
      (ExpandedName::new("", *key), Attribute {
        prefix: None,
        value:  (*value).to_string(),
      })
    }),
  )
}

impl MarkupTransformer {
  /// Decorate every `<pre><code>` block.
  ///
  /// The code element keeps its exact text content: highlighting only wraps
  /// runs of it in spans. The `<pre>` moves into a container carrying the
  /// theme and language, next to an empty copy-to-clipboard marker.
  pub(super) fn enrich_code_blocks(&self, document: &NodeRef) {
    for code in select_all(document, "pre > code") {
      let Some(pre) = code.parent() else {
        continue;
      };

      let language = code
        .as_element()
        .and_then(|element| {
          element
            .attributes
            .borrow()
            .get(local_name!("class"))
            .and_then(|class| {
              class
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-"))
                .map(str::to_string)
            })
        })
        .unwrap_or_else(|| "plaintext".to_string());

      if self.highlight_into(&code, &language)
        && let Some(element) = pre.as_element()
      {
        element
          .attributes
          .borrow_mut()
          .insert(local_name!("class"), "highlight".to_string());
      }

      let container = new_element("div", &[
        ("class", "code-block"),
        ("data-theme", self.options.theme.as_str()),
        ("data-language", language.as_str()),
      ]);
      pre.insert_before(container.clone());

      if self.options.copy_button.enable {
        let duration = self.options.copy_button.feedback_duration_ms.to_string();
        container.append(new_element("button", &[
          ("type", "button"),
          ("class", "copy-button"),
          ("data-copy-code", ""),
          ("data-visibility", self.options.copy_button.visibility.as_str()),
          ("data-feedback-duration", duration.as_str()),
          ("aria-label", "Copy code"),
          ("hidden", ""),
        ]));
      }
      container.append(pre);
    }
  }

  /// Replace the children of `code` with highlighted markup for the same
  /// text. Returns whether highlighting happened.
  fn highlight_into(&self, code: &NodeRef, language: &str) -> bool {
    let Some(manager) = &self.syntax_manager else {
      return false;
    };

    let text = code.text_contents();
    let highlighted = match manager.highlight_code(&text, language) {
      Ok(highlighted) => highlighted,
      Err(e) => {
        warn!("Failed to highlight {language} code block: {e}");
        return false;
      },
    };

    let parsed = kuchikikiki::parse_html()
      .one(format!("<pre><code>{highlighted}</code></pre>"));
    let Ok(new_code) = parsed.select_first("code") else {
      return false;
    };

    // Highlighting must never change the code itself
    if new_code.as_node().text_contents() != text {
      warn!("Highlighter altered {language} code text, keeping it plain");
      return false;
    }

    for child in code.children().collect::<Vec<_>>() {
      child.detach();
    }
    for child in new_code.as_node().children().collect::<Vec<_>>() {
      code.append(child);
    }
    true
  }

  /// Give each heading a slug `id` and, optionally, an anchor link.
  ///
  /// Returns the headings in document order and the text of the first
  /// level-1 heading.
  pub(super) fn enrich_headings(
    &self,
    document: &NodeRef,
    delimiters: Delimiters,
  ) -> (Vec<Header>, Option<String>) {
    let mut headers = Vec::new();
    let mut title = None;

    for heading in select_all(document, "h1, h2, h3, h4, h5, h6") {
      let Some(element) = heading.as_element() else {
        continue;
      };
      let level = element
        .name
        .local
        .as_ref()
        .strip_prefix('h')
        .and_then(|n| n.parse::<u8>().ok())
        .unwrap_or(1);

      let text = delimiters
        .replace(&heading.text_contents(), |_| String::new())
        .trim()
        .to_string();
      let id = utils::slugify(&text);

      element
        .attributes
        .borrow_mut()
        .insert(local_name!("id"), id.clone());

      if self.options.heading_anchors {
        let href = format!("#{id}");
        heading.prepend(new_element("a", &[
          ("href", href.as_str()),
          ("class", "anchor"),
        ]));
      }

      if level == 1 && title.is_none() {
        title = Some(text.clone());
      }
      headers.push(Header { text, level, id });
    }

    (headers, title)
  }

  /// Apply the link policy: site-relative (`/`) and fragment (`#`) links
  /// stay as they are, everything else opens in a new tab.
  pub(super) fn enrich_links(&self, document: &NodeRef) {
    if !self.options.external_links_new_tab {
      return;
    }

    for link in select_all(document, "a[href]") {
      let Some(element) = link.as_element() else {
        continue;
      };
      let mut attributes = element.attributes.borrow_mut();
      let internal = attributes
        .get(local_name!("href"))
        .is_some_and(|href| href.starts_with('/') || href.starts_with('#'));
      if !internal {
        attributes.insert(local_name!("target"), "_blank".to_string());
        attributes.insert(local_name!("rel"), "noopener noreferrer".to_string());
      }
    }
  }

  /// Round the corners of every image.
  pub(super) fn enrich_images(&self, document: &NodeRef) {
    for image in select_all(document, "img") {
      let Some(element) = image.as_element() else {
        continue;
      };
      let mut attributes = element.attributes.borrow_mut();
      let class = match attributes.get(local_name!("class")) {
        Some(existing) if existing.split_whitespace().any(|c| c == "rounded-lg") => {
          continue;
        },
        Some(existing) => format!("{existing} rounded-lg"),
        None => "rounded-lg".to_string(),
      };
      attributes.insert(local_name!("class"), class);
    }
  }
}
