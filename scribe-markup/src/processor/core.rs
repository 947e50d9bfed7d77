//! Core implementation of the markup transformer.
//!
//! This module contains the stage ordering of the pipeline and the
//! configuration plumbing. The enrichment passes live in `enrich`.
use comrak::{Arena, options::Options, parse_document};
use kuchikikiki::NodeRef;
use log::{debug, trace};
use markup5ever::local_name;
use tendril::TendrilSink;

use super::{
  process::process_safe,
  types::{MarkupOptions, MarkupTransformer, Transform},
};
use crate::{
  components::{self, AttrValue, Delimiters, EmbeddedComponent, Placement},
  error::MarkupError,
  syntax::create_default_manager,
  types::{Diagnostic, RenderedMarkup},
  widgets::{Widget, WidgetRegistry},
};

impl MarkupTransformer {
  /// Create a new `MarkupTransformer` with the given options.
  ///
  /// Highlighting is silently disabled if no backend is compiled in.
  #[must_use]
  pub fn new(options: MarkupOptions) -> Self {
    let syntax_manager = if options.highlight_code {
      create_default_manager()
        .inspect_err(|e| debug!("Syntax highlighting disabled: {e}"))
        .ok()
    } else {
      None
    };

    Self {
      options,
      syntax_manager,
      registry: WidgetRegistry::default(),
    }
  }

  /// Use a different widget registry for component checks.
  #[must_use]
  pub fn with_registry(mut self, registry: WidgetRegistry) -> Self {
    self.registry = registry;
    self
  }

  /// Access transformer options.
  #[must_use]
  pub const fn options(&self) -> &MarkupOptions {
    &self.options
  }

  /// The registry used to resolve embedded components.
  #[must_use]
  pub const fn registry(&self) -> &WidgetRegistry {
    &self.registry
  }

  /// Stylesheet for the configured theme's token classes.
  ///
  /// # Errors
  ///
  /// Returns an error if highlighting is disabled or the theme is unknown.
  pub fn theme_css(&self) -> Result<String, MarkupError> {
    let manager = self.syntax_manager.as_ref().ok_or_else(|| {
      MarkupError::Transform("syntax highlighting is disabled".to_string())
    })?;
    Ok(manager.theme_css(&self.options.theme)?)
  }

  /// Run the full pipeline on one body.
  ///
  /// # Errors
  ///
  /// Returns [`MarkupError::Transform`] if the element tree cannot be
  /// serialized.
  pub fn render(&self, body: &str) -> Result<RenderedMarkup, MarkupError> {
    // Parse: lift components out, then parse the markdown around them
    let scanned = components::scan(body);
    let delimiters = scanned.delimiters();
    let mut diagnostics = scanned.diagnostics;
    for component in &scanned.components {
      diagnostics.extend(
        self
          .registry
          .check(component)
          .into_iter()
          .map(|message| Diagnostic::new(message, component.line, component.column)),
      );
    }

    let arena = Arena::new();
    let options = self.comrak_options();
    let root = parse_document(&arena, &scanned.text, &options);

    // Restructure: markdown tree to generic element tree
    let mut html = String::new();
    comrak::format_html(root, &options, &mut html).unwrap_or_default();
    // An explicit <body> keeps raw <style>/<script> out of <head>
    let document = kuchikikiki::parse_html().one(format!("<body>{html}</body>"));
    restore_code_placeholders(&document, &scanned.components, delimiters);

    // Enrich
    self.enrich_code_blocks(&document);
    let (headers, title) = self.enrich_headings(&document, delimiters);
    self.enrich_links(&document);
    self.enrich_images(&document);
    restore_attribute_placeholders(&document, &scanned.components, delimiters);

    // Serialize
    let html = serialize_body(&document)?;
    let replacements = self.component_replacements(&scanned.components);
    let html =
      restore_components(&html, &scanned.components, &replacements, delimiters);

    trace!(
      "Transformed body: {} bytes in, {} bytes out, {} components",
      body.len(),
      html.len(),
      scanned.components.len()
    );

    Ok(RenderedMarkup {
      html,
      headers,
      title,
      components: scanned.components,
      diagnostics,
    })
  }

  /// What each component's placeholder turns back into.
  ///
  /// Widgets come back as markup for the renderer to instantiate; unknown
  /// tags come back as escaped, inert text.
  fn component_replacements(
    &self,
    components: &[EmbeddedComponent],
  ) -> Vec<String> {
    components
      .iter()
      .map(|component| self.component_replacement(component))
      .collect()
  }

  fn component_replacement(&self, component: &EmbeddedComponent) -> String {
    match self.registry.resolve(component) {
      widget @ Widget::Unknown { .. } => {
        let text = widget.inert_html().unwrap_or_default();
        match component.placement {
          Placement::Block => format!("<p>{text}</p>"),
          Placement::Inline => text,
        }
      },
      Widget::Known(_) if self.options.allow_raw_html => component.source.clone(),
      Widget::Known(_) => self.sanitized_widget(component),
    }
  }

  /// Rebuild a widget tag from its parsed parts.
  ///
  /// Attribute values are escaped and event handler attributes are dropped.
  /// Raw HTML in the children is escaped, while nested components are
  /// resolved like top-level ones.
  fn sanitized_widget(&self, component: &EmbeddedComponent) -> String {
    let mut out = format!("<{}", component.name);
    for (name, value) in &component.attributes {
      if is_event_handler(name) {
        debug!("Dropping `{name}` from <{}>", component.name);
        continue;
      }
      match value {
        AttrValue::Text(text) => {
          out.push_str(&format!(
            " {name}=\"{}\"",
            html_escape::encode_double_quoted_attribute(text)
          ));
        },
        AttrValue::Expression(expr) if name == "..." => {
          out.push_str(&format!(" {{{}}}", html_escape::encode_text(expr)));
        },
        AttrValue::Expression(expr) => {
          out.push_str(&format!(" {name}={{{}}}", html_escape::encode_text(expr)));
        },
        AttrValue::Flag => {
          out.push(' ');
          out.push_str(name);
        },
      }
    }

    match &component.children {
      None => out.push_str(" />"),
      Some(children) => {
        let scanned = components::scan(children);
        let text = scanned.text.replace('<', "&lt;");
        let inner = scanned.delimiters().replace(&text, |index| {
          scanned
            .components
            .get(index)
            .map_or_else(String::new, |nested| self.component_replacement(nested))
        });
        out.push('>');
        out.push_str(&inner);
        out.push_str(&format!("</{}>", component.name));
      },
    }
    out
  }

  /// Build comrak options from `MarkupOptions`.
  pub(crate) fn comrak_options(&self) -> Options<'_> {
    let mut options = Options::default();
    if self.options.gfm {
      options.extension.table = true;
      options.extension.footnotes = true;
      options.extension.strikethrough = true;
      options.extension.tasklist = true;
      options.extension.autolink = true;
    }
    options.render.r#unsafe = self.options.allow_raw_html;
    // Heading ids are assigned during enrichment
    options.extension.header_ids = None;
    options
  }
}

impl Transform for MarkupTransformer {
  fn transform(&self, body: &str) -> Result<RenderedMarkup, MarkupError> {
    process_safe(body, |body| self.render(body))
  }
}

/// Serialize the children of `<body>`, leaving out the document wrapper.
fn serialize_body(document: &NodeRef) -> Result<String, MarkupError> {
  let body = document
    .select_first("body")
    .map_err(|()| MarkupError::Transform("document has no body".to_string()))?;

  let mut out = Vec::new();
  for child in body.as_node().children() {
    child
      .serialize(&mut out)
      .map_err(|e| MarkupError::Transform(e.to_string()))?;
  }

  String::from_utf8(out).map_err(|e| MarkupError::Transform(e.to_string()))
}

/// Replace placeholders that ended up inside attribute values (link titles,
/// image alt text) with the component's source text. The serializer escapes
/// it like any other attribute value.
fn restore_attribute_placeholders(
  document: &NodeRef,
  components: &[EmbeddedComponent],
  delimiters: Delimiters,
) {
  if components.is_empty() {
    return;
  }

  for node in document.inclusive_descendants() {
    let Some(element) = node.as_element() else {
      continue;
    };
    let mut attributes = element.attributes.borrow_mut();
    for attribute in attributes.map.values_mut() {
      if attribute.value.contains(delimiters.start) {
        attribute.value = delimiters.replace(&attribute.value, |index| {
          components
            .get(index)
            .map_or_else(String::new, |c| c.source.clone())
        });
      }
    }
  }
}

/// Turn placeholders inside `pre` and `code` back into the component's
/// source text, so code keeps exactly what was written.
fn restore_code_placeholders(
  document: &NodeRef,
  components: &[EmbeddedComponent],
  delimiters: Delimiters,
) {
  if components.is_empty() {
    return;
  }

  for node in document.inclusive_descendants() {
    let Some(text) = node.as_text() else {
      continue;
    };
    if !text.borrow().contains(delimiters.start) {
      continue;
    }

    let in_code = node.ancestors().any(|ancestor| {
      ancestor.as_element().is_some_and(|element| {
        element.name.local == local_name!("code")
          || element.name.local == local_name!("pre")
      })
    });
    if in_code {
      let restored = delimiters.replace(&text.borrow(), |index| {
        components
          .get(index)
          .map_or_else(String::new, |c| c.source.clone())
      });
      *text.borrow_mut() = restored;
    }
  }
}

/// Swap every placeholder in serialized markup for its replacement.
///
/// A block component's placeholder sits alone in a paragraph; the paragraph
/// is dropped along with it.
fn restore_components(
  html: &str,
  components: &[EmbeddedComponent],
  replacements: &[String],
  delimiters: Delimiters,
) -> String {
  let mut out = String::with_capacity(html.len());
  let mut rest = html;
  let start_len = delimiters.start.len_utf8();

  while let Some(start) = rest.find(delimiters.start) {
    let Some((index, after)) = delimiters.parse(&rest[start..]) else {
      out.push_str(&rest[..start + start_len]);
      rest = &rest[start + start_len..];
      continue;
    };

    let Some(replacement) = replacements.get(index) else {
      out.push_str(&rest[..start]);
      rest = after;
      continue;
    };

    let before = &rest[..start];
    let is_block = components
      .get(index)
      .is_some_and(|c| c.placement == Placement::Block);

    let (before, after) = match (
      is_block,
      before.strip_suffix("<p>"),
      after.strip_prefix("</p>"),
    ) {
      (true, Some(before), Some(after)) => (before, after),
      _ => (before, after),
    };
    out.push_str(before);
    out.push_str(replacement);
    rest = after;
  }

  out.push_str(rest);
  out
}

/// `onclick`, `onMouseOver` and the like.
fn is_event_handler(name: &str) -> bool {
  name.len() > 2
    && name
      .get(..2)
      .is_some_and(|prefix| prefix.eq_ignore_ascii_case("on"))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_placeholder() {
    let delimiters = Delimiters::default();
    let text = format!("{}rest", delimiters.placeholder(12));
    assert_eq!(delimiters.parse(&text), Some((12, "rest")));
    assert_eq!(delimiters.parse("plain"), None);
    assert_eq!(delimiters.parse("\u{E000}x\u{E001}"), None);
  }

  #[test]
  fn test_replace_placeholders() {
    let delimiters = Delimiters::default();
    let text = format!(
      "a {} b {}",
      delimiters.placeholder(0),
      delimiters.placeholder(1)
    );
    let replaced = delimiters.replace(&text, |i| format!("<{i}>"));
    assert_eq!(replaced, "a <0> b <1>");

    let replaced = delimiters.replace(&text, |_| String::new());
    assert_eq!(replaced, "a  b ");
  }

  #[test]
  fn test_event_handlers() {
    assert!(is_event_handler("onclick"));
    assert!(is_event_handler("onMouseOver"));
    assert!(!is_event_handler("on"));
    assert!(!is_event_handler("emoji"));
  }

  #[test]
  fn test_comrak_options_sanitize_by_default() {
    let transformer = MarkupTransformer::new(MarkupOptions::default());
    let options = transformer.comrak_options();
    assert!(!options.render.r#unsafe);
    assert!(options.extension.table);
    assert!(options.extension.header_ids.is_none());
  }
}
