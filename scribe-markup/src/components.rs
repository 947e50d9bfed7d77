//! Embedded component recognition.
//!
//! Document bodies may embed JSX-style components such as
//! `<Callout emoji="💡">text</Callout>` or `<YouTube videoId="abc" />`. A
//! component starts with `<` followed by an uppercase letter; lowercase tags
//! are plain HTML and are left for the markdown parser to deal with.
//!
//! [`scan`] lifts every component out of the body and leaves a placeholder
//! behind, so the markdown parser never sees (and never rewrites) component
//! syntax. Components inside fenced code blocks, inline code spans and HTML
//! comments are not recognised. A component that cannot be parsed is turned
//! into literal text and reported as a [`Diagnostic`].

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{
  types::Diagnostic,
  utils::codeblock::{FenceTracker, code_span_end},
};

/// The pair of private-use characters that bracket placeholders in one body.
///
/// Markdown and HTML parsing both leave private-use code points alone. The
/// pair is picked so that neither character occurs in the body, so text that
/// already holds private-use characters never reads as a placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Delimiters {
  pub(crate) start: char,
  pub(crate) end:   char,
}

impl Default for Delimiters {
  fn default() -> Self {
    Self {
      start: '\u{E000}',
      end:   '\u{E001}',
    }
  }
}

impl Delimiters {
  /// Delimiters absent from `body`.
  pub(crate) fn for_body(body: &str) -> Self {
    let used: HashSet<char> = body.chars().filter(|&c| is_private_use(c)).collect();
    if used.is_empty() {
      return Self::default();
    }

    let mut free = ('\u{E000}'..='\u{F8FF}')
      .chain('\u{F0000}'..='\u{FFFFD}')
      .filter(|c| !used.contains(c));
    match (free.next(), free.next()) {
      (Some(start), Some(end)) => Self { start, end },
      _ => Self::default(),
    }
  }

  /// Placeholder standing in for the component with the given index.
  pub(crate) fn placeholder(self, index: usize) -> String {
    format!("{}{index}{}", self.start, self.end)
  }

  /// Parse a placeholder at the start of `text`, returning its index and the
  /// text after it.
  pub(crate) fn parse(self, text: &str) -> Option<(usize, &str)> {
    let inner = text.strip_prefix(self.start)?;
    let end = inner.find(self.end)?;
    let index = inner[..end].parse().ok()?;
    Some((index, &inner[end + self.end.len_utf8()..]))
  }

  /// Replace every placeholder in `text` using `lookup`.
  pub(crate) fn replace<F>(self, text: &str, lookup: F) -> String
  where
    F: Fn(usize) -> String,
  {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find(self.start) {
      out.push_str(&rest[..start]);
      match self.parse(&rest[start..]) {
        Some((index, after)) => {
          out.push_str(&lookup(index));
          rest = after;
        },
        None => {
          rest = &rest[start + self.start.len_utf8()..];
        },
      }
    }

    out.push_str(rest);
    out
  }
}

const fn is_private_use(c: char) -> bool {
  matches!(c, '\u{E000}'..='\u{F8FF}' | '\u{F0000}'..='\u{FFFFD}')
}

/// Value of a component attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum AttrValue {
  /// `name="text"` or `name='text'`.
  Text(String),
  /// `name={expression}`, holding the raw source between the braces.
  Expression(String),
  /// A bare `name`, which JSX reads as `true`.
  Flag,
}

impl AttrValue {
  /// The value as text, if it was written as a string literal.
  #[must_use]
  pub fn as_text(&self) -> Option<&str> {
    match self {
      Self::Text(text) => Some(text),
      _ => None,
    }
  }
}

/// Whether a component stands on its own lines or sits inside running text.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
  Block,
  Inline,
}

/// An embedded component as written in a document body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EmbeddedComponent {
  /// Tag name, exactly as written.
  pub name:       String,
  /// Attributes by name. A repeated attribute keeps its last value.
  pub attributes: BTreeMap<String, AttrValue>,
  /// Raw text between the opening and closing tags; `None` when the
  /// component is self-closing.
  pub children:   Option<String>,
  /// The component's full source text.
  pub source:     String,
  pub placement:  Placement,
  /// 1-based line of the opening `<`.
  pub line:       usize,
  /// 1-based column of the opening `<`.
  pub column:     usize,
}

impl EmbeddedComponent {
  #[must_use]
  pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
    self.attributes.get(name)
  }

  #[must_use]
  pub const fn is_self_closing(&self) -> bool {
    self.children.is_none()
  }
}

/// A body with its components lifted out.
#[derive(Debug, Clone, Default)]
pub struct ScannedBody {
  /// The body with every component replaced by its placeholder.
  pub text:        String,
  /// Components in source order; the index is the placeholder number.
  pub components:  Vec<EmbeddedComponent>,
  pub diagnostics: Vec<Diagnostic>,
  delimiters:      Delimiters,
}

impl ScannedBody {
  /// The placeholder standing in for component `index` in `text`.
  #[must_use]
  pub fn placeholder(&self, index: usize) -> String {
    self.delimiters.placeholder(index)
  }

  pub(crate) const fn delimiters(&self) -> Delimiters {
    self.delimiters
  }
}

/// Lift embedded components out of `body`.
#[must_use]
pub fn scan(body: &str) -> ScannedBody {
  let mut scanner = Scanner::new(body);
  scanner.run();
  ScannedBody {
    text:        scanner.out,
    components:  scanner.components,
    diagnostics: scanner.diagnostics,
    delimiters:  scanner.delimiters,
  }
}

/// Maps byte offsets to 1-based line and column numbers.
struct LineIndex {
  starts: Vec<usize>,
}

impl LineIndex {
  fn new(text: &str) -> Self {
    let starts = std::iter::once(0)
      .chain(text.match_indices('\n').map(|(i, _)| i + 1))
      .collect();
    Self { starts }
  }

  fn locate(&self, text: &str, offset: usize) -> (usize, usize) {
    let line = self.starts.partition_point(|&start| start <= offset);
    let line_start = self.starts[line.saturating_sub(1)];
    let column = text[line_start..offset].chars().count() + 1;
    (line, column)
  }
}

struct OpenTag {
  name:         String,
  attributes:   BTreeMap<String, AttrValue>,
  end:          usize,
  self_closing: bool,
}

struct Scanner<'a> {
  body:        &'a str,
  lines:       LineIndex,
  delimiters:  Delimiters,
  out:         String,
  components:  Vec<EmbeddedComponent>,
  diagnostics: Vec<Diagnostic>,
}

impl<'a> Scanner<'a> {
  fn new(body: &'a str) -> Self {
    Self {
      body,
      lines: LineIndex::new(body),
      delimiters: Delimiters::for_body(body),
      out: String::with_capacity(body.len()),
      components: Vec::new(),
      diagnostics: Vec::new(),
    }
  }

  fn run(&mut self) {
    let bytes = self.body.as_bytes();
    let mut fence = FenceTracker::new();
    let mut pos = 0;

    while pos < bytes.len() {
      let line_end = self.line_end(pos);
      let at_line_start = pos == 0 || bytes[pos - 1] == b'\n';

      if at_line_start {
        let line = self.body[pos..line_end].trim_end_matches(['\n', '\r']);
        let (next, in_code) = fence.classify_line(line);
        fence = next;
        if in_code {
          self.out.push_str(&self.body[pos..line_end]);
          pos = line_end;
          continue;
        }
      }

      pos = self.scan_segment(pos, line_end);
    }
  }

  /// Offset just past the newline ending the line that contains `pos`.
  fn line_end(&self, pos: usize) -> usize {
    self.body[pos..]
      .find('\n')
      .map_or(self.body.len(), |i| pos + i + 1)
  }

  /// Scan from `pos` to `line_end`. May return an offset past `line_end`
  /// when a component or code span continues onto later lines.
  fn scan_segment(&mut self, pos: usize, line_end: usize) -> usize {
    let body = self.body;
    let mut i = pos;

    while i < line_end {
      let Some(rel) = body[i..line_end].find(['<', '`', '\\']) else {
        self.out.push_str(&body[i..line_end]);
        return line_end;
      };
      let at = i + rel;
      self.out.push_str(&body[i..at]);

      match body.as_bytes()[at] {
        b'`' => {
          if let Some(end) = code_span_end(body, at) {
            self.out.push_str(&body[at..end]);
            i = end;
            if i > line_end {
              return i;
            }
          } else {
            let run = body[at..].bytes().take_while(|&b| b == b'`').count();
            self.out.push_str(&body[at..at + run]);
            i = at + run;
          }
        },
        b'\\' => {
          // An escaped `<` never opens a component, an escaped `\` is inert
          let len = if body[at + 1..].starts_with(['<', '\\']) {
            2
          } else {
            1
          };
          self.out.push_str(&body[at..at + len]);
          i = at + len;
        },
        _ => {
          i = self.scan_angle(at);
          if i > line_end {
            return i;
          }
        },
      }
    }

    i
  }

  /// Handle a `<` at `start`, returning the offset to continue from.
  fn scan_angle(&mut self, start: usize) -> usize {
    let body = self.body;
    let rest = &body[start + 1..];

    if rest.starts_with("!--") {
      let end = body[start..]
        .find("-->")
        .map_or(body.len(), |i| start + i + 3);
      self.out.push_str(&body[start..end]);
      return end;
    }

    if let Some(after) = rest.strip_prefix('/')
      && after.starts_with(|c: char| c.is_ascii_uppercase())
    {
      let name = tag_name(after);
      self.reject(start, format!("closing tag </{name}> has no opening tag"));
      return start + 1;
    }

    if !rest.starts_with(|c: char| c.is_ascii_uppercase()) {
      self.out.push('<');
      return start + 1;
    }

    let tag = match self.parse_open_tag(start) {
      Ok(tag) => tag,
      Err(reason) => {
        let name = tag_name(rest);
        self.reject(start, format!("malformed <{name}>: {reason}"));
        return start + 1;
      },
    };

    let (end, children) = if tag.self_closing {
      (tag.end, None)
    } else {
      match self.find_closing(&tag.name, tag.end) {
        Some((children_end, end)) => {
          (end, Some(body[tag.end..children_end].to_string()))
        },
        None => {
          self.reject(start, format!("<{}> is never closed", tag.name));
          return start + 1;
        },
      }
    };

    self.emit(start, end, tag, children)
  }

  /// Record a component spanning `start..end` and write its placeholder.
  fn emit(
    &mut self,
    start: usize,
    end: usize,
    tag: OpenTag,
    children: Option<String>,
  ) -> usize {
    let body = self.body;
    let line_start = body[..start].rfind('\n').map_or(0, |i| i + 1);
    let lead = &body[line_start..start];
    let after_end = self.line_end(end);
    let trail = &body[end..after_end];

    let is_block = lead.len() <= 3
      && lead.bytes().all(|b| b == b' ')
      && trail.trim().is_empty();

    let index = self.components.len();
    let (line, column) = self.lines.locate(body, start);
    self.components.push(EmbeddedComponent {
      name: tag.name,
      attributes: tag.attributes,
      children,
      source: body[start..end].to_string(),
      placement: if is_block {
        Placement::Block
      } else {
        Placement::Inline
      },
      line,
      column,
    });

    if !is_block {
      self.out.push_str(&self.delimiters.placeholder(index));
      return end;
    }

    // Give the placeholder a paragraph of its own
    let kept = self.out.trim_end_matches(' ').len();
    self.out.truncate(kept);
    if !self.out.is_empty() && !self.out.ends_with("\n\n") {
      self.out.push('\n');
      if !self.out.ends_with("\n\n") {
        self.out.push('\n');
      }
    }
    self.out.push_str(&self.delimiters.placeholder(index));
    self.out.push_str("\n\n");
    after_end
  }

  /// Emit the `<` at `start` as literal text and record why.
  fn reject(&mut self, start: usize, message: String) {
    let (line, column) = self.lines.locate(self.body, start);
    self.diagnostics.push(Diagnostic::new(message, line, column));
    self.out.push_str("&lt;");
  }

  fn parse_open_tag(&self, start: usize) -> Result<OpenTag, String> {
    let body = self.body;
    let bytes = body.as_bytes();
    let name = tag_name(&body[start + 1..]).to_string();
    let mut attributes = BTreeMap::new();
    let mut i = start + 1 + name.len();

    loop {
      i = skip_whitespace(body, i);
      let Some(&b) = bytes.get(i) else {
        return Err("input ends inside the tag".to_string());
      };

      match b {
        b'>' => {
          return Ok(OpenTag {
            name,
            attributes,
            end: i + 1,
            self_closing: false,
          });
        },
        b'/' => {
          if bytes.get(i + 1) != Some(&b'>') {
            return Err("expected `>` after `/`".to_string());
          }
          return Ok(OpenTag {
            name,
            attributes,
            end: i + 2,
            self_closing: true,
          });
        },
        b'{' => {
          let end = brace_end(body, i)?;
          attributes.insert(
            "...".to_string(),
            AttrValue::Expression(body[i + 1..end - 1].trim().to_string()),
          );
          i = end;
        },
        b if b.is_ascii_alphabetic() || b == b'_' => {
          let attr_len = body[i..]
            .find(|c: char| {
              !(c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | ':' | '.'))
            })
            .unwrap_or(body.len() - i);
          let attr_name = body[i..i + attr_len].to_string();
          i = skip_whitespace(body, i + attr_len);

          if bytes.get(i) != Some(&b'=') {
            attributes.insert(attr_name, AttrValue::Flag);
            continue;
          }
          i = skip_whitespace(body, i + 1);

          let (value, end) = match bytes.get(i) {
            Some(&quote @ (b'"' | b'\'')) => {
              let close = body[i + 1..]
                .find(char::from(quote))
                .ok_or_else(|| format!("unterminated value for `{attr_name}`"))?;
              let end = i + 1 + close;
              (AttrValue::Text(body[i + 1..end].to_string()), end + 1)
            },
            Some(b'{') => {
              let end = brace_end(body, i)?;
              (
                AttrValue::Expression(body[i + 1..end - 1].trim().to_string()),
                end,
              )
            },
            _ => {
              return Err(format!(
                "value of `{attr_name}` must be quoted or wrapped in braces"
              ));
            },
          };
          attributes.insert(attr_name, value);
          i = end;
        },
        _ => {
          let c = body[i..].chars().next().unwrap_or_default();
          return Err(format!("unexpected `{c}` in tag"));
        },
      }
    }
  }

  /// Find the `</name>` matching an opening tag that ended at `from`.
  ///
  /// Returns the offsets where the closing tag starts and ends.
  fn find_closing(&self, name: &str, from: usize) -> Option<(usize, usize)> {
    let body = self.body;
    let mut depth = 1usize;
    let mut i = from;

    while let Some(rel) = body[i..].find('<') {
      let at = i + rel;
      let rest = &body[at + 1..];

      if let Some(after) = rest.strip_prefix('/')
        && tag_name(after) == name
      {
        let tail = &after[name.len()..];
        let ws = tail.len() - tail.trim_start().len();
        if tail[ws..].starts_with('>') {
          let end = at + 2 + name.len() + ws + 1;
          depth -= 1;
          if depth == 0 {
            return Some((at, end));
          }
          i = end;
          continue;
        }
      } else if tag_name(rest) == name
        && let Ok(nested) = self.parse_open_tag(at)
      {
        if !nested.self_closing {
          depth += 1;
        }
        i = nested.end;
        continue;
      }

      i = at + 1;
    }

    None
  }
}

/// The component name at the start of `text`, e.g. `Callout` or `Foo.Bar`.
fn tag_name(text: &str) -> &str {
  let len = text
    .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '.'))
    .unwrap_or(text.len());
  &text[..len]
}

fn skip_whitespace(text: &str, from: usize) -> usize {
  from + (text[from..].len() - text[from..].trim_start().len())
}

/// Offset just past the `}` balancing the `{` at `open`.
///
/// String and template literals inside the expression are skipped, so braces
/// in `{"}"}` do not count.
fn brace_end(text: &str, open: usize) -> Result<usize, String> {
  let bytes = text.as_bytes();
  let mut depth = 0usize;
  let mut quote: Option<u8> = None;
  let mut i = open;

  while i < bytes.len() {
    let b = bytes[i];
    if let Some(q) = quote {
      if b == b'\\' {
        i += 1;
      } else if b == q {
        quote = None;
      }
    } else {
      match b {
        b'"' | b'\'' | b'`' => quote = Some(b),
        b'{' => depth += 1,
        b'}' => {
          depth -= 1;
          if depth == 0 {
            return Ok(i + 1);
          }
        },
        _ => {},
      }
    }
    i += 1;
  }

  Err("unbalanced `{` in attribute".to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_plain_markdown_untouched() {
    let body = "# Title\n\nSome *text* with <em>html</em>.\n";
    let scanned = scan(body);
    assert_eq!(scanned.text, body);
    assert!(scanned.components.is_empty());
    assert!(scanned.diagnostics.is_empty());
  }

  #[test]
  fn test_self_closing_inline_component() {
    let scanned = scan("Watch <YouTube videoId=\"abc123\" /> now.");
    assert_eq!(scanned.components.len(), 1);

    let component = &scanned.components[0];
    assert_eq!(component.name, "YouTube");
    assert_eq!(component.placement, Placement::Inline);
    assert!(component.is_self_closing());
    assert_eq!(
      component.attribute("videoId").and_then(AttrValue::as_text),
      Some("abc123")
    );
    assert_eq!(component.source, "<YouTube videoId=\"abc123\" />");
    assert_eq!(
      scanned.text,
      format!("Watch {} now.", scanned.placeholder(0))
    );
  }

  #[test]
  fn test_block_component_with_children() {
    let body = "Intro\n<Callout emoji=\"💡\">\nSome **bold** text\n</Callout>\nOutro\n";
    let scanned = scan(body);
    assert_eq!(scanned.components.len(), 1);

    let component = &scanned.components[0];
    assert_eq!(component.placement, Placement::Block);
    assert_eq!(
      component.children.as_deref(),
      Some("\nSome **bold** text\n")
    );
    assert_eq!((component.line, component.column), (2, 1));
    assert_eq!(
      scanned.text,
      format!("Intro\n\n{}\n\nOutro\n", scanned.placeholder(0))
    );
  }

  #[test]
  fn test_attribute_forms() {
    let scanned = scan(
      "<Checklist items={[\"a\", \"}\"]} readOnly title='Tasks' {...rest} />",
    );
    let attrs = &scanned.components[0].attributes;
    assert_eq!(
      attrs.get("items"),
      Some(&AttrValue::Expression("[\"a\", \"}\"]".to_string()))
    );
    assert_eq!(attrs.get("readOnly"), Some(&AttrValue::Flag));
    assert_eq!(attrs.get("title"), Some(&AttrValue::Text("Tasks".into())));
    assert_eq!(
      attrs.get("..."),
      Some(&AttrValue::Expression("...rest".to_string()))
    );
  }

  #[test]
  fn test_multiline_opening_tag() {
    let body = "<ProsCard\n  title=\"Pros\"\n  pros={[\"fast\"]}\n/>\n";
    let scanned = scan(body);
    assert!(scanned.diagnostics.is_empty());
    assert_eq!(scanned.components.len(), 1);
    assert_eq!(scanned.components[0].placement, Placement::Block);
  }

  #[test]
  fn test_nested_same_name() {
    let body = "<Tabs><Tabs>inner</Tabs></Tabs> tail";
    let scanned = scan(body);
    assert_eq!(scanned.components.len(), 1);
    assert_eq!(
      scanned.components[0].children.as_deref(),
      Some("<Tabs>inner</Tabs>")
    );
  }

  #[test]
  fn test_similar_names_not_confused() {
    let scanned = scan("<Tabs><Tab label=\"a\">A</Tab></Tabs>");
    assert_eq!(scanned.components.len(), 1);
    assert_eq!(scanned.components[0].name, "Tabs");
  }

  #[test]
  fn test_components_in_code_ignored() {
    let body = "```jsx\n<Callout emoji=\"x\" />\n```\n\nInline `<Todo />` too.\n";
    let scanned = scan(body);
    assert!(scanned.components.is_empty());
    assert_eq!(scanned.text, body);
  }

  #[test]
  fn test_comment_and_escape_ignored() {
    let body = "<!-- <Quote /> --> and \\<Quote />";
    let scanned = scan(body);
    assert!(scanned.components.is_empty());
    assert_eq!(scanned.text, body);
  }

  #[test]
  fn test_unclosed_component_becomes_text() {
    let body = "Line one\n  <Callout emoji=\"x\">\nnever closed\n";
    let scanned = scan(body);
    assert!(scanned.components.is_empty());
    assert_eq!(scanned.diagnostics.len(), 1);
    assert_eq!(scanned.diagnostics[0].line, 2);
    assert_eq!(scanned.diagnostics[0].column, 3);
    assert!(scanned.diagnostics[0].message.contains("<Callout>"));
    assert!(scanned.text.contains("&lt;Callout emoji=\"x\">"));
  }

  #[test]
  fn test_unbalanced_braces_reported() {
    let scanned = scan("<Table data={{ headers: [] } />\n\nafter <Todo text=\"ok\" />");
    assert_eq!(scanned.diagnostics.len(), 1);
    assert!(scanned.diagnostics[0].message.contains("unbalanced"));
    // Scanning carries on after the broken tag
    assert_eq!(scanned.components.len(), 1);
    assert_eq!(scanned.components[0].name, "Todo");
  }

  #[test]
  fn test_stray_closing_tag() {
    let scanned = scan("text </Reminder> more");
    assert_eq!(scanned.diagnostics.len(), 1);
    assert_eq!(scanned.text, "text &lt;/Reminder> more");
  }

  #[test]
  fn test_unquoted_value_rejected() {
    let scanned = scan("<Embed url=https://example.com />");
    assert!(scanned.components.is_empty());
    assert!(scanned.diagnostics[0].message.contains("`url`"));
  }

  #[test]
  fn test_escaped_backslash_before_component() {
    let scanned = scan("\\\\<Quote text=\"a\" author=\"b\" />");
    assert_eq!(scanned.components.len(), 1);
    assert_eq!(scanned.components[0].name, "Quote");
    assert!(scanned.text.starts_with("\\\\"));
  }

  #[test]
  fn test_private_use_text_is_not_a_placeholder() {
    let body = "a \u{E000}0\u{E001} b <Todo text=\"t\" />";
    let scanned = scan(body);
    assert_eq!(scanned.components.len(), 1);

    let placeholder = scanned.placeholder(0);
    assert!(!placeholder.contains('\u{E000}'));
    assert!(!placeholder.contains('\u{E001}'));
    assert_eq!(scanned.text.matches(&placeholder).count(), 1);
    assert!(scanned.text.starts_with("a \u{E000}0\u{E001} b "));
  }

  #[test]
  fn test_fence_inside_list_item_with_blank_line() {
    let body = "- item\n\n    ```jsx\n    const a = 1;\n\n    <Callout emoji=\"x\" />\n    ```\n";
    let scanned = scan(body);
    assert!(scanned.components.is_empty());
    assert_eq!(scanned.text, body);
  }

  #[test]
  fn test_fence_inside_blockquote_with_blank_line() {
    let body = "> ```jsx\n> const a = 1;\n>\n> <Callout emoji=\"x\" />\n> ```\n";
    let scanned = scan(body);
    assert!(scanned.components.is_empty());
    assert_eq!(scanned.text, body);
  }

  #[test]
  fn test_component_after_list_fence_closes() {
    let body = "- item\n\n  ```\n  code\n  ```\n\n<Todo text=\"t\" />\n";
    let scanned = scan(body);
    assert_eq!(scanned.components.len(), 1);
  }
}
