//! Widget registry for embedded components.
//!
//! The rendering layer turns embedded components into widgets. The set of
//! widgets is closed: every tag the renderer understands is a [`WidgetKind`]
//! with a declared attribute set, and anything else resolves to
//! [`Widget::Unknown`], which renders as inert text. Resolution is a plain
//! lookup by tag name, so the transformer and the renderer always agree on
//! which tags are widgets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
  components::{AttrValue, EmbeddedComponent},
  utils::escape_html,
};

/// An attribute a widget declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeSpec {
  pub name:     &'static str,
  pub required: bool,
}

const fn required(name: &'static str) -> AttributeSpec {
  AttributeSpec {
    name,
    required: true,
  }
}

const fn optional(name: &'static str) -> AttributeSpec {
  AttributeSpec {
    name,
    required: false,
  }
}

const IMAGE_ATTRS: &[AttributeSpec] = &[
  required("src"),
  optional("alt"),
  optional("width"),
  optional("height"),
];
const CALLOUT_ATTRS: &[AttributeSpec] = &[required("emoji")];
const PROS_ATTRS: &[AttributeSpec] = &[required("title"), required("pros")];
const CONS_ATTRS: &[AttributeSpec] = &[required("title"), required("cons")];
const TABLE_ATTRS: &[AttributeSpec] = &[required("data")];
const LIVE_CODE_ATTRS: &[AttributeSpec] =
  &[optional("template"), optional("files")];
const STATIC_TWEET_ATTRS: &[AttributeSpec] = &[required("id")];
const YOUTUBE_ATTRS: &[AttributeSpec] = &[required("videoId")];
const CHECKLIST_ATTRS: &[AttributeSpec] =
  &[required("items"), optional("readOnly")];
const TODO_ATTRS: &[AttributeSpec] = &[required("text"), optional("completed")];
const LIST_ATTRS: &[AttributeSpec] = &[required("items")];
const CODE_SANDBOX_ATTRS: &[AttributeSpec] = &[required("sandboxId")];
const TWEET_ATTRS: &[AttributeSpec] = &[required("tweetId")];
const QUOTE_ATTRS: &[AttributeSpec] = &[required("text"), required("author")];
const EMBED_ATTRS: &[AttributeSpec] = &[required("url"), required("title")];
const EXCALIDRAW_ATTRS: &[AttributeSpec] = &[required("url")];
const TABS_ATTRS: &[AttributeSpec] = &[optional("defaultTab")];
const TAB_ATTRS: &[AttributeSpec] = &[required("label")];

/// Every widget the renderer knows how to build.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum WidgetKind {
  Image,
  Callout,
  ProsCard,
  ConsCard,
  Table,
  LiveCode,
  StaticTweet,
  YouTube,
  Checklist,
  Todo,
  NumberedList,
  BulletedList,
  CodeSandbox,
  Tweet,
  Quote,
  Embed,
  Excalidraw,
  Reminder,
  Tabs,
  Tab,
}

impl WidgetKind {
  pub const ALL: [Self; 20] = [
    Self::Image,
    Self::Callout,
    Self::ProsCard,
    Self::ConsCard,
    Self::Table,
    Self::LiveCode,
    Self::StaticTweet,
    Self::YouTube,
    Self::Checklist,
    Self::Todo,
    Self::NumberedList,
    Self::BulletedList,
    Self::CodeSandbox,
    Self::Tweet,
    Self::Quote,
    Self::Embed,
    Self::Excalidraw,
    Self::Reminder,
    Self::Tabs,
    Self::Tab,
  ];

  /// The tag name that selects this widget.
  #[must_use]
  pub const fn tag(self) -> &'static str {
    match self {
      Self::Image => "Image",
      Self::Callout => "Callout",
      Self::ProsCard => "ProsCard",
      Self::ConsCard => "ConsCard",
      Self::Table => "Table",
      Self::LiveCode => "LiveCode",
      Self::StaticTweet => "StaticTweet",
      Self::YouTube => "YouTube",
      Self::Checklist => "Checklist",
      Self::Todo => "Todo",
      Self::NumberedList => "NumberedList",
      Self::BulletedList => "BulletedList",
      Self::CodeSandbox => "CodeSandbox",
      Self::Tweet => "Tweet",
      Self::Quote => "Quote",
      Self::Embed => "Embed",
      Self::Excalidraw => "Excalidraw",
      Self::Reminder => "Reminder",
      Self::Tabs => "Tabs",
      Self::Tab => "Tab",
    }
  }

  /// Look up a widget by tag name. Tag names are case-sensitive.
  #[must_use]
  pub fn from_tag(tag: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|kind| kind.tag() == tag)
  }

  /// Attributes this widget declares.
  #[must_use]
  pub const fn attributes(self) -> &'static [AttributeSpec] {
    match self {
      Self::Image => IMAGE_ATTRS,
      Self::Callout => CALLOUT_ATTRS,
      Self::ProsCard => PROS_ATTRS,
      Self::ConsCard => CONS_ATTRS,
      Self::Table => TABLE_ATTRS,
      Self::LiveCode => LIVE_CODE_ATTRS,
      Self::StaticTweet => STATIC_TWEET_ATTRS,
      Self::YouTube => YOUTUBE_ATTRS,
      Self::Checklist => CHECKLIST_ATTRS,
      Self::Todo => TODO_ATTRS,
      Self::NumberedList | Self::BulletedList => LIST_ATTRS,
      Self::CodeSandbox => CODE_SANDBOX_ATTRS,
      Self::Tweet => TWEET_ATTRS,
      Self::Quote => QUOTE_ATTRS,
      Self::Embed => EMBED_ATTRS,
      Self::Excalidraw => EXCALIDRAW_ATTRS,
      Self::Reminder => &[],
      Self::Tabs => TABS_ATTRS,
      Self::Tab => TAB_ATTRS,
    }
  }

  /// Whether the widget renders content placed between its tags.
  #[must_use]
  pub const fn accepts_children(self) -> bool {
    matches!(
      self,
      Self::Callout | Self::LiveCode | Self::Reminder | Self::Tabs | Self::Tab
    )
  }
}

/// A recognised component, ready for the renderer to instantiate.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WidgetInstance {
  pub kind:       WidgetKind,
  pub attributes: BTreeMap<String, AttrValue>,
  pub children:   Option<String>,
}

/// Outcome of resolving an embedded component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Widget {
  Known(WidgetInstance),
  /// A tag with no widget. Renders as its own source, escaped.
  Unknown { name: String, source: String },
}

impl Widget {
  /// Markup for a widget that is not instantiated: the original source as
  /// visible text. Known widgets return `None`.
  #[must_use]
  pub fn inert_html(&self) -> Option<String> {
    match self {
      Self::Known(_) => None,
      Self::Unknown { source, .. } => Some(escape_html(source)),
    }
  }
}

/// Fixed mapping from tag names to widgets.
#[derive(Debug, Clone)]
pub struct WidgetRegistry {
  kinds: Vec<WidgetKind>,
}

impl Default for WidgetRegistry {
  fn default() -> Self {
    Self::new(WidgetKind::ALL)
  }
}

impl WidgetRegistry {
  /// Create a registry that recognises only the given widgets.
  pub fn new(kinds: impl IntoIterator<Item = WidgetKind>) -> Self {
    let mut kinds: Vec<_> = kinds.into_iter().collect();
    kinds.sort_unstable();
    kinds.dedup();
    Self { kinds }
  }

  #[must_use]
  pub fn kinds(&self) -> &[WidgetKind] {
    &self.kinds
  }

  #[must_use]
  pub fn lookup(&self, tag: &str) -> Option<WidgetKind> {
    WidgetKind::from_tag(tag).filter(|kind| self.kinds.contains(kind))
  }

  /// Resolve a component to a widget.
  #[must_use]
  pub fn resolve(&self, component: &EmbeddedComponent) -> Widget {
    match self.lookup(&component.name) {
      Some(kind) => Widget::Known(WidgetInstance {
        kind,
        attributes: component.attributes.clone(),
        children: component.children.clone(),
      }),
      None => Widget::Unknown {
        name:   component.name.clone(),
        source: component.source.clone(),
      },
    }
  }

  /// Problems with how a component is written, for diagnostics.
  ///
  /// An empty list means the component resolves to a widget with all of its
  /// required attributes present.
  #[must_use]
  pub fn check(&self, component: &EmbeddedComponent) -> Vec<String> {
    let Some(kind) = self.lookup(&component.name) else {
      return vec![format!("unknown component <{}>", component.name)];
    };

    let spreads = component.attributes.contains_key("...");
    let mut problems: Vec<String> = kind
      .attributes()
      .iter()
      .filter(|spec| spec.required && !spreads)
      .filter(|spec| !component.attributes.contains_key(spec.name))
      .map(|spec| {
        format!(
          "<{}> is missing required attribute `{}`",
          component.name, spec.name
        )
      })
      .collect();

    if !kind.accepts_children()
      && component
        .children
        .as_deref()
        .is_some_and(|children| !children.trim().is_empty())
    {
      problems.push(format!("<{}> ignores its children", component.name));
    }

    problems
  }
}
