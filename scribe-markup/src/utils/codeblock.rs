/// State tracking for code fence detection in a document body.
///
/// Tracks whether we're inside a fenced code block along with the fence
/// character and length, so that a closing fence is only recognised when it
/// uses the same character and is at least as long as the opening one.
///
/// Fences nested in blockquotes and list items are followed too: `>` markers
/// are stripped and list item content is measured from the item's content
/// column. A fence ends early when the container holding it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FenceTracker {
  in_code_block:    bool,
  code_fence_char:  Option<char>,
  code_fence_count: usize,
  fence_quotes:     usize,
  fence_indent:     usize,
  /// Content column of the innermost open list item, 0 outside lists
  list_indent:      usize,
}

impl FenceTracker {
  /// Create a new fence tracker.
  #[must_use]
  pub const fn new() -> Self {
    Self {
      in_code_block:    false,
      code_fence_char:  None,
      code_fence_count: 0,
      fence_quotes:     0,
      fence_indent:     0,
      list_indent:      0,
    }
  }

  /// Check if currently inside a code block.
  #[must_use]
  pub const fn in_code_block(&self) -> bool {
    self.in_code_block
  }

  /// Process a line and return the state that holds after it.
  #[must_use]
  pub fn process_line(&self, line: &str) -> Self {
    self.classify_line(line).0
  }

  /// Process a line, returning the state after it and whether the line
  /// itself is part of a fenced code block (fence lines included).
  #[must_use]
  pub fn classify_line(&self, line: &str) -> (Self, bool) {
    let (quotes, rest) = strip_quote_markers(line);
    if rest.trim().is_empty() {
      return (*self, self.in_code_block);
    }
    let indent = leading_spaces(rest);

    let mut state = *self;
    if state.in_code_block {
      if quotes >= state.fence_quotes && indent >= state.fence_indent {
        return (state.after_code_line(&rest[state.fence_indent..]), true);
      }
      // The container holding the fence ended, taking the fence with it
      state = Self {
        list_indent: state.list_indent,
        ..Self::new()
      };
    }

    let mut content = rest;
    if state.list_indent > 0 && indent >= state.list_indent {
      content = &rest[state.list_indent..];
    } else {
      state.list_indent = 0;
    }

    if let Some(width) = list_marker_width(content) {
      state.list_indent = rest.len() - content.len() + width;
      content = content.get(width..).unwrap_or_default();
    }

    match opening_fence(content) {
      Some((fence_char, fence_count)) => {
        let opened = Self {
          in_code_block: true,
          code_fence_char: Some(fence_char),
          code_fence_count: fence_count,
          fence_quotes: quotes,
          fence_indent: rest.len() - content.len(),
          list_indent: state.list_indent,
        };
        (opened, true)
      },
      None => (state, false),
    }
  }

  /// State after a line inside the code block, with container prefixes
  /// already removed.
  fn after_code_line(self, content: &str) -> Self {
    let indent = leading_spaces(content);
    if indent > 3 {
      return self;
    }
    let trimmed = &content[indent..];

    let fence_count = trimmed
      .chars()
      .take_while(|&c| Some(c) == self.code_fence_char)
      .count();
    if fence_count >= self.code_fence_count
      && fence_count >= 3
      && trimmed[fence_count..].trim().is_empty()
    {
      return Self {
        list_indent: self.list_indent,
        ..Self::new()
      };
    }

    self
  }
}

fn leading_spaces(line: &str) -> usize {
  line.len() - line.trim_start_matches(' ').len()
}

/// Strip blockquote markers, returning how many there were and the rest.
fn strip_quote_markers(line: &str) -> (usize, &str) {
  let mut depth = 0;
  let mut rest = line;
  loop {
    let indent = leading_spaces(rest);
    if indent > 3 {
      return (depth, rest);
    }
    let Some(after) = rest[indent..].strip_prefix('>') else {
      return (depth, rest);
    };
    depth += 1;
    rest = after.strip_prefix(' ').unwrap_or(after);
  }
}

/// Width of a list item marker at the start of `line`, including the
/// indentation before it and the spaces after it.
fn list_marker_width(line: &str) -> Option<usize> {
  let indent = leading_spaces(line);
  if indent > 3 {
    return None;
  }
  let rest = &line[indent..];

  let marker = if rest.starts_with(['-', '*', '+']) {
    1
  } else {
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 || digits > 9 || !rest[digits..].starts_with(['.', ')']) {
      return None;
    }
    digits + 1
  };

  let after = &rest[marker..];
  let spaces = leading_spaces(after);
  if spaces == 0 && !after.is_empty() {
    return None;
  }
  // Five or more spaces make the item start with indented code
  let gap = if (1..=4).contains(&spaces) { spaces } else { 1 };
  Some(indent + marker + gap)
}

/// Fence character and length if `content` opens a fenced code block.
fn opening_fence(content: &str) -> Option<(char, usize)> {
  let indent = leading_spaces(content);
  if indent > 3 {
    return None;
  }
  let trimmed = &content[indent..];

  let fence_char = trimmed.chars().next().filter(|&c| matches!(c, '`' | '~'))?;
  let fence_count = trimmed.chars().take_while(|&c| c == fence_char).count();
  if fence_count < 3 {
    return None;
  }

  // Backtick fences cannot carry backticks in their info string
  if fence_char == '`' && trimmed[fence_count..].contains('`') {
    return None;
  }
  Some((fence_char, fence_count))
}

/// Find the end of an inline code span opening at `start`.
///
/// `start` must point at a backtick. Returns the byte offset just past the
/// closing backtick run of the same length, or `None` when the run is never
/// closed before a blank line (in which case the backticks are literal).
#[must_use]
pub fn code_span_end(text: &str, start: usize) -> Option<usize> {
  let bytes = text.as_bytes();
  let open = bytes[start..].iter().take_while(|&&b| b == b'`').count();
  if open == 0 {
    return None;
  }

  let mut i = start + open;
  while i < bytes.len() {
    match bytes[i] {
      b'`' => {
        let run = bytes[i..].iter().take_while(|&&b| b == b'`').count();
        if run == open {
          return Some(i + run);
        }
        i += run;
      },
      b'\n' => {
        let next_line = &text[i + 1..];
        let line_end = next_line.find('\n').unwrap_or(next_line.len());
        if next_line[..line_end].trim().is_empty() {
          return None;
        }
        i += 1;
      },
      _ => i += 1,
    }
  }

  None
}
