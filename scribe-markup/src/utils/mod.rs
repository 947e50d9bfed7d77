pub mod codeblock;

/// Turn heading text into an anchor identifier.
///
/// Lowercases and trims the input, turns whitespace runs into a hyphen,
/// spells `&` out as `and`, drops everything outside `[A-Za-z0-9_-]` and
/// collapses repeated hyphens. Pure, so identical text always gives the same
/// slug; duplicate headings are not disambiguated.
#[must_use]
pub fn slugify(text: &str) -> String {
  let lowered = text.to_lowercase();
  let mut slug = String::with_capacity(lowered.len());

  let mut chars = lowered.trim().chars().peekable();
  while let Some(c) = chars.next() {
    if c.is_whitespace() {
      while chars.peek().is_some_and(|next| next.is_whitespace()) {
        chars.next();
      }
      push_hyphen(&mut slug);
    } else if c == '&' {
      push_hyphen(&mut slug);
      slug.push_str("and");
      push_hyphen(&mut slug);
    } else if c == '-' {
      push_hyphen(&mut slug);
    } else if c.is_ascii_alphanumeric() || c == '_' {
      slug.push(c);
    }
  }

  slug
}

fn push_hyphen(slug: &mut String) {
  if !slug.ends_with('-') {
    slug.push('-');
  }
}

/// Escape text for safe inclusion in HTML body or attribute context.
#[must_use]
pub fn escape_html(text: &str) -> String {
  html_escape::encode_double_quoted_attribute(text).into_owned()
}
