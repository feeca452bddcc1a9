//! Small utility helpers used across modules.

use axum::http::{header::COOKIE, HeaderMap};

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values in one
/// left-to-right pass; inserted values are never scanned for placeholders.
/// This is intentionally simple (no nested/conditional logic).
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(tpl.len());
  let mut rest = tpl;
  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let after = &rest[open + 1..];
    let value = after
      .find('}')
      .and_then(|close| pairs.iter().find(|(k, _)| *k == &after[..close]).map(|(_, v)| (close, *v)));
    match value {
      Some((close, v)) => {
        out.push_str(v);
        rest = &after[close + 1..];
      }
      None => {
        out.push('{');
        rest = after;
      }
    }
  }
  out.push_str(rest);
  out
}

/// Log-safe truncation for large strings. Cuts on a char boundary.
pub fn trunc_for_log(s: &str, max_chars: usize) -> String {
  let total = s.chars().count();
  if total <= max_chars {
    s.to_string()
  } else {
    let head: String = s.chars().take(max_chars).collect();
    format!("{}… ({} chars total)", head, total)
  }
}

/// Escape text for HTML element content and double-quoted attributes.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

/// Value of the first cookie called `name` across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
  headers
    .get_all(COOKIE)
    .iter()
    .filter_map(|v| v.to_str().ok())
    .flat_map(|line| line.split(';'))
    .filter_map(|pair| pair.trim().split_once('='))
    .find(|(k, _)| *k == name)
    .map(|(_, v)| v.trim().to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("{a}-{b}-{a}", &[("a", "x"), ("b", "y")]);
    assert_eq!(out, "x-y-x");
  }

  #[test]
  fn fill_template_leaves_json_braces_alone() {
    let out = fill_template("{\"problem\": \"{topic}\"}", &[("topic", "loops")]);
    assert_eq!(out, "{\"problem\": \"loops\"}");
  }

  #[test]
  fn fill_template_does_not_expand_inside_values() {
    let out = fill_template("P: {problem} C: {code}", &[("problem", "echo {code}"), ("code", "print(1)")]);
    assert_eq!(out, "P: echo {code} C: print(1)");
  }

  #[test]
  fn fill_template_keeps_unknown_and_unclosed_braces() {
    assert_eq!(fill_template("{x} {a} {", &[("a", "1")]), "{x} 1 {");
    assert_eq!(fill_template("{{a}}", &[("a", "1")]), "{1}");
  }

  #[test]
  fn trunc_for_log_is_char_safe() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let out = trunc_for_log("ééééé", 2);
    assert!(out.starts_with("éé…"));
    assert!(out.contains("5 chars total"));
  }

  #[test]
  fn escape_html_covers_markup_characters() {
    assert_eq!(
      escape_html("<b>\"a\" & 'b'</b>"),
      "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
    );
  }

  #[test]
  fn cookie_value_finds_named_pair() {
    let mut headers = HeaderMap::new();
    headers.append(COOKIE, HeaderValue::from_static("theme=dark; adaptipy_session=abc-123"));
    headers.append(COOKIE, HeaderValue::from_static("other=1"));
    assert_eq!(cookie_value(&headers, "adaptipy_session").as_deref(), Some("abc-123"));
    assert_eq!(cookie_value(&headers, "other").as_deref(), Some("1"));
    assert_eq!(cookie_value(&headers, "missing"), None);
  }
}
