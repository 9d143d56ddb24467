//! Content-scanning condition kinds. Each returns the rendered messages for
//! its findings (empty = rule did not trigger). All scans are pure.

use regex::Regex;

/// Forbidden pattern: triggers once per rule when the match count exceeds
/// `max_occurrences`, or (with `must_match`) when the pattern is absent.
pub fn forbidden(
  pattern: &Regex,
  max_occurrences: usize,
  must_match: bool,
  content: &str,
  message: &str,
) -> Vec<String> {
  if must_match {
    if pattern.is_match(content) {
      return Vec::new();
    }
    return vec![message.to_string()];
  }

  let count = pattern.find_iter(content).count();
  if count == 0 || count <= max_occurrences {
    return Vec::new();
  }

  let first = match pattern.find(content) {
    Some(m) => m,
    None => return Vec::new(),
  };
  let capture = pattern
    .captures(content)
    .and_then(|c| c.get(1))
    .map(|m| m.as_str().to_string())
    .unwrap_or_default();
  vec![
    message
      .replace("{match}", first.as_str())
      .replace("{capture}", &capture)
      .replace("{count}", &count.to_string()),
  ]
}

/// Required context: one finding per `trigger` occurrence whose window lacks
/// every satisfying term. With `whole_content`, the satisfying terms are
/// checked against the full content and at most one finding is produced.
pub fn required_context(
  trigger: &Regex,
  satisfied_by: &[Regex],
  window: usize,
  whole_content: bool,
  content: &str,
  message: &str,
) -> Vec<String> {
  if whole_content {
    let first = match trigger.find(content) {
      Some(m) => m,
      None => return Vec::new(),
    };
    if satisfied_by.iter().any(|re| re.is_match(content)) {
      return Vec::new();
    }
    return vec![message.replace("{position}", &first.start().to_string())];
  }

  let mut out = Vec::new();
  for m in trigger.find_iter(content) {
    // The window starts at the match itself. Clamp backwards to a char
    // boundary so the slice never panics on multibyte content.
    let mut end = (m.start() + window).min(content.len());
    while !content.is_char_boundary(end) {
      end -= 1;
    }
    let context = &content[m.start()..end];
    if satisfied_by.iter().any(|re| re.is_match(context)) {
      continue;
    }
    out.push(message.replace("{position}", &m.start().to_string()));
  }
  out
}

/// Structural threshold: split into logical blocks, count substantive lines,
/// trigger on the first block over the limit.
pub fn block_threshold(
  split_pattern: &Regex,
  max_lines: usize,
  exempt: &[Regex],
  content: &str,
  message: &str,
) -> Vec<String> {
  for block in split_pattern.split(content) {
    let count = block
      .lines()
      .filter(|line| is_substantive(line, exempt))
      .count();
    if count > max_lines {
      return vec![message.replace("{count}", &count.to_string())];
    }
  }
  Vec::new()
}

fn is_substantive(line: &str, exempt: &[Regex]) -> bool {
  let t = line.trim();
  if t.is_empty() {
    return false;
  }
  if t.starts_with("//") || t.starts_with("/*") || t.starts_with('*') {
    return false;
  }
  if t.starts_with("import ") || t.starts_with("export ") {
    return false;
  }
  if matches!(t, "{" | "}" | "};" | "})" | "});") {
    return false;
  }
  !exempt.iter().any(|re| re.is_match(t))
}

/// Required prefix: one finding per captured route literal that lacks the
/// prefix. Exceptions, wildcard routes, and relative paths are allowed.
pub fn required_prefix(
  trigger: &Regex,
  prefix: &str,
  exceptions: &[String],
  content: &str,
  message: &str,
) -> Vec<String> {
  let mut out = Vec::new();
  for caps in trigger.captures_iter(content) {
    let route = match caps.get(1) {
      Some(m) => m.as_str(),
      None => continue,
    };
    if exceptions.iter().any(|e| e == route)
      || route.starts_with(prefix)
      || route.starts_with('*')
      || !route.starts_with('/')
    {
      continue;
    }
    out.push(message.replace("{route}", route));
  }
  out
}
