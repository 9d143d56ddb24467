//! Test-association condition: does a source file have a test?
//!
//! Candidates are derived from the source path via configured
//! source-dir -> test-dir mappings (`<stem>.test<ext>` / `<stem>.spec<ext>`)
//! plus the `__tests__/` sibling convention, then checked against the
//! filesystem under the repo root and against the staged-files list.
//! A filesystem error counts as "not found": the safe assumption is that a
//! required test is missing.

use crate::config::{TestAssociation, TestScope};
use crate::engine::EvalContext;
use crate::types::EditEvent;

const TEST_SUFFIXES: [&str; 2] = [".test", ".spec"];

/// One finding per source file in scope with no associated test.
pub fn missing_tests(
  assoc: &TestAssociation,
  event: &EditEvent,
  ctx: &EvalContext,
  message: &str,
) -> Vec<String> {
  let sources: Vec<String> = match assoc.scope {
    TestScope::Staged => ctx
      .staged_files
      .iter()
      .filter(|f| needs_test(assoc, f))
      .cloned()
      .collect(),
    TestScope::Event => {
      if needs_test(assoc, &event.file_path) {
        vec![event.file_path.clone()]
      } else {
        Vec::new()
      }
    }
  };

  sources
    .into_iter()
    .filter(|f| !has_test(assoc, f, ctx))
    .map(|f| message.replace("{file}", &f))
    .collect()
}

/// Is this a source file that requires a test?
fn needs_test(assoc: &TestAssociation, path: &str) -> bool {
  if path.is_empty() {
    return false;
  }
  if source_ext(assoc, path).is_none() {
    return false;
  }
  if !assoc.source_dirs.is_empty() && !assoc.source_dirs.iter().any(|d| path.contains(d.as_str()))
  {
    return false;
  }
  !assoc.skip_patterns.iter().any(|p| path.contains(p.as_str()))
}

fn source_ext<'a>(assoc: &'a TestAssociation, path: &str) -> Option<&'a str> {
  assoc
    .source_exts
    .iter()
    .find(|e| path.ends_with(e.as_str()))
    .map(|e| e.as_str())
}

fn has_test(assoc: &TestAssociation, source: &str, ctx: &EvalContext) -> bool {
  let ext = match source_ext(assoc, source) {
    Some(e) => e,
    None => return false,
  };
  let base = source.rsplit('/').next().unwrap_or(source);
  let stem = base.strip_suffix(ext).unwrap_or(base);

  // Configured test directories for this source area.
  for loc in &assoc.test_locations {
    if !source.contains(loc.source_prefix.as_str()) {
      continue;
    }
    for dir in &loc.test_dirs {
      for suffix in TEST_SUFFIXES {
        let candidate = format!("{}{}{}{}", dir, stem, suffix, ext);
        if found(ctx, &candidate) {
          return true;
        }
      }
    }
  }

  // Test staged alongside the source: same path with a .test stem, or the
  // src/ -> tests/ mirror of it.
  let inline = format!(
    "{}{}{}",
    source.strip_suffix(ext).unwrap_or(source),
    ".test",
    ext
  );
  if ctx.staged_files.iter().any(|s| s == &inline) {
    return true;
  }
  if let Some(rest) = source.strip_prefix("src/") {
    let mirrored = format!(
      "tests/{}{}{}",
      rest.strip_suffix(ext).unwrap_or(rest),
      ".test",
      ext
    );
    if ctx.staged_files.iter().any(|s| s == &mirrored) {
      return true;
    }
  }

  // __tests__ sibling directory.
  let dir = match source.rfind('/') {
    Some(i) => &source[..i],
    None => "",
  };
  let sibling = if dir.is_empty() {
    format!("__tests__/{}.test{}", stem, ext)
  } else {
    format!("{}/__tests__/{}.test{}", dir, stem, ext)
  };
  found(ctx, &sibling)
}

/// Exists on disk under the repo root, or appears in the staged list.
fn found(ctx: &EvalContext, candidate: &str) -> bool {
  if ctx.staged_files.iter().any(|s| s == candidate) {
    return true;
  }
  match &ctx.repo_root {
    // Path::exists reports false on permission errors too, which is the
    // conservative outcome we want here.
    Some(root) => root.join(candidate).exists(),
    None => false,
  }
}
