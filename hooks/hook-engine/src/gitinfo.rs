//! Read-only git queries for the commit gate. Every failure is fail-open:
//! callers get `None` / empty and the gate simply does not fire.

use std::path::{Path, PathBuf};
use std::process::Command;

/// Repository root via `git rev-parse --show-toplevel`.
pub fn repo_root() -> Option<PathBuf> {
  let out = Command::new("git")
    .args(["rev-parse", "--show-toplevel"])
    .output()
    .ok()?;
  if !out.status.success() {
    return None;
  }
  let raw = String::from_utf8(out.stdout).ok()?;
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    None
  } else {
    Some(PathBuf::from(trimmed))
  }
}

/// Staged paths via `git diff --cached --name-only --diff-filter=ACM`,
/// relative to the repo root.
pub fn staged_files(root: &Path) -> Vec<String> {
  let out = match Command::new("git")
    .current_dir(root)
    .args(["diff", "--cached", "--name-only", "--diff-filter=ACM"])
    .output()
  {
    Ok(o) if o.status.success() => o,
    _ => return Vec::new(),
  };
  String::from_utf8_lossy(&out.stdout)
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .map(str::to_string)
    .collect()
}
