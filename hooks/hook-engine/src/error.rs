//! Structured error types for rule-set loading.
//!
//! Evaluation itself never fails; everything here is a load-time
//! configuration problem, reported on stderr and never fatal to the host.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("read {path}: {source}")]
  Io {
    path: String,
    #[source]
    source: std::io::Error,
  },

  #[error("parse: {0}")]
  Toml(#[from] toml::de::Error),

  #[error("rule {rule}: invalid pattern `{pattern}`: {reason}")]
  BadPattern {
    rule: String,
    pattern: String,
    reason: String,
  },

  #[error("rule set {0} has no rules")]
  Empty(String),
}

impl ConfigError {
  pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
    Self::Io {
      path: path.display().to_string(),
      source,
    }
  }

  pub fn bad_pattern(rule: &str, pattern: &str, err: &regex::Error) -> Self {
    Self::BadPattern {
      rule: rule.to_string(),
      pattern: pattern.to_string(),
      reason: err.to_string(),
    }
  }
}
