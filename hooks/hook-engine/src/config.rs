//! Declarative rule sets: patterns are data, validated at load time.
//!
//! A rule set is one TOML file (see rulesets/). Compiling it turns pattern
//! source strings into regexes; a rule whose pattern fails to compile is
//! skipped and reported, the rest of the set survives.

use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::types::Severity;

/// One named rule set, as authored in TOML.
#[derive(Debug, Deserialize)]
pub struct RuleSet {
  pub name: String,
  /// Header line for block output ("<label>:\n<reasons>").
  #[serde(default)]
  pub block_label: Option<String>,
  /// Header line for warn/info output.
  #[serde(default)]
  pub warn_label: Option<String>,
  /// Fallback principle text appended to block output when no triggered
  /// rule carries its own.
  #[serde(default)]
  pub principle: Option<String>,
  #[serde(default, rename = "rule")]
  pub rules: Vec<Rule>,
}

/// One declarative rule: path/command gating plus a condition.
#[derive(Debug, Deserialize)]
pub struct Rule {
  pub name: String,
  pub severity: Severity,
  /// Message template. Placeholders depend on the condition kind:
  /// {match}, {capture}, {count}, {position}, {route}, {file}.
  pub message: String,
  /// Remediation hint, rendered as "\n   Fix: ..." after the message.
  #[serde(default)]
  pub fix: Option<String>,
  /// Principle cited in block output so the agent understands why.
  #[serde(default)]
  pub principle: Option<String>,
  /// Substring filters: file_path must contain one (empty = match all).
  #[serde(default)]
  pub match_paths: Vec<String>,
  /// file_path must end with one of these (empty = match all).
  #[serde(default)]
  pub match_extensions: Vec<String>,
  #[serde(default)]
  pub skip_paths: Vec<String>,
  #[serde(default)]
  pub skip_extensions: Vec<String>,
  /// Substring the event command must contain (for Bash-tool rules).
  #[serde(default)]
  pub match_command: Option<String>,
  /// Command substrings that exempt the event (e.g. "--amend").
  #[serde(default)]
  pub skip_commands: Vec<String>,
  pub condition: Condition,
}

/// Condition kinds, tagged by `kind` in TOML.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Condition {
  /// Regex found anywhere in content. `max_occurrences` tolerates up to N
  /// matches before triggering; `must_match` inverts (trigger when absent).
  Forbidden {
    pattern: String,
    #[serde(default)]
    max_occurrences: usize,
    #[serde(default)]
    must_match: bool,
  },
  /// Every `trigger` occurrence must have one of `satisfied_by` (matched
  /// case-insensitively) within `window` characters starting at the match.
  /// `whole_content = true` checks the full content once instead.
  RequiredContext {
    trigger: String,
    satisfied_by: Vec<String>,
    #[serde(default = "default_window")]
    window: usize,
    #[serde(default)]
    whole_content: bool,
  },
  /// Split content on `split_pattern` and count substantive lines per
  /// block; trigger when any block exceeds `max_lines`.
  BlockThreshold {
    split_pattern: String,
    max_lines: usize,
    #[serde(default)]
    exempt: Vec<String>,
  },
  /// Every route literal captured by `trigger` (group 1) must start with
  /// `prefix`, unless listed in `exceptions`, wildcard, or relative.
  RequiredPrefix {
    trigger: String,
    prefix: String,
    #[serde(default)]
    exceptions: Vec<String>,
  },
  /// Test-association check; see testmap.rs.
  MissingTests(TestAssociation),
  /// Triggers whenever the rule's path/command gating passes. Used for
  /// "this area changed, consider doing X" suggestions.
  Always,
}

fn default_window() -> usize {
  200
}

/// Configuration for the test-association condition.
#[derive(Debug, Clone, Deserialize)]
pub struct TestAssociation {
  /// "staged" evaluates every staged source file (commit gate); "event"
  /// checks the event's own file_path.
  #[serde(default)]
  pub scope: TestScope,
  /// Extensions a file must have to count as source (first match decides
  /// the stem). Empty = no file counts.
  pub source_exts: Vec<String>,
  /// Substring filters a source path must match (empty = all).
  #[serde(default)]
  pub source_dirs: Vec<String>,
  /// Substring filters that exempt a path (tests, types, generated).
  #[serde(default)]
  pub skip_patterns: Vec<String>,
  /// Source-dir prefix -> candidate test directories.
  #[serde(default)]
  pub test_locations: Vec<TestLocation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestScope {
  Staged,
  #[default]
  Event,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TestLocation {
  pub source_prefix: String,
  pub test_dirs: Vec<String>,
}

/// A rule set with every pattern compiled and validated.
#[derive(Debug)]
pub struct CompiledRuleSet {
  pub name: String,
  pub block_label: Option<String>,
  pub warn_label: Option<String>,
  pub principle: Option<String>,
  pub rules: Vec<CompiledRule>,
}

impl CompiledRuleSet {
  /// True when any rule needs the repo root / staged-file context.
  pub fn needs_repo(&self) -> bool {
    self
      .rules
      .iter()
      .any(|r| matches!(r.condition, CompiledCondition::MissingTests(_)))
  }
}

#[derive(Debug)]
pub struct CompiledRule {
  pub name: String,
  pub severity: Severity,
  pub message: String,
  pub fix: Option<String>,
  pub principle: Option<String>,
  pub match_paths: Vec<String>,
  pub match_extensions: Vec<String>,
  pub skip_paths: Vec<String>,
  pub skip_extensions: Vec<String>,
  pub match_command: Option<String>,
  pub skip_commands: Vec<String>,
  pub condition: CompiledCondition,
}

#[derive(Debug)]
pub enum CompiledCondition {
  Forbidden {
    pattern: Regex,
    max_occurrences: usize,
    must_match: bool,
  },
  RequiredContext {
    trigger: Regex,
    satisfied_by: Vec<Regex>,
    window: usize,
    whole_content: bool,
  },
  BlockThreshold {
    split_pattern: Regex,
    max_lines: usize,
    exempt: Vec<Regex>,
  },
  RequiredPrefix {
    trigger: Regex,
    prefix: String,
    exceptions: Vec<String>,
  },
  MissingTests(TestAssociation),
  Always,
}

impl RuleSet {
  /// Read and parse a rule-set TOML file.
  pub fn load(path: &Path) -> Result<RuleSet, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    Self::from_toml(&raw)
  }

  pub fn from_toml(raw: &str) -> Result<RuleSet, ConfigError> {
    Ok(toml::from_str(raw)?)
  }

  /// Compile every rule. Rules with invalid patterns are dropped and
  /// reported; the surviving rules keep their original order.
  pub fn compile(self) -> (CompiledRuleSet, Vec<ConfigError>) {
    let mut errors = Vec::new();
    if self.rules.is_empty() {
      errors.push(ConfigError::Empty(self.name.clone()));
    }
    let mut rules = Vec::new();
    for rule in self.rules {
      match compile_rule(rule) {
        Ok(r) => rules.push(r),
        Err(e) => errors.push(e),
      }
    }
    (
      CompiledRuleSet {
        name: self.name,
        block_label: self.block_label,
        warn_label: self.warn_label,
        principle: self.principle,
        rules,
      },
      errors,
    )
  }
}

fn compile_rule(rule: Rule) -> Result<CompiledRule, ConfigError> {
  let name = rule.name;
  let condition = match rule.condition {
    Condition::Forbidden {
      pattern,
      max_occurrences,
      must_match,
    } => CompiledCondition::Forbidden {
      pattern: compile_pattern(&name, &pattern, false)?,
      max_occurrences,
      must_match,
    },
    Condition::RequiredContext {
      trigger,
      satisfied_by,
      window,
      whole_content,
    } => CompiledCondition::RequiredContext {
      trigger: compile_pattern(&name, &trigger, false)?,
      satisfied_by: satisfied_by
        .iter()
        .map(|p| compile_pattern(&name, p, true))
        .collect::<Result<Vec<_>, _>>()?,
      window,
      whole_content,
    },
    Condition::BlockThreshold {
      split_pattern,
      max_lines,
      exempt,
    } => CompiledCondition::BlockThreshold {
      split_pattern: compile_pattern(&name, &split_pattern, false)?,
      max_lines,
      exempt: exempt
        .iter()
        .map(|p| compile_pattern(&name, p, false))
        .collect::<Result<Vec<_>, _>>()?,
    },
    Condition::RequiredPrefix {
      trigger,
      prefix,
      exceptions,
    } => CompiledCondition::RequiredPrefix {
      trigger: compile_pattern(&name, &trigger, false)?,
      prefix,
      exceptions,
    },
    Condition::MissingTests(assoc) => CompiledCondition::MissingTests(assoc),
    Condition::Always => CompiledCondition::Always,
  };

  Ok(CompiledRule {
    name,
    severity: rule.severity,
    message: rule.message,
    fix: rule.fix,
    principle: rule.principle,
    match_paths: rule.match_paths,
    match_extensions: rule.match_extensions,
    skip_paths: rule.skip_paths,
    skip_extensions: rule.skip_extensions,
    match_command: rule.match_command,
    skip_commands: rule.skip_commands,
    condition,
  })
}

fn compile_pattern(
  rule: &str,
  pattern: &str,
  case_insensitive: bool,
) -> Result<Regex, ConfigError> {
  RegexBuilder::new(pattern)
    .case_insensitive(case_insensitive)
    .build()
    .map_err(|e| ConfigError::bad_pattern(rule, pattern, &e))
}
