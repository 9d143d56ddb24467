//! Core engine: gate each rule, evaluate its condition, accumulate findings,
//! and render the host-facing verdict.

use std::path::PathBuf;

use crate::config::{CompiledCondition, CompiledRule, CompiledRuleSet};
use crate::types::{
  BlockOutput, EditEvent, Finding, MessageOutput, Severity, Verdict, VerdictSeverity,
};
use crate::{conditions, gitinfo, testmap};

/// External state the test-association rules read. Injected so evaluation
/// stays deterministic and testable; everything else is pure.
#[derive(Debug, Default)]
pub struct EvalContext {
  pub repo_root: Option<PathBuf>,
  pub staged_files: Vec<String>,
}

impl EvalContext {
  pub fn empty() -> Self {
    Self::default()
  }

  /// Populate from the ambient git repository, fail-open.
  pub fn from_git() -> Self {
    let repo_root = gitinfo::repo_root();
    let staged_files = match &repo_root {
      Some(root) => gitinfo::staged_files(root),
      None => Vec::new(),
    };
    EvalContext {
      repo_root,
      staged_files,
    }
  }
}

/// Evaluate one event against a compiled rule set.
///
/// Rules run in list order and do not short-circuit each other; the verdict
/// severity is the max over all triggered rules.
pub fn evaluate(event: &EditEvent, ruleset: &CompiledRuleSet, ctx: &EvalContext) -> Verdict {
  let mut findings: Vec<Finding> = Vec::new();

  for rule in &ruleset.rules {
    if !rule_applies(rule, event) {
      continue;
    }
    for message in run_condition(rule, event, ctx) {
      let message = match &rule.fix {
        Some(fix) => format!("{}\n   Fix: {}", message, fix),
        None => message,
      };
      findings.push(Finding {
        severity: rule.severity,
        message,
        principle: rule.principle.clone(),
      });
    }
  }

  Verdict::from_findings(findings)
}

fn rule_applies(rule: &CompiledRule, event: &EditEvent) -> bool {
  if let Some(filter) = &rule.match_command {
    let command = event.command.as_deref().unwrap_or("");
    if !command.contains(filter.as_str()) {
      return false;
    }
    if rule.skip_commands.iter().any(|s| command.contains(s.as_str())) {
      return false;
    }
  }
  let path = event.file_path.as_str();
  if !rule.match_paths.is_empty() && !rule.match_paths.iter().any(|p| path.contains(p.as_str())) {
    return false;
  }
  if !rule.match_extensions.is_empty()
    && !rule.match_extensions.iter().any(|e| path.ends_with(e.as_str()))
  {
    return false;
  }
  if rule.skip_paths.iter().any(|p| path.contains(p.as_str())) {
    return false;
  }
  if rule.skip_extensions.iter().any(|e| path.ends_with(e.as_str())) {
    return false;
  }
  true
}

fn run_condition(rule: &CompiledRule, event: &EditEvent, ctx: &EvalContext) -> Vec<String> {
  let content = event.content.as_str();
  match &rule.condition {
    CompiledCondition::Forbidden {
      pattern,
      max_occurrences,
      must_match,
    } => conditions::forbidden(pattern, *max_occurrences, *must_match, content, &rule.message),
    CompiledCondition::RequiredContext {
      trigger,
      satisfied_by,
      window,
      whole_content,
    } => conditions::required_context(
      trigger,
      satisfied_by,
      *window,
      *whole_content,
      content,
      &rule.message,
    ),
    CompiledCondition::BlockThreshold {
      split_pattern,
      max_lines,
      exempt,
    } => conditions::block_threshold(split_pattern, *max_lines, exempt, content, &rule.message),
    CompiledCondition::RequiredPrefix {
      trigger,
      prefix,
      exceptions,
    } => conditions::required_prefix(trigger, prefix, exceptions, content, &rule.message),
    CompiledCondition::MissingTests(assoc) => {
      testmap::missing_tests(assoc, event, ctx, &rule.message)
    }
    CompiledCondition::Always => vec![rule.message.clone()],
  }
}

/// Render a verdict as the host-facing JSON string, or `None` when clean.
///
/// Block findings take precedence and suppress the advisory ones; a host
/// message would never be read alongside a block anyway.
pub fn render(verdict: &Verdict, ruleset: &CompiledRuleSet) -> Option<String> {
  match verdict.severity {
    VerdictSeverity::None => None,
    VerdictSeverity::Block => {
      let blocks: Vec<&Finding> = verdict
        .findings
        .iter()
        .filter(|f| f.severity == Severity::Block)
        .collect();
      let body = blocks
        .iter()
        .map(|f| f.message.as_str())
        .collect::<Vec<_>>()
        .join("\n");
      let mut reason = match &ruleset.block_label {
        Some(label) => format!("{}:\n{}", label, body),
        None => body,
      };
      let principle = blocks
        .iter()
        .rev()
        .find_map(|f| f.principle.as_deref())
        .or(ruleset.principle.as_deref());
      if let Some(p) = principle {
        reason.push_str("\n\nPrinciple: ");
        reason.push_str(p);
      }
      serde_json::to_string(&BlockOutput::new(reason)).ok()
    }
    VerdictSeverity::Warn | VerdictSeverity::Info => {
      let body = verdict.reasons().join("\n");
      let message = match &ruleset.warn_label {
        Some(label) => format!("{}:\n{}", label, body),
        None => body,
      };
      serde_json::to_string(&MessageOutput::new(message)).ok()
    }
  }
}
