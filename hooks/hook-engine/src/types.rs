//! Input/output types for the hook engine (JSON contract with the host).

use serde::{Deserialize, Serialize};

/// Raw host payload: one JSON object on stdin.
#[derive(Debug, Default, Deserialize)]
pub struct HookInput {
  #[serde(default)]
  pub tool_input: ToolInput,
}

/// The `tool_input` object of the host payload. Every field is optional;
/// `content` and `new_string` are alternate keys for the proposed new text.
#[derive(Debug, Default, Deserialize)]
pub struct ToolInput {
  #[serde(default)]
  pub file_path: Option<String>,
  #[serde(default)]
  pub content: Option<String>,
  #[serde(default)]
  pub new_string: Option<String>,
  #[serde(default)]
  pub command: Option<String>,
}

/// One candidate file edit or shell command, normalized from the host
/// payload. Immutable for the lifetime of the invocation.
#[derive(Debug, Clone)]
pub struct EditEvent {
  pub file_path: String,
  pub content: String,
  pub command: Option<String>,
}

impl From<HookInput> for EditEvent {
  fn from(input: HookInput) -> Self {
    let ti = input.tool_input;
    EditEvent {
      file_path: ti.file_path.unwrap_or_default(),
      // new_string is the text an Edit call actually applies; it wins over
      // content when both are present.
      content: ti.new_string.or(ti.content).unwrap_or_default(),
      command: ti.command,
    }
  }
}

/// Rule severity. Ordering matters: Block > Warn > Info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
  Info,
  Warn,
  Block,
}

/// Verdict severity: rule severities plus None (no rule triggered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerdictSeverity {
  None,
  Info,
  Warn,
  Block,
}

impl From<Severity> for VerdictSeverity {
  fn from(s: Severity) -> Self {
    match s {
      Severity::Info => VerdictSeverity::Info,
      Severity::Warn => VerdictSeverity::Warn,
      Severity::Block => VerdictSeverity::Block,
    }
  }
}

/// One triggered rule occurrence: the rule's severity, the rendered message,
/// and the rule's principle text (if configured) for block output.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
  pub severity: Severity,
  pub message: String,
  pub principle: Option<String>,
}

/// The sole output of an evaluation. Severity is the max over all findings;
/// findings stay in rule-then-occurrence order.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
  pub severity: VerdictSeverity,
  pub findings: Vec<Finding>,
}

impl Verdict {
  pub fn none() -> Self {
    Verdict {
      severity: VerdictSeverity::None,
      findings: Vec::new(),
    }
  }

  pub fn from_findings(findings: Vec<Finding>) -> Self {
    let severity = findings
      .iter()
      .map(|f| VerdictSeverity::from(f.severity))
      .max()
      .unwrap_or(VerdictSeverity::None);
    Verdict { severity, findings }
  }

  /// Messages of all findings, in order.
  pub fn reasons(&self) -> Vec<&str> {
    self.findings.iter().map(|f| f.message.as_str()).collect()
  }
}

/// Output: block verdict for the host to enforce.
#[derive(Debug, Serialize)]
pub struct BlockOutput {
  pub decision: &'static str,
  pub reason: String,
}

impl BlockOutput {
  pub fn new(reason: String) -> Self {
    BlockOutput {
      decision: "block",
      reason,
    }
  }
}

/// Output: advisory message surfaced to the user (warn/info verdicts).
#[derive(Debug, Serialize)]
pub struct MessageOutput {
  pub message: String,
}

impl MessageOutput {
  pub fn new(message: String) -> Self {
    MessageOutput { message }
  }
}
