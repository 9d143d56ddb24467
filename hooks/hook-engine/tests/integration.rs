//! Integration tests: bundled rule sets driven end-to-end through
//! evaluate + render, the way the binary uses them.

use std::fs;

use hook_engine::config::RuleSet;
use hook_engine::types::{EditEvent, HookInput};
use hook_engine::{engine, EvalContext, VerdictSeverity};

fn compile(toml: &str) -> hook_engine::CompiledRuleSet {
  let (compiled, errors) = RuleSet::from_toml(toml).unwrap().compile();
  assert!(errors.is_empty(), "bundled set has config errors: {:?}", errors);
  compiled
}

fn event_from_json(json: &str) -> EditEvent {
  let input: HookInput = serde_json::from_str(json).unwrap();
  EditEvent::from(input)
}

#[test]
fn all_bundled_rule_sets_compile_cleanly() {
  for entry in fs::read_dir(concat!(env!("CARGO_MANIFEST_DIR"), "/rulesets")).unwrap() {
    let path = entry.unwrap().path();
    let set = RuleSet::load(&path).unwrap_or_else(|e| panic!("{}: {}", path.display(), e));
    let name = set.name.clone();
    let (compiled, errors) = set.compile();
    assert!(errors.is_empty(), "{}: {:?}", name, errors);
    assert!(!compiled.rules.is_empty(), "{} has no rules", name);
  }
}

#[test]
fn data_isolation_end_to_end() {
  let set = compile(include_str!("../rulesets/data-isolation.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/src/api/handler.ts","content":"pool.query('SELECT * FROM t')"}}"#,
  );
  let verdict = engine::evaluate(&event, &set, &EvalContext::empty());
  assert_eq!(verdict.severity, VerdictSeverity::Warn);

  let json = engine::render(&verdict, &set).unwrap();
  let value: serde_json::Value = serde_json::from_str(&json).unwrap();
  let message = value["message"].as_str().unwrap();
  assert!(message.starts_with("Data isolation warning:\n"));
  assert!(message.contains("position 0"));
  assert!(value.get("decision").is_none());
}

#[test]
fn data_isolation_filtered_query_is_clean() {
  let set = compile(include_str!("../rulesets/data-isolation.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/src/api/handler.ts","content":"pool.query('SELECT * FROM t WHERE user_id = $1', [userId])"}}"#,
  );
  let verdict = engine::evaluate(&event, &set, &EvalContext::empty());
  assert_eq!(verdict.severity, VerdictSeverity::None);
  assert!(engine::render(&verdict, &set).is_none());
}

#[test]
fn data_isolation_skips_test_files() {
  let set = compile(include_str!("../rulesets/data-isolation.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/src/api/handler.test.ts","content":"pool.query('SELECT 1')"}}"#,
  );
  let verdict = engine::evaluate(&event, &set, &EvalContext::empty());
  assert_eq!(verdict.severity, VerdictSeverity::None);
}

#[test]
fn forbidden_imports_blocks_node_fs() {
  let set = compile(include_str!("../rulesets/forbidden-imports.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/src/worker.ts","new_string":"import { readFileSync } from 'fs';"}}"#,
  );
  let verdict = engine::evaluate(&event, &set, &EvalContext::empty());
  assert_eq!(verdict.severity, VerdictSeverity::Block);

  let json = engine::render(&verdict, &set).unwrap();
  let value: serde_json::Value = serde_json::from_str(&json).unwrap();
  assert_eq!(value["decision"], "block");
  assert!(value["reason"]
    .as_str()
    .unwrap()
    .starts_with("Forbidden import violation:\n"));
}

#[test]
fn forbidden_imports_allows_scripts_dir() {
  let set = compile(include_str!("../rulesets/forbidden-imports.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/scripts/build.ts","content":"const fs = require('fs')"}}"#,
  );
  assert_eq!(
    engine::evaluate(&event, &set, &EvalContext::empty()).severity,
    VerdictSeverity::None
  );
}

#[test]
fn required_prefix_blocks_and_names_the_route() {
  let set = compile(include_str!("../rulesets/required-prefix.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/src/routes/users.ts","content":"app.get('/users', handler); app.get('/health', ok);"}}"#,
  );
  let verdict = engine::evaluate(&event, &set, &EvalContext::empty());
  assert_eq!(verdict.severity, VerdictSeverity::Block);
  assert_eq!(verdict.findings.len(), 1, "exceptions must not be flagged");
  assert!(verdict.findings[0].message.contains(r#"Route "/users""#));
}

#[test]
fn boundary_guard_cites_fix_and_principle() {
  let set = compile(include_str!("../rulesets/boundary-guard.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/src/plugins/lint.ts","new_string":"context.state = { done: true }"}}"#,
  );
  let verdict = engine::evaluate(&event, &set, &EvalContext::empty());
  let json = engine::render(&verdict, &set).unwrap();
  let value: serde_json::Value = serde_json::from_str(&json).unwrap();
  let reason = value["reason"].as_str().unwrap();
  assert!(reason.contains("Fix: Return a result object"));
  assert!(reason.contains("Principle: Plugins return results"));
}

#[test]
fn state_flow_blocks_ui_store_mutation() {
  let set = compile(include_str!("../rulesets/state-flow.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/src/components/Nav.tsx","new_string":"userStore.name = value"}}"#,
  );
  let verdict = engine::evaluate(&event, &set, &EvalContext::empty());
  assert_eq!(verdict.severity, VerdictSeverity::Block);
}

#[test]
fn state_flow_allows_mutation_inside_store_files() {
  let set = compile(include_str!("../rulesets/state-flow.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/src/stores/user.ts","new_string":"userStore.name = value"}}"#,
  );
  assert_eq!(
    engine::evaluate(&event, &set, &EvalContext::empty()).severity,
    VerdictSeverity::None
  );
}

#[test]
fn delegation_warns_on_unvalidated_body_parse() {
  let set = compile(include_str!("../rulesets/delegation.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/src/api/users.ts","content":"const body = await req.json()"}}"#,
  );
  let verdict = engine::evaluate(&event, &set, &EvalContext::empty());
  assert_eq!(verdict.severity, VerdictSeverity::Warn);
  let json = engine::render(&verdict, &set).unwrap();
  assert!(json.contains("API delegation warning"));
}

#[test]
fn delegation_is_satisfied_by_zod_validation() {
  let set = compile(include_str!("../rulesets/delegation.toml"));
  let content = "import { schema } from './schema';\nconst body = schema.parse(await req.json())";
  let event = EditEvent {
    file_path: "/src/api/users.ts".into(),
    content: content.into(),
    command: None,
  };
  assert_eq!(
    engine::evaluate(&event, &set, &EvalContext::empty()).severity,
    VerdictSeverity::None
  );
}

#[test]
fn test_gate_blocks_commit_without_tests() {
  let root = tempfile::tempdir().unwrap();
  let set = compile(include_str!("../rulesets/test-gate.toml"));
  let ctx = EvalContext {
    repo_root: Some(root.path().to_path_buf()),
    staged_files: vec!["src/core/widget.ts".into()],
  };
  let event = event_from_json(r#"{"tool_input":{"command":"git commit -m 'add widget'"}}"#);
  let verdict = engine::evaluate(&event, &set, &ctx);
  assert_eq!(verdict.severity, VerdictSeverity::Block);

  let json = engine::render(&verdict, &set).unwrap();
  let value: serde_json::Value = serde_json::from_str(&json).unwrap();
  assert_eq!(value["decision"], "block");
  assert!(value["reason"].as_str().unwrap().contains("src/core/widget.ts"));
}

#[test]
fn test_gate_passes_when_test_exists_on_disk() {
  let root = tempfile::tempdir().unwrap();
  fs::create_dir_all(root.path().join("tests/core")).unwrap();
  fs::write(root.path().join("tests/core/widget.test.ts"), "").unwrap();

  let set = compile(include_str!("../rulesets/test-gate.toml"));
  let ctx = EvalContext {
    repo_root: Some(root.path().to_path_buf()),
    staged_files: vec!["src/core/widget.ts".into()],
  };
  let event = event_from_json(r#"{"tool_input":{"command":"git commit -m 'add widget'"}}"#);
  assert_eq!(engine::evaluate(&event, &set, &ctx).severity, VerdictSeverity::None);
}

#[test]
fn test_gate_ignores_amend() {
  let set = compile(include_str!("../rulesets/test-gate.toml"));
  let ctx = EvalContext {
    repo_root: None,
    staged_files: vec!["src/core/widget.ts".into()],
  };
  let event = event_from_json(r#"{"tool_input":{"command":"git commit --amend"}}"#);
  assert_eq!(engine::evaluate(&event, &set, &ctx).severity, VerdictSeverity::None);
}

#[test]
fn test_suggest_nudges_for_untested_source() {
  let root = tempfile::tempdir().unwrap();
  let set = compile(include_str!("../rulesets/test-suggest.toml"));
  let ctx = EvalContext {
    repo_root: Some(root.path().to_path_buf()),
    staged_files: Vec::new(),
  };
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/repo/src/core/widget.ts","content":"export const w = 1;"}}"#,
  );
  let verdict = engine::evaluate(&event, &set, &ctx);
  assert_eq!(verdict.severity, VerdictSeverity::Info);
  let json = engine::render(&verdict, &set).unwrap();
  assert!(json.contains("No tests found for /repo/src/core/widget.ts"));
}

#[test]
fn change_suggest_fires_on_watched_path_only() {
  let set = compile(include_str!("../rulesets/change-suggest.toml"));
  let ctx = EvalContext::empty();

  let watched = event_from_json(
    r#"{"tool_input":{"file_path":"/src/detectors/scan.ts","content":"x"}}"#,
  );
  let verdict = engine::evaluate(&watched, &set, &ctx);
  assert_eq!(verdict.severity, VerdictSeverity::Info);
  assert!(verdict.findings[0].message.contains("npm run benchmark"));

  let watched_test = event_from_json(
    r#"{"tool_input":{"file_path":"/src/detectors/scan.test.ts","content":"x"}}"#,
  );
  assert_eq!(engine::evaluate(&watched_test, &set, &ctx).severity, VerdictSeverity::None);

  let unwatched = event_from_json(r#"{"tool_input":{"file_path":"/src/other/x.ts","content":"x"}}"#);
  assert_eq!(engine::evaluate(&unwatched, &set, &ctx).severity, VerdictSeverity::None);
}

#[test]
fn deterministic_output_across_runs() {
  let set = compile(include_str!("../rulesets/data-isolation.toml"));
  let event = event_from_json(
    r#"{"tool_input":{"file_path":"/src/api/handler.ts","content":"db.query(a); db.query(b);"}}"#,
  );
  let ctx = EvalContext::empty();
  let json1 = engine::render(&engine::evaluate(&event, &set, &ctx), &set).unwrap();
  let json2 = engine::render(&engine::evaluate(&event, &set, &ctx), &set).unwrap();
  assert_eq!(json1, json2, "same input must produce identical JSON output");
}

#[test]
fn malformed_tool_input_is_treated_as_empty() {
  let set = compile(include_str!("../rulesets/forbidden-imports.toml"));
  let event = event_from_json(r#"{"tool_input":{}}"#);
  let verdict = engine::evaluate(&event, &set, &EvalContext::empty());
  assert_eq!(verdict.severity, VerdictSeverity::None);
}
