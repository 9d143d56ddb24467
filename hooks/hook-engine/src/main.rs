//! Binary entrypoint: read one JSON event from stdin, write one verdict to
//! stdout.
//!
//! Usage: hook-engine <ruleset.toml>
//!
//! The exit code is always 0: the host distinguishes allow/block by the
//! `decision` field of the output, not the exit code. Every internal failure
//! is therefore fail-open — diagnostics go to stderr, stdout stays reserved
//! for verdicts.

use hook_engine::config::RuleSet;
use hook_engine::types::{EditEvent, HookInput};
use hook_engine::{engine, EvalContext};
use std::io::{self, Read, Write};
use std::path::Path;
use std::{env, process};

fn main() {
  run();
  process::exit(0);
}

fn run() {
  let args: Vec<String> = env::args().collect();
  let ruleset_path = match args.get(1) {
    Some(p) => p,
    None => {
      let _ = writeln!(io::stderr(), "Usage: hook-engine <ruleset.toml>");
      return;
    }
  };

  let ruleset = match RuleSet::load(Path::new(ruleset_path)) {
    Ok(r) => r,
    Err(e) => {
      let _ = writeln!(io::stderr(), "hook-engine: {}: {}", ruleset_path, e);
      return;
    }
  };
  let (compiled, errors) = ruleset.compile();
  for e in &errors {
    let _ = writeln!(io::stderr(), "hook-engine: skipping rule: {}", e);
  }

  let mut raw = String::new();
  if io::stdin().lock().read_to_string(&mut raw).is_err() {
    return;
  }
  let input: HookInput = match serde_json::from_str(&raw) {
    Ok(v) => v,
    // Malformed input: fail open, emit nothing.
    Err(e) => {
      let _ = writeln!(io::stderr(), "hook-engine: bad input: {}", e);
      return;
    }
  };
  let event = EditEvent::from(input);

  // Touch git only when a rule actually needs the repo context.
  let ctx = if compiled.needs_repo() {
    EvalContext::from_git()
  } else {
    EvalContext::empty()
  };

  let verdict = engine::evaluate(&event, &compiled, &ctx);
  if let Some(json) = engine::render(&verdict, &compiled) {
    let _ = io::stdout().write_all(json.as_bytes());
  }
}
