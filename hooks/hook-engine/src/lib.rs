//! Edit-guard hook engine — declarative rule evaluation for edit/command hooks.
//!
//! Replaces a family of near-duplicate hook scripts with one engine: the host
//! pipes an edit/command event as JSON to stdin, the engine evaluates it
//! against a TOML rule set, and a block/warn verdict (or nothing) comes back
//! on stdout. Deterministic, single-shot, no state across invocations.
//!
//! The only I/O beyond stdin/stdout: read-only filesystem existence checks
//! and git queries for the test-association rules, all fail-open.

pub mod conditions;
pub mod config;
pub mod engine;
pub mod error;
pub mod gitinfo;
pub mod testmap;
pub mod types;

pub use config::{CompiledRuleSet, Condition, Rule, RuleSet};
pub use engine::{evaluate, render, EvalContext};
pub use error::ConfigError;
pub use types::{EditEvent, HookInput, Severity, Verdict, VerdictSeverity};
