//! ruleset-check: validate hook rule-set files before deploying them.
//!
//! Usage:
//!   ruleset-check <ruleset.toml>...      # report every configuration error
//!   ruleset-check <ruleset.toml>... -q   # quiet: exit code only
//!
//! The engine itself fails open and merely skips bad rules at runtime; this
//! tool surfaces those skips ahead of time so a broken pattern never ships.
//! Exit codes: 0 all rules valid, 1 at least one rule would be skipped,
//! 2 a file could not be read or parsed at all.

use std::env;
use std::path::Path;
use std::process;

use hook_engine::RuleSet;

fn main() {
    let args: Vec<String> = env::args().collect();
    let quiet = args.iter().any(|a| a == "-q" || a == "--quiet");
    let files: Vec<_> = args.iter().filter(|a| !a.starts_with('-')).skip(1).collect();

    if files.is_empty() {
        eprintln!("Usage: ruleset-check <ruleset.toml>... [-q|--quiet]");
        eprintln!("  -q  Quiet: only exit code (0=valid, 1=bad rules, 2=unreadable)");
        process::exit(2);
    }

    let mut skipped = 0usize;
    for path in &files {
        let ruleset = match RuleSet::load(Path::new(path.as_str())) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("ruleset-check: {}: {}", path, e);
                process::exit(2);
            }
        };
        let name = ruleset.name.clone();
        let (compiled, errors) = ruleset.compile();
        skipped += errors.len();

        if !quiet {
            println!(
                "{}: {} rule(s) ok, {} skipped",
                name,
                compiled.rules.len(),
                errors.len()
            );
            for e in &errors {
                println!("  ! {}", e);
            }
        }
    }

    process::exit(if skipped > 0 { 1 } else { 0 });
}
