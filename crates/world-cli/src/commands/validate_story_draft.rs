use crate::support::{fail, load_canon_or_exit, read_json_or_exit, write_text_or_exit};
use serde_json::json;
use world_canon::{DraftGateOutcome, validate_draft_value};
use world_contracts::canonical_json_pretty;

pub fn run(draft: String, canon: String, out: Option<String>, json_output: bool) {
    let document = read_json_or_exit(&draft);
    let canon = load_canon_or_exit(&canon);
    let outcome = validate_draft_value(&document, &canon)
        .unwrap_or_else(|e| fail(format!("invalid Script: {e}")));

    let report = match outcome {
        DraftGateOutcome::Consistent => {
            if json_output {
                println!("{}", json!({"ok": true, "violations": []}));
            } else {
                println!("OK: draft consistent with canon");
            }
            return;
        }
        DraftGateOutcome::Violations(report) => report,
    };

    let rendered = canonical_json_pretty(&report).unwrap_or_else(|e| fail(e));
    if let Some(path) = &out {
        write_text_or_exit(path, &rendered);
        tracing::info!(path = %path, violations = report.violations.len(), "violation report written");
    }

    if json_output {
        print!("{rendered}");
        std::process::exit(1);
    }
    for violation in &report.violations {
        println!("  {}", violation.message);
    }
    match &out {
        Some(path) => fail(format!(
            "{} canon violation(s); report written {path}",
            report.violations.len()
        )),
        None => fail(format!("{} canon violation(s)", report.violations.len())),
    }
}
