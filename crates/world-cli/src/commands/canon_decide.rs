use crate::config::EngineConfig;
use crate::support::{fail, load_canon_or_exit, policy_or_exit, read_json_or_exit};
use world_canon::evaluate_shotlist;
use world_contracts::ShotList;

/// Prints the canonical decision artifact; exits 1 on deny.
pub fn run(config: &EngineConfig, shotlist: String, canon: Option<String>, policy: Option<String>) {
    let shotlist = ShotList::from_value(&read_json_or_exit(&shotlist))
        .unwrap_or_else(|e| fail(format!("invalid ShotList: {e}")));
    let canon = canon.as_deref().map(load_canon_or_exit);
    let policy = policy_or_exit(config, policy.as_deref());

    let decision =
        evaluate_shotlist(&shotlist, canon.as_ref(), &policy).unwrap_or_else(|e| fail(e));
    let rendered = decision.to_canonical_json().unwrap_or_else(|e| fail(e));
    print!("{rendered}");
    if !decision.is_allowed() {
        std::process::exit(1);
    }
}
