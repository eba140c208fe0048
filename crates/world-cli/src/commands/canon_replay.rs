use crate::config::EngineConfig;
use crate::support::fail;
use world_store::ProjectCanonStore;

/// Prints the replayed canon in canonical form.
pub fn run(config: &EngineConfig, project: String, upto: String) {
    let store = ProjectCanonStore::new(&config.store.root);
    let canon = store.replay(&project, &upto).unwrap_or_else(|e| fail(e));
    let rendered = canon.to_canonical_json().unwrap_or_else(|e| fail(e));
    print!("{rendered}");
}
