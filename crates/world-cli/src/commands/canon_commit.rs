use crate::config::EngineConfig;
use crate::support::{fail, read_json_or_exit};
use world_store::{CommitOutcome, ProjectCanonStore};

pub fn run(config: &EngineConfig, project: String, diff: String, episode_id: String, episode_seq: u64) {
    let diff = read_json_or_exit(&diff);
    let store = ProjectCanonStore::new(&config.store.root);

    match store.commit(&project, &diff, &episode_id, episode_seq) {
        Ok(CommitOutcome::Committed { entry, .. }) => {
            println!(
                "OK: canon committed {project} {:04}_{episode_id} {}",
                entry.sequence_number, entry.resulting_snapshot_sha256
            );
        }
        Ok(CommitOutcome::Rejected(errors)) => {
            for error in &errors {
                println!("  {error}");
            }
            fail(format!("canon diff rejected ({} error(s))", errors.len()));
        }
        Err(err) => fail(err),
    }
}
