use crate::support::{fail, read_json_or_exit, write_text_or_exit};
use world_adapt::{AdaptError, adapt_value};
use world_contracts::canonical_json_pretty;

pub fn run(script: String, output: String) {
    let document = read_json_or_exit(&script);
    let shotlist = match adapt_value(&document) {
        Ok(shotlist) => shotlist,
        Err(AdaptError::InvalidScript(err)) => fail(format!("invalid Script: {err}")),
        Err(err) => fail(err),
    };
    let rendered = canonical_json_pretty(&shotlist).unwrap_or_else(|e| fail(e));
    write_text_or_exit(&output, &rendered);
    tracing::info!(
        shotlist_id = %shotlist.shotlist_id,
        shots = shotlist.shots.len(),
        path = %output,
        "shotlist written"
    );
    println!("OK: shotlist written {output}");
}
