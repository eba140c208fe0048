use crate::support::{fail, read_json_or_exit};
use world_contracts::{SchemaId, validate};

pub fn run(script: String) {
    let result = validate(&read_json_or_exit(&script), SchemaId::ScriptV1);
    match result.into_result() {
        Ok(()) => println!("OK: Script valid"),
        Err(err) => fail(format!("invalid Script: {err}")),
    }
}
