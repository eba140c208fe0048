use crate::support::{fail, read_json_or_exit};
use world_contracts::{SchemaId, validate};

pub fn run(shotlist: String) {
    let result = validate(&read_json_or_exit(&shotlist), SchemaId::ShotListV1);
    match result.into_result() {
        Ok(()) => println!("OK: ShotList valid"),
        Err(err) => fail(format!("invalid ShotList: {err}")),
    }
}
