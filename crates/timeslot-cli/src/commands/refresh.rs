use chrono::Utc;

use crate::common::{open_service, print_json, CmdResult};

pub fn run(json: bool) -> CmdResult {
    let (_, service) = open_service()?;
    let report = service.refresh(Utc::now());

    if json {
        print_json(&report)?;
    } else if report.changed {
        println!("resets applied ({} slots)", report.slots.len());
    } else {
        println!("no resets due ({} slots)", report.slots.len());
    }

    match report.error {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
