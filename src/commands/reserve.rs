use crate::config::Settings;
use crate::glpi::de::DATETIME_FORMAT;
use crate::glpi::Session;
use crate::output::{confirm_action, print_info, print_success};
use crate::reservations::load_reservation_file;
use std::path::Path;

pub fn handle_reserve_command(settings: &Settings, list: &Path, yes: bool) -> Result<(), Box<dyn std::error::Error>> {
    let requests = load_reservation_file(list)?;
    if requests.is_empty() {
        print_info("No servers listed, nothing to reserve.");
        return Ok(());
    }

    for request in &requests {
        println!(
            "\tServer: {} for {} from {} to {}",
            request.server,
            request.username,
            request.begin.format(DATETIME_FORMAT),
            request.end.format(DATETIME_FORMAT)
        );
    }
    if !yes && !confirm_action(&format!("About to create {} reservations.", requests.len())) {
        println!("Cancelled.");
        return Ok(());
    }

    let session = Session::open(settings)?;
    for request in &requests {
        let id = session.reserve(request)?;
        print_success(&format!(
            "Reserved {} for {} (reservation {})",
            request.server, request.username, id
        ));
    }
    Ok(())
}
