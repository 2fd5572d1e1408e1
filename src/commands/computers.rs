use crate::config::Settings;
use crate::glpi::urls::COMPUTER;
use crate::glpi::Session;
use crate::output::output_data;
use serde_json::Value;

pub fn handle_computers_command(settings: &Settings, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(settings)?;
    let computers: Vec<Value> = session.list_all(&session.urls().endpoint(COMPUTER))?;
    log::info!("Fetched {} computers", computers.len());
    output_data(&computers, format)?;
    Ok(())
}
