use crate::config::Settings;
use crate::glpi::types::ReservationDetail;
use crate::glpi::urls::{COMPUTER, NETWORK_EQUIPMENT};
use crate::glpi::{ReservationFilter, Session};
use crate::output::{output_data, print_warning};
use std::fmt::Write;

fn render_reservation(detail: &ReservationDetail) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Reservation {}:", detail.id);
    let _ = writeln!(out, "  User {}: {}", detail.user_id, detail.user_name);
    let _ = writeln!(out, "  {} {}: {}", detail.item_type, detail.item_id, detail.item_name);
    let _ = writeln!(out, "  Begins: {}", detail.begins);
    let _ = writeln!(out, "  Ends: {}", detail.ends);
    match &detail.comment {
        Some(comment) => {
            let _ = writeln!(out, "  Comment: {:?}", comment);
        }
        None => out.push_str("  Comment: N/A\n"),
    }
    out
}

/// json and yaml output must stay parseable, so nothing else goes to stdout.
fn is_machine_readable(format: &str) -> bool {
    matches!(format, "json" | "yaml")
}

fn print_reservations(
    details: &[ReservationDetail],
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        _ if is_machine_readable(format) => output_data(&details, format)?,
        _ if details.is_empty() => println!("\tNo reservations."),
        _ => {
            for detail in details {
                println!("{}", render_reservation(detail));
            }
        }
    }
    Ok(())
}

/// True if the reservation is on a computer or network equipment and the
/// first word of its comment contains `tag`.
pub fn tagged_with(detail: &ReservationDetail, tag: &str) -> bool {
    if detail.item_type != COMPUTER && detail.item_type != NETWORK_EQUIPMENT {
        return false;
    }
    detail
        .comment
        .as_deref()
        .and_then(|comment| comment.split_whitespace().next())
        .is_some_and(|first| first.contains(tag))
}

pub fn handle_reservations_command(
    settings: &Settings,
    identifier: Option<&str>,
    user: Option<&str>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(settings)?;
    let details = session.reservation_details(&ReservationFilter { identifier, user })?;
    drop(session);

    print_reservations(&details, format)
}

pub fn handle_project_command(
    settings: &Settings,
    jira: &str,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let session = Session::open(settings)?;
    let details: Vec<ReservationDetail> = session
        .reservation_details(&ReservationFilter::default())?
        .into_iter()
        .filter(|detail| tagged_with(detail, jira))
        .collect();
    drop(session);

    if details.is_empty() {
        if is_machine_readable(format) {
            log::warn!("No reservations tagged with '{}'", jira);
        } else {
            print_warning(&format!("No reservations tagged with '{}'", jira));
            return Ok(());
        }
    }
    print_reservations(&details, format)
}
