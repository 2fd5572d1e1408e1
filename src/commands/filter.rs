use crate::config::Settings;
use crate::filter::{self, FilterOutcome};
use crate::glpi::{Session, Urls};
use crate::output::{output_data, section};
use crate::requirements::load_requirements;
use serde::Serialize;
use std::fmt::Write;
use std::path::Path;

#[derive(Debug, Serialize)]
struct ComputerEntry {
    computer_id: u64,
    computer_name: String,
    computer_link: String,
    total_weight: f64,
}

#[derive(Debug, Serialize)]
struct RequirementReport {
    requirement: String,
    computers: Vec<ComputerEntry>,
}

#[derive(Debug, Serialize)]
struct FilterReport {
    available: Vec<RequirementReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    recommendations: Option<Vec<RequirementReport>>,
    fulfilled: bool,
}

impl FilterReport {
    fn build(outcome: &FilterOutcome, urls: &Urls) -> Self {
        let entry = |candidate: &filter::Candidate| ComputerEntry {
            computer_id: candidate.computer_id,
            computer_name: candidate.computer_name.clone(),
            computer_link: urls.computer_link(candidate.computer_id),
            total_weight: candidate.total_weight,
        };

        FilterReport {
            available: outcome
                .available
                .iter()
                .map(|row| RequirementReport {
                    requirement: row.requirement.clone(),
                    computers: row.candidates.iter().map(entry).collect(),
                })
                .collect(),
            recommendations: outcome.recommendations.as_ref().map(|choices| {
                choices
                    .iter()
                    .map(|choice| RequirementReport {
                        requirement: choice.requirement.clone(),
                        computers: choice.computer.iter().map(entry).collect(),
                    })
                    .collect()
            }),
            fulfilled: outcome.fulfilled(),
        }
    }
}

fn render_rows(out: &mut String, rows: &[RequirementReport]) {
    for row in rows {
        let _ = writeln!(out, "requirement: {}", row.requirement);
        if row.computers.is_empty() {
            out.push_str("\tcomputer_id: None\n\tcomputer_name: None\n\tcomputer_link: None\n");
        }
        for computer in &row.computers {
            let _ = writeln!(out, "\tcomputer_id: {}", computer.computer_id);
            let _ = writeln!(out, "\tcomputer_name: {}", computer.computer_name);
            let _ = writeln!(out, "\tcomputer_link: {}", computer.computer_link);
        }
    }
}

fn render_pretty(report: &FilterReport) -> String {
    let mut out = String::new();
    out.push_str(&section("Available"));
    out.push('\n');
    render_rows(&mut out, &report.available);

    if let Some(recommendations) = &report.recommendations {
        out.push_str(&section("Recommendations"));
        out.push('\n');
        render_rows(&mut out, recommendations);
    }

    let _ = write!(out, "fulfilled: {}", report.fulfilled);
    out
}

pub fn handle_filter_command(
    settings: &Settings,
    list: &Path,
    all: bool,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // Bad requirement files fail before any network traffic.
    let requirements = load_requirements(list)?;

    let session = Session::open(settings)?;
    let outcome = filter::run(&session, &requirements, !all)?;
    let report = FilterReport::build(&outcome, session.urls());
    drop(session);

    match format {
        "json" | "yaml" => output_data(&report, format)?,
        _ => println!("{}", render_pretty(&report)),
    }
    Ok(())
}
