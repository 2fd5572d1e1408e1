use crate::error::{Error, Result};
use crate::glpi::de::parse_datetime;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// One reservation to create, with file-level defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRequest {
    pub server: String,
    pub username: String,
    pub begin: NaiveDateTime,
    pub end: NaiveDateTime,
    pub comment: String,
}

#[derive(Debug, Deserialize)]
struct ReservationFile {
    username: Option<String>,
    start: Option<String>,
    end: Option<String>,
    comment: Option<String>,
    jira: Option<String>,
    servers: Mapping,
}

/// Per-server overrides; any field left out falls back to the file level.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ServerOverrides {
    username: Option<String>,
    start: Option<String>,
    end: Option<String>,
    comment: Option<String>,
    epic: Option<String>,
}

fn datetime_field(server: &str, field: &str, value: Option<String>) -> Result<NaiveDateTime> {
    let raw = value.ok_or_else(|| {
        Error::InvalidReservation(format!(
            "server '{}' has no {}; set it globally or for the server",
            server, field
        ))
    })?;
    parse_datetime(&raw).ok_or_else(|| {
        Error::InvalidReservation(format!("server '{}' has an invalid {}: '{}'", server, field, raw))
    })
}

/// The stored comment: the epic tag first so project listings can match on
/// the first word, then the free-form comment.
fn compose_comment(epic: Option<String>, comment: Option<String>) -> String {
    let epic = epic.unwrap_or_default();
    let comment = comment.unwrap_or_default();
    match (epic.is_empty(), comment.is_empty()) {
        (false, false) => format!("{}\n{}", epic, comment),
        (false, true) => epic,
        _ => comment,
    }
}

pub fn parse_reservation_file(contents: &str) -> Result<Vec<ReservationRequest>> {
    let file: ReservationFile = serde_yaml::from_str(contents)?;
    let mut requests = Vec::with_capacity(file.servers.len());

    for (key, value) in file.servers {
        let server = match key {
            Value::String(name) => name,
            other => return Err(Error::InvalidReservation(format!("server names must be strings, got {:?}", other))),
        };
        let overrides: ServerOverrides = match value {
            Value::Null => ServerOverrides::default(),
            value => serde_yaml::from_value(value)
                .map_err(|e| Error::InvalidReservation(format!("server '{}': {}", server, e)))?,
        };

        let username = overrides.username.or_else(|| file.username.clone()).ok_or_else(|| {
            Error::InvalidReservation(format!(
                "server '{}' has no username; set it globally or for the server",
                server
            ))
        })?;
        let begin = datetime_field(&server, "start", overrides.start.or_else(|| file.start.clone()))?;
        let end = datetime_field(&server, "end", overrides.end.or_else(|| file.end.clone()))?;
        if end <= begin {
            return Err(Error::InvalidReservation(format!("server '{}' ends before it starts", server)));
        }
        let comment = compose_comment(
            overrides.epic.or_else(|| file.jira.clone()),
            overrides.comment.or_else(|| file.comment.clone()),
        );

        requests.push(ReservationRequest {
            server,
            username,
            begin,
            end,
            comment,
        });
    }
    Ok(requests)
}

pub fn load_reservation_file(path: &Path) -> Result<Vec<ReservationRequest>> {
    log::info!("Parsing reservation file {}", path.display());
    let contents = fs::read_to_string(path)?;
    parse_reservation_file(&contents)
}
