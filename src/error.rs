use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to decode GLPI response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GLPI returned HTTP {status} for {url}: {body}")]
    Api {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Failed to initialize the GLPI session: {0}")]
    Session(String),

    #[error("Invalid requirement '{name}': {reason}")]
    InvalidRequirement { name: String, reason: String },

    #[error("Requirements file '{0}' defines no requirements")]
    NoRequirements(String),

    #[error("Invalid reservation file: {0}")]
    InvalidReservation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{kind} '{name}' is not present in GLPI")]
    NotFound { kind: &'static str, name: String },
}

impl Error {
    /// True for failures that only concern one computer's sub-records.
    pub fn is_candidate_local(&self) -> bool {
        matches!(self, Error::Decode(_) | Error::Api { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
