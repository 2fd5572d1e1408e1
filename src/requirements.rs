use crate::error::{Error, Result};
use crate::glpi::de;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::Path;

/// One named slot of the requirements file.
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub name: String,
    pub cpu_count: u32,
    pub core_count: u32,
    pub ram_mb: u64,
    pub gpu_model: Option<String>,
    pub nic_model: Option<String>,
    /// Sorted ascending by `min_size_mb`.
    pub disks: Vec<DiskRequirement>,
    pub window: Option<Window>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DiskRequirement {
    #[serde(rename = "storage", alias = "min_size_mb")]
    pub min_size_mb: u64,
    #[serde(default, deserialize_with = "de::optional_string_lenient")]
    pub disk_type: Option<String>,
}

/// Inclusive time span the machine is wanted for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Window {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Window {
    /// True if either end of this window falls inside `[begin, end]`.
    pub fn collides_with(&self, begin: NaiveDateTime, end: NaiveDateTime) -> bool {
        (begin <= self.start && self.start <= end) || (begin <= self.end && self.end <= end)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRequirement {
    #[serde(alias = "cpu_count")]
    cpu: u32,
    #[serde(alias = "core_count")]
    cores: u32,
    #[serde(alias = "ram_mb")]
    ram: u64,
    #[serde(default, alias = "gpu_model", deserialize_with = "de::optional_string_lenient")]
    gpu: Option<String>,
    #[serde(default, alias = "nic_model", deserialize_with = "de::optional_string_lenient")]
    nic: Option<String>,
    #[serde(default)]
    disks: Option<Vec<DiskRequirement>>,
    #[serde(default, deserialize_with = "de::optional_datetime")]
    start: Option<NaiveDateTime>,
    #[serde(default, deserialize_with = "de::optional_datetime")]
    end: Option<NaiveDateTime>,
}

impl RawRequirement {
    fn validate(self, name: String) -> Result<Requirement> {
        let invalid = |reason: &str| Error::InvalidRequirement {
            name: name.clone(),
            reason: reason.to_string(),
        };

        if self.cpu == 0 {
            return Err(invalid("cpu must be at least 1"));
        }
        if self.cores == 0 {
            return Err(invalid("cores must be at least 1"));
        }
        if self.ram == 0 {
            return Err(invalid("ram must be at least 1 MB"));
        }

        let window = match (self.start, self.end) {
            (None, None) => None,
            (Some(start), Some(end)) if start <= end => Some(Window { start, end }),
            (Some(_), Some(_)) => return Err(invalid("end is before start")),
            _ => return Err(invalid("start and end must be given together")),
        };

        let mut disks = self.disks.unwrap_or_default();
        disks.sort_by_key(|disk| disk.min_size_mb);

        Ok(Requirement {
            name,
            cpu_count: self.cpu,
            core_count: self.cores,
            ram_mb: self.ram,
            gpu_model: self.gpu.filter(|model| !model.is_empty()),
            nic_model: self.nic.filter(|model| !model.is_empty()),
            disks,
            window,
        })
    }
}

fn requirement_name(key: &Value) -> Result<String> {
    match key {
        Value::String(name) => Ok(name.clone()),
        Value::Number(number) => Ok(number.to_string()),
        other => Err(Error::InvalidRequirement {
            name: format!("{:?}", other),
            reason: "requirement names must be strings".to_string(),
        }),
    }
}

/// Parses a requirements document, keeping the order of the file.
pub fn parse_requirements(contents: &str) -> Result<Vec<Requirement>> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mapping: Mapping = serde_yaml::from_str(contents)?;

    mapping
        .into_iter()
        .map(|(key, value)| {
            let name = requirement_name(&key)?;
            let raw: RawRequirement =
                serde_yaml::from_value(value).map_err(|e| Error::InvalidRequirement {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            raw.validate(name)
        })
        .collect()
}

pub fn load_requirements(path: &Path) -> Result<Vec<Requirement>> {
    log::info!("Parsing requirements file {}", path.display());
    let contents = fs::read_to_string(path)?;
    let requirements = parse_requirements(&contents)?;
    if requirements.is_empty() {
        return Err(Error::NoRequirements(path.display().to_string()));
    }
    log::info!("Parsed {} requirements", requirements.len());
    Ok(requirements)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
web:
  cpu: 1
  cores: 4
  ram: 16000
db:
  cpu_count: 2
  core_count: 32
  ram_mb: 256000
  gpu: A100
  nic: ConnectX-6
  disks:
    - storage: 500
    - storage: 100
      disk_type: nvme
  start: "2024-06-01 08:00:00"
  end: "2024-06-07 18:00:00"
"#;

    #[test]
    fn test_parse_keeps_file_order_and_aliases() {
        let requirements = parse_requirements(SAMPLE).unwrap();
        assert_eq!(requirements.len(), 2);
        assert_eq!(requirements[0].name, "web");
        assert_eq!(requirements[0].core_count, 4);
        assert!(requirements[0].window.is_none());
        assert!(requirements[0].disks.is_empty());

        let db = &requirements[1];
        assert_eq!(db.name, "db");
        assert_eq!(db.cpu_count, 2);
        assert_eq!(db.ram_mb, 256000);
        assert_eq!(db.gpu_model.as_deref(), Some("A100"));
        assert_eq!(db.nic_model.as_deref(), Some("ConnectX-6"));
        assert!(db.window.is_some());
    }

    #[test]
    fn test_disks_sorted_ascending() {
        let requirements = parse_requirements(SAMPLE).unwrap();
        let sizes: Vec<u64> = requirements[1].disks.iter().map(|d| d.min_size_mb).collect();
        assert_eq!(sizes, vec![100, 500]);
        assert_eq!(requirements[1].disks[0].disk_type.as_deref(), Some("nvme"));
    }

    #[test]
    fn test_missing_required_key_names_requirement() {
        let err = parse_requirements("broken:\n  cpu: 1\n  ram: 100\n").unwrap_err();
        match err {
            Error::InvalidRequirement { name, reason } => {
                assert_eq!(name, "broken");
                assert!(reason.contains("cores"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_zero_counts_rejected() {
        assert!(parse_requirements("r:\n  cpu: 0\n  cores: 1\n  ram: 1\n").is_err());
        assert!(parse_requirements("r:\n  cpu: 1\n  cores: 1\n  ram: 0\n").is_err());
    }

    #[test]
    fn test_half_open_or_inverted_window_rejected() {
        let only_start = "r:\n  cpu: 1\n  cores: 1\n  ram: 1\n  start: 2024-01-02 00:00:00\n";
        assert!(parse_requirements(only_start).is_err());

        let inverted =
            "r:\n  cpu: 1\n  cores: 1\n  ram: 1\n  start: 2024-01-02\n  end: 2024-01-01\n";
        assert!(parse_requirements(inverted).is_err());
    }

    #[test]
    fn test_numeric_models_are_stringified() {
        let contents = "r:\n  cpu: 1\n  cores: 1\n  ram: 1\n  gpu: 4090\n  \
                        disks:\n    - storage: 100\n      disk_type: 970\n";
        let requirements = parse_requirements(contents).unwrap();
        assert_eq!(requirements[0].gpu_model.as_deref(), Some("4090"));
        assert_eq!(requirements[0].disks[0].disk_type.as_deref(), Some("970"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(parse_requirements("r:\n  cpu: 1\n  cores: 1\n  ram: 1\n  gpus: A100\n").is_err());
    }

    #[test]
    fn test_window_collision() {
        let at = |day: u32| {
            chrono::NaiveDate::from_ymd_opt(2024, 1, day)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        };
        let window = Window { start: at(10), end: at(12) };
        assert!(window.collides_with(at(1), at(20)));
        assert!(window.collides_with(at(11), at(15)));
        assert!(window.collides_with(at(5), at(10)));
        assert!(!window.collides_with(at(13), at(15)));
        assert!(!window.collides_with(at(1), at(9)));
    }
}
