use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::datetime::parse_timezone;
use crate::task::Priority;

/// Suggested subjects offered by the `subjects` command. A convenience
/// list only; tasks accept any non-empty subject.
pub const DEFAULT_SUBJECTS: [&str; 11] = [
    "Mathematics",
    "Computer Science",
    "Physics",
    "Chemistry",
    "Biology",
    "Literature",
    "History",
    "Economics",
    "Psychology",
    "Engineering",
    "Other",
];

const CONFIG_ENV_VAR: &str = "STUDYRC";
const CONFIG_FILE_NAME: &str = ".studyrc.toml";

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    timezone: Option<String>,
    default_priority: Option<String>,
    color: Option<bool>,
    subjects: Option<Vec<String>>,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Timezone for all day-boundary decisions (urgency, due labels).
    pub timezone: Tz,
    pub default_priority: Priority,
    pub color: bool,
    pub subjects: Vec<String>,
    pub loaded_file: Option<PathBuf>,
}

impl Config {
    /// Resolve and load the config: explicit `--config` path, then the
    /// STUDYRC env var, then `~/.studyrc.toml` if it exists, else
    /// defaults. An explicitly named file must be readable.
    #[tracing::instrument(skip(override_path))]
    pub fn load(override_path: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = override_path {
            return Self::from_file(path);
        }

        if let Ok(raw) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Self::from_file(Path::new(trimmed));
            }
        }

        if let Some(home) = dirs::home_dir() {
            let candidate = home.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Self::from_file(&candidate);
            }
            debug!(config = %candidate.display(), "no config file; using defaults");
        } else {
            warn!("cannot determine home directory; using defaults");
        }

        Self::from_raw(RawConfig::default(), None)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        info!(config = %path.display(), "loading config");
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let raw: RawConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Self::from_raw(raw, Some(path.to_path_buf()))
    }

    fn from_raw(raw: RawConfig, loaded_file: Option<PathBuf>) -> anyhow::Result<Self> {
        let timezone = match raw.timezone {
            Some(name) => parse_timezone(&name).context("invalid timezone in config")?,
            None => chrono_tz::UTC,
        };

        let default_priority = match raw.default_priority {
            Some(name) => Priority::parse(&name).ok_or_else(|| {
                anyhow!("invalid default_priority: {name} (expected high, medium, or low)")
            })?,
            None => Priority::Medium,
        };

        let subjects = raw
            .subjects
            .unwrap_or_else(|| DEFAULT_SUBJECTS.iter().map(ToString::to_string).collect());

        Ok(Self {
            timezone,
            default_priority,
            color: raw.color.unwrap_or(true),
            subjects,
            loaded_file,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::{Config, DEFAULT_SUBJECTS};
    use crate::task::Priority;

    fn config_from(contents: &str) -> anyhow::Result<Config> {
        let mut file = NamedTempFile::new().expect("tempfile");
        file.write_all(contents.as_bytes()).expect("write config");
        file.flush().expect("flush config");
        Config::from_file(file.path())
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = config_from("").expect("load empty config");

        assert_eq!(cfg.timezone, chrono_tz::UTC);
        assert_eq!(cfg.default_priority, Priority::Medium);
        assert!(cfg.color);
        assert_eq!(cfg.subjects.len(), DEFAULT_SUBJECTS.len());
        assert!(cfg.loaded_file.is_some());
    }

    #[test]
    fn reads_all_keys() {
        let cfg = config_from(
            r#"
            timezone = "Europe/Berlin"
            default_priority = "high"
            color = false
            subjects = ["Algebra", "Topology"]
            "#,
        )
        .expect("load config");

        assert_eq!(cfg.timezone.name(), "Europe/Berlin");
        assert_eq!(cfg.default_priority, Priority::High);
        assert!(!cfg.color);
        assert_eq!(cfg.subjects, vec!["Algebra", "Topology"]);
    }

    #[test]
    fn rejects_bad_timezone_and_priority() {
        assert!(config_from(r#"timezone = "Atlantis/Lost""#).is_err());
        assert!(config_from(r#"default_priority = "urgent""#).is_err());
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(config_from("timezone = ").is_err());
    }
}
