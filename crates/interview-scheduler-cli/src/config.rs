//! TOML-based CLI configuration.
//!
//! Stores scheduler switches, utility model overrides and output options.
//!
//! Configuration is stored at `~/.config/interview-scheduler/config.toml`
//! (`interview-scheduler-dev` when `INTERVIEW_SCHEDULER_ENV=dev`).

use std::path::PathBuf;

use interview_scheduler_core::{SchedulerConfig, DEFAULT_EMPTY_UTILITY};
use serde::{Deserialize, Serialize};

/// Scheduler section: pipeline switches plus values consumed at build time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    #[serde(default = "default_empty_utility")]
    pub empty_utility: u64,
    /// Rank for unranked companies; 0 derives it from the input.
    #[serde(default)]
    pub unranked_rank: u32,
    #[serde(flatten)]
    pub pipeline: SchedulerConfig,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_true")]
    pub pretty: bool,
    /// Audit occupancy invariants after every command that mutates a schedule.
    #[serde(default = "default_true")]
    pub check_invariants: bool,
}

/// CLI configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerSettings,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_empty_utility() -> u64 {
    DEFAULT_EMPTY_UTILITY
}
fn default_true() -> bool {
    true
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            empty_utility: default_empty_utility(),
            unranked_rank: 0,
            pipeline: SchedulerConfig::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            check_invariants: true,
        }
    }
}

/// Returns `~/.config/interview-scheduler[-dev]/` based on INTERVIEW_SCHEDULER_ENV.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("INTERVIEW_SCHEDULER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("interview-scheduler-dev")
    } else {
        base_dir.join("interview-scheduler")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

fn unknown_key(key: &str) -> String {
    format!("unknown config key '{key}' (keys live under scheduler.* and output.*)")
}

impl Config {
    /// Node at a dotted key such as `scheduler.compact`.
    fn lookup<'a>(root: &'a serde_json::Value, key: &str) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }
        key.split('.').try_fold(root, |node, part| node.get(part))
    }

    /// Replace the leaf at `key`, parsing `raw` as the type already stored
    /// there. New keys are never created.
    fn assign(
        root: &mut serde_json::Value,
        key: &str,
        raw: &str,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let (section, leaf) = key.rsplit_once('.').unwrap_or(("", key));
        let table = section
            .split('.')
            .filter(|part| !part.is_empty())
            .try_fold(&mut *root, |node, part| node.get_mut(part))
            .and_then(serde_json::Value::as_object_mut)
            .ok_or_else(|| unknown_key(key))?;
        let slot = table.get_mut(leaf).ok_or_else(|| unknown_key(key))?;

        *slot = match slot {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                raw.parse::<bool>()
                    .map_err(|_| format!("{key} expects true or false, got '{raw}'"))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                raw.parse::<u64>()
                    .map_err(|_| format!("{key} expects a non-negative integer, got '{raw}'"))?
                    .into(),
            ),
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                return Err(format!("{key} is a section, not a setting").into());
            }
            _ => serde_json::Value::String(raw.to_string()),
        };
        Ok(())
    }

    pub fn path() -> Result<PathBuf, Box<dyn std::error::Error>> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Read `config.toml`; a missing file yields the defaults without
    /// creating one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is not valid TOML for this
    /// layout.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let path = Self::path()?;
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(toml::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// Write `config.toml`, creating the config directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or file cannot be written.
    pub fn save(&self) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(Self::path()?, content)?;
        Ok(())
    }

    /// Value of a key like `scheduler.empty_utility` or `output.pretty`,
    /// rendered as it would be typed on the command line.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        match Self::lookup(&json, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Update one scheduler or output setting and persist the file.
    ///
    /// # Errors
    ///
    /// Returns an error for keys outside `scheduler.*`/`output.*`, values of
    /// the wrong type, or a failed save.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), Box<dyn std::error::Error>> {
        let mut json = serde_json::to_value(&*self)?;
        Self::assign(&mut json, key, value)?;
        *self = serde_json::from_value(json)?;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert!(toml_str.contains("[scheduler]"));
        assert!(toml_str.contains("compact = true"));
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[scheduler]\ncompact = false\n").unwrap();
        assert!(!parsed.scheduler.pipeline.compact);
        assert!(parsed.scheduler.pipeline.coffee_chats);
        assert_eq!(parsed.scheduler.empty_utility, DEFAULT_EMPTY_UTILITY);
        assert!(parsed.output.pretty);
    }

    #[test]
    fn get_walks_flattened_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("scheduler.compact").as_deref(), Some("true"));
        assert_eq!(cfg.get("scheduler.empty_utility").as_deref(), Some("1000"));
        assert_eq!(cfg.get("scheduler.unranked_rank").as_deref(), Some("0"));
        assert!(cfg.get("scheduler.nope").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_by_path_respects_existing_types() {
        let mut json = serde_json::to_value(Config::default()).unwrap();
        Config::assign(&mut json, "output.pretty", "false").unwrap();
        Config::assign(&mut json, "scheduler.unranked_rank", "7").unwrap();
        assert!(Config::assign(&mut json, "output.pretty", "maybe").is_err());
        let err = Config::assign(&mut json, "output.colour", "red").unwrap_err();
        assert!(err.to_string().contains("scheduler.* and output.*"));
        assert!(Config::assign(&mut json, "scheduler", "1").is_err());

        let cfg: Config = serde_json::from_value(json).unwrap();
        assert!(!cfg.output.pretty);
        assert_eq!(cfg.scheduler.unranked_rank, 7);
    }
}
