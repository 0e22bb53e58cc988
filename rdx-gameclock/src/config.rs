//! Defines the configuration structures for a clock.
//!
//! These structs are designed to be deserialized from a configuration file
//! (TOML, JSON or YAML) using `serde` and the `config` crate, so that a time
//! control can be described outside of application code.

use crate::common::Mode;
use crate::components::stage::StageSpec;
use crate::error::ClockError;
use crate::registry::Preset;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default period between ticks, in milliseconds.
pub const DEFAULT_UPDATE_INTERVAL: u64 = 100;

/// Environment variable prefix for overrides, e.g. `GAMECLOCK_UPDATE_INTERVAL`.
pub const ENV_PREFIX: &str = "GAMECLOCK";

/// The construction-time configuration of a `ClockEngine`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClockConfig {
    /// A human-readable label for the time control.
    #[serde(default)]
    pub name: Option<String>,

    /// The stage table, in configuration order. Defaults to 5 minutes per
    /// player with no increment.
    #[serde(default = "default_stages")]
    pub stages: Vec<StageSpec>,

    /// Milliseconds between ticks while a clock is live.
    #[serde(default = "default_update_interval")]
    pub update_interval: u64,
}

impl ClockConfig {
    /// A configuration with the given stages and default settings otherwise.
    pub fn new(stages: Vec<StageSpec>) -> Self {
        Self {
            stages,
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_update_interval(mut self, millis: u64) -> Self {
        self.update_interval = millis;
        self
    }

    /// Loads a configuration file, letting `GAMECLOCK_*` variables override it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClockError> {
        let config: Self = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the invariants the engine relies on.
    pub fn validate(&self) -> Result<(), ClockError> {
        if self.stages.is_empty() {
            return Err(ClockError::EmptyStages);
        }
        if self.update_interval == 0 {
            return Err(ClockError::InvalidUpdateInterval);
        }
        Ok(())
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(self.update_interval)
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            name: None,
            stages: default_stages(),
            update_interval: default_update_interval(),
        }
    }
}

impl From<Preset> for ClockConfig {
    fn from(preset: Preset) -> Self {
        Self::new(preset.stages).with_name(preset.name)
    }
}

// --- Default value functions for serde ---

fn default_stages() -> Vec<StageSpec> {
    vec![StageSpec::new(Mode::Fischer, 300_000, 0)]
}

fn default_update_interval() -> u64 {
    DEFAULT_UPDATE_INTERVAL
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(extension: &str, contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(extension)
            .tempfile()
            .unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_to_five_minutes_without_increment() {
        let config = ClockConfig::default();
        assert_eq!(config.stages, vec![StageSpec::new(Mode::Fischer, 300_000, 0)]);
        assert_eq!(config.update_interval(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_zero_update_interval() {
        let config = ClockConfig::default().with_update_interval(0);
        assert!(matches!(
            config.validate(),
            Err(ClockError::InvalidUpdateInterval)
        ));
    }

    #[test]
    fn rejects_empty_stage_list() {
        assert!(matches!(
            ClockConfig::new(Vec::new()).validate(),
            Err(ClockError::EmptyStages)
        ));
    }

    #[test]
    fn loads_a_toml_file() {
        let file = write_temp(
            ".toml",
            r#"
name = "Club night"
update_interval = 50

[[stages]]
time = [5400000, 5400000]
mode = "Fischer"
increment = 30000

[[stages]]
move = 40
time = [900000, 900000]
mode = "Fischer"
increment = 30000
"#,
        );
        let config = ClockConfig::load(file.path()).unwrap();
        assert_eq!(config.name.as_deref(), Some("Club night"));
        assert_eq!(config.update_interval, 50);
        assert_eq!(config.stages.len(), 2);
        assert_eq!(config.stages[1].move_number, Some(40));
        assert_eq!(config.stages[1].time, [900_000, 900_000]);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let file = write_temp(".toml", "name = \"Blitz\"\n");
        let config = ClockConfig::load(file.path()).unwrap();
        assert_eq!(config.stages, default_stages());
        assert_eq!(config.update_interval, DEFAULT_UPDATE_INTERVAL);
    }

    #[test]
    fn missing_file_is_a_config_error() {
        let result = ClockConfig::load("/definitely/not/here/clock.toml");
        assert!(matches!(result, Err(ClockError::Config(_))));
    }
}
