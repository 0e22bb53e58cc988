//! A named store of time-control presets.
//!
//! The registry is plain data: it maps a preset name to a stage list and has no
//! timing logic. Each registry is an ordinary value, so independent registries
//! can coexist (one per test, one per user profile, ...).

use crate::common::Mode;
use crate::components::stage::StageSpec;
use crate::error::ClockError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// A named stage list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    pub stages: Vec<StageSpec>,
}

/// The layout of a preset file: a list of `[[presets]]` tables.
#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default)]
    presets: Vec<Preset>,
}

/// Maps preset names to stage lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigRegistry {
    entries: BTreeMap<String, Vec<StageSpec>>,
}

impl ConfigRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry seeded with the standard presets.
    pub fn with_presets() -> Self {
        let mut registry = Self::new();
        for preset in standard_presets() {
            registry.set_config(preset.name, preset.stages);
        }
        registry
    }

    /// Loads a registry from a preset file.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self, ClockError> {
        let mut registry = Self::new();
        registry.merge_file(path)?;
        Ok(registry)
    }

    /// Adds or replaces every preset found in a preset file.
    ///
    /// Returns how many presets the file held.
    pub fn merge_file(&mut self, path: impl AsRef<Path>) -> Result<usize, ClockError> {
        let file: PresetFile = ::config::Config::builder()
            .add_source(::config::File::from(path.as_ref()))
            .build()?
            .try_deserialize()?;
        let count = file.presets.len();
        for preset in file.presets {
            self.set_config(preset.name, preset.stages);
        }
        debug!(count, path = %path.as_ref().display(), "Merged preset file.");
        Ok(count)
    }

    /// Adds a preset, or replaces the one with the same name.
    ///
    /// Returns the replaced stage list, if there was one.
    pub fn set_config(
        &mut self,
        name: impl Into<String>,
        stages: Vec<StageSpec>,
    ) -> Option<Vec<StageSpec>> {
        self.entries.insert(name.into(), stages)
    }

    /// Removes a preset, returning its stage list if it existed.
    pub fn delete_config(&mut self, name: &str) -> Option<Vec<StageSpec>> {
        self.entries.remove(name)
    }

    pub fn get_config(&self, name: &str) -> Option<Preset> {
        self.entries.get(name).map(|stages| Preset {
            name: name.to_string(),
            stages: stages.clone(),
        })
    }

    /// Like `get_config`, but reports unknown names as an error.
    pub fn require(&self, name: &str) -> Result<Preset, ClockError> {
        self.get_config(name)
            .ok_or_else(|| ClockError::UnknownPreset(name.to_string()))
    }

    pub fn list_config_names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn list_config_entries(&self) -> Vec<(&str, &[StageSpec])> {
        self.entries
            .iter()
            .map(|(name, stages)| (name.as_str(), stages.as_slice()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The presets every `with_presets` registry starts with.
pub fn standard_presets() -> Vec<Preset> {
    let preset = |name: &str, stages: Vec<StageSpec>| Preset {
        name: name.to_string(),
        stages,
    };
    vec![
        preset(
            "Fischer Blitz 5|0",
            vec![StageSpec::new(Mode::Fischer, 300_000, 0)],
        ),
        preset(
            "Fischer Rapid 5|5",
            vec![StageSpec::new(Mode::Fischer, 300_000, 5_000)],
        ),
        preset(
            "Fischer Rapid 10|5",
            vec![StageSpec::new(Mode::Fischer, 600_000, 5_000)],
        ),
        preset(
            "Delay Bullet 1|2",
            vec![StageSpec::new(Mode::Delay, 60_000, 2_000)],
        ),
        preset(
            "Bronstein Bullet 1|2",
            vec![StageSpec::new(Mode::Bronstein, 60_000, 2_000)],
        ),
        preset(
            "Hourglass 1",
            vec![StageSpec::new(Mode::Hourglass, 60_000, 0)],
        ),
        preset(
            "Tournament 40/120|5, 60|5",
            vec![
                StageSpec::new(Mode::Delay, 7_200_000, 5_000),
                StageSpec::new(Mode::Delay, 3_600_000, 5_000).starting_at(40),
            ],
        ),
    ]
}
