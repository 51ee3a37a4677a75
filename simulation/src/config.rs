//! File-backed configuration for a simulation run.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use fuel_blend_core::{ConfigurationError, ControlPoint};
use fuel_blend_system_ambient::AmbientTuning;
use fuel_blend_system_emissions::EmissionProfile;
use fuel_blend_system_exhaust::ExhaustTuning;
use serde::{Deserialize, Serialize};

const DEFAULT_VIEWPORT_WIDTH: f32 = 1_280.0;
const DEFAULT_SEED: u64 = 0x0e10_b1e2;

/// Everything required to build a [`crate::Simulation`].
///
/// Every field falls back to its default, so a file only needs to list the
/// values it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Width of the viewport ambient particles are scattered across.
    pub viewport_width: f32,
    /// Seed every random stream is derived from.
    pub seed: u64,
    /// Emission lookup table.
    pub profile: Vec<ControlPoint>,
    /// Exhaust emitter tuning.
    pub exhaust: ExhaustTuning,
    /// Ambient emitter tuning.
    pub ambient: AmbientTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            seed: DEFAULT_SEED,
            profile: EmissionProfile::default().points().to_vec(),
            exhaust: ExhaustTuning::default(),
            ambient: AmbientTuning::default(),
        }
    }
}

impl SimulationConfig {
    /// Reads and parses the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse configuration toml contents")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every section without building anything.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let _ = EmissionProfile::new(self.profile.clone())?;
        self.exhaust.validate()?;
        self.ambient.validate()?;
        if !self.viewport_width.is_finite() || self.viewport_width < 0.0 {
            return Err(ConfigurationError::InvalidTuning {
                field: "viewport_width",
                reason: "must be finite and non-negative".to_owned(),
            });
        }
        Ok(())
    }
}
