//! Run configuration.
//!
//! Everything needed to build a [`Simulation`](crate::Simulation) except the
//! influence hook, which is code rather than data. Configs round-trip through
//! JSON and YAML so runs can be described in files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Edge behavior of the lattice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Edge cells simply have fewer neighbors.
    #[default]
    Clamped,
    /// Indices wrap; every cell has exactly four neighbors (torus).
    Periodic,
}

/// Worker counts per pass type.
///
/// Pools are built once per simulation and live for the whole run. Their size
/// is independent of the lattice size.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerPools {
    /// Workers for the field velocity pass.
    pub velocity: usize,
    /// Workers for the field value pass.
    pub value: usize,
    /// Workers shared by the particle velocity, particle value and leap passes.
    pub particle: usize,
    /// Workers for the render (classification) pass.
    pub render: usize,
    /// Minimum number of cells handed to a worker at once.
    pub batch: usize,
}

impl WorkerPools {
    /// Same worker count for every pass.
    pub fn uniform(workers: usize) -> Self {
        Self {
            velocity: workers,
            value: workers,
            particle: workers,
            render: workers,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        for (pass, workers) in [
            ("velocity", self.velocity),
            ("value", self.value),
            ("particle", self.particle),
            ("render", self.render),
        ] {
            if workers == 0 {
                return Err(Error::EmptyPool { pass });
            }
        }
        Ok(())
    }
}

impl Default for WorkerPools {
    fn default() -> Self {
        Self {
            velocity: 4,
            value: 4,
            particle: 2,
            render: 4,
            batch: 256,
        }
    }
}

/// Coupling between embedded particles and the field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParticleCoupling {
    /// Squared signal speed used by relativistic velocity composition.
    pub c_squared: f64,
}

impl Default for ParticleCoupling {
    fn default() -> Self {
        Self { c_squared: 0.25 }
    }
}

/// Complete description of a run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Lattice width (cells along X).
    pub width: usize,
    /// Lattice height (cells along Y).
    pub height: usize,
    /// Inertial weight every cell starts with.
    pub base_mass: f64,
    /// Velocity gain every cell starts with; 1.0 is undamped.
    pub gain: f64,
    /// Edge behavior.
    pub boundary: Boundary,
    /// Worker pool sizes.
    pub pools: WorkerPools,
    /// Number of steps [`Simulation::run`](crate::Simulation::run) performs.
    pub total_steps: usize,
    /// A frame is sampled whenever `step % steps_per_frame == 0`.
    pub steps_per_frame: usize,
    /// Display delay stored on every frame, in hundredths of a second.
    pub frame_delay: u16,
    /// Enables particle coupling. Without it the plain averaged rule is used
    /// and particles cannot be placed.
    pub coupling: Option<ParticleCoupling>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            width: 501,
            height: 501,
            base_mass: 10.0,
            gain: 1.0,
            boundary: Boundary::Clamped,
            pools: WorkerPools::default(),
            total_steps: 10_000,
            steps_per_frame: 20,
            frame_delay: 0,
            coupling: None,
        }
    }
}

impl SimulationConfig {
    /// Config for a `width`×`height` lattice with defaults elsewhere.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Checks every parameter the engine relies on.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidDimensions {
                width: self.width,
                height: self.height,
            });
        }
        if !(self.base_mass.is_finite() && self.base_mass > 0.0) {
            return Err(Error::InvalidMass(self.base_mass));
        }
        if !(self.gain > 0.0 && self.gain <= 1.0) {
            return Err(Error::InvalidGain(self.gain));
        }
        if self.steps_per_frame == 0 {
            return Err(Error::ZeroStepsPerFrame);
        }
        if let Some(coupling) = self.coupling {
            if !(coupling.c_squared.is_finite() && coupling.c_squared > 0.0) {
                return Err(Error::InvalidCouplingConstant(coupling.c_squared));
            }
        }
        self.pools.validate()
    }

    /// Number of frames a full run produces: `ceil(total_steps / steps_per_frame)`.
    pub fn frame_count(&self) -> usize {
        self.total_steps.div_ceil(self.steps_per_frame.max(1))
    }

    /// Save configuration to a JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate configuration from a JSON file.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&json)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn save_yaml(&self, path: impl AsRef<Path>) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Load and validate configuration from a YAML file.
    pub fn load_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&yaml)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_frame_count_rounds_up() {
        let mut config = SimulationConfig::new(8, 8);
        config.total_steps = 500;
        config.steps_per_frame = 20;
        assert_eq!(config.frame_count(), 25);

        config.total_steps = 501;
        assert_eq!(config.frame_count(), 26);

        config.total_steps = 0;
        assert_eq!(config.frame_count(), 0);
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let mut config = SimulationConfig::new(0, 4);
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidDimensions { width: 0, height: 4 })
        ));

        config = SimulationConfig::new(4, 4);
        config.base_mass = 0.0;
        assert!(matches!(config.validate(), Err(Error::InvalidMass(_))));

        config = SimulationConfig::new(4, 4);
        config.gain = 1.5;
        assert!(matches!(config.validate(), Err(Error::InvalidGain(_))));

        config = SimulationConfig::new(4, 4);
        config.steps_per_frame = 0;
        assert!(matches!(config.validate(), Err(Error::ZeroStepsPerFrame)));

        config = SimulationConfig::new(4, 4);
        config.pools.render = 0;
        assert!(matches!(
            config.validate(),
            Err(Error::EmptyPool { pass: "render" })
        ));

        config = SimulationConfig::new(4, 4);
        config.coupling = Some(ParticleCoupling { c_squared: -1.0 });
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidCouplingConstant(_))
        ));
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "width: 32\nheight: 16\nboundary: periodic\npools:\n  velocity: 8\n";
        let config: SimulationConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.width, 32);
        assert_eq!(config.height, 16);
        assert_eq!(config.boundary, Boundary::Periodic);
        assert_eq!(config.pools.velocity, 8);
        assert_eq!(config.pools.value, WorkerPools::default().value);
        assert_eq!(config.base_mass, 10.0);
        assert!(config.coupling.is_none());
    }
}
