//! Ripple - Wave Lattice Simulation Library
//!
//! Discretized wave propagation on a rectangular lattice:
//! - 4-neighbor coupling, clamped or periodic edges
//! - per-cell mass (inertial weight) and gain (damping)
//! - optional embedded particles coupled through relativistic velocity
//!   composition
//! - phase-barriered passes on persistent rayon pools, bit-identical results
//!   for any worker count
//! - indexed-color frames sampled every K steps
//!
//! This crate handles simulation only. Encoding frames into a file is up to
//! the caller.
//!
//! # Example
//!
//! ```
//! use ripple::{Simulation, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     width: 32,
//!     height: 24,
//!     total_steps: 60,
//!     steps_per_frame: 20,
//!     ..SimulationConfig::default()
//! };
//!
//! let sim = Simulation::new(config)
//!     .unwrap()
//!     .with_influence(|step, field| {
//!         if step < 10 {
//!             field.add_velocity(0, 12, 0.5)?;
//!         }
//!         Ok(())
//!     });
//!
//! let animation = sim.run().unwrap();
//! assert_eq!(animation.len(), 3);
//! ```

pub mod config;
pub mod error;
pub mod frame;
pub mod lattice;
pub mod particle;
pub mod scenario;
pub mod scheduler;
pub mod simulation;

pub use config::{Boundary, ParticleCoupling, SimulationConfig, WorkerPools};
pub use error::{Error, Result};
pub use frame::{Animation, Frame, Palette};
pub use glam::DVec2;
pub use lattice::{Cell, Direction, Lattice, Material, Topology};
pub use particle::{relativistic_compose, Particle, Velocity};
pub use scheduler::{Pass, PassPool, Scheduler};
pub use simulation::{FieldStats, InfluenceHook, Injector, Simulation};
