//! Error types for the lattice engine.

use thiserror::Error;

/// Errors raised while building or driving a simulation.
///
/// Per-cell update rules never fail; everything here is reported either at
/// construction time or at the boundary where callers hand data in.
#[derive(Debug, Error)]
pub enum Error {
    /// Width or height was zero.
    #[error("lattice dimensions must be positive, got {width}x{height}")]
    InvalidDimensions {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// Cell mass (inertial weight) must be positive and finite.
    #[error("cell mass must be positive and finite, got {0}")]
    InvalidMass(f64),

    /// Gain must lie in (0, 1].
    #[error("gain must be in (0, 1], got {0}")]
    InvalidGain(f64),

    /// Particle mass must be non-negative and finite.
    #[error("particle mass must be non-negative and finite, got {0}")]
    InvalidParticleMass(f64),

    /// The coupling constant c² must be positive and finite.
    #[error("c^2 must be positive and finite, got {0}")]
    InvalidCouplingConstant(f64),

    /// A worker pool was configured with zero workers.
    #[error("{pass} pool needs at least one worker")]
    EmptyPool {
        /// Name of the pass the pool serves.
        pass: &'static str,
    },

    /// Frames must be sampled at least every step.
    #[error("steps per frame must be at least 1")]
    ZeroStepsPerFrame,

    /// A buffer handed in does not match the lattice size.
    #[error("buffer length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        /// Length the lattice requires.
        expected: usize,
        /// Length actually supplied.
        got: usize,
    },

    /// Palettes hold between 1 and 256 colors.
    #[error("palette must hold 1..=256 colors, got {0}")]
    InvalidPalette(usize),

    /// A coordinate fell outside the lattice.
    #[error("coordinate ({x}, {y}) is outside the {width}x{height} lattice")]
    OutOfBounds {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
        /// Lattice width.
        width: usize,
        /// Lattice height.
        height: usize,
    },

    /// A second particle was placed into an occupied cell.
    #[error("cell ({x}, {y}) already hosts a particle")]
    CellOccupied {
        /// Column.
        x: usize,
        /// Row.
        y: usize,
    },

    /// Particles need a coupling constant to interact with the field.
    #[error("particles require a particle coupling in the simulation config")]
    CouplingDisabled,

    /// Lattice parameters are frozen once the first step has run.
    #[error("lattice cannot be modified after step {0} has run")]
    AlreadyStarted(usize),

    /// The rayon pool for a pass could not be built.
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    /// Reading or writing a config file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON config could not be (de)serialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML config could not be (de)serialized.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
