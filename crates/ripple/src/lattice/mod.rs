//! Rectangular wave lattice.
//!
//! Cell state is stored as parallel flat arrays (struct-of-arrays) so a pass
//! can hold one array mutably while reading the others:
//! - `value`: field displacement
//! - `velocity`: rate of change of `value`
//! - `mass`: inertial weight, always > 0
//! - `gain`: velocity retention per step, in (0, 1]
//!
//! Cell (x, y) lives at index `y * width + x`.

mod topology;
pub mod rules;

pub use topology::{Direction, Topology};

use crate::config::{Boundary, SimulationConfig};
use crate::error::{Error, Result};

/// Snapshot of one cell's state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub value: f64,
    pub velocity: f64,
    pub mass: f64,
    pub gain: f64,
}

/// Per-cell material parameters, editable through [`Lattice::modulate`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub mass: f64,
    pub gain: f64,
}

/// The field and its static connectivity.
#[derive(Clone, Debug)]
pub struct Lattice {
    pub(crate) topology: Topology,
    pub(crate) value: Vec<f64>,
    pub(crate) velocity: Vec<f64>,
    pub(crate) mass: Vec<f64>,
    pub(crate) gain: Vec<f64>,
}

impl Lattice {
    /// Builds a lattice at rest with uniform mass and unit gain.
    pub fn new(width: usize, height: usize, base_mass: f64, boundary: Boundary) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimensions { width, height });
        }
        check_mass(base_mass)?;

        let cell_count = width * height;
        Ok(Self {
            topology: Topology::new(width, height, boundary),
            value: vec![0.0; cell_count],
            velocity: vec![0.0; cell_count],
            mass: vec![base_mass; cell_count],
            gain: vec![1.0; cell_count],
        })
    }

    /// Builds the lattice described by `config` (dimensions, mass, gain, boundary).
    pub fn from_config(config: &SimulationConfig) -> Result<Self> {
        let mut lattice = Self::new(config.width, config.height, config.base_mass, config.boundary)?;
        check_gain(config.gain)?;
        lattice.gain.fill(config.gain);
        Ok(lattice)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.topology.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.topology.height()
    }

    /// Number of cells.
    #[inline]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    #[inline]
    pub fn boundary(&self) -> Boundary {
        self.topology.boundary()
    }

    #[inline]
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Flat index of (x, y) with bounds checking.
    pub fn try_index(&self, x: usize, y: usize) -> Result<usize> {
        if x < self.width() && y < self.height() {
            Ok(self.topology.index(x, y))
        } else {
            Err(Error::OutOfBounds {
                x,
                y,
                width: self.width(),
                height: self.height(),
            })
        }
    }

    /// Copy of the state at (x, y).
    pub fn cell(&self, x: usize, y: usize) -> Result<Cell> {
        let idx = self.try_index(x, y)?;
        Ok(Cell {
            value: self.value[idx],
            velocity: self.velocity[idx],
            mass: self.mass[idx],
            gain: self.gain[idx],
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.value
    }

    pub fn velocities(&self) -> &[f64] {
        &self.velocity
    }

    pub fn masses(&self) -> &[f64] {
        &self.mass
    }

    pub fn gains(&self) -> &[f64] {
        &self.gain
    }

    /// Sets the value of one cell (initial conditions).
    pub fn set_value(&mut self, x: usize, y: usize, value: f64) -> Result<()> {
        let idx = self.try_index(x, y)?;
        self.value[idx] = value;
        Ok(())
    }

    /// Replaces the whole value map.
    pub fn set_values(&mut self, values: &[f64]) -> Result<()> {
        self.check_len(values.len())?;
        self.value.copy_from_slice(values);
        Ok(())
    }

    /// Replaces the whole velocity map.
    pub fn set_velocities(&mut self, velocities: &[f64]) -> Result<()> {
        self.check_len(velocities.len())?;
        self.velocity.copy_from_slice(velocities);
        Ok(())
    }

    /// Replaces the whole mass map. Every mass must be positive and finite.
    pub fn set_masses(&mut self, masses: &[f64]) -> Result<()> {
        self.check_len(masses.len())?;
        masses.iter().try_for_each(|&m| check_mass(m))?;
        self.mass.copy_from_slice(masses);
        Ok(())
    }

    /// Replaces the whole gain map. Every gain must lie in (0, 1].
    pub fn set_gains(&mut self, gains: &[f64]) -> Result<()> {
        self.check_len(gains.len())?;
        gains.iter().try_for_each(|&g| check_gain(g))?;
        self.gain.copy_from_slice(gains);
        Ok(())
    }

    /// Spatially modulates mass and gain.
    ///
    /// `f` sees every cell once with its coordinates. Results are validated
    /// before anything is written, so a rejected modulation leaves the lattice
    /// untouched.
    pub fn modulate<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(usize, usize, &mut Material),
    {
        let mut mass = self.mass.clone();
        let mut gain = self.gain.clone();
        for idx in 0..self.len() {
            let (x, y) = self.topology.coords(idx);
            let mut material = Material {
                mass: mass[idx],
                gain: gain[idx],
            };
            f(x, y, &mut material);
            check_mass(material.mass)?;
            check_gain(material.gain)?;
            mass[idx] = material.mass;
            gain[idx] = material.gain;
        }
        self.mass = mass;
        self.gain = gain;
        Ok(())
    }

    fn check_len(&self, got: usize) -> Result<()> {
        if got == self.len() {
            Ok(())
        } else {
            Err(Error::LengthMismatch {
                expected: self.len(),
                got,
            })
        }
    }
}

fn check_mass(mass: f64) -> Result<()> {
    if mass.is_finite() && mass > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidMass(mass))
    }
}

fn check_gain(gain: f64) -> Result<()> {
    if gain > 0.0 && gain <= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidGain(gain))
    }
}
