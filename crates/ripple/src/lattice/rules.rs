//! Per-cell update and classification rules.
//!
//! Every function here is pure: it reads committed state through shared
//! slices and returns the new quantity for a single cell. The scheduler is
//! responsible for making sure the slices it reads are not being written by
//! the same pass.

use glam::DVec2;

use super::topology::{Direction, Topology};

/// Pixel index used when a neighbor is heavier.
pub const WHITE: u8 = 255;
/// Pixel index used when a neighbor is lighter.
pub const BLACK: u8 = 0;
/// Pixel index of a cell hosting a particle (saturated end of the palette).
pub const SATURATED: u8 = 255;

/// New velocity under the averaged neighbor-coupling rule.
///
/// force = mean(neighbor.value - value), acceleration = force / mass,
/// velocity' = velocity * gain + acceleration. A cell without neighbors
/// (1×1 clamped lattice) feels no force.
#[inline]
pub fn calc_velocity(
    topology: &Topology,
    value: &[f64],
    idx: usize,
    velocity: f64,
    mass: f64,
    gain: f64,
) -> f64 {
    let here = value[idx];
    let (sum, count) = topology
        .neighbors(idx)
        .fold((0.0, 0usize), |(sum, count), n| (sum + (value[n] - here), count + 1));
    let force = if count == 0 { 0.0 } else { sum / count as f64 };
    velocity * gain + force / mass
}

/// New value after integrating one step of velocity.
#[inline]
pub fn calc_value(value: f64, velocity: f64) -> f64 {
    value + velocity
}

/// Un-averaged neighbor force: sum of (neighbor.value - value).
#[inline]
pub fn perturbation_force(topology: &Topology, value: &[f64], idx: usize) -> f64 {
    let here = value[idx];
    topology.neighbors(idx).fold(0.0, |sum, n| sum + (value[n] - here))
}

/// Central-difference gradient of `value` at `idx`.
///
/// x grows east, y grows south. A missing neighbor (clamped edge) mirrors
/// the cell's own value.
#[inline]
pub fn gradient(topology: &Topology, value: &[f64], idx: usize) -> DVec2 {
    let here = value[idx];
    let at = |dir| topology.neighbor(idx, dir).map_or(here, |n| value[n]);
    DVec2::new(
        (at(Direction::East) - at(Direction::West)) * 0.5,
        (at(Direction::South) - at(Direction::North)) * 0.5,
    )
}

/// Gray level of a field value: clamp(10·value + 128) truncated to 0..=255.
#[inline]
pub fn gray(value: f64) -> u8 {
    (10.0 * value + 128.0).clamp(0.0, 255.0) as u8
}

/// Pixel index for a cell.
///
/// Neighbors are visited north, south, west, east; the first one with a
/// strictly larger mass yields [`WHITE`], the first with a strictly smaller
/// mass yields [`BLACK`]. Without any mass step the gray rule applies.
#[inline]
pub fn classify(topology: &Topology, mass: &[f64], value: f64, idx: usize) -> u8 {
    let own = mass[idx];
    for n in topology.neighbors(idx) {
        if mass[n] > own {
            return WHITE;
        }
        if mass[n] < own {
            return BLACK;
        }
    }
    gray(value)
}
