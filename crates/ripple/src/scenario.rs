//! Ready-made scenarios.
//!
//! The lens scenario is laid out on a 501×501 reference lattice and scaled
//! to whatever size the config asks for. Time constants are not scaled.

use std::f64::consts::PI;

use crate::config::SimulationConfig;
use crate::error::Result;
use crate::simulation::Simulation;

/// Reference lattice extent the lens geometry is described on.
const REFERENCE_EXTENT: f64 = 500.0;
/// Lens discs: centers and radius on the reference lattice.
const LENS_LEFT: (f64, f64) = (170.0, 250.0);
const LENS_RIGHT: (f64, f64) = (330.0, 250.0);
const LENS_RADIUS: f64 = 100.0;
/// Mass factor inside the lens.
const LENS_DENSITY: f64 = 2.0;
/// Depth of the damped bands along the top and bottom edges.
const BAND_DEPTH: f64 = 100.0;
/// Mass and gain factor inside the damped bands.
const BAND_DAMPING: f64 = 0.99;
/// Source row on the reference lattice.
const SOURCE_ROW: f64 = 250.0;
/// Source half-period and active duration, in steps.
const SOURCE_HALF_PERIOD: f64 = 100.0;
const SOURCE_STEPS: usize = 300;

/// Velocity injected by the west-edge source at `step`.
pub fn lens_source(step: usize) -> f64 {
    if step < SOURCE_STEPS {
        (step as f64 * (PI / SOURCE_HALF_PERIOD)).sin()
    } else {
        0.0
    }
}

/// Biconvex lens with damped top/bottom bands and a plane-wave source.
///
/// - cells inside both discs (the lens) get twice the mass
/// - cells within the top and bottom bands get mass and gain × 0.99
/// - two adjacent cells on the west edge are driven by [`lens_source`]
pub fn lens(config: SimulationConfig) -> Result<Simulation> {
    let scale_x = (config.width.max(2) - 1) as f64 / REFERENCE_EXTENT;
    let scale_y = (config.height.max(2) - 1) as f64 / REFERENCE_EXTENT;
    let height = config.height;

    let mut sim = Simulation::new(config)?;
    sim.lattice_mut()?.modulate(|x, y, material| {
        let u = x as f64 / scale_x;
        let v = y as f64 / scale_y;
        let inside = |(cx, cy): (f64, f64)| {
            (u - cx) * (u - cx) + (v - cy) * (v - cy) < LENS_RADIUS * LENS_RADIUS
        };
        if inside(LENS_LEFT) && inside(LENS_RIGHT) {
            material.mass *= LENS_DENSITY;
        }
        if v < BAND_DEPTH || REFERENCE_EXTENT - v < BAND_DEPTH {
            material.mass *= BAND_DAMPING;
            material.gain *= BAND_DAMPING;
        }
    })?;

    let row = ((SOURCE_ROW * scale_y).round() as usize).min(height - 1);
    let rows = [row, (row + 1).min(height - 1)];
    log::debug!("lens source on west edge rows {:?}", rows);

    Ok(sim.with_influence(move |step, field| {
        let dv = lens_source(step);
        if dv != 0.0 {
            field.add_velocity(0, rows[0], dv)?;
            if rows[1] != rows[0] {
                field.add_velocity(0, rows[1], dv)?;
            }
        }
        Ok(())
    }))
}
