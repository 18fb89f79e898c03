//! Embedded particles ("weights") riding on the field.
//!
//! A particle occupies exactly one cell and carries a sub-cell offset in
//! roughly [-0.5, 0.5) per axis. Its lateral velocity and the field velocity
//! of the cell under it are treated as one joint vector `(vx, vy, field)`,
//! and every coupling is applied through [`relativistic_compose`] so no
//! combined speed runs away from the signal speed `c`.
//!
//! Per step, after the field passes:
//! 1. particle velocity: snapshot the origin cell, push the particle down the
//!    field gradient and let the field under it follow the slope
//! 2. particle value: commit the jointly updated field velocity to the cell
//! 3. leap: accumulate offset, cross ±0.5 into a neighbor cell

use glam::{DVec2, DVec3};
use std::ops::{Add, Div};

use crate::lattice::rules;
use crate::lattice::{Direction, Topology};

/// Anything relativistic composition can act on.
pub trait Velocity: Copy + Add<Output = Self> + Div<f64, Output = Self> {
    /// Euclidean speed.
    fn speed(self) -> f64;
}

impl Velocity for f64 {
    #[inline]
    fn speed(self) -> f64 {
        self.abs()
    }
}

impl Velocity for DVec2 {
    #[inline]
    fn speed(self) -> f64 {
        self.length()
    }
}

impl Velocity for DVec3 {
    #[inline]
    fn speed(self) -> f64 {
        self.length()
    }
}

/// `(v1 + v2) / (1 + |v1|·|v2| / c²)`, component-wise.
///
/// Not commutative in general once chained: callers compose the field
/// contribution first and the mass contribution second, as two calls.
#[inline]
pub fn relativistic_compose<V: Velocity>(v1: V, v2: V, c_squared: f64) -> V {
    (v1 + v2) / (1.0 + v1.speed() * v2.speed() / c_squared)
}

/// A particle and its bookkeeping.
#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    /// Fixed mass; drives the self-coupling that makes the particle sit in a well.
    pub mass: f64,
    /// Position inside the current cell, per axis in roughly [-0.5, 0.5).
    pub offset: DVec2,
    /// Lateral velocity in cells per step.
    pub velocity: DVec2,
    pub(crate) cell: usize,
    pub(crate) origin: usize,
    pub(crate) field_velocity: f64,
    pub(crate) leap: (i8, i8),
}

impl Particle {
    pub(crate) fn new(cell: usize, mass: f64, velocity: DVec2) -> Self {
        Self {
            mass,
            offset: DVec2::ZERO,
            velocity,
            cell,
            origin: cell,
            field_velocity: 0.0,
            leap: (0, 0),
        }
    }

    /// Flat index of the cell currently hosting the particle.
    #[inline]
    pub fn cell(&self) -> usize {
        self.cell
    }

    /// Cell the particle occupied when the current step began.
    #[inline]
    pub fn origin(&self) -> usize {
        self.origin
    }

    /// Particle velocity pass for one particle.
    ///
    /// Snapshots the origin cell, then composes the joint vector
    /// `(velocity, field_velocity)` with the slope contribution: the particle
    /// is pushed down the gradient (scaled by c²) and the field under it
    /// moves by the height change along the particle's path.
    pub(crate) fn update_velocity(
        &mut self,
        topology: &Topology,
        value: &[f64],
        field_velocity: &[f64],
        c_squared: f64,
    ) {
        self.origin = self.cell;
        let slope = rules::gradient(topology, value, self.origin);
        let joint = DVec3::new(self.velocity.x, self.velocity.y, field_velocity[self.origin]);
        let push = DVec3::new(
            -slope.x * c_squared,
            -slope.y * c_squared,
            self.velocity.dot(slope),
        );
        let joint = relativistic_compose(joint, push, c_squared);
        self.velocity = DVec2::new(joint.x, joint.y);
        self.field_velocity = joint.z;
    }

    /// Leap planning: accumulate the offset and record which way the particle
    /// crosses each axis. Ownership moves happen when the plan is committed.
    ///
    /// A particle moves at most one cell per axis per step. Travel beyond
    /// that is dropped: the offset is pinned against the face it crossed, so
    /// it always stays inside the cell.
    pub(crate) fn plan_leap(&mut self) {
        self.offset += self.velocity;
        self.leap = (wrap_axis(&mut self.offset.x), wrap_axis(&mut self.offset.y));
    }

    /// Undo the offset wrap on one axis after a rejected leap: the particle
    /// stays pressed against the cell face it tried to cross and stops moving
    /// along that axis.
    pub(crate) fn block_axis(&mut self, axis: usize, step: i8) {
        let edge = if step > 0 { HALF_BELOW } else { -0.5 };
        match axis {
            0 => {
                self.offset.x = edge;
                self.velocity.x = 0.0;
            }
            _ => {
                self.offset.y = edge;
                self.velocity.y = 0.0;
            }
        }
    }
}

/// Just inside the positive cell face.
const HALF_BELOW: f64 = 0.5 - f64::EPSILON;

fn wrap_axis(offset: &mut f64) -> i8 {
    if *offset >= 0.5 {
        *offset = (*offset - 1.0).min(HALF_BELOW);
        1
    } else if *offset < -0.5 {
        *offset = (*offset + 1.0).max(-0.5);
        -1
    } else {
        0
    }
}

/// Destination of a planned leap, walking X first then Y.
///
/// Returns the cell index reached plus, per axis, whether the step was cut
/// off by a clamped edge.
pub(crate) fn leap_target(topology: &Topology, cell: usize, leap: (i8, i8)) -> (usize, [bool; 2]) {
    let mut target = cell;
    let mut blocked = [false; 2];
    let axes = [
        (leap.0, Direction::West, Direction::East),
        (leap.1, Direction::North, Direction::South),
    ];
    for (axis, (step, negative, positive)) in axes.into_iter().enumerate() {
        let dir = match step {
            0 => continue,
            s if s > 0 => positive,
            _ => negative,
        };
        match topology.neighbor(target, dir) {
            Some(next) => target = next,
            None => blocked[axis] = true,
        }
    }
    (target, blocked)
}

/// Field velocity of one cell under particle coupling.
///
/// force = Σ(neighbor.value − value), acceleration = force·c².
/// An empty cell composes its own velocity with that acceleration. A cell
/// under a particle starts from the particle's joint vector, composes the
/// acceleration, then composes the mass self-coupling `-mass·c²`.
#[inline]
pub fn cell_perturbation_velocity(
    topology: &Topology,
    value: &[f64],
    idx: usize,
    velocity: f64,
    occupant: Option<&Particle>,
    c_squared: f64,
) -> f64 {
    let acceleration = rules::perturbation_force(topology, value, idx) * c_squared;
    match occupant {
        None => relativistic_compose(velocity, acceleration, c_squared),
        Some(p) => {
            let joint = DVec3::new(p.velocity.x, p.velocity.y, velocity);
            let joint = relativistic_compose(joint, DVec3::new(0.0, 0.0, acceleration), c_squared);
            let joint =
                relativistic_compose(joint, DVec3::new(0.0, 0.0, -p.mass * c_squared), c_squared);
            joint.z
        }
    }
}
