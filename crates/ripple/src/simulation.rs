//! Simulation driver.
//!
//! One step:
//! 1. external influence (single-threaded, between passes)
//! 2. velocity pass: every cell's velocity from committed neighbor values
//! 3. value pass: value += velocity
//! 4. particle passes (only when particles exist):
//!    particle velocity -> particle value -> leap
//! 5. render pass, when `step % steps_per_frame == 0`
//!
//! Each pass writes exactly one array and reads only arrays no pass is
//! writing at the same time, so results do not depend on worker counts.

use glam::DVec2;
use std::time::Instant;

use crate::config::SimulationConfig;
use crate::error::{Error, Result};
use crate::frame::{Animation, Frame, Palette};
use crate::lattice::rules;
use crate::lattice::Lattice;
use crate::particle::{self, Particle};
use crate::scheduler::{Pass, Scheduler};

/// Restricted view handed to the influence hook: velocity injection only.
pub struct Injector<'a> {
    lattice: &'a mut Lattice,
}

impl<'a> Injector<'a> {
    pub(crate) fn new(lattice: &'a mut Lattice) -> Self {
        Self { lattice }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.lattice.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.lattice.height()
    }

    /// Adds `dv` to the velocity of cell (x, y).
    pub fn add_velocity(&mut self, x: usize, y: usize, dv: f64) -> Result<()> {
        let idx = self.lattice.try_index(x, y)?;
        self.lattice.velocity[idx] += dv;
        Ok(())
    }
}

/// External influence: called once per step with the step index.
pub type InfluenceHook = Box<dyn FnMut(usize, &mut Injector<'_>) -> Result<()> + Send>;

/// Summary of the field at one moment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FieldStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Σ ½·mass·velocity².
    pub kinetic_energy: f64,
}

/// Lattice, particles, influence hook and sampled frames for one run.
pub struct Simulation {
    config: SimulationConfig,
    lattice: Lattice,
    particles: Vec<Particle>,
    occupancy: Vec<Option<usize>>,
    influence: Option<InfluenceHook>,
    scheduler: Scheduler,
    palette: Palette,
    frames: Vec<Frame>,
    step: usize,
}

impl Simulation {
    /// Validates `config`, builds the lattice and spins up the worker pools.
    pub fn new(config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        let lattice = Lattice::from_config(&config)?;
        let scheduler = Scheduler::new(&config.pools)?;
        let cell_count = lattice.len();
        Ok(Self {
            frames: Vec::with_capacity(config.frame_count()),
            config,
            lattice,
            particles: Vec::new(),
            occupancy: vec![None; cell_count],
            influence: None,
            scheduler,
            palette: Palette::default(),
            step: 0,
        })
    }

    /// Installs the external influence hook.
    pub fn with_influence<F>(mut self, hook: F) -> Self
    where
        F: FnMut(usize, &mut Injector<'_>) -> Result<()> + Send + 'static,
    {
        self.influence = Some(Box::new(hook));
        self
    }

    /// Palette attached to the produced [`Animation`].
    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Mutable lattice access for initial conditions; refused once stepping began.
    pub fn lattice_mut(&mut self) -> Result<&mut Lattice> {
        if self.step > 0 {
            return Err(Error::AlreadyStarted(self.step));
        }
        Ok(&mut self.lattice)
    }

    /// Places a particle at the center of cell (x, y). Returns its id.
    pub fn add_particle(&mut self, x: usize, y: usize, mass: f64, velocity: DVec2) -> Result<usize> {
        if self.config.coupling.is_none() {
            return Err(Error::CouplingDisabled);
        }
        if !(mass.is_finite() && mass >= 0.0) {
            return Err(Error::InvalidParticleMass(mass));
        }
        let cell = self.lattice.try_index(x, y)?;
        if self.occupancy[cell].is_some() {
            return Err(Error::CellOccupied { x, y });
        }
        let id = self.particles.len();
        self.particles.push(Particle::new(cell, mass, velocity));
        self.occupancy[cell] = Some(id);
        Ok(id)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Coordinates of the cell hosting particle `id`.
    pub fn particle_position(&self, id: usize) -> Option<(usize, usize)> {
        self.particles
            .get(id)
            .map(|p| self.lattice.topology().coords(p.cell()))
    }

    /// Id of the particle in cell (x, y), if any.
    pub fn occupant(&self, x: usize, y: usize) -> Option<usize> {
        self.lattice
            .try_index(x, y)
            .ok()
            .and_then(|idx| self.occupancy[idx])
    }

    /// Number of steps performed so far.
    pub fn steps_taken(&self) -> usize {
        self.step
    }

    /// True once `total_steps` steps have run.
    pub fn is_finished(&self) -> bool {
        self.step >= self.config.total_steps
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Advances the simulation by one step.
    ///
    /// Does nothing once `total_steps` steps have run, so a run never holds
    /// more than [`SimulationConfig::frame_count`] frames.
    pub fn step(&mut self) -> Result<()> {
        if self.is_finished() {
            return Ok(());
        }
        let step = self.step;

        if let Some(hook) = self.influence.as_mut() {
            hook(step, &mut Injector::new(&mut self.lattice))?;
        }

        self.velocity_pass();
        self.value_pass();

        if !self.particles.is_empty() {
            self.particle_velocity_pass();
            self.particle_value_pass();
            self.leap_pass();
        }

        if step % self.config.steps_per_frame == 0 {
            self.render_pass()?;
        }

        self.step += 1;
        log::trace!("step {} done", step);
        Ok(())
    }

    /// Runs the remaining steps and hands back the sampled animation.
    pub fn run(mut self) -> Result<Animation> {
        let started = Instant::now();
        log::info!(
            "running {}x{} lattice for {} steps ({} frames, {} particles)",
            self.lattice.width(),
            self.lattice.height(),
            self.config.total_steps,
            self.config.frame_count(),
            self.particles.len()
        );
        while !self.is_finished() {
            self.step()?;
        }
        log::info!(
            "finished {} steps in {:.2?}, {} frames",
            self.step,
            started.elapsed(),
            self.frames.len()
        );
        Ok(self.into_animation())
    }

    /// Consumes the simulation into its frames.
    pub fn into_animation(self) -> Animation {
        Animation::new(self.palette, self.frames)
    }

    /// Field summary. Read-only; safe to call between steps.
    pub fn stats(&self) -> FieldStats {
        let lattice = &self.lattice;
        let n = lattice.len() as f64;
        let mut stats = FieldStats {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
            ..FieldStats::default()
        };
        let mut sum = 0.0;
        for ((&value, &velocity), &mass) in lattice
            .value
            .iter()
            .zip(&lattice.velocity)
            .zip(&lattice.mass)
        {
            stats.min = stats.min.min(value);
            stats.max = stats.max.max(value);
            sum += value;
            stats.kinetic_energy += 0.5 * mass * velocity * velocity;
        }
        stats.mean = sum / n;
        stats
    }

    fn velocity_pass(&mut self) {
        let Lattice {
            topology,
            value,
            velocity,
            mass,
            gain,
        } = &mut self.lattice;
        let (topology, value, mass, gain) = (&*topology, &*value, &*mass, &*gain);

        match self.config.coupling {
            None => self.scheduler.run(Pass::Velocity, velocity, |i, v| {
                *v = rules::calc_velocity(topology, value, i, *v, mass[i], gain[i]);
            }),
            Some(coupling) => {
                let particles = &self.particles;
                let occupancy = &self.occupancy;
                self.scheduler.run(Pass::Velocity, velocity, |i, v| {
                    let occupant = occupancy[i].map(|k| &particles[k]);
                    *v = particle::cell_perturbation_velocity(
                        topology,
                        value,
                        i,
                        *v,
                        occupant,
                        coupling.c_squared,
                    );
                });
            }
        }
    }

    fn value_pass(&mut self) {
        let velocity = &self.lattice.velocity;
        self.scheduler.run(Pass::Value, &mut self.lattice.value, |i, v| {
            *v = rules::calc_value(*v, velocity[i]);
        });
    }

    fn particle_velocity_pass(&mut self) {
        let Some(coupling) = self.config.coupling else {
            return;
        };
        let lattice = &self.lattice;
        self.scheduler.run(Pass::ParticleVelocity, &mut self.particles, |_, p| {
            p.update_velocity(
                &lattice.topology,
                &lattice.value,
                &lattice.velocity,
                coupling.c_squared,
            );
        });
    }

    /// Commits each particle's jointly updated field velocity to its origin cell.
    fn particle_value_pass(&mut self) {
        let particles = &self.particles;
        let occupancy = &self.occupancy;
        self.scheduler.run(Pass::ParticleValue, &mut self.lattice.velocity, |i, v| {
            if let Some(k) = occupancy[i] {
                *v = particles[k].field_velocity;
            }
        });
    }

    /// Plans every leap in parallel, then commits ownership moves in particle
    /// id order. A move into an occupied cell or off a clamped edge is
    /// rejected and the particle stays put.
    fn leap_pass(&mut self) {
        self.scheduler
            .run(Pass::Leap, &mut self.particles, |_, p| p.plan_leap());

        let topology = &self.lattice.topology;
        for id in 0..self.particles.len() {
            let p = &mut self.particles[id];
            if p.leap == (0, 0) {
                continue;
            }
            let (target, blocked) = particle::leap_target(topology, p.cell, p.leap);
            for (axis, step) in [p.leap.0, p.leap.1].into_iter().enumerate() {
                if blocked[axis] {
                    p.block_axis(axis, step);
                }
            }
            if target == p.cell {
                continue;
            }
            if let Some(other) = self.occupancy[target] {
                log::debug!(
                    "step {}: particle {} blocked by particle {} at {:?}",
                    self.step,
                    id,
                    other,
                    topology.coords(target)
                );
                let leap = p.leap;
                for (axis, step) in [leap.0, leap.1].into_iter().enumerate() {
                    if step != 0 && !blocked[axis] {
                        p.block_axis(axis, step);
                    }
                }
                continue;
            }
            self.occupancy[p.cell] = None;
            self.occupancy[target] = Some(id);
            p.cell = target;
        }
    }

    fn render_pass(&mut self) -> Result<()> {
        let lattice = &self.lattice;
        let occupancy = &self.occupancy;
        let mut pixels = vec![0u8; lattice.len()];
        self.scheduler.run(Pass::Render, &mut pixels, |i, px| {
            *px = if occupancy[i].is_some() {
                rules::SATURATED
            } else {
                rules::classify(&lattice.topology, &lattice.mass, lattice.value[i], i)
            };
        });
        let frame = Frame::new(
            lattice.width(),
            lattice.height(),
            self.step,
            self.config.frame_delay,
            pixels,
        )?;
        log::debug!("frame {} sampled at step {}", self.frames.len(), self.step);
        self.frames.push(frame);
        Ok(())
    }
}
