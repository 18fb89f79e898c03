//! Integration tests for embedded particles
//! Run with: cargo test -p ripple --release
//!
//! These tests verify:
//! - Constant lateral velocity on a flat periodic field
//! - Leap conflicts resolve in particle id order
//! - A massive particle digs a well and stays in it
//! - Particle cells render saturated

use ripple::lattice::rules;
use ripple::{Boundary, DVec2, ParticleCoupling, Simulation, SimulationConfig, WorkerPools};

fn periodic_config(size: usize, c_squared: f64) -> SimulationConfig {
    SimulationConfig {
        width: size,
        height: size,
        boundary: Boundary::Periodic,
        total_steps: 200,
        steps_per_frame: 10,
        pools: WorkerPools::uniform(2),
        coupling: Some(ParticleCoupling { c_squared }),
        ..SimulationConfig::default()
    }
}

/// A massless particle on a flat field keeps its velocity and wraps around
/// the torus: 0.6 cells/step for 100 steps is 60 cells.
#[test]
fn test_constant_velocity_drift_on_torus() {
    const SIZE: usize = 10;
    const STEPS: usize = 100;
    const START: (usize, usize) = (3, 4);

    let mut sim = Simulation::new(periodic_config(SIZE, 1.0)).unwrap();
    let id = sim
        .add_particle(START.0, START.1, 0.0, DVec2::new(0.6, 0.0))
        .unwrap();

    for step in 1..=STEPS {
        sim.step().unwrap();
        if step == 5 {
            // leaps land on steps 1, 3 and 5
            assert_eq!(sim.particle_position(id), Some((START.0 + 3, START.1)));
        }
    }

    let (x, y) = sim.particle_position(id).unwrap();
    let displacement = (x + SIZE - START.0) % SIZE;
    let expected = (STEPS * 6 / 10) % SIZE;
    eprintln!("particle ended at ({}, {}), displacement {}", x, y, displacement);
    assert_eq!(displacement, expected);
    assert_eq!(y, START.1);

    let p = &sim.particles()[id];
    assert_eq!(p.velocity, DVec2::new(0.6, 0.0));
    assert!(sim.lattice().values().iter().all(|&v| v == 0.0));
}

/// Two particles aiming at each other's cells: both leaps are rejected.
#[test]
fn test_head_on_leaps_are_both_rejected() {
    let mut sim = Simulation::new(periodic_config(10, 1.0)).unwrap();
    let a = sim.add_particle(2, 5, 0.0, DVec2::new(0.6, 0.0)).unwrap();
    let b = sim.add_particle(3, 5, 0.0, DVec2::new(-0.6, 0.0)).unwrap();

    sim.step().unwrap();

    assert_eq!(sim.particle_position(a), Some((2, 5)));
    assert_eq!(sim.particle_position(b), Some((3, 5)));
    assert_eq!(sim.particles()[a].velocity.x, 0.0);
    assert_eq!(sim.particles()[b].velocity.x, 0.0);
    assert!(sim.particles()[a].offset.x < 0.5);
    assert_eq!(sim.particles()[b].offset.x, -0.5);
}

/// A convoy: the leader (higher id) moves, the follower finds the leader's
/// cell still occupied when its own leap is committed.
#[test]
fn test_leaps_commit_in_id_order() {
    let mut sim = Simulation::new(periodic_config(10, 1.0)).unwrap();
    let follower = sim.add_particle(2, 5, 0.0, DVec2::new(0.6, 0.0)).unwrap();
    let leader = sim.add_particle(3, 5, 0.0, DVec2::new(0.6, 0.0)).unwrap();

    sim.step().unwrap();

    assert_eq!(sim.particle_position(follower), Some((2, 5)));
    assert_eq!(sim.particle_position(leader), Some((4, 5)));
    assert_eq!(sim.occupant(2, 5), Some(follower));
    assert_eq!(sim.occupant(3, 5), None);
    assert_eq!(sim.occupant(4, 5), Some(leader));

    // the follower is stopped along x, the leader keeps going
    assert_eq!(sim.particles()[follower].velocity.x, 0.0);
    assert_eq!(sim.particles()[leader].velocity.x, 0.6);
}

/// Reversed ids: the leader commits first, so both move.
#[test]
fn test_vacated_cell_can_be_entered_in_the_same_step() {
    let mut sim = Simulation::new(periodic_config(10, 1.0)).unwrap();
    let leader = sim.add_particle(3, 5, 0.0, DVec2::new(0.6, 0.0)).unwrap();
    let follower = sim.add_particle(2, 5, 0.0, DVec2::new(0.6, 0.0)).unwrap();

    sim.step().unwrap();

    assert_eq!(sim.particle_position(leader), Some((4, 5)));
    assert_eq!(sim.particle_position(follower), Some((3, 5)));
}

/// A resting massive particle pulls its own cell down and stays put.
#[test]
fn test_massive_particle_sits_in_its_well() {
    const SIZE: usize = 16;
    const STEPS: usize = 50;

    let mut sim = Simulation::new(periodic_config(SIZE, 0.25)).unwrap();
    let id = sim.add_particle(8, 8, 1.0, DVec2::ZERO).unwrap();

    let mut depth_sum = 0.0;
    for _ in 0..STEPS {
        sim.step().unwrap();
        depth_sum += sim.lattice().cell(8, 8).unwrap().value;
    }

    eprintln!("mean well depth over {} steps: {:.4}", STEPS, depth_sum / STEPS as f64);
    assert!(depth_sum < 0.0);
    assert_eq!(sim.particle_position(id), Some((8, 8)));
    assert!(sim.stats().min < 0.0);
}

/// The particle's cell is drawn saturated regardless of the field.
#[test]
fn test_particle_cell_renders_saturated() {
    let mut sim = Simulation::new(periodic_config(6, 1.0)).unwrap();
    sim.add_particle(1, 4, 0.0, DVec2::ZERO).unwrap();
    sim.step().unwrap();

    let frame = &sim.frames()[0];
    assert_eq!(frame.pixel(1, 4), Some(rules::SATURATED));
    assert_eq!(frame.pixel(0, 0), Some(rules::gray(0.0)));
    assert_eq!(frame.histogram()[rules::SATURATED as usize], 1);
}

/// Diagonal motion off a clamped corner is rejected on both axes.
#[test]
fn test_clamped_corner_blocks_both_axes() {
    let config = SimulationConfig {
        boundary: Boundary::Clamped,
        ..periodic_config(5, 1.0)
    };
    let mut sim = Simulation::new(config).unwrap();
    let id = sim.add_particle(4, 4, 0.0, DVec2::new(0.7, 0.7)).unwrap();

    sim.step().unwrap();

    assert_eq!(sim.particle_position(id), Some((4, 4)));
    assert_eq!(sim.particles()[id].velocity, DVec2::ZERO);
}

/// Two particles aiming at the same empty cell: the lower id takes it, the
/// other is pressed against its west face and stops.
#[test]
fn test_contested_cell_goes_to_lower_id() {
    let mut sim = Simulation::new(periodic_config(10, 1.0)).unwrap();
    let a = sim.add_particle(2, 5, 0.0, DVec2::new(0.6, 0.0)).unwrap();
    let b = sim.add_particle(4, 5, 0.0, DVec2::new(-0.6, 0.0)).unwrap();

    sim.step().unwrap();

    assert_eq!(sim.particle_position(a), Some((3, 5)));
    assert_eq!(sim.particle_position(b), Some((4, 5)));
    assert_eq!(sim.occupant(3, 5), Some(a));
    assert_eq!(sim.occupant(2, 5), None);
    assert_eq!(sim.particles()[b].velocity.x, 0.0);
    assert_eq!(sim.particles()[b].offset.x, -0.5);
    assert_eq!(sim.particles()[a].velocity.x, 0.6);
}

/// Faster than one cell per step: the particle advances exactly one cell
/// each step and its offset never leaves the cell.
#[test]
fn test_fast_particle_moves_one_cell_per_step() {
    const SIZE: usize = 10;

    let mut sim = Simulation::new(periodic_config(SIZE, 1.0)).unwrap();
    let id = sim.add_particle(0, 0, 0.0, DVec2::new(1.5, 0.0)).unwrap();

    for step in 1..=SIZE {
        sim.step().unwrap();
        let p = &sim.particles()[id];
        assert!(p.offset.x >= -0.5 && p.offset.x < 0.5, "offset {} at step {}", p.offset.x, step);
        assert_eq!(sim.particle_position(id), Some((step % SIZE, 0)));
    }
}

/// A steep slope under a large c² pushes a resting particle past one cell
/// per step; it still hops one cell at a time with its offset in range.
#[test]
fn test_steep_slope_keeps_offset_in_cell() {
    const WIDTH: usize = 40;
    const STEPS: usize = 6;

    let config = SimulationConfig {
        width: WIDTH,
        height: 3,
        boundary: Boundary::Clamped,
        coupling: Some(ParticleCoupling { c_squared: 16.0 }),
        ..periodic_config(WIDTH, 16.0)
    };
    let mut sim = Simulation::new(config).unwrap();
    let slope: Vec<f64> = (0..WIDTH * 3).map(|i| 0.5 * (i % WIDTH) as f64).collect();
    sim.lattice_mut().unwrap().set_values(&slope).unwrap();
    let id = sim.add_particle(30, 1, 0.0, DVec2::ZERO).unwrap();

    sim.step().unwrap();
    assert_eq!(sim.particles()[id].velocity.x, -8.0);

    let mut last = sim.particle_position(id).unwrap();
    assert_eq!(last, (29, 1));
    for step in 1..STEPS {
        sim.step().unwrap();
        let p = &sim.particles()[id];
        eprintln!("step {}: offset {:?} velocity {:?}", step, p.offset, p.velocity);
        assert!(p.offset.x >= -0.5 && p.offset.x < 0.5);
        assert!(p.offset.y >= -0.5 && p.offset.y < 0.5);
        let now = sim.particle_position(id).unwrap();
        assert!(now.0.abs_diff(last.0) <= 1 && now.1.abs_diff(last.1) <= 1);
        last = now;
    }
}
