//! Particle drift diagnostic
//!
//! Drops a few weights onto a periodic lattice with a short pulse and
//! prints where each one is every 25 steps.
//!
//! Run with: RUST_LOG=debug cargo run --release --example particle_drift -p ripple

use ripple::{Boundary, DVec2, ParticleCoupling, Simulation, SimulationConfig, WorkerPools};

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("particle drift failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> ripple::Result<()> {
    const SIZE: usize = 48;
    const STEPS: usize = 400;
    const REPORT_EVERY: usize = 25;

    let config = SimulationConfig {
        width: SIZE,
        height: SIZE,
        boundary: Boundary::Periodic,
        total_steps: STEPS,
        steps_per_frame: 50,
        pools: WorkerPools::uniform(4),
        coupling: Some(ParticleCoupling::default()),
        ..SimulationConfig::default()
    };

    let mut sim = Simulation::new(config)?.with_influence(|step, field| {
        if step < 40 {
            let dv = 0.02 * (step as f64 * std::f64::consts::PI / 20.0).sin();
            field.add_velocity(SIZE / 2, SIZE / 2, dv)?;
        }
        Ok(())
    });

    // (x, y, mass, velocity)
    let weights = [
        (8, 8, 0.0, DVec2::new(0.3, 0.0)),
        (40, 12, 0.5, DVec2::new(0.0, 0.2)),
        (20, 36, 1.0, DVec2::ZERO),
        (30, 30, 0.2, DVec2::new(-0.15, -0.15)),
    ];
    for &(x, y, mass, velocity) in &weights {
        let id = sim.add_particle(x, y, mass, velocity)?;
        println!("particle {} at ({}, {}) mass {} velocity {:?}", id, x, y, mass, velocity);
    }

    println!("\n=== Trajectories ===");
    while !sim.is_finished() {
        sim.step()?;
        let step = sim.steps_taken();
        if step % REPORT_EVERY == 0 {
            let line: Vec<String> = sim
                .particles()
                .iter()
                .enumerate()
                .filter_map(|(id, p)| {
                    let (x, y) = sim.particle_position(id)?;
                    Some(format!(
                        "#{} ({:>2},{:>2}) v=({:+.3},{:+.3})",
                        id, x, y, p.velocity.x, p.velocity.y
                    ))
                })
                .collect();
            println!("step {:>3}: {}", step, line.join("  "));
        }
    }

    let stats = sim.stats();
    println!("\n=== FINAL ===");
    println!(
        "field min {:.4} max {:.4} mean {:.5} energy {:.5}, {} frames",
        stats.min,
        stats.max,
        stats.mean,
        stats.kinetic_energy,
        sim.frames().len()
    );
    Ok(())
}
