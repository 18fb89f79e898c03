//! Lens scenario profiler
//!
//! Runs the biconvex lens at a reduced size, once per worker count, and
//! reports per-step timing plus field stats at every sampled frame.
//!
//! Run with: RUST_LOG=info cargo run --release --example lens_profile -p ripple

use std::time::Instant;

use ripple::{scenario, SimulationConfig, WorkerPools};

fn main() {
    env_logger::init();

    println!("=== Lens Profile ===");
    for &workers in &[1, 2, 4, 8] {
        if let Err(e) = profile(workers) {
            eprintln!("lens run with {} workers failed: {}", workers, e);
            std::process::exit(1);
        }
    }
}

fn profile(workers: usize) -> ripple::Result<()> {
    const SIZE: usize = 201;
    const STEPS: usize = 600;
    const STEPS_PER_FRAME: usize = 100;

    let config = SimulationConfig {
        width: SIZE,
        height: SIZE,
        total_steps: STEPS,
        steps_per_frame: STEPS_PER_FRAME,
        pools: WorkerPools::uniform(workers),
        ..SimulationConfig::default()
    };
    let mut sim = scenario::lens(config)?;

    println!("\n--- {} workers per pass, {}x{} ---", workers, SIZE, SIZE);
    let started = Instant::now();
    while !sim.is_finished() {
        let step = sim.steps_taken();
        sim.step()?;
        if step % STEPS_PER_FRAME == 0 {
            let s = sim.stats();
            println!(
                "step {:>4}: min {:>8.4} max {:>8.4} mean {:>9.5} energy {:>10.4}",
                step, s.min, s.max, s.mean, s.kinetic_energy
            );
        }
    }
    let elapsed = started.elapsed();

    let frames = sim.frames();
    let white = frames
        .last()
        .map(|f| f.histogram()[255])
        .unwrap_or_default();
    println!(
        "{} steps in {:.2?} ({:.1} us/step), {} frames, {} white pixels in last frame",
        STEPS,
        elapsed,
        elapsed.as_secs_f64() * 1e6 / STEPS as f64,
        frames.len(),
        white
    );
    Ok(())
}
