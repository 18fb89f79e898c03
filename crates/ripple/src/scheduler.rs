//! Phase-barriered pass execution.
//!
//! Each pass applies one function to every element of a slice (one element
//! per cell or per particle) on a dedicated rayon pool. `ThreadPool::install`
//! only returns once every element is processed, which is the barrier between
//! passes: no pass ever observes a peer's in-flight update.
//!
//! Work is split by rayon into contiguous batches of at least
//! [`WorkerPools::batch`] elements, so dispatch never allocates per cell and
//! outstanding work is bounded by the pool size.

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::config::WorkerPools;
use crate::error::{Error, Result};

/// Pass types, in per-step execution order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Pass {
    Velocity,
    Value,
    ParticleVelocity,
    ParticleValue,
    Leap,
    Render,
}

impl Pass {
    /// Short name, also used for worker thread names.
    pub fn name(self) -> &'static str {
        match self {
            Pass::Velocity => "velocity",
            Pass::Value => "value",
            Pass::ParticleVelocity => "particle-velocity",
            Pass::ParticleValue => "particle-value",
            Pass::Leap => "leap",
            Pass::Render => "render",
        }
    }
}

/// A persistent worker pool running parallel-for-with-barrier.
pub struct PassPool {
    name: &'static str,
    pool: ThreadPool,
    batch: usize,
}

impl PassPool {
    /// Builds a pool of `workers` threads named `ripple-{name}-{i}`.
    pub fn new(name: &'static str, workers: usize, batch: usize) -> Result<Self> {
        if workers == 0 {
            return Err(Error::EmptyPool { pass: name });
        }
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(move |i| format!("ripple-{name}-{i}"))
            .build()?;
        Ok(Self {
            name,
            pool,
            batch: batch.max(1),
        })
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn workers(&self) -> usize {
        self.pool.current_num_threads()
    }

    /// Applies `task(index, &mut item)` to every item and blocks until all
    /// of them are done.
    ///
    /// `task` may read any shared state it captures but must only write
    /// through the `&mut T` it is handed.
    pub fn run<T, F>(&self, items: &mut [T], task: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        let batch = self.batch;
        self.pool.install(|| {
            items
                .par_iter_mut()
                .with_min_len(batch)
                .enumerate()
                .for_each(|(i, item)| task(i, item));
        });
    }
}

/// One pool per pass type, built once for the whole run.
///
/// The three particle passes share a pool; they never overlap.
pub struct Scheduler {
    velocity: PassPool,
    value: PassPool,
    particle: PassPool,
    render: PassPool,
}

impl Scheduler {
    pub fn new(pools: &WorkerPools) -> Result<Self> {
        let scheduler = Self {
            velocity: PassPool::new(Pass::Velocity.name(), pools.velocity, pools.batch)?,
            value: PassPool::new(Pass::Value.name(), pools.value, pools.batch)?,
            particle: PassPool::new("particle", pools.particle, pools.batch)?,
            render: PassPool::new(Pass::Render.name(), pools.render, pools.batch)?,
        };
        log::debug!(
            "scheduler ready: velocity={} value={} particle={} render={} batch={}",
            scheduler.velocity.workers(),
            scheduler.value.workers(),
            scheduler.particle.workers(),
            scheduler.render.workers(),
            pools.batch
        );
        Ok(scheduler)
    }

    /// Pool that executes `pass`.
    pub fn pool(&self, pass: Pass) -> &PassPool {
        match pass {
            Pass::Velocity => &self.velocity,
            Pass::Value => &self.value,
            Pass::ParticleVelocity | Pass::ParticleValue | Pass::Leap => &self.particle,
            Pass::Render => &self.render,
        }
    }

    /// Runs `task` over `items` on the pool for `pass`; returns at the barrier.
    #[inline]
    pub fn run<T, F>(&self, pass: Pass, items: &mut [T], task: F)
    where
        T: Send,
        F: Fn(usize, &mut T) + Sync + Send,
    {
        self.pool(pass).run(items, task);
    }
}
