//! Owned simulation state tying seeds, field, particles, and clock together.
//!
//! A [`FlowSimulation`] is everything one animated flow visualization needs.
//! There is no shared global state, so any number of independent
//! simulations can run side by side.

use tracing::debug;

use crate::clock::FrameClock;
use crate::config::FlowConfig;
use crate::error::FlowError;
use crate::field::FieldGrid;
use crate::particle::Particle;
use crate::prng::{RandomSource, Xorshift64};
use crate::seed::SeedSet;
use crate::system::ParticleSystem;

/// A configured flow simulation driven by frame timestamps.
#[derive(Debug, Clone)]
pub struct FlowSimulation<R: RandomSource = Xorshift64> {
    config: FlowConfig,
    seeds: SeedSet,
    system: ParticleSystem<R>,
    clock: FrameClock,
    running: bool,
    frames: u64,
}

impl FlowSimulation<Xorshift64> {
    /// Builds a simulation whose seeds and particles derive from `rng_seed`.
    pub fn new(config: FlowConfig, rng_seed: u64) -> Result<Self, FlowError> {
        Self::with_rng(config, Xorshift64::new(rng_seed))
    }
}

impl<R: RandomSource> FlowSimulation<R> {
    /// Validates `config`, lays out seeds, builds the field, and spawns particles.
    pub fn with_rng(config: FlowConfig, mut rng: R) -> Result<Self, FlowError> {
        config.validate()?;
        let seeds = config.seed_set(&mut rng)?;
        Self::with_seeds(config, seeds, rng)
    }

    /// Builds a simulation over an explicit seed set, ignoring the layout settings.
    pub fn with_seeds(config: FlowConfig, seeds: SeedSet, rng: R) -> Result<Self, FlowError> {
        config.validate()?;
        let field = FieldGrid::build_with(&seeds, config.width, config.height, config.falloff)?;
        let system = ParticleSystem::new(field, config.advection(), rng);
        debug!(
            width = config.width,
            height = config.height,
            seeds = seeds.len(),
            particles = system.len(),
            "created flow simulation"
        );
        Ok(Self {
            config,
            seeds,
            system,
            clock: FrameClock::new(),
            running: true,
            frames: 0,
        })
    }

    /// Handles one animation frame delivered at `timestamp_ms`.
    ///
    /// Returns the number of respawned particles, or 0 while paused.
    pub fn frame(&mut self, timestamp_ms: f64) -> usize {
        if !self.running {
            return 0;
        }
        let dt = self.clock.tick(timestamp_ms);
        self.advance(dt)
    }

    /// Advances by a known `dt` in seconds, bypassing the clock.
    pub fn advance(&mut self, dt: f64) -> usize {
        self.frames += 1;
        self.system.update(dt)
    }

    /// Stops reacting to frames until [`FlowSimulation::resume`].
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Resumes after a pause; the first frame afterwards has `dt = 0`.
    pub fn resume(&mut self) {
        self.running = true;
        self.clock.reset();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Number of updates applied so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn config(&self) -> &FlowConfig {
        &self.config
    }

    pub fn seeds(&self) -> &SeedSet {
        &self.seeds
    }

    pub fn field(&self) -> &FieldGrid {
        self.system.field()
    }

    pub fn particles(&self) -> &[Particle] {
        self.system.particles()
    }

    pub fn system(&self) -> &ParticleSystem<R> {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut ParticleSystem<R> {
        &mut self.system
    }
}
