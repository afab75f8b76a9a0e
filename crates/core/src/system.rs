//! Particle population and the per-frame advection step.
//!
//! A [`ParticleSystem`] owns a fixed-size population and the field it moves
//! through. Each call to [`ParticleSystem::update`] advects every particle by
//! `dt * speed_factor * velocity` and respawns, in place, any particle that
//! left the canvas, stalled in a calm zone, or outlived `max_age`. The
//! population size never changes.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::field::{is_calm, FieldGrid, Sampling};
use crate::particle::Particle;
use crate::prng::{RandomSource, Xorshift64};

/// Per-frame behaviour of a particle system.
///
/// The flags cover the variants a flow visualization usually goes through
/// (single particle, calm-zone respawn, age-limited trails) without
/// separate code paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AdvectionSettings {
    pub particle_count: usize,
    /// Respawn when `age > max_age`. `None` disables aging out.
    pub max_age: Option<u32>,
    /// Multiplier on `dt`.
    pub speed_factor: f64,
    /// Respawn particles whose sampled velocity is within `calm_epsilon` of zero.
    pub respawn_calm: bool,
    pub calm_epsilon: f64,
    pub sampling: Sampling,
    /// Start particles at a random age in `[0, max_age)` so they do not all
    /// age out on the same frame.
    pub randomize_initial_age: bool,
}

impl Default for AdvectionSettings {
    fn default() -> Self {
        Self {
            particle_count: 1500,
            max_age: Some(150),
            speed_factor: 1.0,
            respawn_calm: true,
            calm_epsilon: 1e-9,
            sampling: Sampling::Nearest,
            randomize_initial_age: true,
        }
    }
}

/// Fixed-size particle population advected through a [`FieldGrid`].
///
/// Generic over the random source so tests can script respawn positions.
#[derive(Debug, Clone)]
pub struct ParticleSystem<R: RandomSource = Xorshift64> {
    field: FieldGrid,
    particles: Vec<Particle>,
    settings: AdvectionSettings,
    rng: R,
}

impl<R: RandomSource> ParticleSystem<R> {
    /// Spawns `settings.particle_count` particles at random in-bounds positions.
    ///
    /// Each particle draws x then y; when `randomize_initial_age` is set and
    /// `max_age` is `Some`, a third draw picks its starting age.
    pub fn new(field: FieldGrid, settings: AdvectionSettings, rng: R) -> Self {
        let mut system = Self {
            field,
            particles: Vec::with_capacity(settings.particle_count),
            settings,
            rng,
        };
        system.reset();
        system
    }

    /// Replaces the whole population with freshly spawned particles.
    pub fn reset(&mut self) {
        let count = self.settings.particle_count;
        self.particles.clear();
        for _ in 0..count {
            let (x, y) = self.random_point();
            let age = match self.settings.max_age {
                Some(max_age) if self.settings.randomize_initial_age => {
                    self.rng.next_below(max_age as usize) as u32
                }
                _ => 0,
            };
            self.particles.push(Particle::spawn_at(x, y, age));
        }
    }

    /// Uniform integer pixel inside the canvas.
    fn random_point(&mut self) -> (f64, f64) {
        let x = self.rng.next_below(self.field.width()) as f64;
        let y = self.rng.next_below(self.field.height()) as f64;
        (x, y)
    }

    /// Advances every particle by one frame of `dt` seconds.
    ///
    /// Negative or NaN `dt` is treated as 0. Returns the number of particles
    /// respawned during this frame.
    pub fn update(&mut self, dt: f64) -> usize {
        let dt = dt.max(0.0) * self.settings.speed_factor;
        let width = self.field.width() as f64;
        let height = self.field.height() as f64;
        let mut respawned = 0;

        for i in 0..self.particles.len() {
            let p = &mut self.particles[i];
            p.previous_position = p.position;
            p.age = p.age.saturating_add(1);

            let (x, y) = p.position;
            let (vx, vy) = self.field.sample(x, y, self.settings.sampling);
            p.position = (x + dt * vx, y + dt * vy);

            let (nx, ny) = p.position;
            let calm =
                self.settings.respawn_calm && is_calm((vx, vy), self.settings.calm_epsilon);
            // NaN positions fail every comparison, so test for "inside" and negate.
            let in_bounds = nx >= 0.0 && nx < width && ny >= 0.0 && ny < height;
            let is_old = self.settings.max_age.is_some_and(|max| p.age > max);

            if calm || !in_bounds || is_old {
                let (rx, ry) = self.random_point();
                self.particles[i].respawn_at(rx, ry);
                respawned += 1;
            }
        }

        trace!(respawned, dt, "advected particles");
        respawned
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn field(&self) -> &FieldGrid {
        &self.field
    }

    pub fn settings(&self) -> &AdvectionSettings {
        &self.settings
    }

    pub fn rng_mut(&mut self) -> &mut R {
        &mut self.rng
    }

    /// Direct access for placing particles at known positions.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }
}
