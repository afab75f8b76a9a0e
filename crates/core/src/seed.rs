//! Point sources that define the velocity field.
//!
//! A [`Seed`] carries a position, a velocity in pixels per second and a
//! radius of influence. A [`SeedSet`] is the ordered collection the field
//! grid is built from; it is fixed for the lifetime of one field.

use serde::{Deserialize, Serialize};

use crate::error::FlowError;
use crate::prng::RandomSource;
use crate::strength::Falloff;

/// A point source contributing velocity within a bounded radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    pub position: (f64, f64),
    pub velocity: (f64, f64),
    pub radius: f64,
}

impl Seed {
    pub fn new(position: (f64, f64), velocity: (f64, f64), radius: f64) -> Self {
        Self {
            position,
            velocity,
            radius,
        }
    }

    /// Euclidean distance from the seed centre to `(x, y)`.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        let dx = self.position.0 - x;
        let dy = self.position.1 - y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Weighted velocity this seed contributes at `(x, y)`, or `None` when
    /// the point lies outside the radius of influence.
    pub fn contribution(&self, x: f64, y: f64, falloff: Falloff) -> Option<(f64, f64)> {
        let distance = self.distance_to(x, y);
        if distance > self.radius {
            return None;
        }
        let s = falloff.strength(distance, self.radius);
        Some((s * self.velocity.0, s * self.velocity.1))
    }
}

/// Range of per-axis speed magnitudes for generated seeds, in pixels per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

impl SpeedRange {
    /// Creates a range, requiring `0 <= min <= max` with both finite.
    pub fn new(min: f64, max: f64) -> Result<Self, FlowError> {
        if !min.is_finite() || !max.is_finite() || min < 0.0 || min > max {
            return Err(FlowError::InvalidConfiguration(format!(
                "speed range must satisfy 0 <= min <= max, got {min}..{max}"
            )));
        }
        Ok(Self { min, max })
    }

    /// Draws `sign * (min + random * (max - min))`: magnitude first, then sign.
    fn sample(&self, rng: &mut impl RandomSource) -> f64 {
        let magnitude = self.min + rng.next_f64() * (self.max - self.min);
        magnitude * rng.next_sign()
    }
}

impl Default for SpeedRange {
    fn default() -> Self {
        Self {
            min: 10.0,
            max: 80.0,
        }
    }
}

/// Ordered set of seeds defining one field epoch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeedSet {
    seeds: Vec<Seed>,
}

impl SeedSet {
    pub fn from_seeds(seeds: Vec<Seed>) -> Self {
        Self { seeds }
    }

    /// Generates `count` seeds with uniform positions inside the canvas and a
    /// symmetric, bidirectional speed distribution on each axis.
    ///
    /// Draw order per seed: x, y, vx magnitude, vx sign, vy magnitude, vy sign.
    pub fn generate(
        count: usize,
        width: f64,
        height: f64,
        speed: SpeedRange,
        radius: f64,
        rng: &mut impl RandomSource,
    ) -> Self {
        let seeds = (0..count)
            .map(|_| {
                let x = rng.next_f64() * width;
                let y = rng.next_f64() * height;
                let vx = speed.sample(rng);
                let vy = speed.sample(rng);
                Seed::new((x, y), (vx, vy), radius)
            })
            .collect();
        Self { seeds }
    }

    /// The fixed four-seed layout, positioned relative to the canvas.
    pub fn classic(width: f64, height: f64, radius: f64) -> Self {
        let layout = [
            ((0.15, 0.25), (70.0, 20.0)),
            ((0.75, 0.5), (50.0, -100.0)),
            ((0.5, 0.75), (-100.0, 50.0)),
            ((0.25, 0.5), (0.0, -30.0)),
        ];
        let seeds = layout
            .iter()
            .map(|&((fx, fy), velocity)| Seed::new((fx * width, fy * height), velocity, radius))
            .collect();
        Self { seeds }
    }

    pub fn seeds(&self) -> &[Seed] {
        &self.seeds
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Seed> {
        self.seeds.iter()
    }
}

impl<'a> IntoIterator for &'a SeedSet {
    type Item = &'a Seed;
    type IntoIter = std::slice::Iter<'a, Seed>;

    fn into_iter(self) -> Self::IntoIter {
        self.seeds.iter()
    }
}
