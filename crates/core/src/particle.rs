//! A single advected particle.

use serde::Serialize;

/// A massless point carried by the field.
///
/// `previous_position` always holds the position before the most recent
/// update, so a renderer can draw the segment just travelled. After a
/// respawn both positions coincide and the segment degenerates to a point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Particle {
    pub(crate) position: (f64, f64),
    pub(crate) previous_position: (f64, f64),
    pub(crate) age: u32,
}

impl Particle {
    /// Places a particle at rest at `(x, y)`.
    pub fn spawn_at(x: f64, y: f64, age: u32) -> Self {
        Self {
            position: (x, y),
            previous_position: (x, y),
            age,
        }
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }

    pub fn previous_position(&self) -> (f64, f64) {
        self.previous_position
    }

    /// Frames since the last respawn.
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Moves the particle to `(x, y)` with no trail and zero age.
    pub(crate) fn respawn_at(&mut self, x: f64, y: f64) {
        self.position = (x, y);
        self.previous_position = (x, y);
        self.age = 0;
    }
}
