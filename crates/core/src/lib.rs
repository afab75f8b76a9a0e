#![deny(unsafe_code)]
//! Core model for seed-driven flow-field particle advection.
//!
//! A [`SeedSet`] of point sources defines a velocity field over a pixel grid.
//! [`FieldGrid`] precomputes that field once, and [`ParticleSystem`] advects a
//! fixed-size particle population through it frame by frame, respawning
//! particles that leave the canvas, stall, or age out. [`FlowSimulation`]
//! bundles the pieces with a [`FrameClock`] for timestamp-driven animation.
//!
//! All randomness goes through [`RandomSource`], so runs are reproducible
//! from a single `u64` seed and tests can script every draw.

pub mod clock;
pub mod config;
pub mod error;
pub mod field;
pub mod params;
pub mod particle;
pub mod prng;
pub mod seed;
pub mod simulation;
pub mod strength;
pub mod system;

pub use clock::FrameClock;
pub use config::{FlowConfig, SeedLayout};
pub use error::FlowError;
pub use field::{FieldGrid, Sampling};
pub use particle::Particle;
pub use prng::{RandomSource, ScriptedSource, Xorshift64};
pub use seed::{Seed, SeedSet, SpeedRange};
pub use simulation::FlowSimulation;
pub use strength::Falloff;
pub use system::{AdvectionSettings, ParticleSystem};
