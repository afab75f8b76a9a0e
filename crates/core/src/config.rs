//! Simulation configuration: canvas, seeds, and particle behaviour.
//!
//! [`FlowConfig`] is a flat bundle of every tunable value. It is read from a
//! JSON object with [`FlowConfig::from_json`], checked with
//! [`FlowConfig::validate`] before any grid or particle exists, and reported
//! back through [`FlowConfig::params`] and [`FlowConfig::param_schema`].

use serde_json::{json, Value};

use crate::error::FlowError;
use crate::field::Sampling;
use crate::params::{param_bool, param_f64, param_string, param_usize};
use crate::prng::RandomSource;
use crate::seed::{SeedSet, SpeedRange};
use crate::strength::Falloff;
use crate::system::AdvectionSettings;

const DEFAULT_WIDTH: usize = 1200;
const DEFAULT_HEIGHT: usize = 800;
const DEFAULT_PARTICLE_COUNT: usize = 1500;
const DEFAULT_SEED_COUNT: usize = 20;
/// Per-axis seed speed range, pixels per second.
const DEFAULT_SPEED_MIN: f64 = 10.0;
const DEFAULT_SPEED_MAX: f64 = 80.0;
const DEFAULT_SEED_RADIUS: f64 = 300.0;
const DEFAULT_MAX_AGE: u32 = 150;
const DEFAULT_SPEED_FACTOR: f64 = 1.0;
const DEFAULT_CALM_EPSILON: f64 = 1e-9;

/// Where the seeds come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SeedLayout {
    /// `seed_count` seeds with random positions and velocities.
    #[default]
    Random,
    /// The fixed four-seed layout.
    Classic,
}

impl SeedLayout {
    pub const NAMES: &'static [&'static str] = &["random", "classic"];

    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name {
            "random" => Ok(SeedLayout::Random),
            "classic" => Ok(SeedLayout::Classic),
            other => Err(FlowError::InvalidConfiguration(format!(
                "unknown seed layout '{other}' (expected one of: {})",
                Self::NAMES.join(", ")
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SeedLayout::Random => "random",
            SeedLayout::Classic => "classic",
        }
    }
}

/// Complete configuration for one flow simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct FlowConfig {
    pub width: usize,
    pub height: usize,
    pub particle_count: usize,
    pub seed_count: usize,
    pub seed_layout: SeedLayout,
    pub speed_min: f64,
    pub speed_max: f64,
    pub seed_radius: f64,
    pub falloff: Falloff,
    pub max_age: Option<u32>,
    pub randomize_initial_age: bool,
    pub speed_factor: f64,
    pub respawn_calm: bool,
    pub calm_epsilon: f64,
    pub sampling: Sampling,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            particle_count: DEFAULT_PARTICLE_COUNT,
            seed_count: DEFAULT_SEED_COUNT,
            seed_layout: SeedLayout::Random,
            speed_min: DEFAULT_SPEED_MIN,
            speed_max: DEFAULT_SPEED_MAX,
            seed_radius: DEFAULT_SEED_RADIUS,
            falloff: Falloff::Quadratic,
            max_age: Some(DEFAULT_MAX_AGE),
            randomize_initial_age: true,
            speed_factor: DEFAULT_SPEED_FACTOR,
            respawn_calm: true,
            calm_epsilon: DEFAULT_CALM_EPSILON,
            sampling: Sampling::Nearest,
        }
    }
}

impl FlowConfig {
    /// Reads a configuration from a JSON object, using defaults for missing keys.
    ///
    /// `falloff` accepts `"linear"`, `"quadratic"`, or a number used as a
    /// power exponent. `max_age` of `0` or `null` disables aging out.
    /// The result is not validated; call [`FlowConfig::validate`].
    pub fn from_json(params: &Value) -> Result<Self, FlowError> {
        let d = Self::default();

        let falloff = match params.get("falloff") {
            None | Some(Value::Null) => d.falloff,
            Some(Value::String(name)) => Falloff::from_name(name)?,
            Some(v) => Falloff::Power(param_f64(params, "falloff", d.falloff.exponent()).map_err(
                |_| FlowError::ParamTypeMismatch {
                    name: "falloff".into(),
                    expected: "falloff name or exponent".into(),
                    got: v.to_string(),
                },
            )?),
        };

        let max_age = match params.get("max_age") {
            Some(Value::Null) => None,
            _ => {
                let raw = param_usize(params, "max_age", DEFAULT_MAX_AGE as usize)?;
                let age = u32::try_from(raw).map_err(|_| FlowError::ParamTypeMismatch {
                    name: "max_age".into(),
                    expected: "integer up to u32::MAX".into(),
                    got: raw.to_string(),
                })?;
                (age > 0).then_some(age)
            }
        };

        Ok(Self {
            width: param_usize(params, "width", d.width)?,
            height: param_usize(params, "height", d.height)?,
            particle_count: param_usize(params, "particle_count", d.particle_count)?,
            seed_count: param_usize(params, "seed_count", d.seed_count)?,
            seed_layout: SeedLayout::from_name(&param_string(
                params,
                "seed_layout",
                d.seed_layout.name(),
            )?)?,
            speed_min: param_f64(params, "speed_min", d.speed_min)?,
            speed_max: param_f64(params, "speed_max", d.speed_max)?,
            seed_radius: param_f64(params, "seed_radius", d.seed_radius)?,
            falloff,
            max_age,
            randomize_initial_age: param_bool(
                params,
                "randomize_initial_age",
                d.randomize_initial_age,
            )?,
            speed_factor: param_f64(params, "speed_factor", d.speed_factor)?,
            respawn_calm: param_bool(params, "respawn_calm", d.respawn_calm)?,
            calm_epsilon: param_f64(params, "calm_epsilon", d.calm_epsilon)?,
            sampling: Sampling::from_name(&param_string(params, "sampling", "nearest")?)?,
        })
    }

    /// Rejects configurations that cannot produce a working simulation.
    pub fn validate(&self) -> Result<(), FlowError> {
        if self.width == 0 || self.height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        self.width
            .checked_mul(self.height)
            .ok_or(FlowError::InvalidDimensions)?;
        if !(self.seed_radius.is_finite() && self.seed_radius > 0.0) {
            return Err(invalid(format!(
                "seed_radius must be a positive number, got {}",
                self.seed_radius
            )));
        }
        self.speed_range()?;
        if !(self.speed_factor.is_finite() && self.speed_factor >= 0.0) {
            return Err(invalid(format!(
                "speed_factor must be a non-negative number, got {}",
                self.speed_factor
            )));
        }
        if !(self.calm_epsilon.is_finite() && self.calm_epsilon >= 0.0) {
            return Err(invalid(format!(
                "calm_epsilon must be a non-negative number, got {}",
                self.calm_epsilon
            )));
        }
        if let Falloff::Power(e) = self.falloff {
            if !(e.is_finite() && e > 0.0) {
                return Err(invalid(format!("falloff exponent must be positive, got {e}")));
            }
        }
        if self.max_age == Some(0) {
            return Err(invalid("max_age must be positive; use None to disable".into()));
        }
        Ok(())
    }

    /// Seed speed range built from `speed_min` / `speed_max`.
    pub fn speed_range(&self) -> Result<SpeedRange, FlowError> {
        SpeedRange::new(self.speed_min, self.speed_max)
    }

    /// Lays out seeds per `seed_layout`.
    ///
    /// The random layout draws from `rng` before anything else, so a
    /// simulation seeded the same way ends up with the identical set.
    pub fn seed_set(&self, rng: &mut impl RandomSource) -> Result<SeedSet, FlowError> {
        let w = self.width as f64;
        let h = self.height as f64;
        Ok(match self.seed_layout {
            SeedLayout::Random => {
                SeedSet::generate(self.seed_count, w, h, self.speed_range()?, self.seed_radius, rng)
            }
            SeedLayout::Classic => SeedSet::classic(w, h, self.seed_radius),
        })
    }

    /// Per-frame particle settings.
    pub fn advection(&self) -> AdvectionSettings {
        AdvectionSettings {
            particle_count: self.particle_count,
            max_age: self.max_age,
            speed_factor: self.speed_factor,
            respawn_calm: self.respawn_calm,
            calm_epsilon: self.calm_epsilon,
            sampling: self.sampling,
            randomize_initial_age: self.randomize_initial_age,
        }
    }

    /// Current values as a JSON object accepted by [`FlowConfig::from_json`].
    pub fn params(&self) -> Value {
        let falloff = match self.falloff {
            Falloff::Linear => json!("linear"),
            Falloff::Quadratic => json!("quadratic"),
            Falloff::Power(e) => json!(e),
        };
        let sampling = match self.sampling {
            Sampling::Nearest => "nearest",
            Sampling::Bilinear => "bilinear",
        };
        json!({
            "width": self.width,
            "height": self.height,
            "particle_count": self.particle_count,
            "seed_count": self.seed_count,
            "seed_layout": self.seed_layout.name(),
            "speed_min": self.speed_min,
            "speed_max": self.speed_max,
            "seed_radius": self.seed_radius,
            "falloff": falloff,
            "max_age": self.max_age,
            "randomize_initial_age": self.randomize_initial_age,
            "speed_factor": self.speed_factor,
            "respawn_calm": self.respawn_calm,
            "calm_epsilon": self.calm_epsilon,
            "sampling": sampling,
        })
    }

    /// Schema describing every parameter: type, default, range, description.
    pub fn param_schema() -> Value {
        json!({
            "width": {
                "type": "integer",
                "default": DEFAULT_WIDTH,
                "min": 1,
                "description": "Canvas width in pixels"
            },
            "height": {
                "type": "integer",
                "default": DEFAULT_HEIGHT,
                "min": 1,
                "description": "Canvas height in pixels"
            },
            "particle_count": {
                "type": "integer",
                "default": DEFAULT_PARTICLE_COUNT,
                "min": 0,
                "description": "Number of particles (constant for the simulation's lifetime)"
            },
            "seed_count": {
                "type": "integer",
                "default": DEFAULT_SEED_COUNT,
                "min": 0,
                "description": "Number of randomly generated seeds (random layout only)"
            },
            "seed_layout": {
                "type": "string",
                "default": "random",
                "enum": SeedLayout::NAMES,
                "description": "Random seeds, or the fixed four-seed layout"
            },
            "speed_min": {
                "type": "number",
                "default": DEFAULT_SPEED_MIN,
                "min": 0.0,
                "description": "Minimum per-axis seed speed (pixels per second)"
            },
            "speed_max": {
                "type": "number",
                "default": DEFAULT_SPEED_MAX,
                "min": 0.0,
                "description": "Maximum per-axis seed speed (pixels per second)"
            },
            "seed_radius": {
                "type": "number",
                "default": DEFAULT_SEED_RADIUS,
                "min": 0.0,
                "description": "Radius of influence shared by all seeds (pixels)"
            },
            "falloff": {
                "type": "string|number",
                "default": "quadratic",
                "enum": Falloff::NAMES,
                "description": "Strength function name, or an exponent for (1 - d/r)^e"
            },
            "max_age": {
                "type": "integer|null",
                "default": DEFAULT_MAX_AGE,
                "min": 0,
                "description": "Frames before a particle respawns; 0 or null disables"
            },
            "randomize_initial_age": {
                "type": "boolean",
                "default": true,
                "description": "Start particles at random ages to desynchronize respawns"
            },
            "speed_factor": {
                "type": "number",
                "default": DEFAULT_SPEED_FACTOR,
                "min": 0.0,
                "description": "Global multiplier on the frame time delta"
            },
            "respawn_calm": {
                "type": "boolean",
                "default": true,
                "description": "Respawn particles that land in a zero-velocity cell"
            },
            "calm_epsilon": {
                "type": "number",
                "default": DEFAULT_CALM_EPSILON,
                "min": 0.0,
                "description": "Velocity components at or below this magnitude count as calm"
            },
            "sampling": {
                "type": "string",
                "default": "nearest",
                "enum": Sampling::NAMES,
                "description": "Per-cell lookup, or bilinear interpolation between cells"
            }
        })
    }
}

fn invalid(msg: String) -> FlowError {
    FlowError::InvalidConfiguration(msg)
}
