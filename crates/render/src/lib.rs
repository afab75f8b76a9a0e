#![deny(unsafe_code)]
//! Raster rendering for flow-field simulations.
//!
//! [`TrailRenderer`] accumulates particle trails frame by frame into a
//! [`TrailBuffer`], fading old strokes the way a translucent background
//! wash does on a canvas. The field itself can be inspected either as a
//! grid of velocity glyphs ([`draw_field_glyphs`]) or as a per-pixel speed
//! map ([`field_intensity`]). Buffers convert to RGBA8 through
//! [`pixel::buffer_to_rgba`] and, with the default `png` feature, to files
//! through [`snapshot::write_png`].

pub mod pixel;
pub mod trail;

#[cfg(feature = "png")]
pub mod snapshot;

use flow_field_core::{FieldGrid, FlowError, Particle, SeedSet};

pub use pixel::Theme;
pub use trail::TrailBuffer;

/// Fraction of every pixel washed out per frame.
pub const DEFAULT_FADE: f64 = 0.01;

/// Intensity deposited by each trail segment.
pub const DEFAULT_INK: f64 = 1.0;

/// Side of the square drawn at each seed centre, in pixels.
const SEED_MARKER: f64 = 6.0;

/// Distance between sampled cells in the glyph view, in pixels.
pub const DEFAULT_GLYPH_SPACING: usize = 20;

/// Glyph line length per unit of velocity.
pub const DEFAULT_GLYPH_SCALE: f64 = 0.4;

/// Side of the dot marking each sampled cell.
const GLYPH_DOT: f64 = 3.0;

/// How the `field` view renders a velocity grid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FieldStyle {
    /// A dot and a velocity line every `spacing` pixels.
    #[default]
    Glyphs,
    /// Per-pixel speed normalized by the fastest cell.
    Speed,
}

impl FieldStyle {
    pub const NAMES: &'static [&'static str] = &["glyphs", "speed"];

    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name {
            "glyphs" => Ok(FieldStyle::Glyphs),
            "speed" => Ok(FieldStyle::Speed),
            other => Err(FlowError::InvalidConfiguration(format!(
                "unknown field style '{other}', expected one of: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldStyle::Glyphs => "glyphs",
            FieldStyle::Speed => "speed",
        }
    }
}

/// Draws particle trails with per-frame fading.
#[derive(Debug, Clone)]
pub struct TrailRenderer {
    buffer: TrailBuffer,
    fade: f64,
    ink: f64,
}

impl TrailRenderer {
    pub fn new(width: usize, height: usize) -> Result<Self, FlowError> {
        Ok(Self {
            buffer: TrailBuffer::new(width, height)?,
            fade: DEFAULT_FADE,
            ink: DEFAULT_INK,
        })
    }

    /// Sets the per-frame fade, clamped to `[0, 1]`.
    pub fn with_fade(mut self, fade: f64) -> Self {
        self.fade = fade.clamp(0.0, 1.0);
        self
    }

    /// Sets the stroke intensity, clamped to `[0, 1]`.
    pub fn with_ink(mut self, ink: f64) -> Self {
        self.ink = ink.clamp(0.0, 1.0);
        self
    }

    /// Fades the buffer, then strokes each particle's last segment.
    ///
    /// Freshly respawned particles have a zero-length segment and leave a
    /// single dot.
    pub fn draw(&mut self, particles: &[Particle]) {
        self.buffer.fade(self.fade);
        for p in particles {
            self.buffer
                .stroke(p.previous_position(), p.position(), self.ink);
        }
    }

    /// Marks every seed with a filled square and a line along its velocity.
    pub fn mark_seeds(&mut self, seeds: &SeedSet) {
        mark_seeds(&mut self.buffer, seeds);
    }

    /// Wipes all trails.
    pub fn clear(&mut self) {
        self.buffer.fade(1.0);
    }

    pub fn buffer(&self) -> &TrailBuffer {
        &self.buffer
    }

    pub fn into_buffer(self) -> TrailBuffer {
        self.buffer
    }
}

/// Draws seed markers at full intensity into any buffer.
pub fn mark_seeds(buffer: &mut TrailBuffer, seeds: &SeedSet) {
    let half = SEED_MARKER / 2.0;
    for seed in seeds {
        let (x, y) = seed.position;
        let (vx, vy) = seed.velocity;
        buffer.fill_rect(x - half, y - half, SEED_MARKER, SEED_MARKER, 1.0);
        buffer.stroke((x, y), (x + vx, y + vy), 1.0);
    }
}

/// Draws the field as glyphs sampled on a regular lattice.
///
/// Cells are sampled every `spacing` pixels starting at `spacing / 2` on
/// both axes. Each sample gets a 3x3 dot and a line from the cell to
/// `cell + scale * velocity`. A `spacing` of 0 draws nothing.
pub fn draw_field_glyphs(
    buffer: &mut TrailBuffer,
    grid: &FieldGrid,
    spacing: usize,
    scale: f64,
) {
    if spacing == 0 {
        return;
    }
    let half = GLYPH_DOT / 2.0;
    for y in (spacing / 2..grid.height()).step_by(spacing) {
        for x in (spacing / 2..grid.width()).step_by(spacing) {
            let (vx, vy) = grid.lookup(x as isize, y as isize);
            let (cx, cy) = (x as f64, y as f64);
            // Centre the dot on the cell's pixel.
            buffer.fill_rect(cx - half + 0.5, cy - half + 0.5, GLYPH_DOT, GLYPH_DOT, 1.0);
            buffer.stroke((cx, cy), (cx + scale * vx, cy + scale * vy), 1.0);
        }
    }
}

/// Renders `grid` in the given style into a fresh buffer.
pub fn render_field(
    grid: &FieldGrid,
    style: FieldStyle,
    spacing: usize,
    scale: f64,
) -> Result<TrailBuffer, FlowError> {
    match style {
        FieldStyle::Speed => field_intensity(grid),
        FieldStyle::Glyphs => {
            let mut buffer = TrailBuffer::new(grid.width(), grid.height())?;
            draw_field_glyphs(&mut buffer, grid, spacing, scale);
            Ok(buffer)
        }
    }
}

/// Speed map of `grid`: `|v|` per cell normalized by the grid's maximum speed.
///
/// A field with no motion anywhere maps to a blank buffer.
pub fn field_intensity(grid: &FieldGrid) -> Result<TrailBuffer, FlowError> {
    let mut buffer = TrailBuffer::new(grid.width(), grid.height())?;
    let max = grid.max_speed();
    if max <= 0.0 || !max.is_finite() {
        return Ok(buffer);
    }
    for (x, y, (vx, vy)) in grid.iter() {
        let speed = (vx * vx + vy * vy).sqrt();
        buffer.deposit(x as isize, y as isize, speed / max);
    }
    Ok(buffer)
}
