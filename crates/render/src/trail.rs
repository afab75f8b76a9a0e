//! Scalar raster that particle trails are drawn into.
//!
//! A `TrailBuffer` stores `width * height` intensities in `[0, 1]`, row-major.
//! Anything drawn outside the canvas is dropped.

use flow_field_core::FlowError;

/// A 2D intensity raster with values clamped to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct TrailBuffer {
    width: usize,
    height: usize,
    data: Vec<f64>,
}

impl TrailBuffer {
    /// Creates a blank buffer.
    ///
    /// Returns `FlowError::InvalidDimensions` if either dimension is zero or
    /// `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Result<Self, FlowError> {
        if width == 0 || height == 0 {
            return Err(FlowError::InvalidDimensions);
        }
        let len = width
            .checked_mul(height)
            .ok_or(FlowError::InvalidDimensions)?;
        Ok(Self {
            width,
            height,
            data: vec![0.0; len],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Read-only access to the row-major intensities.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    fn index(&self, x: isize, y: isize) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        Some(y as usize * self.width + x as usize)
    }

    /// Intensity at `(x, y)`, or `None` outside the canvas.
    pub fn get(&self, x: isize, y: isize) -> Option<f64> {
        self.index(x, y).map(|i| self.data[i])
    }

    /// Adds `amount` to the pixel at `(x, y)`, saturating at 1.
    pub fn deposit(&mut self, x: isize, y: isize, amount: f64) {
        if let Some(i) = self.index(x, y) {
            self.data[i] = (self.data[i] + amount).clamp(0.0, 1.0);
        }
    }

    /// Pulls every pixel towards the background by `amount` in `[0, 1]`.
    ///
    /// This is what painting a translucent background rectangle over the
    /// whole canvas does: `0` keeps every trail, `1` clears the buffer.
    pub fn fade(&mut self, amount: f64) {
        let keep = 1.0 - amount.clamp(0.0, 1.0);
        self.data.iter_mut().for_each(|v| *v *= keep);
    }

    /// Draws a one-pixel line from `from` to `to` with a DDA walk.
    ///
    /// Each covered pixel receives `amount` once. A zero-length segment
    /// plots the single pixel under `from`. Non-finite endpoints draw nothing.
    pub fn stroke(&mut self, from: (f64, f64), to: (f64, f64), amount: f64) {
        let (x0, y0) = from;
        let (x1, y1) = to;
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }
        let dx = x1 - x0;
        let dy = y1 - y0;
        let steps = dx.abs().max(dy.abs()).ceil() as usize;
        if steps == 0 {
            self.deposit(x0.floor() as isize, y0.floor() as isize, amount);
            return;
        }

        let mut last = None;
        for i in 0..=steps {
            let t = i as f64 / steps as f64;
            let px = (x0 + dx * t).floor() as isize;
            let py = (y0 + dy * t).floor() as isize;
            if last == Some((px, py)) {
                continue;
            }
            self.deposit(px, py, amount);
            last = Some((px, py));
        }
    }

    /// Deposits `amount` on every pixel of the axis-aligned rectangle with
    /// top-left corner `(x, y)`.
    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, amount: f64) {
        if !(x.is_finite() && y.is_finite() && w.is_finite() && h.is_finite()) {
            return;
        }
        let x0 = x.floor() as isize;
        let y0 = y.floor() as isize;
        let x1 = (x + w).ceil() as isize;
        let y1 = (y + h).ceil() as isize;
        for py in y0.max(0)..y1.min(self.height as isize) {
            for px in x0.max(0)..x1.min(self.width as isize) {
                self.deposit(px, py, amount);
            }
        }
    }
}
