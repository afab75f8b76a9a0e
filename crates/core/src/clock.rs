//! Converts driver timestamps into per-frame time deltas.

/// Tracks the previous frame timestamp and yields elapsed seconds.
///
/// Timestamps are in milliseconds, as delivered by a typical
/// animation-frame callback. The first tick has no predecessor and yields 0.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    previous_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `timestamp_ms` and returns seconds since the previous tick.
    ///
    /// A timestamp earlier than the previous one yields 0 rather than a
    /// negative delta.
    pub fn tick(&mut self, timestamp_ms: f64) -> f64 {
        let dt = match self.previous_ms {
            Some(previous) => ((timestamp_ms - previous) / 1000.0).max(0.0),
            None => 0.0,
        };
        self.previous_ms = Some(timestamp_ms);
        dt
    }

    /// Forgets the previous timestamp so the next tick yields 0.
    pub fn reset(&mut self) {
        self.previous_ms = None;
    }
}
