//! Pixel buffer conversion from a [`TrailBuffer`].
//!
//! Always available (no feature gate) so callers that blit frames themselves
//! can share the conversion with the `png` snapshot path.

use flow_field_core::FlowError;

use crate::trail::TrailBuffer;

/// Paper and ink colors for turning intensities into pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    /// White paper, `#333` ink.
    #[default]
    Light,
    /// Black paper, white ink.
    Dark,
}

impl Theme {
    pub const NAMES: &'static [&'static str] = &["light", "dark"];

    pub fn from_name(name: &str) -> Result<Self, FlowError> {
        match name {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(FlowError::InvalidConfiguration(format!(
                "unknown theme '{other}', expected one of: {}",
                Self::NAMES.join(", ")
            ))),
        }
    }

    /// Background color at intensity 0.
    pub fn paper(&self) -> [u8; 3] {
        match self {
            Theme::Light => [0xff, 0xff, 0xff],
            Theme::Dark => [0x00, 0x00, 0x00],
        }
    }

    /// Stroke color at intensity 1.
    pub fn ink(&self) -> [u8; 3] {
        match self {
            Theme::Light => [0x33, 0x33, 0x33],
            Theme::Dark => [0xff, 0xff, 0xff],
        }
    }
}

/// Maps buffer intensities to an RGBA8 pixel buffer.
///
/// Each intensity `t` linearly interpolates from paper to ink. Alpha is
/// always 255 and the output length is `width * height * 4`.
pub fn buffer_to_rgba(buffer: &TrailBuffer, theme: Theme) -> Vec<u8> {
    let paper = theme.paper();
    let ink = theme.ink();
    buffer
        .data()
        .iter()
        .flat_map(|&t| {
            let t = t.clamp(0.0, 1.0);
            let mix = |c: usize| {
                let (a, b) = (paper[c] as f64, ink[c] as f64);
                (a + (b - a) * t).round() as u8
            };
            [mix(0), mix(1), mix(2), 255u8]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_to_rgba_correct_length() {
        let buf = TrailBuffer::new(8, 4).unwrap();
        assert_eq!(buffer_to_rgba(&buf, Theme::Light).len(), 8 * 4 * 4);
    }

    #[test]
    fn blank_buffer_is_paper() {
        let buf = TrailBuffer::new(3, 3).unwrap();
        let light = buffer_to_rgba(&buf, Theme::Light);
        assert!(light.chunks(4).all(|px| px == [255, 255, 255, 255]));
        let dark = buffer_to_rgba(&buf, Theme::Dark);
        assert!(dark.chunks(4).all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn full_intensity_is_ink() {
        let mut buf = TrailBuffer::new(2, 1).unwrap();
        buf.deposit(1, 0, 1.0);
        let rgba = buffer_to_rgba(&buf, Theme::Light);
        assert_eq!(&rgba[4..8], &[0x33, 0x33, 0x33, 255]);
        let rgba = buffer_to_rgba(&buf, Theme::Dark);
        assert_eq!(&rgba[4..8], &[255, 255, 255, 255]);
    }

    #[test]
    fn theme_names_round_trip() {
        for name in Theme::NAMES {
            assert!(Theme::from_name(name).is_ok());
        }
        assert!(matches!(
            Theme::from_name("sepia"),
            Err(FlowError::InvalidConfiguration(_))
        ));
    }
}
