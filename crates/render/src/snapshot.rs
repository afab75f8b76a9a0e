//! PNG output of a [`TrailBuffer`].
//!
//! Feature-gated behind `png` (default on) so embedders that only need the
//! raster do not pull in the `image` crate.

use flow_field_core::FlowError;
use std::path::Path;

use crate::pixel::{buffer_to_rgba, Theme};
use crate::trail::TrailBuffer;

/// Writes the buffer as a PNG image colored by `theme`.
///
/// Returns `FlowError::InvalidDimensions` if the buffer dimensions overflow
/// `u32`, or `FlowError::Io` on write failure.
pub fn write_png(buffer: &TrailBuffer, theme: Theme, path: &Path) -> Result<(), FlowError> {
    let rgba = buffer_to_rgba(buffer, theme);
    let w = u32::try_from(buffer.width()).map_err(|_| FlowError::InvalidDimensions)?;
    let h = u32::try_from(buffer.height()).map_err(|_| FlowError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| FlowError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path)
        .map_err(|e| FlowError::Io(format!("{}: {e}", path.display())))
}
