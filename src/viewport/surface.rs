//! Window and render-surface collaborators.
//!
//! The viewport manager reads the window through [`WindowSource`] and drives
//! the renderer through [`RenderSurface`]. [`FixedWindow`] and
//! [`MemorySurface`] are headless implementations that simply record what
//! they are told.

use serde::{Deserialize, Serialize};

/// Read-only view of the host window.
pub trait WindowSource {
    /// Inner size in logical pixels.
    fn inner_size(&self) -> (u32, u32);

    /// The platform's device pixel ratio.
    fn device_pixel_ratio(&self) -> f64;
}

/// The renderer's drawable surface and root transform.
pub trait RenderSurface {
    /// Size the surface occupies on screen, in logical pixels.
    fn set_logical_size(&mut self, width: f64, height: f64);

    /// Pixels per logical unit.
    fn set_resolution(&mut self, resolution: f64);

    /// Resize the drawing buffer to `width x height` logical units.
    fn resize(&mut self, width: f64, height: f64);

    /// Size the renderer reports after the last resize, in logical units.
    fn rendered_size(&self) -> (f64, f64);

    /// Position of the root container's origin.
    fn set_root_position(&mut self, x: f64, y: f64);

    /// Uniform scale of the root container.
    fn set_root_scale(&mut self, scale: f64);
}

/// A window whose size only changes when told to.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FixedWindow {
    pub width: u32,
    pub height: u32,
    pub dpr: f64,
}

impl FixedWindow {
    #[must_use]
    pub const fn new(width: u32, height: u32, dpr: f64) -> Self {
        Self { width, height, dpr }
    }

    /// Change the inner size.
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl WindowSource for FixedWindow {
    fn inner_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.dpr
    }
}

/// In-memory surface recording the last values it received.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemorySurface {
    pub logical_size: (f64, f64),
    pub resolution: f64,
    pub size: (f64, f64),
    pub root_position: (f64, f64),
    pub root_scale: f64,
    pub resize_count: u32,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolution: 1.0,
            root_scale: 1.0,
            ..Self::default()
        }
    }

    /// Drawing buffer size in physical pixels.
    #[must_use]
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.size.0 * self.resolution).round() as u32,
            (self.size.1 * self.resolution).round() as u32,
        )
    }
}

impl RenderSurface for MemorySurface {
    fn set_logical_size(&mut self, width: f64, height: f64) {
        self.logical_size = (width, height);
    }

    fn set_resolution(&mut self, resolution: f64) {
        self.resolution = resolution;
    }

    fn resize(&mut self, width: f64, height: f64) {
        self.size = (width, height);
        self.resize_count += 1;
    }

    fn rendered_size(&self) -> (f64, f64) {
        self.size
    }

    fn set_root_position(&mut self, x: f64, y: f64) {
        self.root_position = (x, y);
    }

    fn set_root_scale(&mut self, scale: f64) {
        self.root_scale = scale;
    }
}
