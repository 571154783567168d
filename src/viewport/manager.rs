//! Viewport state and resize computation.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::core::config::ReferenceSize;
use crate::core::math::lerp;

use super::surface::{RenderSurface, WindowSource};

/// Virtual size broadcast after a resize.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResizeEvent {
    /// Virtual width.
    pub width: f64,
    /// Virtual height.
    pub height: f64,
}

impl ResizeEvent {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Tracks the window size and keeps the render surface and root transform in
/// step with it.
///
/// The device pixel ratio is fixed at construction. [`ViewportManager::check`]
/// is meant to run every frame; it only does work when the window's integer
/// size changed since the previous call.
#[derive(Clone, Debug)]
pub struct ViewportManager {
    reference: ReferenceSize,
    dpr: f64,
    last_window: (u32, u32),
    scale_ratio: f64,
    width: f64,
    height: f64,
}

impl ViewportManager {
    /// Create a manager with a fixed device pixel ratio.
    #[must_use]
    pub fn new(reference: ReferenceSize, dpr: f64) -> Self {
        Self {
            reference,
            dpr,
            last_window: (0, 0),
            scale_ratio: 1.0,
            width: 0.0,
            height: 0.0,
        }
    }

    /// Compare the window against the last observed size and resize on change.
    ///
    /// Returns the new virtual size when a resize happened.
    pub fn check(
        &mut self,
        window: &dyn WindowSource,
        surface: &mut dyn RenderSurface,
    ) -> Option<ResizeEvent> {
        let size = window.inner_size();
        if size == self.last_window {
            return None;
        }
        self.last_window = size;
        self.resize_root(size.0, size.1, surface)
    }

    /// Resize unconditionally to the given window size.
    ///
    /// Returns `None` for a degenerate window whose blended size is zero.
    pub fn resize_root(
        &mut self,
        window_width: u32,
        window_height: u32,
        surface: &mut dyn RenderSurface,
    ) -> Option<ResizeEvent> {
        let (w, h) = (f64::from(window_width), f64::from(window_height));

        let ref_size = lerp(self.reference.width, self.reference.height, self.reference.blend);
        let ref_window = lerp(w, h, self.reference.blend);
        if ref_window <= 0.0 {
            warn!("ignoring resize to degenerate window {window_width}x{window_height}");
            return None;
        }

        surface.set_logical_size(w, h);
        surface.set_resolution(self.dpr);
        surface.resize(w, h);

        // Origin at the canvas centre
        surface.set_root_position(w / 2.0, h / 2.0);

        let ratio = ref_size / ref_window;
        surface.set_root_scale(1.0 / ratio);

        self.scale_ratio = ratio;
        self.width = w * ratio;
        self.height = h * ratio;

        let (rendered_w, rendered_h) = surface.rendered_size();
        let event = ResizeEvent::new(rendered_w * ratio, rendered_h * ratio);
        debug!(
            "viewport resized: window {}x{} @{}x, virtual {:.1}x{:.1}",
            window_width, window_height, self.dpr, event.width, event.height
        );
        Some(event)
    }

    /// Fixed device pixel ratio.
    #[must_use]
    pub fn dpr(&self) -> f64 {
        self.dpr
    }

    /// Virtual width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Virtual height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Virtual units per window pixel.
    #[must_use]
    pub fn scale_ratio(&self) -> f64 {
        self.scale_ratio
    }

    #[must_use]
    pub fn last_window_size(&self) -> (u32, u32) {
        self.last_window
    }

    /// Current virtual size as a resize event.
    #[must_use]
    pub fn current(&self) -> ResizeEvent {
        ResizeEvent::new(self.width, self.height)
    }

    #[must_use]
    pub fn reference(&self) -> &ReferenceSize {
        &self.reference
    }
}
