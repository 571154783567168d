//! Viewport scaling.
//!
//! Scenes are authored against a fixed reference size (4096x2160 for the
//! showcase). Every frame the [`ViewportManager`] compares the window size
//! against the last one it saw; on change it resizes the render surface,
//! centres the root and scales it so the reference size fits, then reports
//! the virtual size scenes should lay out against.
//!
//! ## Scale formula
//!
//! ```text
//! ref_size    = lerp(reference.width, reference.height, blend)
//! ref_window  = lerp(window.width,    window.height,    blend)
//! scale_ratio = ref_size / ref_window
//! root scale  = 1 / scale_ratio
//! virtual     = rendered size * scale_ratio
//! ```

mod breakpoints;
mod manager;
mod surface;

pub use breakpoints::select_device_pixel_ratio;
pub use manager::{ResizeEvent, ViewportManager};
pub use surface::{FixedWindow, MemorySurface, RenderSurface, WindowSource};
