//! Device pixel ratio selection.

use crate::core::config::{ResolutionBreakpoint, MAX_DPR, MIN_DPR};

/// Pick a device pixel ratio for the current screen.
///
/// The physical max side is `max(width, height) * window_dpr`. Breakpoints
/// are scanned from the last (largest threshold) to the first; the first one
/// whose threshold is strictly exceeded wins, and index 0 wins when nothing
/// above it matched. The result is clamped to `[MIN_DPR, MAX_DPR]`.
/// An empty list selects `1.0`.
///
/// ```
/// use showcase_shell::core::ResolutionBreakpoint;
/// use showcase_shell::viewport::select_device_pixel_ratio;
///
/// let breakpoints = [ResolutionBreakpoint::new(0.0, 1.0), ResolutionBreakpoint::new(1200.0, 2.0)];
///
/// assert_eq!(select_device_pixel_ratio(&breakpoints, 1000, 600, 1.0), 1.0);
/// assert_eq!(select_device_pixel_ratio(&breakpoints, 1300, 600, 1.0), 2.0);
/// ```
#[must_use]
pub fn select_device_pixel_ratio(
    breakpoints: &[ResolutionBreakpoint],
    window_width: u32,
    window_height: u32,
    window_dpr: f64,
) -> f64 {
    let max_side = f64::from(window_width.max(window_height)) * window_dpr;

    for (i, breakpoint) in breakpoints.iter().enumerate().rev() {
        if max_side > breakpoint.max_side_size_threshold || i == 0 {
            return breakpoint.resolution.clamp(MIN_DPR, MAX_DPR);
        }
    }

    1.0
}
