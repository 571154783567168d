//! Application configuration.
//!
//! Apps describe the coordinate space they are authored against and how to
//! pick a render resolution:
//! - `ReferenceSize`: the virtual size scenes are laid out in, and how the
//!   width/height axes are blended when scaling
//! - `ResolutionBreakpoint`: physical screen size thresholds mapped to a
//!   device pixel ratio
//! - `AppConfig`: combines both with ticker and RNG settings
//!
//! Configs are plain serde types, so they can be shipped as JSON.

use serde::{Deserialize, Serialize};

use super::error::{Result, ShellError};

/// Highest device pixel ratio a breakpoint may select.
pub const MAX_DPR: f64 = 4.0;

/// Lowest device pixel ratio a breakpoint may select.
pub const MIN_DPR: f64 = 0.5;

/// Maps a physical max-side size to a device pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionBreakpoint {
    /// Physical pixels (`max(width, height) * window dpr`) that must be exceeded.
    pub max_side_size_threshold: f64,
    /// Device pixel ratio selected above the threshold.
    pub resolution: f64,
}

impl ResolutionBreakpoint {
    /// Create a new breakpoint.
    #[must_use]
    pub const fn new(max_side_size_threshold: f64, resolution: f64) -> Self {
        Self {
            max_side_size_threshold,
            resolution,
        }
    }
}

/// Virtual coordinate space the app is authored against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSize {
    /// Reference width in virtual units.
    pub width: f64,

    /// Reference height in virtual units.
    pub height: f64,

    /// Weight of the height axis when computing the scale (0 = width only,
    /// 1 = height only, values between mix both).
    pub blend: f64,

    /// Breakpoints ordered by ascending threshold.
    pub resolution_breakpoints: Vec<ResolutionBreakpoint>,
}

impl ReferenceSize {
    /// Create a reference size with a single 1x breakpoint.
    #[must_use]
    pub fn new(width: f64, height: f64, blend: f64) -> Self {
        Self {
            width,
            height,
            blend,
            resolution_breakpoints: vec![ResolutionBreakpoint::new(0.0, 1.0)],
        }
    }

    /// Replace the breakpoint list.
    #[must_use]
    pub fn with_breakpoints(mut self, breakpoints: Vec<ResolutionBreakpoint>) -> Self {
        self.resolution_breakpoints = breakpoints;
        self
    }

    /// Check the values are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ShellError::Config(format!(
                "reference size must be positive, got {}x{}",
                self.width, self.height
            )));
        }
        if !(0.0..=1.0).contains(&self.blend) {
            return Err(ShellError::Config(format!(
                "blend must be within [0, 1], got {}",
                self.blend
            )));
        }
        Ok(())
    }
}

/// Top-level application configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// Virtual coordinate space and resolution breakpoints.
    pub reference_size: ReferenceSize,

    /// Fixed device pixel ratio. Skips breakpoint selection when set.
    #[serde(default)]
    pub dpr_override: Option<f64>,

    /// Largest frame delta passed to update handlers and tweens, in ms.
    #[serde(default = "default_max_delta_ms")]
    pub max_delta_ms: f64,

    /// Seed for the app RNG.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_max_delta_ms() -> f64 {
    100.0
}

fn default_seed() -> u64 {
    42
}

impl AppConfig {
    /// Create a config for the given reference size.
    #[must_use]
    pub fn new(reference_size: ReferenceSize) -> Self {
        Self {
            reference_size,
            dpr_override: None,
            max_delta_ms: default_max_delta_ms(),
            seed: default_seed(),
        }
    }

    /// The showcase app's settings: 4K 16:9 reference, height-driven scaling,
    /// 2x resolution above 1200 physical pixels.
    #[must_use]
    pub fn showcase() -> Self {
        Self::new(ReferenceSize::new(4096.0, 2160.0, 1.0).with_breakpoints(vec![
            ResolutionBreakpoint::new(0.0, 1.0),
            ResolutionBreakpoint::new(1200.0, 2.0),
        ]))
    }

    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(json)?;
        config.reference_size.validate()?;
        Ok(config)
    }

    /// Force a device pixel ratio.
    #[must_use]
    pub fn with_dpr_override(mut self, dpr: f64) -> Self {
        self.dpr_override = Some(dpr);
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the frame delta clamp.
    #[must_use]
    pub fn with_max_delta(mut self, max_delta_ms: f64) -> Self {
        self.max_delta_ms = max_delta_ms;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::showcase()
    }
}
