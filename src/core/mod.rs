//! Core building blocks: errors, configuration, RNG and math helpers.
//!
//! Nothing here knows about components or scenes; the other modules build on
//! these types.

pub mod config;
pub mod error;
pub mod math;
pub mod rng;

pub use config::{AppConfig, ReferenceSize, ResolutionBreakpoint, MAX_DPR, MIN_DPR};
pub use error::{ComponentError, Result, ShellError};
pub use math::{clamp, lerp};
pub use rng::{ShellRng, ShellRngState};
