//! Application shell: frame loop, broadcasts and shared services.
//!
//! A frame ([`App::tick`]) runs in a fixed order:
//!
//! 1. clamp the delta to the configured maximum;
//! 2. compare the window size and broadcast `resize` on change;
//! 3. broadcast `update` with the clamped delta;
//! 4. advance every tween group;
//! 5. run the next-tick callbacks queued before the frame began.

mod shell;
mod ticker;

pub use shell::App;
pub use ticker::Ticker;
