//! Tween scheduling.
//!
//! - [`Tween`]: one chainable timeline (`wait`, `to`, `set`, `call`, `label`)
//! - [`TweenGroup`]: the timelines one owner created; `reset(true)` cancels
//!   all of them
//! - [`TweenClock`]: advances every live group once per rendered frame
//! - [`Ease`]: easing curves
//!
//! Time is in milliseconds throughout.
//!
//! ```
//! use showcase_shell::tween::{TweenClock, TweenOptions};
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let clock = TweenClock::new();
//! let group = clock.create_group();
//!
//! let ticks = Rc::new(Cell::new(0));
//! let t = Rc::clone(&ticks);
//! group
//!     .timer(TweenOptions::forever())
//!     .call(move || t.set(t.get() + 1))
//!     .wait(1000.0);
//!
//! clock.advance(0.0);
//! clock.advance(1000.0);
//! assert_eq!(ticks.get(), 2);
//!
//! group.reset(true);
//! clock.advance(1000.0);
//! assert_eq!(ticks.get(), 2);
//! ```

mod ease;
mod group;
mod timeline;

pub use ease::Ease;
pub use group::{TweenClock, TweenGroup};
pub use timeline::{Completion, Lens, Tween, TweenLoop, TweenOptions};
