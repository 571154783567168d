//! Event broadcasting.
//!
//! The shell uses a single parametrized [`Emitter`] for every event kind
//! instead of one type per event. Payloads are passed by reference.
//!
//! ```
//! use showcase_shell::events::Emitter;
//! use std::cell::Cell;
//! use std::rc::Rc;
//!
//! let on_update = Emitter::<f64>::new();
//! let total = Rc::new(Cell::new(0.0));
//!
//! let t = Rc::clone(&total);
//! let id = on_update.on(move |dt| t.set(t.get() + dt));
//!
//! on_update.emit(&16.0);
//! on_update.off(id);
//! on_update.emit(&16.0);
//!
//! assert_eq!(total.get(), 16.0);
//! ```

mod emitter;

pub use emitter::{Emitter, ListenerId};
