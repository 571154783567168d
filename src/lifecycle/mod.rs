//! Component lifecycle.
//!
//! ```text
//! Constructed --(next tick)--> Loading --> Ready --> Destroyed
//!      |                          |          ^
//!      +--------------------------+----------+  destroy() from any state
//! ```
//!
//! - Load never runs inline with construction; it is queued on the app
//!   ticker.
//! - A failed load is logged, stored and handed to the load-error hook; the
//!   component becomes ready anyway.
//! - On ready: `on_init` fires, the init hook runs, the resize hook runs once
//!   with the current viewport, then update/resize are subscribed.
//! - Destroy: unsubscribe, unload (errors go to the unload-error hook), clear
//!   the component's tweens, fire `on_destroy`, destroy children.
//!
//! ```
//! use showcase_shell::app::App;
//! use showcase_shell::core::AppConfig;
//! use showcase_shell::lifecycle::{Component, Hooks};
//! use showcase_shell::viewport::{FixedWindow, MemorySurface};
//!
//! let window = FixedWindow::new(1280, 720, 1.0);
//! let mut surface = MemorySurface::new();
//! let app = App::new(AppConfig::showcase(), &window);
//! app.start().unwrap();
//!
//! let label = Component::new(
//!     &app,
//!     0.0_f64,
//!     Hooks::new().on_resize(|y, _ctx, event| *y = -event.height / 4.0),
//! );
//! app.tick(16.0, &window, &mut surface);
//! assert_eq!(label.with_state(|y| *y), Some(-540.0));
//! ```

mod component;
mod hooks;

pub use component::{Component, Ctx, Lifecycle, LifecycleState, WeakComponent};
pub use hooks::Hooks;
