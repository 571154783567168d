//! Typed publish/subscribe primitive.
//!
//! One `Emitter<T>` type serves every broadcast in the shell: app init,
//! per-frame update (`f64` delta), resize (`ResizeEvent`), component
//! init/destroy and the card machine's custom events.
//!
//! ## Dispatch rules
//!
//! - Handlers run synchronously, in registration order.
//! - `emit` works on a snapshot taken when it starts: handlers registered or
//!   removed while it runs do not change who is called in that emit.
//! - `once` handlers are unregistered before they are invoked.
//! - A handler that panics is logged and swallowed; the remaining handlers
//!   still run. A handler re-entered by a nested `emit` from its own body is
//!   skipped for the nested call.

use std::cell::RefCell;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use log::{error, warn};
use smallvec::SmallVec;

/// Token returned by [`Emitter::on`] and [`Emitter::once`], used to unregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Listener({})", self.0)
    }
}

type Handler<T> = Rc<RefCell<dyn FnMut(&T)>>;

struct Listener<T> {
    id: ListenerId,
    once: bool,
    handler: Handler<T>,
}

impl<T> Clone for Listener<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            once: self.once,
            handler: Rc::clone(&self.handler),
        }
    }
}

struct Registry<T> {
    next_id: u64,
    listeners: Vec<Listener<T>>,
}

/// Cloneable handle to a shared listener list.
///
/// Clones refer to the same list, so a component can keep a handle to the
/// app's broadcaster and unregister later.
pub struct Emitter<T: 'static> {
    registry: Rc<RefCell<Registry<T>>>,
}

impl<T: 'static> Emitter<T> {
    /// Create an emitter with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    /// Register a handler for every subsequent emit.
    pub fn on(&self, handler: impl FnMut(&T) + 'static) -> ListenerId {
        self.register(handler, false)
    }

    /// Register a handler that is removed after its first invocation.
    pub fn once(&self, handler: impl FnMut(&T) + 'static) -> ListenerId {
        self.register(handler, true)
    }

    /// Unregister a handler. Returns `false` if it was not registered.
    pub fn off(&self, id: ListenerId) -> bool {
        let mut registry = self.registry.borrow_mut();
        let before = registry.listeners.len();
        registry.listeners.retain(|l| l.id != id);
        registry.listeners.len() != before
    }

    /// Check whether a handler is still registered.
    #[must_use]
    pub fn contains(&self, id: ListenerId) -> bool {
        self.registry.borrow().listeners.iter().any(|l| l.id == id)
    }

    /// Remove every handler.
    pub fn clear(&self) {
        self.registry.borrow_mut().listeners.clear();
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.borrow().listeners.len()
    }

    /// True if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invoke every handler registered at the time of the call.
    pub fn emit(&self, payload: &T) {
        let snapshot: SmallVec<[Listener<T>; 8]> = {
            let mut registry = self.registry.borrow_mut();
            let snapshot = registry.listeners.iter().cloned().collect();
            registry.listeners.retain(|l| !l.once);
            snapshot
        };

        for listener in snapshot {
            let Ok(mut handler) = listener.handler.try_borrow_mut() else {
                warn!("{} is already running, skipping nested emit", listener.id);
                continue;
            };

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| (*handler)(payload)));
            if let Err(panic) = outcome {
                error!("{} panicked during emit: {}", listener.id, panic_message(&*panic));
            }
        }
    }

    fn register(&self, handler: impl FnMut(&T) + 'static, once: bool) -> ListenerId {
        let mut registry = self.registry.borrow_mut();
        let id = ListenerId(registry.next_id);
        registry.next_id += 1;
        registry.listeners.push(Listener {
            id,
            once,
            handler: Rc::new(RefCell::new(handler)),
        });
        id
    }
}

impl Emitter<()> {
    /// Emit a payload-less event.
    pub fn notify(&self) {
        self.emit(&());
    }
}

impl<T: 'static> Clone for Emitter<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Rc::clone(&self.registry),
        }
    }
}

impl<T: 'static> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Emitter").field("listeners", &self.len()).finish()
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}
