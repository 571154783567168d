//! Optional per-component behaviour.

use std::fmt;

use super::component::Ctx;
use crate::core::error::ComponentError;
use crate::viewport::ResizeEvent;

pub(crate) type LoadHook<S> = Box<dyn FnOnce(&mut S, &Ctx<'_, S>) -> Result<(), ComponentError>>;
pub(crate) type InitHook<S> = Box<dyn FnMut(&mut S, &Ctx<'_, S>)>;
pub(crate) type UpdateHook<S> = Box<dyn FnMut(&mut S, &Ctx<'_, S>, f64)>;
pub(crate) type ResizeHook<S> = Box<dyn FnMut(&mut S, &Ctx<'_, S>, ResizeEvent)>;
pub(crate) type UnloadHook<S> = Box<dyn FnMut(&mut S, &Ctx<'_, S>) -> Result<(), ComponentError>>;
pub(crate) type ErrorHook<S> = Box<dyn FnMut(&mut S, &Ctx<'_, S>, &ComponentError)>;

/// The hooks a component opts into.
///
/// Every hook is optional; a component without an update hook is never
/// subscribed to the frame broadcast at all.
///
/// ```
/// use showcase_shell::lifecycle::Hooks;
///
/// struct Counter { frames: u32 }
///
/// let hooks = Hooks::<Counter>::new()
///     .on_init(|state, _ctx| state.frames = 0)
///     .on_update(|state, _ctx, _dt| state.frames += 1);
/// assert!(hooks.has_update());
/// assert!(!hooks.has_resize());
/// ```
pub struct Hooks<S: 'static> {
    pub(crate) load: Option<LoadHook<S>>,
    pub(crate) load_error: Option<ErrorHook<S>>,
    pub(crate) init: Option<InitHook<S>>,
    pub(crate) update: Option<UpdateHook<S>>,
    pub(crate) resize: Option<ResizeHook<S>>,
    pub(crate) unload: Option<UnloadHook<S>>,
    pub(crate) unload_error: Option<ErrorHook<S>>,
}

impl<S: 'static> Hooks<S> {
    /// No hooks at all.
    #[must_use]
    pub fn new() -> Self {
        Self {
            load: None,
            load_error: None,
            init: None,
            update: None,
            resize: None,
            unload: None,
            unload_error: None,
        }
    }

    /// Runs once, on the tick after construction.
    #[must_use]
    pub fn on_load(
        mut self,
        hook: impl FnOnce(&mut S, &Ctx<'_, S>) -> Result<(), ComponentError> + 'static,
    ) -> Self {
        self.load = Some(Box::new(hook));
        self
    }

    /// Runs when the load hook failed, before the component becomes ready.
    #[must_use]
    pub fn on_load_error(
        mut self,
        hook: impl FnMut(&mut S, &Ctx<'_, S>, &ComponentError) + 'static,
    ) -> Self {
        self.load_error = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_init(mut self, hook: impl FnMut(&mut S, &Ctx<'_, S>) + 'static) -> Self {
        self.init = Some(Box::new(hook));
        self
    }

    /// Runs every frame with the clamped delta in ms.
    #[must_use]
    pub fn on_update(mut self, hook: impl FnMut(&mut S, &Ctx<'_, S>, f64) + 'static) -> Self {
        self.update = Some(Box::new(hook));
        self
    }

    /// Runs once when ready, then on every viewport change.
    #[must_use]
    pub fn on_resize(
        mut self,
        hook: impl FnMut(&mut S, &Ctx<'_, S>, ResizeEvent) + 'static,
    ) -> Self {
        self.resize = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_unload(
        mut self,
        hook: impl FnMut(&mut S, &Ctx<'_, S>) -> Result<(), ComponentError> + 'static,
    ) -> Self {
        self.unload = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn on_unload_error(
        mut self,
        hook: impl FnMut(&mut S, &Ctx<'_, S>, &ComponentError) + 'static,
    ) -> Self {
        self.unload_error = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn has_update(&self) -> bool {
        self.update.is_some()
    }

    #[must_use]
    pub fn has_resize(&self) -> bool {
        self.resize.is_some()
    }
}

impl<S: 'static> Default for Hooks<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: 'static> fmt::Debug for Hooks<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("load", &self.load.is_some())
            .field("load_error", &self.load_error.is_some())
            .field("init", &self.init.is_some())
            .field("update", &self.update.is_some())
            .field("resize", &self.resize.is_some())
            .field("unload", &self.unload.is_some())
            .field("unload_error", &self.unload_error.is_some())
            .finish()
    }
}
