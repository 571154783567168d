//! Components: state plus hooks, driven by the app.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use log::{debug, error, warn};
use serde::{Deserialize, Serialize};

use super::hooks::Hooks;
use crate::app::App;
use crate::core::error::ComponentError;
use crate::events::{Emitter, ListenerId};
use crate::tween::{Completion, Tween, TweenGroup, TweenOptions};
use crate::viewport::ResizeEvent;

/// Where a component is in its life.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleState {
    /// Created; load is queued for the next tick.
    #[default]
    Constructed,
    /// The load hook is running.
    Loading,
    /// Receiving update and resize.
    Ready,
    /// Torn down. Terminal.
    Destroyed,
}

/// Anything that can be owned as a child and torn down with its parent.
pub trait Lifecycle {
    /// Tear down. Calling it again does nothing.
    fn destroy(&self);

    fn state(&self) -> LifecycleState;

    fn is_destroyed(&self) -> bool {
        self.state() == LifecycleState::Destroyed
    }
}

struct Core<S: 'static> {
    state: S,
    hooks: Hooks<S>,
}

struct Inner<S: 'static> {
    app: App,
    phase: Cell<LifecycleState>,
    core: RefCell<Core<S>>,
    tweens: TweenGroup,
    on_init: Emitter<()>,
    on_destroy: Emitter<()>,
    update_listener: Cell<Option<ListenerId>>,
    resize_listener: Cell<Option<ListenerId>>,
    load_error: RefCell<Option<ComponentError>>,
    children: RefCell<Vec<Box<dyn Lifecycle>>>,
}

/// Shared handle to a component.
///
/// A component owns a state value `S`, the [`Hooks`] that act on it, a tween
/// group of its own and a list of children. Construction queues the load step
/// on the app ticker; the component never loads inline.
///
/// Hooks receive `&mut S` and a [`Ctx`]. While a hook runs the state is
/// borrowed, so [`with_state`](Self::with_state) on the same component
/// returns `None` from inside it.
pub struct Component<S: 'static> {
    inner: Rc<Inner<S>>,
}

/// Non-owning handle, for callbacks that must not keep a component alive.
pub struct WeakComponent<S: 'static> {
    inner: Weak<Inner<S>>,
}

/// What a hook can reach besides its own state.
pub struct Ctx<'a, S: 'static> {
    component: &'a Component<S>,
}

impl<S: 'static> Component<S> {
    /// Create a component and queue its load for the next tick.
    pub fn new(app: &App, state: S, hooks: Hooks<S>) -> Self {
        let component = Self {
            inner: Rc::new(Inner {
                app: app.clone(),
                phase: Cell::new(LifecycleState::Constructed),
                core: RefCell::new(Core { state, hooks }),
                tweens: app.create_tween_group(),
                on_init: Emitter::new(),
                on_destroy: Emitter::new(),
                update_listener: Cell::new(None),
                resize_listener: Cell::new(None),
                load_error: RefCell::new(None),
                children: RefCell::new(Vec::new()),
            }),
        };

        let weak = component.downgrade();
        app.ticker().add_once(move || {
            if let Some(component) = weak.upgrade() {
                component.run_load();
            }
        });
        component
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakComponent<S> {
        WeakComponent {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn app(&self) -> &App {
        &self.inner.app
    }

    /// This component's tween group. Cleared on destroy.
    pub fn tweens(&self) -> &TweenGroup {
        &self.inner.tweens
    }

    /// Fires when the component becomes ready, before the init hook.
    pub fn on_init(&self) -> &Emitter<()> {
        &self.inner.on_init
    }

    /// Fires during teardown, after tweens are cleared and before children go.
    pub fn on_destroy(&self) -> &Emitter<()> {
        &self.inner.on_destroy
    }

    #[must_use]
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.inner.phase.get()
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.lifecycle_state() == LifecycleState::Ready
    }

    #[must_use]
    pub fn is_destroyed(&self) -> bool {
        self.lifecycle_state() == LifecycleState::Destroyed
    }

    /// The error the load hook returned, if any.
    #[must_use]
    pub fn load_error(&self) -> Option<ComponentError> {
        self.inner.load_error.borrow().clone()
    }

    /// Run `f` on the state. `None` while one of this component's hooks runs.
    ///
    /// Still works after destroy, for inspecting the final state.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        let mut core = self.inner.core.try_borrow_mut().ok()?;
        Some(f(&mut core.state))
    }

    /// Own `child`; it is destroyed with this component.
    ///
    /// A child added after destroy is destroyed right away.
    pub fn add_child(&self, child: impl Lifecycle + 'static) {
        if self.is_destroyed() {
            child.destroy();
            return;
        }
        self.inner.children.borrow_mut().push(Box::new(child));
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.inner.children.borrow().len()
    }

    /// Tear down: unsubscribe, unload, clear tweens, fire `on_destroy`,
    /// destroy children.
    ///
    /// Idempotent. Called from inside one of this component's own hooks, the
    /// subscriptions are dropped right away and the rest runs on the next
    /// tick.
    pub fn destroy(&self) {
        if self.inner.phase.replace(LifecycleState::Destroyed) == LifecycleState::Destroyed {
            return;
        }
        debug!("component destroyed");

        let app = &self.inner.app;
        if let Some(id) = self.inner.update_listener.take() {
            app.on_update().off(id);
        }
        if let Some(id) = self.inner.resize_listener.take() {
            app.on_resize().off(id);
        }

        if self.inner.core.try_borrow_mut().is_err() {
            warn!("component destroyed from inside its own hook, finishing teardown next tick");
            // The clock advances before the next-tick queue drains.
            self.inner.tweens.reset(true);
            let this = self.clone();
            app.ticker().add_once(move || this.finish_teardown());
            return;
        }
        self.finish_teardown();
    }

    fn finish_teardown(&self) {
        let unloaded = self.with_hooks("unload", |state, hooks, ctx| match hooks.unload.as_mut() {
            Some(unload) => unload(state, ctx),
            None => Ok(()),
        });
        if let Some(Err(err)) = unloaded {
            error!("component unload failed: {err}");
            self.with_hooks("unload error", |state, hooks, ctx| {
                if let Some(hook) = hooks.unload_error.as_mut() {
                    hook(state, ctx, &err);
                }
            });
        }

        self.inner.tweens.reset(true);
        self.inner.on_destroy.notify();

        let children = std::mem::take(&mut *self.inner.children.borrow_mut());
        for child in &children {
            child.destroy();
        }

        self.inner.on_init.clear();
        self.inner.on_destroy.clear();
        if let Ok(mut core) = self.inner.core.try_borrow_mut() {
            core.hooks = Hooks::new();
        }
    }

    fn run_load(&self) {
        if self.lifecycle_state() != LifecycleState::Constructed {
            return;
        }
        self.inner.phase.set(LifecycleState::Loading);

        let loaded = self
            .with_hooks("load", |state, hooks, ctx| match hooks.load.take() {
                Some(load) => load(state, ctx),
                None => Ok(()),
            })
            .unwrap_or(Ok(()));
        if self.is_destroyed() {
            return;
        }

        if let Err(err) = loaded {
            error!("component load failed: {err}");
            *self.inner.load_error.borrow_mut() = Some(err.clone());
            self.with_hooks("load error", |state, hooks, ctx| {
                if let Some(hook) = hooks.load_error.as_mut() {
                    hook(state, ctx, &err);
                }
            });
        }

        self.ready();
    }

    fn ready(&self) {
        if self.is_destroyed() {
            return;
        }
        self.inner.phase.set(LifecycleState::Ready);
        debug!("component ready");

        self.inner.on_init.notify();
        self.with_hooks("init", |state, hooks, ctx| {
            if let Some(init) = hooks.init.as_mut() {
                init(state, ctx);
            }
        });
        if self.is_destroyed() {
            return;
        }

        let (has_update, has_resize) = self
            .with_hooks("subscribe", |_, hooks, _| (hooks.has_update(), hooks.has_resize()))
            .unwrap_or_default();
        let app = &self.inner.app;

        if has_resize {
            self.dispatch_resize(app.resize_event());
            if self.is_destroyed() {
                return;
            }
        }
        if has_update {
            let weak = self.downgrade();
            let id = app.on_update().on(move |dt: &f64| {
                if let Some(component) = weak.upgrade() {
                    component.dispatch_update(*dt);
                }
            });
            self.inner.update_listener.set(Some(id));
        }
        if has_resize {
            let weak = self.downgrade();
            let id = app.on_resize().on(move |event: &ResizeEvent| {
                if let Some(component) = weak.upgrade() {
                    component.dispatch_resize(*event);
                }
            });
            self.inner.resize_listener.set(Some(id));
        }
    }

    fn dispatch_update(&self, dt: f64) {
        if !self.is_ready() {
            return;
        }
        self.with_hooks("update", |state, hooks, ctx| {
            if let Some(update) = hooks.update.as_mut() {
                update(state, ctx, dt);
            }
        });
    }

    fn dispatch_resize(&self, event: ResizeEvent) {
        if !self.is_ready() {
            return;
        }
        self.with_hooks("resize", |state, hooks, ctx| {
            if let Some(resize) = hooks.resize.as_mut() {
                resize(state, ctx, event);
            }
        });
    }

    /// Run `f` with the state, the hooks and a context, if not already borrowed.
    fn with_hooks<R>(
        &self,
        what: &str,
        f: impl FnOnce(&mut S, &mut Hooks<S>, &Ctx<'_, S>) -> R,
    ) -> Option<R> {
        let Ok(mut core) = self.inner.core.try_borrow_mut() else {
            warn!("component is busy, skipping {what}");
            return None;
        };
        let Core { state, hooks } = &mut *core;
        Some(f(state, hooks, &Ctx { component: self }))
    }
}

impl<S: 'static> Lifecycle for Component<S> {
    fn destroy(&self) {
        Component::destroy(self);
    }

    fn state(&self) -> LifecycleState {
        self.lifecycle_state()
    }
}

impl<S: 'static> Clone for Component<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: 'static> fmt::Debug for Component<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("state", &self.lifecycle_state())
            .field("children", &self.child_count())
            .field("tweens", &self.inner.tweens.len())
            .finish()
    }
}

impl<S: 'static> WeakComponent<S> {
    #[must_use]
    pub fn upgrade(&self) -> Option<Component<S>> {
        self.inner.upgrade().map(|inner| Component { inner })
    }

    /// [`Component::with_state`] if the component is still alive.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut S) -> R) -> Option<R> {
        self.upgrade()?.with_state(f)
    }
}

impl<S: 'static> Clone for WeakComponent<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<'a, S: 'static> Ctx<'a, S> {
    pub fn app(&self) -> &App {
        self.component.app()
    }

    /// The component's own tween group.
    pub fn tweens(&self) -> &TweenGroup {
        self.component.tweens()
    }

    /// Tween `target` on the component's group.
    pub fn tween<T: 'static>(&self, target: Rc<RefCell<T>>, options: TweenOptions) -> Tween<T> {
        self.component.tweens().get(target, options)
    }

    /// A target-less timeline on the component's group.
    pub fn timer(&self, options: TweenOptions) -> Tween<()> {
        self.component.tweens().timer(options)
    }

    /// Resolve after `ms`; never resolves if the component is destroyed first.
    pub fn delay(&self, ms: f64) -> Completion {
        self.component.tweens().delay(ms)
    }

    pub fn add_child(&self, child: impl Lifecycle + 'static) {
        self.component.add_child(child);
    }

    /// Destroy the component from inside one of its hooks.
    pub fn destroy_self(&self) {
        self.component.destroy();
    }

    /// A strong handle to the component.
    #[must_use]
    pub fn handle(&self) -> Component<S> {
        self.component.clone()
    }

    #[must_use]
    pub fn weak(&self) -> WeakComponent<S> {
        self.component.downgrade()
    }

    #[must_use]
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.component.lifecycle_state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;
    use crate::viewport::{FixedWindow, MemorySurface};

    struct Harness {
        app: App,
        window: FixedWindow,
        surface: MemorySurface,
    }

    impl Harness {
        fn new() -> Self {
            let window = FixedWindow::new(1920, 1080, 1.0);
            let app = App::new(AppConfig::showcase(), &window);
            app.start().unwrap();
            Self {
                app,
                window,
                surface: MemorySurface::new(),
            }
        }

        fn tick(&mut self) {
            self.app.tick(16.0, &self.window, &mut self.surface);
        }
    }

    #[derive(Default)]
    struct Log(Vec<String>);

    fn logging_hooks() -> Hooks<Log> {
        Hooks::new()
            .on_load(|log: &mut Log, _| {
                log.0.push("load".into());
                Ok(())
            })
            .on_init(|log, _| log.0.push("init".into()))
            .on_resize(|log, _, e| log.0.push(format!("resize {}", e.width)))
            .on_update(|log, _, _| log.0.push("update".into()))
            .on_unload(|log, _| {
                log.0.push("unload".into());
                Ok(())
            })
    }

    #[test]
    fn test_load_is_deferred() {
        let mut h = Harness::new();
        let component = Component::new(&h.app, Log::default(), logging_hooks());

        assert_eq!(component.lifecycle_state(), LifecycleState::Constructed);
        assert_eq!(component.with_state(|log| log.0.len()), Some(0));

        h.tick();
        assert_eq!(component.lifecycle_state(), LifecycleState::Ready);
        assert_eq!(
            component.with_state(|log| log.0.clone()).unwrap(),
            vec!["load", "init", "resize 3840"]
        );

        h.tick();
        assert_eq!(component.with_state(|log| log.0.last().cloned()).unwrap().unwrap(), "update");
    }

    #[test]
    fn test_destroy_is_idempotent() {
        let mut h = Harness::new();
        let component = Component::new(&h.app, Log::default(), logging_hooks());
        h.tick();

        let destroyed = Rc::new(Cell::new(0));
        let d = destroyed.clone();
        component.on_destroy().on(move |_| d.set(d.get() + 1));

        component.destroy();
        component.destroy();
        h.tick();

        assert_eq!(destroyed.get(), 1);
        let log = component.with_state(|log| log.0.clone()).unwrap();
        assert_eq!(log.iter().filter(|l| *l == "unload").count(), 1);
        assert_eq!(log.last().unwrap(), "unload");
        assert!(h.app.on_update().is_empty());
        assert!(h.app.on_resize().is_empty());
    }

    #[test]
    fn test_destroy_before_load_skips_load() {
        let mut h = Harness::new();
        let component = Component::new(&h.app, Log::default(), logging_hooks());
        component.destroy();
        h.tick();

        assert_eq!(component.with_state(|log| log.0.clone()).unwrap(), vec!["unload"]);
    }

    #[test]
    fn test_load_error_still_becomes_ready() {
        let mut h = Harness::new();
        let hooks = Hooks::new()
            .on_load(|_: &mut Vec<String>, _| Err(ComponentError::new("atlas missing")))
            .on_load_error(|seen, _, err| seen.push(err.message().to_string()))
            .on_init(|seen, _| seen.push("init".into()));
        let component = Component::new(&h.app, Vec::new(), hooks);
        h.tick();

        assert!(component.is_ready());
        assert_eq!(component.load_error().unwrap().message(), "atlas missing");
        assert_eq!(component.with_state(|s| s.clone()).unwrap(), vec!["atlas missing", "init"]);
    }

    #[test]
    fn test_init_event_before_init_hook() {
        let mut h = Harness::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        let o = order.clone();
        let component = Component::new(
            &h.app,
            (),
            Hooks::new().on_init(move |_, _| o.borrow_mut().push("hook")),
        );
        let o = order.clone();
        component.on_init().on(move |_| o.borrow_mut().push("event"));
        h.tick();

        assert_eq!(*order.borrow(), vec!["event", "hook"]);
    }

    #[test]
    fn test_destroy_from_own_update_defers_teardown() {
        let mut h = Harness::new();
        let hooks = Hooks::new()
            .on_update(|frames: &mut u32, ctx, _| {
                *frames += 1;
                ctx.destroy_self();
            })
            .on_unload(|frames, _| {
                *frames += 100;
                Ok(())
            });
        let component = Component::new(&h.app, 0u32, hooks);
        h.tick();
        h.tick();

        assert!(component.is_destroyed());
        assert_eq!(component.with_state(|f| *f), Some(1));
        assert!(h.app.on_update().is_empty());

        h.tick();
        assert_eq!(component.with_state(|f| *f), Some(101));
    }

    #[test]
    fn test_destroy_from_own_hook_stops_tweens_at_once() {
        let mut h = Harness::new();
        let fires = Rc::new(Cell::new(0u32));
        let at_destroy = Rc::new(Cell::new(None));

        let (f, counted, seen) = (Rc::clone(&fires), Rc::clone(&fires), Rc::clone(&at_destroy));
        let hooks = Hooks::new()
            .on_init(move |_: &mut u32, ctx| {
                let f = Rc::clone(&f);
                ctx.timer(TweenOptions::forever()).call(move || f.set(f.get() + 1)).wait(16.0);
            })
            .on_update(move |frames, ctx, _| {
                *frames += 1;
                if *frames == 2 {
                    seen.set(Some(counted.get()));
                    ctx.destroy_self();
                }
            });
        let component = Component::new(&h.app, 0u32, hooks);
        for _ in 0..6 {
            h.tick();
        }

        assert!(component.is_destroyed());
        let fired_at_destroy = at_destroy.get().unwrap();
        assert!(fired_at_destroy > 0);
        assert!(component.tweens().is_empty());
        assert_eq!(fires.get(), fired_at_destroy);
    }

    #[test]
    fn test_unload_error_is_routed_not_raised() {
        let mut h = Harness::new();
        let hooks = Hooks::new()
            .on_unload(|_: &mut Option<String>, _| Err(ComponentError::new("busy")))
            .on_unload_error(|seen, _, err| *seen = Some(err.to_string()));
        let component = Component::new(&h.app, None, hooks);
        h.tick();
        component.destroy();

        assert_eq!(component.with_state(|s| s.clone()).unwrap().as_deref(), Some("busy"));
    }

    #[test]
    fn test_children_destroyed_with_parent() {
        let mut h = Harness::new();
        let parent = Component::new(&h.app, (), Hooks::new());
        let child = Component::new(&h.app, (), Hooks::new());
        parent.add_child(child.clone());
        h.tick();

        parent.destroy();
        assert!(child.is_destroyed());
        assert_eq!(parent.child_count(), 0);

        let late = Component::new(&h.app, (), Hooks::new());
        parent.add_child(late.clone());
        assert!(late.is_destroyed());
    }

    #[test]
    fn test_tweens_cancelled_on_destroy() {
        let mut h = Harness::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        let component = Component::new(
            &h.app,
            (),
            Hooks::new().on_init(move |_, ctx| {
                let f = f.clone();
                ctx.delay(50.0).then(move || f.set(true));
            }),
        );
        h.tick();
        component.destroy();
        for _ in 0..10 {
            h.tick();
        }

        assert!(!fired.get());
        assert!(component.tweens().is_empty());
    }

    #[test]
    fn test_sibling_destroyed_mid_broadcast_gets_no_update() {
        let mut h = Harness::new();
        let target: Rc<RefCell<Option<WeakComponent<u32>>>> = Rc::new(RefCell::new(None));
        let t = target.clone();
        // Subscribed first, so it runs before the victim in every broadcast.
        let _killer = Component::new(
            &h.app,
            (),
            Hooks::new().on_update(move |_, _, _| {
                if let Some(victim) = t.borrow().as_ref().and_then(WeakComponent::upgrade) {
                    victim.destroy();
                }
            }),
        );
        let counting = Hooks::new().on_update(|n: &mut u32, _, _| *n += 1);
        let victim = Component::new(&h.app, 0u32, counting);
        *target.borrow_mut() = Some(victim.downgrade());

        h.tick();
        h.tick();

        assert!(victim.is_destroyed());
        assert_eq!(victim.with_state(|n| *n), Some(0));
    }
}
