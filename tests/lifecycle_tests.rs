//! Component lifecycle integration tests.
//!
//! These tests drive components through a running app:
//! - Deferred load and the ready sequence
//! - Update/resize delivery and teardown order
//! - Nested components and re-entrant destroy

use std::cell::RefCell;
use std::rc::Rc;

use showcase_shell::app::App;
use showcase_shell::core::{AppConfig, ComponentError};
use showcase_shell::lifecycle::{Component, Hooks, Lifecycle, LifecycleState};
use showcase_shell::tween::TweenOptions;
use showcase_shell::viewport::{FixedWindow, MemorySurface};

type Journal = Rc<RefCell<Vec<String>>>;

struct World {
    app: App,
    window: FixedWindow,
    surface: MemorySurface,
}

impl World {
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

    fn tick(&mut self, dt: f64) {
        self.app.tick(dt, &self.window, &mut self.surface);
    }
}

fn journaled(journal: &Journal, name: &'static str) -> Hooks<()> {
    let (a, b, c) = (journal.clone(), journal.clone(), journal.clone());
    let (d, e) = (journal.clone(), journal.clone());
    Hooks::new()
        .on_load(move |_, _| {
            a.borrow_mut().push(format!("{name}:load"));
            Ok(())
        })
        .on_init(move |_, _| b.borrow_mut().push(format!("{name}:init")))
        .on_update(move |_, _, _| c.borrow_mut().push(format!("{name}:update")))
        .on_resize(move |_, _, event| {
            d.borrow_mut().push(format!("{name}:resize {}x{}", event.width, event.height))
        })
        .on_unload(move |_, _| {
            e.borrow_mut().push(format!("{name}:unload"));
            Ok(())
        })
}

// =============================================================================
// Ready Sequence Tests
// =============================================================================

/// Test the full sequence from construction to first update.
#[test]
fn test_ready_sequence() {
    let mut world = World::new();
    let journal: Journal = Rc::default();
    let component = Component::new(&world.app, (), journaled(&journal, "a"));

    let j = journal.clone();
    component.on_init().on(move |_| j.borrow_mut().push("a:on_init".into()));

    assert!(journal.borrow().is_empty());
    world.tick(16.0);
    world.tick(16.0);

    assert_eq!(
        *journal.borrow(),
        vec!["a:load", "a:on_init", "a:init", "a:resize 3840x2160", "a:update"]
    );
}

/// Test that a window change reaches ready components.
#[test]
fn test_resize_broadcast() {
    let mut world = World::new();
    let journal: Journal = Rc::default();
    let _component = Component::new(&world.app, (), journaled(&journal, "a"));
    world.tick(16.0);
    journal.borrow_mut().clear();

    world.window.set_size(1080, 1080);
    world.tick(16.0);

    assert_eq!(journal.borrow()[0], "a:resize 2160x2160");
}

// =============================================================================
// Teardown Tests
// =============================================================================

/// Test teardown order across a parent and its child.
#[test]
fn test_teardown_order() {
    let mut world = World::new();
    let journal: Journal = Rc::default();
    let parent = Component::new(&world.app, (), journaled(&journal, "parent"));
    let child = Component::new(&world.app, (), journaled(&journal, "child"));
    parent.add_child(child.clone());

    let j = journal.clone();
    parent.on_destroy().on(move |_| j.borrow_mut().push("parent:on_destroy".into()));
    world.tick(16.0);
    journal.borrow_mut().clear();

    parent.destroy();

    assert_eq!(
        *journal.borrow(),
        vec!["parent:unload", "parent:on_destroy", "child:unload"]
    );
    assert_eq!(child.state(), LifecycleState::Destroyed);

    world.tick(16.0);
    assert_eq!(journal.borrow().len(), 3);
}

/// Test that a failing unload does not stop the rest of teardown.
#[test]
fn test_unload_failure_continues_teardown() {
    let mut world = World::new();
    let destroyed = Rc::new(RefCell::new(false));
    let component = Component::new(
        &world.app,
        (),
        Hooks::new().on_unload(|_, _| Err(ComponentError::new("still in use"))),
    );
    let child = Component::new(&world.app, (), Hooks::new());
    component.add_child(child.clone());
    let d = destroyed.clone();
    component.on_destroy().on(move |_| *d.borrow_mut() = true);
    world.tick(16.0);

    component.destroy();

    assert!(*destroyed.borrow());
    assert!(child.is_destroyed());
}

/// Test that a component's tweens stop with it while the app's keep running.
#[test]
fn test_tweens_scoped_to_component() {
    let mut world = World::new();
    let app_done = world.app.delay(100.0);
    let component_done = Rc::new(RefCell::new(None));

    let slot = component_done.clone();
    let component = Component::new(
        &world.app,
        (),
        Hooks::new().on_init(move |_, ctx| {
            *slot.borrow_mut() = Some(ctx.delay(100.0));
            ctx.timer(TweenOptions::forever()).wait(10.0);
        }),
    );
    world.tick(16.0);
    assert_eq!(component.tweens().len(), 2);

    component.destroy();
    for _ in 0..10 {
        world.tick(16.0);
    }

    assert!(app_done.is_done());
    assert!(!component_done.borrow().as_ref().unwrap().is_done());
}

// =============================================================================
// Re-entrancy Tests
// =============================================================================

/// Test a component that builds a replacement and destroys itself on init.
#[test]
fn test_replace_self_on_init() {
    let mut world = World::new();
    let successor: Rc<RefCell<Option<Component<u32>>>> = Rc::default();

    let slot = successor.clone();
    let first = Component::new(
        &world.app,
        (),
        Hooks::new().on_init(move |_, ctx| {
            let counting = Hooks::new().on_update(|frames: &mut u32, _, _| *frames += 1);
            let next = Component::new(ctx.app(), 0u32, counting);
            *slot.borrow_mut() = Some(next);
            ctx.destroy_self();
        }),
    );

    world.tick(16.0);
    assert!(first.is_destroyed());

    world.tick(16.0);
    world.tick(16.0);
    let next = successor.borrow().clone().unwrap();
    assert!(next.is_ready());
    assert_eq!(next.with_state(|frames| *frames), Some(1));
}

/// Test that a load hook can fail via `?` on a lookup error.
#[test]
fn test_load_error_from_missing_asset() {
    let mut world = World::new();
    let component = Component::new(
        &world.app,
        String::new(),
        Hooks::new().on_load(|_, ctx| {
            ctx.app().assets().add_atlas("textures/cards", Some(1.0))?;
            Ok(())
        }),
    );
    world.tick(16.0);

    let err = component.load_error().unwrap();
    assert!(err.message().contains("textures/cards@1x.json"));
    assert!(err.shell_error().is_some());
    assert!(component.is_ready());
}
