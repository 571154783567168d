//! Owner-scoped tween groups and the clock that drives them.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use log::trace;

use super::timeline::{Animation, Completion, Control, Tween, TweenOptions};

struct Entry {
    control: Rc<Control>,
    animation: Rc<RefCell<dyn Animation>>,
}

impl Clone for Entry {
    fn clone(&self) -> Self {
        Self {
            control: Rc::clone(&self.control),
            animation: Rc::clone(&self.animation),
        }
    }
}

struct GroupInner {
    entries: RefCell<Vec<Entry>>,
    paused: Cell<bool>,
    time_scale: Cell<f64>,
}

/// The set of timelines one owner created.
///
/// Each component gets its own group, so clearing one component's tweens
/// never touches another's. Clones share the same set.
#[derive(Clone)]
pub struct TweenGroup {
    inner: Rc<GroupInner>,
}

impl TweenGroup {
    /// Create a running group at normal speed.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(false, 1.0)
    }

    /// Create a group with an initial paused state and time scale.
    #[must_use]
    pub fn with_settings(paused: bool, time_scale: f64) -> Self {
        Self {
            inner: Rc::new(GroupInner {
                entries: RefCell::new(Vec::new()),
                paused: Cell::new(paused),
                time_scale: Cell::new(time_scale),
            }),
        }
    }

    /// Create a timeline bound to `target`.
    pub fn get<T: 'static>(&self, target: Rc<RefCell<T>>, options: TweenOptions) -> Tween<T> {
        let tween = Tween::new(target, options);
        self.inner.entries.borrow_mut().push(Entry {
            control: tween.control(),
            animation: tween.animation(),
        });
        tween
    }

    /// Create a timeline with no target, for waits and callbacks.
    pub fn timer(&self, options: TweenOptions) -> Tween<()> {
        self.get(Rc::new(RefCell::new(())), options)
    }

    /// Resolve after `ms` milliseconds of this group's time.
    pub fn delay(&self, ms: f64) -> Completion {
        self.timer(TweenOptions::default()).wait(ms).completion()
    }

    /// Advance every live timeline by `dt` ms (scaled by the time scale).
    ///
    /// Timelines created during the advance start on the next call.
    pub fn advance(&self, dt: f64) {
        if self.inner.paused.get() {
            return;
        }
        let dt = dt * self.inner.time_scale.get();

        let snapshot: Vec<Entry> = self.inner.entries.borrow().clone();
        for entry in &snapshot {
            if entry.control.is_done() {
                continue;
            }
            // A timeline that is mid-advance further up the stack is skipped.
            if let Ok(mut animation) = entry.animation.try_borrow_mut() {
                animation.advance(dt);
            }
        }

        self.inner
            .entries
            .borrow_mut()
            .retain(|entry| !entry.control.is_done());
    }

    /// Drop every timeline from the group.
    ///
    /// With `stop_all`, the timelines are cancelled: their handles report
    /// cancelled and no pending step runs, even one queued later in a
    /// timeline that is advancing right now. Without it they are only
    /// detached and stop advancing with this group.
    pub fn reset(&self, stop_all: bool) {
        let entries = std::mem::take(&mut *self.inner.entries.borrow_mut());
        if stop_all {
            for entry in &entries {
                entry.control.alive.set(false);
            }
        }
        if !entries.is_empty() {
            trace!("tween group reset, {} timeline(s) dropped", entries.len());
        }
    }

    pub fn pause(&self) {
        self.inner.paused.set(true);
    }

    pub fn resume(&self) {
        self.inner.paused.set(false);
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.inner.paused.get()
    }

    pub fn set_time_scale(&self, scale: f64) {
        self.inner.time_scale.set(scale.max(0.0));
    }

    #[must_use]
    pub fn time_scale(&self) -> f64 {
        self.inner.time_scale.get()
    }

    /// Number of timelines still owned by the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn downgrade(&self) -> Weak<GroupInner> {
        Rc::downgrade(&self.inner)
    }
}

impl Default for TweenGroup {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TweenGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenGroup")
            .field("timelines", &self.len())
            .field("paused", &self.is_paused())
            .field("time_scale", &self.time_scale())
            .finish()
    }
}

/// Advances every registered group once per frame.
///
/// Groups are held weakly: dropping the last handle to a group removes it.
#[derive(Clone, Default)]
pub struct TweenClock {
    groups: Rc<RefCell<Vec<Weak<GroupInner>>>>,
}

impl TweenClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group driven by this clock.
    #[must_use]
    pub fn create_group(&self) -> TweenGroup {
        let group = TweenGroup::new();
        self.register(&group);
        group
    }

    /// Drive an existing group.
    pub fn register(&self, group: &TweenGroup) {
        self.groups.borrow_mut().push(group.downgrade());
    }

    /// Advance all live groups by `dt` ms.
    pub fn advance(&self, dt: f64) {
        let live: Vec<Rc<GroupInner>> = {
            let mut groups = self.groups.borrow_mut();
            groups.retain(|g| g.strong_count() > 0);
            groups.iter().filter_map(Weak::upgrade).collect()
        };
        for inner in live {
            TweenGroup { inner }.advance(dt);
        }
    }

    /// Number of live groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.borrow().iter().filter(|g| g.strong_count() > 0).count()
    }
}

impl fmt::Debug for TweenClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenClock").field("groups", &self.group_count()).finish()
    }
}
