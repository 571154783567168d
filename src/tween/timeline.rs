//! A single interpolation timeline.
//!
//! A [`Tween`] is a chain of steps played in order against one target:
//!
//! | Step | Time | Effect |
//! |------|------|--------|
//! | `wait(ms)` | `ms` | nothing |
//! | `to(props, ms, ease)` | `ms` | interpolates each property from its value when the step starts |
//! | `set(props)` | 0 | assigns immediately |
//! | `call(f)` | 0 | invokes `f` |
//! | `label(name)` | 0 | marks a position |
//!
//! Properties are addressed with field lenses (`fn(&mut T) -> &mut f64`), so a
//! typo is a compile error rather than a silently ignored key.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::warn;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::events::Emitter;

use super::ease::Ease;

/// Accessor for one animatable `f64` field of a target.
pub type Lens<T> = fn(&mut T) -> &mut f64;

type Props<T> = SmallVec<[(Lens<T>, f64); 4]>;

/// How many times a timeline repeats after its first pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweenLoop {
    /// Play once.
    #[default]
    Never,
    /// Play once, then `n` more times.
    Count(u32),
    /// Repeat until cancelled.
    Forever,
}

impl TweenLoop {
    /// Convert the conventional integer form (`-1` = forever, `0` = once).
    #[must_use]
    pub fn from_raw(raw: i32) -> Self {
        match raw {
            r if r < 0 => TweenLoop::Forever,
            0 => TweenLoop::Never,
            r => TweenLoop::Count(r as u32),
        }
    }
}

/// Options for [`super::TweenGroup::get`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TweenOptions {
    /// Repeat behavior.
    pub loop_count: TweenLoop,
    /// Start paused; call [`Tween::play`] to begin.
    pub paused: bool,
}

impl TweenOptions {
    /// Repeat until cancelled.
    #[must_use]
    pub fn forever() -> Self {
        Self {
            loop_count: TweenLoop::Forever,
            paused: false,
        }
    }

    /// Set the repeat behavior from the integer form.
    #[must_use]
    pub fn with_loop(mut self, raw: i32) -> Self {
        self.loop_count = TweenLoop::from_raw(raw);
        self
    }

    /// Start paused.
    #[must_use]
    pub fn paused(mut self) -> Self {
        self.paused = true;
        self
    }
}

/// Resolves when a timeline plays to its end.
///
/// Cancelled timelines never resolve.
#[derive(Clone, Default)]
pub struct Completion {
    done: Rc<Cell<bool>>,
    on_done: Emitter<()>,
}

impl Completion {
    /// Create an unresolved completion.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the timeline finished.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done.get()
    }

    /// Run `f` when resolved, or right away if already resolved.
    pub fn then(&self, f: impl FnOnce() + 'static) {
        if self.is_done() {
            f();
            return;
        }
        let mut f = Some(f);
        self.on_done.once(move |_| {
            if let Some(f) = f.take() {
                f();
            }
        });
    }

    pub(crate) fn resolve(&self) {
        if !self.done.replace(true) {
            self.on_done.notify();
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Completion").field("done", &self.is_done()).finish()
    }
}

/// Run state shared between a timeline, its handles and its group.
///
/// Kept outside the timeline's `RefCell` so callbacks running inside an
/// advance can still pause or cancel.
#[derive(Debug)]
pub(crate) struct Control {
    pub(crate) alive: Cell<bool>,
    pub(crate) paused: Cell<bool>,
    pub(crate) finished: Cell<bool>,
}

impl Control {
    fn new(paused: bool) -> Self {
        Self {
            alive: Cell::new(true),
            paused: Cell::new(paused),
            finished: Cell::new(false),
        }
    }

    pub(crate) fn is_done(&self) -> bool {
        !self.alive.get() || self.finished.get()
    }
}

enum Step<T> {
    Wait(f64),
    To { props: Props<T>, duration: f64, ease: Ease },
    Set(Props<T>),
    Call(Box<dyn FnMut()>),
    Label(String),
}

impl<T> Step<T> {
    fn duration(&self) -> f64 {
        match self {
            Step::Wait(d) | Step::To { duration: d, .. } => *d,
            _ => 0.0,
        }
    }
}

/// Type-erased view used by groups.
pub(crate) trait Animation {
    /// Advance by `dt` ms. Returns true when the timeline is done.
    fn advance(&mut self, dt: f64) -> bool;
}

pub(crate) struct Timeline<T: 'static> {
    target: Rc<RefCell<T>>,
    steps: Vec<Step<T>>,
    cursor: usize,
    step_elapsed: f64,
    step_started: bool,
    start_values: SmallVec<[f64; 4]>,
    loops: TweenLoop,
    pass_time: f64,
    position: f64,
    on_change: Option<Box<dyn FnMut(&T)>>,
    control: Rc<Control>,
    completion: Completion,
}

impl<T: 'static> Timeline<T> {
    fn next_step(&mut self) {
        self.cursor += 1;
        self.step_elapsed = 0.0;
        self.step_started = false;
    }

    fn write(&mut self, props: &[(Lens<T>, f64)], values: impl Iterator<Item = f64>) -> bool {
        let Ok(mut target) = self.target.try_borrow_mut() else {
            warn!("tween target is borrowed elsewhere, skipping write");
            return false;
        };
        for ((lens, _), value) in props.iter().zip(values) {
            *lens(&mut target) = value;
        }
        true
    }

    fn capture_start(&mut self) {
        let Step::To { props, .. } = &self.steps[self.cursor] else {
            return;
        };
        let Ok(mut target) = self.target.try_borrow_mut() else {
            return;
        };
        self.start_values = props.iter().map(|(lens, _)| *lens(&mut target)).collect();
    }

    /// Move to the next pass, or finish. Returns false when finished.
    fn end_of_pass(&mut self) -> bool {
        match self.loops {
            TweenLoop::Never => {
                self.control.finished.set(true);
                self.completion.resolve();
                return false;
            }
            TweenLoop::Count(n) => {
                self.loops = if n <= 1 { TweenLoop::Never } else { TweenLoop::Count(n - 1) };
            }
            TweenLoop::Forever => {}
        }
        self.cursor = 0;
        self.step_elapsed = 0.0;
        self.step_started = false;
        true
    }
}

impl<T: 'static> Animation for Timeline<T> {
    fn advance(&mut self, dt: f64) -> bool {
        if self.control.is_done() {
            return true;
        }
        if self.control.paused.get() {
            return false;
        }

        let mut remaining = dt.max(0.0);
        let mut changed = false;

        loop {
            if !self.control.alive.get() {
                return true;
            }

            if self.cursor >= self.steps.len() {
                let idle_pass = self.pass_time <= 0.0;
                self.pass_time = 0.0;
                if !self.end_of_pass() {
                    break;
                }
                // A pass that takes no time would spin forever within one frame.
                if idle_pass {
                    break;
                }
                continue;
            }

            let index = self.cursor;
            match &self.steps[index] {
                Step::Wait(_) | Step::To { .. } => {
                    if !self.step_started {
                        self.capture_start();
                        self.step_started = true;
                    }

                    let duration = self.steps[index].duration();
                    let used = remaining.min(duration - self.step_elapsed).max(0.0);
                    self.step_elapsed += used;
                    self.position += used;
                    self.pass_time += used;
                    remaining -= used;

                    if let Step::To { props, ease, .. } = &self.steps[index] {
                        let progress = if duration > 0.0 {
                            ease.apply(self.step_elapsed / duration)
                        } else {
                            1.0
                        };
                        let props = props.clone();
                        let starts = self.start_values.clone();
                        let values = props
                            .iter()
                            .zip(starts)
                            .map(|((_, goal), start)| start + (goal - start) * progress);
                        changed |= self.write(&props, values);
                    }

                    if self.step_elapsed >= duration {
                        self.next_step();
                    } else {
                        break;
                    }
                }
                Step::Set(props) => {
                    let props = props.clone();
                    let values = props.iter().map(|(_, v)| *v);
                    changed |= self.write(&props, values);
                    self.next_step();
                }
                Step::Call(_) => {
                    self.next_step();
                    if let Step::Call(callback) = &mut self.steps[index] {
                        callback();
                    }
                }
                Step::Label(_) => self.next_step(),
            }
        }

        if changed {
            let target = self.target.try_borrow();
            if let (Some(on_change), Ok(target)) = (self.on_change.as_mut(), target) {
                on_change(&target);
            }
        }

        self.control.is_done()
    }
}

/// Handle to one timeline.
///
/// Cloning the handle does not clone the timeline. Builder methods consume
/// and return the handle so steps chain:
///
/// ```
/// use showcase_shell::tween::{Ease, TweenGroup, TweenOptions};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// #[derive(Default)]
/// struct Sprite { x: f64, alpha: f64 }
///
/// fn x(s: &mut Sprite) -> &mut f64 { &mut s.x }
/// fn alpha(s: &mut Sprite) -> &mut f64 { &mut s.alpha }
///
/// let group = TweenGroup::new();
/// let sprite = Rc::new(RefCell::new(Sprite::default()));
///
/// group
///     .get(Rc::clone(&sprite), TweenOptions::default())
///     .set(&[(alpha, 1.0)])
///     .to(&[(x, 100.0)], 200.0, Ease::Linear);
///
/// group.advance(100.0);
/// assert_eq!(sprite.borrow().x, 50.0);
/// assert_eq!(sprite.borrow().alpha, 1.0);
/// ```
pub struct Tween<T: 'static> {
    timeline: Rc<RefCell<Timeline<T>>>,
    target: Rc<RefCell<T>>,
    control: Rc<Control>,
    completion: Completion,
}

impl<T: 'static> Tween<T> {
    pub(crate) fn new(target: Rc<RefCell<T>>, options: TweenOptions) -> Self {
        let control = Rc::new(Control::new(options.paused));
        let completion = Completion::new();
        let timeline = Timeline {
            target: Rc::clone(&target),
            steps: Vec::new(),
            cursor: 0,
            step_elapsed: 0.0,
            step_started: false,
            start_values: SmallVec::new(),
            loops: options.loop_count,
            pass_time: 0.0,
            position: 0.0,
            on_change: None,
            control: Rc::clone(&control),
            completion: completion.clone(),
        };
        Self {
            timeline: Rc::new(RefCell::new(timeline)),
            target,
            control,
            completion,
        }
    }

    pub(crate) fn animation(&self) -> Rc<RefCell<dyn Animation>> {
        self.timeline.clone()
    }

    pub(crate) fn control(&self) -> Rc<Control> {
        Rc::clone(&self.control)
    }

    fn push(self, step: Step<T>) -> Self {
        match self.timeline.try_borrow_mut() {
            Ok(mut timeline) => timeline.steps.push(step),
            Err(_) => warn!("cannot extend a tween from inside its own advance"),
        }
        self
    }

    /// Idle for `duration` ms.
    pub fn wait(self, duration: f64) -> Self {
        self.push(Step::Wait(duration.max(0.0)))
    }

    /// Interpolate properties to the given values over `duration` ms.
    pub fn to(self, props: &[(Lens<T>, f64)], duration: f64, ease: Ease) -> Self {
        self.push(Step::To {
            props: props.iter().copied().collect(),
            duration: duration.max(0.0),
            ease,
        })
    }

    /// Assign properties immediately.
    pub fn set(self, props: &[(Lens<T>, f64)]) -> Self {
        self.push(Step::Set(props.iter().copied().collect()))
    }

    /// Invoke a callback when this point is reached.
    pub fn call(self, callback: impl FnMut() + 'static) -> Self {
        self.push(Step::Call(Box::new(callback)))
    }

    /// Mark a named position.
    pub fn label(self, name: impl Into<String>) -> Self {
        self.push(Step::Label(name.into()))
    }

    /// Called with the target after every advance that wrote a property.
    pub fn on_change(self, callback: impl FnMut(&T) + 'static) -> Self {
        if let Ok(mut timeline) = self.timeline.try_borrow_mut() {
            timeline.on_change = Some(Box::new(callback));
        }
        self
    }

    /// Time offset of a label within one pass, in ms.
    #[must_use]
    pub fn label_position(&self, name: &str) -> Option<f64> {
        let timeline = self.timeline.try_borrow().ok()?;
        let mut offset = 0.0;
        for step in &timeline.steps {
            if let Step::Label(label) = step {
                if label == name {
                    return Some(offset);
                }
            }
            offset += step.duration();
        }
        None
    }

    /// Length of one pass, in ms.
    #[must_use]
    pub fn duration(&self) -> f64 {
        self.timeline
            .try_borrow()
            .map(|t| t.steps.iter().map(Step::duration).sum())
            .unwrap_or(0.0)
    }

    /// Total time played so far, across loops.
    #[must_use]
    pub fn position(&self) -> f64 {
        self.timeline.try_borrow().map(|t| t.position).unwrap_or(0.0)
    }

    /// Resume advancing.
    pub fn play(&self) {
        self.control.paused.set(false);
    }

    /// Stop advancing until [`Tween::play`].
    pub fn pause(&self) {
        self.control.paused.set(true);
    }

    /// Stop permanently. Pending steps never run.
    pub fn cancel(&self) {
        self.control.alive.set(false);
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.control.paused.get()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.control.finished.get()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        !self.control.alive.get()
    }

    /// Resolves when the timeline plays to its end.
    #[must_use]
    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    /// The bound target.
    #[must_use]
    pub fn target(&self) -> Rc<RefCell<T>> {
        Rc::clone(&self.target)
    }
}

impl<T: 'static> Clone for Tween<T> {
    fn clone(&self) -> Self {
        Self {
            timeline: Rc::clone(&self.timeline),
            target: Rc::clone(&self.target),
            control: Rc::clone(&self.control),
            completion: self.completion.clone(),
        }
    }
}

impl<T: 'static> fmt::Debug for Tween<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tween")
            .field("paused", &self.is_paused())
            .field("finished", &self.is_finished())
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
