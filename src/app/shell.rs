//! The application handle.

use std::cell::{Cell, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};

use super::ticker::Ticker;
use crate::assets::{AssetLoader, AssetStore, MemoryAssetLoader};
use crate::audio::AudioEngine;
use crate::core::config::AppConfig;
use crate::core::error::{Result, ShellError};
use crate::core::rng::ShellRng;
use crate::events::Emitter;
use crate::tween::{Completion, Tween, TweenClock, TweenGroup, TweenOptions};
use crate::viewport::{
    select_device_pixel_ratio, RenderSurface, ResizeEvent, ViewportManager, WindowSource,
};

struct AppInner {
    config: AppConfig,
    started: Cell<bool>,
    viewport: RefCell<ViewportManager>,
    ticker: Ticker,
    clock: TweenClock,
    tweens: TweenGroup,
    on_init: Emitter<()>,
    on_update: Emitter<f64>,
    on_resize: Emitter<ResizeEvent>,
    assets: AssetStore,
    audio: AudioEngine,
    rng: RefCell<ShellRng>,
}

/// Shared handle to the running application.
///
/// Owns the viewport, the frame ticker, the tween clock, the asset store and
/// the audio engine, and broadcasts `update` and `resize` to whoever
/// subscribed. Clones share the same application.
#[derive(Clone)]
pub struct App {
    inner: Rc<AppInner>,
}

impl App {
    /// Create an app whose assets are served from memory.
    ///
    /// The device pixel ratio is sampled from `window` once, here.
    pub fn new(config: AppConfig, window: &dyn WindowSource) -> Self {
        Self::with_loader(config, window, Box::new(MemoryAssetLoader::new()))
    }

    /// Create an app with a custom asset loader.
    pub fn with_loader(
        config: AppConfig,
        window: &dyn WindowSource,
        loader: Box<dyn AssetLoader>,
    ) -> Self {
        let dpr = config.dpr_override.unwrap_or_else(|| {
            let (width, height) = window.inner_size();
            select_device_pixel_ratio(
                &config.reference_size.resolution_breakpoints,
                width,
                height,
                window.device_pixel_ratio(),
            )
        });
        debug!("app created with device pixel ratio {dpr}");

        let clock = TweenClock::new();
        let tweens = clock.create_group();

        Self {
            inner: Rc::new(AppInner {
                viewport: RefCell::new(ViewportManager::new(config.reference_size.clone(), dpr)),
                ticker: Ticker::new(config.max_delta_ms),
                rng: RefCell::new(ShellRng::new(config.seed)),
                assets: AssetStore::new(loader, dpr),
                audio: AudioEngine::new(),
                started: Cell::new(false),
                on_init: Emitter::new(),
                on_update: Emitter::new(),
                on_resize: Emitter::new(),
                config,
                clock,
                tweens,
            }),
        }
    }

    /// Start the frame loop. Fails if already started.
    pub fn start(&self) -> Result<()> {
        if self.inner.started.replace(true) {
            return Err(ShellError::AlreadyInitialized("App"));
        }
        debug!("app started");
        self.inner.on_init.notify();
        Ok(())
    }

    #[must_use]
    pub fn is_started(&self) -> bool {
        self.inner.started.get()
    }

    /// Run one frame of `dt` ms.
    ///
    /// Order: viewport check (and `resize` broadcast), `update` broadcast,
    /// tweens, then the next-tick callbacks queued before this frame began.
    pub fn tick(&self, dt: f64, window: &dyn WindowSource, surface: &mut dyn RenderSurface) {
        let inner = &self.inner;
        if !inner.started.get() {
            trace!("tick before start ignored");
            return;
        }

        let dt = inner.ticker.begin_frame(dt);
        let pending = inner.ticker.take_pending();
        trace!("frame {} dt {dt:.2}ms", inner.ticker.frame_count());

        let resized = inner.viewport.borrow_mut().check(window, surface);
        if let Some(event) = resized {
            inner.on_resize.emit(&event);
        }

        inner.on_update.emit(&dt);
        inner.clock.advance(dt);

        for task in pending {
            task();
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Virtual width.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.inner.viewport.borrow().width()
    }

    /// Virtual height.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.inner.viewport.borrow().height()
    }

    #[must_use]
    pub fn dpr(&self) -> f64 {
        self.inner.viewport.borrow().dpr()
    }

    /// The virtual size as of the latest resize.
    #[must_use]
    pub fn resize_event(&self) -> ResizeEvent {
        self.inner.viewport.borrow().current()
    }

    pub fn on_init(&self) -> &Emitter<()> {
        &self.inner.on_init
    }

    /// Per-frame broadcast carrying the clamped delta in ms.
    pub fn on_update(&self) -> &Emitter<f64> {
        &self.inner.on_update
    }

    pub fn on_resize(&self) -> &Emitter<ResizeEvent> {
        &self.inner.on_resize
    }

    pub fn ticker(&self) -> &Ticker {
        &self.inner.ticker
    }

    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.inner.ticker.frame_count()
    }

    /// The app-wide tween group.
    pub fn tween_group(&self) -> &TweenGroup {
        &self.inner.tweens
    }

    /// A new tween group driven by the app's clock.
    #[must_use]
    pub fn create_tween_group(&self) -> TweenGroup {
        self.inner.clock.create_group()
    }

    /// Tween `target` on the app-wide group.
    pub fn tween<T: 'static>(&self, target: Rc<RefCell<T>>, options: TweenOptions) -> Tween<T> {
        self.inner.tweens.get(target, options)
    }

    /// Resolve after `ms` of app time.
    pub fn delay(&self, ms: f64) -> Completion {
        self.inner.tweens.delay(ms)
    }

    pub fn assets(&self) -> &AssetStore {
        &self.inner.assets
    }

    pub fn audio(&self) -> &AudioEngine {
        &self.inner.audio
    }

    /// Window focus changed.
    pub fn set_focused(&self, focused: bool) {
        self.inner.audio.set_focused(focused);
    }

    /// The app's random source. Do not hold the borrow across callbacks.
    pub fn rng(&self) -> RefMut<'_, ShellRng> {
        self.inner.rng.borrow_mut()
    }
}

impl fmt::Debug for App {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("App")
            .field("started", &self.inner.started.get())
            .field("viewport", &self.resize_event())
            .field("ticker", &self.inner.ticker)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::viewport::{FixedWindow, MemorySurface};

    fn app() -> (App, FixedWindow, MemorySurface) {
        let window = FixedWindow::new(1920, 1080, 1.0);
        (App::new(AppConfig::showcase(), &window), window, MemorySurface::new())
    }

    #[test]
    fn test_start_twice_fails() {
        let (app, _, _) = app();
        assert!(app.start().is_ok());
        assert_eq!(app.start().unwrap_err().to_string(), "App already initialized!");
    }

    #[test]
    fn test_dpr_sampled_from_window() {
        let (app, _, _) = app();
        assert_eq!(app.dpr(), 2.0);

        let small = FixedWindow::new(800, 600, 3.0);
        assert_eq!(App::new(AppConfig::showcase(), &small).dpr(), 1.0);

        let fixed = App::new(AppConfig::showcase().with_dpr_override(1.5), &small);
        assert_eq!(fixed.dpr(), 1.5);
    }

    #[test]
    fn test_ticks_before_start_are_ignored() {
        let (app, window, mut surface) = app();
        app.tick(16.0, &window, &mut surface);
        assert_eq!(app.frame_count(), 0);
        assert_eq!(surface.resize_count, 0);
    }

    #[test]
    fn test_tick_order() {
        let (app, window, mut surface) = app();
        app.start().unwrap();

        let log = Rc::new(RefCell::new(Vec::new()));
        let l = log.clone();
        app.on_resize()
            .on(move |e: &ResizeEvent| l.borrow_mut().push(format!("resize {}", e.height)));
        let l = log.clone();
        app.on_update().on(move |dt: &f64| l.borrow_mut().push(format!("update {dt}")));
        let l = log.clone();
        app.ticker().add_once(move || l.borrow_mut().push("once".to_string()));

        app.tick(250.0, &window, &mut surface);
        app.tick(16.0, &window, &mut surface);

        assert_eq!(
            *log.borrow(),
            vec!["resize 2160", "update 100", "once", "update 16"]
        );
        assert_eq!(app.height(), 2160.0);
    }

    #[test]
    fn test_task_queued_during_tick_runs_next_tick() {
        let (app, window, mut surface) = app();
        app.start().unwrap();

        let hits = Rc::new(Cell::new(0));
        let (h, a) = (hits.clone(), app.clone());
        app.ticker().add_once(move || {
            let h = h.clone();
            a.ticker().add_once(move || h.set(h.get() + 1));
        });

        app.tick(16.0, &window, &mut surface);
        assert_eq!(hits.get(), 0);
        app.tick(16.0, &window, &mut surface);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_delay_resolves_with_app_time() {
        let (app, window, mut surface) = app();
        app.start().unwrap();

        let done = app.delay(40.0);
        app.tick(16.0, &window, &mut surface);
        app.tick(16.0, &window, &mut surface);
        assert!(!done.is_done());
        app.tick(16.0, &window, &mut surface);
        assert!(done.is_done());
    }
}
