//! # showcase-shell
//!
//! A frame-driven application shell and the card-stack showcase built on it.
//!
//! ## Design Principles
//!
//! 1. **One Frame Order**: every frame runs resize, update, tweens, then
//!    next-tick callbacks. Nothing else drives components.
//!
//! 2. **Components Own Their Cleanup**: whatever a component subscribed to
//!    or created is released by `destroy()` in a fixed order, exactly once.
//!
//! 3. **Collaborators Behind Traits**: the renderer, the window, the asset
//!    loader, the audio backend and HTTP are reached through narrow traits,
//!    with headless implementations in the crate.
//!
//! ## Architecture
//!
//! - **Single-Threaded Sharing**: handles are `Rc` clones over interior
//!   state. Callbacks hold weak handles so nothing keeps a destroyed
//!   component alive.
//!
//! - **Virtual Resolution**: scenes lay out against a reference size; the
//!   viewport manager scales the root to the window.
//!
//! ## Modules
//!
//! - `core`: errors, configuration, RNG, math helpers
//! - `events`: typed emitter used for every broadcast
//! - `tween`: timelines, easing, per-owner groups and the clock
//! - `viewport`: resolution selection and root scaling
//! - `app`: the application handle and frame ticker
//! - `lifecycle`: components, hooks and teardown
//! - `assets`: resources by alias
//! - `audio`: named-sound playback
//! - `cards`: the card-stack state machine
//! - `dialogue`: the word-by-word dialogue document
//! - `scenes`: menu, the three showcase scenes and the director

pub mod core;
pub mod events;
pub mod tween;
pub mod viewport;
pub mod app;
pub mod lifecycle;
pub mod assets;
pub mod audio;
pub mod cards;
pub mod dialogue;
pub mod scenes;

// Re-export commonly used types
pub use crate::core::{
    AppConfig, ComponentError, ReferenceSize, ResolutionBreakpoint, Result, ShellError, ShellRng,
    ShellRngState,
};

pub use crate::events::{Emitter, ListenerId};

pub use crate::tween::{Completion, Ease, Tween, TweenClock, TweenGroup, TweenLoop, TweenOptions};

pub use crate::viewport::{
    select_device_pixel_ratio, FixedWindow, MemorySurface, RenderSurface, ResizeEvent,
    ViewportManager, WindowSource,
};

pub use crate::app::{App, Ticker};

pub use crate::lifecycle::{Component, Ctx, Hooks, Lifecycle, LifecycleState, WeakComponent};

pub use crate::assets::{
    AssetDescriptor, AssetKind, AssetLoader, AssetStore, MemoryAssetLoader, Resource,
};

pub use crate::audio::{
    AudioBackend, AudioConfig, AudioEngine, PlayOptions, PlayType, RecordingAudioBackend,
};

pub use crate::cards::{schedule, CardData, CardMoveEvent, CardStackMachine, MoveDirection, StackId};

pub use crate::dialogue::{fetch_dialogue, DialogueData, JsonFetcher, StaticFetcher};

pub use crate::scenes::{showcase_director, start_showcase, Director, SceneKey, StatusText};
