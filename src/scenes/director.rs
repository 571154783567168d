//! Scene registry and switching.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use log::debug;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::core::error::{Result, ShellError};
use crate::events::Emitter;
use crate::lifecycle::Lifecycle;

/// The scenes of the showcase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneKey {
    Menu,
    AceOfShadows,
    MagicWords,
    PhoenixFlame,
}

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SceneKey::Menu => "Menu",
            SceneKey::AceOfShadows => "AceOfShadows",
            SceneKey::MagicWords => "MagicWords",
            SceneKey::PhoenixFlame => "PhoenixFlame",
        };
        f.write_str(name)
    }
}

/// Builds a scene. Receives the director so the scene can navigate.
pub type SceneFactory = Rc<dyn Fn(&App, &Director) -> Box<dyn Lifecycle>>;

struct DirectorInner {
    app: App,
    factories: RefCell<FxHashMap<SceneKey, SceneFactory>>,
    current: RefCell<Option<(SceneKey, Box<dyn Lifecycle>)>>,
    on_scene_changed: Emitter<SceneKey>,
}

/// Owns the current scene and swaps it on request.
#[derive(Clone)]
pub struct Director {
    inner: Rc<DirectorInner>,
}

/// Non-owning director handle, held by scenes.
#[derive(Clone)]
pub struct WeakDirector {
    inner: Weak<DirectorInner>,
}

impl Director {
    #[must_use]
    pub fn new(app: &App) -> Self {
        Self {
            inner: Rc::new(DirectorInner {
                app: app.clone(),
                factories: RefCell::new(FxHashMap::default()),
                current: RefCell::new(None),
                on_scene_changed: Emitter::new(),
            }),
        }
    }

    /// Register (or replace) the factory for `key`.
    pub fn register(
        &self,
        key: SceneKey,
        factory: impl Fn(&App, &Director) -> Box<dyn Lifecycle> + 'static,
    ) {
        self.inner.factories.borrow_mut().insert(key, Rc::new(factory));
    }

    #[must_use]
    pub fn is_registered(&self, key: SceneKey) -> bool {
        self.inner.factories.borrow().contains_key(&key)
    }

    /// Destroy the current scene, then build and show `key`.
    pub fn show_scene(&self, key: SceneKey) -> Result<()> {
        let factory = self
            .inner
            .factories
            .borrow()
            .get(&key)
            .cloned()
            .ok_or_else(|| ShellError::MissingScene(key.to_string()))?;

        let previous = self.inner.current.borrow_mut().take();
        if let Some((previous_key, scene)) = previous {
            debug!("leaving scene {previous_key}");
            scene.destroy();
        }

        let scene = factory(&self.inner.app, self);
        *self.inner.current.borrow_mut() = Some((key, scene));
        debug!("showing scene {key}");

        self.inner.on_scene_changed.emit(&key);
        Ok(())
    }

    pub fn back_to_menu(&self) -> Result<()> {
        self.show_scene(SceneKey::Menu)
    }

    #[must_use]
    pub fn current_key(&self) -> Option<SceneKey> {
        self.inner.current.borrow().as_ref().map(|(key, _)| *key)
    }

    pub fn on_scene_changed(&self) -> &Emitter<SceneKey> {
        &self.inner.on_scene_changed
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakDirector {
        WeakDirector {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn app(&self) -> &App {
        &self.inner.app
    }
}

impl WeakDirector {
    #[must_use]
    pub fn upgrade(&self) -> Option<Director> {
        self.inner.upgrade().map(|inner| Director { inner })
    }
}

impl fmt::Debug for Director {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Director")
            .field("current", &self.current_key())
            .field("scenes", &self.inner.factories.borrow().len())
            .finish()
    }
}

impl fmt::Debug for WeakDirector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakDirector").finish_non_exhaustive()
    }
}
