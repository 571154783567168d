//! The showcase's scenes and the director that switches between them.
//!
//! Every scene is a [`Component`](crate::lifecycle::Component) with its own
//! state type; the director only sees them as
//! [`Lifecycle`](crate::lifecycle::Lifecycle) objects.

pub mod ace_of_shadows;
mod director;
pub mod hud;
pub mod magic_words;
pub mod menu;
pub mod phoenix_flame;
mod status;

use std::rc::Rc;

use log::error;

pub use director::{Director, SceneFactory, SceneKey, WeakDirector};
pub use status::StatusText;

use crate::app::App;
use crate::audio::{AudioBackend, AudioConfig};
use crate::core::error::Result;
use crate::dialogue::JsonFetcher;

/// A director with every showcase scene registered.
///
/// `dialogue_url` is where the word-by-word scene fetches its document.
pub fn showcase_director(app: &App, fetcher: Rc<dyn JsonFetcher>, dialogue_url: &str) -> Director {
    let director = Director::new(app);
    let url = dialogue_url.to_string();

    director.register(SceneKey::Menu, |app, director| Box::new(menu::create(app, director)));
    director.register(SceneKey::AceOfShadows, |app, director| {
        Box::new(ace_of_shadows::create(app, director))
    });
    director.register(SceneKey::MagicWords, move |app, director| {
        Box::new(magic_words::create(app, director, Rc::clone(&fetcher), &url))
    });
    director.register(SceneKey::PhoenixFlame, |app, director| {
        Box::new(phoenix_flame::create(app, director))
    });

    director
}

/// Start `app`, load the sound manifest, then show the menu.
///
/// Fails on the first error: a second start, or a sound that would not load.
/// No scene is shown in that case.
pub fn start_showcase(
    app: &App,
    sounds: AudioConfig,
    backend: Rc<dyn AudioBackend>,
    fetcher: Rc<dyn JsonFetcher>,
    dialogue_url: &str,
) -> Result<Director> {
    app.start()?;
    if let Err(err) = app.audio().init(sounds, backend) {
        error!("Error loading assets: {err}");
        return Err(err);
    }

    let director = showcase_director(app, fetcher, dialogue_url);
    director.back_to_menu()?;
    Ok(director)
}
