//! Overlay shared by the showcase scenes: a back button in the top left.

use crate::app::App;
use crate::core::error::{Result, ShellError};
use crate::lifecycle::{Component, Ctx, Hooks};

use super::director::{SceneKey, WeakDirector};

/// Inset of the back button from the top-left corner.
pub const BUTTON_PADDING: f64 = 128.0;

pub const BACK_LABEL: &str = "Back";

#[derive(Debug)]
pub struct HudState {
    director: WeakDirector,
    /// Back button centre, relative to the scene centre.
    pub back_button: (f64, f64),
}

/// Build a HUD that navigates through `director`.
pub fn create(app: &App, director: &WeakDirector) -> Component<HudState> {
    let state = HudState {
        director: director.clone(),
        back_button: (0.0, 0.0),
    };
    let hooks = Hooks::new().on_resize(|state: &mut HudState, _, event| {
        state.back_button = (
            -event.width / 2.0 + BUTTON_PADDING + 60.0,
            -event.height / 2.0 + BUTTON_PADDING + 30.0,
        );
    });

    Component::new(app, state, hooks)
}

/// Create a HUD owned by the component behind `ctx`.
pub fn attach<S: 'static>(ctx: &Ctx<'_, S>, director: &WeakDirector) -> Component<HudState> {
    let hud = create(ctx.app(), director);
    ctx.add_child(hud.clone());
    hud
}

/// Press the back button: return to the menu. A destroyed HUD ignores it.
pub fn press_back(hud: &Component<HudState>) -> Result<()> {
    if hud.is_destroyed() {
        return Ok(());
    }
    let director = hud
        .with_state(|state| state.director.upgrade())
        .flatten()
        .ok_or_else(|| ShellError::MissingScene(SceneKey::Menu.to_string()))?;
    director.back_to_menu()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AppConfig;
    use crate::scenes::Director;
    use crate::viewport::{FixedWindow, MemorySurface};

    #[test]
    fn test_back_button_tracks_resize() {
        let mut window = FixedWindow::new(1920, 1080, 1.0);
        let app = App::new(AppConfig::showcase().with_dpr_override(1.0), &window);
        app.start().unwrap();
        let director = Director::new(&app);
        let overlay = create(&app, &director.downgrade());
        let mut surface = MemorySurface::new();

        app.tick(16.0, &window, &mut surface);
        assert_eq!(overlay.with_state(|s| s.back_button), Some((-1732.0, -922.0)));

        window.set_size(1080, 1080);
        app.tick(16.0, &window, &mut surface);
        assert_eq!(overlay.with_state(|s| s.back_button), Some((-892.0, -922.0)));
    }

    #[test]
    fn test_back_without_director_is_an_error() {
        let app = App::new(AppConfig::showcase(), &FixedWindow::new(800, 600, 1.0));
        let director = Director::new(&app);
        let overlay = create(&app, &director.downgrade());
        drop(director);

        assert!(matches!(press_back(&overlay), Err(ShellError::MissingScene(_))));
    }
}
