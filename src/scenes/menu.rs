//! Scene picker.

use crate::app::App;
use crate::core::error::{Result, ShellError};
use crate::lifecycle::{Component, Hooks};

use super::director::{Director, SceneKey, WeakDirector};

/// Vertical distance between buttons.
pub const BUTTON_SPACING: f64 = 240.0;

/// Title offset above centre, as a share of the virtual height.
pub const TITLE_OFFSET: f64 = 0.3;

/// Buttons in display order.
pub const MENU_ENTRIES: [(SceneKey, &str); 3] = [
    (SceneKey::AceOfShadows, "Ace of Shadows"),
    (SceneKey::MagicWords, "Magic Words"),
    (SceneKey::PhoenixFlame, "Phoenix Flame"),
];

#[derive(Clone, Debug, PartialEq)]
pub struct MenuButton {
    pub scene: SceneKey,
    pub label: &'static str,
    pub y: f64,
}

#[derive(Debug)]
pub struct MenuState {
    director: WeakDirector,
    pub title_y: f64,
    pub buttons: Vec<MenuButton>,
}

/// Build the menu scene.
pub fn create(app: &App, director: &Director) -> Component<MenuState> {
    let state = MenuState {
        director: director.downgrade(),
        title_y: 0.0,
        buttons: Vec::new(),
    };
    let hooks = Hooks::new()
        .on_init(|state: &mut MenuState, _| {
            let middle = (MENU_ENTRIES.len() as f64 - 1.0) / 2.0;
            state.buttons = MENU_ENTRIES
                .iter()
                .enumerate()
                .map(|(i, &(scene, label))| MenuButton {
                    scene,
                    label,
                    y: (i as f64 - middle) * BUTTON_SPACING,
                })
                .collect();
        })
        .on_resize(|state, _, event| state.title_y = -event.height * TITLE_OFFSET);

    Component::new(app, state, hooks)
}

/// Press the button for `scene`.
pub fn press(menu: &Component<MenuState>, scene: SceneKey) -> Result<()> {
    let director = menu
        .with_state(|state| {
            state
                .buttons
                .iter()
                .any(|b| b.scene == scene)
                .then(|| state.director.upgrade())
                .flatten()
        })
        .flatten()
        .ok_or_else(|| ShellError::MissingScene(scene.to_string()))?;
    director.show_scene(scene)
}
