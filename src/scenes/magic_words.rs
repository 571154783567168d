//! Dialogue revealed word by word, with inline emoji and avatars.

use std::rc::Rc;

use log::{debug, warn};

use super::director::Director;
use super::hud::{self, HudState};
use super::status::StatusText;
use crate::app::App;
use crate::assets::AssetDescriptor;
use crate::audio::PlayOptions;
use crate::dialogue::{
    entry_hold_ms, fetch_dialogue, tokenize, AvatarPosition, DialogueData, JsonFetcher, Token,
    WORD_REVEAL_MS,
};
use crate::lifecycle::{Component, Hooks, WeakComponent};
use crate::tween::{TweenGroup, TweenOptions};

/// Widest the text box gets, in virtual units.
pub const MAX_WRAP_WIDTH: f64 = 900.0;

/// The line currently on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct DialogueView {
    pub speaker: String,
    pub avatar: Option<AvatarPosition>,
    pub tokens: Vec<Token>,
    /// Tokens revealed so far.
    pub visible: usize,
}

impl DialogueView {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.visible >= self.tokens.len()
    }
}

pub struct MagicWordsState {
    pub status: StatusText,
    pub data: Option<DialogueData>,
    pub view: Option<DialogueView>,
    /// Index of the entry on screen.
    pub entry: usize,
    pub finished: bool,
    pub wrap_width: f64,
    pub hud: Option<Component<HudState>>,
    fetcher: Rc<dyn JsonFetcher>,
    url: String,
}

fn emoji_alias(name: &str) -> String {
    format!("emoji:{name}")
}

fn avatar_alias(name: &str) -> String {
    format!("avatar:{name}")
}

fn texture_descriptors(data: &DialogueData) -> Vec<AssetDescriptor> {
    let emojies = data
        .emojies
        .iter()
        .map(|e| AssetDescriptor::texture(emoji_alias(&e.name), e.url.as_str()));
    let avatars = data
        .avatars
        .iter()
        .map(|a| AssetDescriptor::texture(avatar_alias(&a.name), a.url.as_str()));
    emojies.chain(avatars).collect()
}

fn play_click(app: &App) {
    if let Err(err) = app.audio().play("click", PlayOptions::new().with_volume(0.5)) {
        debug!("click skipped: {err}");
    }
}

/// Put entry `index` on screen and queue its reveal, then the next entry.
fn show_entry(
    state: &mut MagicWordsState,
    tweens: &TweenGroup,
    app: &App,
    scene: &WeakComponent<MagicWordsState>,
    index: usize,
) {
    let Some(data) = state.data.as_ref() else {
        return;
    };
    let Some(entry) = data.dialogue.get(index) else {
        debug!("dialogue finished after {index} entries");
        state.finished = true;
        return;
    };

    let avatar = data.avatar(&entry.name).map(|a| a.position);
    if avatar.is_none() {
        warn!("No avatar data found for name: {}", entry.name);
    }
    let tokens = tokenize(&entry.text, &data.emoji_names());
    let words = tokens.len();
    let hold = entry_hold_ms(&entry.text);

    state.entry = index;
    state.view = Some(DialogueView {
        speaker: entry.name.clone(),
        avatar,
        tokens,
        visible: 0,
    });

    let mut timeline = tweens.timer(TweenOptions::default());
    for _ in 0..words {
        let (scene, app) = (scene.clone(), app.clone());
        timeline = timeline.wait(WORD_REVEAL_MS).call(move || {
            scene.with_state(|state| {
                if let Some(view) = state.view.as_mut() {
                    view.visible += 1;
                }
            });
            play_click(&app);
        });
    }

    let scene = scene.clone();
    timeline.wait(hold).call(move || {
        let Some(component) = scene.upgrade() else {
            return;
        };
        let (tweens, app) = (component.tweens().clone(), component.app().clone());
        component.with_state(|state| show_entry(state, &tweens, &app, &scene, index + 1));
    });
}

/// Build the dialogue scene, fetching its document from `url` on load.
pub fn create(
    app: &App,
    director: &Director,
    fetcher: Rc<dyn JsonFetcher>,
    url: &str,
) -> Component<MagicWordsState> {
    let state = MagicWordsState {
        status: StatusText::new(),
        data: None,
        view: None,
        entry: 0,
        finished: false,
        wrap_width: MAX_WRAP_WIDTH,
        hud: None,
        fetcher,
        url: url.to_string(),
    };
    let director = director.downgrade();

    let hooks = Hooks::new()
        .on_load(|state: &mut MagicWordsState, ctx| {
            state.status.display("Loading dialogue...");
            let data = fetch_dialogue(state.fetcher.as_ref(), &state.url)?;
            let textures = texture_descriptors(&data);
            state.data = Some(data);
            ctx.app().assets().load_all(&textures)?;
            state.status.hide();
            Ok(())
        })
        .on_load_error(|state, _, err| state.status.display_error("Failed to load dialogue", err))
        .on_init(move |state, ctx| {
            state.hud = Some(hud::attach(ctx, &director));
            show_entry(state, ctx.tweens(), ctx.app(), &ctx.weak(), 0);
        })
        .on_resize(|state, _, event| state.wrap_width = (event.width * 0.5).min(MAX_WRAP_WIDTH))
        .on_unload(|state, ctx| {
            if let Some(data) = state.data.take() {
                let aliases: Vec<String> =
                    texture_descriptors(&data).into_iter().map(|d| d.alias).collect();
                ctx.app().assets().unload_many(&aliases);
            }
            state.view = None;
            Ok(())
        });

    Component::new(app, state, hooks)
}
