//! Two decks trading cards, one flight per cycle.

use std::cell::RefCell;
use std::f64::consts::PI;
use std::rc::Rc;

use log::{debug, error};

use super::director::Director;
use super::hud::{self, HudState};
use super::status::StatusText;
use crate::app::App;
use crate::audio::PlayOptions;
use crate::cards::{schedule, CardData, CardMoveEvent, CardStackMachine, StackId};
use crate::core::math::lerp;
use crate::lifecycle::{Component, Hooks};
use crate::tween::{Ease, Tween, TweenGroup, TweenOptions};

pub const CARDS_ATLAS: &str = "textures/cards";
pub const TOTAL_CARDS: usize = 144;
pub const ANIMATION_DURATION_MS: f64 = 1000.0;
/// Per-card offset inside a stack, both axes.
pub const DECK_STACKING_OFFSET: f64 = 2.0;
/// Stack distance from centre, as a share of the virtual width.
pub const STACK_SPREAD: f64 = 0.15;

/// Local position of the `index`-th card of a stack.
#[must_use]
pub fn deck_position(index: usize) -> (f64, f64) {
    let offset = -(index as f64) * DECK_STACKING_OFFSET;
    (offset, offset)
}

/// How one card is drawn.
///
/// At rest, `x`/`y` are relative to the card's stack. In flight they are
/// relative to the scene centre.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardSprite {
    pub card: usize,
    pub stack: StackId,
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub scale: f64,
    pub z_index: usize,
    pub in_flight: bool,
}

impl CardSprite {
    fn at_rest(card: &CardData) -> Self {
        let (x, y) = deck_position(card.index_in_stack);
        Self {
            card: card.index,
            stack: card.stack_id,
            x,
            y,
            rotation: 0.0,
            scale: 1.0,
            z_index: card.index_in_stack,
            in_flight: false,
        }
    }
}

/// Sprite layout shared between the scene and its running flights.
#[derive(Clone, Debug, Default)]
pub struct Table {
    stack_x: [f64; 2],
    sprites: Vec<CardSprite>,
    /// Latest flight per card; stale flights leave the sprite alone.
    flights: Vec<u64>,
}

impl Table {
    /// Centre of a stack, relative to the scene centre.
    #[must_use]
    pub fn stack_position(&self, id: StackId) -> (f64, f64) {
        (self.stack_x[id.slot()], 0.0)
    }

    #[must_use]
    pub fn sprites(&self) -> &[CardSprite] {
        &self.sprites
    }

    #[must_use]
    pub fn sprite(&self, card: usize) -> Option<&CardSprite> {
        self.sprites.get(card)
    }

    fn layout(&mut self, width: f64) {
        self.stack_x = [-width * STACK_SPREAD, width * STACK_SPREAD];
    }

    fn deal(&mut self, cards: &[CardData]) {
        self.sprites = cards.iter().map(CardSprite::at_rest).collect();
        self.flights = vec![0; cards.len()];
    }

    fn is_current(&self, card: usize, flight: u64) -> bool {
        self.flights.get(card) == Some(&flight)
    }

    /// Detach a card from its stack, keeping its on-screen position.
    ///
    /// Returns the start position and the new flight number.
    fn lift(&mut self, card: usize) -> Option<((f64, f64), u64)> {
        let (sx, sy) = {
            let sprite = self.sprites.get(card)?;
            self.stack_position(sprite.stack)
        };
        let sprite = self.sprites.get_mut(card)?;
        if !sprite.in_flight {
            sprite.x += sx;
            sprite.y += sy;
            sprite.in_flight = true;
        }
        sprite.z_index = usize::MAX;
        let from = (sprite.x, sprite.y);

        let flight = self.flights.get_mut(card)?;
        *flight += 1;
        Some((from, *flight))
    }

    fn fly(
        &mut self,
        card: usize,
        flight: u64,
        from: (f64, f64),
        to: StackId,
        to_index: usize,
        progress: f64,
    ) {
        if !self.is_current(card, flight) {
            return;
        }
        let (tx, ty) = self.stack_position(to);
        let (dx, dy) = deck_position(to_index);
        let Some(sprite) = self.sprites.get_mut(card) else {
            return;
        };
        let t = Ease::SineInOut.apply(progress);
        sprite.x = lerp(from.0, tx + dx, t);
        sprite.y = lerp(from.1, ty + dy, t);
        sprite.scale = 1.0 + (0.5 - (t - 0.5).abs()) * 0.5;
        sprite.rotation = (t * PI).sin() * 0.25;
    }

    fn land(&mut self, card: usize, flight: u64, to: StackId, to_index: usize) {
        if !self.is_current(card, flight) {
            return;
        }
        if let Some(sprite) = self.sprites.get_mut(card) {
            *sprite = CardSprite::at_rest(&CardData {
                index: card,
                stack_id: to,
                index_in_stack: to_index,
            });
        }
    }
}

#[derive(Default)]
struct Flight {
    progress: f64,
}

fn progress(flight: &mut Flight) -> &mut f64 {
    &mut flight.progress
}

pub struct AceOfShadowsState {
    pub status: StatusText,
    machine: Rc<RefCell<CardStackMachine>>,
    table: Rc<RefCell<Table>>,
    cycle: Option<Tween<()>>,
    hud: Option<Component<HudState>>,
}

impl AceOfShadowsState {
    #[must_use]
    pub fn machine(&self) -> Rc<RefCell<CardStackMachine>> {
        Rc::clone(&self.machine)
    }

    #[must_use]
    pub fn table(&self) -> Table {
        self.table.borrow().clone()
    }

    /// The repeating transfer timeline, once started.
    #[must_use]
    pub fn cycle(&self) -> Option<&Tween<()>> {
        self.cycle.as_ref()
    }

    #[must_use]
    pub fn hud(&self) -> Option<Component<HudState>> {
        self.hud.clone()
    }
}

fn start_flight(table: &Rc<RefCell<Table>>, tweens: &TweenGroup, event: &CardMoveEvent) {
    let card = event.card.index;
    let (to, to_index) = (event.to_stack_id, event.to_stack_index);
    let Some((from, flight)) = table.borrow_mut().lift(card) else {
        return;
    };

    let (during, after) = (Rc::clone(table), Rc::clone(table));
    tweens
        .get(Rc::new(RefCell::new(Flight::default())), TweenOptions::default())
        .to(&[(progress, 1.0)], ANIMATION_DURATION_MS, Ease::Linear)
        .on_change(move |f| during.borrow_mut().fly(card, flight, from, to, to_index, f.progress))
        .call(move || after.borrow_mut().land(card, flight, to, to_index));
}

fn play_move_sounds(app: &App) {
    let (flap, swish) = {
        let mut rng = app.rng();
        (6.0 + rng.gen_range_f64(0.0..2.0), rng.gen_range_f64(0.0..2.0))
    };
    let audio = app.audio();
    let played = audio
        .play("card_flap", PlayOptions::new().with_volume(0.33).with_transpose(flap))
        .and_then(|_| {
            audio.play(
                "swish",
                PlayOptions::new().with_volume(0.33).with_delay(0.3).with_transpose(swish),
            )
        });
    if let Err(err) = played {
        debug!("card sounds skipped: {err}");
    }
}

/// Build the card scene.
pub fn create(app: &App, director: &Director) -> Component<AceOfShadowsState> {
    let state = AceOfShadowsState {
        status: StatusText::new(),
        machine: Rc::new(RefCell::new(CardStackMachine::new())),
        table: Rc::new(RefCell::new(Table::default())),
        cycle: None,
        hud: None,
    };
    let director = director.downgrade();

    let hooks = Hooks::new()
        .on_load(|state: &mut AceOfShadowsState, ctx| {
            state.status.display("Loading scene assets...");
            ctx.app().assets().add_atlas(CARDS_ATLAS, Some(1.0))?;
            state.status.hide();
            Ok(())
        })
        .on_load_error(|state, _, err| {
            state.status.display_error("Failed to load scene assets", err)
        })
        .on_init(move |state, ctx| {
            state.hud = Some(hud::attach(ctx, &director));

            let table = Rc::clone(&state.table);
            let machine = Rc::clone(&state.machine);

            let dealt = Rc::clone(&table);
            machine
                .borrow()
                .on_cards_initialized()
                .once(move |cards: &Vec<CardData>| dealt.borrow_mut().deal(cards));

            let (flights, tweens, app) =
                (Rc::clone(&table), ctx.tweens().clone(), ctx.app().clone());
            machine.borrow().on_card_move().on(move |event: &CardMoveEvent| {
                start_flight(&flights, &tweens, event);
                play_move_sounds(&app);
            });

            let mut rng = ctx.app().rng().for_context("ace_of_shadows");
            if let Err(err) = machine.borrow_mut().initialize(TOTAL_CARDS, &mut rng) {
                error!("card stacks not started: {err}");
                return;
            }
            state.cycle = Some(schedule(&machine, ctx.tweens(), ANIMATION_DURATION_MS));
        })
        .on_resize(|state, _, event| state.table.borrow_mut().layout(event.width))
        .on_unload(|state, ctx| {
            state.cycle = None;
            ctx.app().assets().unload(CARDS_ATLAS);
            Ok(())
        });

    Component::new(app, state, hooks)
}
