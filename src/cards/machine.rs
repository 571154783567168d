//! Two stacks of cards, shuttled one card at a time.
//!
//! All cards start shuffled in stack 1. Each transfer pops the top of the
//! source stack and pushes it onto the destination. The direction is sticky:
//! it only flips when the current source runs dry.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use super::card::{CardData, CardMoveEvent, MoveDirection, StackId};
use crate::core::error::{Result, ShellError};
use crate::core::rng::ShellRng;
use crate::events::Emitter;
use crate::tween::{Tween, TweenGroup, TweenOptions};

/// The card-stack state machine.
///
/// ## Usage
///
/// ```
/// use showcase_shell::cards::{CardStackMachine, StackId};
/// use showcase_shell::core::ShellRng;
///
/// let mut machine = CardStackMachine::new();
/// machine.initialize(3, &mut ShellRng::new(7)).unwrap();
///
/// let event = machine.transfer_top_card().unwrap();
/// assert_eq!(event.from_stack_id, StackId::One);
/// assert_eq!(event.from_stack_index, 2);
/// assert_eq!(event.to_stack_index, 0);
/// assert_eq!(machine.stack_len(StackId::Two), 1);
/// ```
pub struct CardStackMachine {
    /// Card records by identity.
    cards: Vec<CardData>,
    /// Card identities per stack, bottom first.
    stacks: [Vec<usize>; 2],
    direction: MoveDirection,
    initialized: bool,
    on_cards_initialized: Emitter<Vec<CardData>>,
    on_card_move: Emitter<CardMoveEvent>,
}

impl CardStackMachine {
    /// Empty machine; nothing happens until [`initialize`](Self::initialize).
    #[must_use]
    pub fn new() -> Self {
        Self {
            cards: Vec::new(),
            stacks: [Vec::new(), Vec::new()],
            direction: MoveDirection::default(),
            initialized: false,
            on_cards_initialized: Emitter::new(),
            on_card_move: Emitter::new(),
        }
    }

    /// Put `count` cards in stack 1 in shuffled order and announce them.
    ///
    /// Fails on a second call.
    pub fn initialize(&mut self, count: usize, rng: &mut ShellRng) -> Result<()> {
        if self.initialized {
            return Err(ShellError::AlreadyInitialized("Card stacks"));
        }
        self.initialized = true;

        let mut order: Vec<usize> = (0..count).collect();
        rng.shuffle(&mut order);

        self.cards = (0..count)
            .map(|index| CardData {
                index,
                stack_id: StackId::One,
                index_in_stack: 0,
            })
            .collect();
        for (position, &card) in order.iter().enumerate() {
            self.cards[card].index_in_stack = position;
        }
        self.stacks = [order, Vec::new()];

        debug!("card stacks initialized with {count} cards");
        self.on_cards_initialized.emit(&self.cards);
        Ok(())
    }

    /// Move the top card of the source stack and announce it.
    ///
    /// Returns `None` when there are no cards at all.
    pub fn transfer_top_card(&mut self) -> Option<CardMoveEvent> {
        let event = self.take_turn()?;
        self.on_card_move.emit(&event);
        Some(event)
    }

    /// Apply one transfer without announcing it.
    fn take_turn(&mut self) -> Option<CardMoveEvent> {
        let (one, two) = (StackId::One.slot(), StackId::Two.slot());
        if self.stacks[one].is_empty() && self.direction == MoveDirection::ToStack2 {
            self.direction = MoveDirection::ToStack1;
        }
        if self.stacks[two].is_empty() && self.direction == MoveDirection::ToStack1 {
            self.direction = MoveDirection::ToStack2;
        }

        let from = self.direction.source();
        let to = self.direction.destination();

        let card = self.stacks[from.slot()].pop()?;
        let from_stack_index = self.stacks[from.slot()].len();
        self.stacks[to.slot()].push(card);
        let to_stack_index = self.stacks[to.slot()].len() - 1;

        let data = &mut self.cards[card];
        data.stack_id = to;
        data.index_in_stack = to_stack_index;

        debug!("card {card} moved from {from}[{from_stack_index}] to {to}[{to_stack_index}]");
        Some(CardMoveEvent {
            card: *data,
            from_stack_id: from,
            to_stack_id: to,
            from_stack_index,
            to_stack_index,
        })
    }

    /// Fires once, with every card, from [`initialize`](Self::initialize).
    pub fn on_cards_initialized(&self) -> &Emitter<Vec<CardData>> {
        &self.on_cards_initialized
    }

    /// Fires after every transfer.
    pub fn on_card_move(&self) -> &Emitter<CardMoveEvent> {
        &self.on_card_move
    }

    /// Cards of one stack, bottom first.
    #[must_use]
    pub fn stack(&self, id: StackId) -> Vec<CardData> {
        self.stacks[id.slot()].iter().map(|&card| self.cards[card]).collect()
    }

    #[must_use]
    pub fn stack_len(&self, id: StackId) -> usize {
        self.stacks[id.slot()].len()
    }

    #[must_use]
    pub fn top_card(&self, id: StackId) -> Option<CardData> {
        self.stacks[id.slot()].last().map(|&card| self.cards[card])
    }

    /// All cards by identity.
    #[must_use]
    pub fn cards(&self) -> &[CardData] {
        &self.cards
    }

    #[must_use]
    pub fn direction(&self) -> MoveDirection {
        self.direction
    }

    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Total number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl Default for CardStackMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CardStackMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardStackMachine")
            .field("stack1", &self.stacks[0].len())
            .field("stack2", &self.stacks[1].len())
            .field("direction", &self.direction)
            .finish()
    }
}

/// Transfer one card every `cycle_ms`, forever, on `group`'s time.
///
/// The first transfer happens on the first advance. The machine is not
/// borrowed while `on_card_move` handlers run, so they may inspect it.
/// Cancelling the tween (or resetting the group) stops further transfers.
pub fn schedule(
    machine: &Rc<RefCell<CardStackMachine>>,
    group: &TweenGroup,
    cycle_ms: f64,
) -> Tween<()> {
    let on_card_move = machine.borrow().on_card_move().clone();
    let weak = Rc::downgrade(machine);

    group
        .timer(TweenOptions::forever())
        .call(move || {
            let Some(machine) = weak.upgrade() else {
                return;
            };
            let event = match machine.try_borrow_mut() {
                Ok(mut machine) => machine.take_turn(),
                Err(_) => None,
            };
            if let Some(event) = event {
                on_card_move.emit(&event);
            }
        })
        .wait(cycle_ms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine(count: usize) -> CardStackMachine {
        let mut machine = CardStackMachine::new();
        machine.initialize(count, &mut ShellRng::new(42)).unwrap();
        machine
    }

    #[test]
    fn test_initialize_shuffles_into_stack_one() {
        let machine = machine(52);

        assert_eq!(machine.stack_len(StackId::One), 52);
        assert_eq!(machine.stack_len(StackId::Two), 0);

        let stack = machine.stack(StackId::One);
        for (position, card) in stack.iter().enumerate() {
            assert_eq!(card.index_in_stack, position);
            assert_eq!(card.stack_id, StackId::One);
        }
        let mut ids: Vec<usize> = stack.iter().map(|c| c.index).collect();
        assert_ne!(ids, (0..52).collect::<Vec<_>>());
        ids.sort_unstable();
        assert_eq!(ids, (0..52).collect::<Vec<_>>());
    }

    #[test]
    fn test_initialize_twice_fails() {
        let mut machine = machine(3);
        assert_eq!(
            machine.initialize(3, &mut ShellRng::new(1)).unwrap_err(),
            ShellError::AlreadyInitialized("Card stacks")
        );
        assert_eq!(machine.len(), 3);
    }

    #[test]
    fn test_initialized_event_fires_once() {
        let mut machine = CardStackMachine::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = seen.clone();
        machine
            .on_cards_initialized()
            .on(move |cards: &Vec<CardData>| s.borrow_mut().push(cards.len()));

        machine.initialize(5, &mut ShellRng::new(1)).unwrap();
        let _ = machine.initialize(5, &mut ShellRng::new(1));

        assert_eq!(*seen.borrow(), vec![5]);
    }

    #[test]
    fn test_transfer_moves_top_card() {
        let mut machine = machine(4);
        let top = machine.top_card(StackId::One).unwrap();

        let event = machine.transfer_top_card().unwrap();
        assert_eq!(event.card.index, top.index);
        assert_eq!(event.card.stack_id, StackId::Two);
        assert_eq!(event.card.index_in_stack, 0);
        assert_eq!((event.from_stack_id, event.to_stack_id), (StackId::One, StackId::Two));
        assert_eq!((event.from_stack_index, event.to_stack_index), (3, 0));
        assert_eq!(machine.cards()[top.index], event.card);
    }

    #[test]
    fn test_direction_flips_when_source_runs_dry() {
        let mut machine = machine(3);
        for _ in 0..3 {
            machine.transfer_top_card();
        }
        assert_eq!(machine.stack_len(StackId::One), 0);
        assert_eq!(machine.direction(), MoveDirection::ToStack2);

        let event = machine.transfer_top_card().unwrap();
        assert_eq!(machine.direction(), MoveDirection::ToStack1);
        assert_eq!((event.from_stack_id, event.to_stack_id), (StackId::Two, StackId::One));
        assert_eq!(event.from_stack_index, 2);

        // Sticky: keeps going to stack 1 while stack 2 has cards.
        machine.transfer_top_card();
        machine.transfer_top_card();
        assert_eq!(machine.stack_len(StackId::Two), 0);
        assert_eq!(machine.direction(), MoveDirection::ToStack1);

        machine.transfer_top_card();
        assert_eq!(machine.direction(), MoveDirection::ToStack2);
    }

    #[test]
    fn test_full_pass_reverses_order() {
        let mut machine = machine(6);
        let before: Vec<usize> = machine.stack(StackId::One).iter().map(|c| c.index).collect();
        for _ in 0..6 {
            machine.transfer_top_card();
        }
        let after: Vec<usize> = machine.stack(StackId::Two).iter().map(|c| c.index).collect();
        let mut reversed = before;
        reversed.reverse();
        assert_eq!(after, reversed);
    }

    #[test]
    fn test_no_cards_no_event() {
        let mut machine = machine(0);
        let moves = Rc::new(RefCell::new(0));
        let m = moves.clone();
        machine.on_card_move().on(move |_| *m.borrow_mut() += 1);

        assert!(machine.transfer_top_card().is_none());
        assert_eq!(*moves.borrow(), 0);
        assert!(CardStackMachine::new().transfer_top_card().is_none());
    }

    #[test]
    fn test_schedule_moves_one_card_per_cycle() {
        let machine = Rc::new(RefCell::new(machine(10)));
        let group = TweenGroup::new();
        let tween = schedule(&machine, &group, 1000.0);

        group.advance(16.0);
        assert_eq!(machine.borrow().stack_len(StackId::Two), 1);
        group.advance(500.0);
        assert_eq!(machine.borrow().stack_len(StackId::Two), 1);
        group.advance(500.0);
        assert_eq!(machine.borrow().stack_len(StackId::Two), 2);

        tween.pause();
        group.advance(5000.0);
        assert_eq!(machine.borrow().stack_len(StackId::Two), 2);

        group.reset(true);
        tween.play();
        group.advance(5000.0);
        assert_eq!(machine.borrow().stack_len(StackId::Two), 2);
    }

    #[test]
    fn test_scheduled_handlers_can_inspect_machine() {
        let machine = Rc::new(RefCell::new(machine(4)));
        let group = TweenGroup::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let (m, s) = (Rc::downgrade(&machine), seen.clone());
        machine.borrow().on_card_move().on(move |_| {
            if let Some(m) = m.upgrade() {
                s.borrow_mut().push(m.borrow().stack_len(StackId::Two));
            }
        });
        let _tween = schedule(&machine, &group, 100.0);

        group.advance(0.0);
        group.advance(100.0);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }
}
