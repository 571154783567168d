//! Card records and move events.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the two stacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StackId {
    One,
    Two,
}

impl StackId {
    /// Array slot for this stack.
    #[must_use]
    pub const fn slot(self) -> usize {
        match self {
            StackId::One => 0,
            StackId::Two => 1,
        }
    }

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            StackId::One => StackId::Two,
            StackId::Two => StackId::One,
        }
    }
}

impl fmt::Display for StackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StackId::One => write!(f, "stack 1"),
            StackId::Two => write!(f, "stack 2"),
        }
    }
}

/// Which way cards are currently travelling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveDirection {
    ToStack1,
    #[default]
    ToStack2,
}

impl MoveDirection {
    /// Stack cards are taken from.
    #[must_use]
    pub const fn source(self) -> StackId {
        match self {
            MoveDirection::ToStack1 => StackId::Two,
            MoveDirection::ToStack2 => StackId::One,
        }
    }

    /// Stack cards are put on.
    #[must_use]
    pub const fn destination(self) -> StackId {
        self.source().other()
    }
}

/// A card and where it currently sits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardData {
    /// Identity, fixed at creation (0..count).
    pub index: usize,
    pub stack_id: StackId,
    /// Position in its stack, 0 = bottom.
    pub index_in_stack: usize,
}

/// Emitted after a card changed stacks. `card` holds the new location.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMoveEvent {
    pub card: CardData,
    pub from_stack_id: StackId,
    pub to_stack_id: StackId,
    pub from_stack_index: usize,
    pub to_stack_index: usize,
}
