//! Card-stack state machine.
//!
//! - [`CardStackMachine`]: two stacks, one transfer per turn, sticky direction
//! - [`schedule`]: drives transfers from a repeating timeline
//! - [`CardData`], [`CardMoveEvent`]: what handlers receive

mod card;
mod machine;

pub use card::{CardData, CardMoveEvent, MoveDirection, StackId};
pub use machine::{schedule, CardStackMachine};
