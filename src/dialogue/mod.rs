//! Dialogue data for the word-by-word text scene.
//!
//! The document is fetched once over HTTP (no retry, no timeout beyond the
//! fetcher's own), then each line is tokenized so `{name}` words render as
//! inline emoji.

mod data;
mod fetch;
mod text;

pub use data::{AvatarData, AvatarPosition, DialogueData, DialogueEntry, EmojiData};
pub use fetch::{fetch_dialogue, HttpResponse, JsonFetcher, StaticFetcher, MAGIC_WORDS_ENDPOINT};
pub use text::{entry_hold_ms, tokenize, Token, HOLD_PER_WORD_MS, MIN_ENTRY_HOLD_MS, WORD_REVEAL_MS};
