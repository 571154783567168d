//! Splitting dialogue text into words and inline emoji.

use serde::{Deserialize, Serialize};

/// Delay between revealed words, in ms.
pub const WORD_REVEAL_MS: f64 = 50.0;

/// Minimum time an entry stays on screen, in ms.
pub const MIN_ENTRY_HOLD_MS: f64 = 1500.0;

/// Extra hold per word, in ms.
pub const HOLD_PER_WORD_MS: f64 = 200.0;

/// One word slot of a line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Word(String),
    /// A known emoji, by name.
    Emoji(String),
}

/// Split `text` on single spaces; words that are exactly `{name}` for a
/// known emoji become emoji tokens.
///
/// ```
/// use showcase_shell::dialogue::{tokenize, Token};
///
/// let tokens = tokenize("so {sad} {neutral}", &["sad"]);
/// assert_eq!(tokens[1], Token::Emoji("sad".into()));
/// assert_eq!(tokens[2], Token::Word("{neutral}".into()));
/// ```
#[must_use]
pub fn tokenize(text: &str, emoji_names: &[&str]) -> Vec<Token> {
    text.split(' ')
        .map(|word| {
            let name = word.strip_prefix('{').and_then(|w| w.strip_suffix('}'));
            match name {
                Some(name) if emoji_names.contains(&name) => Token::Emoji(name.to_string()),
                _ => Token::Word(word.to_string()),
            }
        })
        .collect()
}

/// How long an entry is held after it is fully shown.
#[must_use]
pub fn entry_hold_ms(text: &str) -> f64 {
    let words = text.split(' ').count();
    MIN_ENTRY_HOLD_MS.max(words as f64 * HOLD_PER_WORD_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emoji_must_be_whole_word() {
        let tokens = tokenize("hi {smile}! {smile}", &["smile"]);
        assert_eq!(
            tokens,
            vec![
                Token::Word("hi".into()),
                Token::Word("{smile}!".into()),
                Token::Emoji("smile".into()),
            ]
        );
    }

    #[test]
    fn test_double_space_keeps_empty_word() {
        assert_eq!(tokenize("a  b", &[]).len(), 3);
    }

    #[test]
    fn test_hold_has_floor() {
        assert_eq!(entry_hold_ms("one two"), 1500.0);
        assert_eq!(entry_hold_ms(&["w"; 10].join(" ")), 2000.0);
    }
}
