//! Dialogue document model.

use serde::{Deserialize, Serialize};

/// One line of dialogue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueEntry {
    pub name: String,
    pub text: String,
}

/// An inline image referenced as `{name}` in dialogue text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiData {
    pub name: String,
    pub url: String,
}

/// Side of the dialogue box an avatar sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarPosition {
    Left,
    Right,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarData {
    pub name: String,
    pub url: String,
    pub position: AvatarPosition,
}

/// The whole document as served.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueData {
    #[serde(default)]
    pub dialogue: Vec<DialogueEntry>,
    #[serde(default)]
    pub emojies: Vec<EmojiData>,
    #[serde(default)]
    pub avatars: Vec<AvatarData>,
}

impl DialogueData {
    /// Avatar for a speaker.
    #[must_use]
    pub fn avatar(&self, name: &str) -> Option<&AvatarData> {
        self.avatars.iter().find(|a| a.name == name)
    }

    /// Names of every emoji, for [`tokenize`](super::tokenize).
    #[must_use]
    pub fn emoji_names(&self) -> Vec<&str> {
        self.emojies.iter().map(|e| e.name.as_str()).collect()
    }
}
