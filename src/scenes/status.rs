//! On-screen status line.

use std::fmt;

use log::error;
use serde::{Deserialize, Serialize};

/// Status message shown over a scene (loading, errors).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusText {
    text: String,
    visible: bool,
    is_error: bool,
}

impl StatusText {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn display(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.visible = true;
        self.is_error = false;
    }

    /// Show `text` and log it with the underlying error.
    pub fn display_error(&mut self, text: impl Into<String>, err: &dyn fmt::Display) {
        self.text = text.into();
        self.visible = true;
        self.is_error = true;
        error!("{}: {err}", self.text);
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.is_error
    }
}
