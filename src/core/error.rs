//! Error types shared by the shell.
//!
//! Two families exist:
//!
//! - [`ShellError`]: lookup failures, double initialization and backend
//!   failures. These abort only the operation that raised them.
//! - [`ComponentError`]: whatever a component's load or unload hook returns.
//!   These never escape the component tree; the lifecycle routes them to the
//!   component's error hooks.

use thiserror::Error;

/// Errors raised by the shell's subsystems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("Can't find atlas: \"{0}\"")]
    MissingAtlas(String),

    #[error("Can't find frame \"{frame}\" in atlas \"{atlas}\"")]
    MissingFrame { atlas: String, frame: String },

    #[error("Can't find spine: \"{0}\"")]
    MissingSpine(String),

    #[error("Can't find json: \"{0}\"")]
    MissingJson(String),

    #[error("Can't find asset: \"{0}\"")]
    MissingAsset(String),

    #[error("Can't find sound with name \"{0}\"")]
    MissingSound(String),

    #[error("Can't find scene: \"{0}\"")]
    MissingScene(String),

    #[error("{0} already initialized!")]
    AlreadyInitialized(&'static str),

    #[error("Failed to load \"{src}\": {message}")]
    Load { src: String, message: String },

    #[error("Error fetching magic words: {0}")]
    Fetch(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<serde_json::Error> for ShellError {
    fn from(err: serde_json::Error) -> Self {
        ShellError::Config(err.to_string())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, ShellError>;

/// Error returned from a component's load or unload hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ComponentError {
    message: String,
    source_error: Option<ShellError>,
}

impl ComponentError {
    /// Create an error from a plain message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source_error: None,
        }
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The shell error this was converted from, if any.
    #[must_use]
    pub fn shell_error(&self) -> Option<&ShellError> {
        self.source_error.as_ref()
    }
}

impl From<ShellError> for ComponentError {
    fn from(err: ShellError) -> Self {
        Self {
            message: err.to_string(),
            source_error: Some(err),
        }
    }
}

impl From<&str> for ComponentError {
    fn from(message: &str) -> Self {
        Self::new(message)
    }
}

impl From<String> for ComponentError {
    fn from(message: String) -> Self {
        Self::new(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_messages_name_the_key() {
        assert_eq!(
            ShellError::MissingAtlas("textures/cards".into()).to_string(),
            "Can't find atlas: \"textures/cards\""
        );
        assert_eq!(
            ShellError::MissingFrame {
                atlas: "textures/cards".into(),
                frame: "ace".into(),
            }
            .to_string(),
            "Can't find frame \"ace\" in atlas \"textures/cards\""
        );
        assert_eq!(
            ShellError::MissingSound("click".into()).to_string(),
            "Can't find sound with name \"click\""
        );
    }

    #[test]
    fn test_fetch_message_wraps_original() {
        let err = ShellError::Fetch("connection refused".into());
        assert_eq!(err.to_string(), "Error fetching magic words: connection refused");
    }

    #[test]
    fn test_component_error_keeps_shell_error() {
        let err: ComponentError = ShellError::AlreadyInitialized("App").into();
        assert_eq!(err.message(), "App already initialized!");
        assert_eq!(err.shell_error(), Some(&ShellError::AlreadyInitialized("App")));

        let plain = ComponentError::from("boom");
        assert_eq!(plain.to_string(), "boom");
        assert!(plain.shell_error().is_none());
    }
}
