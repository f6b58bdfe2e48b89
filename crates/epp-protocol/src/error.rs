//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors raised while building or reading EPP documents.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The request document for a command could not be produced.
    #[error("failed to render {command} document: {message}")]
    Render { command: String, message: String },

    /// The response body is not well-formed XML.
    #[error("malformed response: {message}")]
    Malformed { message: String },
}

impl ProtocolError {
    /// Creates a render error for the named command template.
    pub fn render(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Render {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Creates a malformed response error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}
