//! Client error types.

use epp_core::{Disposition, UnhandledCode};
use epp_protocol::ProtocolError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be delivered or the server answered with a
    /// non-success HTTP status.
    #[error("error during transmission: {0}")]
    Transport(String),

    /// The server answered without a `<response>`/`<result>`.
    #[error("no response to {command}")]
    NoResponse { command: String },

    /// The hello probe did not get a greeting back.
    #[error("no greeting received")]
    NoGreeting,

    /// A command completed with a failure result code.
    #[error("{command} failed with code {code} ({disposition}): {msg}{}", reason_suffix(.reason))]
    Protocol {
        command: String,
        code: u16,
        msg: String,
        reason: Option<String>,
        disposition: Disposition,
    },

    /// The server returned a code outside the known table.
    #[error(transparent)]
    UnhandledCode(#[from] UnhandledCode),

    /// A command was called with arguments it does not accept.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A document could not be rendered or parsed.
    #[error(transparent)]
    Document(#[from] ProtocolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("timeout: {0}")]
    Timeout(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_deref()
        .map(|r| format!(" - reason: {r}"))
        .unwrap_or_default()
}

impl ClientError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates a missing-response error for the named command.
    pub fn no_response(command: impl Into<String>) -> Self {
        Self::NoResponse {
            command: command.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Returns true if the same command may succeed when sent again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Protocol { disposition, .. } => disposition.is_retryable(),
            _ => false,
        }
    }
}
