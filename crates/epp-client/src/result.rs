//! Per-command results.

use epp_core::Disposition;
use epp_protocol::Status;
use serde::Serialize;

use crate::error::{ClientError, ClientResult};

/// Outcome of one EPP command.
///
/// Failure codes from the known table are still returned as a result;
/// [`CommandResult::into_checked`] turns them into errors for callers that
/// prefer `?`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandResult<T> {
    /// Command name, e.g. `domain-create`.
    pub command: &'static str,
    pub status: Status,
    pub disposition: Disposition,
    /// Data decoded from the response, when the code carries any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl<T> CommandResult<T> {
    /// Result code of the response.
    pub fn code(&self) -> u16 {
        self.status.code
    }

    /// True for success and pending dispositions.
    pub fn is_success(&self) -> bool {
        self.disposition.is_success()
    }

    /// Converts a failure disposition into [`ClientError::Protocol`].
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Protocol`] when the disposition is a failure.
    pub fn into_checked(self) -> ClientResult<Self> {
        if !self.disposition.is_failure() {
            return Ok(self);
        }
        Err(ClientError::Protocol {
            command: self.command.to_string(),
            code: self.status.code,
            msg: self.status.msg,
            reason: self.status.reason,
            disposition: self.disposition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(code: u16, disposition: Disposition) -> CommandResult<()> {
        CommandResult {
            command: "domain-delete",
            status: Status {
                code,
                msg: "msg".to_string(),
                reason: Some("because".to_string()),
            },
            disposition,
            payload: None,
        }
    }

    #[test]
    fn checked_passes_success_and_pass_through() {
        assert!(result(1000, Disposition::Completed).into_checked().is_ok());
        assert!(result(1001, Disposition::Pending).into_checked().is_ok());
        assert!(result(2303, Disposition::ObjectMissing).into_checked().is_ok());
    }

    #[test]
    fn checked_converts_failures() {
        let err = result(2304, Disposition::CommandFailed)
            .into_checked()
            .unwrap_err();
        match err {
            ClientError::Protocol {
                command,
                code,
                reason,
                disposition,
                ..
            } => {
                assert_eq!(command, "domain-delete");
                assert_eq!(code, 2304);
                assert_eq!(reason.as_deref(), Some("because"));
                assert_eq!(disposition, Disposition::CommandFailed);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn serializes_without_empty_payload() {
        let json = serde_json::to_value(result(1000, Disposition::Completed)).unwrap();
        assert_eq!(json["disposition"], "completed");
        assert_eq!(json["status"]["code"], 1000);
        assert!(json.get("payload").is_none());
    }
}
