//! Handlers behind the `eppctl` subcommands.

pub mod config;
pub mod session;

use serde::Serialize;
use serde_json::Value;

use crate::error::ClientResult;
use crate::result::CommandResult;

/// What a subcommand prints, and whether it should exit with success.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub json: Value,
    pub success: bool,
}

impl Report {
    /// A report that always succeeds.
    pub fn ok(value: &impl Serialize) -> ClientResult<Self> {
        Ok(Self {
            json: serde_json::to_value(value)?,
            success: true,
        })
    }

    /// Reports a command result. A dry run (`None`) prints `null` and
    /// succeeds; a failure disposition does not.
    pub fn command<T: Serialize>(result: &Option<CommandResult<T>>) -> ClientResult<Self> {
        Ok(Self {
            json: serde_json::to_value(result)?,
            success: result
                .as_ref()
                .is_none_or(|r| !r.disposition.is_failure()),
        })
    }
}

#[cfg(test)]
mod tests {
    use epp_core::Disposition;
    use epp_protocol::Status;

    use super::*;

    fn result(code: u16, disposition: Disposition) -> Option<CommandResult<()>> {
        Some(CommandResult {
            command: "domain-delete",
            status: Status {
                code,
                msg: String::new(),
                reason: None,
            },
            disposition,
            payload: None,
        })
    }

    #[test]
    fn failure_disposition_fails_the_report() {
        assert!(Report::command(&result(1000, Disposition::Completed)).unwrap().success);
        assert!(Report::command(&result(2303, Disposition::ObjectMissing)).unwrap().success);
        assert!(!Report::command(&result(2201, Disposition::CommandFailed)).unwrap().success);
    }

    #[test]
    fn dry_run_prints_null() {
        let report = Report::command::<()>(&None).unwrap();
        assert!(report.success);
        assert_eq!(report.json, Value::Null);
    }
}
