//! EPP result codes and their interpretation.
//!
//! Registries answer every command with a numeric result code and a
//! human-readable message. [`interpret`] maps that code to a
//! [`Disposition`] so command handlers never compare raw numbers, and so
//! retry decisions live in one place.
//!
//! | Code | Disposition | Class |
//! |------|-------------|-------|
//! | 1000 | Completed | success |
//! | 1001 | Pending | pending |
//! | 1300 | QueueEmpty | success |
//! | 1301 | QueueHasMessages | success |
//! | 1500 | SessionEnded | success |
//! | 2001-2004, 2201, 2304, 2308 | CommandFailed | recoverable |
//! | 2200 | AuthenticationFailed | fatal |
//! | 2303 | ObjectMissing (see [`ObjectMissingPolicy`]) | pass-through |
//! | 2502 | Throttled | recoverable |
//! | anything else | [`UnhandledCode`] error | fatal |

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// A registry result code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    /// 1000: command completed successfully.
    Success,
    /// 1001: command completed successfully, action pending.
    SuccessPending,
    /// 1300: no messages in the poll queue.
    QueueEmpty,
    /// 1301: the poll queue holds messages.
    QueueHasMessages,
    /// 1500: command completed successfully, session ended.
    SessionEnded,
    /// 2001: command syntax error.
    SyntaxError,
    /// 2002: command use error.
    CommandUseError,
    /// 2003: required parameter missing.
    RequiredParameterMissing,
    /// 2004: parameter value range error.
    ParameterValueRange,
    /// 2200: authentication error (wrong credentials).
    AuthenticationError,
    /// 2201: authorization error (object sponsored by another registrar).
    AuthorizationError,
    /// 2303: object does not exist.
    ObjectDoesNotExist,
    /// 2304: object status prohibits operation.
    ObjectStatusProhibitsOperation,
    /// 2308: data management policy violation.
    DataManagementPolicyViolation,
    /// 2502: session limit exceeded, server closing connection.
    SessionLimitExceeded,
    /// Any code outside the table above.
    Other(u16),
}

impl ResultCode {
    /// Maps a numeric code to its variant.
    pub fn from_u16(code: u16) -> Self {
        match code {
            1000 => Self::Success,
            1001 => Self::SuccessPending,
            1300 => Self::QueueEmpty,
            1301 => Self::QueueHasMessages,
            1500 => Self::SessionEnded,
            2001 => Self::SyntaxError,
            2002 => Self::CommandUseError,
            2003 => Self::RequiredParameterMissing,
            2004 => Self::ParameterValueRange,
            2200 => Self::AuthenticationError,
            2201 => Self::AuthorizationError,
            2303 => Self::ObjectDoesNotExist,
            2304 => Self::ObjectStatusProhibitsOperation,
            2308 => Self::DataManagementPolicyViolation,
            2502 => Self::SessionLimitExceeded,
            other => Self::Other(other),
        }
    }

    /// Returns the numeric code.
    pub fn as_u16(self) -> u16 {
        match self {
            Self::Success => 1000,
            Self::SuccessPending => 1001,
            Self::QueueEmpty => 1300,
            Self::QueueHasMessages => 1301,
            Self::SessionEnded => 1500,
            Self::SyntaxError => 2001,
            Self::CommandUseError => 2002,
            Self::RequiredParameterMissing => 2003,
            Self::ParameterValueRange => 2004,
            Self::AuthenticationError => 2200,
            Self::AuthorizationError => 2201,
            Self::ObjectDoesNotExist => 2303,
            Self::ObjectStatusProhibitsOperation => 2304,
            Self::DataManagementPolicyViolation => 2308,
            Self::SessionLimitExceeded => 2502,
            Self::Other(code) => code,
        }
    }

    /// Short description used in log lines.
    pub fn description(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::SuccessPending => "success, action pending",
            Self::QueueEmpty => "the queue has no messages",
            Self::QueueHasMessages => "there are messages in queue",
            Self::SessionEnded => "session ended",
            Self::SyntaxError => "syntax error",
            Self::CommandUseError => "command use error",
            Self::RequiredParameterMissing => "required parameter missing",
            Self::ParameterValueRange => "parameter value out of range",
            Self::AuthenticationError => "wrong credentials",
            Self::AuthorizationError => "authorization error",
            Self::ObjectDoesNotExist => "object does not exist",
            Self::ObjectStatusProhibitsOperation => "object status prohibits operation",
            Self::DataManagementPolicyViolation => "data management policy violation",
            Self::SessionLimitExceeded => {
                "session limit exceeded, server closing connection, try again later"
            }
            Self::Other(_) => "unhandled result code",
        }
    }
}

impl From<u16> for ResultCode {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_u16(), self.description())
    }
}

/// How a caller should treat a command outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// The command completed.
    Completed,
    /// Accepted; completion happens asynchronously on the registry side.
    Pending,
    /// Poll queue is empty.
    QueueEmpty,
    /// Poll queue holds messages that should be drained.
    QueueHasMessages,
    /// Logout completed, the session is closed.
    SessionEnded,
    /// The object does not exist. The caller decides what that means.
    ObjectMissing,
    /// The command was rejected; the session is still usable.
    CommandFailed,
    /// Credentials were refused.
    AuthenticationFailed,
    /// Session or login rate limit hit; back off before retrying.
    Throttled,
}

/// Coarse classification of a [`Disposition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Class {
    /// The command did what was asked.
    Success,
    /// The command was accepted but completes later.
    Pending,
    /// Neither success nor failure; left to the caller.
    PassThrough,
    /// The command failed but the session can carry on.
    Recoverable,
    /// The session cannot usefully continue.
    Fatal,
}

impl Disposition {
    /// Returns the coarse class of this disposition.
    pub fn class(self) -> Class {
        match self {
            Self::Completed | Self::QueueEmpty | Self::QueueHasMessages | Self::SessionEnded => {
                Class::Success
            }
            Self::Pending => Class::Pending,
            Self::ObjectMissing => Class::PassThrough,
            Self::CommandFailed | Self::Throttled => Class::Recoverable,
            Self::AuthenticationFailed => Class::Fatal,
        }
    }

    /// True for success and pending outcomes.
    pub fn is_success(self) -> bool {
        matches!(self.class(), Class::Success | Class::Pending)
    }

    /// True for recoverable and fatal outcomes.
    pub fn is_failure(self) -> bool {
        matches!(self.class(), Class::Recoverable | Class::Fatal)
    }

    /// True if the same command may succeed later without changes.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Throttled)
    }

    /// Returns a stable name for this disposition.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Pending => "pending",
            Self::QueueEmpty => "queue_empty",
            Self::QueueHasMessages => "queue_has_messages",
            Self::SessionEnded => "session_ended",
            Self::ObjectMissing => "object_missing",
            Self::CommandFailed => "command_failed",
            Self::AuthenticationFailed => "authentication_failed",
            Self::Throttled => "throttled",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy for result code 2303 (object does not exist).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectMissingPolicy {
    /// Return [`Disposition::ObjectMissing`] without logging.
    #[default]
    PassThrough,
    /// Return [`Disposition::ObjectMissing`] and log a warning.
    Warn,
    /// Treat it as [`Disposition::CommandFailed`].
    Fail,
}

/// A result code outside the known table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unhandled result code {code}")]
pub struct UnhandledCode {
    /// The raw code received.
    pub code: u16,
}

/// Classifies a result code without logging.
///
/// # Errors
///
/// Returns [`UnhandledCode`] for any code not listed in the module table.
pub fn classify(code: u16, policy: ObjectMissingPolicy) -> Result<Disposition, UnhandledCode> {
    let disposition = match ResultCode::from_u16(code) {
        ResultCode::Success => Disposition::Completed,
        ResultCode::SuccessPending => Disposition::Pending,
        ResultCode::QueueEmpty => Disposition::QueueEmpty,
        ResultCode::QueueHasMessages => Disposition::QueueHasMessages,
        ResultCode::SessionEnded => Disposition::SessionEnded,
        ResultCode::SyntaxError
        | ResultCode::CommandUseError
        | ResultCode::RequiredParameterMissing
        | ResultCode::ParameterValueRange
        | ResultCode::AuthorizationError
        | ResultCode::ObjectStatusProhibitsOperation
        | ResultCode::DataManagementPolicyViolation => Disposition::CommandFailed,
        ResultCode::AuthenticationError => Disposition::AuthenticationFailed,
        ResultCode::ObjectDoesNotExist => match policy {
            ObjectMissingPolicy::PassThrough | ObjectMissingPolicy::Warn => {
                Disposition::ObjectMissing
            }
            ObjectMissingPolicy::Fail => Disposition::CommandFailed,
        },
        ResultCode::SessionLimitExceeded => Disposition::Throttled,
        ResultCode::Other(code) => return Err(UnhandledCode { code }),
    };
    Ok(disposition)
}

/// Classifies a result code and logs it.
///
/// `context` names the command for the log line (e.g. `"domain create"`).
/// The reason, when the registry sent one, is logged with the code before
/// any error is returned. Nothing else happens here: no logout, no retry.
///
/// # Errors
///
/// Returns [`UnhandledCode`] for any code not listed in the module table.
pub fn interpret(
    context: &str,
    code: u16,
    reason: Option<&str>,
    policy: ObjectMissingPolicy,
) -> Result<Disposition, UnhandledCode> {
    let result_code = ResultCode::from_u16(code);
    let description = result_code.description();
    let reason_field = reason.unwrap_or_default();
    let outcome = classify(code, policy);

    match outcome {
        Err(_) => {
            error!(code, reason = reason_field, "{context} - unhandled return code {code}");
        }
        Ok(Disposition::ObjectMissing) => {
            if policy == ObjectMissingPolicy::Warn {
                warn!(code, reason = reason_field, "{context} - {description}");
            } else {
                debug!(code, reason = reason_field, "{context} - {description}");
            }
        }
        Ok(_) if result_code == ResultCode::AuthorizationError => {
            warn!(code, reason = reason_field, "{context} - {description}");
        }
        Ok(disposition) if disposition.is_failure() => {
            error!(code, reason = reason_field, "{context} - {description}");
        }
        Ok(_) => {
            info!(code, reason = reason_field, "{context} - {description}");
        }
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &[(u16, Disposition, Class)] = &[
        (1000, Disposition::Completed, Class::Success),
        (1001, Disposition::Pending, Class::Pending),
        (1300, Disposition::QueueEmpty, Class::Success),
        (1301, Disposition::QueueHasMessages, Class::Success),
        (1500, Disposition::SessionEnded, Class::Success),
        (2001, Disposition::CommandFailed, Class::Recoverable),
        (2002, Disposition::CommandFailed, Class::Recoverable),
        (2003, Disposition::CommandFailed, Class::Recoverable),
        (2004, Disposition::CommandFailed, Class::Recoverable),
        (2200, Disposition::AuthenticationFailed, Class::Fatal),
        (2201, Disposition::CommandFailed, Class::Recoverable),
        (2303, Disposition::ObjectMissing, Class::PassThrough),
        (2304, Disposition::CommandFailed, Class::Recoverable),
        (2308, Disposition::CommandFailed, Class::Recoverable),
        (2502, Disposition::Throttled, Class::Recoverable),
    ];

    #[test]
    fn every_known_code_matches_table() {
        for &(code, disposition, class) in TABLE {
            let got = classify(code, ObjectMissingPolicy::default()).unwrap();
            assert_eq!(got, disposition, "code {code}");
            assert_eq!(got.class(), class, "code {code}");
        }
    }

    #[test]
    fn interpret_agrees_with_classify() {
        for &(code, disposition, _) in TABLE {
            let got = interpret("test", code, Some("why"), ObjectMissingPolicy::Warn).unwrap();
            assert_eq!(got, disposition, "code {code}");
        }
    }

    #[test]
    fn unknown_codes_carry_the_raw_code() {
        for code in [0, 1002, 2000, 2305, 2400, 2500, 9999] {
            let err = interpret("test", code, None, ObjectMissingPolicy::default()).unwrap_err();
            assert_eq!(err, UnhandledCode { code });
            assert!(err.to_string().contains(&code.to_string()));
        }
    }

    #[test]
    fn object_missing_policy() {
        assert_eq!(
            classify(2303, ObjectMissingPolicy::PassThrough).unwrap(),
            Disposition::ObjectMissing
        );
        assert_eq!(
            classify(2303, ObjectMissingPolicy::Warn).unwrap(),
            Disposition::ObjectMissing
        );
        assert_eq!(
            classify(2303, ObjectMissingPolicy::Fail).unwrap(),
            Disposition::CommandFailed
        );
    }

    #[test]
    fn object_missing_policy_from_config_string() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: ObjectMissingPolicy,
        }
        let w: Wrapper = serde_json::from_str(r#"{"policy":"pass-through"}"#).unwrap();
        assert_eq!(w.policy, ObjectMissingPolicy::PassThrough);
        let w: Wrapper = serde_json::from_str(r#"{"policy":"fail"}"#).unwrap();
        assert_eq!(w.policy, ObjectMissingPolicy::Fail);
    }

    #[test]
    fn result_code_roundtrips_numbers() {
        for &(code, _, _) in TABLE {
            assert_eq!(ResultCode::from_u16(code).as_u16(), code);
        }
        assert_eq!(ResultCode::from(4242), ResultCode::Other(4242));
        assert_eq!(ResultCode::Other(4242).as_u16(), 4242);
    }

    #[test]
    fn only_throttling_is_retryable() {
        assert!(Disposition::Throttled.is_retryable());
        assert!(!Disposition::CommandFailed.is_retryable());
        assert!(!Disposition::AuthenticationFailed.is_retryable());
    }

    #[test]
    fn success_and_failure_predicates() {
        assert!(Disposition::Completed.is_success());
        assert!(Disposition::Pending.is_success());
        assert!(!Disposition::ObjectMissing.is_success());
        assert!(!Disposition::ObjectMissing.is_failure());
        assert!(Disposition::AuthenticationFailed.is_failure());
        assert!(Disposition::Throttled.is_failure());
    }

    #[test]
    fn display() {
        assert_eq!(ResultCode::Success.to_string(), "1000 (success)");
        assert_eq!(Disposition::QueueHasMessages.to_string(), "queue_has_messages");
    }

    #[derive(Clone, Default)]
    struct Capture(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Capture {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for Capture {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn logged(code: u16, reason: &str) -> String {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(capture.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let _ = interpret("domain-info", code, Some(reason), ObjectMissingPolicy::PassThrough);
        });
        let bytes = capture.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn reason_is_logged_with_every_code() {
        for (code, reason) in [
            (1000, "all good"),
            (2303, "never registered"),
            (2308, "bad country"),
            (1234, "brand new"),
        ] {
            let line = logged(code, reason);
            assert!(line.contains(&code.to_string()), "{line}");
            assert!(line.contains("reason="), "{line}");
            assert!(line.contains(reason), "{line}");
        }
    }
}
