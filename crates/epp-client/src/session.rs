//! Session state.

use epp_core::trid;
use serde::Serialize;

/// Whether the registry considers us logged in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Closed,
    Open,
}

/// Per-client session: login state and the transaction ID sequence.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    trid_prefix: String,
    cltrid: Option<String>,
}

impl Session {
    pub fn new(trid_prefix: impl Into<String>) -> Self {
        Self {
            state: SessionState::Closed,
            trid_prefix: trid_prefix.into(),
            cltrid: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SessionState::Open
    }

    /// Transaction ID of the last command sent.
    pub fn cltrid(&self) -> Option<&str> {
        self.cltrid.as_deref()
    }

    /// Generates the transaction ID for the next command.
    pub fn next_cltrid(&mut self) -> String {
        let id = trid::generate(&self.trid_prefix);
        self.cltrid = Some(id.clone());
        id
    }

    pub(crate) fn open(&mut self) {
        self.state = SessionState::Open;
    }

    pub(crate) fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_closed() {
        let session = Session::new("DGT");
        assert_eq!(session.state(), SessionState::Closed);
        assert!(session.cltrid().is_none());
    }

    #[test]
    fn each_command_gets_a_fresh_id() {
        let mut session = Session::new("DGT");
        let first = session.next_cltrid();
        assert!(first.starts_with("DGT-"));
        assert!(first.len() <= trid::MAX_TRID_LEN);
        assert_eq!(session.cltrid(), Some(first.as_str()));

        // same second, different seed: retry a few times to dodge the
        // 1-in-a-million suffix collision
        let distinct = (0..5).any(|_| session.next_cltrid() != first);
        assert!(distinct);
    }

    #[test]
    fn open_close() {
        let mut session = Session::new("DGT");
        session.open();
        assert!(session.is_open());
        session.close();
        assert!(!session.is_open());
    }
}
