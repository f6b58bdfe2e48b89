//! The EPP client and its session lifecycle.
//!
//! One [`EppClient`] owns one session: a transport (with its cookie
//! store), the transaction ID sequence and the trace mirror. All methods
//! take `&mut self`, so commands on a client never interleave. Use two
//! clients for two concurrent sessions.
//!
//! Every command goes through the same pipeline: a fresh transaction ID
//! is generated, the document is rendered and logged, then either
//! recorded (dry run) or posted, and the reply is parsed and interpreted.

use std::io;
use std::path::PathBuf;

use epp_core::interpret;
use epp_protocol::{Command, EppResponse, Greeting, render};
use tracing::{debug, error, info, warn};

use crate::config::EndpointConfig;
use crate::error::{ClientError, ClientResult};
use crate::result::CommandResult;
use crate::session::Session;
use crate::trace::TraceMirror;
use crate::transport::{HttpTransport, Transport};

/// Result code of a completed command.
pub(crate) const CODE_COMPLETED: u16 = 1000;
/// Result code of a completed logout.
pub(crate) const CODE_SESSION_ENDED: u16 = 1500;

/// Client for one registry session.
pub struct EppClient {
    endpoint: EndpointConfig,
    transport: Box<dyn Transport>,
    session: Session,
    trace: Option<TraceMirror>,
}

impl EppClient {
    /// Creates a client posting over HTTP to the configured endpoint.
    pub fn connect(endpoint: EndpointConfig) -> ClientResult<Self> {
        let transport = HttpTransport::new(&endpoint)?;
        Ok(Self::with_transport(endpoint, transport))
    }

    /// Creates a client over any transport.
    pub fn with_transport(endpoint: EndpointConfig, transport: impl Transport + 'static) -> Self {
        let trace = endpoint
            .trace_dir
            .as_ref()
            .map(|dir| TraceMirror::new(dir, endpoint.name.clone()));
        Self {
            session: Session::new(endpoint.trid_prefix.clone()),
            transport: Box::new(transport),
            endpoint,
            trace,
        }
    }

    pub fn endpoint(&self) -> &EndpointConfig {
        &self.endpoint
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_dry_run(&self) -> bool {
        self.endpoint.dry_run
    }

    /// Probes the server. Returns `None` in dry-run mode.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NoGreeting`] unless the reply carries a
    /// non-empty greeting.
    pub async fn hello(&mut self) -> ClientResult<Option<Greeting>> {
        let Some(response) = self.exchange(&Command::Hello).await? else {
            return Ok(None);
        };
        match response.greeting() {
            Some(greeting) => {
                info!(server = %greeting.server_id, "received a greeting after hello");
                Ok(Some(greeting))
            }
            None => {
                error!("no greeting after hello");
                Err(ClientError::NoGreeting)
            }
        }
    }

    /// Opens the session with the configured credentials.
    ///
    /// `test_password` replaces the configured password for this call only;
    /// `new_password` asks the registry to change the password. The stored
    /// credentials are never modified.
    pub async fn login(
        &mut self,
        new_password: Option<&str>,
        test_password: Option<&str>,
    ) -> ClientResult<Option<CommandResult<()>>> {
        let credentials = self.endpoint.credentials.clone();
        let command = Command::Login {
            client_id: &credentials.client_id,
            password: test_password.unwrap_or(credentials.password.as_str()),
            new_password,
        };

        let result = self.execute(&command, |_, _| None).await?;
        if let Some(ref result) = result {
            if result.code() == CODE_COMPLETED {
                self.session.open();
                info!(client_id = %credentials.client_id, "session started");
                if new_password.is_some() {
                    let back = if test_password.is_some() { " back" } else { "" };
                    info!(client_id = %credentials.client_id, "password changed{back}");
                }
            }
        }
        Ok(result)
    }

    /// Closes the session.
    pub async fn logout(&mut self) -> ClientResult<Option<CommandResult<()>>> {
        let result = self.execute(&Command::Logout, |_, _| None).await?;
        if let Some(ref result) = result {
            if result.code() == CODE_SESSION_ENDED {
                self.session.close();
                info!("session ended");
            }
        }
        Ok(result)
    }

    /// Sends a command and interprets the reply.
    ///
    /// `extract` receives the result code and the parsed reply and decodes
    /// the payload. Returns `None` in dry-run mode.
    pub(crate) async fn execute<T>(
        &mut self,
        command: &Command<'_>,
        extract: impl FnOnce(u16, &EppResponse) -> Option<T>,
    ) -> ClientResult<Option<CommandResult<T>>> {
        let name = command.name();
        let Some(response) = self.exchange(command).await? else {
            return Ok(None);
        };

        let Some(status) = response.result() else {
            error!(command = name, "no response");
            return Err(ClientError::no_response(name));
        };
        info!(command = name, code = status.code, msg = %status.msg, "received a response");

        let disposition = interpret(
            name,
            status.code,
            status.reason.as_deref(),
            self.endpoint.object_missing,
        )?;
        let payload = extract(status.code, &response);

        Ok(Some(CommandResult {
            command: name,
            status,
            disposition,
            payload,
        }))
    }

    /// Renders and sends a command. Returns `None` in dry-run mode.
    pub(crate) async fn exchange(
        &mut self,
        command: &Command<'_>,
    ) -> ClientResult<Option<EppResponse>> {
        let name = command.name();
        let cltrid = self.session.next_cltrid();
        let xml = render(command, &cltrid)?;

        if self.endpoint.dry_run {
            debug!(command = name, cltrid = %cltrid, body = %collapse_whitespace(&xml), "dry run, not sending");
            self.mirror(|trace| trace.dry_run(&xml));
            info!(command = name, cltrid = %cltrid, "{name} sent (dry run)");
            return Ok(None);
        }

        debug!(command = name, cltrid = %cltrid, body = %collapse_whitespace(&xml), "sending");
        self.mirror(|trace| trace.sent(&xml));

        let body = self.transport.post(&xml).await?;
        info!(command = name, cltrid = %cltrid, "{name} sent");

        debug!(command = name, body = %collapse_whitespace(&body), "receiving");
        self.mirror(|trace| trace.received(&body));

        Ok(Some(EppResponse::parse(&body)?))
    }

    /// Runs a trace write; failures are logged and otherwise ignored.
    pub(crate) fn mirror(&mut self, write: impl FnOnce(&mut TraceMirror) -> io::Result<PathBuf>) {
        if let Some(trace) = self.trace.as_mut() {
            match write(trace) {
                Ok(path) => debug!(path = %path.display(), "trace written"),
                Err(e) => warn!(error = %e, "failed to write trace file"),
            }
        }
    }
}

/// Collapses runs of whitespace into single spaces for one-line logging.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
