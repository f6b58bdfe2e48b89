//! EPP registry client.
//!
//! This crate provides the session client ([`EppClient`]), the HTTP
//! transport, the service message queue, the on-disk trace mirror and the
//! `eppctl` command-line interface.
//!
//! ```no_run
//! use epp_client::{EndpointConfig, EppClient};
//!
//! # async fn run() -> epp_client::ClientResult<()> {
//! let endpoint = EndpointConfig::new("https://epp.example.it", "/")
//!     .map_err(|e| epp_client::ClientError::config(e.to_string()))?
//!     .with_credentials("REG-ID", "secret");
//! let mut client = EppClient::connect(endpoint)?;
//!
//! client.login(None, None).await?;
//! let avail = client.domains_check(["example.it"]).await?;
//! client.logout().await?;
//! # let _ = avail;
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod handlers;
pub mod poll;
pub mod provisioning;
pub mod result;
pub mod secret;
pub mod session;
pub mod trace;
pub mod transport;

pub use cli::Cli;
pub use client::EppClient;
pub use commands::{Availability, ObjectId};
pub use config::{ClientConfig, EndpointConfig};
pub use error::{ClientError, ClientResult};
pub use poll::{DrainOptions, DrainReport, PollOutcome};
pub use provisioning::{DnsRecordType, HostedDomain, Provisioner};
pub use result::CommandResult;
pub use session::SessionState;
pub use transport::{BoxFuture, HttpTransport, Transport};
