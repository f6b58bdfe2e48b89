//! EPP documents for the registry client.
//!
//! This crate knows how EPP looks on the wire and nothing about how it
//! gets there:
//!
//! - [`command`]: typed parameters for every supported command
//! - [`render()`]: request documents, one per [`Command`]
//! - [`EppResponse`]: response parsing and decoding of results, check
//!   data, info data and queue messages
//!
//! # Example
//!
//! ```rust
//! use epp_protocol::{Command, EppResponse, render};
//!
//! let xml = render(&Command::PollRequest, "DGT-1700000000-a1d0c").unwrap();
//! assert!(xml.contains(r#"<poll op="req"/>"#));
//!
//! let resp = EppResponse::parse(
//!     r#"<epp xmlns="urn:ietf:params:xml:ns:epp-1.0"><response><result code="1300"><msg>no messages</msg></result></response></epp>"#,
//! )
//! .unwrap();
//! assert_eq!(resp.result().unwrap().code, 1300);
//! ```

pub mod command;
mod error;
mod render;
mod response;
mod types;

pub use command::{
    Command, Contact, ContactChange, ContactRole, ContactUpdate, Domain, DomainChange,
    DomainContact, DomainDelta, DomainUpdate, Nameserver, PostalInfo, RegistrantInfo,
    TransferDomain, TransferExtension, TransferOp, UnknownTransferOp,
};
pub use error::{ProtocolError, ProtocolResult};
pub use render::render;
pub use response::{EppResponse, XmlNode};
pub use types::{ContactInfo, DomainAvailability, DomainInfo, Greeting, PollMessage, Status};

/// EPP base namespace.
pub const EPP_NS: &str = "urn:ietf:params:xml:ns:epp-1.0";
/// Contact object namespace.
pub const CONTACT_NS: &str = "urn:ietf:params:xml:ns:contact-1.0";
/// Domain object namespace.
pub const DOMAIN_NS: &str = "urn:ietf:params:xml:ns:domain-1.0";
/// Registry grace period extension.
pub const RGP_NS: &str = "urn:ietf:params:xml:ns:rgp-1.0";
/// Registry protocol extension.
pub const EXTEPP_NS: &str = "http://www.nic.it/ITNIC-EPP/extepp-2.0";
/// Registry contact extension.
pub const EXTCON_NS: &str = "http://www.nic.it/ITNIC-EPP/extcon-1.0";
/// Registry domain extension.
pub const EXTDOM_NS: &str = "http://www.nic.it/ITNIC-EPP/extdom-2.0";
