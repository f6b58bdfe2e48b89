//! Command parameters for registry objects.
//!
//! These are the parameter structures handed to the renderer. They
//! deserialize from the fixture sections of the configuration file, so
//! field names follow the config's snake_case.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Postal information of a contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostalInfo {
    /// Person or role name.
    pub name: String,
    /// Organization.
    pub org: Option<String>,
    /// Street lines (up to three).
    pub street: Vec<String>,
    /// City.
    pub city: String,
    /// State or province code.
    pub province: Option<String>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// Two-letter country code.
    pub country_code: String,
}

/// Registrant data sent in the registry's contact extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrantInfo {
    /// Two-letter nationality code.
    pub nationality_code: String,
    /// Registry entity type (1 = natural person, 2-7 = organizations).
    pub entity_type: u8,
    /// Tax or registration code.
    pub reg_code: String,
}

/// A contact object to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Contact handle (registry ID). Fixtures may leave it empty.
    #[serde(default)]
    pub handle: String,
    /// Postal information.
    pub postal_info: PostalInfo,
    /// Voice number in `+CC.NUMBER` form.
    #[serde(default)]
    pub voice: Option<String>,
    /// Fax number in `+CC.NUMBER` form.
    #[serde(default)]
    pub fax: Option<String>,
    /// Email address.
    pub email: String,
    /// Contact authInfo password.
    #[serde(default)]
    pub auth_info: Option<String>,
    /// Consent to publish personal data.
    #[serde(default)]
    pub consent_for_publishing: Option<bool>,
    /// Registrant extension, only for registrant contacts.
    #[serde(default)]
    pub registrant: Option<RegistrantInfo>,
}

/// Fields to change on an existing contact.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactChange {
    pub postal_info: Option<PostalInfo>,
    pub voice: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    pub auth_info: Option<String>,
}

impl ContactChange {
    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.postal_info.is_none()
            && self.voice.is_none()
            && self.fax.is_none()
            && self.email.is_none()
            && self.auth_info.is_none()
    }
}

/// A contact update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactUpdate {
    /// Handle of the contact to update.
    pub handle: String,
    /// Status values to add.
    pub add_status: Vec<String>,
    /// Status values to remove.
    pub rem_status: Vec<String>,
    /// Changed fields.
    pub chg: ContactChange,
    /// New consent-for-publishing value.
    pub consent_for_publishing: Option<bool>,
}

impl ContactUpdate {
    /// Creates an empty update for `handle`.
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            ..Default::default()
        }
    }
}

/// Role of a contact linked to a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactRole {
    Admin,
    Tech,
    Billing,
}

impl ContactRole {
    /// Returns the protocol value of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Tech => "tech",
            Self::Billing => "billing",
        }
    }
}

/// A contact linked to a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainContact {
    /// Contact role.
    #[serde(rename = "type")]
    pub role: ContactRole,
    /// Contact handle.
    pub handle: String,
}

/// A nameserver with optional glue addresses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Nameserver {
    /// Host name.
    pub name: String,
    /// Glue addresses; IPv6 when the address contains a colon.
    #[serde(default)]
    pub addrs: Vec<String>,
}

impl Nameserver {
    /// Creates a nameserver without glue.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            addrs: Vec::new(),
        }
    }
}

/// A domain to create.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Fully qualified domain name.
    pub name: String,
    /// Registration period in years.
    #[serde(default)]
    pub period: Option<u32>,
    /// Nameservers.
    #[serde(default)]
    pub ns: Vec<Nameserver>,
    /// Registrant handle.
    pub registrant: String,
    /// Admin/tech/billing contacts.
    #[serde(default)]
    pub contacts: Vec<DomainContact>,
    /// Domain authInfo password.
    pub auth_info: String,
}

/// Elements added to or removed from a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainDelta {
    pub ns: Vec<Nameserver>,
    pub contacts: Vec<DomainContact>,
    pub statuses: Vec<String>,
}

impl DomainDelta {
    /// True if nothing is added or removed.
    pub fn is_empty(&self) -> bool {
        self.ns.is_empty() && self.contacts.is_empty() && self.statuses.is_empty()
    }
}

/// Fields to change on a domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainChange {
    pub registrant: Option<String>,
    pub auth_info: Option<String>,
}

impl DomainChange {
    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        self.registrant.is_none() && self.auth_info.is_none()
    }
}

/// A domain update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainUpdate {
    /// Name of the domain to update.
    pub name: String,
    pub add: DomainDelta,
    pub rem: DomainDelta,
    pub chg: DomainChange,
    /// Ask for restoration of a domain in redemption period.
    pub restore: bool,
}

impl DomainUpdate {
    /// Creates an empty update for `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// The domain a transfer command applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferDomain {
    pub name: String,
    #[serde(default)]
    pub auth_info: Option<String>,
}

/// Registrant change carried along with a transfer request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferExtension {
    /// Handle of the new registrant.
    pub new_registrant: String,
    /// New authInfo for the domain.
    pub new_auth_info: Option<String>,
}

/// Domain transfer sub-operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferOp {
    Request,
    Cancel,
    Approve,
    Reject,
    Query,
}

impl TransferOp {
    /// All accepted operations.
    pub const ALL: [TransferOp; 5] = [
        Self::Request,
        Self::Cancel,
        Self::Approve,
        Self::Reject,
        Self::Query,
    ];

    /// Returns the protocol value of the operation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Request => "request",
            Self::Cancel => "cancel",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for TransferOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An operation name outside [`TransferOp::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTransferOp(pub String);

impl fmt::Display for UnknownTransferOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "operation {} is not valid, accepted operations are request, cancel, approve, reject and query",
            self.0
        )
    }
}

impl std::error::Error for UnknownTransferOp {}

impl FromStr for TransferOp {
    type Err = UnknownTransferOp;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| UnknownTransferOp(s.to_string()))
    }
}

/// A command ready to render.
#[derive(Debug, Clone)]
pub enum Command<'a> {
    Hello,
    Login {
        client_id: &'a str,
        password: &'a str,
        new_password: Option<&'a str>,
    },
    Logout,
    ContactCheck {
        handles: Vec<&'a str>,
    },
    ContactCreate(&'a Contact),
    ContactUpdate(&'a ContactUpdate),
    ContactInfo {
        handle: &'a str,
    },
    ContactDelete {
        handle: &'a str,
    },
    DomainCheck {
        names: Vec<&'a str>,
    },
    DomainCreate(&'a Domain),
    DomainUpdate(&'a DomainUpdate),
    DomainInfo {
        name: &'a str,
        auth_info: Option<&'a str>,
    },
    DomainDelete {
        name: &'a str,
    },
    DomainTransfer {
        domain: &'a TransferDomain,
        op: TransferOp,
        extension: Option<&'a TransferExtension>,
    },
    PollRequest,
    PollAck {
        id: &'a str,
    },
}

impl Command<'_> {
    /// Template name of the command, used in logs, traces and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Login { .. } => "login",
            Self::Logout => "logout",
            Self::ContactCheck { .. } => "contact-check",
            Self::ContactCreate(_) => "contact-create",
            Self::ContactUpdate(_) => "contact-update",
            Self::ContactInfo { .. } => "contact-info",
            Self::ContactDelete { .. } => "contact-delete",
            Self::DomainCheck { .. } => "domain-check",
            Self::DomainCreate(_) => "domain-create",
            Self::DomainUpdate(_) => "domain-update",
            Self::DomainInfo { .. } => "domain-info",
            Self::DomainDelete { .. } => "domain-delete",
            Self::DomainTransfer { .. } => "domain-transfer",
            Self::PollRequest => "poll-request",
            Self::PollAck { .. } => "poll-ack",
        }
    }
}
