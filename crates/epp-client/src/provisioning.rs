//! Hosting control panel collaborator.
//!
//! Registered domains are usually parked on a hosting panel as aliases of
//! an existing site, with extra DNS records. The panel itself lives outside
//! this crate; [`Provisioner`] is the seam it plugs into.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::transport::BoxFuture;

/// A site hosted on the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostedDomain {
    pub id: u64,
    pub name: String,
}

/// DNS record types the panel accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DnsRecordType {
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Txt,
}

impl DnsRecordType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Aaaa => "AAAA",
            Self::Cname => "CNAME",
            Self::Mx => "MX",
            Self::Ns => "NS",
            Self::Txt => "TXT",
        }
    }
}

impl fmt::Display for DnsRecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operations on the hosting panel.
///
/// Failures are reported as `None` / `false`; implementations log the
/// panel's own error text.
pub trait Provisioner: Send + Sync {
    /// Looks up a hosted site by name.
    fn get_domain<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Option<HostedDomain>>;

    /// Adds `name` as an alias of `parent`, returning the alias ID.
    fn create_alias<'a>(
        &'a self,
        name: &'a str,
        parent: &'a HostedDomain,
    ) -> BoxFuture<'a, Option<u64>>;

    /// Removes an alias.
    fn delete_alias<'a>(&'a self, name: &'a str) -> BoxFuture<'a, bool>;

    /// Adds a DNS record to a site, returning the record ID.
    ///
    /// An empty `host` targets the zone apex.
    fn add_dns_record<'a>(
        &'a self,
        domain: &'a HostedDomain,
        host: &'a str,
        record_type: DnsRecordType,
        value: &'a str,
    ) -> BoxFuture<'a, Option<u64>>;

    /// Removes a DNS record.
    fn del_dns_record(&self, id: u64) -> BoxFuture<'_, bool>;
}

/// An alias parked by [`park_alias`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkedAlias {
    pub alias_id: u64,
    pub parent: HostedDomain,
    /// IDs of the NS records added to the parent, in the order given.
    pub ns_records: Vec<u64>,
}

/// Parks `alias` on the site `parent` and adds apex NS records for
/// `nameservers`.
///
/// Returns `None` when the parent is unknown or the alias could not be
/// created. NS records that fail are logged and skipped.
pub async fn park_alias(
    provisioner: &dyn Provisioner,
    alias: &str,
    parent: &str,
    nameservers: &[&str],
) -> Option<ParkedAlias> {
    let Some(site) = provisioner.get_domain(parent).await else {
        warn!(parent = %parent, "hosted domain not found");
        return None;
    };

    let Some(alias_id) = provisioner.create_alias(alias, &site).await else {
        warn!(alias = %alias, parent = %site.name, "domain alias not created");
        return None;
    };
    info!(alias = %alias, parent = %site.name, id = alias_id, "domain alias \"{alias}\" of domain \"{}\" created", site.name);

    let mut ns_records = Vec::with_capacity(nameservers.len());
    for ns in nameservers {
        match provisioner
            .add_dns_record(&site, "", DnsRecordType::Ns, ns)
            .await
        {
            Some(id) => ns_records.push(id),
            None => warn!(parent = %site.name, ns = %ns, "NS record not added"),
        }
    }

    Some(ParkedAlias {
        alias_id,
        parent: site,
        ns_records,
    })
}
