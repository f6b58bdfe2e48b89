//! Object commands: contacts and domains.
//!
//! Each operation renders its command with a fresh transaction ID, sends
//! it, requires a result in the reply, interprets the code and, on 1000,
//! decodes the payload. In dry-run mode every operation returns `Ok(None)`.

use std::collections::BTreeMap;

use epp_protocol::{
    Command, Contact, ContactInfo, ContactUpdate, Domain, DomainAvailability, DomainInfo,
    DomainUpdate, TransferDomain, TransferExtension, TransferOp,
};
use tracing::info;

use crate::client::{CODE_COMPLETED, EppClient};
use crate::error::{ClientError, ClientResult};
use crate::result::CommandResult;

/// Anything that names a registry object.
pub trait ObjectId {
    fn object_id(&self) -> &str;
}

impl ObjectId for str {
    fn object_id(&self) -> &str {
        self
    }
}

impl ObjectId for String {
    fn object_id(&self) -> &str {
        self
    }
}

impl ObjectId for Contact {
    fn object_id(&self) -> &str {
        &self.handle
    }
}

impl ObjectId for Domain {
    fn object_id(&self) -> &str {
        &self.name
    }
}

impl ObjectId for TransferDomain {
    fn object_id(&self) -> &str {
        &self.name
    }
}

fn collect_ids<'a, T, I>(objects: I) -> Vec<&'a str>
where
    T: ObjectId + ?Sized + 'a,
    I: IntoIterator<Item = &'a T>,
{
    objects.into_iter().map(|o| o.object_id()).collect()
}

fn quoted(ids: &[&str]) -> String {
    ids.iter()
        .map(|id| format!("\"{id}\""))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result of a check command: identifier to availability.
pub type Availability<T> = BTreeMap<String, T>;

impl EppClient {
    /// Checks whether contact handles are free.
    ///
    /// Accepts handles or contacts, e.g. `["AA1", "BB2"]` or
    /// `fixtures.contacts.values()`.
    pub async fn contacts_check<'a, T, I>(
        &mut self,
        contacts: I,
    ) -> ClientResult<Option<CommandResult<Availability<bool>>>>
    where
        T: ObjectId + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let handles = collect_ids(contacts);
        info!("contact check for {}", quoted(&handles));

        let result = self
            .execute(&Command::ContactCheck { handles }, |code, response| {
                (code == CODE_COMPLETED).then(|| response.contact_availability())
            })
            .await?;

        if let Some(avail) = result.as_ref().and_then(|r| r.payload.as_ref()) {
            for (handle, free) in avail {
                info!(handle = %handle, available = *free, "\"{handle}\" is {}available", if *free { "" } else { "not " });
            }
        }
        Ok(result)
    }

    /// Creates a contact.
    pub async fn contact_create(
        &mut self,
        contact: &Contact,
    ) -> ClientResult<Option<CommandResult<()>>> {
        info!(handle = %contact.handle, "contact create");
        self.execute(&Command::ContactCreate(contact), |_, _| None)
            .await
    }

    /// Updates a contact.
    pub async fn contact_update(
        &mut self,
        update: &ContactUpdate,
    ) -> ClientResult<Option<CommandResult<()>>> {
        info!(handle = %update.handle, "contact update");
        self.execute(&Command::ContactUpdate(update), |_, _| None)
            .await
    }

    /// Reads a contact.
    pub async fn contact_info(
        &mut self,
        handle: &str,
    ) -> ClientResult<Option<CommandResult<ContactInfo>>> {
        info!(handle = %handle, "contact info");
        self.execute(&Command::ContactInfo { handle }, |code, response| {
            (code == CODE_COMPLETED)
                .then(|| response.contact_info())
                .flatten()
        })
        .await
    }

    /// Deletes a contact.
    pub async fn contact_delete(
        &mut self,
        handle: &str,
    ) -> ClientResult<Option<CommandResult<()>>> {
        info!(handle = %handle, "contact delete");
        self.execute(&Command::ContactDelete { handle }, |_, _| None)
            .await
    }

    /// Checks whether domain names are free, with the reason when not.
    pub async fn domains_check<'a, T, I>(
        &mut self,
        domains: I,
    ) -> ClientResult<Option<CommandResult<Availability<DomainAvailability>>>>
    where
        T: ObjectId + ?Sized + 'a,
        I: IntoIterator<Item = &'a T>,
    {
        let names = collect_ids(domains);
        info!("domain check for {}", quoted(&names));

        let result = self
            .execute(&Command::DomainCheck { names }, |code, response| {
                (code == CODE_COMPLETED).then(|| response.domain_availability())
            })
            .await?;

        if let Some(avail) = result.as_ref().and_then(|r| r.payload.as_ref()) {
            for (name, entry) in avail {
                match entry.reason {
                    Some(ref reason) if !entry.avail => {
                        info!(domain = %name, reason = %reason, "\"{name}\" is not available")
                    }
                    _ => info!(domain = %name, available = entry.avail, "\"{name}\" is {}available", if entry.avail { "" } else { "not " }),
                }
            }
        }
        Ok(result)
    }

    /// Creates a domain.
    pub async fn domain_create(
        &mut self,
        domain: &Domain,
    ) -> ClientResult<Option<CommandResult<()>>> {
        info!(domain = %domain.name, "domain create");
        self.execute(&Command::DomainCreate(domain), |_, _| None)
            .await
    }

    /// Updates a domain: add/remove/change blocks and restore requests.
    pub async fn domain_update(
        &mut self,
        update: &DomainUpdate,
    ) -> ClientResult<Option<CommandResult<()>>> {
        info!(domain = %update.name, restore = update.restore, "domain update");
        self.execute(&Command::DomainUpdate(update), |_, _| None)
            .await
    }

    /// Reads a domain. `auth_info` is needed for domains of other registrars.
    pub async fn domain_info(
        &mut self,
        name: &str,
        auth_info: Option<&str>,
    ) -> ClientResult<Option<CommandResult<DomainInfo>>> {
        info!(domain = %name, "domain info");
        self.execute(&Command::DomainInfo { name, auth_info }, |code, response| {
            (code == CODE_COMPLETED)
                .then(|| response.domain_info())
                .flatten()
        })
        .await
    }

    /// Deletes a domain.
    pub async fn domain_delete(&mut self, name: &str) -> ClientResult<Option<CommandResult<()>>> {
        info!(domain = %name, "domain delete");
        self.execute(&Command::DomainDelete { name }, |_, _| None)
            .await
    }

    /// Runs a transfer operation on a domain.
    ///
    /// `op` is one of `request`, `cancel`, `approve`, `reject` or `query`.
    /// `extension` bundles a registrant change with the transfer.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidOperation`] for any other `op`, before
    /// anything is rendered or sent.
    pub async fn domain_transfer(
        &mut self,
        domain: &TransferDomain,
        op: &str,
        extension: Option<&TransferExtension>,
    ) -> ClientResult<Option<CommandResult<()>>> {
        let op: TransferOp = op
            .parse()
            .map_err(|e: epp_protocol::UnknownTransferOp| ClientError::InvalidOperation(e.to_string()))?;

        info!(domain = %domain.name, op = %op, trade = extension.is_some(), "domain transfer");
        self.execute(
            &Command::DomainTransfer {
                domain,
                op,
                extension,
            },
            |_, _| None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_from_strings_and_objects() {
        assert_eq!(collect_ids(["AA1", "BB2"]), vec!["AA1", "BB2"]);

        let names = vec!["a.it".to_string(), "b.it".to_string()];
        assert_eq!(collect_ids(&names), vec!["a.it", "b.it"]);

        let domain = TransferDomain {
            name: "c.it".to_string(),
            auth_info: None,
        };
        assert_eq!(collect_ids([&domain]), vec!["c.it"]);
    }

    #[test]
    fn quoted_list() {
        assert_eq!(quoted(&["a", "b"]), "\"a\", \"b\"");
        assert_eq!(quoted(&[]), "");
    }
}
