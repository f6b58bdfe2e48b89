//! Request document rendering.
//!
//! [`render`] turns a [`Command`] and a client transaction ID into a
//! complete EPP document. Documents are written with quick-xml, which
//! escapes text and attribute values, so caller-supplied strings cannot
//! break the markup.

use std::io::Cursor;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::command::{
    Command, Contact, ContactUpdate, Domain, DomainContact, DomainDelta, DomainUpdate, Nameserver,
    PostalInfo, TransferDomain, TransferExtension, TransferOp,
};
use crate::error::{ProtocolError, ProtocolResult};
use crate::{CONTACT_NS, DOMAIN_NS, EPP_NS, EXTCON_NS, EXTDOM_NS, EXTEPP_NS, RGP_NS};

/// Renders `command` into an EPP document carrying `cltrid`.
///
/// # Errors
///
/// Returns [`ProtocolError::Render`] naming the command if the document
/// cannot be written.
pub fn render(command: &Command<'_>, cltrid: &str) -> ProtocolResult<String> {
    let mut w = DocWriter::new(command.name());

    w.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;
    w.open_with("epp", &[("xmlns", EPP_NS)])?;

    if let Command::Hello = command {
        w.empty("hello", &[])?;
    } else {
        w.open("command")?;
        write_command(&mut w, command)?;
        w.text("clTRID", cltrid)?;
        w.close("command")?;
    }

    w.close("epp")?;
    w.finish()
}

fn write_command(w: &mut DocWriter, command: &Command<'_>) -> ProtocolResult<()> {
    match command {
        Command::Hello => Ok(()),
        Command::Login {
            client_id,
            password,
            new_password,
        } => write_login(w, client_id, password, *new_password),
        Command::Logout => w.empty("logout", &[]),
        Command::ContactCheck { handles } => {
            w.open("check")?;
            w.open_with("contact:check", &[("xmlns:contact", CONTACT_NS)])?;
            for handle in handles {
                w.text("contact:id", handle)?;
            }
            w.close("contact:check")?;
            w.close("check")
        }
        Command::ContactCreate(contact) => write_contact_create(w, contact),
        Command::ContactUpdate(update) => write_contact_update(w, update),
        Command::ContactInfo { handle } => write_contact_simple(w, "info", handle),
        Command::ContactDelete { handle } => write_contact_simple(w, "delete", handle),
        Command::DomainCheck { names } => {
            w.open("check")?;
            w.open_with("domain:check", &[("xmlns:domain", DOMAIN_NS)])?;
            for name in names {
                w.text("domain:name", name)?;
            }
            w.close("domain:check")?;
            w.close("check")
        }
        Command::DomainCreate(domain) => write_domain_create(w, domain),
        Command::DomainUpdate(update) => write_domain_update(w, update),
        Command::DomainInfo { name, auth_info } => {
            w.open("info")?;
            w.open_with("domain:info", &[("xmlns:domain", DOMAIN_NS)])?;
            w.text_with("domain:name", &[("hosts", "all")], name)?;
            if let Some(pw) = auth_info {
                write_auth_info(w, "domain", pw)?;
            }
            w.close("domain:info")?;
            w.close("info")
        }
        Command::DomainDelete { name } => {
            w.open("delete")?;
            w.open_with("domain:delete", &[("xmlns:domain", DOMAIN_NS)])?;
            w.text("domain:name", name)?;
            w.close("domain:delete")?;
            w.close("delete")
        }
        Command::DomainTransfer {
            domain,
            op,
            extension,
        } => write_domain_transfer(w, domain, *op, *extension),
        Command::PollRequest => w.empty("poll", &[("op", "req")]),
        Command::PollAck { id } => w.empty("poll", &[("op", "ack"), ("msgID", *id)]),
    }
}

fn write_login(
    w: &mut DocWriter,
    client_id: &str,
    password: &str,
    new_password: Option<&str>,
) -> ProtocolResult<()> {
    w.open("login")?;
    w.text("clID", client_id)?;
    w.text("pw", password)?;
    if let Some(new_pw) = new_password {
        w.text("newPW", new_pw)?;
    }
    w.open("options")?;
    w.text("version", "1.0")?;
    w.text("lang", "en")?;
    w.close("options")?;
    w.open("svcs")?;
    w.text("objURI", CONTACT_NS)?;
    w.text("objURI", DOMAIN_NS)?;
    w.open("svcExtension")?;
    for uri in [EXTEPP_NS, EXTCON_NS, EXTDOM_NS, RGP_NS] {
        w.text("extURI", uri)?;
    }
    w.close("svcExtension")?;
    w.close("svcs")?;
    w.close("login")
}

fn write_contact_simple(w: &mut DocWriter, verb: &str, handle: &str) -> ProtocolResult<()> {
    let element = format!("contact:{verb}");
    w.open(verb)?;
    w.open_with(&element, &[("xmlns:contact", CONTACT_NS)])?;
    w.text("contact:id", handle)?;
    w.close(&element)?;
    w.close(verb)
}

fn write_postal_info(w: &mut DocWriter, info: &PostalInfo) -> ProtocolResult<()> {
    w.open_with("contact:postalInfo", &[("type", "loc")])?;
    w.text("contact:name", &info.name)?;
    if let Some(ref org) = info.org {
        w.text("contact:org", org)?;
    }
    w.open("contact:addr")?;
    for line in &info.street {
        w.text("contact:street", line)?;
    }
    w.text("contact:city", &info.city)?;
    if let Some(ref sp) = info.province {
        w.text("contact:sp", sp)?;
    }
    if let Some(ref pc) = info.postal_code {
        w.text("contact:pc", pc)?;
    }
    w.text("contact:cc", &info.country_code)?;
    w.close("contact:addr")?;
    w.close("contact:postalInfo")
}

fn write_auth_info(w: &mut DocWriter, prefix: &str, pw: &str) -> ProtocolResult<()> {
    let auth = format!("{prefix}:authInfo");
    w.open(&auth)?;
    w.text(&format!("{prefix}:pw"), pw)?;
    w.close(&auth)
}

fn write_contact_create(w: &mut DocWriter, contact: &Contact) -> ProtocolResult<()> {
    w.open("create")?;
    w.open_with("contact:create", &[("xmlns:contact", CONTACT_NS)])?;
    w.text("contact:id", &contact.handle)?;
    write_postal_info(w, &contact.postal_info)?;
    if let Some(ref voice) = contact.voice {
        w.text("contact:voice", voice)?;
    }
    if let Some(ref fax) = contact.fax {
        w.text("contact:fax", fax)?;
    }
    w.text("contact:email", &contact.email)?;
    write_auth_info(w, "contact", contact.auth_info.as_deref().unwrap_or_default())?;
    w.close("contact:create")?;
    w.close("create")?;

    if contact.consent_for_publishing.is_none() && contact.registrant.is_none() {
        return Ok(());
    }

    w.open("extension")?;
    w.open_with("extcon:create", &[("xmlns:extcon", EXTCON_NS)])?;
    if let Some(consent) = contact.consent_for_publishing {
        w.text("extcon:consentForPublishing", bool_str(consent))?;
    }
    if let Some(ref registrant) = contact.registrant {
        w.open("extcon:registrant")?;
        w.text("extcon:nationalityCode", &registrant.nationality_code)?;
        w.text("extcon:entityType", &registrant.entity_type.to_string())?;
        w.text("extcon:regCode", &registrant.reg_code)?;
        w.close("extcon:registrant")?;
    }
    w.close("extcon:create")?;
    w.close("extension")
}

fn write_status_list(w: &mut DocWriter, element: &str, statuses: &[String]) -> ProtocolResult<()> {
    for status in statuses {
        w.empty(element, &[("s", status.as_str())])?;
    }
    Ok(())
}

fn write_contact_update(w: &mut DocWriter, update: &ContactUpdate) -> ProtocolResult<()> {
    w.open("update")?;
    w.open_with("contact:update", &[("xmlns:contact", CONTACT_NS)])?;
    w.text("contact:id", &update.handle)?;

    if !update.add_status.is_empty() {
        w.open("contact:add")?;
        write_status_list(w, "contact:status", &update.add_status)?;
        w.close("contact:add")?;
    }
    if !update.rem_status.is_empty() {
        w.open("contact:rem")?;
        write_status_list(w, "contact:status", &update.rem_status)?;
        w.close("contact:rem")?;
    }

    let chg = &update.chg;
    if !chg.is_empty() {
        w.open("contact:chg")?;
        if let Some(ref info) = chg.postal_info {
            write_postal_info(w, info)?;
        }
        if let Some(ref voice) = chg.voice {
            w.text("contact:voice", voice)?;
        }
        if let Some(ref fax) = chg.fax {
            w.text("contact:fax", fax)?;
        }
        if let Some(ref email) = chg.email {
            w.text("contact:email", email)?;
        }
        if let Some(ref pw) = chg.auth_info {
            write_auth_info(w, "contact", pw)?;
        }
        w.close("contact:chg")?;
    }

    w.close("contact:update")?;
    w.close("update")?;

    if let Some(consent) = update.consent_for_publishing {
        w.open("extension")?;
        w.open_with("extcon:update", &[("xmlns:extcon", EXTCON_NS)])?;
        w.text("extcon:consentForPublishing", bool_str(consent))?;
        w.close("extcon:update")?;
        w.close("extension")?;
    }
    Ok(())
}

fn write_nameservers(w: &mut DocWriter, ns: &[Nameserver]) -> ProtocolResult<()> {
    if ns.is_empty() {
        return Ok(());
    }
    w.open("domain:ns")?;
    for host in ns {
        w.open("domain:hostAttr")?;
        w.text("domain:hostName", &host.name)?;
        for addr in &host.addrs {
            let version = if addr.contains(':') { "v6" } else { "v4" };
            w.text_with("domain:hostAddr", &[("ip", version)], addr)?;
        }
        w.close("domain:hostAttr")?;
    }
    w.close("domain:ns")
}

fn write_domain_contacts(w: &mut DocWriter, contacts: &[DomainContact]) -> ProtocolResult<()> {
    for contact in contacts {
        w.text_with(
            "domain:contact",
            &[("type", contact.role.as_str())],
            &contact.handle,
        )?;
    }
    Ok(())
}

fn write_domain_create(w: &mut DocWriter, domain: &Domain) -> ProtocolResult<()> {
    w.open("create")?;
    w.open_with("domain:create", &[("xmlns:domain", DOMAIN_NS)])?;
    w.text("domain:name", &domain.name)?;
    if let Some(period) = domain.period {
        w.text_with("domain:period", &[("unit", "y")], &period.to_string())?;
    }
    write_nameservers(w, &domain.ns)?;
    w.text("domain:registrant", &domain.registrant)?;
    write_domain_contacts(w, &domain.contacts)?;
    write_auth_info(w, "domain", &domain.auth_info)?;
    w.close("domain:create")?;
    w.close("create")
}

fn write_domain_delta(w: &mut DocWriter, element: &str, delta: &DomainDelta) -> ProtocolResult<()> {
    if delta.is_empty() {
        return Ok(());
    }
    w.open(element)?;
    write_nameservers(w, &delta.ns)?;
    write_domain_contacts(w, &delta.contacts)?;
    write_status_list(w, "domain:status", &delta.statuses)?;
    w.close(element)
}

fn write_domain_update(w: &mut DocWriter, update: &DomainUpdate) -> ProtocolResult<()> {
    w.open("update")?;
    w.open_with("domain:update", &[("xmlns:domain", DOMAIN_NS)])?;
    w.text("domain:name", &update.name)?;
    write_domain_delta(w, "domain:add", &update.add)?;
    write_domain_delta(w, "domain:rem", &update.rem)?;

    let chg = &update.chg;
    if !chg.is_empty() {
        w.open("domain:chg")?;
        if let Some(ref registrant) = chg.registrant {
            w.text("domain:registrant", registrant)?;
        }
        if let Some(ref pw) = chg.auth_info {
            write_auth_info(w, "domain", pw)?;
        }
        w.close("domain:chg")?;
    } else if update.add.is_empty() && update.rem.is_empty() {
        // an update needs at least one of add/rem/chg
        w.empty("domain:chg", &[])?;
    }

    w.close("domain:update")?;
    w.close("update")?;

    if update.restore {
        w.open("extension")?;
        w.open_with("rgp:update", &[("xmlns:rgp", RGP_NS)])?;
        w.empty("rgp:restore", &[("op", "request")])?;
        w.close("rgp:update")?;
        w.close("extension")?;
    }
    Ok(())
}

fn write_domain_transfer(
    w: &mut DocWriter,
    domain: &TransferDomain,
    op: TransferOp,
    extension: Option<&TransferExtension>,
) -> ProtocolResult<()> {
    w.open_with("transfer", &[("op", op.as_str())])?;
    w.open_with("domain:transfer", &[("xmlns:domain", DOMAIN_NS)])?;
    w.text("domain:name", &domain.name)?;
    if let Some(ref pw) = domain.auth_info {
        write_auth_info(w, "domain", pw)?;
    }
    w.close("domain:transfer")?;
    w.close("transfer")?;

    if let Some(trade) = extension {
        w.open("extension")?;
        w.open_with("extdom:trade", &[("xmlns:extdom", EXTDOM_NS)])?;
        w.open("extdom:transferTrade")?;
        w.text("extdom:newRegistrant", &trade.new_registrant)?;
        if let Some(ref pw) = trade.new_auth_info {
            write_auth_info(w, "extdom", pw)?;
        }
        w.close("extdom:transferTrade")?;
        w.close("extdom:trade")?;
        w.close("extension")?;
    }
    Ok(())
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}

/// Thin wrapper over the quick-xml writer that tags errors with the command.
struct DocWriter {
    command: &'static str,
    writer: Writer<Cursor<Vec<u8>>>,
}

impl DocWriter {
    fn new(command: &'static str) -> Self {
        Self {
            command,
            writer: Writer::new(Cursor::new(Vec::new())),
        }
    }

    fn event(&mut self, event: Event<'_>) -> ProtocolResult<()> {
        let command = self.command;
        self.writer
            .write_event(event)
            .map_err(|e| ProtocolError::render(command, e.to_string()))
    }

    fn open(&mut self, name: &str) -> ProtocolResult<()> {
        self.event(Event::Start(BytesStart::new(name)))
    }

    fn open_with(&mut self, name: &str, attrs: &[(&str, &str)]) -> ProtocolResult<()> {
        let mut start = BytesStart::new(name);
        for &attr in attrs {
            start.push_attribute(attr);
        }
        self.event(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> ProtocolResult<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> ProtocolResult<()> {
        let mut start = BytesStart::new(name);
        for &attr in attrs {
            start.push_attribute(attr);
        }
        self.event(Event::Empty(start))
    }

    fn text(&mut self, name: &str, value: &str) -> ProtocolResult<()> {
        self.text_with(name, &[], value)
    }

    fn text_with(&mut self, name: &str, attrs: &[(&str, &str)], value: &str) -> ProtocolResult<()> {
        self.open_with(name, attrs)?;
        self.event(Event::Text(BytesText::new(value)))?;
        self.close(name)
    }

    fn finish(self) -> ProtocolResult<String> {
        let command = self.command;
        String::from_utf8(self.writer.into_inner().into_inner())
            .map_err(|e| ProtocolError::render(command, e.to_string()))
    }
}
