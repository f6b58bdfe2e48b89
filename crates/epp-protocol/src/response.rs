//! Response parsing.
//!
//! Responses are read into a small namespace-aware element tree
//! ([`XmlNode`]) and decoded on demand by [`EppResponse`]. Lookups match
//! local names; the object-specific parts of `resData` are selected by
//! namespace so that prefixes chosen by the server do not matter.

use std::collections::BTreeMap;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use serde::Serialize;

use crate::command::{ContactRole, DomainContact, PostalInfo};
use crate::error::{ProtocolError, ProtocolResult};
use crate::types::{ContactInfo, DomainAvailability, DomainInfo, Greeting, PollMessage, Status};
use crate::{CONTACT_NS, DOMAIN_NS, EXTDOM_NS};

/// An element of a parsed document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct XmlNode {
    /// Local name, without prefix.
    pub name: String,
    /// Resolved namespace URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Parses a document and returns its root element.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] if the document is not
    /// well-formed or has no root element.
    pub fn parse(xml: &str) -> ProtocolResult<Self> {
        let mut reader = NsReader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_resolved_event_into(&mut buf) {
                Ok((ns, Event::Start(e))) => stack.push(Self::from_start(&ns, &e)?),
                Ok((ns, Event::Empty(e))) => {
                    let node = Self::from_start(&ns, &e)?;
                    attach(&mut stack, &mut root, node);
                }
                Ok((_, Event::End(_))) => {
                    if let Some(node) = stack.pop() {
                        attach(&mut stack, &mut root, node);
                    }
                }
                Ok((_, Event::Text(t))) => {
                    let text = t
                        .unescape()
                        .map_err(|e| ProtocolError::malformed(e.to_string()))?;
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&text);
                    }
                }
                Ok((_, Event::CData(c))) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(&String::from_utf8_lossy(&c));
                    }
                }
                Ok((_, Event::Eof)) => break,
                Err(e) => return Err(ProtocolError::malformed(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        if let Some(open) = stack.last() {
            return Err(ProtocolError::malformed(format!(
                "element <{}> is not closed",
                open.name
            )));
        }
        root.ok_or_else(|| ProtocolError::malformed("document has no root element"))
    }

    fn from_start(ns: &ResolveResult<'_>, e: &BytesStart<'_>) -> ProtocolResult<Self> {
        let namespace = match ns {
            ResolveResult::Bound(uri) => Some(String::from_utf8_lossy(uri.as_ref()).into_owned()),
            _ => None,
        };

        let mut attrs = BTreeMap::new();
        for attr in e.attributes() {
            let attr = attr.map_err(|e| ProtocolError::malformed(e.to_string()))?;
            if attr.key.as_ref().starts_with(b"xmlns") {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| ProtocolError::malformed(e.to_string()))?
                .into_owned();
            attrs.insert(key, value);
        }

        Ok(Self {
            name: String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
            namespace,
            attrs,
            text: String::new(),
            children: Vec::new(),
        })
    }

    /// First child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// First child with the given local name in the given namespace.
    pub fn child_in(&self, namespace: &str, name: &str) -> Option<&XmlNode> {
        self.children
            .iter()
            .find(|c| c.name == name && c.namespace.as_deref() == Some(namespace))
    }

    /// All children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Follows a path of local names from this element.
    pub fn path(&self, names: &[&str]) -> Option<&XmlNode> {
        names.iter().try_fold(self, |node, name| node.child(name))
    }

    /// True if the path exists below this element.
    pub fn exists(&self, names: &[&str]) -> bool {
        self.path(names).is_some()
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text of the first child with the given name, if present.
    pub fn child_text(&self, name: &str) -> Option<String> {
        self.child(name).map(|c| c.text.clone())
    }

    /// True if the element has neither text nor children.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.children.is_empty()
    }
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

fn is_true(value: Option<&str>) -> bool {
    matches!(value, Some("1") | Some("true"))
}

/// A parsed server response.
///
/// An empty body parses to a response without a root: every accessor then
/// returns `None`, which callers report as a missing response.
#[derive(Debug, Clone, Default)]
pub struct EppResponse {
    root: Option<XmlNode>,
}

impl EppResponse {
    /// Parses a response body.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Malformed`] if a non-empty body is not
    /// well-formed XML.
    pub fn parse(body: &str) -> ProtocolResult<Self> {
        if body.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(Self {
            root: Some(XmlNode::parse(body)?),
        })
    }

    /// The `<epp>` element.
    pub fn root(&self) -> Option<&XmlNode> {
        self.root.as_ref()
    }

    fn response(&self) -> Option<&XmlNode> {
        self.root.as_ref()?.child("response")
    }

    /// Decodes the greeting, if the document carries a non-empty one.
    pub fn greeting(&self) -> Option<Greeting> {
        let greeting = self.root.as_ref()?.child("greeting")?;
        if greeting.is_empty() {
            return None;
        }

        let texts = |node: Option<&XmlNode>, name: &str| -> Vec<String> {
            node.map(|n| n.children_named(name).map(|c| c.text.clone()).collect())
                .unwrap_or_default()
        };
        let menu = greeting.child("svcMenu");

        Some(Greeting {
            server_id: greeting.child_text("svID").unwrap_or_default(),
            server_date: greeting.child_text("svDate").unwrap_or_default(),
            versions: texts(menu, "version"),
            languages: texts(menu, "lang"),
            objects: texts(menu, "objURI"),
            extensions: texts(menu.and_then(|m| m.child("svcExtension")), "extURI"),
        })
    }

    /// Decodes `<response><result>`.
    ///
    /// Returns `None` when the document has no response, no result, or a
    /// result without a numeric code.
    pub fn result(&self) -> Option<Status> {
        let result = self.response()?.child("result")?;
        let code = result.attr("code")?.trim().parse::<u16>().ok()?;
        let reason = result
            .children_named("extValue")
            .find_map(|v| v.child_text("reason"))
            .filter(|r| !r.is_empty());

        Some(Status {
            code,
            msg: result.child_text("msg").unwrap_or_default(),
            reason,
        })
    }

    /// The `<resData>` element.
    pub fn res_data(&self) -> Option<&XmlNode> {
        self.response()?.child("resData")
    }

    fn res_data_in(&self, namespace: &str, name: &str) -> Option<&XmlNode> {
        self.res_data()?.child_in(namespace, name)
    }

    /// Decodes a contact check: handle to availability.
    pub fn contact_availability(&self) -> BTreeMap<String, bool> {
        let Some(chk) = self.res_data_in(CONTACT_NS, "chkData") else {
            return BTreeMap::new();
        };
        chk.children_named("cd")
            .filter_map(|cd| cd.child("id"))
            .map(|id| (id.text.clone(), is_true(id.attr("avail"))))
            .collect()
    }

    /// Decodes a domain check: name to availability and reason.
    pub fn domain_availability(&self) -> BTreeMap<String, DomainAvailability> {
        let Some(chk) = self.res_data_in(DOMAIN_NS, "chkData") else {
            return BTreeMap::new();
        };
        chk.children_named("cd")
            .filter_map(|cd| {
                let name = cd.child("name")?;
                let avail = is_true(name.attr("avail"));
                let reason = if avail { None } else { cd.child_text("reason") };
                Some((name.text.clone(), DomainAvailability { avail, reason }))
            })
            .collect()
    }

    /// Decodes `contact:infData`.
    pub fn contact_info(&self) -> Option<ContactInfo> {
        let inf = self.res_data_in(CONTACT_NS, "infData")?;
        Some(ContactInfo {
            id: inf.child_text("id").unwrap_or_default(),
            roid: inf.child_text("roid"),
            statuses: statuses(inf),
            postal_info: inf.child("postalInfo").map(decode_postal_info),
            voice: inf.child_text("voice"),
            fax: inf.child_text("fax"),
            email: inf.child_text("email"),
            client_id: inf.child_text("clID"),
            creator_id: inf.child_text("crID"),
            created: inf.child_text("crDate"),
            updated: inf.child_text("upDate"),
        })
    }

    /// Decodes `domain:infData`.
    pub fn domain_info(&self) -> Option<DomainInfo> {
        let inf = self.res_data_in(DOMAIN_NS, "infData")?;
        let contacts = inf
            .children_named("contact")
            .filter_map(|c| {
                let role = match c.attr("type")? {
                    "admin" => ContactRole::Admin,
                    "tech" => ContactRole::Tech,
                    "billing" => ContactRole::Billing,
                    _ => return None,
                };
                Some(DomainContact {
                    role,
                    handle: c.text.clone(),
                })
            })
            .collect();
        let ns = inf
            .child("ns")
            .map(|ns| {
                ns.children
                    .iter()
                    .filter_map(|host| match host.name.as_str() {
                        "hostAttr" => host.child_text("hostName"),
                        "hostObj" => Some(host.text.clone()),
                        _ => None,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Some(DomainInfo {
            name: inf.child_text("name").unwrap_or_default(),
            roid: inf.child_text("roid"),
            statuses: statuses(inf),
            registrant: inf.child_text("registrant"),
            contacts,
            ns,
            client_id: inf.child_text("clID"),
            created: inf.child_text("crDate"),
            expires: inf.child_text("exDate"),
            auth_info: inf.path(&["authInfo", "pw"]).map(|pw| pw.text.clone()),
        })
    }

    /// Decodes the message queue head.
    pub fn poll_message(&self) -> Option<PollMessage> {
        let response = self.response()?;
        let msg_q = response.child("msgQ")?;
        let id = msg_q.attr("id")?.to_string();
        let extension = response
            .child("extension")
            .and_then(|ext| ext.child_in(EXTDOM_NS, "dnsErrorMsgData"))
            .cloned();

        Some(PollMessage {
            id,
            count: msg_q
                .attr("count")
                .and_then(|c| c.trim().parse().ok())
                .unwrap_or_default(),
            date: msg_q.child_text("qDate").unwrap_or_default(),
            text: msg_q.child_text("msg").unwrap_or_default(),
            extension,
        })
    }
}

fn statuses(node: &XmlNode) -> Vec<String> {
    node.children_named("status")
        .filter_map(|s| s.attr("s").map(str::to_string))
        .collect()
}

fn decode_postal_info(node: &XmlNode) -> PostalInfo {
    let addr = node.child("addr");
    let addr_text = |name: &str| addr.and_then(|a| a.child_text(name));
    PostalInfo {
        name: node.child_text("name").unwrap_or_default(),
        org: node.child_text("org"),
        street: addr
            .map(|a| a.children_named("street").map(|s| s.text.clone()).collect())
            .unwrap_or_default(),
        city: addr_text("city").unwrap_or_default(),
        province: addr_text("sp"),
        postal_code: addr_text("pc"),
        country_code: addr_text("cc").unwrap_or_default(),
    }
}
