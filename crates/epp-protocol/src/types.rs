//! Decoded response data.

use serde::{Deserialize, Serialize};

use crate::command::{DomainContact, PostalInfo};
use crate::response::XmlNode;

/// The `<result>` of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    /// Result code.
    pub code: u16,
    /// Human readable message.
    pub msg: String,
    /// Secondary explanation from `extValue/reason`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Server greeting returned by `<hello/>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Greeting {
    pub server_id: String,
    pub server_date: String,
    pub versions: Vec<String>,
    pub languages: Vec<String>,
    /// Object namespaces offered by the server.
    pub objects: Vec<String>,
    /// Extension namespaces offered by the server.
    pub extensions: Vec<String>,
}

/// Availability of one domain name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainAvailability {
    pub avail: bool,
    /// Why the name is not available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A contact as returned by `contact:info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub id: String,
    pub roid: Option<String>,
    pub statuses: Vec<String>,
    pub postal_info: Option<PostalInfo>,
    pub voice: Option<String>,
    pub fax: Option<String>,
    pub email: Option<String>,
    /// Sponsoring client.
    pub client_id: Option<String>,
    /// Client that created the object.
    pub creator_id: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
}

/// A domain as returned by `domain:info`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub name: String,
    pub roid: Option<String>,
    pub statuses: Vec<String>,
    pub registrant: Option<String>,
    pub contacts: Vec<DomainContact>,
    /// Nameserver host names.
    pub ns: Vec<String>,
    /// Sponsoring client.
    pub client_id: Option<String>,
    pub created: Option<String>,
    pub expires: Option<String>,
    pub auth_info: Option<String>,
}

/// A message taken from the service message queue.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollMessage {
    /// Message ID, used to acknowledge it.
    pub id: String,
    /// Messages left in the queue, this one included.
    pub count: u32,
    /// Enqueue date as sent by the server.
    pub date: String,
    /// Message text.
    pub text: String,
    /// DNS check report attached by the registry, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<XmlNode>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_reasons_are_left_out_of_json() {
        let status = Status {
            code: 1000,
            msg: "Command completed successfully".into(),
            reason: None,
        };
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["code"], 1000);
        assert!(json.get("reason").is_none());

        let taken: DomainAvailability =
            serde_json::from_str(r#"{"avail": false, "reason": "In use"}"#).unwrap();
        assert_eq!(taken.reason.as_deref(), Some("In use"));
        let free: DomainAvailability = serde_json::from_str(r#"{"avail": true}"#).unwrap();
        assert_eq!(free.reason, None);
    }

    #[test]
    fn poll_message_json_matches_archive_layout() {
        let msg = PollMessage {
            id: "12345".into(),
            count: 2,
            date: "2024-05-02T10:00:00.000+02:00".into(),
            text: "Transfer requested".into(),
            extension: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "12345",
                "count": 2,
                "date": "2024-05-02T10:00:00.000+02:00",
                "text": "Transfer requested",
            })
        );
    }
}
