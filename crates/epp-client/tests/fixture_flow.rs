mod common;

use std::sync::Mutex;

use common::{MockTransport, completed, endpoint, session_ended};
use epp_client::provisioning::park_alias;
use epp_client::{BoxFuture, ClientConfig, DnsRecordType, EppClient, HostedDomain, Provisioner};
use epp_core::Disposition;

const CONFIG: &str = r#"
handle_prefix = "DGH"

[servers.test1]
uri = "https://epp.example.it"
username = "DGT-REG"
password = "s3cret"

[fixtures.contacts.registrant]
email = "mario.rossi@example.it"
voice = "+39.0501234567"
consent_for_publishing = true

[fixtures.contacts.registrant.postal_info]
name = "Mario Rossi"
street = ["Via Moruzzi 1"]
city = "Pisa"
province = "PI"
postal_code = "56124"
country_code = "IT"

[fixtures.contacts.registrant.registrant]
nationality_code = "IT"
entity_type = 1
reg_code = "RSSMRA80A01G702X"

[fixtures.domains.sample]
name = "fixture-test.it"
registrant = "DGH-00001"
auth_info = "WWW-test-AUTH"
"#;

#[derive(Default)]
struct FakePanel {
    sites: Vec<HostedDomain>,
    aliases: Mutex<Vec<(String, u64)>>,
    records: Mutex<Vec<(u64, String, DnsRecordType, String)>>,
}

impl FakePanel {
    fn with_site(id: u64, name: &str) -> Self {
        Self {
            sites: vec![HostedDomain {
                id,
                name: name.to_string(),
            }],
            ..Self::default()
        }
    }
}

impl Provisioner for FakePanel {
    fn get_domain<'a>(&'a self, name: &'a str) -> BoxFuture<'a, Option<HostedDomain>> {
        Box::pin(async move { self.sites.iter().find(|s| s.name == name).cloned() })
    }

    fn create_alias<'a>(
        &'a self,
        name: &'a str,
        parent: &'a HostedDomain,
    ) -> BoxFuture<'a, Option<u64>> {
        Box::pin(async move {
            let mut aliases = self.aliases.lock().unwrap();
            if aliases.iter().any(|(n, _)| n == name) {
                return None;
            }
            aliases.push((name.to_string(), parent.id));
            Some(aliases.len() as u64)
        })
    }

    fn delete_alias<'a>(&'a self, name: &'a str) -> BoxFuture<'a, bool> {
        Box::pin(async move {
            let mut aliases = self.aliases.lock().unwrap();
            let before = aliases.len();
            aliases.retain(|(n, _)| n != name);
            aliases.len() != before
        })
    }

    fn add_dns_record<'a>(
        &'a self,
        _domain: &'a HostedDomain,
        host: &'a str,
        record_type: DnsRecordType,
        value: &'a str,
    ) -> BoxFuture<'a, Option<u64>> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap();
            let id = 100 + records.len() as u64;
            records.push((id, host.to_string(), record_type, value.to_string()));
            Some(id)
        })
    }

    fn del_dns_record(&self, id: u64) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|r| r.0 != id);
            records.len() != before
        })
    }
}

#[tokio::test]
async fn register_fixtures_and_park_on_panel() {
    let config = ClientConfig::parse(CONFIG).unwrap();
    let contact = config.contact_fixture("registrant").unwrap();
    assert!(contact.handle.starts_with("DGH-"));
    let domain = config.domain_fixture("sample").unwrap().clone();

    let transport = MockTransport::new([completed(), completed(), completed(), session_ended()]);
    let mut client = EppClient::with_transport(endpoint(), transport.clone());

    client.login(None, None).await.unwrap();
    let created = client.contact_create(&contact).await.unwrap().unwrap();
    assert_eq!(created.disposition, Disposition::Completed);
    let registered = client.domain_create(&domain).await.unwrap().unwrap();
    assert_eq!(registered.disposition, Disposition::Completed);
    client.logout().await.unwrap();

    let sent = transport.sent();
    assert!(sent[1].contains(&format!("<contact:id>{}</contact:id>", contact.handle)));
    assert!(sent[2].contains("<domain:name>fixture-test.it</domain:name>"));

    let panel = FakePanel::with_site(7, "hosting.example.it");
    let parked = park_alias(
        &panel,
        &domain.name,
        "hosting.example.it",
        &["dns1.example.it", "dns2.example.it"],
    )
    .await
    .unwrap();

    assert_eq!(parked.parent.id, 7);
    assert_eq!(parked.ns_records, vec![100, 101]);
    assert_eq!(
        panel.aliases.lock().unwrap().as_slice(),
        &[("fixture-test.it".to_string(), 7)]
    );

    assert!(panel.del_dns_record(100).await);
    assert!(panel.delete_alias("fixture-test.it").await);
    assert!(!panel.delete_alias("fixture-test.it").await);
}

#[tokio::test]
async fn parking_on_unknown_site_does_nothing() {
    let panel = FakePanel::default();
    assert!(park_alias(&panel, "a.it", "missing.example.it", &["dns1.example.it"])
        .await
        .is_none());
    assert!(panel.aliases.lock().unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_alias_is_refused() {
    let panel = FakePanel::with_site(1, "site.example.it");
    assert!(park_alias(&panel, "a.it", "site.example.it", &[]).await.is_some());
    assert!(park_alias(&panel, "a.it", "site.example.it", &[]).await.is_none());
}
