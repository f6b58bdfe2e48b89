//! Client configuration.
//!
//! All settings live in a single `config.toml` file at
//! `~/.config/eppctl/config.toml` by default:
//!
//! ```toml
//! default_server = "test1"
//! trid_prefix = "DGT"
//! handle_prefix = "DGT"
//! object_missing = "warn"
//! trace_dir = "/var/log/eppctl"
//!
//! [servers.test1]
//! uri = "https://epp-test.example.it"
//! path = "/"
//! username = "DGT-REG"
//! password = "pass::registry/test1"
//!
//! [fixtures.contacts.registrant1]
//! email = "mario.rossi@example.it"
//! # ...
//! ```
//!
//! Credential values (`username`, `password`) support secret references:
//! - `pass::path/in/store`: resolved via `pass show`
//! - `env::VAR_NAME`: resolved from the environment
//! - plain text: used as-is

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use epp_core::ObjectMissingPolicy;
use epp_protocol::{Contact, Domain};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{ClientError, ClientResult};

// ---------------------------------------------------------------------------
// ClientConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the registry client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server used when none is named on the command line.
    pub default_server: Option<String>,

    /// Render and log commands without sending them.
    pub dry_run: bool,

    /// Prefix of client transaction IDs.
    pub trid_prefix: Option<String>,

    /// Prefix of generated contact handles.
    pub handle_prefix: Option<String>,

    /// Treatment of "object does not exist" (2303).
    pub object_missing: ObjectMissingPolicy,

    /// Directory receiving the document trace and the queue archive.
    pub trace_dir: Option<PathBuf>,

    /// Registry endpoints by name.
    pub servers: BTreeMap<String, ServerSettings>,

    /// Sample objects.
    pub fixtures: Fixtures,
}

/// One registry endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    /// Base URI, e.g. `https://epp.example.it`.
    pub uri: String,

    /// Path appended to the URI.
    #[serde(default)]
    pub path: String,

    /// Registrar login ID (supports `pass::` and `env::` prefixes).
    pub username: String,

    /// Password (supports `pass::` and `env::` prefixes).
    pub password: String,

    /// Whether to verify TLS certificates.
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_verify_tls() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    EndpointConfig::DEFAULT_TIMEOUT_SECS
}

/// Sample contacts and domains, keyed by fixture name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixtures {
    pub contacts: BTreeMap<String, Contact>,
    pub domains: BTreeMap<String, Domain>,
}

impl ClientConfig {
    /// Loads configuration from the default path.
    ///
    /// A missing file yields the default configuration.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ClientError::config(format!("failed to read config: {}", e)))?;
        Self::parse(&content)
    }

    /// Parses configuration from TOML text.
    pub fn parse(content: &str) -> ClientResult<Self> {
        toml::from_str(content)
            .map_err(|e| ClientError::config(format!("failed to parse config: {}", e)))
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Returns the default configuration directory.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("eppctl")
    }

    /// Selects a server by name, falling back to `default_server` and then
    /// to the only configured server.
    pub fn server(&self, name: Option<&str>) -> ClientResult<(&str, &ServerSettings)> {
        let wanted = name.or(self.default_server.as_deref());
        match wanted {
            Some(wanted) => self
                .servers
                .get_key_value(wanted)
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| ClientError::config(format!("unknown server `{}`", wanted))),
            None if self.servers.len() == 1 => self
                .servers
                .iter()
                .next()
                .map(|(k, v)| (k.as_str(), v))
                .ok_or_else(|| ClientError::config("no servers configured")),
            None if self.servers.is_empty() => Err(ClientError::config(format!(
                "no servers configured. Add a [servers.<name>] section to {}",
                Self::default_path().display()
            ))),
            None => Err(ClientError::config(
                "several servers configured, pick one with --server or default_server",
            )),
        }
    }

    /// Builds the runtime endpoint for a server, resolving secrets.
    pub fn endpoint(&self, name: Option<&str>) -> ClientResult<EndpointConfig> {
        let (server_name, server) = self.server(name)?;
        let username = crate::secret::resolve(&server.username).map_err(|e| {
            ClientError::config(format!("failed to resolve username of `{}`: {}", server_name, e))
        })?;
        let password = crate::secret::resolve(&server.password).map_err(|e| {
            ClientError::config(format!("failed to resolve password of `{}`: {}", server_name, e))
        })?;

        let mut endpoint = EndpointConfig::new(&server.uri, &server.path)
            .map_err(|e| {
                ClientError::config(format!("invalid uri for server `{}`: {}", server_name, e))
            })?
            .with_name(server_name)
            .with_credentials(username, password)
            .with_timeout(Duration::from_secs(server.timeout_secs))
            .with_dry_run(self.dry_run)
            .with_object_missing(self.object_missing);

        if !server.verify_tls {
            endpoint = endpoint.with_insecure_tls();
        }
        if let Some(ref prefix) = self.trid_prefix {
            endpoint = endpoint.with_trid_prefix(prefix);
        }
        if let Some(ref dir) = self.trace_dir {
            endpoint = endpoint.with_trace_dir(dir);
        }
        Ok(endpoint)
    }

    /// Returns a contact fixture, generating its handle when it has none.
    pub fn contact_fixture(&self, name: &str) -> Option<Contact> {
        let mut contact = self.fixtures.contacts.get(name)?.clone();
        if contact.handle.is_empty() {
            let prefix = self
                .handle_prefix
                .as_deref()
                .unwrap_or(EndpointConfig::DEFAULT_TRID_PREFIX);
            contact.handle = epp_core::trid::handle(prefix);
        }
        Some(contact)
    }

    /// Returns a domain fixture.
    pub fn domain_fixture(&self, name: &str) -> Option<&Domain> {
        self.fixtures.domains.get(name)
    }
}

// ---------------------------------------------------------------------------
// EndpointConfig (runtime)
// ---------------------------------------------------------------------------

/// Login credentials for one registrar account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Runtime settings of one client.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    /// Name used in logs and trace files.
    pub name: String,

    /// Full URL commands are posted to.
    pub url: Url,

    pub credentials: Credentials,

    /// Whether to verify TLS certificates.
    pub verify_tls: bool,

    /// Request timeout.
    pub timeout: Duration,

    /// User agent string.
    pub user_agent: String,

    /// Render and log without sending.
    pub dry_run: bool,

    /// Prefix of client transaction IDs.
    pub trid_prefix: String,

    /// Treatment of result code 2303.
    pub object_missing: ObjectMissingPolicy,

    /// Trace directory, when tracing is enabled.
    pub trace_dir: Option<PathBuf>,
}

impl EndpointConfig {
    /// Default timeout in seconds.
    pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

    /// Default transaction ID and handle prefix.
    pub const DEFAULT_TRID_PREFIX: &'static str = "EPP";

    /// Creates a configuration posting to `uri` joined with `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the resulting URL is invalid.
    pub fn new(uri: impl AsRef<str>, path: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let uri = uri.as_ref();
        let path = path.as_ref();
        let full = if path.is_empty() {
            uri.to_string()
        } else {
            format!(
                "{}/{}",
                uri.trim_end_matches('/'),
                path.trim_start_matches('/')
            )
        };
        let url = Url::parse(&full)?;

        Ok(Self {
            name: "epp".to_string(),
            url,
            credentials: Credentials {
                client_id: String::new(),
                password: String::new(),
            },
            verify_tls: true,
            timeout: Duration::from_secs(Self::DEFAULT_TIMEOUT_SECS),
            user_agent: format!("eppctl/{}", env!("CARGO_PKG_VERSION")),
            dry_run: false,
            trid_prefix: Self::DEFAULT_TRID_PREFIX.to_string(),
            object_missing: ObjectMissingPolicy::default(),
            trace_dir: None,
        })
    }

    /// Sets the name used in logs and trace files.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the login credentials.
    pub fn with_credentials(
        mut self,
        client_id: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Credentials {
            client_id: client_id.into(),
            password: password.into(),
        };
        self
    }

    /// Disables TLS verification (for test registries only).
    pub fn with_insecure_tls(mut self) -> Self {
        self.verify_tls = false;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the user agent string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_trid_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.trid_prefix = prefix.into();
        self
    }

    pub fn with_object_missing(mut self, policy: ObjectMissingPolicy) -> Self {
        self.object_missing = policy;
        self
    }

    /// Enables the document trace under `dir`.
    pub fn with_trace_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.trace_dir = Some(dir.into());
        self
    }

    /// Returns the URL as a string.
    pub fn url_str(&self) -> &str {
        self.url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
default_server = "test1"
trid_prefix = "DGT"
handle_prefix = "DGH"
object_missing = "warn"

[servers.test1]
uri = "https://epp-test.example.it/"
path = "/epp"
username = "DGT-REG"
password = "secret"

[servers.test2]
uri = "https://epp-test.example.it"
username = "env::_EPPCTL_TEST_USER"
password = "secret2"
verify_tls = false
timeout_secs = 5

[fixtures.contacts.registrant1]
email = "mario.rossi@example.it"
consent_for_publishing = true

[fixtures.contacts.registrant1.postal_info]
name = "Mario Rossi"
street = ["Via Roma 1"]
city = "Milano"
country_code = "IT"

[fixtures.domains.first]
name = "test-1.it"
registrant = "REG1"
auth_info = "WWWtest-1"
"#;

    #[test]
    fn parses_full_config() {
        let config = ClientConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.object_missing, ObjectMissingPolicy::Warn);
        assert!(!config.dry_run);
        let test1 = &config.servers["test1"];
        assert!(test1.verify_tls);
        assert_eq!(test1.timeout_secs, EndpointConfig::DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.fixtures.contacts.len(), 1);
        assert_eq!(config.domain_fixture("first").unwrap().name, "test-1.it");
    }

    #[test]
    fn endpoint_joins_uri_and_path() {
        let config = ClientConfig::parse(SAMPLE).unwrap();
        let endpoint = config.endpoint(None).unwrap();
        assert_eq!(endpoint.name, "test1");
        assert_eq!(endpoint.url_str(), "https://epp-test.example.it/epp");
        assert_eq!(endpoint.credentials.client_id, "DGT-REG");
        assert_eq!(endpoint.trid_prefix, "DGT");
        assert!(endpoint.verify_tls);
    }

    #[test]
    fn endpoint_resolves_env_secrets() {
        unsafe {
            std::env::set_var("_EPPCTL_TEST_USER", "DGT-ENV");
        }
        let config = ClientConfig::parse(SAMPLE).unwrap();
        let endpoint = config.endpoint(Some("test2")).unwrap();
        assert_eq!(endpoint.credentials.client_id, "DGT-ENV");
        assert!(!endpoint.verify_tls);
        assert_eq!(endpoint.timeout, Duration::from_secs(5));
        unsafe {
            std::env::remove_var("_EPPCTL_TEST_USER");
        }
    }

    #[test]
    fn unknown_server_errors() {
        let config = ClientConfig::parse(SAMPLE).unwrap();
        let err = config.endpoint(Some("prod")).unwrap_err();
        assert!(err.to_string().contains("unknown server `prod`"));
    }

    #[test]
    fn ambiguous_server_errors() {
        let mut config = ClientConfig::parse(SAMPLE).unwrap();
        config.default_server = None;
        assert!(config.server(None).is_err());
        config.servers.remove("test2");
        assert_eq!(config.server(None).unwrap().0, "test1");
    }

    #[test]
    fn empty_config_has_no_servers() {
        let config = ClientConfig::default();
        let err = config.server(None).unwrap_err();
        assert!(err.to_string().contains("no servers configured"));
    }

    #[test]
    fn contact_fixture_gets_generated_handle() {
        let config = ClientConfig::parse(SAMPLE).unwrap();
        let contact = config.contact_fixture("registrant1").unwrap();
        assert!(contact.handle.starts_with("DGH-"));
        assert_eq!(contact.postal_info.city, "Milano");
        assert!(config.contact_fixture("missing").is_none());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let endpoint = EndpointConfig::new("https://epp.example.it", "")
            .unwrap()
            .with_credentials("DGT-REG", "hunter2");
        let debug = format!("{:?}", endpoint);
        assert!(debug.contains("DGT-REG"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn builder_methods() {
        let endpoint = EndpointConfig::new("https://epp.example.it", "")
            .unwrap()
            .with_insecure_tls()
            .with_timeout(Duration::from_secs(60))
            .with_dry_run(true)
            .with_trid_prefix("ABC")
            .with_object_missing(ObjectMissingPolicy::Fail)
            .with_trace_dir("/tmp/trace");
        assert!(!endpoint.verify_tls);
        assert!(endpoint.dry_run);
        assert_eq!(endpoint.trid_prefix, "ABC");
        assert_eq!(endpoint.object_missing, ObjectMissingPolicy::Fail);
        assert_eq!(endpoint.trace_dir, Some(PathBuf::from("/tmp/trace")));
    }

    #[test]
    fn invalid_uri_returns_error() {
        assert!(EndpointConfig::new("not a valid url", "/").is_err());
    }
}
