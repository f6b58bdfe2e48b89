//! Configuration commands.

use std::path::Path;

use tracing::info;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::secret::SecretRef;

const MASK: &str = "********";

/// Returns a copy of the configuration with literal passwords masked.
///
/// `pass::` and `env::` references are kept, they are not secrets.
pub fn masked(config: &ClientConfig) -> ClientConfig {
    let mut config = config.clone();
    for server in config.servers.values_mut() {
        if !SecretRef::parse(&server.password).is_reference() {
            server.password = MASK.to_string();
        }
    }
    config
}

/// Dump the current configuration to stdout.
pub fn dump(config: &ClientConfig, path: &Path) -> ClientResult<()> {
    let toml_str = toml::to_string_pretty(&masked(config))
        .map_err(|e| ClientError::config(format!("failed to serialize config: {}", e)))?;
    println!("# config.toml ({})", path.display());
    println!("{}", toml_str);

    Ok(())
}

/// Validate the configuration: every server must resolve to an endpoint.
///
/// This resolves secret references, so `pass` may prompt.
pub fn validate(config: &ClientConfig) -> ClientResult<()> {
    if let Some(ref default) = config.default_server {
        if !config.servers.contains_key(default) {
            return Err(ClientError::config(format!(
                "default_server `{}` has no [servers.{}] section",
                default, default
            )));
        }
    }

    for name in config.servers.keys() {
        let endpoint = config.endpoint(Some(name.as_str()))?;
        info!(server = %name, url = %endpoint.url, "server settings are valid");
        println!("server `{}`: {}", name, endpoint.url_str());
    }

    for (name, domain) in &config.fixtures.domains {
        if domain.name.is_empty() {
            return Err(ClientError::config(format!(
                "domain fixture `{}` has an empty name",
                name
            )));
        }
    }

    println!("Configuration is valid.");
    Ok(())
}

/// Show the configuration file path.
pub fn path(path: &Path) -> ClientResult<()> {
    println!("config: {}", path.display());
    Ok(())
}
