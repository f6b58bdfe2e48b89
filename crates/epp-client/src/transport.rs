//! Document transport.
//!
//! EPP over HTTP is a plain request/response exchange: every document is
//! POSTed to the registry URL and the response body is the reply. The
//! registry keeps the session in a cookie, so [`HttpTransport`] owns a
//! cookie store for its whole lifetime.

use std::future::Future;
use std::pin::Pin;

use reqwest::{Client, StatusCode};
use tracing::{trace, warn};
use url::Url;

use crate::config::EndpointConfig;
use crate::error::{ClientError, ClientResult};

/// A boxed future for async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sends one document and returns the reply body.
///
/// Implementations must keep whatever state the registry uses to tie
/// requests to a session (cookies for HTTP).
pub trait Transport: Send {
    /// Posts `body` and returns the response body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Transport`] on network failures and non-2xx
    /// statuses, [`ClientError::Timeout`] when the request timed out.
    fn post<'a>(&'a mut self, body: &'a str) -> BoxFuture<'a, ClientResult<String>>;
}

/// HTTP transport backed by reqwest.
pub struct HttpTransport {
    client: Client,
    url: Url,
}

impl HttpTransport {
    /// Creates a transport for the given endpoint.
    pub fn new(config: &EndpointConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(!config.verify_tls)
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ClientError::transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }

    /// Returns the URL documents are posted to.
    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn send(&self, body: &str) -> ClientResult<String> {
        trace!(url = %self.url, "posting document");

        let response = self
            .client
            .post(self.url.clone())
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClientError::Timeout(format!("request to {} timed out", self.url))
                } else {
                    ClientError::transport(format!("request failed: {}", e))
                }
            })?;

        let status = response.status();
        trace!(status = %status, "received response");

        match status {
            s if s.is_success() => response
                .text()
                .await
                .map_err(|e| ClientError::transport(format!("failed to read response: {}", e))),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ClientError::transport(
                format!("access refused by {} ({})", self.url, status),
            )),
            s => {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %s, body = %body, "unexpected response status");
                Err(ClientError::transport(format!(
                    "unexpected status {}: {}",
                    s, body
                )))
            }
        }
    }
}

impl Transport for HttpTransport {
    fn post<'a>(&'a mut self, body: &'a str) -> BoxFuture<'a, ClientResult<String>> {
        Box::pin(self.send(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn transport_creation() {
        let config = EndpointConfig::new("https://epp.example.it", "/")
            .unwrap()
            .with_credentials("user", "pass")
            .with_timeout(Duration::from_secs(10));

        let transport = HttpTransport::new(&config);
        assert!(transport.is_ok());
    }

    #[test]
    fn transport_url() {
        let config = EndpointConfig::new("https://epp.example.it", "/epp").unwrap();
        let transport = HttpTransport::new(&config).unwrap();
        assert_eq!(transport.url().as_str(), "https://epp.example.it/epp");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error() {
        let config = EndpointConfig::new("http://127.0.0.1:9", "/")
            .unwrap()
            .with_timeout(Duration::from_secs(2));
        let mut transport = HttpTransport::new(&config).unwrap();
        let err = transport.post("<epp/>").await.unwrap_err();
        assert!(err.is_retryable());
    }
}
