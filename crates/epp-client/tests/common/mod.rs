//! Shared helpers for the client integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use epp_client::{BoxFuture, ClientError, ClientResult, EndpointConfig, Transport};

/// Transport replaying scripted replies and recording every request.
///
/// Clones share the same script and log, so a test keeps one clone to
/// inspect after handing the other to the client.
#[derive(Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    sent: Vec<String>,
    replies: VecDeque<String>,
}

impl MockTransport {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = Script {
            sent: Vec::new(),
            replies: replies.into_iter().map(Into::into).collect(),
        };
        Self {
            inner: Arc::new(Mutex::new(script)),
        }
    }

    /// Documents posted so far.
    pub fn sent(&self) -> Vec<String> {
        self.inner.lock().unwrap().sent.clone()
    }

    pub fn calls(&self) -> usize {
        self.inner.lock().unwrap().sent.len()
    }
}

impl Transport for MockTransport {
    fn post<'a>(&'a mut self, body: &'a str) -> BoxFuture<'a, ClientResult<String>> {
        let reply = {
            let mut script = self.inner.lock().unwrap();
            script.sent.push(body.to_string());
            script.replies.pop_front()
        };
        Box::pin(async move { reply.ok_or_else(|| ClientError::transport("no scripted reply")) })
    }
}

/// Transport that answers after a delay.
pub struct SlowTransport {
    pub delay: Duration,
    pub reply: String,
}

impl Transport for SlowTransport {
    fn post<'a>(&'a mut self, _body: &'a str) -> BoxFuture<'a, ClientResult<String>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            Ok(self.reply.clone())
        })
    }
}

/// Transport answering each scripted reply after its own delay.
///
/// The request is recorded before the delay starts, so a request that is
/// cancelled mid-flight still shows up in [`DelayedTransport::sent`].
#[derive(Clone, Default)]
pub struct DelayedTransport {
    sent: Arc<Mutex<Vec<String>>>,
    replies: Arc<Mutex<VecDeque<(Duration, String)>>>,
}

impl DelayedTransport {
    pub fn new<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = (Duration, String)>,
    {
        Self {
            sent: Arc::default(),
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for DelayedTransport {
    fn post<'a>(&'a mut self, body: &'a str) -> BoxFuture<'a, ClientResult<String>> {
        self.sent.lock().unwrap().push(body.to_string());
        let next = self.replies.lock().unwrap().pop_front();
        Box::pin(async move {
            let (delay, reply) = next.ok_or_else(|| ClientError::transport("no scripted reply"))?;
            tokio::time::sleep(delay).await;
            Ok(reply)
        })
    }
}

/// Log sink for a fmt subscriber; clones share the buffer.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Installs a debug-level subscriber writing here for the current thread.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl std::io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for LogCapture {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

pub fn endpoint() -> EndpointConfig {
    EndpointConfig::new("https://epp.example.it", "/")
        .unwrap()
        .with_name("test1")
        .with_credentials("DGT-REG", "s3cret")
        .with_trid_prefix("DGT")
}

/// A `<response>` with the given result and extra content after it.
pub fn response_with(code: u16, msg: &str, extra: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<epp xmlns="urn:ietf:params:xml:ns:epp-1.0">
  <response>
    <result code="{code}">
      <msg>{msg}</msg>
    </result>
    {extra}
    <trID>
      <clTRID>DGT-test</clTRID>
      <svTRID>SRV-1</svTRID>
    </trID>
  </response>
</epp>"#
    )
}

pub fn response(code: u16, msg: &str) -> String {
    response_with(code, msg, "")
}

pub fn completed() -> String {
    response(1000, "Command completed successfully")
}

pub fn session_ended() -> String {
    response(1500, "Command completed successfully; ending session")
}

pub fn queued_message(id: &str, count: u32, text: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<epp xmlns="urn:ietf:params:xml:ns:epp-1.0">
  <response>
    <result code="1301">
      <msg>Command completed successfully; ack to dequeue</msg>
    </result>
    <msgQ count="{count}" id="{id}">
      <qDate>2024-05-02T10:00:00.000+02:00</qDate>
      <msg>{text}</msg>
    </msgQ>
    <trID>
      <clTRID>DGT-test</clTRID>
      <svTRID>SRV-2</svTRID>
    </trID>
  </response>
</epp>"#
    )
}

pub fn queue_empty() -> String {
    response(1300, "Command completed successfully; no messages")
}
