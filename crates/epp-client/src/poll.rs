//! Service message queue.
//!
//! The registry queues notices (transfer requests, DNS check reports and
//! so on) for the registrar. A message stays at the head of the queue until
//! it is acknowledged by ID.

use std::time::Duration;

use epp_core::Disposition;
use epp_protocol::{Command, PollMessage};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::client::{CODE_COMPLETED, EppClient};
use crate::error::ClientResult;
use crate::result::CommandResult;

/// Result code of a poll request that returned a message.
const CODE_QUEUE_HAS_MESSAGES: u16 = 1301;

/// Outcome of one [`EppClient::poll_check`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PollOutcome {
    /// The poll request result, with the message when there was one.
    pub request: CommandResult<PollMessage>,
    /// The acknowledgement, when a message was taken.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<CommandResult<()>>,
}

impl PollOutcome {
    /// ID of the message that was taken and acknowledged.
    pub fn acknowledged_id(&self) -> Option<&str> {
        let ack = self.ack.as_ref()?;
        if ack.code() != CODE_COMPLETED {
            return None;
        }
        self.request.payload.as_ref().map(|m| m.id.as_str())
    }
}

/// Bounds for [`EppClient::drain_queue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrainOptions {
    /// Maximum number of messages to take.
    pub max_messages: usize,
    /// Pause between two messages.
    pub delay: Duration,
    /// Overall time budget.
    pub timeout: Option<Duration>,
}

impl Default for DrainOptions {
    fn default() -> Self {
        Self {
            max_messages: Self::DEFAULT_MAX_MESSAGES,
            delay: Duration::ZERO,
            timeout: None,
        }
    }
}

impl DrainOptions {
    pub const DEFAULT_MAX_MESSAGES: usize = 100;

    pub fn with_max_messages(mut self, max: usize) -> Self {
        self.max_messages = max;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// What [`EppClient::drain_queue`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// IDs of the acknowledged messages, in queue order.
    pub acknowledged: Vec<String>,
    /// True when the message bound or the time budget stopped the drain
    /// before the queue was seen empty.
    pub exhausted: bool,
}

impl EppClient {
    /// Asks for the message at the head of the queue.
    ///
    /// On 1301 the payload holds the message; on 1300 there is none.
    pub async fn poll_request(&mut self) -> ClientResult<Option<CommandResult<PollMessage>>> {
        let result = self
            .execute(&Command::PollRequest, |code, response| {
                (code == CODE_QUEUE_HAS_MESSAGES)
                    .then(|| response.poll_message())
                    .flatten()
            })
            .await?;

        if let Some(ref result) = result {
            match result.payload {
                Some(ref msg) => info!(
                    id = %msg.id,
                    count = msg.count,
                    "message queued on {} with ID {} \"{}\"",
                    msg.date,
                    msg.id,
                    msg.text
                ),
                None if result.disposition == Disposition::QueueEmpty => {
                    info!("no messages in queue")
                }
                None => {}
            }
        }
        Ok(result)
    }

    /// Acknowledges (dequeues) a message.
    pub async fn poll_ack(&mut self, id: &str) -> ClientResult<Option<CommandResult<()>>> {
        info!(id = %id, "poll ack");
        self.execute(&Command::PollAck { id }, |_, _| None).await
    }

    /// Takes one message: request it, archive it, acknowledge it.
    ///
    /// Nothing is acknowledged when the queue is empty.
    pub async fn poll_check(&mut self) -> ClientResult<Option<PollOutcome>> {
        let Some(request) = self.poll_request().await? else {
            return Ok(None);
        };
        self.settle(request).await.map(Some)
    }

    /// Archives and acknowledges the message carried by `request`, if any.
    async fn settle(&mut self, request: CommandResult<PollMessage>) -> ClientResult<PollOutcome> {
        let Some(id) = request.payload.as_ref().map(|m| m.id.clone()) else {
            return Ok(PollOutcome { request, ack: None });
        };

        self.mirror(|trace| trace.archive(&request));
        let ack = self.poll_ack(&id).await?;

        Ok(PollOutcome { request, ack })
    }

    /// Takes messages until the queue is empty or a bound is hit.
    ///
    /// Hitting `max_messages` or the timeout is reported through
    /// [`DrainReport::exhausted`], not as an error. The time budget is
    /// checked before each message and bounds the poll request only: an
    /// acknowledgement that was sent is always awaited, so the report never
    /// misses a dequeued message. A failed acknowledgement stops the drain
    /// so the same message is not taken again in a loop.
    pub async fn drain_queue(&mut self, options: DrainOptions) -> ClientResult<DrainReport> {
        let deadline = options.timeout.map(|t| Instant::now() + t);
        let mut report = DrainReport::default();

        loop {
            if report.acknowledged.len() >= options.max_messages {
                warn!(max = options.max_messages, "drain stopped at the message bound");
                report.exhausted = true;
                break;
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!("drain stopped at the time budget");
                report.exhausted = true;
                break;
            }

            let request = match deadline {
                Some(deadline) => {
                    match tokio::time::timeout_at(deadline, self.poll_request()).await {
                        Ok(request) => request?,
                        Err(_) => {
                            warn!("drain stopped at the time budget");
                            report.exhausted = true;
                            break;
                        }
                    }
                }
                None => self.poll_request().await?,
            };

            let Some(request) = request else {
                break;
            };
            let outcome = self.settle(request).await?;
            match outcome.acknowledged_id() {
                Some(id) => report.acknowledged.push(id.to_string()),
                None => break,
            }

            if !options.delay.is_zero() {
                tokio::time::sleep(options.delay).await;
            }
        }

        info!(
            acknowledged = report.acknowledged.len(),
            exhausted = report.exhausted,
            "queue drain finished"
        );
        Ok(report)
    }
}
