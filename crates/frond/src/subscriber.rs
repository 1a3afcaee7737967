//! Subscriber: long-lived streaming subscribe to a pubsub topic.
//!
//! Maintains one streaming POST to `pubsub/sub` and decodes the response
//! body as newline-delimited JSON records, one [Notification] per record.
//! Request failures are retried with a fixed backoff; decode failures and
//! stream end trigger a full reconnect. Cancellation ends the sequence at
//! any suspension point, including mid-backoff and mid-delivery.

use crate::api::{api_url, Notification};
use anyhow::{Context, Result};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

/// Subscribes to a pubsub topic, delivering received notifications one at a
/// time to the provided channel. Stops when the cancellation token fires.
pub struct Subscriber {
    client: reqwest::Client,
    api: String,
    topic: String,
    backoff: Duration,
    tx: mpsc::Sender<Notification>,
    cancel: CancellationToken,
}

impl Subscriber {
    pub fn new(
        client: reqwest::Client,
        api: impl Into<String>,
        topic: impl Into<String>,
        backoff: Duration,
        tx: mpsc::Sender<Notification>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            client,
            api: api.into(),
            topic: topic.into(),
            backoff,
            tx,
            cancel,
        }
    }

    /// Run the reconnect loop until canceled. The live connection, if any,
    /// is dropped on every exit path.
    pub async fn run(self) {
        loop {
            let Some(rsp) = self.connect().await else {
                return;
            };
            match self.pump(rsp).await {
                // Canceled (or the consumer went away); the sequence ends.
                Ok(()) => return,
                Err(e) => {
                    tracing::warn!(reason = %e, "decode stream failed, reconnecting");
                }
            }
        }
    }

    /// Establish the streaming subscribe request, retrying failed attempts
    /// with a fixed backoff. `None` means canceled.
    async fn connect(&self) -> Option<reqwest::Response> {
        loop {
            let attempt = self
                .client
                .post(api_url(&self.api, "pubsub/sub"))
                .query(&[("arg", self.topic.as_str())])
                .send();
            let err = tokio::select! {
                _ = self.cancel.cancelled() => return None,
                rsp = attempt => match rsp.and_then(|r| r.error_for_status()) {
                    Ok(rsp) => return Some(rsp),
                    Err(e) => e,
                },
            };
            tracing::warn!(reason = %err, "subscribe failed, retrying");
            tokio::select! {
                _ = self.cancel.cancelled() => return None,
                _ = sleep(self.backoff) => {}
            }
        }
    }

    /// Decode notifications off the stream until it breaks. `Ok(())` means
    /// the subscription is done for good (cancellation, or the receiving
    /// side was dropped); `Err` means the stream needs a reconnect. A
    /// partial record left in the buffer at disconnect is lost.
    async fn pump(&self, rsp: reqwest::Response) -> Result<()> {
        let mut stream = rsp.bytes_stream();
        let mut buf: Vec<u8> = Vec::new();
        loop {
            let chunk = tokio::select! {
                _ = self.cancel.cancelled() => return Ok(()),
                chunk = stream.next() => chunk,
            };
            let chunk = match chunk {
                Some(Ok(c)) => c,
                Some(Err(e)) => return Err(e).context("read stream"),
                None => anyhow::bail!("stream ended"),
            };
            buf.extend_from_slice(&chunk);
            while let Some(pos) = buf.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = buf.drain(..=pos).collect();
                let line = &line[..line.len() - 1];
                if line.iter().all(|b| b.is_ascii_whitespace()) {
                    continue;
                }
                let next: Notification =
                    serde_json::from_slice(line).context("decode record")?;
                tokio::select! {
                    _ = self.cancel.cancelled() => return Ok(()),
                    sent = self.tx.send(next) => {
                        if sent.is_err() {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
