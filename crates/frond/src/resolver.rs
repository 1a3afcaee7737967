//! Resolver: turns a pubsub notification into stat metadata for the
//! published content.
//!
//! The notification payload is base64 text wrapping a CID string; the CID is
//! looked up via `files/stat`. Each step failure discards the notification
//! (no retry); a dropped feed entry is acceptable degradation.

use crate::api::{self, FileStat, Notification};
use base64::Engine as _;
use cid::Cid;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("decode payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("payload is not text: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("decode CID: {0}")]
    Cid(#[from] cid::Error),
    #[error("stat request: {0}")]
    Http(#[from] reqwest::Error),
    #[error("canceled")]
    Canceled,
}

impl ResolveError {
    /// Cancellation is success-path termination and is never logged as an
    /// error.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ResolveError::Canceled)
    }
}

/// Resolves notifications against the IPFS HTTP API.
#[derive(Clone)]
pub struct Resolver {
    client: reqwest::Client,
    api: String,
}

impl Resolver {
    pub fn new(client: reqwest::Client, api: impl Into<String>) -> Self {
        Self {
            client,
            api: api.into(),
        }
    }

    /// Decode the notification payload as a CID and stat it.
    pub async fn resolve(
        &self,
        cancel: &CancellationToken,
        notification: &Notification,
    ) -> Result<FileStat, ResolveError> {
        let raw = base64::engine::general_purpose::STANDARD.decode(&notification.data)?;
        let cid = Cid::try_from(std::str::from_utf8(&raw)?)?;
        tracing::info!(%cid, "publish");
        tokio::select! {
            _ = cancel.cancelled() => Err(ResolveError::Canceled),
            stat = api::stat(&self.client, &self.api, &cid) => Ok(stat?),
        }
    }
}
