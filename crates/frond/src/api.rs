//! IPFS HTTP API surface: the pubsub notification shape, file stat lookup,
//! and human-readable file sizes.

use cid::Cid;
use serde::Deserialize;
use std::fmt;

/// Base URL for an `/api/v0/` endpoint. Arguments go in the query string via
/// the request builder.
pub(crate) fn api_url(api: &str, endpoint: &str) -> String {
    format!("{}/api/v0/{}", api.trim_end_matches('/'), endpoint)
}

/// One message delivered by the pubsub subscribe endpoint.
///
/// `data` is the published payload, base64-encoded by the transport.
/// `seqno` is per-peer and not monotonic across reconnects.
#[derive(Debug, Clone, Deserialize)]
pub struct Notification {
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub seqno: String,
    #[serde(rename = "topicIDs", default)]
    pub topic_ids: Vec<String>,
    #[serde(default)]
    pub data: String,
}

/// A file size in bytes, displayed in groups of 1000 with B/KB/MB/GB
/// suffixes (e.g. `1MB 234KB 567B`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct FileSize(pub u64);

const SIZE_SUFFIXES: [&str; 4] = ["B", "KB", "MB", "GB"];

impl fmt::Display for FileSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return f.write_str("0B");
        }
        let mut rem = self.0;
        let mut parts = Vec::new();
        for (i, suffix) in SIZE_SUFFIXES.iter().enumerate() {
            if rem == 0 {
                break;
            }
            // The top group keeps whatever is left (sizes beyond GB are not
            // split further).
            let group = if i == SIZE_SUFFIXES.len() - 1 {
                rem
            } else {
                rem % 1000
            };
            parts.push(format!("{group}{suffix}"));
            rem /= 1000;
        }
        parts.reverse();
        f.write_str(&parts.join(" "))
    }
}

/// Metadata for a piece of stored content, as returned by `files/stat`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct FileStat {
    pub hash: String,
    pub size: FileSize,
    pub cumulative_size: FileSize,
    pub blocks: u64,
    #[serde(rename = "Type")]
    pub kind: String,
}

/// Look up metadata for `cid` via `files/stat`.
pub async fn stat(
    client: &reqwest::Client,
    api: &str,
    cid: &Cid,
) -> Result<FileStat, reqwest::Error> {
    client
        .post(api_url(api, "files/stat"))
        .query(&[("arg", format!("/ipfs/{cid}"))])
        .send()
        .await?
        .error_for_status()?
        .json()
        .await
}
