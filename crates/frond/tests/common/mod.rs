//! Common helpers: an in-process mock of the IPFS HTTP API with
//! scriptable subscribe sessions and programmable stat responses.

#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine as _;
use futures_util::stream;
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

// Real CIDs so the resolver's parse step succeeds.
pub const CID_A: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
pub const CID_B: &str = "QmUNLLsPACCz1vLxQVkXqqLX5R1X345qqfHbsf67hvA3Nn";
pub const CID_C: &str = "QmQPeNsJPyVWPFDVHb77w8G42Fvo15z4bG2X8D2GhfbSXc";
pub const CID_D: &str = "QmPZ9gcCEpqKTo6aq61g2nXGUhM4iCL3ewB6LDXZCtioEB";

#[derive(Default)]
struct ApiState {
    // Subscribe sessions are handed out in push order, one per connection.
    sessions: Mutex<VecDeque<mpsc::Receiver<String>>>,
    // Hash -> stat response body; None means respond with a 500.
    stats: Mutex<HashMap<String, Option<serde_json::Value>>>,
    sub_connects: AtomicUsize,
    stat_calls: AtomicUsize,
}

/// A running mock API server.
pub struct MockApi {
    pub url: String,
    state: Arc<ApiState>,
}

impl MockApi {
    pub async fn spawn() -> MockApi {
        let state = Arc::new(ApiState::default());
        let router = Router::new()
            .route("/api/v0/pubsub/sub", post(subscribe))
            .route("/api/v0/files/stat", post(stat))
            .with_state(Arc::clone(&state));
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock api");
        let url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        MockApi { url, state }
    }

    /// Queue one subscribe session. Records sent on the returned sender are
    /// streamed to the connection that claims the session; dropping the
    /// sender disconnects it. Connections past the queued sessions get a
    /// 500, which the subscriber treats as a failed attempt.
    pub fn push_session(&self) -> mpsc::Sender<String> {
        let (tx, rx) = mpsc::channel(16);
        self.state.sessions.lock().unwrap().push_back(rx);
        tx
    }

    pub fn stat_ok(&self, hash: &str, kind: &str, size: u64, cumulative: u64, blocks: u64) {
        self.state.stats.lock().unwrap().insert(
            hash.to_string(),
            Some(json!({
                "Hash": hash,
                "Size": size,
                "CumulativeSize": cumulative,
                "Blocks": blocks,
                "Type": kind,
            })),
        );
    }

    pub fn stat_fail(&self, hash: &str) {
        self.state.stats.lock().unwrap().insert(hash.to_string(), None);
    }

    pub fn sub_connects(&self) -> usize {
        self.state.sub_connects.load(Ordering::SeqCst)
    }

    pub fn stat_calls(&self) -> usize {
        self.state.stat_calls.load(Ordering::SeqCst)
    }
}

/// One newline-terminated notification record carrying `cid` as payload.
pub fn record(cid: &str) -> String {
    record_with_data(&base64::engine::general_purpose::STANDARD.encode(cid))
}

/// A record with a verbatim `data` field (for malformed-payload cases).
pub fn record_with_data(data: &str) -> String {
    format!(
        "{}\n",
        json!({
            "from": "peer",
            "seqno": "AAE=",
            "topicIDs": ["publish"],
            "data": data,
        })
    )
}

async fn subscribe(State(state): State<Arc<ApiState>>) -> Response {
    state.sub_connects.fetch_add(1, Ordering::SeqCst);
    let session = state.sessions.lock().unwrap().pop_front();
    let Some(rx) = session else {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };
    let body = Body::from_stream(stream::unfold(rx, |mut rx| async move {
        let next = rx.recv().await?;
        Some((Ok::<_, Infallible>(Bytes::from(next)), rx))
    }));
    ([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn stat(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.stat_calls.fetch_add(1, Ordering::SeqCst);
    let arg = query.get("arg").cloned().unwrap_or_default();
    let hash = arg.strip_prefix("/ipfs/").unwrap_or(&arg).to_string();
    match state.stats.lock().unwrap().get(&hash) {
        Some(Some(body)) => Json(body.clone()).into_response(),
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}
