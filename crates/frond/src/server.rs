//! HTTP boundary: wires the subscriber, aggregator, and feed rendering
//! together and serves the feed.

use crate::aggregator::Aggregator;
use crate::aggregator::FeedHandle;
use crate::config::ServerConfig;
use crate::feed;
use crate::resolver::Resolver;
use crate::subscriber::Subscriber;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::future::IntoFuture as _;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

/// How long in-flight requests get to finish after cancellation before the
/// process stops serving them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(60);

/// Listens to the stream of incoming publishes and serves the feed.
pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    /// Bind the configured listen address and serve until canceled. A bind
    /// failure is the one fatal error; everything upstream of the feed
    /// endpoint recovers by logging and dropping the failed unit of work.
    pub async fn serve(self, cancel: CancellationToken) -> Result<()> {
        let listener = TcpListener::bind(&self.config.listen_addr)
            .await
            .with_context(|| format!("bind {}", self.config.listen_addr))?;
        self.serve_on(listener, cancel).await
    }

    /// Serve on an already-bound listener.
    pub async fn serve_on(self, listener: TcpListener, cancel: CancellationToken) -> Result<()> {
        let client = reqwest::Client::builder()
            .no_proxy()
            .build()
            .context("build HTTP client")?;
        let (notification_tx, notification_rx) = mpsc::channel(16);
        let subscriber = Subscriber::new(
            client.clone(),
            &self.config.api_url,
            &self.config.topic,
            Duration::from_secs(self.config.reconnection.backoff_secs),
            notification_tx,
            cancel.clone(),
        );
        tokio::spawn(subscriber.run());

        let resolver = Resolver::new(client, &self.config.api_url);
        let (aggregator, handle) =
            Aggregator::new(resolver, notification_rx, self.config.feed_size, cancel.clone());
        tokio::spawn(aggregator.run());

        if let Ok(addr) = listener.local_addr() {
            tracing::info!(%addr, topic = %self.config.topic, "serving feed");
        }
        // Any method and path serve the feed; no query parameters are
        // interpreted.
        let router = Router::new().fallback(serve_feed).with_state(handle);
        let shutdown = cancel.clone();
        let serving = axum::serve(listener, router)
            .with_graceful_shutdown(async move { shutdown.cancelled().await });
        let mut serving = std::pin::pin!(serving.into_future());
        tokio::select! {
            res = &mut serving => res.context("serve HTTP")?,
            () = async { cancel.cancelled().await; sleep(SHUTDOWN_GRACE).await } => {
                tracing::warn!("shutdown grace period elapsed, dropping in-flight requests");
            }
        }
        Ok(())
    }
}

/// One snapshot round-trip per request, no caching between requests.
async fn serve_feed(State(handle): State<FeedHandle>, method: Method, uri: Uri) -> Response {
    tracing::info!(%method, %uri, "feed request");
    match handle.snapshot().await {
        Some(window) => (
            [(header::CONTENT_TYPE, "application/atom+xml")],
            feed::render(&window),
        )
            .into_response(),
        // The aggregator is gone, which only happens during shutdown.
        None => StatusCode::SERVICE_UNAVAILABLE.into_response(),
    }
}
