//! Feed server configuration.

/// Feed server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address for the HTTP feed server to listen on.
    pub listen_addr: String,
    /// Base URL of the IPFS HTTP API.
    pub api_url: String,
    /// Pubsub topic to listen for new publishes on.
    pub topic: String,
    /// Maximum number of publishes to keep in the feed window.
    pub feed_size: usize,
    /// Reconnection behavior for the subscribe stream.
    pub reconnection: ReconnectionConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            api_url: "http://localhost:5001".into(),
            topic: "publish".into(),
            feed_size: 10,
            reconnection: ReconnectionConfig::default(),
        }
    }
}

/// Reconnection backoff for the subscribe stream. The delay is fixed and
/// attempts are unbounded; only cancellation stops the retry loop.
#[derive(Debug, Clone)]
pub struct ReconnectionConfig {
    pub backoff_secs: u64,
}

impl Default for ReconnectionConfig {
    fn default() -> Self {
        Self { backoff_secs: 10 }
    }
}
