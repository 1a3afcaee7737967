//! Feed service for IPFS publish notifications.
//!
//! Follows a pubsub topic of publish notifications and serves the most
//! recent publishes as an Atom feed:
//!
//! - **[Subscriber]**: long-lived streaming subscribe with fixed-backoff
//!   reconnect; decodes newline-delimited notification records.
//! - **[Resolver]**: per-notification base64 → CID → `files/stat` lookup,
//!   run as a fire-and-forget task.
//! - **[Aggregator]**: single-owner event loop holding the bounded feed
//!   [Window]; mutations and snapshot reads all pass through it, so no
//!   locks are needed and snapshots are never torn.
//! - **[Server]**: HTTP boundary; every request takes one fresh snapshot
//!   and renders it as Atom 1.0.

pub mod aggregator;
pub mod api;
pub mod config;
pub mod feed;
pub mod resolver;
pub mod server;
pub mod subscriber;

pub use aggregator::{Aggregator, FeedHandle, Window};
pub use api::{FileSize, FileStat, Notification};
pub use config::{ReconnectionConfig, ServerConfig};
pub use resolver::{ResolveError, Resolver};
pub use server::Server;
pub use subscriber::Subscriber;
