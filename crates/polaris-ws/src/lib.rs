//! Streaming transport for the Polaris API
//!
//! This crate owns the two network-facing halves of the SDK: the HTTP call
//! that opens a streaming session and the long-lived WebSocket consumption
//! of the endpoint URLs that call returns.
//!
//! # Features
//!
//! - Authenticated stream creation with partial-success awareness
//! - Automatic reconnection with capped exponential backoff
//! - Heartbeat liveness monitoring with active close on silence
//! - Cancellation-aware delivery: every wait observes the cancel signal
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use polaris_auth::OAuthTokenProvider;
//! use polaris_types::{InvestmentSelector, Level1SubscriptionRequest, StreamRequest, StreamingConfig};
//! use polaris_ws::{StreamingApi, StreamingClient};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StreamingConfig::new("https://api.example.com", "https://auth.example.com/token");
//!     let provider = Arc::new(OAuthTokenProvider::from_env()?);
//!     let client = StreamingClient::new(config, provider);
//!
//!     let request = Level1SubscriptionRequest::new(StreamRequest::new(
//!         vec![InvestmentSelector::new("performanceId", vec!["0P000003MH".into()])],
//!         vec!["Trade".into()],
//!     ));
//!
//!     let response = client.create_level1_stream(&request).await?;
//!     let cancel = CancellationToken::new();
//!
//!     // subscribe runs until `cancel` fires
//!     if let Some(url) = response.web_socket_urls().first() {
//!         let handler = Arc::new(|message: String| println!("{message}"));
//!         client.subscribe(url, handler, cancel.clone()).await?;
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod connection;
pub mod http;
pub mod reconnect;
pub mod schema;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

// Re-export main types
pub use api::{MessageHandler, StreamingApi, StreamingClient};
pub use connection::HeartbeatConfig;
pub use reconnect::RetryPolicy;
pub use schema::SchemaCache;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockStreamingApi, SubscribeScript};
