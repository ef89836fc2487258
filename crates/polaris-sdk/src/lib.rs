//! High-level SDK for the Polaris streaming API
//!
//! This crate orchestrates the full lifecycle of real-time market data
//! subscriptions: stream creation, concurrent WebSocket consumption of
//! every endpoint the gateway returns, throughput accounting, optional
//! per-subscription file logging, and clean stop semantics.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use polaris_auth::OAuthTokenProvider;
//! use polaris_sdk::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StreamingConfig::new(
//!         "https://api.example.com",
//!         "https://auth.example.com/token",
//!     );
//!     let provider = Arc::new(OAuthTokenProvider::from_env()?);
//!     let api = Arc::new(StreamingClient::new(config.clone(), provider));
//!
//!     let counter = Arc::new(ThroughputCounter::new());
//!     let service = SubscriptionService::new(
//!         api.clone(),
//!         Arc::new(Level1SubscriptionFactory::new()),
//!         Arc::new(DefaultConsumerFactory::new(
//!             api,
//!             counter.clone(),
//!             Arc::new(NoopMetricSink),
//!             Arc::new(MessageLogSinks::new(config.log_messages_path.clone())),
//!         )),
//!         Arc::new(SubscriptionRegistry::new()),
//!         config.log_messages,
//!     );
//!
//!     let request = Level1SubscriptionRequest::new(StreamRequest::new(
//!         vec![InvestmentSelector::new("performanceId", vec!["0P000003MH".into()])],
//!         vec!["Trade".into(), "TopOfBook".into()],
//!     ))
//!     .with_duration_seconds(60);
//!
//!     let outcome = service.start_level1_subscription(&request).await?;
//!     if let Some(id) = outcome.subscription_id {
//!         tokio::time::sleep(std::time::Duration::from_secs(30)).await;
//!         let stopped = service.stop_subscription(id);
//!         println!("{:?}", stopped.message);
//!     }
//!     service.shutdown().await;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - **Concurrent Groups**: one subscription fans out over every endpoint URL
//! - **Automatic Reconnection**: exponential backoff inside each consumer
//! - **Stop Semantics**: stop is immediate, draining happens in the background
//! - **Throughput Accounting**: global and per-subscription rates once per second
//! - **Pluggable Seams**: factories and metric sinks are trait objects

pub mod consumer;
pub mod counter;
pub mod factory;
pub mod logging;
pub mod metrics;
pub mod prelude;
pub mod registry;
pub mod service;

// Re-export main types
pub use consumer::{ConsumerFactory, DefaultConsumerFactory, StreamConsumer, WebSocketConsumer};
pub use counter::{AtomicCounter, ThroughputCounter};
pub use factory::{Level1SubscriptionFactory, StreamSubscription, StreamSubscriptionFactory};
pub use logging::MessageLogSinks;
pub use metrics::{MetricSink, NoopMetricSink, WEBSOCKET_DISCONNECTIONS};
pub use registry::{SubscriptionGroup, SubscriptionRegistry};
pub use service::SubscriptionService;

#[cfg(feature = "metrics")]
pub use metrics::PrometheusMetricSink;

// Re-export commonly used types from dependencies
pub use polaris_types::{
    Level1SubscriptionRequest, PolarisError, StartSubscriptionOutcome, StopSubscriptionResult,
    StreamingConfig, SubscriptionView,
};
pub use polaris_ws::{StreamingApi, StreamingClient};
