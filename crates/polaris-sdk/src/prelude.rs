//! Re-exports for convenience
//!
//! Import everything you need with:
//! ```
//! use polaris_sdk::prelude::*;
//! ```

// Orchestration
pub use crate::consumer::{ConsumerFactory, DefaultConsumerFactory, StreamConsumer, WebSocketConsumer};
pub use crate::counter::ThroughputCounter;
pub use crate::factory::{Level1SubscriptionFactory, StreamSubscription, StreamSubscriptionFactory};
pub use crate::logging::MessageLogSinks;
pub use crate::metrics::{MetricSink, NoopMetricSink, WEBSOCKET_DISCONNECTIONS};
pub use crate::registry::{SubscriptionGroup, SubscriptionRegistry};
pub use crate::service::SubscriptionService;

#[cfg(feature = "metrics")]
pub use crate::metrics::PrometheusMetricSink;

// Types from polaris-types
pub use polaris_types::{
    event_types, InvestmentSelector, Level1SubscriptionRequest, PolarisError, PolarisResult,
    StartSubscriptionOutcome, StopSubscriptionResult, StreamRequest, StreamResponse,
    StreamingConfig, SubscriptionRequest, SubscriptionView,
};

// Transport types
pub use polaris_ws::{
    HeartbeatConfig, MessageHandler, RetryPolicy, StreamingApi, StreamingClient,
};
