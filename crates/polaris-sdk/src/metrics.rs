//! Metric seam for operational counters
//!
//! The SDK reports one operational metric out of the box: WebSocket
//! disconnections that were not caused by a requested stop. [`MetricSink`]
//! is the seam consumers record through; the default [`NoopMetricSink`]
//! discards everything, and the `metrics` feature adds a Prometheus-backed
//! sink with its own registry.
//!
//! # Enabling Prometheus
//!
//! Add the `metrics` feature to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! polaris-sdk = { version = "0.1", features = ["metrics"] }
//! ```

/// Metric recorded when a stream consumer fails without being stopped
pub const WEBSOCKET_DISCONNECTIONS: &str = "WebSocketDisconnections";

/// Destination for operational metrics
///
/// Implementations must be cheap and non-blocking; sinks are called from
/// consumer tasks on their failure paths.
pub trait MetricSink: Send + Sync {
    /// Record `value` against the named metric
    fn record(&self, name: &str, value: u64, tags: &[(&str, &str)]);
}

/// Sink that discards every metric
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMetricSink;

impl MetricSink for NoopMetricSink {
    fn record(&self, _name: &str, _value: u64, _tags: &[(&str, &str)]) {}
}

#[cfg(feature = "metrics")]
pub use self::prometheus_sink::PrometheusMetricSink;

#[cfg(feature = "metrics")]
mod prometheus_sink {
    use super::{MetricSink, WEBSOCKET_DISCONNECTIONS};
    use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

    /// Prometheus-backed [`MetricSink`] with an owned registry
    ///
    /// Each sink owns its registry, so independent sinks never collide on
    /// metric registration and tests stay isolated.
    pub struct PrometheusMetricSink {
        registry: Registry,
        disconnections: IntCounterVec,
    }

    impl PrometheusMetricSink {
        pub fn new() -> Result<Self, prometheus::Error> {
            let registry = Registry::new();
            let disconnections = IntCounterVec::new(
                Opts::new(
                    "polaris_websocket_disconnections_total",
                    "WebSocket disconnections not caused by a requested stop",
                ),
                &["topic", "url"],
            )?;
            registry.register(Box::new(disconnections.clone()))?;
            Ok(Self {
                registry,
                disconnections,
            })
        }

        /// The registry backing this sink, for custom exporters
        pub fn registry(&self) -> &Registry {
            &self.registry
        }

        /// Encode all metrics in Prometheus text format
        pub fn encode(&self) -> String {
            let encoder = TextEncoder::new();
            let mut buffer = Vec::new();
            if encoder.encode(&self.registry.gather(), &mut buffer).is_err() {
                return String::new();
            }
            String::from_utf8(buffer).unwrap_or_default()
        }
    }

    impl MetricSink for PrometheusMetricSink {
        fn record(&self, name: &str, value: u64, tags: &[(&str, &str)]) {
            if name != WEBSOCKET_DISCONNECTIONS {
                return;
            }
            let label = |key: &str| {
                tags.iter()
                    .find(|(tag, _)| *tag == key)
                    .map(|(_, value)| *value)
                    .unwrap_or("")
            };
            self.disconnections
                .with_label_values(&[label("topic"), label("url")])
                .inc_by(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_noop_sink_accepts_records() {
        NoopMetricSink.record(WEBSOCKET_DISCONNECTIONS, 1, &[("topic", "abc")]);
        NoopMetricSink.record("SomethingElse", 3, &[]);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_prometheus_sink_counts_disconnections() {
        let sink = PrometheusMetricSink::new().unwrap();
        sink.record(
            WEBSOCKET_DISCONNECTIONS,
            1,
            &[("topic", "abc"), ("url", "wss://stream.test/abc")],
        );
        sink.record(
            WEBSOCKET_DISCONNECTIONS,
            2,
            &[("topic", "abc"), ("url", "wss://stream.test/abc")],
        );
        sink.record("SomethingElse", 9, &[]);

        let output = sink.encode();
        assert!(output.contains("polaris_websocket_disconnections_total"));
        assert!(output.contains("3"));
        assert!(!output.contains("SomethingElse"));
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_prometheus_sinks_are_isolated() {
        let first = PrometheusMetricSink::new().unwrap();
        let second = PrometheusMetricSink::new().unwrap();
        first.record(WEBSOCKET_DISCONNECTIONS, 1, &[("topic", "a"), ("url", "u")]);

        assert!(first.encode().contains("polaris_websocket_disconnections_total"));
        assert!(!second.encode().contains(r#"topic="a""#));
    }
}
