//! Stream consumers
//!
//! A consumer owns one endpoint URL for the lifetime of its subscription.
//! Frame receipt and frame processing are decoupled through an internal
//! queue: the transport-side handler only enqueues and counts, while a
//! drain task does the per-message work (currently file logging). Failure
//! without cancellation is the disconnection signal and records the
//! disconnection metric exactly once.

use std::sync::Arc;

use async_trait::async_trait;
use polaris_types::PolarisResult;
use polaris_ws::{MessageHandler, StreamingApi};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::counter::ThroughputCounter;
use crate::logging::MessageLogSinks;
use crate::metrics::{MetricSink, WEBSOCKET_DISCONNECTIONS};

/// Extract the stream topic id from an endpoint URL
///
/// Endpoint URLs end with the stream's topic id. Unparseable URLs map to
/// the nil UUID so accounting still works for them.
pub(crate) fn parse_topic_id(url: &str) -> Uuid {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| Uuid::parse_str(segment).ok())
        .unwrap_or_else(Uuid::nil)
}

/// Creates consumers for the endpoints of a new subscription
pub trait ConsumerFactory: Send + Sync {
    fn create(&self, url: &str, log_to_file: bool) -> Box<dyn StreamConsumer>;
}

/// A runnable consumer bound to one endpoint URL
#[async_trait]
pub trait StreamConsumer: Send {
    /// Consume the endpoint until cancellation
    ///
    /// Returns `Ok(())` when the stream ended through cancellation or a
    /// clean completion, and the transport error otherwise. Cleanup runs
    /// on every path.
    async fn run(self: Box<Self>, cancel: CancellationToken) -> PolarisResult<()>;
}

/// Default consumer backed by a [`StreamingApi`] subscription
pub struct WebSocketConsumer {
    api: Arc<dyn StreamingApi>,
    counter: Arc<ThroughputCounter>,
    metrics: Arc<dyn MetricSink>,
    logs: Arc<MessageLogSinks>,
    url: String,
    topic: Uuid,
    log_to_file: bool,
}

impl WebSocketConsumer {
    pub fn new(
        api: Arc<dyn StreamingApi>,
        counter: Arc<ThroughputCounter>,
        metrics: Arc<dyn MetricSink>,
        logs: Arc<MessageLogSinks>,
        url: impl Into<String>,
        log_to_file: bool,
    ) -> Self {
        let url = url.into();
        let topic = parse_topic_id(&url);
        Self {
            api,
            counter,
            metrics,
            logs,
            url,
            topic,
            log_to_file,
        }
    }

    pub fn topic(&self) -> Uuid {
        self.topic
    }
}

#[async_trait]
impl StreamConsumer for WebSocketConsumer {
    async fn run(self: Box<Self>, cancel: CancellationToken) -> PolarisResult<()> {
        self.counter.register(self.topic);

        let (queue_tx, mut queue_rx) = mpsc::unbounded_channel::<String>();

        let drain = tokio::spawn({
            let cancel = cancel.clone();
            let logs = Arc::clone(&self.logs);
            let topic = self.topic;
            let log_to_file = self.log_to_file;
            async move {
                loop {
                    tokio::select! {
                        _ = cancel.cancelled() => {
                            warn!("Message drain for {} cancelled", topic);
                            break;
                        }
                        message = queue_rx.recv() => match message {
                            Some(message) => {
                                if log_to_file {
                                    logs.write(topic, &message);
                                }
                            }
                            None => break,
                        }
                    }
                }
            }
        });

        // The handler carries the only queue sender; subscribe drops it on
        // return, which closes the queue and lets the drain finish.
        let handler: MessageHandler = {
            let counter = Arc::clone(&self.counter);
            let topic = self.topic;
            Arc::new(move |message: String| {
                if queue_tx.send(message).is_err() {
                    error!("Failed to enqueue message for {}", topic);
                }
                counter.increment(topic);
            })
        };

        let result = self.api.subscribe(&self.url, handler, cancel.clone()).await;

        let outcome = match result {
            Ok(()) if cancel.is_cancelled() => {
                info!("Consumer for {} stopped after cancellation", self.url);
                Ok(())
            }
            Ok(()) => {
                warn!("Consumer for {} completed without cancellation", self.url);
                Ok(())
            }
            Err(e) if cancel.is_cancelled() => {
                info!("Consumer for {} failed during shutdown: {}", self.url, e);
                Ok(())
            }
            Err(e) => {
                error!("Consumer for {} disconnected: {}", self.url, e);
                let topic_label = self.topic.to_string();
                self.metrics.record(
                    WEBSOCKET_DISCONNECTIONS,
                    1,
                    &[("topic", &topic_label), ("url", &self.url)],
                );
                Err(e)
            }
        };

        let _ = drain.await;
        self.counter.unregister(self.topic);
        if self.log_to_file {
            self.logs.close(self.topic);
        }

        outcome
    }
}

/// Factory wiring [`WebSocketConsumer`]s to shared SDK services
pub struct DefaultConsumerFactory {
    api: Arc<dyn StreamingApi>,
    counter: Arc<ThroughputCounter>,
    metrics: Arc<dyn MetricSink>,
    logs: Arc<MessageLogSinks>,
}

impl DefaultConsumerFactory {
    pub fn new(
        api: Arc<dyn StreamingApi>,
        counter: Arc<ThroughputCounter>,
        metrics: Arc<dyn MetricSink>,
        logs: Arc<MessageLogSinks>,
    ) -> Self {
        Self {
            api,
            counter,
            metrics,
            logs,
        }
    }
}

impl ConsumerFactory for DefaultConsumerFactory {
    fn create(&self, url: &str, log_to_file: bool) -> Box<dyn StreamConsumer> {
        Box::new(WebSocketConsumer::new(
            Arc::clone(&self.api),
            Arc::clone(&self.counter),
            Arc::clone(&self.metrics),
            Arc::clone(&self.logs),
            url,
            log_to_file,
        ))
    }
}
