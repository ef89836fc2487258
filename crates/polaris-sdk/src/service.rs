//! Subscription orchestration
//!
//! [`SubscriptionService`] is the SDK entry point: it creates streams,
//! registers groups, fans consumer tasks out over the endpoint URLs, and
//! supervises their shutdown. A group is registered before any of its
//! tasks spawn, so a stop request can never observe a running group that
//! the registry does not know about.

use std::sync::Arc;

use chrono::Utc;
use polaris_types::{
    Level1SubscriptionRequest, PolarisError, PolarisResult, StartSubscriptionOutcome,
    StopSubscriptionResult, SubscriptionRequest, SubscriptionView,
};
use polaris_ws::StreamingApi;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::consumer::ConsumerFactory;
use crate::factory::StreamSubscriptionFactory;
use crate::registry::{SubscriptionGroup, SubscriptionRegistry};

/// Orchestrates the full lifecycle of streaming subscriptions
pub struct SubscriptionService {
    api: Arc<dyn StreamingApi>,
    factory: Arc<dyn StreamSubscriptionFactory>,
    consumers: Arc<dyn ConsumerFactory>,
    registry: Arc<SubscriptionRegistry>,
    log_messages: bool,
    supervisors: tokio::sync::Mutex<JoinSet<()>>,
}

impl SubscriptionService {
    pub fn new(
        api: Arc<dyn StreamingApi>,
        factory: Arc<dyn StreamSubscriptionFactory>,
        consumers: Arc<dyn ConsumerFactory>,
        registry: Arc<SubscriptionRegistry>,
        log_messages: bool,
    ) -> Self {
        Self {
            api,
            factory,
            consumers,
            registry,
            log_messages,
            supervisors: tokio::sync::Mutex::new(JoinSet::new()),
        }
    }

    /// Create a level-1 stream and start consuming its endpoints
    ///
    /// A rejected request comes back as an `Ok` outcome without a
    /// subscription id; `Err` means the request itself failed. On success
    /// the returned id is live immediately: it is registered before this
    /// method returns, and consumers run in the background.
    #[instrument(skip(self, request))]
    pub async fn start_level1_subscription(
        &self,
        request: &Level1SubscriptionRequest,
    ) -> PolarisResult<StartSubscriptionOutcome> {
        let response = self.api.create_level1_stream(request).await?;

        if !response.is_accepted() {
            warn!(
                status = response.status_code,
                error_code = ?response.error_code,
                "Stream request rejected"
            );
            return Ok(StartSubscriptionOutcome::rejected(response));
        }
        if response.is_partial() {
            warn!("Stream established with partial success, some investments were rejected");
        }

        let subscription = self.factory.create(&response, request.duration_seconds());
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        let expires_at = request
            .duration_seconds()
            .map(|seconds| started_at + chrono::Duration::seconds(seconds as i64));

        let group = SubscriptionGroup {
            id,
            web_socket_urls: subscription.web_socket_urls.clone(),
            started_at,
            expires_at,
            cancel: subscription.cancel.clone(),
        };
        if !self.registry.try_add(group) {
            subscription.cancel.cancel();
            return Err(PolarisError::Configuration(format!(
                "subscription id collision for {id}"
            )));
        }

        info!(
            "Starting subscription {} with {} endpoint(s)",
            id,
            subscription.web_socket_urls.len()
        );
        self.spawn_consumers(id, &subscription.web_socket_urls, subscription.cancel)
            .await;

        Ok(StartSubscriptionOutcome::accepted(
            id, started_at, expires_at, response,
        ))
    }

    async fn spawn_consumers(&self, id: Uuid, urls: &[String], cancel: CancellationToken) {
        let mut tasks = JoinSet::new();
        for url in urls {
            let consumer = self.consumers.create(url, self.log_messages);
            let cancel = cancel.clone();
            tasks.spawn(async move {
                // Faults are logged and measured inside the consumer
                let _ = consumer.run(cancel).await;
            });
        }

        let registry = Arc::clone(&self.registry);
        let mut supervisors = self.supervisors.lock().await;
        // Reap supervisors of groups that already finished
        while supervisors.try_join_next().is_some() {}
        supervisors.spawn(async move {
            while let Some(joined) = tasks.join_next().await {
                if let Err(join_error) = joined {
                    error!("Consumer task for subscription {} panicked: {}", id, join_error);
                }
            }
            if registry.remove(id) {
                info!("Subscription {} removed after all consumers finished", id);
            }
        });
    }

    /// Stop a running subscription
    ///
    /// The cancellation signal fires and the registry entry is removed
    /// before this returns, so the id is immediately unknown to callers
    /// while consumer tasks finish draining in the background. Stopping an
    /// unknown id reports failure in the result rather than an error.
    #[instrument(skip(self))]
    pub fn stop_subscription(&self, id: Uuid) -> StopSubscriptionResult {
        match self.registry.get(id) {
            Ok(group) => {
                group.cancel.cancel();
                self.registry.remove(id);
                info!("Subscription {} stopped", id);
                StopSubscriptionResult::stopped(id)
            }
            Err(_) => {
                warn!("Stop requested for unknown subscription {}", id);
                StopSubscriptionResult::not_found(id)
            }
        }
    }

    /// Views of all currently running subscriptions
    pub fn active_subscriptions(&self) -> Vec<SubscriptionView> {
        self.registry.views()
    }

    /// Number of currently running subscriptions
    pub fn active_count(&self) -> usize {
        self.registry.len()
    }

    /// Cancel every subscription and wait for all consumers to finish
    pub async fn shutdown(&self) {
        for group in self.registry.get_all() {
            group.cancel.cancel();
        }
        let mut supervisors = self.supervisors.lock().await;
        while supervisors.join_next().await.is_some() {}
        info!("All subscriptions shut down");
    }
}
