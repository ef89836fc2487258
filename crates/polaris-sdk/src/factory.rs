//! Subscription construction strategy
//!
//! A factory turns an accepted stream response into the pieces a running
//! subscription needs: the endpoint URLs to consume and a cancellation
//! token wired to the requested session duration. The strategy seam keeps
//! alternative stream flavors pluggable without touching the service.

use std::time::Duration;

use polaris_types::StreamResponse;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Endpoints plus the shared cancel handle for one new subscription
#[derive(Debug, Clone)]
pub struct StreamSubscription {
    pub web_socket_urls: Vec<String>,
    pub cancel: CancellationToken,
}

/// Strategy for turning an accepted response into a subscription
pub trait StreamSubscriptionFactory: Send + Sync {
    /// Must be called from within a Tokio runtime
    fn create(
        &self,
        response: &StreamResponse,
        duration_seconds: Option<u64>,
    ) -> StreamSubscription;
}

/// Factory for level-1 streams
///
/// When the caller requested a bounded session, a timer task cancels the
/// group once the duration elapses. This mirrors the server-side expiry,
/// so consumers shut down instead of reconnecting to a dead session.
#[derive(Debug, Default, Clone, Copy)]
pub struct Level1SubscriptionFactory;

impl Level1SubscriptionFactory {
    pub fn new() -> Self {
        Self
    }
}

impl StreamSubscriptionFactory for Level1SubscriptionFactory {
    fn create(
        &self,
        response: &StreamResponse,
        duration_seconds: Option<u64>,
    ) -> StreamSubscription {
        let cancel = CancellationToken::new();

        if let Some(seconds) = duration_seconds {
            let timer = cancel.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = timer.cancelled() => {}
                    _ = tokio::time::sleep(Duration::from_secs(seconds)) => {
                        info!("Session duration of {}s elapsed, stopping subscription", seconds);
                        timer.cancel();
                    }
                }
            });
        }

        StreamSubscription {
            web_socket_urls: response.web_socket_urls(),
            cancel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polaris_types::StreamEndpoints;

    fn accepted_response() -> StreamResponse {
        StreamResponse {
            status_code: 200,
            subscriptions: Some(StreamEndpoints {
                realtime: Some(vec!["wss://stream.test/a1".into()]),
                delayed: Some(vec!["wss://stream.test/d1".into()]),
            }),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_extracts_endpoint_urls() {
        let subscription = Level1SubscriptionFactory::new().create(&accepted_response(), None);
        assert_eq!(
            subscription.web_socket_urls,
            vec![
                "wss://stream.test/a1".to_string(),
                "wss://stream.test/d1".to_string(),
            ]
        );
        assert!(!subscription.cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_without_duration_never_auto_cancels() {
        let subscription = Level1SubscriptionFactory::new().create(&accepted_response(), None);
        tokio::time::sleep(Duration::from_secs(3600)).await;
        assert!(!subscription.cancel.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_elapses_into_cancellation() {
        let subscription = Level1SubscriptionFactory::new().create(&accepted_response(), Some(60));

        tokio::task::yield_now().await;
        assert!(!subscription.cancel.is_cancelled());

        tokio::time::sleep(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;
        assert!(subscription.cancel.is_cancelled());
    }

    #[tokio::test]
    async fn test_manual_cancel_beats_the_timer() {
        let subscription = Level1SubscriptionFactory::new().create(&accepted_response(), Some(3600));
        subscription.cancel.cancel();
        assert!(subscription.cancel.is_cancelled());
    }
}
