//! Streaming API client
//!
//! [`StreamingClient`] is the concrete client for the Polaris streaming
//! gateway. The [`StreamingApi`] trait is the seam the orchestration layer
//! depends on, so tests can substitute a scripted mock for the real client.

use std::sync::Arc;

use async_trait::async_trait;
use polaris_auth::TokenProvider;
use polaris_types::{Level1SubscriptionRequest, PolarisError, PolarisResult, StreamResponse, StreamingConfig};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Method;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, warn};

use crate::connection::{self, HeartbeatConfig, SessionEnd};
use crate::http;
use crate::reconnect::RetryPolicy;
use crate::schema::SchemaCache;

/// Callback invoked with each data frame received from a stream
///
/// Heartbeat frames are handled inside the session and never reach this
/// callback. Handlers must be cheap; blocking here stalls frame processing
/// for the connection.
pub type MessageHandler = Arc<dyn Fn(String) + Send + Sync>;

/// Operations the streaming gateway exposes
#[async_trait]
pub trait StreamingApi: Send + Sync {
    /// Request a level-1 market data stream
    ///
    /// Rejections the gateway reports in the response body come back as
    /// `Ok` with a non-accepted status; `Err` means the request itself
    /// could not be completed.
    async fn create_level1_stream(
        &self,
        request: &Level1SubscriptionRequest,
    ) -> PolarisResult<StreamResponse>;

    /// Consume a stream endpoint until cancellation
    ///
    /// Reconnects with backoff on connection loss and returns `Ok(())` once
    /// `cancel` fires. An `Err` means the stream failed in a way the
    /// implementation does not recover from.
    /// Implementations must not retain `on_message` after returning.
    async fn subscribe(
        &self,
        url: &str,
        on_message: MessageHandler,
        cancel: CancellationToken,
    ) -> PolarisResult<()>;
}

/// HTTP + WebSocket client for the Polaris streaming gateway
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use polaris_auth::OAuthTokenProvider;
/// use polaris_types::StreamingConfig;
/// use polaris_ws::StreamingClient;
///
/// let config = StreamingConfig::new(
///     "https://api.example.com/",
///     "https://auth.example.com/token",
/// );
/// let provider = Arc::new(OAuthTokenProvider::new(
///     "https://auth.example.com/token",
///     "client-id",
///     "client-secret",
/// ));
/// let client = StreamingClient::new(config, provider);
/// # let _ = client;
/// ```
pub struct StreamingClient {
    http: reqwest::Client,
    config: StreamingConfig,
    token_provider: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
    heartbeat: HeartbeatConfig,
    schema: SchemaCache,
}

impl StreamingClient {
    /// Create a client with default retry and heartbeat settings
    pub fn new(config: StreamingConfig, token_provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            http: http::default_client(),
            config,
            token_provider,
            retry: RetryPolicy::default(),
            heartbeat: HeartbeatConfig::default(),
            schema: SchemaCache::new(),
        }
    }

    /// Override the reconnect policy
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Override the heartbeat supervision settings
    pub fn with_heartbeat_config(mut self, heartbeat: HeartbeatConfig) -> Self {
        self.heartbeat = heartbeat;
        self
    }

    /// Schema cache populated from stream-creation responses
    pub fn schema_cache(&self) -> &SchemaCache {
        &self.schema
    }

    /// Message schema of the most recently established stream, if any
    pub fn message_schema(&self) -> Option<&str> {
        self.schema.get()
    }

    async fn run_attempt(
        &self,
        url: &str,
        on_message: &MessageHandler,
        cancel: &CancellationToken,
    ) -> PolarisResult<SessionEnd> {
        let token = self
            .token_provider
            .bearer_token()
            .await
            .map_err(|e| PolarisError::Auth(e.to_string()))?;
        connection::run_session(url, &token, &self.heartbeat, on_message, cancel).await
    }
}

#[async_trait]
impl StreamingApi for StreamingClient {
    #[instrument(skip(self, request))]
    async fn create_level1_stream(
        &self,
        request: &Level1SubscriptionRequest,
    ) -> PolarisResult<StreamResponse> {
        let token = self
            .token_provider
            .bearer_token()
            .await
            .map_err(|e| PolarisError::Auth(e.to_string()))?;

        let mut headers = HeaderMap::new();
        let auth_value = HeaderValue::from_str(&token).map_err(|_| {
            PolarisError::Configuration("bearer token is not a valid header value".into())
        })?;
        headers.insert(AUTHORIZATION, auth_value);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let url = self.config.level1_endpoint();
        let (status, mut response): (_, StreamResponse) =
            http::send_json(&self.http, Method::POST, &url, headers, Some(request))
                .await
                .map_err(|e| {
                    error!("Unexpected error when requesting a level-1 stream: {}", e);
                    e
                })?;

        // Older gateway versions omit statusCode from the body
        if response.status_code == 0 {
            response.status_code = status.as_u16();
        }
        if let Some(schema) = &response.schema {
            self.schema.store(schema.clone());
        }

        debug!(status = response.status_code, "Level-1 stream response received");
        Ok(response)
    }

    #[instrument(skip(self, on_message, cancel))]
    async fn subscribe(
        &self,
        url: &str,
        on_message: MessageHandler,
        cancel: CancellationToken,
    ) -> PolarisResult<()> {
        let mut attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Ok(());
            }

            match self.run_attempt(url, &on_message, &cancel).await {
                Ok(SessionEnd::Cancelled) => return Ok(()),
                Ok(SessionEnd::ServerClosed) => {}
                Err(e) if cancel.is_cancelled() => {
                    debug!("Session on {} ended during cancellation: {}", url, e);
                    return Ok(());
                }
                Err(e) => warn!("Session on {} failed: {}", url, e),
            }

            attempt += 1;
            let delay = self.retry.delay_for_attempt(attempt);
            warn!("Reconnecting to {} in {:?} (attempt {})", url, delay, attempt);

            tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
