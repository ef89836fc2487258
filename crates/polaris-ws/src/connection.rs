//! WebSocket session loop with heartbeat supervision
//!
//! A session owns one WebSocket connection: it forwards data frames to the
//! caller's handler, acknowledges heartbeat frames back to the server, and
//! tears the connection down when the server goes quiet for too long. The
//! retry loop around sessions lives in [`crate::api`].

use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use polaris_types::{contains_heartbeat_marker, MessageEnvelope, PolarisError, PolarisResult};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::{HeaderValue, AUTHORIZATION};
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::api::MessageHandler;

/// Time allowed for the WebSocket handshake to complete
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Heartbeat supervision settings for a streaming session
///
/// The server emits a heartbeat frame periodically. If none arrives within
/// `timeout`, the session is considered dead and is closed so the retry
/// loop can establish a fresh connection.
#[derive(Debug, Clone)]
pub struct HeartbeatConfig {
    /// Maximum silence between heartbeat frames before the session is closed
    pub timeout: Duration,
    /// How often the elapsed-since-last-heartbeat check runs
    pub check_interval: Duration,
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            check_interval: Duration::from_secs(5),
        }
    }
}

impl HeartbeatConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heartbeat timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the check interval
    pub fn with_check_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }
}

/// Why a session ended without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SessionEnd {
    /// The caller's cancellation token fired
    Cancelled,
    /// The server closed the connection or the stream ran dry
    ServerClosed,
}

/// Run one WebSocket session until cancellation, server close, or failure
///
/// Heartbeat frames are consumed here: each one refreshes the liveness
/// deadline and is answered with an acknowledgement frame. They are never
/// forwarded to `on_message`.
pub(crate) async fn run_session(
    url: &str,
    auth_header: &str,
    heartbeat: &HeartbeatConfig,
    on_message: &MessageHandler,
    cancel: &CancellationToken,
) -> PolarisResult<SessionEnd> {
    let mut request = url
        .into_client_request()
        .map_err(|e| PolarisError::connection(url, e.to_string()))?;
    let auth_value = HeaderValue::from_str(auth_header)
        .map_err(|_| PolarisError::Configuration("bearer token is not a valid header value".into()))?;
    request.headers_mut().insert(AUTHORIZATION, auth_value);

    let (ws_stream, _response) = tokio::select! {
        _ = cancel.cancelled() => return Ok(SessionEnd::Cancelled),
        result = tokio::time::timeout(CONNECT_TIMEOUT, connect_async(request)) => match result {
            Ok(Ok(pair)) => pair,
            Ok(Err(e)) => return Err(PolarisError::connection(url, e.to_string())),
            Err(_) => {
                return Err(PolarisError::connection(
                    url,
                    format!("handshake timed out after {CONNECT_TIMEOUT:?}"),
                ))
            }
        },
    };

    info!("Connected to {}", url);

    let (mut write, mut read) = ws_stream.split();
    let mut last_heartbeat = Instant::now();
    let mut check = tokio::time::interval(heartbeat.check_interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!("Cancellation requested, closing connection to {}", url);
                let _ = write.send(Message::Close(None)).await;
                return Ok(SessionEnd::Cancelled);
            }
            _ = check.tick() => {
                if last_heartbeat.elapsed() > heartbeat.timeout {
                    warn!(
                        "No heartbeat within {:?} on {}, closing connection",
                        heartbeat.timeout, url
                    );
                    let _ = write.send(Message::Close(None)).await;
                    return Err(PolarisError::HeartbeatTimeout { url: url.to_string() });
                }
            }
            frame = read.next() => {
                let text = match frame {
                    Some(Ok(Message::Text(text))) => text,
                    Some(Ok(Message::Binary(data))) => String::from_utf8_lossy(&data).into_owned(),
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = write.send(Message::Pong(payload)).await;
                        continue;
                    }
                    Some(Ok(Message::Pong(_))) | Some(Ok(Message::Frame(_))) => continue,
                    Some(Ok(Message::Close(_))) => {
                        info!("Server closed connection to {}", url);
                        return Ok(SessionEnd::ServerClosed);
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error on {}: {}", url, e);
                        return Err(PolarisError::connection(url, e.to_string()));
                    }
                    None => {
                        info!("WebSocket stream ended for {}", url);
                        return Ok(SessionEnd::ServerClosed);
                    }
                };

                if contains_heartbeat_marker(&text) {
                    last_heartbeat = Instant::now();
                    let ack = serde_json::to_string(&MessageEnvelope::heartbeat_ack())
                        .map_err(|e| PolarisError::InvalidJson { message: e.to_string(), raw: None })?;
                    write
                        .send(Message::Text(ack))
                        .await
                        .map_err(|e| PolarisError::connection(url, e.to_string()))?;
                    debug!("Heartbeat acknowledged on {}", url);
                } else {
                    on_message(text);
                }
            }
        }
    }
}
