//! Error types for the Polaris SDK

use thiserror::Error;
use uuid::Uuid;

/// Main error type for Polaris SDK operations
#[derive(Error, Debug)]
pub enum PolarisError {
    // === Transport Errors ===
    /// HTTP-level failure while creating a stream
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Failed to connect to a WebSocket endpoint or the receive loop faulted
    #[error("Connection error on {url}: {message}")]
    Connection { url: String, message: String },

    /// No heartbeat received within the configured timeout
    #[error("Heartbeat timeout on {url}")]
    HeartbeatTimeout { url: String },

    // === Protocol Errors ===
    /// Failed to parse JSON payload
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String, raw: Option<String> },

    // === Authentication Errors ===
    /// Bearer token acquisition failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    // === Subscription Errors ===
    /// Subscription id absent from the registry
    #[error("Subscription does not exist: {id}")]
    SubscriptionNotFound { id: Uuid },

    /// A subscribe loop returned without fault and without cancellation
    #[error("Subscription for {url} completed unexpectedly without cancellation")]
    UnexpectedCompletion { url: String },

    // === Internal Errors ===
    /// Internal channel was closed unexpectedly
    #[error("Internal channel closed unexpectedly")]
    ChannelClosed,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PolarisError {
    /// Returns true if this error is recoverable by reconnecting with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::HeartbeatTimeout { .. }
        )
    }

    /// Returns true if this error requires tearing down and reopening the connection
    pub fn requires_reconnect(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::HeartbeatTimeout { .. } | Self::ChannelClosed
        )
    }

    /// Stable error-code string exposed to callers, if one exists
    pub fn public_code(&self) -> Option<&'static str> {
        match self {
            Self::SubscriptionNotFound { .. } => Some("SubscriptionNotFound"),
            _ => None,
        }
    }

    /// Create a connection error
    pub fn connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Connection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Result type alias for Polaris operations
pub type PolarisResult<T> = Result<T, PolarisError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_retryable() {
        let err = PolarisError::connection("wss://stream.test/abc", "connection reset");
        assert!(err.is_retryable());
        assert!(err.requires_reconnect());

        let err = PolarisError::Auth("bad credentials".into());
        assert!(!err.is_retryable());
        assert!(!err.requires_reconnect());
    }

    #[test]
    fn test_heartbeat_timeout_retryable() {
        let err = PolarisError::HeartbeatTimeout {
            url: "wss://stream.test/abc".into(),
        };
        assert!(err.is_retryable());
        assert!(err.requires_reconnect());
    }

    #[test]
    fn test_public_code() {
        let id = Uuid::new_v4();
        let err = PolarisError::SubscriptionNotFound { id };
        assert_eq!(err.public_code(), Some("SubscriptionNotFound"));
        assert!(err.to_string().contains(&id.to_string()));

        let err = PolarisError::transport("timeout");
        assert_eq!(err.public_code(), None);
    }

    #[test]
    fn test_transport_not_retryable() {
        let err = PolarisError::transport("503 from gateway");
        assert!(!err.is_retryable());
    }
}
