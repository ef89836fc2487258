//! Request and response models for the Polaris streaming API
//!
//! All wire models use camelCase field names. Responses tolerate missing
//! fields so older gateway versions keep deserializing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request Types
// ============================================================================

/// Typed view over any stream-creation request shape
///
/// The orchestrator only needs the requested session duration; exposing it
/// through a trait keeps alternative request types pluggable without any
/// runtime type inspection.
pub trait SubscriptionRequest {
    /// Requested session duration in seconds, if the caller asked for one
    fn duration_seconds(&self) -> Option<u64>;
}

/// A set of instrument identifiers sharing one identifier scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentSelector {
    /// Identifier scheme (e.g. "performanceId")
    pub id_type: String,
    /// Instrument identifiers to stream
    pub ids: Vec<String>,
}

impl InvestmentSelector {
    /// Create a new selector
    pub fn new(id_type: impl Into<String>, ids: Vec<String>) -> Self {
        Self {
            id_type: id_type.into(),
            ids,
        }
    }
}

/// Stream contents: which instruments and which event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamRequest {
    /// Instruments to stream
    pub investments: Vec<InvestmentSelector>,
    /// Event types to deliver (see [`crate::event_types`])
    pub event_types: Vec<String>,
}

impl StreamRequest {
    /// Create a new stream request
    pub fn new(investments: Vec<InvestmentSelector>, event_types: Vec<String>) -> Self {
        Self {
            investments,
            event_types,
        }
    }
}

/// Request body for level-1 stream creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level1SubscriptionRequest {
    /// Session duration in seconds; absent means the session runs until
    /// explicitly stopped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u64>,
    /// Stream contents
    pub stream: StreamRequest,
}

impl Level1SubscriptionRequest {
    /// Create a request without a duration limit
    pub fn new(stream: StreamRequest) -> Self {
        Self {
            duration_seconds: None,
            stream,
        }
    }

    /// Limit the session to the given number of seconds
    pub fn with_duration_seconds(mut self, seconds: u64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }
}

impl SubscriptionRequest for Level1SubscriptionRequest {
    fn duration_seconds(&self) -> Option<u64> {
        self.duration_seconds
    }
}

// ============================================================================
// Response Types
// ============================================================================

/// WebSocket endpoint URLs returned by stream creation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamEndpoints {
    /// Realtime feed URLs
    pub realtime: Option<Vec<String>>,
    /// Delayed feed URLs
    pub delayed: Option<Vec<String>>,
}

impl StreamEndpoints {
    /// All URLs to consume, realtime first then delayed
    pub fn all(&self) -> Vec<String> {
        let mut urls = Vec::new();
        if let Some(realtime) = &self.realtime {
            urls.extend(realtime.iter().cloned());
        }
        if let Some(delayed) = &self.delayed {
            urls.extend(delayed.iter().cloned());
        }
        urls
    }
}

/// Per-investment acceptance status inside response metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InvestmentStatus {
    pub id: String,
    pub id_type: String,
    pub status: Option<String>,
    pub error_code: Option<String>,
}

/// One metadata message grouping investment statuses
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MetaDataMessage {
    pub investments: Vec<InvestmentStatus>,
    #[serde(rename = "type")]
    pub message_type: Option<String>,
}

/// Response metadata: request id, server time, and per-investment outcomes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamMetaData {
    pub request_id: Option<String>,
    pub time: Option<DateTime<Utc>>,
    pub messages: Option<Vec<MetaDataMessage>>,
}

/// Result of a stream-creation call
///
/// The vendor embeds an HTTP-like status code in the body; 200 means every
/// requested investment was accepted, 206 means some were rejected but a
/// usable stream was still established.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StreamResponse {
    /// HTTP-like status code (200 success, 206 partial success)
    pub status_code: u16,
    /// Machine-readable error code on rejection
    pub error_code: Option<String>,
    /// Human-readable message; shape varies by gateway version
    pub message: Option<serde_json::Value>,
    /// Message schema for the established stream
    pub schema: Option<String>,
    /// WebSocket endpoints to consume
    pub subscriptions: Option<StreamEndpoints>,
    /// Request metadata and per-investment statuses
    pub meta_data: Option<StreamMetaData>,
}

impl StreamResponse {
    /// Every requested investment was accepted
    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }

    /// Some investments were accepted, others rejected; the stream is usable
    pub fn is_partial(&self) -> bool {
        self.status_code == 206
    }

    /// A usable stream was established (full or partial success)
    pub fn is_accepted(&self) -> bool {
        self.is_success() || self.is_partial()
    }

    /// All WebSocket URLs to consume, realtime first then delayed
    pub fn web_socket_urls(&self) -> Vec<String> {
        self.subscriptions
            .as_ref()
            .map(StreamEndpoints::all)
            .unwrap_or_default()
    }
}

// ============================================================================
// Caller-Facing Results
// ============================================================================

/// Result of starting a subscription
///
/// `subscription_id` and the timestamps are present only when the API
/// accepted the request; the raw [`StreamResponse`] is always carried so
/// callers can inspect rejection details or partial-success warnings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSubscriptionOutcome {
    pub subscription_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub response: StreamResponse,
}

impl StartSubscriptionOutcome {
    /// Outcome for an accepted request
    pub fn accepted(
        subscription_id: Uuid,
        started_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        response: StreamResponse,
    ) -> Self {
        Self {
            subscription_id: Some(subscription_id),
            started_at: Some(started_at),
            expires_at,
            response,
        }
    }

    /// Outcome for a rejected request; carries only the raw API response
    pub fn rejected(response: StreamResponse) -> Self {
        Self {
            subscription_id: None,
            started_at: None,
            expires_at: None,
            response,
        }
    }
}

/// Result of stopping a subscription; never an error
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopSubscriptionResult {
    pub success: bool,
    pub subscription_id: Uuid,
    pub message: Option<String>,
    pub error_code: Option<String>,
}

impl StopSubscriptionResult {
    /// The subscription was found and its cancellation signal triggered
    pub fn stopped(subscription_id: Uuid) -> Self {
        Self {
            success: true,
            subscription_id,
            message: Some("Subscription stopped successfully".into()),
            error_code: None,
        }
    }

    /// No subscription with this id exists
    pub fn not_found(subscription_id: Uuid) -> Self {
        Self {
            success: false,
            subscription_id,
            message: Some(format!(
                "Subscription with id {subscription_id} was not found or has already been removed"
            )),
            error_code: Some("SubscriptionNotFound".into()),
        }
    }
}

/// Read-only view of an active subscription group
///
/// Excludes the cancellation handle, which is internal to the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionView {
    pub id: Uuid,
    pub web_socket_urls: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let request = Level1SubscriptionRequest::new(StreamRequest::new(
            vec![InvestmentSelector::new(
                "performanceId",
                vec!["0P000003MH".into()],
            )],
            vec!["Trade".into(), "TopOfBook".into()],
        ))
        .with_duration_seconds(60);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["durationSeconds"], 60);
        assert_eq!(json["stream"]["investments"][0]["idType"], "performanceId");
        assert_eq!(json["stream"]["eventTypes"][1], "TopOfBook");
    }

    #[test]
    fn test_request_omits_absent_duration() {
        let request = Level1SubscriptionRequest::new(StreamRequest::new(vec![], vec![]));
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("durationSeconds").is_none());
        assert_eq!(request.duration_seconds(), None);
    }

    #[test]
    fn test_response_deserialization() {
        let json = r#"{
            "statusCode": 206,
            "schema": "{\"type\":\"record\"}",
            "subscriptions": {
                "realtime": ["wss://stream.test/a1", "wss://stream.test/a2"],
                "delayed": ["wss://stream.test/d1"]
            },
            "metaData": {
                "requestId": "req-42",
                "messages": [
                    {
                        "type": "Warning",
                        "investments": [
                            {"id": "0P0BAD", "idType": "performanceId", "status": "Rejected", "errorCode": "NotFound"}
                        ]
                    }
                ]
            }
        }"#;

        let response: StreamResponse = serde_json::from_str(json).unwrap();
        assert!(response.is_partial());
        assert!(response.is_accepted());
        assert!(!response.is_success());
        assert_eq!(
            response.web_socket_urls(),
            vec![
                "wss://stream.test/a1".to_string(),
                "wss://stream.test/a2".to_string(),
                "wss://stream.test/d1".to_string(),
            ]
        );

        let meta = response.meta_data.unwrap();
        assert_eq!(meta.request_id.as_deref(), Some("req-42"));
        let investment = &meta.messages.unwrap()[0].investments[0];
        assert_eq!(investment.error_code.as_deref(), Some("NotFound"));
    }

    #[test]
    fn test_response_tolerates_missing_fields() {
        let response: StreamResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(response.status_code, 0);
        assert!(!response.is_accepted());
        assert!(response.web_socket_urls().is_empty());
    }

    #[test]
    fn test_rejected_outcome_has_no_id() {
        let response = StreamResponse {
            status_code: 400,
            error_code: Some("BadRequest".into()),
            ..Default::default()
        };
        let outcome = StartSubscriptionOutcome::rejected(response);
        assert!(outcome.subscription_id.is_none());
        assert!(outcome.started_at.is_none());
        assert!(outcome.expires_at.is_none());
        assert_eq!(outcome.response.status_code, 400);
    }

    #[test]
    fn test_stop_results() {
        let id = Uuid::new_v4();

        let stopped = StopSubscriptionResult::stopped(id);
        assert!(stopped.success);
        assert!(stopped.error_code.is_none());

        let missing = StopSubscriptionResult::not_found(id);
        assert!(!missing.success);
        assert_eq!(missing.error_code.as_deref(), Some("SubscriptionNotFound"));
        assert!(missing.message.unwrap().contains(&id.to_string()));
    }
}
