//! Event types and the wire-level message envelope
//!
//! Streamed messages arrive wrapped in a PascalCase JSON envelope. The only
//! envelope the client ever sends back is the heartbeat acknowledgement.

use serde::{Deserialize, Serialize};

use crate::time::nanos_since_epoch;

/// Event type names as published by the vendor
pub mod event_types {
    pub const AGGREGATE_SUMMARY: &str = "AggregateSummary";
    pub const AUCTION: &str = "Auction";
    pub const CLOSE: &str = "Close";
    pub const INDEX_TICK: &str = "IndexTick";
    pub const LAST_PRICE: &str = "LastPrice";
    pub const MARKET_BY_PRICE: &str = "MarketByPrice";
    pub const MID_PRICE: &str = "MidPrice";
    pub const NAV_PRICE: &str = "NAVPrice";
    pub const OHL_PRICE: &str = "OHLPrice";
    pub const INSTRUMENT_PERFORMANCE_STATISTICS: &str = "InstrumentPerformanceStatistics";
    pub const SETTLEMENT_PRICE: &str = "SettlementPrice";
    pub const SPREAD_STATISTICS: &str = "SpreadStatistics";
    pub const STATUS: &str = "Status";
    pub const TOP_OF_BOOK: &str = "TopOfBook";
    pub const TRADE_POST_MARKET: &str = "TradePostMarket";
    pub const TRADE_PRE_MARKET: &str = "TradePreMarket";
    pub const TRADE_CANCELLATION: &str = "TradeCancellation";
    pub const TRADE_CORRECTION: &str = "TradeCorrection";
    pub const TRADE: &str = "Trade";
    pub const HEART_BEAT: &str = "HeartBeat";
    pub const ADMIN: &str = "Admin";
    pub const HEART_BEAT_ACKNOWLEDGED: &str = "HeartBeatAcknowledged";
}

/// Returns true if a raw frame carries the heartbeat marker
///
/// Matched as a case-insensitive substring rather than by schema parsing, so
/// envelope-shape changes on the server side cannot break liveness handling.
pub fn contains_heartbeat_marker(text: &str) -> bool {
    let marker = event_types::HEART_BEAT;
    text.to_ascii_lowercase()
        .contains(&marker.to_ascii_lowercase())
}

/// Streamed message envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MessageEnvelope {
    /// Event type name (see [`event_types`])
    pub event_type: String,
    /// Instrument the event refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_id: Option<String>,
    /// Publish time in nanoseconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish_time: Option<i64>,
    /// Acknowledgement time in nanoseconds since the Unix epoch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acknowledged_time: Option<i64>,
    /// Per-connection sequence number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u64>,
    /// Event payload; shape depends on the event type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<serde_json::Value>,
}

impl MessageEnvelope {
    /// Build the acknowledgement sent in response to a server heartbeat
    pub fn heartbeat_ack() -> Self {
        Self {
            event_type: event_types::HEART_BEAT_ACKNOWLEDGED.into(),
            performance_id: None,
            publish_time: Some(nanos_since_epoch()),
            acknowledged_time: None,
            sequence_number: None,
            message: None,
        }
    }
}
