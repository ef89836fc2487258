//! Shared types for the Polaris streaming API
//!
//! This crate provides the core type definitions used across the Polaris SDK.
//! It has minimal dependencies and can be used independently.
//!
//! # Key Types
//!
//! - [`Level1SubscriptionRequest`], [`StreamRequest`] - Stream creation requests
//! - [`StreamResponse`] - Stream creation result with endpoint URLs
//! - [`SubscriptionView`], [`StartSubscriptionOutcome`] - Caller-facing results
//! - [`MessageEnvelope`], [`event_types`] - Wire-level event envelope
//! - [`PolarisError`] - Error taxonomy
//! - [`StreamingConfig`] - Client configuration

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod time;

// Re-export commonly used types
pub use config::*;
pub use error::*;
pub use events::*;
pub use models::*;
pub use time::*;
