//! OAuth bearer-token acquisition for the Polaris streaming API
//!
//! The streaming API authenticates every HTTP call and WebSocket handshake
//! with a bearer token obtained from an OAuth endpoint. This crate provides
//! the [`TokenProvider`] seam plus two implementations: [`OAuthTokenProvider`]
//! for the client-credentials exchange and [`StaticTokenProvider`] for
//! environments with a pre-issued token.
//!
//! # Example
//!
//! ```no_run
//! use polaris_auth::{OAuthTokenProvider, TokenProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = OAuthTokenProvider::from_env()?;
//!
//!     // Full Authorization header value, e.g. "Bearer eyJ..."
//!     let header = provider.bearer_token().await?;
//!     println!("Authorization: {}", header);
//!
//!     Ok(())
//! }
//! ```

mod error;
mod provider;

pub use error::{AuthError, AuthResult};
pub use provider::{OAuthTokenProvider, StaticTokenProvider, TokenProvider};
