//! Bearer-token providers
//!
//! The client secret is stored using the `secrecy` crate so it is zeroized
//! on drop and never appears in debug output.

use crate::error::{AuthError, AuthResult};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretBox};
use serde::Deserialize;
use tracing::{debug, error, instrument};

/// Source of `Authorization` header values for the streaming API
///
/// Implementations return the full header value, token type included
/// (e.g. `"Bearer eyJ..."`), so callers never reassemble it. Acquisition
/// failures are not retried at this layer; the caller decides retry policy.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Produce a usable `Authorization` header value
    async fn bearer_token(&self) -> AuthResult<String>;
}

/// Token endpoint response body
///
/// Field names vary between gateway generations; aliases keep both the
/// snake_case and underscored-PascalCase spellings deserializable.
#[derive(Debug, Deserialize)]
struct OAuthToken {
    #[serde(alias = "Token_Type", alias = "tokenType")]
    token_type: String,
    #[serde(alias = "Access_Token", alias = "accessToken")]
    access_token: String,
}

/// Provider performing the OAuth client-credentials exchange
///
/// Sends an HTTP Basic authenticated POST to the token endpoint and formats
/// the response as `"{token_type} {access_token}"`.
///
/// # Example
///
/// ```no_run
/// use polaris_auth::{OAuthTokenProvider, TokenProvider};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let provider = OAuthTokenProvider::new(
///     "https://auth.example.com/token",
///     "my-client-id",
///     "my-client-secret",
/// );
/// let header = provider.bearer_token().await?;
/// # Ok(())
/// # }
/// ```
pub struct OAuthTokenProvider {
    client: Client,
    oauth_url: String,
    client_id: String,
    client_secret: SecretBox<String>,
}

impl OAuthTokenProvider {
    /// Create a new provider for the given token endpoint and credentials
    pub fn new(
        oauth_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .user_agent("polaris-auth/0.1.0")
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            oauth_url: oauth_url.into(),
            client_id: client_id.into(),
            client_secret: SecretBox::new(Box::new(client_secret.into())),
        }
    }

    /// Create a provider from environment variables
    ///
    /// Reads `POLARIS_OAUTH_URL`, `POLARIS_CLIENT_ID` and
    /// `POLARIS_CLIENT_SECRET`.
    pub fn from_env() -> AuthResult<Self> {
        let read = |name: &str| {
            std::env::var(name).map_err(|_| AuthError::EnvVarNotSet(name.to_string()))
        };
        Ok(Self::new(
            read("POLARIS_OAUTH_URL")?,
            read("POLARIS_CLIENT_ID")?,
            read("POLARIS_CLIENT_SECRET")?,
        ))
    }

    fn basic_auth_header(&self) -> String {
        let pair = format!("{}:{}", self.client_id, self.client_secret.expose_secret());
        format!("Basic {}", STANDARD.encode(pair))
    }
}

#[async_trait]
impl TokenProvider for OAuthTokenProvider {
    #[instrument(skip(self))]
    async fn bearer_token(&self) -> AuthResult<String> {
        debug!("Requesting OAuth token");

        let response = self
            .client
            .post(&self.oauth_url)
            .header(AUTHORIZATION, self.basic_auth_header())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Unexpected error during OAuth token request: {}", e);
                AuthError::Http(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            error!("OAuth endpoint returned {}", status);
            return Err(AuthError::InvalidResponse(format!(
                "token endpoint returned {status}"
            )));
        }

        let token: OAuthToken = response
            .json()
            .await
            .map_err(|e| AuthError::InvalidResponse(e.to_string()))?;

        debug!("Got OAuth token of type {}", token.token_type);
        Ok(format!("{} {}", token.token_type, token.access_token))
    }
}

/// Provider returning a fixed, pre-issued header value
///
/// Useful for local development and tests where no OAuth endpoint exists.
pub struct StaticTokenProvider {
    header_value: String,
}

impl StaticTokenProvider {
    /// Wrap a complete `Authorization` header value (e.g. `"Bearer abc"`)
    pub fn new(header_value: impl Into<String>) -> Self {
        Self {
            header_value: header_value.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn bearer_token(&self) -> AuthResult<String> {
        Ok(self.header_value.clone())
    }
}
