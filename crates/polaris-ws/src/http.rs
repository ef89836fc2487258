//! Generic JSON request helper
//!
//! Both stream creation and any other authenticated API call go through
//! [`send_json`]: serialize the body, attach headers, deserialize the JSON
//! response. HTTP-level faults map to [`PolarisError::Transport`]; malformed
//! bodies keep the raw payload for diagnostics.

use polaris_types::{PolarisError, PolarisResult};
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// User-Agent sent on every HTTP request
pub const USER_AGENT: &str = "polaris-streaming-client/0.1.0";

/// Build the HTTP client used for API calls
pub fn default_client() -> Client {
    Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .expect("Failed to create HTTP client")
}

/// Send an optional JSON body and deserialize the JSON response
///
/// Returns the HTTP status alongside the parsed body; callers that care
/// about non-2xx statuses inspect the status themselves, since the gateway
/// also embeds its own status code in response bodies.
pub async fn send_json<B, T>(
    client: &Client,
    method: Method,
    url: &str,
    headers: HeaderMap,
    body: Option<&B>,
) -> PolarisResult<(StatusCode, T)>
where
    B: Serialize + ?Sized,
    T: DeserializeOwned,
{
    let mut request = client.request(method, url).headers(headers);
    if let Some(body) = body {
        request = request.json(body);
    }

    let response = request
        .send()
        .await
        .map_err(|e| PolarisError::transport(e.to_string()))?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| PolarisError::transport(e.to_string()))?;

    let parsed = serde_json::from_slice(&bytes).map_err(|e| PolarisError::InvalidJson {
        message: e.to_string(),
        raw: Some(String::from_utf8_lossy(&bytes).into_owned()),
    })?;

    Ok((status, parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Pong {
        ok: bool,
    }

    #[tokio::test]
    async fn test_send_json_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ping"))
            .and(header("x-test", "yes"))
            .and(body_json(serde_json::json!({"value": 7})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let mut headers = HeaderMap::new();
        headers.insert("x-test", "yes".parse().unwrap());

        let body = serde_json::json!({"value": 7});
        let (status, pong): (StatusCode, Pong) = send_json(
            &default_client(),
            Method::POST,
            &format!("{}/ping", server.uri()),
            headers,
            Some(&body),
        )
        .await
        .unwrap();

        assert_eq!(status, StatusCode::OK);
        assert!(pong.ok);
    }

    #[tokio::test]
    async fn test_send_json_keeps_raw_body_on_parse_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result: PolarisResult<(StatusCode, Pong)> = send_json::<(), Pong>(
            &default_client(),
            Method::GET,
            &server.uri(),
            HeaderMap::new(),
            None,
        )
        .await;

        match result {
            Err(PolarisError::InvalidJson { raw, .. }) => {
                assert_eq!(raw.as_deref(), Some("not json"));
            }
            other => panic!("expected InvalidJson, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_send_json_maps_network_faults_to_transport() {
        // Port 9 (discard) refuses connections on loopback
        let result: PolarisResult<(StatusCode, Pong)> = send_json::<(), Pong>(
            &default_client(),
            Method::GET,
            "http://127.0.0.1:9/unreachable",
            HeaderMap::new(),
            None,
        )
        .await;

        assert!(matches!(result, Err(PolarisError::Transport { .. })));
    }
}
