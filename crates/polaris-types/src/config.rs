//! Client configuration

/// Path of the level-1 stream creation endpoint, relative to the API base
pub const LEVEL1_STREAM_PATH: &str = "direct-web-services/v1/streaming/level-1";

/// Configuration for the streaming client and orchestrator
#[derive(Debug, Clone)]
pub struct StreamingConfig {
    /// Base URL of the streaming API (scheme + host, no trailing path)
    pub streaming_api_base: String,
    /// OAuth token endpoint URL
    pub oauth_url: String,
    /// Write every received message to a per-topic log file
    pub log_messages: bool,
    /// Directory for per-topic message log files
    pub log_messages_path: String,
}

impl StreamingConfig {
    /// Create a config with message file logging disabled
    pub fn new(streaming_api_base: impl Into<String>, oauth_url: impl Into<String>) -> Self {
        Self {
            streaming_api_base: streaming_api_base.into(),
            oauth_url: oauth_url.into(),
            log_messages: false,
            log_messages_path: "logs".into(),
        }
    }

    /// Enable or disable per-topic message file logging
    pub fn with_log_messages(mut self, enabled: bool) -> Self {
        self.log_messages = enabled;
        self
    }

    /// Set the directory for per-topic message log files
    pub fn with_log_messages_path(mut self, path: impl Into<String>) -> Self {
        self.log_messages_path = path.into();
        self
    }

    /// Full URL of the level-1 stream creation endpoint
    pub fn level1_endpoint(&self) -> String {
        format!(
            "{}/{}",
            self.streaming_api_base.trim_end_matches('/'),
            LEVEL1_STREAM_PATH
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level1_endpoint_joins_cleanly() {
        let config = StreamingConfig::new("https://api.test/", "https://auth.test/token");
        assert_eq!(
            config.level1_endpoint(),
            "https://api.test/direct-web-services/v1/streaming/level-1"
        );

        let config = StreamingConfig::new("https://api.test", "https://auth.test/token");
        assert_eq!(
            config.level1_endpoint(),
            "https://api.test/direct-web-services/v1/streaming/level-1"
        );
    }

    #[test]
    fn test_builder_defaults() {
        let config = StreamingConfig::new("https://api.test", "https://auth.test/token");
        assert!(!config.log_messages);
        assert_eq!(config.log_messages_path, "logs");

        let config = config.with_log_messages(true).with_log_messages_path("/var/log/ws");
        assert!(config.log_messages);
        assert_eq!(config.log_messages_path, "/var/log/ws");
    }
}
