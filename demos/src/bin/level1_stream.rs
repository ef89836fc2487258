//! Demo 1: Level-1 Market Data Stream
//!
//! Showcases: stream creation, concurrent endpoint consumption, heartbeat
//! handling, throughput reporting, graceful stop
//!
//! Run: cargo run --bin level1_stream
//!
//! Environment:
//!   POLARIS_API_BASE       Streaming API base URL
//!   POLARIS_OAUTH_URL      OAuth token endpoint
//!   POLARIS_CLIENT_ID      OAuth client id
//!   POLARIS_CLIENT_SECRET  OAuth client secret
//!   POLARIS_BEARER_TOKEN   Pre-issued token (skips the OAuth exchange)
//!   POLARIS_IDS            Comma-separated performance ids
//!   POLARIS_LOG_MESSAGES   Set to 1 to write frames to per-topic files

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use colored::*;
use polaris_auth::{OAuthTokenProvider, StaticTokenProvider, TokenProvider};
use polaris_sdk::prelude::*;
use tokio_util::sync::CancellationToken;

/// Counts disconnections reported through the metric seam
#[derive(Default)]
struct DisconnectionCounter {
    total: AtomicU64,
}

impl DisconnectionCounter {
    fn total(&self) -> u64 {
        self.total.load(Ordering::Relaxed)
    }
}

impl MetricSink for DisconnectionCounter {
    fn record(&self, name: &str, value: u64, _tags: &[(&str, &str)]) {
        if name == WEBSOCKET_DISCONNECTIONS {
            self.total.fetch_add(value, Ordering::Relaxed);
        }
    }
}

fn token_provider() -> Result<Arc<dyn TokenProvider>, Box<dyn std::error::Error>> {
    if let Ok(token) = std::env::var("POLARIS_BEARER_TOKEN") {
        return Ok(Arc::new(StaticTokenProvider::new(format!("Bearer {token}"))));
    }
    Ok(Arc::new(OAuthTokenProvider::from_env()?))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  LEVEL-1 STREAM DEMO".cyan().bold());
    println!("{}", "  Polaris SDK Demo - Real-Time Market Data".cyan());
    println!("{}", "═".repeat(65).cyan());
    println!();

    let api_base =
        std::env::var("POLARIS_API_BASE").unwrap_or_else(|_| "https://api.polarisdata.io".into());
    let oauth_url = std::env::var("POLARIS_OAUTH_URL")
        .unwrap_or_else(|_| "https://auth.polarisdata.io/oauth2/token".into());
    let ids: Vec<String> = std::env::var("POLARIS_IDS")
        .unwrap_or_else(|_| "0P000003MH,0P000002HD".into())
        .split(',')
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    let log_messages = std::env::var("POLARIS_LOG_MESSAGES")
        .map(|value| value == "1")
        .unwrap_or(false);

    let config = StreamingConfig::new(api_base, oauth_url).with_log_messages(log_messages);

    println!("{}", "  CONFIGURATION".white().bold());
    println!("  {}", "─".repeat(50));
    println!("  API Base:     {}", config.streaming_api_base.cyan());
    println!("  Instruments:  {}", ids.join(", ").cyan());
    println!(
        "  File Logging: {}",
        if log_messages {
            "on".green()
        } else {
            "off".yellow()
        }
    );
    println!();

    let provider = token_provider()?;
    let api = Arc::new(StreamingClient::new(config.clone(), provider));

    let counter = Arc::new(ThroughputCounter::new());
    let disconnections = Arc::new(DisconnectionCounter::default());
    let service = SubscriptionService::new(
        api.clone(),
        Arc::new(Level1SubscriptionFactory::new()),
        Arc::new(DefaultConsumerFactory::new(
            api,
            counter.clone(),
            disconnections.clone(),
            Arc::new(MessageLogSinks::new(config.log_messages_path.clone())),
        )),
        Arc::new(SubscriptionRegistry::new()),
        config.log_messages,
    );

    let reporter_cancel = CancellationToken::new();
    let reporter = counter.spawn_reporter(reporter_cancel.clone());

    let request = Level1SubscriptionRequest::new(StreamRequest::new(
        vec![InvestmentSelector::new("performanceId", ids)],
        vec![
            event_types::TRADE.into(),
            event_types::TOP_OF_BOOK.into(),
            event_types::LAST_PRICE.into(),
        ],
    ));

    println!("{}", "  STARTING SUBSCRIPTION".white().bold());
    println!("  {}", "─".repeat(50));

    let outcome = service.start_level1_subscription(&request).await?;
    let Some(id) = outcome.subscription_id else {
        println!(
            "  {} Request rejected: status {} ({})",
            "✗".red(),
            outcome.response.status_code,
            outcome.response.error_code.as_deref().unwrap_or("unknown")
        );
        return Ok(());
    };

    if outcome.response.is_partial() {
        println!(
            "  {} Partial success, some instruments were rejected",
            "!".yellow()
        );
    }
    println!("  {} Subscription {}", "●".green(), id.to_string().cyan());
    for view in service.active_subscriptions() {
        for url in &view.web_socket_urls {
            println!("    {} {}", "→".dimmed(), url.dimmed());
        }
    }
    println!();
    println!("  Streaming until Ctrl-C...");
    println!();

    tokio::signal::ctrl_c().await?;

    println!();
    println!("{}", "  STOPPING".white().bold());
    println!("  {}", "─".repeat(50));

    let stopped = service.stop_subscription(id);
    let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
    println!(
        "  {} {} {}",
        format!("[{}]", timestamp).dimmed(),
        if stopped.success {
            "●".green()
        } else {
            "✗".red()
        },
        stopped.message.unwrap_or_default()
    );

    service.shutdown().await;
    reporter_cancel.cancel();
    let _ = reporter.await;

    println!(
        "  Unexpected disconnections: {}",
        disconnections.total().to_string().cyan()
    );
    println!();
    println!("{}", "═".repeat(65).cyan());

    Ok(())
}
