//! Demo 2: Subscription Lifecycle
//!
//! Showcases: concurrent subscription groups, bounded sessions with
//! auto-expiry, manual stop, idempotent stop results, graceful shutdown
//!
//! Run: cargo run --bin subscription_lifecycle
//!
//! Environment:
//!   POLARIS_API_BASE       Streaming API base URL
//!   POLARIS_OAUTH_URL      OAuth token endpoint
//!   POLARIS_CLIENT_ID      OAuth client id
//!   POLARIS_CLIENT_SECRET  OAuth client secret
//!   POLARIS_BEARER_TOKEN   Pre-issued token (skips the OAuth exchange)
//!   POLARIS_IDS            Comma-separated performance ids

use std::sync::Arc;
use std::time::Duration;

use colored::*;
use polaris_auth::{OAuthTokenProvider, StaticTokenProvider, TokenProvider};
use polaris_sdk::prelude::*;
use tokio_util::sync::CancellationToken;

const BOUNDED_SESSION_SECS: u64 = 30;

fn token_provider() -> Result<Arc<dyn TokenProvider>, Box<dyn std::error::Error>> {
    if let Ok(token) = std::env::var("POLARIS_BEARER_TOKEN") {
        return Ok(Arc::new(StaticTokenProvider::new(format!("Bearer {token}"))));
    }
    Ok(Arc::new(OAuthTokenProvider::from_env()?))
}

fn timestamp() -> ColoredString {
    format!("[{}]", chrono::Local::now().format("%H:%M:%S%.3f")).dimmed()
}

fn print_active(service: &SubscriptionService) {
    let views = service.active_subscriptions();
    println!(
        "  {} {} active subscription(s)",
        timestamp(),
        views.len().to_string().cyan()
    );
    for view in &views {
        match view.expires_at {
            Some(expires) => {
                let remaining = (expires - chrono::Utc::now()).num_seconds().max(0);
                println!(
                    "    {} {} expires in {}s",
                    "●".green(),
                    view.id.to_string().dimmed(),
                    remaining.to_string().yellow()
                );
            }
            None => println!(
                "    {} {} runs until stopped",
                "●".green(),
                view.id.to_string().dimmed()
            ),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  SUBSCRIPTION LIFECYCLE DEMO".cyan().bold());
    println!("{}", "  Polaris SDK Demo - Start, Expire, Stop".cyan());
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

    let config = StreamingConfig::new(api_base, oauth_url);
    let provider = token_provider()?;
    let api = Arc::new(StreamingClient::new(config.clone(), provider));

    let counter = Arc::new(ThroughputCounter::new());
    let service = SubscriptionService::new(
        api.clone(),
        Arc::new(Level1SubscriptionFactory::new()),
        Arc::new(DefaultConsumerFactory::new(
            api,
            counter.clone(),
            Arc::new(NoopMetricSink),
            Arc::new(MessageLogSinks::new(config.log_messages_path.clone())),
        )),
        Arc::new(SubscriptionRegistry::new()),
        config.log_messages,
    );

    let reporter_cancel = CancellationToken::new();
    let reporter = counter.spawn_reporter(reporter_cancel.clone());

    let stream = StreamRequest::new(
        vec![InvestmentSelector::new("performanceId", ids)],
        vec![event_types::TRADE.into(), event_types::TOP_OF_BOOK.into()],
    );

    println!("{}", "  PHASE 1: START TWO SUBSCRIPTIONS".white().bold());
    println!("  {}", "─".repeat(50));

    let unbounded = service
        .start_level1_subscription(&Level1SubscriptionRequest::new(stream.clone()))
        .await?;
    let bounded = service
        .start_level1_subscription(
            &Level1SubscriptionRequest::new(stream).with_duration_seconds(BOUNDED_SESSION_SECS),
        )
        .await?;

    let Some(unbounded_id) = unbounded.subscription_id else {
        println!(
            "  {} Unbounded request rejected: status {}",
            "✗".red(),
            unbounded.response.status_code
        );
        return Ok(());
    };
    let Some(bounded_id) = bounded.subscription_id else {
        println!(
            "  {} Bounded request rejected: status {}",
            "✗".red(),
            bounded.response.status_code
        );
        return Ok(());
    };

    println!(
        "  {} {} Unbounded subscription {}",
        timestamp(),
        "●".green(),
        unbounded_id.to_string().cyan()
    );
    println!(
        "  {} {} Bounded subscription   {} ({}s session)",
        timestamp(),
        "●".green(),
        bounded_id.to_string().cyan(),
        BOUNDED_SESSION_SECS
    );
    println!();
    print_active(&service);
    println!();

    println!("{}", "  PHASE 2: RUN 10 SECONDS".white().bold());
    println!("  {}", "─".repeat(50));
    for _ in 0..2 {
        tokio::time::sleep(Duration::from_secs(5)).await;
        print_active(&service);
    }
    println!();

    println!("{}", "  PHASE 3: STOP THE UNBOUNDED GROUP".white().bold());
    println!("  {}", "─".repeat(50));

    let first = service.stop_subscription(unbounded_id);
    println!(
        "  {} {} {}",
        timestamp(),
        if first.success { "●".green() } else { "✗".red() },
        first.message.unwrap_or_default()
    );

    // A second stop for the same id reports not-found instead of failing
    let second = service.stop_subscription(unbounded_id);
    println!(
        "  {} {} {} ({})",
        timestamp(),
        if second.success { "●".green() } else { "✗".yellow() },
        second.message.unwrap_or_default(),
        second.error_code.unwrap_or_default().dimmed()
    );
    println!();

    println!("{}", "  PHASE 4: WAIT FOR AUTO-EXPIRY".white().bold());
    println!("  {}", "─".repeat(50));
    while service.active_count() > 0 {
        tokio::time::sleep(Duration::from_secs(5)).await;
        print_active(&service);
    }
    println!(
        "  {} {} Bounded session expired and was removed",
        timestamp(),
        "●".green()
    );
    println!();

    service.shutdown().await;
    reporter_cancel.cancel();
    let _ = reporter.await;

    println!("{}", "═".repeat(65).cyan());
    println!("{}", "  All subscriptions released".cyan());
    println!("{}", "═".repeat(65).cyan());

    Ok(())
}
