mod analyzer;
mod config;
mod fetcher;
mod model;
mod notifier;
mod reports;
mod utils;

use chrono::{DateTime, Utc};
use config::load_config;
use fetcher::{SentimentFetcher, YahooLoader};
use futures::FutureExt;
use model::{ChannelKey, ReportOutcome};
use notifier::{build_sink, ReportSink};
use reports::{RunContext, RUN_ORDER};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{error, info, warn};
use utils::is_us_daylight_saving;

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    let config = load_config("config.json");

    let now = Utc::now();
    let timeout = Duration::from_secs(config.http_timeout_seconds);
    let loader = match YahooLoader::new(timeout, now.date_naive()) {
        Ok(loader) => loader,
        Err(e) => {
            error!("Failed to create price loader: {}", e);
            return;
        }
    };
    let sentiment = match SentimentFetcher::new(timeout) {
        Ok(fetcher) => fetcher,
        Err(e) => {
            error!("Failed to create sentiment fetcher: {}", e);
            return;
        }
    };
    let sink = build_sink(&config);

    let ctx = RunContext {
        loader: &loader,
        sentiment: &sentiment,
        fetch_delay: Duration::from_millis(config.fetch_delay_ms),
        today: now.date_naive(),
    };

    info!("🚀 Market digest run started");
    let outcomes = run_all(&ctx, sink.as_ref()).await;

    let digest = compose_digest(now, &outcomes);
    if let Err(e) = sink.publish_summary(&digest).await {
        warn!("❌ Digest publish failed: {}", e);
    }

    let succeeded = outcomes
        .iter()
        .filter(|o| matches!(o, ReportOutcome::Ok(_)))
        .count();
    info!("🏁 Run finished: {}/{} reports succeeded", succeeded, outcomes.len());
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}

/// Runs one analyzer, turning a panic inside it into a failed outcome.
async fn run_guarded(channel: ChannelKey, ctx: &RunContext<'_>) -> ReportOutcome {
    match AssertUnwindSafe(reports::run(channel, ctx)).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            error!("💥 {} analyzer panicked: {}", channel.title(), message);
            ReportOutcome::Failed {
                channel,
                reason: format!("Unexpected failure: {}", message),
            }
        }
    }
}

/// Runs every analyzer in order and publishes each outcome as it lands.
/// A failed or panicking analyzer, or a failed post, never stops the run.
async fn run_all(ctx: &RunContext<'_>, sink: &dyn ReportSink) -> Vec<ReportOutcome> {
    let mut outcomes = Vec::with_capacity(RUN_ORDER.len());
    for channel in RUN_ORDER {
        let outcome = run_guarded(channel, ctx).await;
        if let Err(e) = sink.publish(channel, &outcome.body()).await {
            warn!("❌ Publishing {} failed: {}", channel.title(), e);
        }
        outcomes.push(outcome);
    }
    outcomes
}

/// Digest text: date header with the US daylight-saving marker, then one
/// line per analyzer.
fn compose_digest(now: DateTime<Utc>, outcomes: &[ReportOutcome]) -> String {
    let season = if is_us_daylight_saving(now) {
        "🇺🇸 US daylight saving time"
    } else {
        "🇺🇸 US standard time"
    };
    let mut lines = vec![format!(
        "📋 *Market Digest* {} ({})",
        now.format("%Y-%m-%d"),
        season
    )];
    lines.extend(outcomes.iter().map(|o| format!("• {}", o.summary())));
    lines.join("\n")
}
