pub mod slack;

use crate::config::AppConfig;
use crate::model::{ChannelKey, NotifyError};
use tracing::{info, warn};

pub use slack::SlackNotifier;

/// Destination for finished reports.
#[async_trait::async_trait]
pub trait ReportSink: Send + Sync {
    /// Posts `text` to the channel of `channel`.
    async fn publish(&self, channel: ChannelKey, text: &str) -> Result<(), NotifyError>;
    /// Posts `text` to the digest channel only.
    async fn publish_summary(&self, text: &str) -> Result<(), NotifyError>;
}

/// Used when credentials are missing: reports go to the log instead.
pub struct LogSink;

#[async_trait::async_trait]
impl ReportSink for LogSink {
    async fn publish(&self, channel: ChannelKey, text: &str) -> Result<(), NotifyError> {
        info!("📝 [{:?}] (publishing disabled)\n{}", channel, text);
        Ok(())
    }

    async fn publish_summary(&self, text: &str) -> Result<(), NotifyError> {
        info!("📝 [digest] (publishing disabled)\n{}", text);
        Ok(())
    }
}

/// Slack when both credentials are configured, the log otherwise.
pub fn build_sink(config: &AppConfig) -> Box<dyn ReportSink> {
    let Some((token, user_id)) = config.credentials() else {
        warn!("⚠️ SLACK_TOKEN or SLACK_USER_ID not set, reports will only be logged");
        return Box::new(LogSink);
    };
    match SlackNotifier::new(token, user_id, config) {
        Ok(notifier) => Box::new(notifier),
        Err(e) => {
            warn!("❌ Failed to create Slack client: {}", e);
            Box::new(LogSink)
        }
    }
}
