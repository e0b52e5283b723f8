// notifier/slack.rs

use crate::config::{AppConfig, ChannelConfig};
use crate::model::{ChannelKey, NotifyError};
use crate::notifier::ReportSink;
use crate::utils::kst_timestamp;
use chrono::Utc;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{info, warn};

const POST_MESSAGE_URL: &str = "https://slack.com/api/chat.postMessage";

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SlackResponse {
    ok: bool,
    error: Option<String>,
}

pub struct SlackNotifier {
    token: String,
    user_id: String,
    digest_channel: String,
    channels: HashMap<ChannelKey, ChannelConfig>,
    send_timeout: Duration,
    client: Client,
}

impl SlackNotifier {
    pub fn new(token: &str, user_id: &str, config: &AppConfig) -> Result<Self, NotifyError> {
        let send_timeout = Duration::from_secs(config.http_timeout_seconds);
        let client = Client::builder()
            .timeout(send_timeout)
            .build()
            .map_err(|e| NotifyError::Api(e.to_string()))?;
        let channels = ChannelKey::ALL
            .iter()
            .map(|&key| (key, config.channel(key)))
            .collect();
        Ok(Self {
            token: token.to_string(),
            user_id: user_id.to_string(),
            digest_channel: config.digest_channel.clone(),
            channels,
            send_timeout,
            client,
        })
    }

    /// `<tag> <KST time> <text>`, the form every channel post takes.
    pub fn format_post(tag: &str, stamp: &str, text: &str) -> String {
        format!("<{}> {} {}", tag, stamp, text)
    }

    /// Digest copy of a post, mentioning the configured user.
    pub fn format_mention(user_id: &str, post: &str) -> String {
        format!("<@{}> {}", user_id, post)
    }

    async fn post(&self, channel: &str, text: &str) -> Result<(), NotifyError> {
        info!("📤 Sending Slack message to #{}", channel);
        let request = self
            .client
            .post(POST_MESSAGE_URL)
            .bearer_auth(&self.token)
            .json(&PostMessage { channel, text })
            .send();
        let response = match timeout(self.send_timeout, request).await {
            Ok(Ok(resp)) => resp,
            Ok(Err(e)) => {
                warn!("❌ Slack send() failed: {:?}", e);
                return Err(NotifyError::Api(format!("Send failed: {}", e)));
            }
            Err(_) => {
                warn!("⏳ Slack send() timed out");
                return Err(NotifyError::Unreachable);
            }
        };

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NotifyError::Api(e.to_string()))?;
        if let Err(e) = check_reply(status, &body) {
            warn!("❌ Slack rejected message for #{} [{}]: {}", channel, status, e);
            return Err(e);
        }
        info!("✅ Slack message delivered to #{}", channel);
        Ok(())
    }
}

/// Interprets a `chat.postMessage` reply: non-2xx is unreachable, `ok: false`
/// carries Slack's error code.
fn check_reply(status: StatusCode, body: &str) -> Result<(), NotifyError> {
    if !status.is_success() {
        return Err(NotifyError::Unreachable);
    }
    let reply: SlackResponse =
        serde_json::from_str(body).map_err(|e| NotifyError::Api(e.to_string()))?;
    if !reply.ok {
        return Err(NotifyError::Api(
            reply.error.unwrap_or_else(|| "unknown".into()),
        ));
    }
    Ok(())
}

#[async_trait::async_trait]
impl ReportSink for SlackNotifier {
    async fn publish(&self, channel: ChannelKey, text: &str) -> Result<(), NotifyError> {
        let target = self
            .channels
            .get(&channel)
            .ok_or(NotifyError::Disabled("channel not configured"))?;
        let post = Self::format_post(&target.tag, &kst_timestamp(Utc::now()), text);

        // digest copy first, then the muted per-asset channel
        self.post(&self.digest_channel, &Self::format_mention(&self.user_id, &post))
            .await?;
        self.post(&target.name, &post).await
    }

    async fn publish_summary(&self, text: &str) -> Result<(), NotifyError> {
        let post = format!("{} {}", kst_timestamp(Utc::now()), text);
        self.post(&self.digest_channel, &Self::format_mention(&self.user_id, &post))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_layout() {
        let post = SlackNotifier::format_post("#C1", "2025-06-11 08:00:00 KST", "hello");
        assert_eq!(post, "<#C1> 2025-06-11 08:00:00 KST hello");
        assert_eq!(
            SlackNotifier::format_mention("U42", &post),
            "<@U42> <#C1> 2025-06-11 08:00:00 KST hello"
        );
    }

    #[test]
    fn every_channel_is_resolved() {
        let notifier = SlackNotifier::new("xoxb", "U1", &AppConfig::default()).unwrap();
        assert_eq!(notifier.channels.len(), ChannelKey::ALL.len());
        assert_eq!(notifier.digest_channel, "notitee_msg");
    }

    #[test]
    fn accepted_reply_is_ok() {
        assert!(check_reply(StatusCode::OK, r#"{"ok":true}"#).is_ok());
    }

    #[test]
    fn rejected_reply_carries_slack_error() {
        match check_reply(StatusCode::OK, r#"{"ok":false,"error":"channel_not_found"}"#) {
            Err(NotifyError::Api(reason)) => assert_eq!(reason, "channel_not_found"),
            other => panic!("unexpected {other:?}"),
        }
        match check_reply(StatusCode::OK, r#"{"ok":false}"#) {
            Err(NotifyError::Api(reason)) => assert_eq!(reason, "unknown"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn error_status_is_unreachable() {
        let reply = check_reply(StatusCode::TOO_MANY_REQUESTS, r#"{"ok":true}"#);
        assert!(matches!(reply, Err(NotifyError::Unreachable)));
        assert!(matches!(
            check_reply(StatusCode::OK, "<html>"),
            Err(NotifyError::Api(_))
        ));
    }
}
