use crate::model::ChannelKey;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

/// Slack channel name and the `<#id>` tag shown in the message prefix.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChannelConfig {
    pub name: String,
    pub tag: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub slack_token: Option<String>,
    pub slack_user_id: Option<String>,
    pub digest_channel: String,
    pub channels: HashMap<ChannelKey, ChannelConfig>,
    pub fetch_delay_ms: u64,
    pub http_timeout_seconds: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        let channel = |name: &str, tag: &str| ChannelConfig {
            name: name.to_string(),
            tag: tag.to_string(),
        };
        let channels = HashMap::from([
            (ChannelKey::Currency, channel("0-currency", "#C09PYLC5HHA")),
            (ChannelKey::EquityIndex, channel("0-snp", "#C09Q7T0TR25")),
            (ChannelKey::FearGreed, channel("0-feargreed", "#C09Q7SXFDHP")),
            (ChannelKey::Crypto, channel("0-crypto", "#0-crypto")),
            (ChannelKey::Bonds, channel("0-bonds", "#0-bonds")),
            (ChannelKey::Commodities, channel("0-commodities", "#0-commodities")),
            (ChannelKey::MaStage, channel("0-ma-stage", "#0-ma-stage")),
        ]);
        Self {
            slack_token: None,
            slack_user_id: None,
            digest_channel: "notitee_msg".to_string(),
            channels,
            fetch_delay_ms: 1000,
            http_timeout_seconds: 10,
        }
    }
}

impl AppConfig {
    /// Channel settings for `key`, falling back to the built-in defaults for
    /// keys the config file leaves out.
    pub fn channel(&self, key: ChannelKey) -> ChannelConfig {
        self.channels
            .get(&key)
            .cloned()
            .or_else(|| AppConfig::default().channels.remove(&key))
            .unwrap_or_else(|| ChannelConfig {
                name: self.digest_channel.clone(),
                tag: format!("#{}", self.digest_channel),
            })
    }

    /// Both credentials, when present and non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.slack_token.as_deref().filter(|t| !t.trim().is_empty())?;
        let user = self.slack_user_id.as_deref().filter(|u| !u.trim().is_empty())?;
        Some((token, user))
    }

    /// Replaces credentials with `SLACK_TOKEN` / `SLACK_USER_ID` when set.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup("SLACK_TOKEN") {
            self.slack_token = Some(token);
        }
        if let Some(user) = lookup("SLACK_USER_ID") {
            self.slack_user_id = Some(user);
        }
    }
}

pub fn parse_config(content: &str) -> Result<AppConfig, serde_json::Error> {
    serde_json::from_str(content)
}

/// Reads `path`, falling back to the defaults when the file is missing,
/// unreadable or malformed.
pub fn config_from_file(path: &Path) -> AppConfig {
    if !path.exists() {
        info!("No {} found, using built-in configuration", path.display());
        return AppConfig::default();
    }
    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| parse_config(&content).map_err(|e| e.to_string()));
    match parsed {
        Ok(config) => {
            info!("Loaded configuration from {}", path.display());
            config
        }
        Err(e) => {
            error!("Config load error in {}: {}, using built-in configuration", path.display(), e);
            AppConfig::default()
        }
    }
}

/// Loads `path` (or the defaults), then overlays the environment, including
/// a `.env` file.
pub fn load_config(path: &str) -> AppConfig {
    let mut config = config_from_file(Path::new(path));

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            warn!("⚠️ Failed to read .env: {}", e);
        }
    }
    config.apply_env(|key| std::env::var(key).ok());
    config
}
