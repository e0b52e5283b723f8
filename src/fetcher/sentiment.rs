use crate::model::FetchError;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

const CNN_URL: &str = "https://production.dataviz.cnn.io/index/fearandgreed/graphdata";
const CRYPTO_URL: &str = "https://api.alternative.me/fng/";

#[derive(Debug, Clone, PartialEq)]
pub struct CnnFearGreed {
    pub score: f64,
    pub rating: String,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CryptoFearGreed {
    pub value: u32,
    pub classification: String,
    pub updated: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CnnResponse {
    fear_and_greed: CnnIndex,
}

#[derive(Debug, Deserialize)]
struct CnnIndex {
    score: f64,
    rating: String,
    timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct CryptoResponse {
    #[serde(default)]
    data: Vec<CryptoEntry>,
}

#[derive(Debug, Deserialize)]
struct CryptoEntry {
    value: String,
    value_classification: String,
    timestamp: String,
}

/// Sentiment gauges that are not price series.
#[async_trait::async_trait]
pub trait SentimentSource: Send + Sync {
    async fn cnn_fear_greed(&self) -> Result<CnnFearGreed, FetchError>;
    async fn crypto_fear_greed(&self) -> Result<CryptoFearGreed, FetchError>;
}

pub struct SentimentFetcher {
    client: Client,
}

impl SentimentFetcher {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) MarketDigest/0.1")
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("❌ {} responded [{}]", url, status);
            return Err(FetchError::Status(status.as_u16()));
        }
        Ok(body)
    }
}

#[async_trait::async_trait]
impl SentimentSource for SentimentFetcher {
    async fn cnn_fear_greed(&self) -> Result<CnnFearGreed, FetchError> {
        info!("📥 Fetching CNN Fear & Greed index");
        let body = self.get_text(CNN_URL).await?;
        decode_cnn(&body)
    }

    async fn crypto_fear_greed(&self) -> Result<CryptoFearGreed, FetchError> {
        info!("📥 Fetching crypto Fear & Greed index");
        let body = self.get_text(CRYPTO_URL).await?;
        decode_crypto(&body)
    }
}

pub fn decode_cnn(body: &str) -> Result<CnnFearGreed, FetchError> {
    let parsed: CnnResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    let index = parsed.fear_and_greed;
    Ok(CnnFearGreed {
        score: (index.score * 100.0).round() / 100.0,
        rating: index.rating,
        updated: index.timestamp,
    })
}

pub fn decode_crypto(body: &str) -> Result<CryptoFearGreed, FetchError> {
    let parsed: CryptoResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;
    let entry = parsed
        .data
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Empty("crypto fear & greed".to_string()))?;
    let value = entry
        .value
        .trim()
        .parse::<u32>()
        .map_err(|e| FetchError::Decode(format!("value {:?}: {}", entry.value, e)))?;
    let seconds = entry.timestamp.trim().parse::<i64>().unwrap_or_default();
    Ok(CryptoFearGreed {
        value,
        classification: entry.value_classification,
        updated: DateTime::from_timestamp(seconds, 0).unwrap_or_default(),
    })
}

#[cfg(test)]
pub mod testing {
    use super::*;

    /// Fixed readings; `None` makes the call fail.
    pub struct FixedSentiment {
        pub cnn: Option<CnnFearGreed>,
        pub crypto: Option<CryptoFearGreed>,
    }

    #[async_trait::async_trait]
    impl SentimentSource for FixedSentiment {
        async fn cnn_fear_greed(&self) -> Result<CnnFearGreed, FetchError> {
            self.cnn.clone().ok_or(FetchError::Timeout)
        }

        async fn crypto_fear_greed(&self) -> Result<CryptoFearGreed, FetchError> {
            self.crypto.clone().ok_or(FetchError::Http("down".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cnn_payload() {
        let body = r#"{"fear_and_greed":{"score":62.4571,"rating":"greed",
            "timestamp":"2025-06-10T23:59:57+00:00","previous_close":60.1}}"#;
        let index = decode_cnn(body).unwrap();
        assert_eq!(index.score, 62.46);
        assert_eq!(index.rating, "greed");
        assert_eq!(index.updated.to_rfc3339(), "2025-06-10T23:59:57+00:00");
    }

    #[test]
    fn crypto_payload() {
        let body = r#"{"name":"Fear and Greed Index","data":[{"value":"27",
            "value_classification":"Fear","timestamp":"1717977600"}],"metadata":{"error":null}}"#;
        let index = decode_crypto(body).unwrap();
        assert_eq!(index.value, 27);
        assert_eq!(index.classification, "Fear");
    }

    #[test]
    fn crypto_without_data_is_empty() {
        let body = r#"{"data":[]}"#;
        assert!(matches!(decode_crypto(body), Err(FetchError::Empty(_))));
    }
}
