use crate::fetcher::{FetchRange, SeriesLoader};
use crate::model::{FetchError, PriceBar, PriceSeries};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
struct Quote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Daily bars from the Yahoo Finance chart endpoint.
pub struct YahooLoader {
    client: Client,
    today: NaiveDate,
}

impl YahooLoader {
    pub fn new(timeout: Duration, today: NaiveDate) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) MarketDigest/0.1")
            .timeout(timeout)
            .build()?;
        Ok(Self { client, today })
    }

    fn unix(date: NaiveDate) -> i64 {
        date.and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl SeriesLoader for YahooLoader {
    async fn fetch(&self, symbol: &str, range: FetchRange) -> Result<PriceSeries, FetchError> {
        let (start, end) = range.bounds(self.today);
        let url = format!("{}/{}", CHART_URL, symbol);
        info!("📥 Fetching {} [{} .. {})", symbol, start, end);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", Self::unix(start).to_string()),
                ("period2", Self::unix(end).to_string()),
                ("interval", "1d".to_string()),
                ("events", "history".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let series = decode_response(symbol, status.as_u16(), &body).inspect_err(|e| {
            warn!("❌ Yahoo response for {} rejected: {}", symbol, e);
        })?;
        info!("✅ {} bars for {}", series.len(), symbol);
        Ok(series)
    }
}

fn pick(column: &[Option<f64>], i: usize) -> Option<f64> {
    column.get(i).copied().flatten()
}

/// Non-2xx statuses are errors regardless of the body.
pub fn decode_response(symbol: &str, status: u16, body: &str) -> Result<PriceSeries, FetchError> {
    if !(200..300).contains(&status) {
        return Err(FetchError::Status(status));
    }
    decode_chart(symbol, body)
}

/// Decodes a chart response. Rows without a close are dropped; missing
/// open/high/low fall back to the close.
pub fn decode_chart(symbol: &str, body: &str) -> Result<PriceSeries, FetchError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| FetchError::Decode(e.to_string()))?;

    if let Some(err) = envelope.chart.error {
        return Err(FetchError::Decode(format!(
            "{}: {}",
            err.code,
            err.description.unwrap_or_default()
        )));
    }

    let Some(result) = envelope.chart.result.and_then(|mut r| (!r.is_empty()).then(|| r.remove(0)))
    else {
        return Ok(PriceSeries::new(symbol, Vec::new()));
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let bars = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = pick(&quote.close, i)?;
            let date = DateTime::<Utc>::from_timestamp(ts + offset, 0)?.date_naive();
            Some(PriceBar {
                date,
                open: pick(&quote.open, i).unwrap_or(close),
                high: pick(&quote.high, i).unwrap_or(close),
                low: pick(&quote.low, i).unwrap_or(close),
                close,
            })
        })
        .collect();

    Ok(PriceSeries::new(symbol, bars))
}
