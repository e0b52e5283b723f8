// Per-asset analyzers: fetch, compute, format one report and one digest line
pub mod bonds;
pub mod commodities;
pub mod crypto;
pub mod currency;
pub mod equity_index;
pub mod fear_greed;
pub mod ma_stage;

use crate::analyzer::MarketIndicators;
use crate::fetcher::{FetchRange, SentimentSource, SeriesLoader};
use crate::model::{AnalysisError, ChannelKey, PriceSeries, Report, ReportOutcome};
use chrono::{Duration as DateSpan, NaiveDate};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Run order of the analyzers.
pub const RUN_ORDER: [ChannelKey; 7] = [
    ChannelKey::Currency,
    ChannelKey::EquityIndex,
    ChannelKey::FearGreed,
    ChannelKey::Crypto,
    ChannelKey::Bonds,
    ChannelKey::Commodities,
    ChannelKey::MaStage,
];

/// Collaborators and settings shared by every analyzer of one run.
pub struct RunContext<'a> {
    pub loader: &'a dyn SeriesLoader,
    pub sentiment: &'a dyn SentimentSource,
    pub fetch_delay: Duration,
    pub today: NaiveDate,
}

impl RunContext<'_> {
    /// Explicit window from `days` ago through today.
    pub fn since(&self, days: i64) -> FetchRange {
        FetchRange::Between {
            start: self.today - DateSpan::days(days),
            end: self.today + DateSpan::days(1),
        }
    }

    /// Fetches `symbol`, treating an empty answer as unavailable data.
    pub async fn load(&self, symbol: &str, range: FetchRange) -> Result<PriceSeries, AnalysisError> {
        let series = self.loader.fetch(symbol, range).await?;
        if series.is_empty() {
            return Err(AnalysisError::DataUnavailable(symbol.to_string()));
        }
        Ok(series)
    }

    /// Courtesy delay between successive fetches of the same kind.
    pub async fn pause(&self) {
        if !self.fetch_delay.is_zero() {
            sleep(self.fetch_delay).await;
        }
    }
}

/// Runs the analyzer for `channel`, containing its failure.
pub async fn run(channel: ChannelKey, ctx: &RunContext<'_>) -> ReportOutcome {
    info!("▶️ Running {}", channel.title());
    let result = match channel {
        ChannelKey::Currency => currency::analyze(ctx).await,
        ChannelKey::EquityIndex => equity_index::analyze(ctx).await,
        ChannelKey::FearGreed => fear_greed::analyze(ctx).await,
        ChannelKey::Crypto => crypto::analyze(ctx).await,
        ChannelKey::Bonds => bonds::analyze(ctx).await,
        ChannelKey::Commodities => commodities::analyze(ctx).await,
        ChannelKey::MaStage => ma_stage::analyze(ctx).await,
    };
    match result {
        Ok(report) => {
            info!("✅ {} done", channel.title());
            ReportOutcome::Ok(report)
        }
        Err(e) => {
            warn!("❌ {} failed: {}", channel.title(), e);
            ReportOutcome::Failed {
                channel,
                reason: failure_reason(&e),
            }
        }
    }
}

/// User-facing placeholder text for a failed analysis.
pub fn failure_reason(err: &AnalysisError) -> String {
    match err {
        AnalysisError::InsufficientData { required, available } => {
            format!("Not enough data ({available} of {required} points)")
        }
        AnalysisError::DataUnavailable(what) => format!("Could not fetch data for {what}"),
        AnalysisError::Degenerate(what) => format!("Calculation error: {what}"),
        AnalysisError::Downstream(what) => format!("Exception handled: {what}"),
    }
}

/// Inline warning for one instrument inside a multi-instrument report.
pub fn instrument_failure(name: &str, err: &AnalysisError) -> String {
    format!("⚠️ {}: {}", name, failure_reason(err))
}

pub fn build_report(channel: ChannelKey, body: String, summary: String) -> Report {
    Report {
        channel,
        body,
        summary,
    }
}

/// Minimum bars for a per-instrument snapshot.
pub const SNAPSHOT_MIN_BARS: usize = 10;

/// Price level, period changes and 52-week range of one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub current: f64,
    pub prev_1d: f64,
    pub prev_7d: f64,
    pub prev_30d: f64,
    pub first: f64,
    pub low_52w: f64,
    pub high_52w: f64,
}

impl Snapshot {
    pub fn from_series(series: &PriceSeries) -> Result<Self, AnalysisError> {
        series.require(SNAPSHOT_MIN_BARS)?;
        let closes = series.closes();
        let current = series
            .last_close()
            .ok_or_else(|| AnalysisError::DataUnavailable(series.symbol.clone()))?;
        // a lookback past the start compares against the current value
        let back = |n: usize| {
            if closes.len() > n {
                closes[closes.len() - 1 - n]
            } else {
                current
            }
        };
        let (low_52w, high_52w) = MarketIndicators::extremum(&closes)
            .ok_or(AnalysisError::Degenerate("no finite close"))?;
        Ok(Self {
            current,
            prev_1d: back(1),
            prev_7d: back(7),
            prev_30d: back(30),
            first: series.first_close().unwrap_or(current),
            low_52w,
            high_52w,
        })
    }

    pub fn change_1d(&self) -> f64 {
        MarketIndicators::percent_change(self.prev_1d, self.current)
    }

    pub fn change_7d(&self) -> f64 {
        MarketIndicators::percent_change(self.prev_7d, self.current)
    }

    pub fn change_30d(&self) -> f64 {
        MarketIndicators::percent_change(self.prev_30d, self.current)
    }

    pub fn change_1y(&self) -> f64 {
        MarketIndicators::percent_change(self.first, self.current)
    }

    pub fn from_high(&self) -> f64 {
        MarketIndicators::gap_ratio(self.current, self.high_52w)
    }
}

/// Percent change across the bars of the last `days` calendar days.
pub fn window_change(series: &PriceSeries, days: i64) -> Result<f64, AnalysisError> {
    let latest = series
        .latest_date()
        .ok_or_else(|| AnalysisError::DataUnavailable(series.symbol.clone()))?;
    let cutoff = latest - DateSpan::days(days);
    let recent: Vec<f64> = series
        .bars()
        .iter()
        .filter(|b| b.date >= cutoff)
        .map(|b| b.close)
        .collect();
    if recent.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            available: recent.len(),
        });
    }
    Ok(MarketIndicators::percent_change(recent[0], recent[recent.len() - 1]))
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use crate::fetcher::sentiment::testing::FixedSentiment;
    use crate::fetcher::sentiment::{CnnFearGreed, CryptoFearGreed};
    use chrono::{NaiveDate, TimeZone, Utc};

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    pub fn sentiment() -> FixedSentiment {
        FixedSentiment {
            cnn: Some(CnnFearGreed {
                score: 20.0,
                rating: "extreme fear".into(),
                updated: Utc.with_ymd_and_hms(2025, 6, 10, 23, 59, 0).unwrap(),
            }),
            crypto: Some(CryptoFearGreed {
                value: 72,
                classification: "Greed".into(),
                updated: Utc.with_ymd_and_hms(2025, 6, 10, 0, 0, 0).unwrap(),
            }),
        }
    }

    pub fn ramp(len: usize, start: f64, step: f64) -> Vec<f64> {
        (0..len).map(|i| start + step * i as f64).collect()
    }

    pub fn ctx<'a>(loader: &'a dyn SeriesLoader, sentiment: &'a dyn SentimentSource) -> RunContext<'a> {
        RunContext {
            loader,
            sentiment,
            fetch_delay: Duration::ZERO,
            today: today(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use crate::fetcher::testing::{DownLoader, MemoryLoader};

    #[test]
    fn snapshot_changes() {
        let closes = ramp(40, 100.0, 1.0);
        let series = PriceSeries::from_closes("X", today(), &closes);
        let snap = Snapshot::from_series(&series).unwrap();
        assert_eq!(snap.current, 139.0);
        assert_eq!(snap.prev_7d, 132.0);
        assert_eq!(snap.prev_30d, 109.0);
        assert_eq!((snap.low_52w, snap.high_52w), (100.0, 139.0));
        assert_eq!(snap.from_high(), 0.0);
        assert!((snap.change_1y() - 39.0).abs() < 1e-9);
    }

    #[test]
    fn short_history_compares_against_current() {
        let series = PriceSeries::from_closes("X", today(), &ramp(12, 10.0, 1.0));
        let snap = Snapshot::from_series(&series).unwrap();
        assert_eq!(snap.change_30d(), 0.0);
        let tiny = PriceSeries::from_closes("X", today(), &ramp(5, 10.0, 1.0));
        assert!(matches!(
            Snapshot::from_series(&tiny),
            Err(AnalysisError::InsufficientData { required: 10, .. })
        ));
    }

    #[test]
    fn window_change_uses_calendar_days() {
        let series = PriceSeries::from_closes("X", today(), &ramp(60, 100.0, 1.0));
        // bars are daily, so the last 7 days span 8 bars: 152..=159
        let change = window_change(&series, 7).unwrap();
        assert!((change - (159.0 / 152.0 - 1.0) * 100.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_series_is_unavailable() {
        let loader = MemoryLoader::new(today());
        let sentiment = sentiment();
        let ctx = ctx(&loader, &sentiment);
        assert_eq!(
            ctx.load("NONE", FetchRange::days(30)).await.unwrap_err(),
            AnalysisError::DataUnavailable("NONE".into())
        );
    }

    #[tokio::test]
    async fn failing_loader_becomes_failed_outcome() {
        let sentiment = sentiment();
        let ctx = ctx(&DownLoader, &sentiment);
        let outcome = run(ChannelKey::MaStage, &ctx).await;
        match outcome {
            ReportOutcome::Failed { channel, reason } => {
                assert_eq!(channel, ChannelKey::MaStage);
                assert!(reason.starts_with("Exception handled"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
