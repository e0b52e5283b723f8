// Core structs: PriceBar, PriceSeries, Report and the error taxonomy
use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

/// Chronologically ordered daily bars for one symbol.
///
/// Construction sorts by date, keeps the last bar for a duplicated date and
/// drops bars whose close is not finite.
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub symbol: String,
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    pub fn new(symbol: impl Into<String>, mut bars: Vec<PriceBar>) -> Self {
        bars.retain(|b| b.close.is_finite());
        // stable sort keeps arrival order for equal dates
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol: symbol.into(),
            bars: deduped,
        }
    }

    pub fn from_closes(symbol: impl Into<String>, start: NaiveDate, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close,
                low: close,
                close,
            })
            .collect();
        Self::new(symbol, bars)
    }

    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn first_close(&self) -> Option<f64> {
        self.bars.first().map(|b| b.close)
    }

    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }

    /// Refuses the series when it holds fewer than `required` bars.
    pub fn require(&self, required: usize) -> Result<&Self, AnalysisError> {
        if self.bars.len() < required {
            return Err(AnalysisError::InsufficientData {
                required,
                available: self.bars.len(),
            });
        }
        Ok(self)
    }
}

/// One destination per asset class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKey {
    Currency,
    EquityIndex,
    FearGreed,
    Crypto,
    Bonds,
    Commodities,
    MaStage,
}

impl ChannelKey {
    pub const ALL: [ChannelKey; 7] = [
        ChannelKey::Currency,
        ChannelKey::EquityIndex,
        ChannelKey::FearGreed,
        ChannelKey::Crypto,
        ChannelKey::Bonds,
        ChannelKey::Commodities,
        ChannelKey::MaStage,
    ];

    /// Report title used in headers and failure placeholders.
    pub fn title(&self) -> &'static str {
        match self {
            ChannelKey::Currency => "Dollar Currency Report",
            ChannelKey::EquityIndex => "S&P500 Report",
            ChannelKey::FearGreed => "CNN Fear & Greed Report",
            ChannelKey::Crypto => "Crypto Report",
            ChannelKey::Bonds => "Bond Yield Report",
            ChannelKey::Commodities => "Commodities Report",
            ChannelKey::MaStage => "MA Stage Analysis",
        }
    }

    /// Prefix of the one-line digest entry.
    pub fn summary_label(&self) -> &'static str {
        match self {
            ChannelKey::Currency => "Dollar",
            ChannelKey::EquityIndex => "S&P500",
            ChannelKey::FearGreed => "Fear&Greed",
            ChannelKey::Crypto => "Crypto",
            ChannelKey::Bonds => "Bonds",
            ChannelKey::Commodities => "Commodities",
            ChannelKey::MaStage => "MA stage",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub channel: ChannelKey,
    pub body: String,
    pub summary: String,
}

/// What the driver receives from each analyzer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportOutcome {
    Ok(Report),
    Failed { channel: ChannelKey, reason: String },
}

impl ReportOutcome {
    pub fn channel(&self) -> ChannelKey {
        match self {
            ReportOutcome::Ok(report) => report.channel,
            ReportOutcome::Failed { channel, .. } => *channel,
        }
    }

    pub fn body(&self) -> String {
        match self {
            ReportOutcome::Ok(report) => report.body.clone(),
            ReportOutcome::Failed { channel, reason } => {
                format!("⚠️ *{}*\n{}", channel.title(), reason)
            }
        }
    }

    pub fn summary(&self) -> String {
        match self {
            ReportOutcome::Ok(report) => report.summary.clone(),
            ReportOutcome::Failed { channel, .. } => {
                format!("{}: analysis error", channel.summary_label())
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(String),
    #[error("request timed out")]
    Timeout,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Decode(String),
    #[error("no data returned for {0}")]
    Empty(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Http(e.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("api error: {0}")]
    Api(String),
    #[error("endpoint unreachable")]
    Unreachable,
    #[error("publishing disabled: {0}")]
    Disabled(&'static str),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AnalysisError {
    #[error("insufficient data: need {required} points, got {available}")]
    InsufficientData { required: usize, available: usize },
    #[error("degenerate input: {0}")]
    Degenerate(&'static str),
    #[error("data unavailable: {0}")]
    DataUnavailable(String),
    #[error("downstream unreachable: {0}")]
    Downstream(String),
}

impl From<FetchError> for AnalysisError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Empty(symbol) => AnalysisError::DataUnavailable(symbol),
            other => AnalysisError::Downstream(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn bar(d: u32, close: f64) -> PriceBar {
        PriceBar {
            date: day(d),
            open: close,
            high: close,
            low: close,
            close,
        }
    }

    #[test]
    fn series_sorts_dedups_and_drops_nan() {
        let series = PriceSeries::new(
            "X",
            vec![bar(3, 3.0), bar(1, 1.0), bar(2, f64::NAN), bar(3, 4.0)],
        );
        assert_eq!(series.closes(), vec![1.0, 4.0]);
        assert_eq!(series.latest_date(), Some(day(3)));
    }

    #[test]
    fn require_reports_shortfall() {
        let series = PriceSeries::from_closes("X", day(1), &[1.0, 2.0]);
        assert_eq!(
            series.require(5).unwrap_err(),
            AnalysisError::InsufficientData {
                required: 5,
                available: 2
            }
        );
        assert!(series.require(2).is_ok());
    }

    #[test]
    fn failed_outcome_renders_placeholders() {
        let outcome = ReportOutcome::Failed {
            channel: ChannelKey::Bonds,
            reason: "boom".into(),
        };
        assert_eq!(outcome.body(), "⚠️ *Bond Yield Report*\nboom");
        assert_eq!(outcome.summary(), "Bonds: analysis error");
    }
}
