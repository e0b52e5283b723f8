// Market data retrieval: price series and sentiment indices
pub mod sentiment;
pub mod yahoo;

use crate::model::{FetchError, PriceSeries};
use chrono::{Duration, NaiveDate};

pub use sentiment::{SentimentFetcher, SentimentSource};
pub use yahoo::YahooLoader;

/// Date window of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRange {
    /// The last `days` calendar days up to and including today.
    Period { days: i64 },
    /// Explicit `[start, end)` bounds.
    Between { start: NaiveDate, end: NaiveDate },
}

impl FetchRange {
    pub fn days(days: i64) -> Self {
        FetchRange::Period { days }
    }

    /// Resolves to `[start, end)` relative to `today`.
    pub fn bounds(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        match *self {
            FetchRange::Period { days } => (today - Duration::days(days), today + Duration::days(1)),
            FetchRange::Between { start, end } => (start, end),
        }
    }
}

/// Source of daily bars. Returning an empty series is not an error.
#[async_trait::async_trait]
pub trait SeriesLoader: Send + Sync {
    async fn fetch(&self, symbol: &str, range: FetchRange) -> Result<PriceSeries, FetchError>;
}
