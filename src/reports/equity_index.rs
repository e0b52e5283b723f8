use crate::analyzer::cross::{latest_cross, CrossEvent, CrossKind};
use crate::analyzer::decision::ma200_deviation;
use crate::analyzer::support::{self, SupportReading};
use crate::analyzer::MarketIndicators;
use crate::fetcher::FetchRange;
use crate::model::{AnalysisError, ChannelKey, PriceSeries, Report};
use crate::reports::{build_report, RunContext};
use crate::utils::format_number;

pub const SYMBOL: &str = "^GSPC";
pub const LONG_WINDOW: usize = 200;
pub const FAST_WINDOW: usize = 50;
pub const CROSS_LOOKBACK: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendAnalysis {
    pub price: f64,
    pub ma200: f64,
    pub deviation_pct: f64,
    pub support: Option<SupportReading>,
    /// Latest 50/200 crossing and how many bars ago it happened.
    pub cross: Option<(CrossEvent, usize)>,
}

pub fn trend_analysis(closes: &[f64]) -> Result<TrendAnalysis, AnalysisError> {
    let ma200 = MarketIndicators::tail_mean(closes, LONG_WINDOW)?;
    let price = closes[closes.len() - 1];
    let deviation_pct = MarketIndicators::gap_ratio(price, ma200);

    let window = &closes[closes.len().saturating_sub(support::DEFAULT_WINDOW)..];
    let support = support::estimate(price, ma200, window).ok();

    let fast = MarketIndicators::rolling_mean(closes, FAST_WINDOW);
    let slow = MarketIndicators::rolling_mean(closes, LONG_WINDOW);
    let cross = latest_cross(&fast, &slow, CROSS_LOOKBACK)
        .map(|event| (event, closes.len() - 1 - event.index));

    Ok(TrendAnalysis {
        price,
        ma200,
        deviation_pct,
        support,
        cross,
    })
}

fn describe_cross(cross: Option<(CrossEvent, usize)>) -> String {
    match cross {
        Some((event, ago)) => {
            let label = match event.kind {
                CrossKind::Golden => "🌟 Golden cross",
                CrossKind::Death => "💀 Death cross",
            };
            match ago {
                0 => format!("{label} today"),
                1 => format!("{label} 1 bar ago"),
                n => format!("{label} {n} bars ago"),
            }
        }
        None => format!("none in the last {CROSS_LOOKBACK} bars"),
    }
}

pub fn format_report(a: &TrendAnalysis, as_of: &str) -> String {
    let verdict = ma200_deviation().evaluate(a.deviation_pct);
    let direction = if a.deviation_pct > 0.0 { "above" } else { "below" };
    let decision = verdict.headline();
    let support = a
        .support
        .as_ref()
        .map(SupportReading::describe)
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "🦖 *S&P500 Report*\n\
         \x20   - Price: {}\n\
         \x20   - 200-day MA: {}\n\
         \x20   - Deviation: {:+.1}%\n\
         \x20   - As of: {}\n\
         \x20   - 200MA support: {}\n\
         \x20   - 50/200 cross: {}\n\
         {} *Decision*: *{}* - {} ({:.1}% {})",
        format_number(a.price, 2),
        format_number(a.ma200, 2),
        a.deviation_pct,
        as_of,
        support,
        describe_cross(a.cross),
        verdict.emoji,
        decision,
        verdict.label,
        a.deviation_pct.abs(),
        direction,
    )
}

fn latest_label(series: &PriceSeries) -> String {
    series
        .latest_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

pub async fn analyze(ctx: &RunContext<'_>) -> Result<Report, AnalysisError> {
    let series = ctx.load(SYMBOL, FetchRange::days(300)).await?;
    series.require(LONG_WINDOW)?;
    let analysis = trend_analysis(&series.closes())?;
    let verdict = ma200_deviation().evaluate(analysis.deviation_pct);
    let summary = format!(
        "S&P500: {} ({:+.1}% vs 200MA) | {}",
        format_number(analysis.price, 0),
        analysis.deviation_pct,
        verdict.headline()
    );
    Ok(build_report(
        ChannelKey::EquityIndex,
        format_report(&analysis, &latest_label(&series)),
        summary,
    ))
}
