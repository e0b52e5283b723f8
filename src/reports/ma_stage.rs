use crate::analyzer::cross::{scan_ma_crosses, MaTriple, PairCross};
use crate::analyzer::{MarketIndicators, Stage};
use crate::fetcher::FetchRange;
use crate::model::{AnalysisError, ChannelKey, Report};
use crate::reports::{build_report, RunContext};
use crate::utils::format_number;
use tracing::info;

pub const SYMBOL: &str = "^GSPC";
pub const PERIODS: (usize, usize, usize) = (5, 20, 40);
pub const CROSS_LOOKBACK: usize = 3;

/// Stage reading of the three moving averages at the latest bar.
#[derive(Debug, Clone, PartialEq)]
pub struct StageAnalysis {
    pub price: f64,
    pub short: f64,
    pub medium: f64,
    pub long: f64,
    pub stage: Stage,
    pub crosses: Vec<PairCross>,
}

fn latest(series: &[Option<f64>]) -> Result<f64, AnalysisError> {
    series
        .last()
        .copied()
        .flatten()
        .ok_or(AnalysisError::Degenerate("moving average undefined"))
}

pub fn stage_analysis(closes: &[f64]) -> Result<StageAnalysis, AnalysisError> {
    let (p_short, p_medium, p_long) = PERIODS;
    if closes.len() < p_long {
        return Err(AnalysisError::InsufficientData {
            required: p_long,
            available: closes.len(),
        });
    }
    let short = MarketIndicators::rolling_mean(closes, p_short);
    let medium = MarketIndicators::rolling_mean(closes, p_medium);
    let long = MarketIndicators::rolling_mean(closes, p_long);

    let (s, m, l) = (latest(&short)?, latest(&medium)?, latest(&long)?);
    let price = closes[closes.len() - 1];

    let crosses = scan_ma_crosses(
        &MaTriple {
            periods: PERIODS,
            short: &short,
            medium: &medium,
            long: &long,
        },
        CROSS_LOOKBACK,
    );

    Ok(StageAnalysis {
        price,
        short: s,
        medium: m,
        long: l,
        stage: Stage::classify(s, m, l),
        crosses,
    })
}

pub fn format_report(a: &StageAnalysis) -> String {
    let text = a.stage.interpretation();
    let (p_short, p_medium, p_long) = PERIODS;
    let mut report = format!(
        "📈 *MA Stage Analysis* 📈\n\
         - *Price*: {}\n\
         - *{}-day MA*: {}\n\
         - *{}-day MA*: {}\n\
         - *{}-day MA*: {}\n\n\
         🎯 *{}*\n{}\n{}\n\n\
         💡 *Strategy*: {}",
        format_number(a.price, 2),
        p_short,
        format_number(a.short, 2),
        p_medium,
        format_number(a.medium, 2),
        p_long,
        format_number(a.long, 2),
        text.name,
        text.trend,
        text.psychology,
        text.strategy,
    );
    if !a.crosses.is_empty() {
        let events: Vec<String> = a.crosses.iter().map(PairCross::describe).collect();
        report.push_str(&format!("\n📊 *Recent crosses*: {}", events.join(" | ")));
    }
    report
}

pub async fn analyze(ctx: &RunContext<'_>) -> Result<Report, AnalysisError> {
    let series = ctx.load(SYMBOL, FetchRange::days(365)).await?;
    let analysis = stage_analysis(&series.closes())?;
    match analysis.stage.number() {
        Some(n) => info!("🎯 {} is in stage {}", SYMBOL, n),
        None => info!("🎯 {} has no clear stage", SYMBOL),
    }
    let text = analysis.stage.interpretation();
    let summary = format!("MA stage: {} | {}", text.name, text.strategy);
    Ok(build_report(ChannelKey::MaStage, format_report(&analysis), summary))
}
