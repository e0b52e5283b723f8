use crate::analyzer::decision::currency_gap;
use crate::analyzer::MarketIndicators;
use crate::model::{AnalysisError, ChannelKey, Report};
use crate::reports::{build_report, RunContext, SNAPSHOT_MIN_BARS};
use crate::utils::format_number;

pub const DOLLAR_INDEX: &str = "DX=F";
pub const USD_KRW: &str = "USDKRW=X";

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Fair USD/KRW rate implied by the dollar index and the gap to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyAnalysis {
    pub index: f64,
    pub index_median: f64,
    pub index_gap: f64,
    pub index_gap_mean: f64,
    pub krw: f64,
    pub krw_median: f64,
    /// 0.0 when the index median is degenerate.
    pub fair_krw: f64,
    pub krw_gap: f64,
}

pub fn currency_analysis(index: &[f64], krw: &[f64]) -> Result<CurrencyAnalysis, AnalysisError> {
    for series in [index, krw] {
        if series.len() < SNAPSHOT_MIN_BARS {
            return Err(AnalysisError::InsufficientData {
                required: SNAPSHOT_MIN_BARS,
                available: series.len(),
            });
        }
    }
    let today_index = round_to(index[index.len() - 1], 2);
    let index_median = round_to(
        MarketIndicators::median(index).ok_or(AnalysisError::Degenerate("dollar index median"))?,
        2,
    );
    let krw_median = round_to(
        MarketIndicators::median(krw).ok_or(AnalysisError::Degenerate("USD/KRW median"))?,
        2,
    );

    let index_gap = round_to(MarketIndicators::gap_ratio(today_index, index_median), 2);
    let index_gap_mean = round_to(MarketIndicators::mean_gap_ratio(index, index_median), 2);

    let fair_krw = if index_median != 0.0 && index_median.is_finite() {
        round_to(krw_median * (today_index / index_median), 2)
    } else {
        0.0
    };
    let current_krw = krw[krw.len() - 1];
    let krw_gap = if fair_krw > 0.0 {
        round_to(MarketIndicators::gap_ratio(current_krw, fair_krw), 1)
    } else {
        0.0
    };

    Ok(CurrencyAnalysis {
        index: today_index,
        index_median,
        index_gap,
        index_gap_mean,
        krw: current_krw,
        krw_median,
        fair_krw,
        krw_gap,
    })
}

pub fn format_report(a: &CurrencyAnalysis) -> String {
    if a.fair_krw <= 0.0 {
        return format!(
            "💱 *Dollar Currency Report*\n\
             \x20   ⚠️ Fair USD/KRW rate could not be calculated\n\
             \x20   - USD Index: {:.2}\n\
             \x20   - USD Index median: {:.2}\n\
             \x20   - USD/KRW: {} KRW",
            a.index,
            a.index_median,
            format_number(a.krw, 2),
        );
    }
    let verdict = currency_gap().evaluate(a.krw_gap);
    let decision = match verdict.decision {
        Some(decision) => format!("*{}* ({})", decision, verdict.label),
        None => verdict.label.to_string(),
    };
    format!(
        "💱 *Dollar Currency Report*\n\
         \x20   - USD Index: {:.2}\n\
         \x20   - USD Index median: {:.2}\n\
         \x20   - USD Index gap: {:+.2}% (1y mean {:+.2}%)\n\
         \x20   - USD/KRW: {} KRW\n\
         \x20   - *Fair* USD/KRW: {} KRW\n\
         \x20   - *Rate gap*: {:.1}%\n\
         {} *Decision*: {}",
        a.index,
        a.index_median,
        a.index_gap,
        a.index_gap_mean,
        format_number(a.krw, 2),
        format_number(a.fair_krw, 2),
        a.krw_gap,
        verdict.emoji,
        decision,
    )
}

pub fn format_summary(a: &CurrencyAnalysis) -> String {
    if a.fair_krw <= 0.0 {
        return format!("Dollar: {} KRW | analysis error ♦️", format_number(a.krw, 0));
    }
    let verdict = currency_gap().evaluate(a.krw_gap);
    format!(
        "Dollar: {} KRW ({:+.1}%) | {}",
        format_number(a.krw, 0),
        a.krw_gap,
        verdict.headline()
    )
}

pub async fn analyze(ctx: &RunContext<'_>) -> Result<Report, AnalysisError> {
    let index = ctx.load(DOLLAR_INDEX, ctx.since(365)).await?;
    ctx.pause().await;
    let krw = ctx.load(USD_KRW, ctx.since(365)).await?;
    let analysis = currency_analysis(&index.closes(), &krw.closes())?;
    Ok(build_report(
        ChannelKey::Currency,
        format_report(&analysis),
        format_summary(&analysis),
    ))
}
