use crate::analyzer::decision::{bond_yield_level, bond_yield_trend, policy_hint, yield_curve_spread};
use crate::fetcher::FetchRange;
use crate::model::{AnalysisError, ChannelKey, PriceSeries, Report};
use crate::reports::{build_report, instrument_failure, RunContext, Snapshot};
use chrono::Duration;
use tracing::warn;

pub const TEN_YEAR: &str = "^TNX";
pub const FIVE_YEAR: &str = "^FVX";

/// (symbol, name, emoji)
pub const BONDS: [(&str, &str, &str); 4] = [
    (TEN_YEAR, "US 10Y Treasury", "🇺🇸"),
    (FIVE_YEAR, "US 5Y Treasury", "🇺🇸"),
    ("^IRX", "US 3M Treasury", "🇺🇸"),
    ("^TYX", "US 30Y Treasury", "🇺🇸"),
];

/// Yield change in basis points.
fn bp(from: f64, to: f64) -> f64 {
    (to - from) * 100.0
}

pub fn format_bond(name: &str, emoji: &str, series: &PriceSeries) -> Result<String, AnalysisError> {
    let snap = Snapshot::from_series(series)?;
    let level = bond_yield_level().evaluate(snap.current);
    let trend = bond_yield_trend().evaluate(bp(snap.prev_7d, snap.current));
    Ok(format!(
        "{emoji} *{name}* {}\n\
         - Yield: {:.2}% {} ({})\n\
         - Change (bp): 1D {:+.0} | 7D {:+.0} | 30D {:+.0} | 1Y {:+.0}\n\
         - 52w range: {:.2}% - {:.2}%",
        trend.emoji,
        snap.current,
        level.emoji,
        level.label,
        bp(snap.prev_1d, snap.current),
        bp(snap.prev_7d, snap.current),
        bp(snap.prev_30d, snap.current),
        bp(snap.first, snap.current),
        snap.low_52w,
        snap.high_52w,
    ))
}

/// 10Y minus 5Y spread in percentage points.
pub fn format_spread(ten: &PriceSeries, five: &PriceSeries) -> Option<String> {
    let spread = ten.last_close()? - five.last_close()?;
    let verdict = yield_curve_spread().evaluate(spread);
    Some(format!(
        "📊 10Y-5Y spread: {:.2}%p {} {}",
        spread, verdict.emoji, verdict.label
    ))
}

/// Policy hint from the 10Y move over the last week.
pub fn format_policy_hint(ten: &PriceSeries) -> Option<String> {
    let latest = ten.latest_date()?;
    let cutoff = latest - Duration::days(7);
    let week: Vec<f64> = ten
        .bars()
        .iter()
        .filter(|b| b.date >= cutoff)
        .map(|b| b.close)
        .collect();
    let (first, last) = (week.first()?, week.last()?);
    let verdict = policy_hint().evaluate(last - first);
    Some(format!("{} {}", verdict.emoji, verdict.label))
}

pub async fn analyze(ctx: &RunContext<'_>) -> Result<Report, AnalysisError> {
    let mut loaded: Vec<(&str, Result<PriceSeries, AnalysisError>)> = Vec::new();
    for (i, (symbol, _, _)) in BONDS.iter().enumerate() {
        if i > 0 {
            ctx.pause().await;
        }
        loaded.push((*symbol, ctx.load(symbol, FetchRange::days(365)).await));
    }
    let series_of = |symbol: &str| {
        loaded
            .iter()
            .find(|(s, _)| *s == symbol)
            .and_then(|(_, r)| r.as_ref().ok())
    };

    let mut sections = vec!["📊 *Bond Yield Report* 📊".to_string()];
    let spread = match (series_of(TEN_YEAR), series_of(FIVE_YEAR)) {
        (Some(ten), Some(five)) => format_spread(ten, five),
        _ => None,
    };
    sections.push(spread.unwrap_or_else(|| "⚠️ Yield curve data unavailable".to_string()));

    let mut analysed = 0usize;
    for ((_, name, emoji), (_, result)) in BONDS.iter().zip(&loaded) {
        let section = match result {
            Ok(series) => format_bond(name, emoji, series),
            Err(e) => Err(e.clone()),
        };
        match section {
            Ok(text) => {
                analysed += 1;
                sections.push(text);
            }
            Err(e) => {
                warn!("⚠️ {} skipped: {}", name, e);
                sections.push(instrument_failure(name, &e));
            }
        }
    }
    if analysed == 0 {
        return Err(AnalysisError::DataUnavailable("every bond yield".into()));
    }

    if let Some(hint) = series_of(TEN_YEAR).and_then(format_policy_hint) {
        sections.push(hint);
    }

    let summary = match series_of(TEN_YEAR).and_then(PriceSeries::last_close) {
        Some(ten) => format!("Bonds: 10Y {:.2}%", ten),
        None => "Bonds: yield analysis error ♦️".to_string(),
    };
    Ok(build_report(ChannelKey::Bonds, sections.join("\n\n"), summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::MemoryLoader;
    use crate::reports::testing::*;

    fn loader() -> MemoryLoader {
        MemoryLoader::new(today())
            .with_closes(TEN_YEAR, &ramp(40, 4.00, 0.01))
            .with_closes(FIVE_YEAR, &vec![4.20; 40])
            .with_closes("^IRX", &vec![5.10; 40])
            .with_closes("^TYX", &ramp(40, 4.80, -0.02))
    }

    #[tokio::test]
    async fn full_report() {
        let loader = loader();
        let sentiment = sentiment();
        let report = analyze(&ctx(&loader, &sentiment)).await.unwrap();
        let body = &report.body;

        assert!(body.starts_with("📊 *Bond Yield Report* 📊"));
        // 4.39 - 4.20
        assert!(body.contains("10Y-5Y spread: 0.19%p 🟡 Flattening"), "{body}");
        assert!(body.contains("🇺🇸 *US 3M Treasury* ➡️\n- Yield: 5.10% 🔴 (high)"));
        assert!(body.contains("*US 30Y Treasury* ⬇️"));
        assert!(body.contains("Yields stable"));
        assert_eq!(report.summary, "Bonds: 10Y 4.39%");
    }

    #[test]
    fn inverted_curve() {
        let today = today();
        let ten = PriceSeries::from_closes(TEN_YEAR, today, &[4.0]);
        let five = PriceSeries::from_closes(FIVE_YEAR, today, &[4.3]);
        assert_eq!(
            format_spread(&ten, &five).unwrap(),
            "📊 10Y-5Y spread: -0.30%p 🔴 Inverted"
        );
    }

    #[test]
    fn weekly_jump_hints_at_tightening() {
        let mut closes = vec![4.0; 20];
        closes.extend([4.1, 4.2, 4.3]);
        let ten = PriceSeries::from_closes(TEN_YEAR, today(), &closes);
        assert!(format_policy_hint(&ten).unwrap().contains("tightening"));
    }

    #[tokio::test]
    async fn no_bond_data_fails() {
        let loader = MemoryLoader::new(today());
        let sentiment = sentiment();
        assert!(analyze(&ctx(&loader, &sentiment)).await.is_err());
    }
}
