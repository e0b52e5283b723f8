use crate::analyzer::decision::{
    commodity_sentiment, dollar_impact, inflation_signal, weekly_trend, weighted_composite,
    COPPER_WEIGHT, OIL_WEIGHT, WHEAT_WEIGHT,
};
use crate::analyzer::MarketIndicators;
use crate::fetcher::FetchRange;
use crate::model::{AnalysisError, ChannelKey, PriceSeries, Report};
use crate::reports::{build_report, instrument_failure, window_change, RunContext, Snapshot};
use crate::utils::format_number;
use tracing::warn;

pub const MARKET_PROXY: &str = "DJP";
pub const DOLLAR_INDEX: &str = "DX=F";
pub const GOLD: &str = "GC=F";
pub const OIL: &str = "CL=F";
pub const COPPER: &str = "HG=F";
pub const WHEAT: &str = "ZW=F";

pub const MA_WINDOW: usize = 20;
pub const INFLATION_DAYS: i64 = 30;

/// (symbol, name, emoji)
pub const COMMODITIES: [(&str, &str, &str); 4] = [
    (GOLD, "Gold", "🥇"),
    (OIL, "WTI Crude", "🛢️"),
    (COPPER, "Copper", "🔶"),
    (WHEAT, "Wheat", "🌾"),
];

/// First-to-last change of a short series.
fn span_change(series: &PriceSeries) -> Option<(f64, f64)> {
    let first = series.first_close()?;
    let last = series.last_close()?;
    Some((last, MarketIndicators::percent_change(first, last)))
}

pub fn format_market_sentiment(proxy: Option<&PriceSeries>) -> String {
    match proxy.and_then(span_change) {
        Some((_, change)) => {
            let verdict = commodity_sentiment().evaluate(change);
            format!(
                "🌍 *Commodity market*: {} {} ({:+.1}%)",
                verdict.emoji, verdict.label, change
            )
        }
        None => "🌍 *Commodity market*: no data".to_string(),
    }
}

pub fn format_dollar_impact(dollar: Option<&PriceSeries>) -> String {
    match dollar.and_then(span_change) {
        Some((level, change)) => {
            let verdict = dollar_impact().evaluate(change);
            format!(
                "💵 *DXY impact*: {} {} (DXY: {:.1}, {:+.1}%)",
                verdict.emoji, verdict.label, level, change
            )
        }
        None => "💵 *DXY impact*: no data".to_string(),
    }
}

fn ma_position(price: f64, closes: &[f64]) -> String {
    match MarketIndicators::latest_rolling_mean(closes, MA_WINDOW) {
        Ok(ma) if price > ma => format!("🟢 above {MA_WINDOW}-day line (${})", format_number(ma, 2)),
        Ok(ma) => format!("🔴 below {MA_WINDOW}-day line (${})", format_number(ma, 2)),
        Err(_) => "⚫ n/a".to_string(),
    }
}

pub fn format_commodity(name: &str, emoji: &str, series: &PriceSeries) -> Result<String, AnalysisError> {
    let snap = Snapshot::from_series(series)?;
    let trend = weekly_trend().evaluate(snap.change_7d());
    Ok(format!(
        "{emoji} *{name}* {}\n\
         💰 Price: ${}\n\
         - Change: 1D {:+.1}% | 7D {:+.1}% | 30D {:+.1}% | 1Y {:+.1}%\n\
         - From 52w high: {:+.1}%\n\
         - 20MA: {}\n\
         - 52w range: ${} - ${}",
        trend.emoji,
        format_number(snap.current, 2),
        snap.change_1d(),
        snap.change_7d(),
        snap.change_30d(),
        snap.change_1y(),
        snap.from_high(),
        ma_position(snap.current, &series.closes()),
        format_number(snap.low_52w, 2),
        format_number(snap.high_52w, 2),
    ))
}

/// Inflation reading from the weighted 30-day moves of oil, copper and wheat.
pub fn format_inflation(
    oil: Option<&PriceSeries>,
    copper: Option<&PriceSeries>,
    wheat: Option<&PriceSeries>,
) -> String {
    let legs = [
        (oil, OIL_WEIGHT, "🛢️ Oil"),
        (copper, COPPER_WEIGHT, "🔶 Copper"),
        (wheat, WHEAT_WEIGHT, "🌾 Wheat"),
    ];
    let mut weighted = Vec::new();
    let mut details = Vec::new();
    for (series, weight, label) in legs {
        if let Some(change) = series.and_then(|s| window_change(s, INFLATION_DAYS).ok()) {
            weighted.push((change, weight));
            details.push(format!("{label}: {change:+.1}%"));
        }
    }
    let Some(composite) = weighted_composite(&weighted) else {
        return "⚠️ *Inflation signal*: no data".to_string();
    };
    let verdict = inflation_signal().evaluate(composite);
    format!(
        "{} *Inflation signal* ({INFLATION_DAYS} days)\n{}\n📊 Weighted mean: {:+.1}% | {}",
        verdict.emoji,
        verdict.label,
        composite,
        details.join(" | ")
    )
}

pub fn format_summary(gold: Option<&Snapshot>) -> String {
    match gold {
        Some(snap) => {
            let change = snap.change_7d();
            let arrow = if change >= 0.0 { "📈" } else { "📉" };
            format!("Commodities: Gold ${:.0} ({:+.1}% {})", snap.current, change, arrow)
        }
        None => "Commodities: not enough data".to_string(),
    }
}

pub async fn analyze(ctx: &RunContext<'_>) -> Result<Report, AnalysisError> {
    let mut sections = vec!["🏗️ *Commodities Report* 🏗️".to_string()];

    let proxy = ctx.load(MARKET_PROXY, FetchRange::days(30)).await;
    if let Err(e) = &proxy {
        warn!("⚠️ Commodity market proxy unavailable: {}", e);
    }
    sections.push(format_market_sentiment(proxy.as_ref().ok()));

    ctx.pause().await;
    let dollar = ctx.load(DOLLAR_INDEX, FetchRange::days(7)).await;
    if let Err(e) = &dollar {
        warn!("⚠️ Dollar index unavailable: {}", e);
    }
    sections.push(format_dollar_impact(dollar.as_ref().ok()));

    let mut loaded: Vec<(&str, Option<PriceSeries>)> = Vec::new();
    let mut analysed = 0usize;
    for (symbol, name, emoji) in COMMODITIES.iter() {
        ctx.pause().await;
        let series = match ctx.load(symbol, FetchRange::days(365)).await {
            Ok(series) => series,
            Err(e) => {
                warn!("⚠️ {} skipped: {}", name, e);
                sections.push(instrument_failure(name, &e));
                loaded.push((*symbol, None));
                continue;
            }
        };
        match format_commodity(name, emoji, &series) {
            Ok(text) => {
                analysed += 1;
                sections.push(text);
            }
            Err(e) => {
                warn!("⚠️ {} skipped: {}", name, e);
                sections.push(instrument_failure(name, &e));
            }
        }
        loaded.push((*symbol, Some(series)));
    }
    if analysed == 0 {
        return Err(AnalysisError::DataUnavailable("every commodity".into()));
    }

    let series_of = |symbol: &str| {
        loaded
            .iter()
            .find(|(s, _)| *s == symbol)
            .and_then(|(_, series)| series.as_ref())
    };
    sections.push(format_inflation(series_of(OIL), series_of(COPPER), series_of(WHEAT)));

    let gold = series_of(GOLD).and_then(|s| Snapshot::from_series(s).ok());
    Ok(build_report(
        ChannelKey::Commodities,
        sections.join("\n\n"),
        format_summary(gold.as_ref()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::testing::MemoryLoader;
    use crate::reports::testing::*;

    #[tokio::test]
    async fn full_report() {
        let loader = MemoryLoader::new(today())
            .with_closes(MARKET_PROXY, &ramp(60, 20.0, 0.1))
            .with_closes(DOLLAR_INDEX, &vec![100.0; 60])
            .with_closes(GOLD, &ramp(60, 2000.0, 5.0))
            .with_closes(OIL, &ramp(60, 80.0, -0.5))
            .with_closes(WHEAT, &vec![550.0; 60]);
        let sentiment = sentiment();
        let report = analyze(&ctx(&loader, &sentiment)).await.unwrap();
        let body = &report.body;

        assert!(body.starts_with("🏗️ *Commodities Report* 🏗️"));
        // 30 calendar days of the proxy: 22.9 → 25.9
        assert!(body.contains("🌍 *Commodity market*: 🟢 Strong"), "{body}");
        assert!(body.contains("💵 *DXY impact*: 🟡 Stable dollar → neutral impact (DXY: 100.0, +0.0%)"));
        assert!(body.contains("🥇 *Gold* 📈"));
        assert!(body.contains("- 20MA: 🟢 above 20-day line"));
        assert!(body.contains("🛢️ *WTI Crude* 💥"));
        assert!(body.contains("⚠️ Copper: Could not fetch data for HG=F"));
        assert!(body.contains("🌾 *Wheat* 📉"));
        assert!(body.contains("*Inflation signal* (30 days)"));
        assert!(!body.contains("🔶 Copper:"));
        assert_eq!(report.summary, "Commodities: Gold $2295 (+1.5% 📈)");
    }

    #[test]
    fn short_history_has_no_moving_average() {
        let series = PriceSeries::from_closes(GOLD, today(), &ramp(12, 100.0, 1.0));
        let text = format_commodity("Gold", "🥇", &series).unwrap();
        assert!(text.contains("- 20MA: ⚫ n/a"));
    }

    #[test]
    fn oil_spike_signals_inflation() {
        let mut oil = vec![70.0; 40];
        oil.extend([80.0, 90.0]);
        let oil = PriceSeries::from_closes(OIL, today(), &oil);
        let text = format_inflation(Some(&oil), None, None);
        assert!(text.starts_with("🔥 *Inflation signal*"), "{text}");
        assert!(text.contains("🛢️ Oil: +28.6%"));
    }

    #[test]
    fn missing_inputs_degrade_to_placeholders() {
        assert_eq!(format_market_sentiment(None), "🌍 *Commodity market*: no data");
        assert_eq!(format_dollar_impact(None), "💵 *DXY impact*: no data");
        assert_eq!(
            format_inflation(None, None, None),
            "⚠️ *Inflation signal*: no data"
        );
        assert_eq!(format_summary(None), "Commodities: not enough data");
    }

    #[tokio::test]
    async fn no_commodity_data_fails() {
        let loader = MemoryLoader::new(today());
        let sentiment = sentiment();
        let err = analyze(&ctx(&loader, &sentiment)).await.unwrap_err();
        assert_eq!(err, AnalysisError::DataUnavailable("every commodity".into()));
    }
}
