use crate::analyzer::decision::{crypto_fear_greed_decision, direction, rsi_status};
use crate::analyzer::MarketIndicators;
use crate::fetcher::sentiment::CryptoFearGreed;
use crate::fetcher::FetchRange;
use crate::model::{AnalysisError, ChannelKey, PriceSeries, Report};
use crate::reports::{build_report, instrument_failure, RunContext, Snapshot};
use crate::utils::format_number;
use tracing::warn;

pub const RSI_PERIOD: usize = 14;

/// (symbol, name, emoji)
pub const ASSETS: [(&str, &str, &str); 3] = [
    ("BTC-USD", "Bitcoin", "₿"),
    ("ETH-USD", "Ethereum", "⟠"),
    ("SOL-USD", "Solana", "◎"),
];

fn classification_emoji(classification: &str) -> &'static str {
    match classification {
        "Extreme Fear" => "😱",
        "Fear" => "😰",
        "Greed" => "😎",
        "Extreme Greed" => "🤑",
        _ => "😐",
    }
}

pub fn format_index(index: &CryptoFearGreed) -> String {
    format!(
        "🔥 *Crypto Fear & Greed Index* {}\n- *Index*: {}/100 ({})",
        classification_emoji(&index.classification),
        index.value,
        index.classification
    )
}

pub fn format_asset(name: &str, emoji: &str, series: &PriceSeries) -> Result<String, AnalysisError> {
    let snap = Snapshot::from_series(series)?;
    let rsi = MarketIndicators::rsi(&series.closes(), RSI_PERIOD);
    let trend = direction().evaluate(snap.change_7d());
    let status = rsi_status().evaluate(rsi);
    Ok(format!(
        "{emoji} *{name}* {}\n\
         🪙 Price: ${}\n\
         - Change: 1D {:+.1}% | 7D {:+.1}% | 30D {:+.1}%\n\
         - From 52w high: {:+.1}%\n\
         - RSI({RSI_PERIOD}): {:.1} {}\n\
         - 52w range: ${} - ${}",
        trend.emoji,
        format_number(snap.current, 2),
        snap.change_1d(),
        snap.change_7d(),
        snap.change_30d(),
        snap.from_high(),
        rsi,
        status.label,
        format_number(snap.low_52w, 2),
        format_number(snap.high_52w, 2),
    )
    .trim_end()
    .to_string())
}

pub fn format_summary(index: Option<&CryptoFearGreed>, bitcoin: Option<&Snapshot>) -> String {
    let btc = match bitcoin {
        Some(snap) => format!(
            "BTC ${} (7D {:+.1}%)",
            format_number(snap.current, 0),
            snap.change_7d()
        ),
        None => "BTC N/A".to_string(),
    };
    match index {
        Some(index) => {
            let verdict = crypto_fear_greed_decision().evaluate(index.value as f64);
            format!(
                "Crypto: {} | FNG:{} | {} {}",
                btc,
                index.value,
                verdict.emoji,
                verdict.headline()
            )
        }
        None => format!("♦️ Crypto: {} | FNG:N/A | no data", btc),
    }
}

pub async fn analyze(ctx: &RunContext<'_>) -> Result<Report, AnalysisError> {
    let mut sections = Vec::new();

    let index = match ctx.sentiment.crypto_fear_greed().await {
        Ok(index) => {
            sections.push(format_index(&index));
            Some(index)
        }
        Err(e) => {
            warn!("⚠️ Crypto fear & greed unavailable: {}", e);
            None
        }
    };

    let mut bitcoin = None;
    let mut analysed = 0usize;
    for (i, (symbol, name, emoji)) in ASSETS.iter().enumerate() {
        if i > 0 {
            ctx.pause().await;
        }
        let outcome = match ctx.load(symbol, FetchRange::days(365)).await {
            Ok(series) => {
                if *symbol == "BTC-USD" {
                    bitcoin = Snapshot::from_series(&series).ok();
                }
                format_asset(name, emoji, &series)
            }
            Err(e) => Err(e),
        };
        match outcome {
            Ok(section) => {
                analysed += 1;
                sections.push(section);
            }
            Err(e) => {
                warn!("⚠️ {} skipped: {}", name, e);
                sections.push(instrument_failure(name, &e));
            }
        }
    }

    if analysed == 0 && index.is_none() {
        return Err(AnalysisError::DataUnavailable("every crypto source".into()));
    }

    Ok(build_report(
        ChannelKey::Crypto,
        sections.join("\n\n"),
        format_summary(index.as_ref(), bitcoin.as_ref()),
    ))
}
