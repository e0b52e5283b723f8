use crate::analyzer::decision::{cnn_trading_band, fear_greed_mood, CNN_BUY_SCORE, CNN_SELL_SCORE};
use crate::fetcher::sentiment::CnnFearGreed;
use crate::model::{AnalysisError, ChannelKey, Report};
use crate::reports::{build_report, RunContext};

pub fn format_report(index: &CnnFearGreed) -> String {
    let mood = fear_greed_mood().evaluate(index.score);
    let band = cnn_trading_band().evaluate(index.score);
    format!(
        "🍅 *CNN Fear & Greed Report*\n\
         \x20   - Updated: {} UTC\n\
         \x20   - Index: {} {}\n\
         \x20   - Status: *{}*\n\
         \x20   - Bucket: {} → {}\n\
         \x20   - *Buy* below: {}\n\
         \x20   - *Sell* above: {}\n\
         {} *Decision*: *{}* ({})",
        index.updated.format("%Y-%m-%d %H:%M:%S"),
        index.score,
        mood.emoji,
        index.rating.to_uppercase(),
        mood.label,
        mood.headline(),
        CNN_BUY_SCORE,
        CNN_SELL_SCORE,
        band.emoji,
        band.headline(),
        band.label,
    )
}

pub fn format_summary(index: &CnnFearGreed) -> String {
    let band = cnn_trading_band().evaluate(index.score);
    format!(
        "Fear&Greed: {} ({}) | {}",
        index.score,
        index.rating.to_uppercase(),
        band.headline()
    )
}

pub async fn analyze(ctx: &RunContext<'_>) -> Result<Report, AnalysisError> {
    let index = ctx.sentiment.cnn_fear_greed().await?;
    if !index.score.is_finite() {
        return Err(AnalysisError::Degenerate("fear & greed score is not a number"));
    }
    Ok(build_report(
        ChannelKey::FearGreed,
        format_report(&index),
        format_summary(&index),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::sentiment::testing::FixedSentiment;
    use crate::fetcher::testing::MemoryLoader;
    use crate::reports::testing::*;

    #[tokio::test]
    async fn extreme_fear_is_a_buy() {
        let loader = MemoryLoader::new(today());
        let sentiment = sentiment();
        let report = analyze(&ctx(&loader, &sentiment)).await.unwrap();
        assert!(report.body.contains("Index: 20 😱"), "{}", report.body);
        assert!(report.body.contains("Extreme Fear → Buy"));
        assert!(report.body.contains("🟢 *Decision*: *Buy*"));
        assert_eq!(report.summary, "Fear&Greed: 20 (EXTREME FEAR) | Buy");
    }

    #[test]
    fn extreme_greed_is_a_sell() {
        let mut index = sentiment().cnn.unwrap();
        index.score = 90.0;
        index.rating = "extreme greed".into();
        let body = format_report(&index);
        assert!(body.contains("🤑"));
        assert!(body.contains("Extreme Greed → Sell"));
        assert_eq!(format_summary(&index), "Fear&Greed: 90 (EXTREME GREED) | Sell");
    }

    #[tokio::test]
    async fn unreachable_source_fails() {
        let loader = MemoryLoader::new(today());
        let sentiment = FixedSentiment {
            cnn: None,
            crypto: None,
        };
        let err = analyze(&ctx(&loader, &sentiment)).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Downstream(_)));
    }
}
