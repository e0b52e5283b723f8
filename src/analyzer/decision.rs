// Scalar-to-decision mappings. Each table is evaluated top-down and the
// first matching rule wins.
use std::fmt;

/// Comparison of the input against a fixed cutoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    Below(f64),
    AtMost(f64),
    Above(f64),
    AtLeast(f64),
    /// `|x| < cutoff`
    WithinAbs(f64),
}

impl Rule {
    pub fn matches(&self, x: f64) -> bool {
        match *self {
            Rule::Below(c) => x < c,
            Rule::AtMost(c) => x <= c,
            Rule::Above(c) => x > c,
            Rule::AtLeast(c) => x >= c,
            Rule::WithinAbs(c) => x.abs() < c,
        }
    }
}

/// Ordered `(rule, outcome)` list with a fallback for inputs no rule
/// matches, NaN included.
#[derive(Debug, Clone)]
pub struct ThresholdTable<T> {
    rules: Vec<(Rule, T)>,
    fallback: T,
}

impl<T> ThresholdTable<T> {
    pub fn new(fallback: T) -> Self {
        Self {
            rules: Vec::new(),
            fallback,
        }
    }

    pub fn rule(mut self, rule: Rule, outcome: T) -> Self {
        self.rules.push((rule, outcome));
        self
    }
}

impl<T: Copy> ThresholdTable<T> {
    /// Outcome of the first rule matching `x`, copied out of the table.
    pub fn evaluate(&self, x: f64) -> T {
        self.rules
            .iter()
            .find(|(rule, _)| rule.matches(x))
            .map(|(_, outcome)| *outcome)
            .unwrap_or(self.fallback)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Buy,
    ConsiderBuy,
    Hold,
    ConsiderSell,
    Sell,
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Decision::Buy => "Buy",
            Decision::ConsiderBuy => "Consider buy",
            Decision::Hold => "Hold",
            Decision::ConsiderSell => "Consider sell",
            Decision::Sell => "Sell",
        };
        f.write_str(text)
    }
}

/// Outcome of a table: marker emoji, wording and an optional trade decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub emoji: &'static str,
    pub label: &'static str,
    pub decision: Option<Decision>,
}

impl Verdict {
    pub const fn new(emoji: &'static str, label: &'static str) -> Self {
        Self {
            emoji,
            label,
            decision: None,
        }
    }

    pub const fn deciding(emoji: &'static str, label: &'static str, decision: Decision) -> Self {
        Self {
            emoji,
            label,
            decision: Some(decision),
        }
    }

    /// Decision text, or the label when the verdict carries none.
    pub fn headline(&self) -> String {
        match self.decision {
            Some(decision) => decision.to_string(),
            None => self.label.to_string(),
        }
    }
}

pub const CNN_BUY_SCORE: f64 = 35.0;
pub const CNN_SELL_SCORE: f64 = 80.0;

/// CNN fear & greed score buckets.
pub fn fear_greed_mood() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::deciding("🤑", "Extreme Greed", Decision::Sell))
        .rule(Rule::Below(25.0), Verdict::deciding("😱", "Extreme Fear", Decision::Buy))
        .rule(Rule::Below(45.0), Verdict::deciding("😰", "Fear", Decision::ConsiderBuy))
        .rule(Rule::Below(55.0), Verdict::deciding("😐", "Neutral", Decision::Hold))
        .rule(Rule::Below(75.0), Verdict::deciding("😎", "Greed", Decision::ConsiderSell))
}

/// Trading band on the CNN score: sell above 80, buy below 35.
pub fn cnn_trading_band() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::deciding("🟡", "neutral band", Decision::Hold))
        .rule(
            Rule::Above(CNN_SELL_SCORE),
            Verdict::deciding("🔴", "F&G index above 80", Decision::Sell),
        )
        .rule(
            Rule::Below(CNN_BUY_SCORE),
            Verdict::deciding("🟢", "F&G index below 35", Decision::Buy),
        )
}

/// Decision on the alternative.me crypto index.
pub fn crypto_fear_greed_decision() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::deciding("🔴", "Extreme Greed", Decision::Sell))
        .rule(Rule::AtMost(24.0), Verdict::deciding("💚", "Extreme Fear", Decision::Buy))
        .rule(Rule::AtMost(44.0), Verdict::deciding("🟢", "Fear", Decision::ConsiderBuy))
        .rule(Rule::AtMost(55.0), Verdict::deciding("🟡", "Neutral", Decision::Hold))
        .rule(Rule::AtMost(75.0), Verdict::deciding("🟠", "Greed", Decision::ConsiderSell))
}

/// Percent deviation of the price from its 200-day average.
pub fn ma200_deviation() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::deciding("💥", "Bear market", Decision::Sell))
        .rule(Rule::Above(5.0), Verdict::deciding("🟢", "Bull market", Decision::Buy))
        .rule(Rule::Above(0.0), Verdict::deciding("🟡", "Uptrend", Decision::ConsiderBuy))
        .rule(Rule::Above(-5.0), Verdict::deciding("🔴", "Downtrend", Decision::Sell))
}

pub const OIL_WEIGHT: f64 = 0.5;
pub const COPPER_WEIGHT: f64 = 0.3;
pub const WHEAT_WEIGHT: f64 = 0.2;

/// Weighted mean of `(change_pct, weight)` legs, renormalised over the legs
/// present. `None` when no leg is available.
pub fn weighted_composite(legs: &[(f64, f64)]) -> Option<f64> {
    let (sum, weight) = legs
        .iter()
        .filter(|(change, weight)| change.is_finite() && *weight > 0.0)
        .fold((0.0, 0.0), |(s, w), (change, weight)| (s + change * weight, w + weight));
    (weight > 0.0).then(|| sum / weight)
}

/// Inflation reading of the oil/copper/wheat composite.
pub fn inflation_signal() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::new("✅", "📊 *Inflation stable* (normal range)"))
        .rule(
            Rule::Above(8.0),
            Verdict::new("🔥", "🚨 *Strong inflation pressure* (cost-push)"),
        )
        .rule(
            Rule::Above(3.0),
            Verdict::new("📈", "⚠️ *Inflation watch* (upward pressure)"),
        )
        .rule(
            Rule::Below(-8.0),
            Verdict::new("📉", "❄️ *Deflation scare* (commodity slump)"),
        )
        .rule(
            Rule::Below(-3.0),
            Verdict::new("⬇️", "😐 *Deflation pressure* (declining)"),
        )
}

pub fn rsi_status() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::new("", ""))
        .rule(Rule::Above(70.0), Verdict::new("", "(overbought)"))
        .rule(Rule::Below(30.0), Verdict::new("", "(oversold)"))
}

/// Trend marker on a 7-day percent change.
pub fn weekly_trend() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::new("📉", "falling"))
        .rule(Rule::Above(3.0), Verdict::new("🚀", "strong rise"))
        .rule(Rule::Above(0.0), Verdict::new("📈", "rising"))
        .rule(Rule::Below(-3.0), Verdict::new("💥", "strong fall"))
}

/// Up/down marker on a plain percent change.
pub fn direction() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::new("🔴", "down")).rule(Rule::Above(0.0), Verdict::new("🟢", "up"))
}

pub fn bond_yield_level() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::new("🟢", "low"))
        .rule(Rule::AtLeast(5.0), Verdict::new("🔴", "high"))
        .rule(Rule::AtLeast(4.0), Verdict::new("🟡", "normal"))
}

/// Trend marker on a 7-day change in basis points.
pub fn bond_yield_trend() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::new("➡️", "flat"))
        .rule(Rule::Above(10.0), Verdict::new("⬆️", "rising"))
        .rule(Rule::Below(-10.0), Verdict::new("⬇️", "falling"))
}

/// 10Y minus 5Y spread in percentage points.
pub fn yield_curve_spread() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::new("🟢", "Normal"))
        .rule(Rule::Below(0.0), Verdict::new("🔴", "Inverted"))
        .rule(Rule::Below(0.5), Verdict::new("🟡", "Flattening"))
}

/// Weekly change of the 10Y yield in percentage points.
pub fn policy_hint() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::new(
        "💡",
        "*Yields stable → limited policy expectations*",
    ))
    .rule(
        Rule::Above(0.2),
        Verdict::new("💡", "*Yields rising → inflation worry or tightening expected*"),
    )
    .rule(
        Rule::Below(-0.2),
        Verdict::new("💡", "*Yields falling → slowdown worry or easing expected*"),
    )
}

/// 30-day change of the broad commodity ETF.
pub fn commodity_sentiment() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::new("⚫", "Flat"))
        .rule(Rule::Above(5.0), Verdict::new("🟢", "Strong (commodity supercycle signal?)"))
        .rule(Rule::Above(0.0), Verdict::new("🟡", "Mild uptrend"))
        .rule(Rule::Below(-5.0), Verdict::new("🔴", "Weak (deflation worry)"))
}

/// Weekly dollar index change and its effect on commodities.
pub fn dollar_impact() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::new("🟡", "Stable dollar → neutral impact"))
        .rule(Rule::Above(1.0), Verdict::new("🔴", "Strong dollar → pressure on commodities"))
        .rule(Rule::Below(-1.0), Verdict::new("🟢", "Weak dollar → tailwind for commodities"))
}

/// Gap of the USD/KRW rate against its fair value, in percent.
pub fn currency_gap() -> ThresholdTable<Verdict> {
    ThresholdTable::new(Verdict::deciding("🟡", "within fair range", Decision::Hold))
        .rule(Rule::WithinAbs(0.1), Verdict::new("⚠️", "possible data *error*"))
        .rule(
            Rule::Above(5.0),
            Verdict::deciding("🔴", "rate 5%+ above fair value", Decision::Sell),
        )
        .rule(
            Rule::Below(-5.0),
            Verdict::deciding("🟢", "rate 5%+ below fair value", Decision::Buy),
        )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fear_greed_extremes() {
        let table = fear_greed_mood();
        let fear = table.evaluate(20.0);
        assert_eq!(fear.label, "Extreme Fear");
        assert_eq!(fear.decision, Some(Decision::Buy));
        let greed = table.evaluate(90.0);
        assert_eq!(greed.label, "Extreme Greed");
        assert_eq!(greed.decision, Some(Decision::Sell));
    }

    #[test]
    fn fear_greed_cutoffs_are_exclusive_upper_bounds() {
        let table = fear_greed_mood();
        let labels: Vec<&str> = [24.9, 25.0, 44.9, 45.0, 54.9, 55.0, 74.9, 75.0]
            .iter()
            .map(|&x| table.evaluate(x).label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "Extreme Fear",
                "Fear",
                "Fear",
                "Neutral",
                "Neutral",
                "Greed",
                "Greed",
                "Extreme Greed"
            ]
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        // both rules match 10.0; the earlier one must be picked
        let table = ThresholdTable::new("none")
            .rule(Rule::Above(5.0), "first")
            .rule(Rule::Above(0.0), "second");
        assert_eq!(table.evaluate(10.0), "first");
        assert_eq!(table.evaluate(1.0), "second");
        assert_eq!(table.evaluate(-1.0), "none");
        assert_eq!(table.evaluate(f64::NAN), "none");
    }

    #[test]
    fn verdict_outlives_its_table() {
        let verdict = currency_gap().evaluate(12.0);
        assert_eq!(verdict.headline(), "Sell");
        let band = cnn_trading_band().evaluate(20.0);
        assert_eq!(band.decision, Some(Decision::Buy));
    }

    #[test]
    fn ma200_buckets() {
        let table = ma200_deviation();
        assert_eq!(table.evaluate(7.0).label, "Bull market");
        assert_eq!(table.evaluate(5.0).label, "Uptrend");
        assert_eq!(table.evaluate(-0.5).label, "Downtrend");
        assert_eq!(table.evaluate(-5.0).label, "Bear market");
    }

    #[test]
    fn crypto_decision_uses_inclusive_bounds() {
        let table = crypto_fear_greed_decision();
        assert_eq!(table.evaluate(24.0).decision, Some(Decision::Buy));
        assert_eq!(table.evaluate(25.0).decision, Some(Decision::ConsiderBuy));
        assert_eq!(table.evaluate(55.0).decision, Some(Decision::Hold));
        assert_eq!(table.evaluate(76.0).decision, Some(Decision::Sell));
    }

    #[test]
    fn cnn_band() {
        let band = cnn_trading_band();
        assert_eq!(band.evaluate(81.0).decision, Some(Decision::Sell));
        assert_eq!(band.evaluate(80.0).decision, Some(Decision::Hold));
        assert_eq!(band.evaluate(34.0).decision, Some(Decision::Buy));
    }

    #[test]
    fn composite_renormalises_missing_legs() {
        let full = weighted_composite(&[(10.0, OIL_WEIGHT), (0.0, COPPER_WEIGHT), (-10.0, WHEAT_WEIGHT)]);
        assert!((full.unwrap() - 3.0).abs() < 1e-9);
        let oil_only = weighted_composite(&[(4.0, OIL_WEIGHT), (f64::NAN, COPPER_WEIGHT)]);
        assert!((oil_only.unwrap() - 4.0).abs() < 1e-9);
        assert_eq!(weighted_composite(&[]), None);
    }

    #[test]
    fn inflation_thresholds() {
        let table = inflation_signal();
        assert_eq!(table.evaluate(9.0).emoji, "🔥");
        assert_eq!(table.evaluate(3.5).emoji, "📈");
        assert_eq!(table.evaluate(0.0).emoji, "✅");
        assert_eq!(table.evaluate(-3.5).emoji, "⬇️");
        assert_eq!(table.evaluate(-9.0).emoji, "📉");
    }

    #[test]
    fn currency_gap_flags_suspicious_zero() {
        let table = currency_gap();
        assert_eq!(table.evaluate(0.05).decision, None);
        assert_eq!(table.evaluate(6.0).decision, Some(Decision::Sell));
        assert_eq!(table.evaluate(-6.0).decision, Some(Decision::Buy));
        assert_eq!(table.evaluate(2.0).headline(), "Hold");
    }

    #[test]
    fn bond_tables() {
        assert_eq!(bond_yield_level().evaluate(5.0).label, "high");
        assert_eq!(bond_yield_level().evaluate(4.2).label, "normal");
        assert_eq!(yield_curve_spread().evaluate(-0.1).label, "Inverted");
        assert_eq!(yield_curve_spread().evaluate(0.3).label, "Flattening");
        assert_eq!(bond_yield_trend().evaluate(12.0).emoji, "⬆️");
    }
}
