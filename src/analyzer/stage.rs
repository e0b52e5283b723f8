use std::fmt;

/// Market phase read from the ordering of the short, medium and long averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Stage1,
    Stage2,
    Stage3,
    Stage4,
    Stage5,
    Stage6,
    Undetermined,
}

/// Fixed wording attached to each stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageInterpretation {
    pub name: &'static str,
    pub trend: &'static str,
    pub psychology: &'static str,
    pub strategy: &'static str,
}

static INTERPRETATIONS: [(Stage, StageInterpretation); 7] = [
    (
        Stage::Stage1,
        StageInterpretation {
            name: "Stage 1 - Steady advance",
            trend: "🚀 Strong uptrend",
            psychology: "💎 Every holder in profit, strong buying pressure",
            strategy: "🟢 Buy and hold - maximise gains",
        },
    ),
    (
        Stage::Stage2,
        StageInterpretation {
            name: "Stage 2 - Advance slowing",
            trend: "⚠️ Short-term correction starting",
            psychology: "📉 Short-term death cross, overheating cools off",
            strategy: "🟡 Consider closing longs - no new buys",
        },
    ),
    (
        Stage::Stage3,
        StageInterpretation {
            name: "Stage 3 - Early decline",
            trend: "📉 Downtrend beginning",
            psychology: "🔴 Sellers in control, downside energy building",
            strategy: "🔴 Close longs - prepare to sell",
        },
    ),
    (
        Stage::Stage4,
        StageInterpretation {
            name: "Stage 4 - Steady decline",
            trend: "💥 Strong downtrend",
            psychology: "😱 Every holder at a loss, fear at its peak",
            strategy: "🔴 Hold shorts - maximise downside gains",
        },
    ),
    (
        Stage::Stage5,
        StageInterpretation {
            name: "Stage 5 - Decline slowing",
            trend: "📈 Bottoming out",
            psychology: "💡 Short-term golden cross, technical rebound attempt",
            strategy: "🟡 Consider closing shorts - scout positions",
        },
    ),
    (
        Stage::Stage6,
        StageInterpretation {
            name: "Stage 6 - Early advance",
            trend: "🌅 Uptrend preparing",
            psychology: "🎯 Upside energy accumulating, signs of hope",
            strategy: "🟢 Prepare to buy - commit once Stage 1 is confirmed",
        },
    ),
    (
        Stage::Undetermined,
        StageInterpretation {
            name: "Range-bound - no clear trend",
            trend: "🔄 Sideways or choppy market",
            psychology: "😐 No direction, mixed sentiment",
            strategy: "⚫ Wait - stand aside until a trend emerges",
        },
    ),
];

impl Stage {
    /// Strict ordering of (short, medium, long). Ties or non-finite inputs
    /// give `Undetermined`.
    pub fn classify(short: f64, medium: f64, long: f64) -> Stage {
        let (s, m, l) = (short, medium, long);
        if !(s.is_finite() && m.is_finite() && l.is_finite()) {
            return Stage::Undetermined;
        }
        if s > m && m > l {
            Stage::Stage1
        } else if m > s && s > l {
            Stage::Stage2
        } else if m > l && l > s {
            Stage::Stage3
        } else if l > m && m > s {
            Stage::Stage4
        } else if l > s && s > m {
            Stage::Stage5
        } else if s > l && l > m {
            Stage::Stage6
        } else {
            Stage::Undetermined
        }
    }

    pub fn number(&self) -> Option<u8> {
        match self {
            Stage::Stage1 => Some(1),
            Stage::Stage2 => Some(2),
            Stage::Stage3 => Some(3),
            Stage::Stage4 => Some(4),
            Stage::Stage5 => Some(5),
            Stage::Stage6 => Some(6),
            Stage::Undetermined => None,
        }
    }

    pub fn interpretation(&self) -> &'static StageInterpretation {
        INTERPRETATIONS
            .iter()
            .find(|(stage, _)| stage == self)
            .map(|(_, text)| text)
            .unwrap_or(&INTERPRETATIONS[6].1)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.interpretation().name)
    }
}
