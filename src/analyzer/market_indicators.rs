use crate::model::AnalysisError;

/// Sliding-window statistics over close prices.
///
/// Series are oldest first. Window outputs are aligned with the input:
/// index `i` holds the value for the window ending at `i`.
pub struct MarketIndicators;

impl MarketIndicators {
    /// Trailing arithmetic mean for every index.
    ///
    /// Indices before `window - 1` are `None`. Non-finite entries are left out
    /// of the mean; a window is `None` only when it holds no finite value.
    pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
        if window == 0 {
            return vec![None; values.len()];
        }
        (0..values.len())
            .map(|i| {
                if i + 1 < window {
                    return None;
                }
                let slice = &values[i + 1 - window..=i];
                let (sum, count) = slice
                    .iter()
                    .filter(|v| v.is_finite())
                    .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
                (count > 0).then(|| sum / count as f64)
            })
            .collect()
    }

    /// Rolling mean at the last index, refusing series shorter than the window.
    pub fn latest_rolling_mean(values: &[f64], window: usize) -> Result<f64, AnalysisError> {
        if window == 0 || values.len() < window {
            return Err(AnalysisError::InsufficientData {
                required: window.max(1),
                available: values.len(),
            });
        }
        Self::rolling_mean(values, window)
            .last()
            .copied()
            .flatten()
            .ok_or(AnalysisError::Degenerate("window holds no finite value"))
    }

    /// Plain mean of the last `n` values (e.g. the 200-day average).
    pub fn tail_mean(values: &[f64], n: usize) -> Result<f64, AnalysisError> {
        Self::latest_rolling_mean(values, n)
    }

    /// RSI for every index using simple trailing means of gains and losses.
    ///
    /// The first delta counts as zero, so the first defined value sits at
    /// `period - 1`.
    pub fn rsi_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
        let mut gains = Vec::with_capacity(values.len());
        let mut losses = Vec::with_capacity(values.len());
        for (i, v) in values.iter().enumerate() {
            let delta = if i == 0 { 0.0 } else { v - values[i - 1] };
            gains.push(if delta > 0.0 { delta } else { 0.0 });
            losses.push(if delta < 0.0 { -delta } else { 0.0 });
        }

        let avg_gain = Self::rolling_mean(&gains, period);
        let avg_loss = Self::rolling_mean(&losses, period);

        avg_gain
            .into_iter()
            .zip(avg_loss)
            .map(|(gain, loss)| match (gain?, loss?) {
                (g, l) if g == 0.0 && l == 0.0 => Some(50.0),
                (_, l) if l == 0.0 => Some(100.0),
                (g, _) if g == 0.0 => Some(0.0),
                (g, l) => Some(100.0 - 100.0 / (1.0 + g / l)),
            })
            .collect()
    }

    /// Latest RSI, or the neutral 50 when it cannot be computed.
    pub fn rsi(values: &[f64], period: usize) -> f64 {
        Self::rsi_series(values, period)
            .last()
            .copied()
            .flatten()
            .unwrap_or(50.0)
    }

    /// Median over the finite values.
    pub fn median(values: &[f64]) -> Option<f64> {
        let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if sorted.is_empty() {
            return None;
        }
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    /// Percentage deviation of `value` from `reference`.
    ///
    /// Degenerate references (zero, NaN, infinite) read as "no signal": 0.0.
    pub fn gap_ratio(value: f64, reference: f64) -> f64 {
        if reference == 0.0 || !reference.is_finite() || !value.is_finite() {
            return 0.0;
        }
        (value / reference - 1.0) * 100.0
    }

    /// Average gap ratio of every finite value against `reference`.
    pub fn mean_gap_ratio(values: &[f64], reference: f64) -> f64 {
        let gaps: Vec<f64> = values
            .iter()
            .filter(|v| v.is_finite())
            .map(|&v| Self::gap_ratio(v, reference))
            .collect();
        if gaps.is_empty() {
            return 0.0;
        }
        gaps.iter().sum::<f64>() / gaps.len() as f64
    }

    /// `(low, high)` over the finite values, e.g. the 52-week range.
    pub fn extremum(values: &[f64]) -> Option<(f64, f64)> {
        values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Percent change from `from` to `to`; 0.0 when `from` is degenerate.
    pub fn percent_change(from: f64, to: f64) -> f64 {
        Self::gap_ratio(to, from)
    }
}
