/// Direction of a crossing between a fast and a slow series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrossKind {
    Golden,
    Death,
}

/// A crossing observed between index `index - 1` and `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossEvent {
    pub kind: CrossKind,
    pub index: usize,
}

/// Scans the last `lookback` index pairs for sign changes of `fast - slow`.
///
/// `<= 0` to `> 0` is golden, `>= 0` to `< 0` is death. Pairs where either
/// side is undefined are skipped. Events come back oldest first.
pub fn detect_crosses(fast: &[Option<f64>], slow: &[Option<f64>], lookback: usize) -> Vec<CrossEvent> {
    let len = fast.len().min(slow.len());
    if len < 2 {
        return Vec::new();
    }
    let start = len.saturating_sub(lookback).max(1);

    (start..len)
        .filter_map(|i| {
            let prev = fast[i - 1]? - slow[i - 1]?;
            let curr = fast[i]? - slow[i]?;
            if prev <= 0.0 && curr > 0.0 {
                Some(CrossEvent {
                    kind: CrossKind::Golden,
                    index: i,
                })
            } else if prev >= 0.0 && curr < 0.0 {
                Some(CrossEvent {
                    kind: CrossKind::Death,
                    index: i,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Most recent crossing inside the lookback window, if any.
pub fn latest_cross(fast: &[Option<f64>], slow: &[Option<f64>], lookback: usize) -> Option<CrossEvent> {
    detect_crosses(fast, slow, lookback).pop()
}

/// Which pair of the short/medium/long averages crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairRole {
    ShortMedium,
    ShortLong,
    MediumLong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCross {
    pub role: PairRole,
    pub fast_period: usize,
    pub slow_period: usize,
    pub event: CrossEvent,
}

impl PairCross {
    pub fn describe(&self) -> String {
        let (f, s) = (self.fast_period, self.slow_period);
        match (self.role, self.event.kind) {
            (PairRole::ShortMedium, CrossKind::Golden) => {
                format!("🌟 {f}MA↗{s}MA golden cross (short-term rebound)")
            }
            (PairRole::ShortMedium, CrossKind::Death) => {
                format!("💀 {f}MA↘{s}MA death cross (short-term correction)")
            }
            (PairRole::ShortLong, CrossKind::Golden) => {
                format!("⭐ {f}MA↗{s}MA breakout (major bullish signal)")
            }
            (PairRole::ShortLong, CrossKind::Death) => {
                format!("🔥 {f}MA↘{s}MA breakdown (major bearish signal)")
            }
            (PairRole::MediumLong, CrossKind::Golden) => {
                format!("🚀 {f}MA↗{s}MA breakout - stage transition!")
            }
            (PairRole::MediumLong, CrossKind::Death) => {
                format!("💥 {f}MA↘{s}MA breakdown - stage transition!")
            }
        }
    }
}

/// Averages of the three periods used by the stage model.
pub struct MaTriple<'a> {
    pub periods: (usize, usize, usize),
    pub short: &'a [Option<f64>],
    pub medium: &'a [Option<f64>],
    pub long: &'a [Option<f64>],
}

/// Crossings of every pair, ordered by index and then short/medium,
/// short/long, medium/long.
pub fn scan_ma_crosses(ma: &MaTriple<'_>, lookback: usize) -> Vec<PairCross> {
    let (p_short, p_medium, p_long) = ma.periods;
    let pairs = [
        (PairRole::ShortMedium, p_short, p_medium, ma.short, ma.medium),
        (PairRole::ShortLong, p_short, p_long, ma.short, ma.long),
        (PairRole::MediumLong, p_medium, p_long, ma.medium, ma.long),
    ];

    let mut found: Vec<PairCross> = pairs
        .iter()
        .flat_map(|&(role, fast_period, slow_period, fast, slow)| {
            detect_crosses(fast, slow, lookback)
                .into_iter()
                .map(move |event| PairCross {
                    role,
                    fast_period,
                    slow_period,
                    event,
                })
        })
        .collect();
    // stable: pair order is kept within an index
    found.sort_by_key(|c| c.event.index);
    found
}
