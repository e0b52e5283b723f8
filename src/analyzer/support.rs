use crate::model::AnalysisError;

/// Distance from the average, as a fraction, that still counts as a touch.
pub const TOUCH_TOLERANCE: f64 = 0.03;
pub const STRONG_BOUNCE_RATE: f64 = 0.6;
pub const MODERATE_BOUNCE_RATE: f64 = 0.3;
/// Default number of trailing bars inspected.
pub const DEFAULT_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strength {
    Strong,
    Moderate,
    Weak,
}

/// Where the price sits relative to the average when it never touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    CriticalThreshold,
    SupportZone,
    ResistanceZone,
    Uptrend,
    Downtrend,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SupportReading {
    Bounces {
        strength: Strength,
        touches: usize,
        bounces: usize,
    },
    Position {
        position: Position,
        distance_pct: f64,
    },
}

impl SupportReading {
    pub fn describe(&self) -> String {
        match self {
            SupportReading::Bounces {
                strength,
                touches,
                bounces,
            } => {
                let label = match strength {
                    Strength::Strong => "💪 Strong",
                    Strength::Moderate => "👌 Moderate",
                    Strength::Weak => "🫥 Weak",
                };
                format!("{label} ({bounces}/{touches} bounces)")
            }
            SupportReading::Position {
                position,
                distance_pct,
            } => {
                let label = match position {
                    Position::CriticalThreshold => "⚖️ Critical threshold",
                    Position::SupportZone => "🛡️ Support zone",
                    Position::ResistanceZone => "🧱 Resistance zone",
                    Position::Uptrend => "📈 Uptrend",
                    Position::Downtrend => "📉 Downtrend",
                };
                format!("{label} ({distance_pct:+.1}% from MA)")
            }
        }
    }
}

/// How well a long moving average has acted as support or resistance.
///
/// Each point of `window` except the last is a touch when it lies within
/// [`TOUCH_TOLERANCE`] of `ma`; a touch bounces when the next point moves
/// away from the average on the side the price was on. Without any touch
/// the reading falls back to the position of `price` relative to `ma`.
pub fn estimate(price: f64, ma: f64, window: &[f64]) -> Result<SupportReading, AnalysisError> {
    if ma == 0.0 || !ma.is_finite() || !price.is_finite() {
        return Err(AnalysisError::Degenerate("moving average is zero or not finite"));
    }
    if window.len() < 2 {
        return Err(AnalysisError::InsufficientData {
            required: 2,
            available: window.len(),
        });
    }

    let mut touches = 0usize;
    let mut bounces = 0usize;
    for pair in window.windows(2) {
        let (here, next) = (pair[0], pair[1]);
        if !here.is_finite() || !next.is_finite() {
            continue;
        }
        if ((here - ma) / ma).abs() > TOUCH_TOLERANCE {
            continue;
        }
        touches += 1;
        if (here < ma && next > here) || (here > ma && next < here) {
            bounces += 1;
        }
    }

    if touches > 0 {
        let rate = bounces as f64 / touches as f64;
        let strength = if rate >= STRONG_BOUNCE_RATE {
            Strength::Strong
        } else if rate >= MODERATE_BOUNCE_RATE {
            Strength::Moderate
        } else {
            Strength::Weak
        };
        return Ok(SupportReading::Bounces {
            strength,
            touches,
            bounces,
        });
    }

    let distance_pct = (price - ma) / ma * 100.0;
    let position = if distance_pct.abs() <= 1.0 {
        Position::CriticalThreshold
    } else if distance_pct > 0.0 && distance_pct <= 5.0 {
        Position::SupportZone
    } else if distance_pct < 0.0 && distance_pct >= -5.0 {
        Position::ResistanceZone
    } else if distance_pct > 5.0 {
        Position::Uptrend
    } else {
        Position::Downtrend
    };
    Ok(SupportReading::Position {
        position,
        distance_pct,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn half_the_touches_bouncing_is_moderate() {
        // four touches, two of them turn back from the average
        let window = [99.0, 102.0, 102.5, 100.0, 100.0];
        let reading = estimate(100.0, 100.0, &window).unwrap();
        assert_eq!(
            reading,
            SupportReading::Bounces {
                strength: Strength::Moderate,
                touches: 4,
                bounces: 2,
            }
        );
    }

    #[test]
    fn every_touch_bouncing_is_strong() {
        let window = [98.0, 99.0, 99.5, 99.8];
        match estimate(99.5, 100.0, &window).unwrap() {
            SupportReading::Bounces { strength, .. } => assert_eq!(strength, Strength::Strong),
            other => panic!("unexpected reading {other:?}"),
        }
    }

    #[test]
    fn sliding_through_the_average_is_weak() {
        let window = [99.5, 99.0, 98.5, 98.0, 97.5];
        match estimate(100.0, 100.0, &window).unwrap() {
            SupportReading::Bounces {
                strength, bounces, ..
            } => {
                assert_eq!(strength, Strength::Weak);
                assert_eq!(bounces, 0);
            }
            other => panic!("unexpected reading {other:?}"),
        }
    }

    #[test]
    fn no_touch_falls_back_to_position() {
        let far_above = [120.0, 121.0, 122.0];
        let reading = estimate(122.0, 100.0, &far_above).unwrap();
        assert!(matches!(
            reading,
            SupportReading::Position {
                position: Position::Uptrend,
                ..
            }
        ));

        let far_below = [80.0, 81.0];
        let positions = [
            (100.5, Position::CriticalThreshold),
            (104.0, Position::SupportZone),
            (96.0, Position::ResistanceZone),
            (90.0, Position::Downtrend),
        ];
        for (price, expected) in positions {
            match estimate(price, 100.0, &far_below).unwrap() {
                SupportReading::Position { position, .. } => assert_eq!(position, expected),
                other => panic!("unexpected reading {other:?}"),
            }
        }
    }

    fn strength_of(window: &[f64]) -> (Strength, usize, usize) {
        match estimate(100.0, 100.0, window).unwrap() {
            SupportReading::Bounces {
                strength,
                touches,
                bounces,
            } => (strength, touches, bounces),
            other => panic!("unexpected reading {other:?}"),
        }
    }

    #[test]
    fn bounce_rate_cutoffs_are_inclusive() {
        // 3 of 5 touches bounce: exactly the strong rate
        let strong = [99.0, 100.5, 99.5, 101.0, 101.0, 102.0];
        assert_eq!(strength_of(&strong), (Strength::Strong, 5, 3));

        // 3 of 10: exactly the moderate rate
        let mut moderate = vec![99.0, 100.5, 99.5, 101.0];
        moderate.extend([101.0; 7]);
        assert_eq!(strength_of(&moderate), (Strength::Moderate, 10, 3));
    }

    #[test]
    fn position_cutoffs_are_inclusive() {
        let far_below = [80.0, 81.0];
        let positions = [
            (101.0, Position::CriticalThreshold),
            (99.0, Position::CriticalThreshold),
            (105.0, Position::SupportZone),
            (95.0, Position::ResistanceZone),
            (105.5, Position::Uptrend),
            (94.5, Position::Downtrend),
        ];
        for (price, expected) in positions {
            match estimate(price, 100.0, &far_below).unwrap() {
                SupportReading::Position { position, .. } => {
                    assert_eq!(position, expected, "price {price}")
                }
                other => panic!("unexpected reading {other:?}"),
            }
        }
    }

    #[test]
    fn degenerate_inputs_are_rejected() {
        assert_eq!(
            estimate(100.0, 0.0, &[1.0, 2.0]),
            Err(AnalysisError::Degenerate("moving average is zero or not finite"))
        );
        assert_eq!(
            estimate(100.0, 100.0, &[1.0]),
            Err(AnalysisError::InsufficientData {
                required: 2,
                available: 1
            })
        );
    }
}
