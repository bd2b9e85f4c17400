use std::collections::BTreeMap;

use strum::IntoEnumIterator;

use crate::config::{ConfidenceWeights, ANALYSIS};
use crate::domain::{CorrectiveWave, Direction, ImpulseWave, Wave};
use crate::models::{WaveKind, WaveSet};

/// The standard ratio ladder projected for every validated wave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::EnumIter)]
pub enum FibRatio {
    R0_236,
    R0_382,
    R0_500,
    R0_618,
    R0_786,
    R1_000,
    R1_272,
    R1_618,
}

impl FibRatio {
    pub fn value(self) -> f64 {
        match self {
            FibRatio::R0_236 => 0.236,
            FibRatio::R0_382 => 0.382,
            FibRatio::R0_500 => 0.5,
            FibRatio::R0_618 => 0.618,
            FibRatio::R0_786 => 0.786,
            FibRatio::R1_000 => 1.0,
            FibRatio::R1_272 => 1.272,
            FibRatio::R1_618 => 1.618,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FibRatio::R0_236 => "0.236",
            FibRatio::R0_382 => "0.382",
            FibRatio::R0_500 => "0.5",
            FibRatio::R0_618 => "0.618",
            FibRatio::R0_786 => "0.786",
            FibRatio::R1_000 => "1.0",
            FibRatio::R1_272 => "1.272",
            FibRatio::R1_618 => "1.618",
        }
    }
}

/// Checks candidates against the Fibonacci ratio rules and scores the
/// survivors. The weight table is owned so callers can substitute their own
/// calibration.
pub struct WaveValidator {
    pub weights: ConfidenceWeights,
}

impl Default for WaveValidator {
    fn default() -> Self {
        Self {
            weights: ANALYSIS.confidence.clone(),
        }
    }
}

impl WaveValidator {
    pub fn new(weights: ConfidenceWeights) -> Self {
        Self { weights }
    }

    pub fn validate(&self, wave: &Wave) -> bool {
        match wave {
            Wave::Impulse(w) => validate_impulse(w),
            Wave::Corrective(w) => validate_corrective(w),
        }
    }

    /// Heuristic confidence in [floor, ceiling]; increments come from the
    /// weight table.
    pub fn score(&self, wave: &Wave) -> f64 {
        let w = &self.weights;
        let mut confidence = w.base;

        match wave {
            Wave::Impulse(imp) if imp.is_complete() => {
                let p: Vec<f64> = imp.legs.iter().map(|l| l.price).collect();
                let (len1, len3, len5) = match imp.direction {
                    Direction::Up => (p[1] - p[0], p[3] - p[2], p[5] - p[4]),
                    Direction::Down => (p[0] - p[1], p[2] - p[3], p[4] - p[5]),
                };
                if len3 > len1 && len3 > len5 {
                    confidence += w.wave3_longest;
                }
                let wave4_clear = match imp.direction {
                    Direction::Up => p[4] > p[1],
                    Direction::Down => p[4] < p[1],
                };
                if wave4_clear {
                    confidence += w.wave4_clear_of_wave1;
                }
                let wave2_holds = match imp.direction {
                    Direction::Up => p[2] > p[0],
                    Direction::Down => p[2] < p[0],
                };
                if wave2_holds {
                    confidence += w.wave2_holds_origin;
                }
            }
            Wave::Corrective(corr) if corr.is_complete() => {
                let p: Vec<f64> = corr.legs.iter().map(|l| l.price).collect();
                let (range_0a, retrace_b, extend_c) = match corr.direction {
                    Direction::Up => (p[1] - p[0], p[1] - p[2], p[3] - p[2]),
                    Direction::Down => (p[0] - p[1], p[2] - p[1], p[2] - p[3]),
                };
                if range_0a != 0.0 {
                    let fib_b = retrace_b / range_0a;
                    if fib_b >= w.b_typical_band.0 && fib_b <= w.b_typical_band.1 {
                        confidence += w.b_retrace_typical;
                    }
                    let fib_c = extend_c / range_0a;
                    if fib_c >= w.c_typical_band.0 && fib_c <= w.c_typical_band.1 {
                        confidence += w.c_extension_typical;
                    }
                }
            }
            _ => {}
        }

        confidence.clamp(w.floor, w.ceiling)
    }

    /// Ratio ladder projected from the wave's start along its direction.
    pub fn levels(wave: &Wave) -> BTreeMap<String, f64> {
        let (Some(start), Some(end)) = (wave.start_price(), wave.end_price()) else {
            return BTreeMap::new();
        };
        let range = (end - start).abs();
        FibRatio::iter()
            .map(|ratio| {
                let price = if ratio == FibRatio::R1_000 {
                    end
                } else {
                    match wave.direction() {
                        Direction::Up => start + ratio.value() * range,
                        Direction::Down => start - ratio.value() * range,
                    }
                };
                (ratio.label().to_string(), price)
            })
            .collect()
    }

    /// Pipeline stage: validated candidates get their score and level table;
    /// if nothing validates, the raw candidates survive with default
    /// confidence so downstream stages never run dry.
    pub fn apply(&self, candidates: &WaveSet) -> WaveSet {
        let mut validated = WaveSet::new();
        for (key, wave) in candidates.iter() {
            if self.validate(wave) {
                let mut wave = wave.clone();
                wave.set_confidence(self.score(&wave));
                wave.set_fibonacci_levels(Self::levels(&wave));
                validated.insert(*key, wave);
            }
        }
        if !validated.is_empty() {
            return validated;
        }

        log::debug!(
            "no candidate passed fibonacci validation, keeping {} raw candidates",
            candidates.len()
        );
        let mut fallback = WaveSet::new();
        for (key, wave) in candidates.iter() {
            let mut wave = wave.clone();
            wave.set_confidence(match key.kind {
                WaveKind::Impulse => self.weights.default_impulse,
                WaveKind::Corrective => self.weights.default_corrective,
            });
            fallback.insert(*key, wave);
        }
        fallback
    }
}

fn validate_impulse(wave: &ImpulseWave) -> bool {
    if !wave.is_complete() {
        return false;
    }
    let p: Vec<f64> = wave.legs.iter().map(|l| l.price).collect();

    match wave.direction {
        Direction::Up => {
            // Wave 2 may not retrace the whole of wave 1
            if p[2] < p[0] {
                return false;
            }
            let wave1 = p[1] - p[0];
            if wave1 <= 0.0 {
                return false;
            }
            // Wave 3 carries most of the move
            if (p[3] - p[2]) < ANALYSIS.fib.wave3_min_ratio * wave1 {
                return false;
            }
            // Wave 4 must stay out of wave 1's price zone
            if p[4] <= p[1] {
                return false;
            }
            let retrace = (p[1] - p[2]) / wave1;
            let (lo, hi) = ANALYSIS.fib.retrace_band;
            retrace >= lo && retrace <= hi
        }
        Direction::Down => {
            if p[2] > p[0] {
                return false;
            }
            let wave1 = p[0] - p[1];
            if wave1 <= 0.0 {
                return false;
            }
            if (p[2] - p[3]) < ANALYSIS.fib.wave3_min_ratio * wave1 {
                return false;
            }
            if p[4] >= p[1] {
                return false;
            }
            let retrace = (p[2] - p[1]) / wave1;
            let (lo, hi) = ANALYSIS.fib.retrace_band;
            retrace >= lo && retrace <= hi
        }
    }
}

fn validate_corrective(wave: &CorrectiveWave) -> bool {
    if !wave.is_complete() {
        return false;
    }
    let p: Vec<f64> = wave.legs.iter().map(|l| l.price).collect();

    let (range_0a, retrace_b, extend_c, b_beyond_origin) = match wave.direction {
        // Upward corrective after a down move: B may not drop under the origin
        Direction::Up => (p[1] - p[0], p[1] - p[2], p[3] - p[2], p[2] < p[0]),
        Direction::Down => (p[0] - p[1], p[2] - p[1], p[2] - p[3], p[2] > p[0]),
    };

    if b_beyond_origin {
        return false;
    }
    if range_0a <= 0.0 {
        return false;
    }
    let fib_b = retrace_b / range_0a;
    let (b_lo, b_hi) = ANALYSIS.fib.retrace_band;
    if fib_b < b_lo || fib_b > b_hi {
        return false;
    }
    let fib_c = extend_c / range_0a;
    let (c_lo, c_hi) = ANALYSIS.fib.c_extension_band;
    fib_c >= c_lo && fib_c <= c_hi
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::WaveLeg;

    fn impulse_up(prices: [f64; 6]) -> Wave {
        let legs = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| WaveLeg::new(i * 5, p))
            .collect();
        Wave::Impulse(ImpulseWave::new(Direction::Up, legs))
    }

    fn corrective_down(prices: [f64; 4]) -> Wave {
        let legs = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| WaveLeg::new(i * 5, p))
            .collect();
        Wave::Corrective(CorrectiveWave::new(Direction::Down, legs))
    }

    #[test]
    fn test_valid_impulse_accepted() {
        let validator = WaveValidator::default();
        // Wave 2 retraces 60%, wave 3 is 2.6x wave 1, wave 4 holds above wave 1
        let wave = impulse_up([100.0, 110.0, 104.0, 130.0, 120.0, 140.0]);
        assert!(validator.validate(&wave));
    }

    #[test]
    fn test_each_impulse_rule_rejects() {
        let validator = WaveValidator::default();
        // Wave 2 below origin
        assert!(!validator.validate(&impulse_up([100.0, 110.0, 99.0, 130.0, 120.0, 140.0])));
        // Wave 3 shorter than 90% of wave 1
        assert!(!validator.validate(&impulse_up([100.0, 110.0, 104.0, 112.0, 111.0, 120.0])));
        // Wave 4 inside wave 1's zone
        assert!(!validator.validate(&impulse_up([100.0, 110.0, 104.0, 130.0, 108.0, 140.0])));
        // Retracement below 23.6%
        assert!(!validator.validate(&impulse_up([100.0, 110.0, 109.0, 130.0, 120.0, 140.0])));
        // Zero-length wave 1 must fail validation, not divide
        assert!(!validator.validate(&impulse_up([100.0, 100.0, 100.0, 130.0, 120.0, 140.0])));
    }

    #[test]
    fn test_corrective_ratio_bands() {
        let validator = WaveValidator::default();
        // 0 -> A drops 20, B retraces 50%, C extends 1.0x
        let wave = corrective_down([140.0, 120.0, 130.0, 110.0]);
        assert!(validator.validate(&wave));
        // B above the origin
        assert!(!validator.validate(&corrective_down([140.0, 120.0, 142.0, 110.0])));
        // C extension beyond 2.618x
        assert!(!validator.validate(&corrective_down([140.0, 120.0, 130.0, 50.0])));
    }

    #[test]
    fn test_score_bounds_and_increments() {
        let validator = WaveValidator::default();
        // Wave 3 longest, wave 4 clear, wave 2 holds: 0.5 + 0.15 + 0.1 + 0.05
        let strong = impulse_up([100.0, 110.0, 104.0, 135.0, 125.0, 140.0]);
        assert!((validator.score(&strong) - 0.8).abs() < 1e-12);

        // Typical B and C ratios: 0.5 + 0.1 + 0.1
        let corr = corrective_down([140.0, 120.0, 130.0, 110.0]);
        assert!((validator.score(&corr) - 0.7).abs() < 1e-12);

        let scores = [validator.score(&strong), validator.score(&corr)];
        for s in scores {
            assert!((0.5..=1.0).contains(&s), "confidence must stay clamped");
        }
    }

    #[test]
    fn test_levels_ladder() {
        let wave = impulse_up([100.0, 110.0, 104.0, 130.0, 120.0, 140.0]);
        let levels = WaveValidator::levels(&wave);
        assert_eq!(levels.len(), 8);
        assert_eq!(levels["1.0"], 140.0, "the 1.0 level is the wave end");
        assert!((levels["0.5"] - 120.0).abs() < 1e-12);
        assert!((levels["1.618"] - (100.0 + 1.618 * 40.0)).abs() < 1e-12);
    }

    #[test]
    fn test_apply_falls_back_to_defaults() {
        let validator = WaveValidator::default();
        let mut candidates = WaveSet::new();
        // Retracement too shallow: fails validation
        candidates.insert(
            crate::models::WaveKey::new(WaveKind::Impulse, Direction::Up, 0),
            impulse_up([100.0, 110.0, 109.0, 130.0, 120.0, 140.0]),
        );
        let out = validator.apply(&candidates);
        assert_eq!(out.len(), 1, "unvalidated candidates survive");
        let (_, wave) = out.iter().next().unwrap();
        assert_eq!(wave.confidence(), 0.85, "impulse default confidence");
        assert!(matches!(wave, Wave::Impulse(w) if w.fibonacci_levels.is_empty()));
    }

    #[test]
    fn test_apply_keeps_only_validated_when_any_pass() {
        let validator = WaveValidator::default();
        let mut candidates = WaveSet::new();
        candidates.insert(
            crate::models::WaveKey::new(WaveKind::Impulse, Direction::Up, 0),
            impulse_up([100.0, 110.0, 104.0, 130.0, 120.0, 140.0]),
        );
        candidates.insert(
            crate::models::WaveKey::new(WaveKind::Impulse, Direction::Up, 1),
            impulse_up([100.0, 110.0, 109.0, 130.0, 120.0, 140.0]),
        );
        let out = validator.apply(&candidates);
        assert_eq!(out.len(), 1, "failing candidate dropped");
        let (_, wave) = out.iter().next().unwrap();
        assert!(wave.confidence() >= 0.5);
        assert!(matches!(wave, Wave::Impulse(w) if !w.fibonacci_levels.is_empty()));
    }
}
