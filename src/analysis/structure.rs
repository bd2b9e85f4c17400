use crate::config::ANALYSIS;
use crate::domain::{
    enforce_alternation, merge_pivots, CorrectiveWave, Direction, ImpulseWave, Pivot, PivotKind,
    Wave, WaveLeg,
};
use crate::models::{WaveKey, WaveKind, WaveSet};
use crate::utils::maths_utils;

/// Candidate waves plus whether the segment-based fallback produced them.
/// Synthetic waves carry their fixed confidence and skip Fibonacci
/// validation downstream.
#[derive(Debug, Clone)]
pub struct BuiltWaves {
    pub waves: WaveSet,
    pub synthetic: bool,
}

/// Scans the ordered pivot sequence for candidate impulse (0-5) and
/// corrective (0-A-B-C) structures in both orientations.
pub struct WaveStructureBuilder;

impl WaveStructureBuilder {
    /// Produce unvalidated wave candidates. With too few usable pivots the
    /// deterministic segment-based builder supplies a single synthetic
    /// impulse instead, so downstream stages always see a structure.
    pub fn build(prices: &[f64], peaks: &[usize], valleys: &[usize]) -> BuiltWaves {
        let cfg = &ANALYSIS.structure;
        if prices.is_empty() {
            return BuiltWaves {
                waves: WaveSet::new(),
                synthetic: false,
            };
        }
        if peaks.len() < cfg.min_pivots_per_side || valleys.len() < cfg.min_pivots_per_side {
            log::debug!(
                "only {} peaks / {} valleys, using synthetic wave builder",
                peaks.len(),
                valleys.len()
            );
            return BuiltWaves {
                waves: synthetic_wave(prices),
                synthetic: true,
            };
        }

        let peaks = truncate_by_importance(peaks, prices, false, cfg.max_pivots_per_side);
        let valleys = truncate_by_importance(valleys, prices, true, cfg.max_pivots_per_side);

        let merged = merge_pivots(prices, &peaks, &valleys);
        let pivots = enforce_alternation(&merged);
        if pivots.len() < cfg.min_merged_pivots {
            log::debug!(
                "{} pivots after alternation filter, using synthetic wave builder",
                pivots.len()
            );
            return BuiltWaves {
                waves: synthetic_wave(prices),
                synthetic: true,
            };
        }

        let mut waves = WaveSet::new();
        find_impulse_waves(&pivots, &mut waves);
        find_corrective_waves(&pivots, &mut waves);
        if waves.is_empty() {
            // Coarse fallback pivots on trending data can pass the count
            // checks yet match neither search; downstream still needs a
            // structure to reason about.
            log::debug!("no window match over {} pivots, using synthetic wave builder", pivots.len());
            return BuiltWaves {
                waves: synthetic_wave(prices),
                synthetic: true,
            };
        }
        BuiltWaves {
            waves,
            synthetic: false,
        }
    }
}

/// Keep the `limit` most significant pivots of one side, then restore index
/// order. Peak importance is its raw price, valley importance its negation.
fn truncate_by_importance(
    indices: &[usize],
    prices: &[f64],
    negate: bool,
    limit: usize,
) -> Vec<usize> {
    if indices.len() <= limit {
        return indices.to_vec();
    }
    let mut ranked: Vec<usize> = indices.to_vec();
    ranked.sort_by(|&a, &b| {
        let ia = if negate { -prices[a] } else { prices[a] };
        let ib = if negate { -prices[b] } else { prices[b] };
        ib.partial_cmp(&ia).expect("pivot prices must not be NaN")
    });
    ranked.truncate(limit);
    ranked.sort_unstable();
    ranked
}

/// Slide a 6-pivot window and emit every orientation match.
/// Ordinals share one counter across both directions, in discovery order.
fn find_impulse_waves(pivots: &[Pivot], waves: &mut WaveSet) {
    let mut found = 0usize;
    for window in pivots.windows(6) {
        let p: Vec<f64> = window.iter().map(|pv| pv.price).collect();
        let direction = if kinds_match(window, PivotKind::Valley)
            && p[1] > p[0]
            && p[2] < p[1]
            && p[3] > p[1]
            && p[4] < p[3]
            && p[4] > p[2]
            && p[5] > p[3]
        {
            Some(Direction::Up)
        } else if kinds_match(window, PivotKind::Peak)
            && p[1] < p[0]
            && p[2] > p[1]
            && p[3] < p[1]
            && p[4] > p[3]
            && p[4] < p[2]
            && p[5] < p[3]
        {
            Some(Direction::Down)
        } else {
            None
        };

        if let Some(direction) = direction {
            let legs = window
                .iter()
                .map(|pv| WaveLeg::new(pv.index, pv.price))
                .collect();
            waves.insert(
                WaveKey::new(WaveKind::Impulse, direction, found),
                Wave::Impulse(ImpulseWave::new(direction, legs)),
            );
            found += 1;
        }
    }
}

/// Slide a 4-pivot window for 0-A-B-C structures.
fn find_corrective_waves(pivots: &[Pivot], waves: &mut WaveSet) {
    let mut found = 0usize;
    for window in pivots.windows(4) {
        let p: Vec<f64> = window.iter().map(|pv| pv.price).collect();
        // A down corrective follows an up move: starts at a peak.
        let direction = if kinds_match(window, PivotKind::Peak)
            && p[1] < p[0]
            && p[2] > p[1]
            && p[2] < p[0]
            && p[3] < p[1]
        {
            Some(Direction::Down)
        } else if kinds_match(window, PivotKind::Valley)
            && p[1] > p[0]
            && p[2] < p[1]
            && p[2] > p[0]
            && p[3] > p[1]
        {
            Some(Direction::Up)
        } else {
            None
        };

        if let Some(direction) = direction {
            let legs = window
                .iter()
                .map(|pv| WaveLeg::new(pv.index, pv.price))
                .collect();
            waves.insert(
                WaveKey::new(WaveKind::Corrective, direction, found),
                Wave::Corrective(CorrectiveWave::new(direction, legs)),
            );
            found += 1;
        }
    }
}

fn kinds_match(window: &[Pivot], first: PivotKind) -> bool {
    window
        .iter()
        .enumerate()
        .all(|(i, p)| p.kind == if i % 2 == 0 { first } else { first.opposite() })
}

/// Deterministic fallback: six equal segments along the series, with the
/// retracement anchors (2 and 4) refined to the nearby local extremum.
fn synthetic_wave(prices: &[f64]) -> WaveSet {
    let cfg = &ANALYSIS.structure;
    let n = prices.len();
    let last = n - 1;
    let direction = if prices[last] > prices[0] {
        Direction::Up
    } else {
        Direction::Down
    };

    let step = (n / cfg.synthetic_segments).max(1);
    let mut anchors = [
        0,
        step.min(last),
        (2 * step).min(last),
        (3 * step).min(last),
        (4 * step).min(last),
        (5 * step).min(last),
    ];

    let half = step / 2;
    match direction {
        Direction::Up => {
            anchors[2] =
                maths_utils::argmin_in(prices, anchors[1].saturating_sub(half), anchors[1] + half + 1);
            anchors[4] =
                maths_utils::argmin_in(prices, anchors[3].saturating_sub(half), anchors[3] + half + 1);
        }
        Direction::Down => {
            anchors[2] =
                maths_utils::argmax_in(prices, anchors[1].saturating_sub(half), anchors[1] + half + 1);
            anchors[4] =
                maths_utils::argmax_in(prices, anchors[3].saturating_sub(half), anchors[3] + half + 1);
        }
    }

    let legs = anchors
        .iter()
        .map(|&i| WaveLeg::new(i, prices[i]))
        .collect();
    let mut wave = ImpulseWave::new(direction, legs);
    wave.confidence = cfg.synthetic_confidence;

    let mut waves = WaveSet::new();
    waves.insert(
        WaveKey::new(WaveKind::Impulse, direction, 0),
        Wave::Impulse(wave),
    );
    waves
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Six alternating pivots satisfying every impulse price rule.
    fn crafted_impulse() -> (Vec<f64>, Vec<usize>, Vec<usize>) {
        let prices = vec![100.0, 110.0, 104.0, 130.0, 120.0, 140.0];
        (prices, vec![1, 3, 5], vec![0, 2, 4])
    }

    #[test]
    fn test_crafted_sequence_yields_one_impulse() {
        let (prices, peaks, valleys) = crafted_impulse();
        let built = WaveStructureBuilder::build(&prices, &peaks, &valleys);
        assert!(!built.synthetic);
        let waves = built.waves;
        let impulses: Vec<_> = waves.impulses().collect();
        assert_eq!(impulses.len(), 1, "exactly one impulse candidate expected");
        let (key, wave) = impulses[0];
        assert_eq!(key.direction, Direction::Up);
        match wave {
            Wave::Impulse(w) => {
                assert!(w.is_complete());
                assert_eq!(w.legs[5].price, 140.0);
            }
            _ => panic!("impulse key must hold an impulse wave"),
        }
    }

    #[test]
    fn test_bearish_impulse_detected() {
        let prices = vec![140.0, 120.0, 128.0, 100.0, 112.0, 90.0];
        let built = WaveStructureBuilder::build(&prices, &[0, 2, 4], &[1, 3, 5]);
        let impulses: Vec<_> = built.waves.impulses().collect();
        assert_eq!(impulses.len(), 1);
        assert_eq!(impulses[0].0.direction, Direction::Down);
    }

    #[test]
    fn test_corrective_down_detected() {
        let pivots = vec![
            Pivot { index: 0, price: 140.0, kind: PivotKind::Peak },
            Pivot { index: 1, price: 120.0, kind: PivotKind::Valley },
            Pivot { index: 2, price: 132.0, kind: PivotKind::Peak },
            Pivot { index: 3, price: 110.0, kind: PivotKind::Valley },
        ];
        let mut set = WaveSet::new();
        find_corrective_waves(&pivots, &mut set);
        let correctives: Vec<_> = set.correctives().collect();
        assert_eq!(correctives.len(), 1);
        assert_eq!(correctives[0].0.direction, Direction::Down);
    }

    #[test]
    fn test_rule_violation_rejected() {
        // Wave 4 dips below wave 2's low: not an impulse
        let pivots = vec![
            Pivot { index: 0, price: 100.0, kind: PivotKind::Valley },
            Pivot { index: 1, price: 110.0, kind: PivotKind::Peak },
            Pivot { index: 2, price: 104.0, kind: PivotKind::Valley },
            Pivot { index: 3, price: 130.0, kind: PivotKind::Peak },
            Pivot { index: 4, price: 102.0, kind: PivotKind::Valley },
            Pivot { index: 5, price: 140.0, kind: PivotKind::Peak },
        ];
        let mut set = WaveSet::new();
        find_impulse_waves(&pivots, &mut set);
        assert!(set.is_empty(), "overlapping wave 4 must not match");
    }

    #[test]
    fn test_monotonic_series_synthesizes_up_wave() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let built = WaveStructureBuilder::build(&prices, &[], &[]);
        assert!(built.synthetic);
        let waves = built.waves;
        assert_eq!(waves.len(), 1);
        let (key, wave) = waves.iter().next().unwrap();
        assert_eq!(key.kind, WaveKind::Impulse);
        assert_eq!(key.direction, Direction::Up);
        assert_eq!(wave.confidence(), 0.9);
        assert!(wave.is_complete());
    }

    #[test]
    fn test_truncation_keeps_most_significant() {
        let prices: Vec<f64> = (0..30).map(|i| i as f64).collect();
        let indices: Vec<usize> = (0..30).collect();
        let kept = truncate_by_importance(&indices, &prices, false, 20);
        assert_eq!(kept.len(), 20);
        assert_eq!(kept[0], 10, "lowest peaks are dropped first");
        assert!(kept.windows(2).all(|w| w[0] < w[1]), "index order restored");
    }
}
