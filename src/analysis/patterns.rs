use std::collections::BTreeMap;

use crate::domain::{Direction, Wave, WaveLeg};
use crate::models::{ExpectedDirection, PatternInfo, Reliability, WaveSet};

/// Labels higher-level chart patterns over the wave set, for presentation.
/// Several patterns may coexist; an empty map means the caller shows its
/// own generic label.
pub struct PatternClassifier;

impl PatternClassifier {
    pub fn classify(waves: &WaveSet) -> BTreeMap<String, PatternInfo> {
        let mut patterns = BTreeMap::new();

        find_complete_cycles(waves, &mut patterns);
        find_triangles(waves, &mut patterns);
        find_wedges(waves, &mut patterns);
        find_rectangles(waves, &mut patterns);

        patterns
    }
}

/// A completed impulse whose end pivot starts an opposite-direction
/// corrective: the full 5-3 Elliott cycle.
fn find_complete_cycles(waves: &WaveSet, patterns: &mut BTreeMap<String, PatternInfo>) {
    for (_, iwave) in waves.impulses() {
        let Wave::Impulse(impulse) = iwave else { continue };
        if !impulse.is_complete() {
            continue;
        }
        for (_, cwave) in waves.correctives() {
            let Wave::Corrective(corrective) = cwave else { continue };
            let Some(origin) = corrective.legs.first() else { continue };
            if impulse.legs[5].index == origin.index && impulse.direction != corrective.direction
            {
                let expected = match impulse.direction {
                    Direction::Up => ExpectedDirection::Up,
                    Direction::Down => ExpectedDirection::Down,
                };
                patterns.insert(
                    "elliott_cycle".to_string(),
                    PatternInfo::new(
                        Reliability::High,
                        "full 5-3 Elliott cycle with a direction change",
                        expected,
                    ),
                );
            }
        }
    }
}

/// Corrective legs shrinking monotonically: a contracting triangle.
fn find_triangles(waves: &WaveSet, patterns: &mut BTreeMap<String, PatternInfo>) {
    for (_, wave) in waves.correctives() {
        let Wave::Corrective(corrective) = wave else { continue };
        if !corrective.is_complete() {
            continue;
        }
        let p: Vec<f64> = corrective.legs.iter().map(|l| l.price).collect();
        let a = (p[1] - p[0]).abs();
        let b = (p[2] - p[1]).abs();
        let c = (p[3] - p[2]).abs();
        if a > b && b > c {
            patterns.insert(
                "symmetrical_triangle".to_string(),
                PatternInfo::new(
                    Reliability::Medium,
                    "contracting triangle with successively smaller legs",
                    ExpectedDirection::Neutral,
                ),
            );
        }
    }
}

/// Impulse whose drive and retracement slopes both converge: a wedge.
/// Wedges are terminal, so the expected break is against the impulse.
fn find_wedges(waves: &WaveSet, patterns: &mut BTreeMap<String, PatternInfo>) {
    for (_, wave) in waves.impulses() {
        let Wave::Impulse(impulse) = wave else { continue };
        if !impulse.is_complete() {
            continue;
        }
        let legs = &impulse.legs;
        let Some(slopes) = leg_slopes(legs) else { continue };
        let [s1, s2, s3, s4, s5] = slopes;
        if s1.abs() > s3.abs() && s3.abs() > s5.abs() && s2.abs() > s4.abs() {
            let expected = match impulse.direction {
                Direction::Up => ExpectedDirection::Down,
                Direction::Down => ExpectedDirection::Up,
            };
            patterns.insert(
                "wedge".to_string(),
                PatternInfo::new(
                    Reliability::High,
                    "wedge with converging leg slopes",
                    expected,
                ),
            );
        }
    }
}

/// Corrective bouncing between two flat levels: a rectangle.
fn find_rectangles(waves: &WaveSet, patterns: &mut BTreeMap<String, PatternInfo>) {
    for (_, wave) in waves.correctives() {
        let Wave::Corrective(corrective) = wave else { continue };
        if !corrective.is_complete() {
            continue;
        }
        let p: Vec<f64> = corrective.legs.iter().map(|l| l.price).collect();
        if p[0] == 0.0 || p[1] == 0.0 {
            continue;
        }
        if ((p[0] - p[2]) / p[0]).abs() < 0.05 && ((p[1] - p[3]) / p[1]).abs() < 0.05 {
            patterns.insert(
                "rectangle".to_string(),
                PatternInfo::new(
                    Reliability::Medium,
                    "rectangle with matching highs and lows",
                    ExpectedDirection::Neutral,
                ),
            );
        }
    }
}

/// Per-leg slopes (price per bar). None when two points share an index, as
/// the synthetic builder can produce.
fn leg_slopes(legs: &[WaveLeg]) -> Option<[f64; 5]> {
    let mut slopes = [0.0f64; 5];
    for (i, slope) in slopes.iter_mut().enumerate() {
        let from = &legs[i];
        let to = &legs[i + 1];
        if to.index == from.index {
            return None;
        }
        *slope = (to.price - from.price) / (to.index as f64 - from.index as f64);
    }
    Some(slopes)
}
