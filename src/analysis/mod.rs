// The analysis pipeline: prices -> pivots -> candidate waves -> validated
// waves -> wave state -> trade signal / pattern labels
pub mod fibonacci;
pub mod patterns;
pub mod pivots;
pub mod signals;
pub mod state_machine;
pub mod structure;

// Re-export commonly used types
pub use fibonacci::{FibRatio, WaveValidator};
pub use patterns::PatternClassifier;
pub use pivots::PivotExtractor;
pub use signals::SignalGenerator;
pub use state_machine::WaveStateMachine;
pub use structure::WaveStructureBuilder;

use crate::config::ANALYSIS;
use crate::models::{AnalysisError, IndicatorSnapshot, WaveAnalysis};

/// Analyze a close series with the default (absent) indicator inputs.
pub fn analyze(prices: &[f64], sensitivity: f64) -> Result<WaveAnalysis, AnalysisError> {
    analyze_with_indicators(prices, sensitivity, &IndicatorSnapshot::default())
}

/// Full pipeline over one close series.
///
/// Pure per call: identical prices and sensitivity produce an identical
/// result, and nothing is shared between invocations.
pub fn analyze_with_indicators(
    prices: &[f64],
    sensitivity: f64,
    indicators: &IndicatorSnapshot,
) -> Result<WaveAnalysis, AnalysisError> {
    let required = ANALYSIS.pivot.min_series_len;
    if prices.len() < required {
        return Err(AnalysisError::InsufficientData {
            len: prices.len(),
            required,
        });
    }

    let (peaks_idx, valleys_idx) = PivotExtractor::new(sensitivity).extract(prices);

    let built = WaveStructureBuilder::build(prices, &peaks_idx, &valleys_idx);
    // The synthetic fallback carries its own fixed confidence and is never
    // put through ratio validation.
    let waves = if built.synthetic {
        built.waves
    } else {
        WaveValidator::default().apply(&built.waves)
    };

    let current_wave = WaveStateMachine::current_state(&waves);
    let current_price = prices[prices.len() - 1];
    let trading_signal =
        SignalGenerator::generate(current_price, &waves, &current_wave, indicators);
    let price_targets = SignalGenerator::potential_targets(trading_signal.trend, current_price);
    let patterns = PatternClassifier::classify(&waves);

    Ok(WaveAnalysis {
        waves,
        current_wave,
        patterns,
        trading_signal,
        price_targets,
        peaks_idx,
        valleys_idx,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Direction, Wave};
    use crate::models::{TradeDirection, WavePhase};

    fn linear_rise(len: usize) -> Vec<f64> {
        // Rising linearly from 100 to 160
        (0..len)
            .map(|i| 100.0 + 60.0 * i as f64 / (len - 1) as f64)
            .collect()
    }

    fn wavy(len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| {
                let x = i as f64;
                100.0 + 0.1 * x + 6.0 * (x / 9.0).sin()
            })
            .collect()
    }

    #[test]
    fn test_short_series_is_rejected() {
        let prices = vec![100.0; 30];
        let err = analyze(&prices, 0.5).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InsufficientData {
                len: 30,
                required: 50
            }
        );
    }

    #[test]
    fn test_monotonic_series_synthesizes_impulse() {
        let prices = linear_rise(60);
        let report = analyze(&prices, 0.5).expect("monotonic series must not error");
        assert_eq!(report.waves.len(), 1);
        let (key, wave) = report.waves.iter().next().unwrap();
        assert_eq!(key.direction, Direction::Up);
        assert!(matches!(wave, Wave::Impulse(_)));
        assert_eq!(wave.confidence(), 0.9, "synthetic confidence survives");
    }

    #[test]
    fn test_exact_minimum_length_monotonic_covered() {
        let prices: Vec<f64> = (0..50).map(|i| 100.0 + i as f64).collect();
        let report = analyze(&prices, 0.5).expect("length-50 trend must resolve via fallback");
        assert!(!report.waves.is_empty());
    }

    #[test]
    fn test_determinism() {
        let prices = wavy(120);
        let a = analyze(&prices, 0.6).unwrap();
        let b = analyze(&prices, 0.6).unwrap();
        assert_eq!(a, b, "identical inputs must produce identical reports");
    }

    #[test]
    fn test_confidence_bounds_hold() {
        for sensitivity in [0.2, 0.5, 0.9] {
            let report = analyze(&wavy(150), sensitivity).unwrap();
            for (key, wave) in report.waves.iter() {
                let c = wave.confidence();
                assert!(
                    (0.0..=1.0).contains(&c),
                    "confidence {c} out of bounds for {key}"
                );
            }
            let state = &report.current_wave;
            assert!((0.0..=1.0).contains(&state.confidence));
        }
    }

    #[test]
    fn test_neutral_signal_defaults_apply() {
        // A bare trend gives a synthetic complete impulse: correction phase,
        // neutral signal with the documented default band.
        let prices = linear_rise(60);
        let report = analyze(&prices, 0.5).unwrap();
        let signal = &report.trading_signal;
        if signal.direction == TradeDirection::Neutral {
            let price = prices[prices.len() - 1];
            assert!((signal.stop_loss - price * 0.9).abs() < 1e-9);
            assert!((signal.take_profit - price * 1.1).abs() < 1e-9);
        }
        assert_eq!(report.current_wave.phase, WavePhase::ImpulseComplete);
    }

    #[test]
    fn test_pivot_indices_in_bounds_and_disjoint() {
        let prices = wavy(140);
        let report = analyze(&prices, 0.7).unwrap();
        for &i in report.peaks_idx.iter().chain(report.valleys_idx.iter()) {
            assert!(i < prices.len());
        }
        for i in &report.peaks_idx {
            assert!(
                !report.valleys_idx.contains(i),
                "index {i} appears in both pivot sets"
            );
        }
    }
}
