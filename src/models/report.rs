use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::models::patterns::PatternInfo;
use crate::models::signal::TradeSignal;
use crate::models::state::CurrentWaveState;
use crate::models::wave_set::WaveSet;

/// Laddered price targets derived from the trend call.
///
/// `percentages` holds each target's distance from the entry price in
/// percent, signed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceTargets {
    pub targets: [f64; 3],
    pub percentages: [f64; 3],
}

impl PriceTargets {
    pub fn from_multipliers(current_price: f64, multipliers: [f64; 3]) -> Self {
        let targets = multipliers.map(|m| current_price * m);
        let percentages = targets.map(|t| (t / current_price - 1.0) * 100.0);
        Self {
            targets,
            percentages,
        }
    }
}

/// The full result of one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WaveAnalysis {
    pub waves: WaveSet,
    pub current_wave: CurrentWaveState,
    pub patterns: BTreeMap<String, PatternInfo>,
    pub trading_signal: TradeSignal,
    pub price_targets: PriceTargets,
    pub peaks_idx: Vec<usize>,
    pub valleys_idx: Vec<usize>,
}

/// The only error the analysis boundary reports; every other degenerate
/// input is absorbed by internal fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AnalysisError {
    InsufficientData { len: usize, required: usize },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisError::InsufficientData { len, required } => write!(
                f,
                "insufficient data: {} points provided, {} required",
                len, required
            ),
        }
    }
}

impl std::error::Error for AnalysisError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_targets_percentages() {
        let targets = PriceTargets::from_multipliers(200.0, [1.05, 1.10, 1.20]);
        assert_eq!(targets.targets, [210.0, 220.0, 240.0]);
        assert!((targets.percentages[0] - 5.0).abs() < 1e-9);
        assert!((targets.percentages[2] - 20.0).abs() < 1e-9);

        let down = PriceTargets::from_multipliers(100.0, [0.95, 0.90, 0.80]);
        assert!((down.percentages[1] + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_error_display() {
        let err = AnalysisError::InsufficientData {
            len: 30,
            required: 50,
        };
        assert_eq!(
            err.to_string(),
            "insufficient data: 30 points provided, 50 required"
        );
    }
}
