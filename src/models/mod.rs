// Analysis result models
// These modules contain pure data shapes independent of the pipeline stages

pub mod patterns;
pub mod report;
pub mod signal;
pub mod state;
pub mod wave_set;

// Re-export key types for convenience
pub use patterns::{ExpectedDirection, PatternInfo, Reliability};
pub use report::{AnalysisError, PriceTargets, WaveAnalysis};
pub use signal::{IndicatorSnapshot, TradeDirection, TradeSignal, TrendCall};
pub use state::{CurrentWaveState, WavePhase, WaveStatus};
pub use wave_set::{WaveKey, WaveKind, WaveSet};
