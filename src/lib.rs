// Core modules
pub mod analysis;
pub mod config;
pub mod domain;
pub mod models;
pub mod utils;

// Re-export commonly used types
pub use analysis::{analyze, analyze_with_indicators, PivotExtractor, WaveStructureBuilder};
pub use domain::{CorrectiveWave, Direction, ImpulseWave, Wave, WaveLeg};
pub use models::{
    AnalysisError, CurrentWaveState, IndicatorSnapshot, TradeSignal, WaveAnalysis, WaveKey,
    WaveSet,
};

// CLI argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// JSON files, each holding an array of close prices
    pub inputs: Vec<PathBuf>,

    /// Pivot detection sensitivity (clamped to 0.1..=1.0)
    #[arg(long, default_value_t = 0.5)]
    pub sensitivity: f64,

    /// Pretty-print the JSON reports
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}
