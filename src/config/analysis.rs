//! Analysis and computation configuration

/// Settings for pivot (peak/valley) extraction
pub struct PivotSettings {
    // Minimum series length accepted by the top-level analysis entry point
    pub min_series_len: usize,
    // Base factors for the sensitivity-scaled windows:
    // smoothing window  = max(3, round(smoothing_base * (1 - sensitivity)))
    // pivot spacing     = max(3, round(spacing_base * (1 - sensitivity)))
    // feature width     = max(1, round(width_base * (1 - sensitivity)))
    pub smoothing_base: f64,
    pub spacing_base: f64,
    pub width_base: f64,
    // Prominence = population std dev * (prominence_std_offset + prominence_std_slope * sensitivity),
    // floored at prominence_floor_pct of the full price range
    pub prominence_std_offset: f64,
    pub prominence_std_slope: f64,
    pub prominence_floor_pct: f64,
    // Relaxed retry used when detection comes back empty
    pub relaxed_spacing_base: f64,
    pub relaxed_prominence_std: f64,
    // Importance filter: keep pivots strictly above median * importance_median_factor,
    // applied only when a side holds more than importance_min_count pivots
    pub importance_min_count: usize,
    pub importance_median_factor: f64,
    // Coarse fallback segmentation when detection yields no usable pivots
    pub coarse_segments: usize,
}

/// Settings for the wave structure search
pub struct StructureSettings {
    // Minimum peaks and valleys required before the window search runs
    pub min_pivots_per_side: usize,
    // Keep at most this many pivots per side, by importance
    pub max_pivots_per_side: usize,
    // Minimum merged pivot count after the alternation filter
    pub min_merged_pivots: usize,
    // Number of segments the synthetic builder splits the series into
    pub synthetic_segments: usize,
    // Confidence stamped on the synthetic wave
    pub synthetic_confidence: f64,
}

/// Heuristic confidence weight table.
///
/// These increments are empirically chosen, not statistically calibrated;
/// `WaveValidator` copies this table so callers can substitute their own.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfidenceWeights {
    pub base: f64,
    // Impulse increments
    pub wave3_longest: f64,
    pub wave4_clear_of_wave1: f64,
    pub wave2_holds_origin: f64,
    // Corrective increments for ratios inside the "typical" bands
    pub b_retrace_typical: f64,
    pub c_extension_typical: f64,
    pub b_typical_band: (f64, f64),
    pub c_typical_band: (f64, f64),
    // Final clamp
    pub floor: f64,
    pub ceiling: f64,
    // Defaults applied when no candidate passes validation
    pub default_impulse: f64,
    pub default_corrective: f64,
}

/// Fibonacci rule bounds used by validation
pub struct FibRuleSettings {
    pub retrace_band: (f64, f64),
    pub c_extension_band: (f64, f64),
    // Wave 3 must reach at least this fraction of wave 1's length
    pub wave3_min_ratio: f64,
}

/// Settings for current-wave selection and correction targets
pub struct StateSettings {
    // A forming wave wins over a completed one when its last leg index is
    // within this many bars of the completed wave's end
    pub forming_recency_margin: usize,
    // Retracement ratios projected as correction targets after a completed impulse
    pub correction_target_ratios: [f64; 5],
    // Confidence reported when no wave is available at all
    pub unknown_confidence: f64,
}

/// Settings for trade signal derivation
pub struct SignalSettings {
    // Stop-loss buffer past the anchor pivot (2% -> 0.98x for longs)
    pub stop_loss_buffer_pct: f64,
    // Flat projection used as the take-profit ceiling/floor
    pub flat_target_pct: f64,
    // Neutral-state stop/target band around the current price
    pub neutral_band_pct: f64,
    // Fibonacci extension applied to wave-1 length for projections
    pub fib_projection: f64,
    // RSI extreme-zone thresholds for confirmation notes
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
}

/// The master analysis configuration
pub struct AnalysisConfig {
    pub sensitivity_min: f64,
    pub sensitivity_max: f64,

    // Sub-groups
    pub pivot: PivotSettings,
    pub structure: StructureSettings,
    pub confidence: ConfidenceWeights,
    pub fib: FibRuleSettings,
    pub state: StateSettings,
    pub signal: SignalSettings,
}

pub const ANALYSIS: AnalysisConfig = AnalysisConfig {
    sensitivity_min: 0.1,
    sensitivity_max: 1.0,

    pivot: PivotSettings {
        min_series_len: 50,
        smoothing_base: 10.0,
        spacing_base: 15.0,
        width_base: 5.0,
        prominence_std_offset: 0.05,
        prominence_std_slope: 0.5,
        prominence_floor_pct: 0.001,
        relaxed_spacing_base: 5.0,
        relaxed_prominence_std: 0.1,
        importance_min_count: 3,
        importance_median_factor: 0.8,
        coarse_segments: 10,
    },

    structure: StructureSettings {
        min_pivots_per_side: 3,
        max_pivots_per_side: 20,
        min_merged_pivots: 6,
        synthetic_segments: 6,
        synthetic_confidence: 0.9,
    },

    confidence: ConfidenceWeights {
        base: 0.5,
        wave3_longest: 0.15,
        wave4_clear_of_wave1: 0.1,
        wave2_holds_origin: 0.05,
        b_retrace_typical: 0.1,
        c_extension_typical: 0.1,
        b_typical_band: (0.382, 0.786),
        c_typical_band: (0.618, 1.618),
        floor: 0.5,
        ceiling: 1.0,
        default_impulse: 0.85,
        default_corrective: 0.75,
    },

    fib: FibRuleSettings {
        retrace_band: (0.236, 0.886),
        c_extension_band: (0.618, 2.618),
        wave3_min_ratio: 0.9,
    },

    state: StateSettings {
        forming_recency_margin: 5,
        correction_target_ratios: [0.236, 0.382, 0.5, 0.618, 0.786],
        unknown_confidence: 0.9,
    },

    signal: SignalSettings {
        stop_loss_buffer_pct: 0.02,
        flat_target_pct: 0.2,
        neutral_band_pct: 0.1,
        fib_projection: 1.618,
        rsi_oversold: 30.0,
        rsi_overbought: 70.0,
    },
};

/// Clamp a caller-supplied sensitivity into the supported detection band.
pub fn clamp_sensitivity(sensitivity: f64) -> f64 {
    if sensitivity.is_nan() {
        return (ANALYSIS.sensitivity_min + ANALYSIS.sensitivity_max) / 2.0;
    }
    sensitivity.clamp(ANALYSIS.sensitivity_min, ANALYSIS.sensitivity_max)
}
