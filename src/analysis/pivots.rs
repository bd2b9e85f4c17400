use find_peaks::PeakFinder;

use crate::config::{clamp_sensitivity, ANALYSIS};
use crate::utils::maths_utils;

/// Extracts alternating peaks and valleys from a close series.
///
/// Detection adapts to a sensitivity in [0.1, 1.0]: higher sensitivity means
/// a smaller smoothing window, tighter spacing and a lower prominence bar,
/// so more pivots survive.
pub struct PivotExtractor {
    sensitivity: f64,
}

impl PivotExtractor {
    pub fn new(sensitivity: f64) -> Self {
        Self {
            sensitivity: clamp_sensitivity(sensitivity),
        }
    }

    /// Returns (peak indices, valley indices), each ascending, with no index
    /// appearing in both sets.
    pub fn extract(&self, prices: &[f64]) -> (Vec<usize>, Vec<usize>) {
        let cfg = &ANALYSIS.pivot;
        let prices = impute_missing(prices);
        if prices.is_empty() {
            return (Vec::new(), Vec::new());
        }

        let smooth_window =
            (cfg.smoothing_base * (1.0 - self.sensitivity)).round().max(3.0) as usize;
        let smoothed = smooth(&prices, smooth_window);

        let spacing = (cfg.spacing_base * (1.0 - self.sensitivity)).round().max(3.0) as usize;
        let (price_min, price_max) = maths_utils::get_min_max(&prices);
        let price_range = price_max - price_min;
        let price_std = maths_utils::population_std_dev(&prices);

        let mut prominence =
            price_std * (cfg.prominence_std_offset + cfg.prominence_std_slope * self.sensitivity);
        if prominence < cfg.prominence_floor_pct * price_range {
            prominence = cfg.prominence_floor_pct * price_range;
        }
        let width = (cfg.width_base * (1.0 - self.sensitivity)).round().max(1.0) as usize;

        let (mut peaks, mut valleys) = detect(&smoothed, spacing, prominence, Some(width));

        // Degenerate input can defeat the adaptive parameters entirely;
        // retry once with relaxed fixed ones before giving up.
        if peaks.is_empty() && valleys.is_empty() {
            let relaxed_spacing =
                (cfg.relaxed_spacing_base * (1.0 - self.sensitivity)).round().max(2.0) as usize;
            let relaxed_prominence = price_std * cfg.relaxed_prominence_std;
            log::debug!(
                "pivot detection found nothing, retrying with spacing {} prominence {:.6}",
                relaxed_spacing,
                relaxed_prominence
            );
            let relaxed = detect(&smoothed, relaxed_spacing, relaxed_prominence, None);
            peaks = relaxed.0;
            valleys = relaxed.1;
        }

        peaks = filter_by_importance(peaks, &smoothed, false);
        valleys = filter_by_importance(valleys, &smoothed, true);

        // Peaks and valleys must alternate; when two of the same kind are
        // adjacent the later one is discarded.
        if !peaks.is_empty() && !valleys.is_empty() {
            (peaks, valleys) = alternate(&smoothed, &peaks, &valleys);
        }

        if peaks.is_empty() || valleys.is_empty() {
            log::debug!("pivot detection too sparse, falling back to coarse segmentation");
            let (coarse_peaks, coarse_valleys) = coarse_segments(&prices, cfg.coarse_segments);
            return alternate(&prices, &coarse_peaks, &coarse_valleys);
        }

        (peaks, valleys)
    }
}

/// Merge, enforce strict alternation, and split back into the two sides.
fn alternate(prices: &[f64], peaks: &[usize], valleys: &[usize]) -> (Vec<usize>, Vec<usize>) {
    let merged = crate::domain::merge_pivots(prices, peaks, valleys);
    let filtered = crate::domain::enforce_alternation(&merged);
    let kept_peaks = filtered
        .iter()
        .filter(|p| p.kind == crate::domain::PivotKind::Peak)
        .map(|p| p.index)
        .collect();
    let kept_valleys = filtered
        .iter()
        .filter(|p| p.kind == crate::domain::PivotKind::Valley)
        .map(|p| p.index)
        .collect();
    (kept_peaks, kept_valleys)
}

/// Replace NaN entries with the value of the nearest valid neighbor
/// (earlier index wins on ties).
fn impute_missing(prices: &[f64]) -> Vec<f64> {
    if !prices.iter().any(|p| p.is_nan()) {
        return prices.to_vec();
    }
    let valid: Vec<usize> = prices
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.is_nan())
        .map(|(i, _)| i)
        .collect();
    if valid.is_empty() {
        return prices.to_vec();
    }
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            if p.is_nan() {
                let nearest = *valid
                    .iter()
                    .min_by_key(|&&v| (v as i64 - i as i64).unsigned_abs())
                    .expect("valid indices are non-empty");
                prices[nearest]
            } else {
                p
            }
        })
        .collect()
}

/// Average each interior point with a symmetric window of the RAW series.
/// Points closer than `window` to either edge are left as-is.
fn smooth(prices: &[f64], window: usize) -> Vec<f64> {
    let mut smoothed = prices.to_vec();
    if prices.len() <= 2 * window {
        return smoothed;
    }
    for i in window..prices.len() - window {
        smoothed[i] = maths_utils::mean(&prices[i - window..=i + window]);
    }
    smoothed
}

/// Find maxima on `series` and on its negation with shared parameters.
fn detect(
    series: &[f64],
    spacing: usize,
    prominence: f64,
    min_width: Option<usize>,
) -> (Vec<usize>, Vec<usize>) {
    let peaks = find_extrema(series, spacing, prominence, min_width);
    let negated: Vec<f64> = series.iter().map(|v| -v).collect();
    let valleys = find_extrema(&negated, spacing, prominence, min_width);
    (peaks, valleys)
}

fn find_extrema(
    series: &[f64],
    spacing: usize,
    prominence: f64,
    min_width: Option<usize>,
) -> Vec<usize> {
    let mut finder = PeakFinder::new(series);
    finder.with_min_prominence(prominence);
    finder.with_min_distance(spacing);
    let mut indices: Vec<usize> = finder
        .find_peaks()
        .iter()
        .filter(|p| {
            let Some(w) = min_width else { return true };
            let prom = p.prominence.unwrap_or(prominence);
            feature_width(series, p.middle_position(), prom) >= w
        })
        .map(|p| p.middle_position())
        .collect();
    indices.sort_unstable();
    indices
}

/// Width of the feature around `peak`, measured at half prominence.
fn feature_width(series: &[f64], peak: usize, prominence: f64) -> usize {
    let cutoff = series[peak] - prominence / 2.0;
    let mut left = peak;
    while left > 0 && series[left - 1] > cutoff {
        left -= 1;
    }
    let mut right = peak;
    while right + 1 < series.len() && series[right + 1] > cutoff {
        right += 1;
    }
    right - left + 1
}

/// Keep only pivots at or above 0.8x the median importance, once a side
/// holds more than three. Peak importance is its smoothed price, valley
/// importance its negated smoothed price. For valleys the negation makes
/// the scaled median stricter than every entry on typical price levels, so
/// a busy valley side collapses and detection falls through to the coarse
/// path.
fn filter_by_importance(indices: Vec<usize>, smoothed: &[f64], negate: bool) -> Vec<usize> {
    let cfg = &ANALYSIS.pivot;
    if indices.len() <= cfg.importance_min_count {
        return indices;
    }
    let importances: Vec<f64> = indices
        .iter()
        .map(|&i| if negate { -smoothed[i] } else { smoothed[i] })
        .collect();
    let threshold = maths_utils::median(&importances) * cfg.importance_median_factor;
    indices
        .into_iter()
        .zip(importances)
        .filter(|&(_, importance)| importance >= threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Coarse fallback: per-segment extrema over 10 equal slices (the first
/// segment is skipped so the anchors stay interior).
fn coarse_segments(prices: &[f64], n_segments: usize) -> (Vec<usize>, Vec<usize>) {
    let segment_size = prices.len() / n_segments;
    let mut peaks: Vec<usize> = Vec::new();
    let mut valleys: Vec<usize> = Vec::new();
    if segment_size == 0 {
        return (peaks, valleys);
    }
    for i in 1..n_segments {
        let start = i * segment_size;
        let end = ((i + 1) * segment_size).min(prices.len());
        if start >= end {
            continue;
        }
        let max_idx = maths_utils::argmax_in(prices, start, end);
        let min_idx = maths_utils::argmin_in(prices, start, end);
        if !peaks.contains(&max_idx) {
            peaks.push(max_idx);
        }
        if !valleys.contains(&min_idx) {
            valleys.push(min_idx);
        }
    }
    (peaks, valleys)
}
