use argminmax::ArgMinMax;
use statrs::statistics::Statistics;

pub fn get_max(vec: &[f64]) -> f64 {
    let max_index: usize = vec.argmax();
    vec[max_index]
}

pub fn get_min(vec: &[f64]) -> f64 {
    let min_index: usize = vec.argmin();
    vec[min_index]
}

pub fn get_min_max(vec: &[f64]) -> (f64, f64) {
    (get_min(vec), get_max(vec))
}

/// Index of the largest value in `vec[start..end]`, offset back into the full slice.
pub fn argmax_in(vec: &[f64], start: usize, end: usize) -> usize {
    let start = start.min(vec.len().saturating_sub(1));
    let end = end.min(vec.len());
    if start + 1 >= end {
        return start;
    }
    start + (&vec[start..end]).argmax()
}

/// Index of the smallest value in `vec[start..end]`, offset back into the full slice.
pub fn argmin_in(vec: &[f64], start: usize, end: usize) -> usize {
    let start = start.min(vec.len().saturating_sub(1));
    let end = end.min(vec.len());
    if start + 1 >= end {
        return start;
    }
    start + (&vec[start..end]).argmin()
}

pub fn mean(vec: &[f64]) -> f64 {
    vec.iter().mean()
}

/// Population standard deviation (divisor n, not n-1).
/// statrs' `std_dev` is the sample estimator, which would shift every
/// prominence threshold relative to the detection parameters.
pub fn population_std_dev(vec: &[f64]) -> f64 {
    if vec.is_empty() {
        return 0.0;
    }
    let m = mean(vec);
    let sum_sq: f64 = vec.iter().map(|x| (x - m) * (x - m)).sum();
    (sum_sq / vec.len() as f64).sqrt()
}

/// Median with the even-length halves averaged.
pub fn median(vec: &[f64]) -> f64 {
    if vec.is_empty() {
        return f64::NAN;
    }
    let mut sorted = vec.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).expect("median input must not contain NaN"));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
