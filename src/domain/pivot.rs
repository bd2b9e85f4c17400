use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Whether a pivot is a local maximum or minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PivotKind {
    Peak,
    Valley,
}

impl PivotKind {
    pub fn opposite(self) -> Self {
        match self {
            PivotKind::Peak => PivotKind::Valley,
            PivotKind::Valley => PivotKind::Peak,
        }
    }
}

/// A structural turning point in the close series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pivot {
    pub index: usize,
    pub price: f64,
    pub kind: PivotKind,
}

/// Merge peak and valley index lists into one pivot sequence ordered by index.
/// Both inputs must already be sorted ascending.
pub fn merge_pivots(prices: &[f64], peaks: &[usize], valleys: &[usize]) -> Vec<Pivot> {
    let peaks = peaks.iter().map(|&i| Pivot {
        index: i,
        price: prices[i],
        kind: PivotKind::Peak,
    });
    let valleys = valleys.iter().map(|&i| Pivot {
        index: i,
        price: prices[i],
        kind: PivotKind::Valley,
    });
    peaks
        .merge_by(valleys, |a, b| a.index <= b.index)
        .collect()
}

/// Drop pivots until peaks and valleys strictly alternate.
///
/// The first pivot is always kept; any later pivot repeating the kind of the
/// last kept one is discarded in scan order.
pub fn enforce_alternation(pivots: &[Pivot]) -> Vec<Pivot> {
    let mut kept: Vec<Pivot> = Vec::with_capacity(pivots.len());
    for pivot in pivots {
        match kept.last() {
            Some(last) if last.kind == pivot.kind => continue,
            _ => kept.push(*pivot),
        }
    }
    kept
}
