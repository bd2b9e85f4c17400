use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Orientation of a wave structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    pub fn is_up(self) -> bool {
        matches!(self, Direction::Up)
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// One labeled point inside a wave. The label is positional: legs are stored
/// in label order, so leg `i` of an impulse is point "i" and leg `i` of a
/// corrective is "0"/"A"/"B"/"C".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WaveLeg {
    pub index: usize,
    pub price: f64,
}

impl WaveLeg {
    pub fn new(index: usize, price: f64) -> Self {
        Self { index, price }
    }
}

pub const IMPULSE_LABELS: [&str; 6] = ["0", "1", "2", "3", "4", "5"];
pub const CORRECTIVE_LABELS: [&str; 4] = ["0", "A", "B", "C"];

/// A five-leg motive structure (points 0-5 in the trend direction).
///
/// `legs` holds the points discovered so far, in label order. The structure
/// builder only emits complete waves; partially formed ones reach the state
/// machine when an upstream stage supplies them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpulseWave {
    pub direction: Direction,
    pub legs: Vec<WaveLeg>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fibonacci_levels: BTreeMap<String, f64>,
}

impl ImpulseWave {
    pub fn new(direction: Direction, legs: Vec<WaveLeg>) -> Self {
        debug_assert!(legs.len() <= IMPULSE_LABELS.len());
        Self {
            direction,
            legs,
            confidence: 0.0,
            fibonacci_levels: BTreeMap::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.legs.len() == IMPULSE_LABELS.len()
    }

    pub fn leg(&self, position: usize) -> Option<&WaveLeg> {
        self.legs.get(position)
    }

    pub fn last_leg(&self) -> Option<&WaveLeg> {
        self.legs.last()
    }

    /// Length of the sub-leg ending at `position`, signed positive in the
    /// wave's direction. `None` unless both endpoints are present.
    pub fn leg_length(&self, position: usize) -> Option<f64> {
        let from = self.leg(position.checked_sub(1)?)?;
        let to = self.leg(position)?;
        Some(match self.direction {
            Direction::Up => to.price - from.price,
            Direction::Down => from.price - to.price,
        })
    }

    pub fn labeled_legs(&self) -> impl Iterator<Item = (&'static str, &WaveLeg)> {
        IMPULSE_LABELS.iter().copied().zip(self.legs.iter())
    }
}

/// A three-leg counter-trend structure (points 0-A-B-C).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectiveWave {
    pub direction: Direction,
    pub legs: Vec<WaveLeg>,
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub fibonacci_levels: BTreeMap<String, f64>,
}

impl CorrectiveWave {
    pub fn new(direction: Direction, legs: Vec<WaveLeg>) -> Self {
        debug_assert!(legs.len() <= CORRECTIVE_LABELS.len());
        Self {
            direction,
            legs,
            confidence: 0.0,
            fibonacci_levels: BTreeMap::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.legs.len() == CORRECTIVE_LABELS.len()
    }

    pub fn leg(&self, position: usize) -> Option<&WaveLeg> {
        self.legs.get(position)
    }

    pub fn last_leg(&self) -> Option<&WaveLeg> {
        self.legs.last()
    }

    pub fn labeled_legs(&self) -> impl Iterator<Item = (&'static str, &WaveLeg)> {
        CORRECTIVE_LABELS.iter().copied().zip(self.legs.iter())
    }
}

/// Either wave variant, as stored in a [`crate::models::WaveSet`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Wave {
    Impulse(ImpulseWave),
    Corrective(CorrectiveWave),
}

impl Wave {
    pub fn direction(&self) -> Direction {
        match self {
            Wave::Impulse(w) => w.direction,
            Wave::Corrective(w) => w.direction,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Wave::Impulse(w) => w.confidence,
            Wave::Corrective(w) => w.confidence,
        }
    }

    pub fn set_confidence(&mut self, confidence: f64) {
        match self {
            Wave::Impulse(w) => w.confidence = confidence,
            Wave::Corrective(w) => w.confidence = confidence,
        }
    }

    pub fn set_fibonacci_levels(&mut self, levels: BTreeMap<String, f64>) {
        match self {
            Wave::Impulse(w) => w.fibonacci_levels = levels,
            Wave::Corrective(w) => w.fibonacci_levels = levels,
        }
    }

    pub fn is_complete(&self) -> bool {
        match self {
            Wave::Impulse(w) => w.is_complete(),
            Wave::Corrective(w) => w.is_complete(),
        }
    }

    pub fn legs(&self) -> &[WaveLeg] {
        match self {
            Wave::Impulse(w) => &w.legs,
            Wave::Corrective(w) => &w.legs,
        }
    }

    pub fn last_leg(&self) -> Option<&WaveLeg> {
        self.legs().last()
    }

    /// Index of the final leg of a complete wave.
    pub fn end_index(&self) -> Option<usize> {
        if self.is_complete() {
            self.last_leg().map(|leg| leg.index)
        } else {
            None
        }
    }

    pub fn start_price(&self) -> Option<f64> {
        self.legs().first().map(|leg| leg.price)
    }

    pub fn end_price(&self) -> Option<f64> {
        self.last_leg().map(|leg| leg.price)
    }
}
