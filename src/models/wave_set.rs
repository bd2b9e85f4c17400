use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::domain::{Direction, Wave};

/// Which of the two wave shapes a key refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum WaveKind {
    Impulse,
    Corrective,
}

impl fmt::Display for WaveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaveKind::Impulse => write!(f, "Impulse"),
            WaveKind::Corrective => write!(f, "Corrective"),
        }
    }
}

/// Unique key for a wave within one analysis: kind + direction + discovery
/// ordinal. Displays (and serializes) as e.g. `Impulse_Up_0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct WaveKey {
    pub kind: WaveKind,
    pub direction: Direction,
    pub ordinal: usize,
}

impl WaveKey {
    pub fn new(kind: WaveKind, direction: Direction, ordinal: usize) -> Self {
        Self {
            kind,
            direction,
            ordinal,
        }
    }
}

impl fmt::Display for WaveKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let direction = match self.direction {
            Direction::Up => "Up",
            Direction::Down => "Down",
        };
        write!(f, "{}_{}_{}", self.kind, direction, self.ordinal)
    }
}

impl Serialize for WaveKey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// The collection of candidate (or validated) waves keyed by [`WaveKey`].
/// BTreeMap keeps iteration deterministic for identical inputs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WaveSet {
    waves: BTreeMap<WaveKey, Wave>,
}

impl WaveSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: WaveKey, wave: Wave) {
        self.waves.insert(key, wave);
    }

    pub fn len(&self) -> usize {
        self.waves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WaveKey, &Wave)> {
        self.waves.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&WaveKey, &mut Wave)> {
        self.waves.iter_mut().map(|(k, w)| (&*k, w))
    }

    pub fn impulses(&self) -> impl Iterator<Item = (&WaveKey, &Wave)> {
        self.iter().filter(|(k, _)| k.kind == WaveKind::Impulse)
    }

    pub fn correctives(&self) -> impl Iterator<Item = (&WaveKey, &Wave)> {
        self.iter().filter(|(k, _)| k.kind == WaveKind::Corrective)
    }
}
