use serde::Serialize;

/// How much weight a recognized chart pattern carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reliability {
    High,
    Medium,
}

impl std::fmt::Display for Reliability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reliability::High => write!(f, "high"),
            Reliability::Medium => write!(f, "medium"),
        }
    }
}

/// Directional bias a pattern implies, for presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedDirection {
    Up,
    Down,
    Neutral,
}

/// A higher-level chart pattern recognized over the wave set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternInfo {
    pub reliability: Reliability,
    pub description: String,
    pub expected_direction: ExpectedDirection,
}

impl PatternInfo {
    pub fn new(
        reliability: Reliability,
        description: impl Into<String>,
        expected_direction: ExpectedDirection,
    ) -> Self {
        Self {
            reliability,
            description: description.into(),
            expected_direction,
        }
    }
}
