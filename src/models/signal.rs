use serde::Serialize;

use crate::domain::Direction;

/// Suggested trade side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeDirection {
    Buy,
    Sell,
    Neutral,
}

impl std::fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "buy"),
            TradeDirection::Sell => write!(f, "sell"),
            TradeDirection::Neutral => write!(f, "neutral"),
        }
    }
}

/// Overall trend judgement carried on the signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendCall {
    ConfirmedUp,
    ConfirmedDown,
    CorrectingUp,
    CorrectingDown,
    Unknown,
}

impl TrendCall {
    pub fn confirmed(direction: Direction) -> Self {
        match direction {
            Direction::Up => TrendCall::ConfirmedUp,
            Direction::Down => TrendCall::ConfirmedDown,
        }
    }

    pub fn correcting(direction: Direction) -> Self {
        match direction {
            Direction::Up => TrendCall::CorrectingUp,
            Direction::Down => TrendCall::CorrectingDown,
        }
    }

    pub fn is_confirmed(self) -> bool {
        matches!(self, TrendCall::ConfirmedUp | TrendCall::ConfirmedDown)
    }
}

impl std::fmt::Display for TrendCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TrendCall::ConfirmedUp => write!(f, "confirmed uptrend"),
            TrendCall::ConfirmedDown => write!(f, "confirmed downtrend"),
            TrendCall::CorrectingUp => write!(f, "upward correction, waiting"),
            TrendCall::CorrectingDown => write!(f, "downward correction, waiting"),
            TrendCall::Unknown => write!(f, "unknown"),
        }
    }
}

/// Optional confirmation indicators supplied by the caller.
///
/// The core never computes these; missing fields simply skip the
/// corresponding confirmation note.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IndicatorSnapshot {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
}

/// A directional suggestion with protective levels and rationale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeSignal {
    pub direction: TradeDirection,
    pub entry: f64,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub trend: TrendCall,
    pub confidence: f64,
    pub notes: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trend_call_constructors() {
        assert_eq!(TrendCall::confirmed(Direction::Up), TrendCall::ConfirmedUp);
        assert_eq!(
            TrendCall::correcting(Direction::Down),
            TrendCall::CorrectingDown
        );
        assert!(TrendCall::ConfirmedDown.is_confirmed());
        assert!(!TrendCall::CorrectingUp.is_confirmed());
    }

    #[test]
    fn test_snapshot_defaults_empty() {
        let snapshot = IndicatorSnapshot::default();
        assert!(snapshot.rsi.is_none());
        assert!(snapshot.macd.is_none());
        assert!(snapshot.macd_signal.is_none());
    }
}
