use serde::Serialize;

use crate::domain::Direction;

/// The single finite state behind all the per-call flags.
///
/// Impulse phases follow how far the structure has progressed (the builder
/// labels points 0..5), corrective phases follow 0-A-B-C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WavePhase {
    Unknown,
    /// Points 0/1 only: a motive structure may be forming, no commitment yet.
    ImpulseStarting,
    /// Point 2 in place: wave 3 (the strongest leg) is expected next.
    ImpulseWave3Setup,
    /// Point 4 in place: the final wave 5 is expected next.
    ImpulseWave5Setup,
    /// All six points present: a counter-trend correction is expected.
    ImpulseComplete,
    /// Corrective origin only.
    CorrectiveStarting,
    /// Leg A done, B expected.
    CorrectiveMidway,
    /// Leg B done, the final C leg is expected.
    CorrectiveFinal,
    /// Full 0-A-B-C: a new impulse in the opposite direction is expected.
    CorrectiveComplete,
}

impl WavePhase {
    pub fn is_corrective(self) -> bool {
        matches!(
            self,
            WavePhase::CorrectiveStarting
                | WavePhase::CorrectiveMidway
                | WavePhase::CorrectiveFinal
                | WavePhase::CorrectiveComplete
        )
    }
}

/// Whether the selected wave had all of its legs when analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WaveStatus {
    Completed,
    Forming,
}

/// Position within the wave cycle, derived by the state machine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentWaveState {
    pub phase: WavePhase,
    pub direction: Option<Direction>,
    pub current_wave: String,
    pub next_wave: String,
    pub position: String,
    pub confidence: f64,
    pub wave_status: WaveStatus,
    pub correction_phase: bool,
    pub trend_confirmed: bool,
    pub entry_signal: bool,
    pub correction_targets: Vec<f64>,
    pub correction_progress: u8,
}

impl CurrentWaveState {
    /// State returned when no wave structure is available at all.
    pub fn unknown(confidence: f64) -> Self {
        Self {
            phase: WavePhase::Unknown,
            direction: None,
            current_wave: "unknown".to_string(),
            next_wave: "unknown".to_string(),
            position: "unknown".to_string(),
            confidence,
            wave_status: WaveStatus::Completed,
            correction_phase: false,
            trend_confirmed: false,
            entry_signal: false,
            correction_targets: Vec::new(),
            correction_progress: 0,
        }
    }

    /// Direction a confirmed trade should take, when the phase confirms one.
    ///
    /// Impulse setups continue the wave's own direction; a completed
    /// corrective announces a new impulse against the corrective's direction.
    pub fn expected_direction(&self) -> Option<Direction> {
        if !self.trend_confirmed {
            return None;
        }
        match self.phase {
            WavePhase::ImpulseWave3Setup | WavePhase::ImpulseWave5Setup => self.direction,
            WavePhase::CorrectiveComplete => self.direction.map(Direction::opposite),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_state_flags() {
        let state = CurrentWaveState::unknown(0.9);
        assert_eq!(state.phase, WavePhase::Unknown);
        assert!(!state.trend_confirmed);
        assert!(!state.entry_signal);
        assert!(state.correction_targets.is_empty());
        assert_eq!(state.confidence, 0.9);
    }

    #[test]
    fn test_expected_direction_flips_after_corrective() {
        let mut state = CurrentWaveState::unknown(1.0);
        state.phase = WavePhase::CorrectiveComplete;
        state.direction = Some(Direction::Up);
        state.trend_confirmed = true;
        assert_eq!(
            state.expected_direction(),
            Some(Direction::Down),
            "completed upward corrective implies a new down impulse"
        );

        state.phase = WavePhase::ImpulseWave3Setup;
        assert_eq!(state.expected_direction(), Some(Direction::Up));

        state.trend_confirmed = false;
        assert_eq!(state.expected_direction(), None);
    }
}
