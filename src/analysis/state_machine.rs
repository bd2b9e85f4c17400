use crate::config::ANALYSIS;
use crate::domain::{Direction, Wave};
use crate::models::{CurrentWaveState, WavePhase, WaveSet, WaveStatus};

/// Maps the wave set to the current position in the cycle.
///
/// The transition tables live in [`derive_state`]; everything else is
/// selection of the most relevant wave.
pub struct WaveStateMachine;

impl WaveStateMachine {
    pub fn current_state(waves: &WaveSet) -> CurrentWaveState {
        let margin = ANALYSIS.state.forming_recency_margin;

        // Latest completed wave by (end index, confidence); latest forming
        // wave by its last known leg.
        let mut completed: Option<(&Wave, usize)> = None;
        let mut forming: Option<(&Wave, usize)> = None;

        for (_, wave) in waves.iter() {
            if let Some(end) = wave.end_index() {
                let better = match completed {
                    None => true,
                    Some((current, current_end)) => {
                        end > current_end
                            || (end == current_end && wave.confidence() > current.confidence())
                    }
                };
                if better {
                    completed = Some((wave, end));
                }
            } else if let Some(last) = wave.last_leg() {
                let better = match forming {
                    None => true,
                    Some((_, current_last)) => last.index > current_last,
                };
                if better {
                    forming = Some((wave, last.index));
                }
            }
        }

        // A forming wave only outranks a completed one when it is at least
        // as current (within the recency margin).
        let selected = match (completed, forming) {
            (Some(c), Some(f)) => {
                if f.1 + margin > c.1 {
                    Some((f.0, WaveStatus::Forming))
                } else {
                    Some((c.0, WaveStatus::Completed))
                }
            }
            (Some(c), None) => Some((c.0, WaveStatus::Completed)),
            (None, Some(f)) => Some((f.0, WaveStatus::Forming)),
            (None, None) => None,
        };

        match selected {
            Some((wave, status)) => derive_state(wave, status),
            None => CurrentWaveState::unknown(ANALYSIS.state.unknown_confidence),
        }
    }
}

fn classify_phase(wave: &Wave) -> WavePhase {
    match wave {
        Wave::Impulse(w) => match w.legs.len() {
            6 => WavePhase::ImpulseComplete,
            5 => WavePhase::ImpulseWave5Setup,
            3 | 4 => WavePhase::ImpulseWave3Setup,
            _ => WavePhase::ImpulseStarting,
        },
        Wave::Corrective(w) => match w.legs.len() {
            4 => WavePhase::CorrectiveComplete,
            3 => WavePhase::CorrectiveFinal,
            2 => WavePhase::CorrectiveMidway,
            _ => WavePhase::CorrectiveStarting,
        },
    }
}

/// The transition tables: one row per phase, direction picking the wording.
fn derive_state(wave: &Wave, status: WaveStatus) -> CurrentWaveState {
    let direction = wave.direction();
    let phase = classify_phase(wave);
    let up = direction.is_up();

    let mut state = CurrentWaveState {
        phase,
        direction: Some(direction),
        current_wave: String::new(),
        next_wave: String::new(),
        position: String::new(),
        confidence: wave.confidence(),
        wave_status: status,
        correction_phase: false,
        trend_confirmed: false,
        entry_signal: false,
        correction_targets: Vec::new(),
        correction_progress: 0,
    };

    match phase {
        WavePhase::ImpulseComplete => {
            state.current_wave = "5".into();
            state.next_wave = "A".into();
            state.confidence = 0.95;
            state.correction_phase = true;
            state.correction_targets = correction_targets(wave);
            state.position = if up {
                "up impulse complete, downward correction expected".into()
            } else {
                "down impulse complete, upward correction expected".into()
            };
        }
        WavePhase::ImpulseWave5Setup => {
            state.current_wave = "4".into();
            state.next_wave = "5".into();
            state.confidence = 1.0;
            state.trend_confirmed = true;
            state.entry_signal = true;
            state.position = if up {
                "wave 4 pullback complete, final wave 5 up expected".into()
            } else {
                "wave 4 bounce complete, final wave 5 down expected".into()
            };
        }
        WavePhase::ImpulseWave3Setup => {
            state.current_wave = "2".into();
            state.next_wave = "3".into();
            state.confidence = 1.0;
            state.trend_confirmed = true;
            state.entry_signal = true;
            state.position = if up {
                "wave 2 retracement complete, wave 3 up expected (strongest leg)".into()
            } else {
                "wave 2 bounce complete, wave 3 down expected (strongest leg)".into()
            };
        }
        WavePhase::ImpulseStarting => {
            state.current_wave = "0/1".into();
            state.next_wave = "1/2".into();
            state.confidence = 0.7;
            state.position = if up {
                "possible up impulse forming, wait".into()
            } else {
                "possible down impulse forming, wait".into()
            };
        }
        WavePhase::CorrectiveComplete => {
            state.current_wave = "C".into();
            state.next_wave = "1".into();
            state.confidence = 1.0;
            state.trend_confirmed = true;
            state.entry_signal = true;
            state.position = if up {
                "upward corrective A-B-C complete, new down impulse expected".into()
            } else {
                "downward corrective A-B-C complete, new up impulse expected".into()
            };
        }
        WavePhase::CorrectiveFinal => {
            state.current_wave = "B".into();
            state.next_wave = "C".into();
            state.confidence = 0.8;
            state.correction_phase = true;
            state.correction_progress = 67;
            state.position = if up {
                "wave B complete, final wave C up expected".into()
            } else {
                "wave B complete, final wave C down expected".into()
            };
        }
        WavePhase::CorrectiveMidway => {
            state.current_wave = "A".into();
            state.next_wave = "B".into();
            state.confidence = 0.7;
            state.correction_phase = true;
            state.correction_progress = 33;
            state.position = if up {
                "wave A up complete, wave B pullback expected (mid-correction)".into()
            } else {
                "wave A down complete, wave B bounce expected (mid-correction)".into()
            };
        }
        WavePhase::CorrectiveStarting => {
            state.current_wave = "0".into();
            state.next_wave = "A".into();
            state.confidence = 0.6;
            state.correction_phase = true;
            state.position = if up {
                "possible upward corrective forming, wait".into()
            } else {
                "possible downward corrective forming, wait".into()
            };
        }
        WavePhase::Unknown => unreachable!("derive_state is only called with a selected wave"),
    }

    state
}

/// Five retracement targets off the completed impulse's 0-5 range.
fn correction_targets(wave: &Wave) -> Vec<f64> {
    let (Some(start), Some(end)) = (wave.start_price(), wave.end_price()) else {
        return Vec::new();
    };
    let range = (end - start).abs();
    ANALYSIS
        .state
        .correction_target_ratios
        .iter()
        .map(|ratio| match wave.direction() {
            Direction::Up => end - range * ratio,
            Direction::Down => end + range * ratio,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CorrectiveWave, ImpulseWave, WaveLeg};
    use crate::models::{WaveKey, WaveKind};

    fn impulse(direction: Direction, prices: &[f64], confidence: f64) -> Wave {
        let legs = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| WaveLeg::new(i * 5, p))
            .collect();
        let mut wave = ImpulseWave::new(direction, legs);
        wave.confidence = confidence;
        Wave::Impulse(wave)
    }

    fn corrective(direction: Direction, prices: &[f64], confidence: f64) -> Wave {
        let legs = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| WaveLeg::new(30 + i * 5, p))
            .collect();
        let mut wave = CorrectiveWave::new(direction, legs);
        wave.confidence = confidence;
        Wave::Corrective(wave)
    }

    #[test]
    fn test_empty_set_is_unknown() {
        let state = WaveStateMachine::current_state(&WaveSet::new());
        assert_eq!(state.phase, WavePhase::Unknown);
        assert_eq!(state.confidence, 0.9);
        assert!(!state.trend_confirmed && !state.entry_signal);
    }

    #[test]
    fn test_forming_through_wave4_signals_wave5_entry() {
        let mut waves = WaveSet::new();
        waves.insert(
            WaveKey::new(WaveKind::Impulse, Direction::Up, 0),
            impulse(Direction::Up, &[100.0, 110.0, 104.0, 130.0, 120.0], 0.8),
        );
        let state = WaveStateMachine::current_state(&waves);
        assert_eq!(state.phase, WavePhase::ImpulseWave5Setup);
        assert_eq!(state.current_wave, "4");
        assert_eq!(state.next_wave, "5");
        assert!(state.trend_confirmed);
        assert!(state.entry_signal);
        assert_eq!(state.wave_status, WaveStatus::Forming);
        assert_eq!(state.confidence, 1.0);
    }

    #[test]
    fn test_complete_impulse_emits_correction_targets() {
        let mut waves = WaveSet::new();
        waves.insert(
            WaveKey::new(WaveKind::Impulse, Direction::Up, 0),
            impulse(
                Direction::Up,
                &[100.0, 110.0, 104.0, 130.0, 120.0, 140.0],
                0.9,
            ),
        );
        let state = WaveStateMachine::current_state(&waves);
        assert_eq!(state.phase, WavePhase::ImpulseComplete);
        assert_eq!(state.next_wave, "A");
        assert!(state.correction_phase);
        assert!(!state.entry_signal);
        assert_eq!(state.correction_targets.len(), 5);
        // 23.6% of the 40-point range below the top
        assert!((state.correction_targets[0] - (140.0 - 0.236 * 40.0)).abs() < 1e-9);
        assert!((state.correction_targets[4] - (140.0 - 0.786 * 40.0)).abs() < 1e-9);
    }

    #[test]
    fn test_corrective_progress_table() {
        let cases = [
            (1usize, WavePhase::CorrectiveStarting, 0u8, false),
            (2, WavePhase::CorrectiveMidway, 33, false),
            (3, WavePhase::CorrectiveFinal, 67, false),
            (4, WavePhase::CorrectiveComplete, 0, true),
        ];
        let prices = [140.0, 120.0, 130.0, 110.0];
        for (legs, phase, progress, confirmed) in cases {
            let mut waves = WaveSet::new();
            waves.insert(
                WaveKey::new(WaveKind::Corrective, Direction::Down, 0),
                corrective(Direction::Down, &prices[..legs], 0.75),
            );
            let state = WaveStateMachine::current_state(&waves);
            assert_eq!(state.phase, phase, "phase for {legs} legs");
            assert_eq!(state.correction_progress, progress);
            assert_eq!(state.trend_confirmed, confirmed);
            assert_eq!(state.entry_signal, confirmed);
        }
    }

    #[test]
    fn test_completed_wave_outranks_stale_forming() {
        let mut waves = WaveSet::new();
        // Complete impulse ending at index 25
        waves.insert(
            WaveKey::new(WaveKind::Impulse, Direction::Up, 0),
            impulse(
                Direction::Up,
                &[100.0, 110.0, 104.0, 130.0, 120.0, 140.0],
                0.9,
            ),
        );
        // Forming corrective whose last leg (index 10) is long stale
        let stale = {
            let legs = vec![WaveLeg::new(5, 140.0), WaveLeg::new(10, 120.0)];
            Wave::Corrective(CorrectiveWave::new(Direction::Down, legs))
        };
        waves.insert(WaveKey::new(WaveKind::Corrective, Direction::Down, 0), stale);

        let state = WaveStateMachine::current_state(&waves);
        assert_eq!(
            state.phase,
            WavePhase::ImpulseComplete,
            "stale forming wave must not win"
        );
        assert_eq!(state.wave_status, WaveStatus::Completed);
    }

    #[test]
    fn test_recent_forming_wave_preferred() {
        let mut waves = WaveSet::new();
        waves.insert(
            WaveKey::new(WaveKind::Impulse, Direction::Up, 0),
            impulse(
                Direction::Up,
                &[100.0, 110.0, 104.0, 130.0, 120.0, 140.0],
                0.9,
            ),
        );
        // Forming corrective reaching index 30+: more current than index 25
        waves.insert(
            WaveKey::new(WaveKind::Corrective, Direction::Down, 0),
            corrective(Direction::Down, &[140.0, 120.0], 0.75),
        );
        let state = WaveStateMachine::current_state(&waves);
        assert_eq!(state.phase, WavePhase::CorrectiveMidway);
        assert_eq!(state.wave_status, WaveStatus::Forming);
    }
}
