use crate::config::ANALYSIS;
use crate::domain::Direction;
use crate::models::{
    CurrentWaveState, IndicatorSnapshot, PriceTargets, TradeDirection, TradeSignal, TrendCall,
    WavePhase, WaveSet,
};

const CORRECTION_TARGET_LABELS: [&str; 5] = ["23.6%", "38.2%", "50%", "61.8%", "78.6%"];

/// Turns wave state plus current price into a directional suggestion.
/// A firm direction is only emitted once the state machine confirms the
/// trend; everything else stays neutral with defensive levels.
pub struct SignalGenerator;

impl SignalGenerator {
    pub fn generate(
        current_price: f64,
        waves: &WaveSet,
        state: &CurrentWaveState,
        indicators: &IndicatorSnapshot,
    ) -> TradeSignal {
        let cfg = &ANALYSIS.signal;
        let expected = state.expected_direction();

        let trend = if let Some(direction) = expected {
            TrendCall::confirmed(direction)
        } else if state.correction_phase {
            match (state.phase, state.direction) {
                // After a complete impulse the correction runs against it
                (WavePhase::ImpulseComplete, Some(d)) => TrendCall::correcting(d.opposite()),
                (_, Some(d)) => TrendCall::correcting(d),
                _ => TrendCall::Unknown,
            }
        } else {
            TrendCall::Unknown
        };

        let mut direction = TradeDirection::Neutral;
        let mut stop_loss = current_price * (1.0 - cfg.neutral_band_pct);
        let mut take_profit = current_price * (1.0 + cfg.neutral_band_pct);
        let mut notes;

        if state.correction_phase {
            notes = format!(
                "correction in progress ({}% complete)",
                state.correction_progress
            );
            if !state.correction_targets.is_empty() {
                let (pos, nearest) = state
                    .correction_targets
                    .iter()
                    .enumerate()
                    .min_by(|(_, a), (_, b)| {
                        (*a - current_price)
                            .abs()
                            .partial_cmp(&(*b - current_price).abs())
                            .expect("correction targets must not be NaN")
                    })
                    .expect("targets are non-empty");
                notes.push_str(&format!(
                    " | nearest correction target {:.2} ({} retracement)",
                    nearest,
                    CORRECTION_TARGET_LABELS
                        .get(pos)
                        .copied()
                        .unwrap_or("fibonacci")
                ));
            }
            notes.push_str(" | wait for the correction to complete");
        } else {
            notes = "no clear signal, wait".to_string();
        }

        if state.trend_confirmed && state.entry_signal {
            match expected {
                Some(Direction::Up) => {
                    direction = TradeDirection::Buy;
                    stop_loss = buy_stop_loss(current_price, waves, cfg.stop_loss_buffer_pct);
                    take_profit = buy_take_profit(current_price, waves, cfg);
                    notes =
                        "buy signal: correction complete, new impulse leg expected".to_string();
                }
                Some(Direction::Down) => {
                    direction = TradeDirection::Sell;
                    stop_loss = sell_stop_loss(current_price, waves, cfg.stop_loss_buffer_pct);
                    take_profit = sell_take_profit(current_price, waves, cfg);
                    notes =
                        "sell signal: correction complete, new impulse leg expected".to_string();
                }
                None => {}
            }
        }

        append_indicator_notes(&mut notes, direction, indicators, cfg);

        TradeSignal {
            direction,
            entry: current_price,
            stop_loss,
            take_profit,
            trend,
            confidence: state.confidence,
            notes,
        }
    }

    /// Laddered price targets for the trend call (presentation aid).
    pub fn potential_targets(trend: TrendCall, current_price: f64) -> PriceTargets {
        let multipliers = match trend {
            TrendCall::ConfirmedUp => [1.05, 1.10, 1.20],
            TrendCall::ConfirmedDown => [0.95, 0.90, 0.80],
            TrendCall::CorrectingDown => [0.98, 0.95, 0.90],
            TrendCall::CorrectingUp => [1.02, 1.05, 1.10],
            TrendCall::Unknown => [1.03, 0.97, 1.10],
        };
        PriceTargets::from_multipliers(current_price, multipliers)
    }
}

/// Stop for longs: 2% under the lowest known origin of an upward corrective.
fn buy_stop_loss(current_price: f64, waves: &WaveSet, buffer: f64) -> f64 {
    let mut anchor = current_price;
    for (_, wave) in waves.correctives() {
        if wave.direction() == Direction::Up {
            if let Some(leg0) = wave.legs().first() {
                anchor = anchor.min(leg0.price);
            }
        }
    }
    anchor * (1.0 - buffer)
}

fn sell_stop_loss(current_price: f64, waves: &WaveSet, buffer: f64) -> f64 {
    let mut anchor = current_price;
    for (_, wave) in waves.correctives() {
        if wave.direction() == Direction::Down {
            if let Some(leg0) = wave.legs().first() {
                anchor = anchor.max(leg0.price);
            }
        }
    }
    anchor * (1.0 + buffer)
}

/// Target for longs: the nearer of a flat 20% projection and the 1.618
/// extension of each up-impulse's first leg.
fn buy_take_profit(
    current_price: f64,
    waves: &WaveSet,
    cfg: &crate::config::analysis::SignalSettings,
) -> f64 {
    let mut target = current_price * (1.0 + cfg.flat_target_pct);
    for (_, wave) in waves.impulses() {
        let legs = wave.legs();
        if wave.direction() == Direction::Up && legs.len() > 3 {
            let wave1 = legs[1].price - legs[0].price;
            target = target.min(current_price + wave1 * cfg.fib_projection);
        }
    }
    target
}

fn sell_take_profit(
    current_price: f64,
    waves: &WaveSet,
    cfg: &crate::config::analysis::SignalSettings,
) -> f64 {
    let mut target = current_price * (1.0 - cfg.flat_target_pct);
    for (_, wave) in waves.impulses() {
        let legs = wave.legs();
        if wave.direction() == Direction::Down && legs.len() > 3 {
            let wave1 = legs[0].price - legs[1].price;
            target = target.max(current_price - wave1 * cfg.fib_projection);
        }
    }
    target
}

/// Optional RSI / MACD confirmations; absent inputs are skipped silently.
fn append_indicator_notes(
    notes: &mut String,
    direction: TradeDirection,
    indicators: &IndicatorSnapshot,
    cfg: &crate::config::analysis::SignalSettings,
) {
    if let Some(rsi) = indicators.rsi {
        if direction == TradeDirection::Buy && rsi < cfg.rsi_oversold {
            notes.push_str(" | extra confirmation: RSI in the oversold zone");
        } else if direction == TradeDirection::Sell && rsi > cfg.rsi_overbought {
            notes.push_str(" | extra confirmation: RSI in the overbought zone");
        }
    }
    if let (Some(macd), Some(signal)) = (indicators.macd, indicators.macd_signal) {
        if direction == TradeDirection::Buy && macd > signal {
            notes.push_str(" | extra confirmation: bullish MACD crossover");
        } else if direction == TradeDirection::Sell && macd < signal {
            notes.push_str(" | extra confirmation: bearish MACD crossover");
        }
    }
}
