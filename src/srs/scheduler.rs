use chrono::{DateTime, Duration, Utc};

use crate::srs::config::SrsConfig;
use crate::srs::types::{ConfidenceLevel, SpacedRepetitionState};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Scheduling state for a card that has never been reviewed: due immediately,
/// at the configured starting ease.
pub fn initial_state(config: &SrsConfig, now: DateTime<Utc>) -> SpacedRepetitionState {
    SpacedRepetitionState {
        interval_days: 0.0,
        ease_factor: config.initial_ease_factor,
        next_review_at: now,
        repetitions: 0,
    }
}

/// Compute the next scheduling state from one review outcome, SM-2 style.
///
/// The ease factor is adjusted and clamped first; the new interval is then
/// derived from the clamped ease. A lapse (confidence below the configured
/// threshold) resets the interval ladder and the repetition count. The only
/// clock input is the explicit `now`.
pub fn schedule(
    state: &SpacedRepetitionState,
    confidence: ConfidenceLevel,
    now: DateTime<Utc>,
    config: &SrsConfig,
) -> SpacedRepetitionState {
    let ease_factor = (state.ease_factor + config.ease_delta_for(confidence))
        .clamp(config.min_ease_factor, config.max_ease_factor);

    let (interval_days, repetitions) = if confidence < config.lapse_threshold {
        (config.initial_interval_days, 0)
    } else {
        let repetitions = state.repetitions + 1;
        let interval_days = match repetitions {
            1 => config.initial_interval_days,
            2 => config.second_interval_days,
            _ => (state.interval_days * config.success_multiplier(confidence, ease_factor))
                .round(),
        };
        (interval_days.max(config.minimum_interval_days), repetitions)
    };

    SpacedRepetitionState {
        interval_days,
        ease_factor,
        next_review_at: now + Duration::milliseconds((interval_days * MILLIS_PER_DAY) as i64),
        repetitions,
    }
}
