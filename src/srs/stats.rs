use crate::srs::types::{ConfidenceLevel, ReviewStats};

/// Fold one review outcome into a card's cumulative statistics.
///
/// Pure: the input is never mutated and the same inputs always produce the
/// same output. The response-time average is a true running mean over all
/// recorded responses, not the latest sample.
pub fn update_stats(
    stats: &ReviewStats,
    confidence: ConfidenceLevel,
    response_time_ms: u64,
    good_threshold: ConfidenceLevel,
) -> ReviewStats {
    let total = stats.total_reviews + 1;
    let passed = confidence >= good_threshold;

    let average_response_time_ms = (stats.average_response_time_ms
        * f64::from(stats.total_reviews)
        + response_time_ms as f64)
        / f64::from(total);

    ReviewStats {
        total_reviews: total,
        correct_answers: stats.correct_answers + u32::from(passed),
        incorrect_answers: stats.incorrect_answers + u32::from(!passed),
        average_response_time_ms,
        last_confidence_level: Some(confidence),
        streak_count: if passed { stats.streak_count + 1 } else { 0 },
        lapses: stats.lapses + u32::from(!passed),
    }
}
