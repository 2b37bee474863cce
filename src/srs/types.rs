use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Interval (in days) beyond which a card counts as mature.
const MATURE_INTERVAL_DAYS: f64 = 21.0;
/// Streak required on top of a mature interval before a card is mastered.
const MASTERY_STREAK: u32 = 3;
/// Consecutive successful reviews after which a card leaves the learning phase.
const REVIEWING_REPETITIONS: u32 = 3;

/// Learner's self-reported recall difficulty for one review, ordered
/// easiest-to-recall last. The numeric values (1-5) are the wire format the
/// review UI submits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceLevel {
    VeryHard,
    Hard,
    Good,
    Easy,
    VeryEasy,
}

impl ConfidenceLevel {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(Self::VeryHard),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            5 => Some(Self::VeryEasy),
            _ => None,
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::VeryHard => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
            Self::VeryEasy => 5,
        }
    }
}

/// Cumulative per-card review accounting.
///
/// Invariant: `total_reviews == correct_answers + incorrect_answers`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    pub total_reviews: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    /// Running mean over all recorded responses, in milliseconds.
    pub average_response_time_ms: f64,
    pub last_confidence_level: Option<ConfidenceLevel>,
    /// Consecutive responses at or above the good threshold.
    pub streak_count: u32,
    /// Responses below the good threshold, lifetime.
    pub lapses: u32,
}

/// Per-card scheduling state for the SM-2 style scheduler.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpacedRepetitionState {
    pub interval_days: f64,
    pub ease_factor: f64,
    pub next_review_at: DateTime<Utc>,
    /// Consecutive successful reviews since the last lapse.
    pub repetitions: u32,
}

impl SpacedRepetitionState {
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }
}

/// Coarse progress bucket shown in the collection views. Reclassified from
/// stats + schedule after every recorded response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LearningStatus {
    New,
    Learning,
    Reviewing,
    Mastered,
    Forgotten,
}

impl LearningStatus {
    pub fn classify(stats: &ReviewStats, sr: &SpacedRepetitionState) -> Self {
        if stats.total_reviews == 0 {
            Self::New
        } else if sr.repetitions == 0 {
            // Last response was below the good threshold. A single early miss
            // is still "learning"; repeated misses mean the card dropped out.
            if stats.total_reviews >= 2 {
                Self::Forgotten
            } else {
                Self::Learning
            }
        } else if sr.interval_days >= MATURE_INTERVAL_DAYS && stats.streak_count >= MASTERY_STREAK
        {
            Self::Mastered
        } else if sr.repetitions >= REVIEWING_REPETITIONS {
            Self::Reviewing
        } else {
            Self::Learning
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sr(interval: f64, repetitions: u32) -> SpacedRepetitionState {
        SpacedRepetitionState {
            interval_days: interval,
            ease_factor: 2.5,
            next_review_at: Utc::now(),
            repetitions,
        }
    }

    #[test]
    fn confidence_round_trips_through_u8() {
        for value in 1..=5u8 {
            let level = ConfidenceLevel::from_u8(value).unwrap();
            assert_eq!(level.as_u8(), value);
        }
        assert!(ConfidenceLevel::from_u8(0).is_none());
        assert!(ConfidenceLevel::from_u8(6).is_none());
    }

    #[test]
    fn confidence_ordering_matches_numeric_values() {
        assert!(ConfidenceLevel::VeryHard < ConfidenceLevel::Good);
        assert!(ConfidenceLevel::Good < ConfidenceLevel::VeryEasy);
    }

    #[test]
    fn unreviewed_card_is_new() {
        let stats = ReviewStats::default();
        assert_eq!(
            LearningStatus::classify(&stats, &sr(0.0, 0)),
            LearningStatus::New
        );
    }

    #[test]
    fn repeated_misses_mark_card_forgotten() {
        let stats = ReviewStats {
            total_reviews: 4,
            correct_answers: 1,
            incorrect_answers: 3,
            lapses: 3,
            ..Default::default()
        };
        assert_eq!(
            LearningStatus::classify(&stats, &sr(1.0, 0)),
            LearningStatus::Forgotten
        );
    }

    #[test]
    fn mature_interval_with_streak_is_mastered() {
        let stats = ReviewStats {
            total_reviews: 8,
            correct_answers: 8,
            streak_count: 5,
            ..Default::default()
        };
        assert_eq!(
            LearningStatus::classify(&stats, &sr(30.0, 6)),
            LearningStatus::Mastered
        );
    }
}
