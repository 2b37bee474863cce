use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::srs::config::SrsConfig;
use crate::srs::types::{ConfidenceLevel, LearningStatus};
use crate::srs::{queue, scheduler, stats, SrsError};
use crate::store::operations::cards::Card;

/// Per-card state machine within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CardPhase {
    Hidden,
    Revealed,
    Answered,
}

impl CardPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Revealed => "revealed",
            Self::Answered => "answered",
        }
    }
}

/// Session aggregates; folded once per *committed* response.
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub studied: u32,
    pub correct: u32,
    pub incorrect: u32,
    pub total_time_ms: u64,
}

/// A graded response whose persistence write has not succeeded yet. The
/// snapshot is computed exactly once; retries re-send it unchanged.
#[derive(Debug, Clone)]
pub struct PendingReview {
    pub card: Card,
    pub confidence: ConfidenceLevel,
    pub response_time_ms: u64,
    pub is_correct: bool,
}

#[derive(Debug)]
struct CardSlot {
    card: Card,
    phase: CardPhase,
    revealed_at: Option<DateTime<Utc>>,
    pending: Option<PendingReview>,
}

/// In-memory review queue for one collection. Owns the per-card state
/// machine and the session aggregates; never persisted. Persistence of the
/// card snapshots happens between `record_response` and `commit_response`,
/// through whatever store the caller uses.
#[derive(Debug)]
pub struct ReviewSession {
    id: String,
    collection_id: String,
    slots: Vec<CardSlot>,
    positions: HashMap<String, usize>,
    cursor: usize,
    summary: SessionSummary,
    config: SrsConfig,
    abandoned: bool,
    created_at: DateTime<Utc>,
    last_activity_at: DateTime<Utc>,
}

impl ReviewSession {
    pub fn new(
        id: String,
        collection_id: String,
        cards: Vec<Card>,
        config: SrsConfig,
        now: DateTime<Utc>,
    ) -> Self {
        let ordered = queue::order_cards(cards, now);

        let mut slots = Vec::with_capacity(ordered.len());
        let mut positions = HashMap::with_capacity(ordered.len());
        for card in ordered {
            if positions.contains_key(&card.id) {
                continue;
            }
            positions.insert(card.id.clone(), slots.len());
            slots.push(CardSlot {
                card,
                phase: CardPhase::Hidden,
                revealed_at: None,
                pending: None,
            });
        }

        Self {
            id,
            collection_id,
            slots,
            positions,
            cursor: 0,
            summary: SessionSummary::default(),
            config,
            abandoned: false,
            created_at: now,
            last_activity_at: now,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn collection_id(&self) -> &str {
        &self.collection_id
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn card_ids(&self) -> Vec<String> {
        self.slots.iter().map(|slot| slot.card.id.clone()).collect()
    }

    pub fn summary(&self) -> SessionSummary {
        self.summary
    }

    pub fn answered_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.phase == CardPhase::Answered)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        !self.slots.is_empty() && self.answered_count() == self.slots.len()
    }

    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.last_activity_at
    }

    pub fn current(&self) -> Option<(&Card, CardPhase)> {
        self.slots
            .get(self.cursor)
            .map(|slot| (&slot.card, slot.phase))
    }

    pub fn phase_of(&self, card_id: &str) -> Option<CardPhase> {
        self.position(card_id).map(|pos| self.slots[pos].phase)
    }

    /// Show the back of a card and start its response timer.
    pub fn reveal(&mut self, card_id: &str, now: DateTime<Utc>) -> Result<(), SrsError> {
        self.ensure_active()?;
        let pos = self.require_position(card_id)?;
        let slot = &mut self.slots[pos];

        if slot.phase != CardPhase::Hidden {
            return Err(SrsError::InvalidTransition {
                card_id: card_id.to_string(),
                expected: CardPhase::Hidden.as_str(),
                found: slot.phase.as_str(),
            });
        }

        slot.phase = CardPhase::Revealed;
        slot.revealed_at = Some(now);
        self.last_activity_at = now;
        Ok(())
    }

    /// Grade a revealed card. Computes the post-review card snapshot (stats,
    /// schedule, reviewedNumber, status) and parks it as pending until the
    /// caller has persisted it and calls [`commit_response`].
    ///
    /// [`commit_response`]: ReviewSession::commit_response
    pub fn record_response(
        &mut self,
        card_id: &str,
        confidence: ConfidenceLevel,
        now: DateTime<Utc>,
    ) -> Result<PendingReview, SrsError> {
        self.ensure_active()?;
        let pos = self.require_position(card_id)?;
        let threshold = self.config.lapse_threshold;
        let slot = &mut self.slots[pos];

        if slot.pending.is_some() {
            return Err(SrsError::InFlightConflict {
                card_id: card_id.to_string(),
            });
        }
        if slot.phase != CardPhase::Revealed {
            return Err(SrsError::InvalidTransition {
                card_id: card_id.to_string(),
                expected: CardPhase::Revealed.as_str(),
                found: slot.phase.as_str(),
            });
        }

        let revealed_at = slot.revealed_at.unwrap_or(now);
        let response_time_ms = (now - revealed_at).num_milliseconds().max(0) as u64;
        let is_correct = confidence >= threshold;

        let review_stats =
            stats::update_stats(&slot.card.review_stats, confidence, response_time_ms, threshold);
        let spaced_repetition =
            scheduler::schedule(&slot.card.spaced_repetition, confidence, now, &self.config);

        let mut card = slot.card.clone();
        card.reviewed_number += 1;
        card.learning_status = LearningStatus::classify(&review_stats, &spaced_repetition);
        card.review_stats = review_stats;
        card.spaced_repetition = spaced_repetition;
        card.last_review_at = Some(now);
        card.updated_at = now;

        let pending = PendingReview {
            card,
            confidence,
            response_time_ms,
            is_correct,
        };
        slot.pending = Some(pending.clone());
        self.last_activity_at = now;
        Ok(pending)
    }

    /// The computed-but-unpersisted response for a card, if any. Lets a
    /// failed store write be retried without recomputation.
    pub fn pending_review(&self, card_id: &str) -> Option<&PendingReview> {
        let pos = self.position(card_id)?;
        self.slots[pos].pending.as_ref()
    }

    /// Finalize a pending response after its store write succeeded: the
    /// snapshot becomes the card's committed state, the card turns
    /// `Answered`, and the aggregates absorb the response exactly once.
    pub fn commit_response(
        &mut self,
        card_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Card, SrsError> {
        let pos = self.require_position(card_id)?;
        let slot = &mut self.slots[pos];

        let Some(pending) = slot.pending.take() else {
            return Err(SrsError::NoPending {
                card_id: card_id.to_string(),
            });
        };

        slot.card = pending.card.clone();
        slot.phase = CardPhase::Answered;
        slot.revealed_at = None;

        self.summary.studied += 1;
        if pending.is_correct {
            self.summary.correct += 1;
        } else {
            self.summary.incorrect += 1;
        }
        self.summary.total_time_ms += pending.response_time_ms;
        self.last_activity_at = now;

        Ok(pending.card)
    }

    /// Return an answered card to `Hidden` so it can be re-studied within
    /// the same session. Its committed stats are kept; only the session
    /// phase resets.
    pub fn reset_card(&mut self, card_id: &str, now: DateTime<Utc>) -> Result<(), SrsError> {
        self.ensure_active()?;
        let pos = self.require_position(card_id)?;
        let slot = &mut self.slots[pos];

        if slot.pending.is_some() {
            return Err(SrsError::InFlightConflict {
                card_id: card_id.to_string(),
            });
        }
        if slot.phase != CardPhase::Answered {
            return Err(SrsError::InvalidTransition {
                card_id: card_id.to_string(),
                expected: CardPhase::Answered.as_str(),
                found: slot.phase.as_str(),
            });
        }

        slot.phase = CardPhase::Hidden;
        slot.revealed_at = None;
        self.last_activity_at = now;
        Ok(())
    }

    pub fn advance(&mut self) -> Result<usize, SrsError> {
        self.go_to(self.cursor + 1)
    }

    pub fn previous(&mut self) -> Result<usize, SrsError> {
        if self.cursor == 0 {
            return Err(SrsError::CursorOutOfBounds {
                index: 0,
                len: self.slots.len(),
            });
        }
        self.go_to(self.cursor - 1)
    }

    /// Pure cursor movement; no card state is touched.
    pub fn go_to(&mut self, index: usize) -> Result<usize, SrsError> {
        if index >= self.slots.len() {
            return Err(SrsError::CursorOutOfBounds {
                index,
                len: self.slots.len(),
            });
        }
        self.cursor = index;
        Ok(self.cursor)
    }

    /// Stop accepting reveals and new responses. A response already recorded
    /// may still be committed so an in-flight write is not lost.
    pub fn abandon(&mut self) {
        self.abandoned = true;
    }

    fn ensure_active(&self) -> Result<(), SrsError> {
        if self.abandoned {
            return Err(SrsError::SessionAbandoned);
        }
        Ok(())
    }

    fn position(&self, card_id: &str) -> Option<usize> {
        self.positions.get(card_id).copied()
    }

    fn require_position(&self, card_id: &str) -> Result<usize, SrsError> {
        self.position(card_id).ok_or_else(|| SrsError::UnknownCard {
            card_id: card_id.to_string(),
        })
    }
}
