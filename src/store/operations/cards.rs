use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::Transactional;

use crate::srs::types::{LearningStatus, ReviewStats, SpacedRepetitionState};
use crate::store::keys;
use crate::store::{Store, StoreError};

/// A unit of learnable content plus its review/scheduling state. The store
/// assigns the id on creation; the review engine only ever replaces whole
/// snapshots through `put_card`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub collection_id: String,
    pub front: String,
    pub back: String,
    pub front_core: Option<String>,
    pub back_core: Option<String>,
    pub card_type: CardType,
    pub part_of_speech: Option<PartOfSpeech>,
    pub definition: Option<String>,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub antonyms: Vec<String>,
    #[serde(default)]
    pub usage_examples: Vec<UsageExample>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub learning_status: LearningStatus,
    /// Lifetime count of recorded review responses; +1 per response.
    pub reviewed_number: u32,
    pub review_stats: ReviewStats,
    pub spaced_repetition: SpacedRepetitionState,
    pub last_review_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CardType {
    Word,
    Idiom,
    Phrase,
    Sentence,
    Grammar,
    Pronunciation,
    Conversation,
    StanceMarker,
    Collocation,
    Slang,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Preposition,
    Conjunction,
    Interjection,
    Pronoun,
    Determiner,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageExample {
    pub example: String,
    pub translation: String,
    pub context: Option<String>,
}

fn due_index_key_for_card(card: &Card) -> Result<String, StoreError> {
    keys::card_due_index_key(
        &card.collection_id,
        card.spaced_repetition.next_review_at.timestamp_millis(),
        &card.id,
    )
}

impl Store {
    /// Insert or replace a card, keeping the due index in step. The old index
    /// entry (if any) is removed and the new one written in the same
    /// transaction as the card itself.
    pub fn put_card(&self, card: &Card) -> Result<(), StoreError> {
        let key = keys::card_key(&card.collection_id, &card.id)?;
        let value = Self::serialize(card)?;
        let next_due_key = due_index_key_for_card(card)?;

        (&self.cards, &self.card_due_index)
            .transaction(|(tx_cards, tx_due)| {
                if let Some(old_raw) = tx_cards.get(key.as_bytes())? {
                    let old_card: Card = serde_json::from_slice(&old_raw).map_err(|error| {
                        sled::transaction::ConflictableTransactionError::Abort(
                            StoreError::Serialization(error),
                        )
                    })?;
                    let old_due_key = due_index_key_for_card(&old_card)
                        .map_err(sled::transaction::ConflictableTransactionError::Abort)?;
                    tx_due.remove(old_due_key.as_bytes())?;
                }

                tx_cards.insert(key.as_bytes(), value.as_slice())?;
                tx_due.insert(next_due_key.as_bytes(), &[])?;
                Ok(())
            })
            .map_err(
                |error: sled::transaction::TransactionError<StoreError>| match error {
                    sled::transaction::TransactionError::Abort(store_error) => store_error,
                    sled::transaction::TransactionError::Storage(storage_error) => {
                        StoreError::Sled(storage_error)
                    }
                },
            )?;

        Ok(())
    }

    pub fn get_card(&self, collection_id: &str, card_id: &str) -> Result<Option<Card>, StoreError> {
        let key = keys::card_key(collection_id, card_id)?;
        match self.cards.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    /// All cards of a collection, in key (card id) order.
    pub fn list_cards(&self, collection_id: &str) -> Result<Vec<Card>, StoreError> {
        let prefix = keys::card_prefix(collection_id)?;
        let mut cards = Vec::new();
        for item in self.cards.scan_prefix(prefix.as_bytes()) {
            let (_, v) = item?;
            cards.push(Self::deserialize::<Card>(&v)?);
        }
        Ok(cards)
    }

    pub fn delete_card(&self, collection_id: &str, card_id: &str) -> Result<bool, StoreError> {
        let key = keys::card_key(collection_id, card_id)?;
        let Some(raw) = self.cards.get(key.as_bytes())? else {
            return Ok(false);
        };
        let card: Card = Self::deserialize(&raw)?;
        let due_key = due_index_key_for_card(&card)?;

        (&self.cards, &self.card_due_index)
            .transaction(|(tx_cards, tx_due)| {
                tx_cards.remove(key.as_bytes())?;
                tx_due.remove(due_key.as_bytes())?;
                Ok(())
            })
            .map_err(
                |error: sled::transaction::TransactionError<StoreError>| match error {
                    sled::transaction::TransactionError::Abort(store_error) => store_error,
                    sled::transaction::TransactionError::Storage(storage_error) => {
                        StoreError::Sled(storage_error)
                    }
                },
            )?;

        Ok(true)
    }

    /// Cards whose next review is at or before `now`, ascending by due time.
    pub fn due_cards(
        &self,
        collection_id: &str,
        now: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<Card>, StoreError> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        let prefix = keys::card_due_index_prefix(collection_id)?;
        let now_ms = now.timestamp_millis().max(0);
        let mut due = Vec::with_capacity(limit);

        for item in self.card_due_index.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let Some((due_ts_ms, card_id)) = keys::parse_due_index_key(&key) else {
                continue;
            };
            if due_ts_ms > now_ms {
                break;
            }

            // Entries are maintained transactionally with the card, but a
            // stale entry must never resurface a card that is no longer due.
            if let Some(card) = self.get_card(collection_id, &card_id)? {
                let card_due_ms = card.spaced_repetition.next_review_at.timestamp_millis().max(0);
                if card_due_ms == due_ts_ms && card_due_ms <= now_ms {
                    due.push(card);
                    if due.len() >= limit {
                        break;
                    }
                }
            }
        }

        Ok(due)
    }

    pub fn count_cards(&self, collection_id: &str) -> Result<u64, StoreError> {
        let prefix = keys::card_prefix(collection_id)?;
        let mut count = 0u64;
        for item in self.cards.scan_prefix(prefix.as_bytes()) {
            let _ = item?;
            count += 1;
        }
        Ok(count)
    }

    pub fn count_due_cards(
        &self,
        collection_id: &str,
        now: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let prefix = keys::card_due_index_prefix(collection_id)?;
        let now_ms = now.timestamp_millis().max(0);
        let mut count = 0u64;
        for item in self.card_due_index.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            let Some((due_ts_ms, _)) = keys::parse_due_index_key(&key) else {
                continue;
            };
            if due_ts_ms > now_ms {
                break;
            }
            count += 1;
        }
        Ok(count)
    }

    /// Case-insensitive substring search over front/back/definition.
    /// Full prefix scan; collections are small enough that an inverted index
    /// has not been worth it.
    pub fn search_cards(
        &self,
        collection_id: &str,
        query: &str,
        limit: usize,
        offset: usize,
    ) -> Result<(Vec<Card>, u64), StoreError> {
        let query_lower = query.to_lowercase();
        let mut matching = Vec::new();
        for card in self.list_cards(collection_id)? {
            let definition_hit = card
                .definition
                .as_deref()
                .map(|d| d.to_lowercase().contains(&query_lower))
                .unwrap_or(false);
            if card.front.to_lowercase().contains(&query_lower)
                || card.back.to_lowercase().contains(&query_lower)
                || definition_hit
            {
                matching.push(card);
            }
        }
        matching.sort_by(|a, b| a.front.cmp(&b.front));
        let total = matching.len() as u64;
        let items = matching.into_iter().skip(offset).take(limit).collect();
        Ok((items, total))
    }
}
