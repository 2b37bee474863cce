use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sled::Transactional;

use crate::store::keys;
use crate::store::{Store, StoreError};

/// A named set of cards a learner studies together.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardCollection {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub level: DifficultyLevel,
    pub card_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    Elementary,
    Intermediate,
    UpperIntermediate,
    Advanced,
    Proficient,
}

impl Store {
    pub fn upsert_collection(&self, collection: &CardCollection) -> Result<(), StoreError> {
        let key = keys::collection_key(&collection.id)?;
        self.collections
            .insert(key.as_bytes(), Self::serialize(collection)?)?;
        Ok(())
    }

    pub fn get_collection(&self, collection_id: &str) -> Result<Option<CardCollection>, StoreError> {
        let key = keys::collection_key(collection_id)?;
        match self.collections.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn list_collections(&self) -> Result<Vec<CardCollection>, StoreError> {
        let mut collections = Vec::new();
        for item in self.collections.iter() {
            let (_, v) = item?;
            collections.push(Self::deserialize::<CardCollection>(&v)?);
        }
        collections.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(collections)
    }

    /// Delete a collection together with its cards and due-index entries.
    pub fn delete_collection(&self, collection_id: &str) -> Result<bool, StoreError> {
        let key = keys::collection_key(collection_id)?;
        if self.collections.get(key.as_bytes())?.is_none() {
            return Ok(false);
        }

        let card_prefix = keys::card_prefix(collection_id)?;
        let mut card_keys: Vec<Vec<u8>> = Vec::new();
        for item in self.cards.scan_prefix(card_prefix.as_bytes()) {
            let (k, _) = item?;
            card_keys.push(k.to_vec());
        }

        let due_prefix = keys::card_due_index_prefix(collection_id)?;
        let mut due_keys: Vec<Vec<u8>> = Vec::new();
        for item in self.card_due_index.scan_prefix(due_prefix.as_bytes()) {
            let (k, _) = item?;
            due_keys.push(k.to_vec());
        }

        (&self.collections, &self.cards, &self.card_due_index)
            .transaction(|(tx_collections, tx_cards, tx_due)| {
                tx_collections.remove(key.as_bytes())?;
                for k in &card_keys {
                    tx_cards.remove(k.as_slice())?;
                }
                for k in &due_keys {
                    tx_due.remove(k.as_slice())?;
                }
                Ok(())
            })
            .map_err(
                |e: sled::transaction::TransactionError<StoreError>| match e {
                    sled::transaction::TransactionError::Abort(store_err) => store_err,
                    sled::transaction::TransactionError::Storage(sled_err) => {
                        StoreError::Sled(sled_err)
                    }
                },
            )?;

        Ok(true)
    }

    /// Recount cards and write the count back onto the collection record.
    /// Called after card creation/deletion; recounting after the card write
    /// keeps the count correct even if a previous update was interrupted.
    pub fn refresh_collection_count(&self, collection_id: &str) -> Result<(), StoreError> {
        let count = self.count_cards(collection_id)?;
        let key = keys::collection_key(collection_id)?;
        if let Some(raw) = self.collections.get(key.as_bytes())? {
            let mut collection: CardCollection = Self::deserialize(&raw)?;
            collection.card_count = count;
            self.collections
                .insert(key.as_bytes(), Self::serialize(&collection)?)?;
        }
        Ok(())
    }
}
