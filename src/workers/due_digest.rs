use chrono::Utc;

use crate::store::operations::digests::{CollectionDueCount, DueDigest};
use crate::store::Store;

/// Snapshot per-collection due-card counts for the daily reminder view.
/// Re-running on the same day overwrites that day's digest.
pub async fn run(store: &Store) {
    match build_digest(store) {
        Ok(digest) => {
            let total_due = digest.total_due;
            if let Err(error) = store.put_due_digest(&digest) {
                tracing::error!(error = %error, "Failed to persist due digest");
                return;
            }
            tracing::info!(date = %digest.date, total_due, "Due digest generated");
        }
        Err(error) => {
            tracing::error!(error = %error, "Failed to compute due digest");
        }
    }
}

fn build_digest(store: &Store) -> Result<DueDigest, crate::store::StoreError> {
    let now = Utc::now();
    let mut collections = Vec::new();
    let mut total_due = 0u64;

    for collection in store.list_collections()? {
        let due_count = store.count_due_cards(&collection.id, now)?;
        total_due += due_count;
        collections.push(CollectionDueCount {
            collection_id: collection.id,
            name: collection.name,
            due_count,
            card_count: collection.card_count,
        });
    }

    Ok(DueDigest {
        date: now.format("%Y-%m-%d").to_string(),
        generated_at: now,
        collections,
        total_due,
    })
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use tempfile::tempdir;

    use crate::srs::scheduler;
    use crate::srs::config::SrsConfig;
    use crate::srs::types::{LearningStatus, ReviewStats};
    use crate::store::operations::cards::{Card, CardType};
    use crate::store::operations::collections::{CardCollection, DifficultyLevel};

    use super::*;

    fn collection(id: &str, name: &str) -> CardCollection {
        let now = Utc::now();
        CardCollection {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            level: DifficultyLevel::Beginner,
            card_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn due_card(collection_id: &str, id: &str) -> Card {
        let now = Utc::now();
        let mut spaced_repetition = scheduler::initial_state(&SrsConfig::default(), now);
        spaced_repetition.next_review_at = now - Duration::minutes(10);
        Card {
            id: id.to_string(),
            collection_id: collection_id.to_string(),
            front: id.to_string(),
            back: "ترجمه".to_string(),
            front_core: None,
            back_core: None,
            card_type: CardType::Word,
            part_of_speech: None,
            definition: None,
            synonyms: Vec::new(),
            antonyms: Vec::new(),
            usage_examples: Vec::new(),
            image_url: None,
            audio_url: None,
            learning_status: LearningStatus::New,
            reviewed_number: 0,
            review_stats: ReviewStats::default(),
            spaced_repetition,
            last_review_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn digest_counts_due_cards_per_collection() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        store.upsert_collection(&collection("c1", "basics")).unwrap();
        store.put_card(&due_card("c1", "a")).unwrap();
        store.put_card(&due_card("c1", "b")).unwrap();
        store.refresh_collection_count("c1").unwrap();

        run(&store).await;

        let digest = store.latest_due_digest().unwrap().expect("digest written");
        assert_eq!(digest.total_due, 2);
        assert_eq!(digest.collections.len(), 1);
        assert_eq!(digest.collections[0].due_count, 2);
        assert_eq!(digest.collections[0].card_count, 2);
    }
}
