use crate::store::operations::cards::Card;
use crate::store::{keys, Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_card_due_index", m002_card_due_index),
    ]
}

/// 执行所有未应用的数据库迁移。
///
/// 迁移设计原则：
/// - 每个迁移函数必须是幂等的：迁移可能在 func() 成功但 set_version() 之前
///   因进程崩溃而中断，重启后会重新执行该迁移。
/// - 版本号在每个迁移成功后立即持久化，已完成的迁移不会重复执行。
/// - 仅向前：set_version 拒绝降级。
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    let all = migrations();

    for (index, (name, func)) in all.iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.config_versions.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            let bytes: [u8; 4] = raw.as_ref().try_into().unwrap_or([0; 4]);
            Ok(u32::from_be_bytes(bytes))
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .config_versions
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Rebuild the due index from the card records. Databases created before the
/// index existed get it backfilled; rebuilding over an existing index is a
/// no-op because the keys are derived from card state.
fn m002_card_due_index(store: &Store) -> Result<(), StoreError> {
    for item in store.cards.iter() {
        let (_, value) = item?;
        let card: Card = Store::deserialize(&value)?;
        let due_key = keys::card_due_index_key(
            &card.collection_id,
            card.spaced_repetition.next_review_at.timestamp_millis(),
            &card.id,
        )?;
        store.card_due_index.insert(due_key.as_bytes(), &[])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn migrations_run_once_and_record_version() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        run(&store).unwrap();
        let version = get_current_version(&store).unwrap();
        assert_eq!(version as usize, migrations().len());

        // Second run is a no-op.
        run(&store).unwrap();
        assert_eq!(get_current_version(&store).unwrap(), version);
    }

    #[test]
    fn downgrade_is_refused() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db-down").to_str().unwrap()).unwrap();

        run(&store).unwrap();
        assert!(set_version(&store, 0).is_err());
    }
}
