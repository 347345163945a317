use std::collections::{HashMap, HashSet};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::info;

use crate::database::connection::DatabaseManager;
use crate::database::legacy::load_legacy_users;
use crate::database::models::UserRecord;
use crate::database::StoreError;
use crate::utils::logging::{log_store_error, log_store_operation};

/// Per-user state: an in-memory index over the `users` table. Writes hit
/// SQLite first and the index second, under one async mutex.
pub struct UserStore {
    db: DatabaseManager,
    index: Mutex<HashMap<i64, UserRecord>>,
}

/// Where the startup load found its users.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub legacy: usize,
    /// Legacy users that had no database row and were written through.
    pub imported: usize,
    pub durable: usize,
    pub total: usize,
}

impl UserStore {
    pub fn new(db: DatabaseManager) -> Self {
        Self {
            db,
            index: Mutex::new(HashMap::new()),
        }
    }

    /// Fills the index: legacy import first, then the database on top, so
    /// stored rows win on id collisions.
    pub async fn load(&self, legacy_file: Option<&Path>) -> Result<LoadSummary, StoreError> {
        let legacy = match legacy_file {
            Some(path) => load_legacy_users(path).await,
            None => Vec::new(),
        };
        let durable = UserRecord::find_all(&self.db.pool).await?;

        let durable_ids: HashSet<i64> = durable.iter().map(|user| user.id).collect();
        let (legacy_count, durable_count) = (legacy.len(), durable.len());

        let mut index = self.index.lock().await;
        let mut imported = 0;
        for user in legacy {
            // Legacy-only users are written through once so the import never has to run again.
            if !durable_ids.contains(&user.id) {
                self.persist(&user).await?;
                imported += 1;
            }
            index.insert(user.id, user);
        }
        for user in durable {
            index.insert(user.id, user);
        }

        let summary = LoadSummary {
            legacy: legacy_count,
            imported,
            durable: durable_count,
            total: index.len(),
        };
        info!(
            "Loaded {} users ({} from legacy import, {} newly imported, {} from database)",
            summary.total, summary.legacy, summary.imported, summary.durable
        );
        Ok(summary)
    }

    pub async fn get(&self, user_id: i64) -> Option<UserRecord> {
        self.index.lock().await.get(&user_id).cloned()
    }

    /// Persists `record` and mirrors it into the index.
    pub async fn upsert(&self, record: UserRecord) -> Result<(), StoreError> {
        let mut index = self.index.lock().await;
        self.persist(&record).await?;
        index.insert(record.id, record);
        Ok(())
    }

    pub async fn list_all(&self) -> Vec<UserRecord> {
        let mut users: Vec<UserRecord> = self.index.lock().await.values().cloned().collect();
        users.sort_by_key(|user| user.id);
        users
    }

    pub async fn len(&self) -> usize {
        self.index.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.index.lock().await.is_empty()
    }

    /// Returns the existing record, or creates and persists a default one.
    pub async fn get_or_create(&self, user_id: i64) -> Result<UserRecord, StoreError> {
        let mut index = self.index.lock().await;
        if let Some(user) = index.get(&user_id) {
            return Ok(user.clone());
        }

        let user = UserRecord::new(user_id);
        self.persist(&user).await?;
        index.insert(user_id, user.clone());
        info!("Registered new user {}", user_id);
        Ok(user)
    }

    /// Read-modify-write of one record under the store lock.
    ///
    /// `apply` works on a copy; the copy replaces the stored record only once
    /// it has been written to the database. Returns `None` for unknown ids.
    pub async fn update<T, F>(&self, user_id: i64, apply: F) -> Result<Option<(UserRecord, T)>, StoreError>
    where
        F: FnOnce(&mut UserRecord) -> T,
    {
        let mut index = self.index.lock().await;
        let Some(current) = index.get(&user_id) else {
            return Ok(None);
        };

        let mut updated = current.clone();
        let outcome = apply(&mut updated);
        if updated != *current {
            self.persist(&updated).await?;
            index.insert(user_id, updated.clone());
        }
        Ok(Some((updated, outcome)))
    }

    async fn persist(&self, record: &UserRecord) -> Result<(), StoreError> {
        log_store_operation("upsert", record.id);
        record.save(&self.db.pool).await.map_err(|e| {
            log_store_error("upsert", record.id, &e.to_string());
            e
        })
    }
}
