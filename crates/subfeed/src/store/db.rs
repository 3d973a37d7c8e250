use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait, Set, sea_query::OnConflict};

use super::{CacheStore, Result};
use crate::entity::cache_blob::{ActiveModel, Column, Entity as CacheBlob};

/// [`CacheStore`] backed by the `cache_blob` table. Clones share the
/// connection.
#[derive(Clone)]
pub struct DbStore {
    db: Arc<DatabaseConnection>,
}

impl DbStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::from_shared(Arc::new(db))
    }

    pub fn from_shared(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl CacheStore for DbStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entry = CacheBlob::find_by_id(key.to_string()).one(self.db.as_ref()).await?;
        Ok(entry.map(|e| e.value))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let model = ActiveModel {
            key: Set(key.to_string()),
            value: Set(value.to_string()),
            updated_at: Set(Utc::now().fixed_offset()),
        };

        CacheBlob::insert(model)
            .on_conflict(
                OnConflict::column(Column::Key)
                    .update_columns([Column::Value, Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(self.db.as_ref())
            .await?;

        tracing::debug!(key, bytes = value.len(), "Stored cache blob");
        Ok(())
    }
}
