//! CacheBlob entity - one serialized value per well-known key.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A stored blob, addressed by key (`channels`, `watched`).
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cache_blob")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,

    /// Serialized JSON value.
    #[sea_orm(column_type = "Text")]
    pub value: String,

    /// When this key was last written.
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
