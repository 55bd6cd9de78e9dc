//! Bookmark model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// A user's saved media item
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Bookmark {
    pub id: i64,
    pub user_id: i64,
    pub media_id: i64,
    pub created_at: DateTime<Utc>,
}
