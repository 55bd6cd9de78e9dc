//! Bookmark repository for database operations

use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;

use crate::models::{Bookmark, MediaWithOwner};

/// Saved-media ledger backed by the `saved_media` table
#[derive(Clone)]
pub struct BookmarkRepository {
    pool: SqlitePool,
}

impl BookmarkRepository {
    /// Create a new bookmark repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Save `media_id` for `user_id`
    ///
    /// The store rejects a repeated pair (unique constraint) and a missing
    /// media item (foreign key); both come back as constraint violations.
    pub async fn save(&self, user_id: i64, media_id: i64) -> DatabaseResult<Bookmark> {
        sqlx::query_as::<_, Bookmark>(
            r#"
            INSERT INTO saved_media (user_id, media_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, media_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(media_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    /// Media saved by `user_id`, in the order it was saved
    pub async fn list_saved(&self, user_id: i64) -> DatabaseResult<Vec<MediaWithOwner>> {
        sqlx::query_as::<_, MediaWithOwner>(
            r#"
            SELECT media.id, media.user_id, media.filename, media.type, media.description,
                   media.created_at, users.username
            FROM saved_media
            JOIN media ON saved_media.media_id = media.id
            JOIN users ON media.user_id = users.id
            WHERE saved_media.user_id = $1
            ORDER BY saved_media.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }
}
