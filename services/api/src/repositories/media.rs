//! Media repository for database operations

use chrono::Utc;
use common::error::{DatabaseError, DatabaseResult};
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{MediaItem, MediaWithOwner, NewMedia};

/// Media catalog backed by the `media` table
#[derive(Clone)]
pub struct MediaRepository {
    pool: SqlitePool,
}

impl MediaRepository {
    /// Create a new media repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record an uploaded file
    ///
    /// Fails with [`DatabaseError::ForeignKeyViolation`] when the owner does
    /// not exist.
    pub async fn create(&self, new_media: &NewMedia) -> DatabaseResult<MediaItem> {
        let item = sqlx::query_as::<_, MediaItem>(
            r#"
            INSERT INTO media (user_id, filename, type, description, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, filename, type, description, created_at
            "#,
        )
        .bind(new_media.user_id)
        .bind(&new_media.reference)
        .bind(new_media.kind)
        .bind(&new_media.caption)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_query)?;

        info!(
            "Catalogued media {} ({}) for user {}",
            item.id, item.kind, item.user_id
        );
        Ok(item)
    }

    /// All media with owner handles, newest first
    pub async fn list_all(&self) -> DatabaseResult<Vec<MediaWithOwner>> {
        sqlx::query_as::<_, MediaWithOwner>(
            r#"
            SELECT media.id, media.user_id, media.filename, media.type, media.description,
                   media.created_at, users.username
            FROM media
            JOIN users ON media.user_id = users.id
            ORDER BY media.created_at DESC, media.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }

    /// Get a media item by ID
    pub async fn get_by_id(&self, id: i64) -> DatabaseResult<Option<MediaItem>> {
        sqlx::query_as::<_, MediaItem>(
            r#"
            SELECT id, user_id, filename, type, description, created_at
            FROM media
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_query)
    }
}
