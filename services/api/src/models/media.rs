//! Media models for the API service

use chrono::{DateTime, Utc};
use media::MediaKind;
use serde::Serialize;
use sqlx::FromRow;

/// Catalog entry for an uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MediaItem {
    pub id: i64,
    pub user_id: i64,
    /// Storage reference: a local file name or a remote URL
    pub filename: String,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub kind: MediaKind,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Catalog entry joined with its owner's handle
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct MediaWithOwner {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub item: MediaItem,
    pub username: String,
}

/// Catalog insert payload
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub user_id: i64,
    pub reference: String,
    pub kind: MediaKind,
    pub caption: String,
}

/// Media as returned to clients, with the reference resolved to a locator
#[derive(Debug, Clone, Serialize)]
pub struct MediaResponse {
    #[serde(flatten)]
    pub item: MediaItem,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub url: String,
}

impl MediaResponse {
    pub fn new(item: MediaItem, username: Option<String>, url: String) -> Self {
        Self {
            item,
            username,
            url,
        }
    }
}
