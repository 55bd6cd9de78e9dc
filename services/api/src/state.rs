//! Application state shared across handlers

use auth::{AuthState, jwt::JwtService, repositories::UserRepository};
use media::MediaStorage;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::repositories::{BookmarkRepository, MediaRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub user_repository: UserRepository,
    pub media_repository: MediaRepository,
    pub bookmark_repository: BookmarkRepository,
    pub jwt_service: JwtService,
    pub storage: Arc<dyn MediaStorage>,
}

impl AppState {
    /// Wire every repository onto one pool
    pub fn new(
        db_pool: SqlitePool,
        jwt_service: JwtService,
        storage: Arc<dyn MediaStorage>,
    ) -> Self {
        Self {
            user_repository: UserRepository::new(db_pool.clone()),
            media_repository: MediaRepository::new(db_pool.clone()),
            bookmark_repository: BookmarkRepository::new(db_pool.clone()),
            db_pool,
            jwt_service,
            storage,
        }
    }

    /// Subset of the state used by the authentication routes
    pub fn auth_state(&self) -> AuthState {
        AuthState {
            user_repository: self.user_repository.clone(),
            jwt_service: self.jwt_service.clone(),
        }
    }
}
