//! Credential store and token service for the gallery
//!
//! Users register and log in through the `/auth` routes; every other service
//! identifies callers through [`middleware::require_auth`], which trusts the
//! signed token claims without touching the database.

pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod validation;

use crate::{jwt::JwtService, repositories::UserRepository};

/// State shared by the authentication handlers
#[derive(Clone)]
pub struct AuthState {
    pub user_repository: UserRepository,
    pub jwt_service: JwtService,
}
