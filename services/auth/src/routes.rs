//! Authentication service routes

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::{
    AuthState,
    error::AuthError,
    models::{NewUser, Role, UserProfile},
    validation::{validate_email, validate_password, validate_phone, validate_username},
};

/// Request for user registration
#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(alias = "handle")]
    pub username: Option<String>,
    #[serde(alias = "secret")]
    pub password: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Request for user login
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "handle")]
    pub username: Option<String>,
    #[serde(alias = "secret")]
    pub password: Option<String>,
}

/// Response for user login
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

/// Create the router for the authentication endpoints
pub fn create_router(state: AuthState) -> Router {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .with_state(state)
}

/// User registration endpoint
pub async fn register(
    State(state): State<AuthState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(|e| AuthError::Validation(e.body_text()))?;

    let (Some(username), Some(password), Some(email), Some(phone)) =
        (payload.username, payload.password, payload.email, payload.phone)
    else {
        return Err(AuthError::Validation("Please fill all fields".to_string()));
    };

    validate_username(&username).map_err(AuthError::Validation)?;
    validate_password(&password).map_err(AuthError::Validation)?;
    validate_email(&email).map_err(AuthError::Validation)?;
    validate_phone(&phone).map_err(AuthError::Validation)?;

    let new_user = NewUser {
        username,
        password,
        email,
        phone,
        role: Role::User,
    };
    let id = state.user_repository.create(&new_user).await?;
    info!("Registered user {} with id {}", new_user.username, id);

    Ok(Json(json!({ "message": "User registered successfully" })))
}

/// User login endpoint
pub async fn login(
    State(state): State<AuthState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AuthError> {
    let Json(payload) = payload.map_err(|e| AuthError::Validation(e.body_text()))?;

    let (Some(username), Some(password)) = (payload.username, payload.password) else {
        return Err(AuthError::Validation(
            "Username and password are required".to_string(),
        ));
    };

    info!("Login attempt for user: {}", username);

    let user = state
        .user_repository
        .authenticate(&username, &password)
        .await
        .inspect_err(|_| warn!("Failed login for user: {}", username))?;

    let token = state.jwt_service.issue(&user)?;

    Ok(Json(LoginResponse {
        token,
        user: UserProfile::from(&user),
    }))
}
