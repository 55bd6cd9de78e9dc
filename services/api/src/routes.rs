//! API service routes

use auth::middleware::{AuthUser, require_auth};
use axum::{
    Extension, Json, Router,
    body::Bytes,
    extract::{Multipart, Path, State, multipart::MultipartRejection},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use media::MediaKind;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    models::{MediaResponse, MediaWithOwner, NewMedia},
};

/// File part of an upload form
struct UploadedFile {
    original_name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// Create the router for the media endpoints
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/media/upload", post(upload_media))
        .route("/media/save/:id", post(save_media))
        .route("/media/user/saved", get(get_saved_media))
        .route_layer(middleware::from_fn_with_state(
            state.jwt_service.clone(),
            require_auth,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/media", get(list_media))
        .route("/media/:id", get(get_media_item))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    common::database::health_check(&state.db_pool).await?;

    Ok(Json(json!({
        "status": "ok",
        "service": "api-service"
    })))
}

/// Upload a file and record it in the catalog
pub async fn upload_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let mut multipart = multipart.map_err(|e| ApiError::from_upload(e.status(), e.body_text()))?;

    let mut file: Option<UploadedFile> = None;
    let mut caption: Option<String> = None;
    let mut kind: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Multipart parsing error: {}", e);
        ApiError::from_upload(e.status(), e.body_text())
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let original_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    warn!("Error reading file data for {}: {}", original_name, e);
                    ApiError::from_upload(e.status(), e.body_text())
                })?;
                file = Some(UploadedFile {
                    original_name,
                    content_type,
                    data,
                });
            }
            "caption" | "description" => {
                caption = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::from_upload(e.status(), e.body_text()))?,
                );
            }
            "kind" | "type" => {
                kind = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::from_upload(e.status(), e.body_text()))?,
                );
            }
            _ => {
                warn!("Ignoring unknown upload field: {}", field_name);
            }
        }
    }

    let file = file.ok_or_else(|| ApiError::Validation("No file uploaded".to_string()))?;

    info!(
        "User {} uploading {} ({} bytes) via {} storage",
        user.id,
        file.original_name,
        file.data.len(),
        state.storage.name()
    );

    let stored = state
        .storage
        .store(file.data, &file.original_name, file.content_type.as_deref())
        .await?;

    let new_media = NewMedia {
        user_id: user.id,
        reference: stored.reference,
        kind: match kind.as_deref() {
            Some(kind) => MediaKind::parse_or_default(Some(kind)),
            None => stored.detected_kind.unwrap_or_default(),
        },
        caption: caption.unwrap_or_default(),
    };

    let item = state
        .media_repository
        .create(&new_media)
        .await
        .map_err(|e| {
            // The stored object stays behind; there is no blob cleanup.
            error!(
                "Catalog insert failed after storing {}: {}",
                new_media.reference, e
            );
            e
        })?;

    let url = state.storage.resolve(&item.filename);

    Ok(Json(json!({
        "message": "Upload successful",
        "media": MediaResponse::new(item, Some(user.username), url),
    })))
}

/// List every media item, newest first
pub async fn list_media(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let items = state.media_repository.list_all().await?;
    Ok(Json(to_responses(&state, items)))
}

/// Get a media item by ID
pub async fn get_media_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_media_id(&id)?;

    let item = state
        .media_repository
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Media not found".to_string()))?;

    let url = state.storage.resolve(&item.filename);
    Ok(Json(MediaResponse::new(item, None, url)))
}

/// Bookmark a media item for the caller
pub async fn save_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let media_id = parse_media_id(&id)?;

    state
        .bookmark_repository
        .save(user.id, media_id)
        .await
        .map_err(|e| {
            if e.is_constraint_violation() {
                ApiError::Conflict("Already saved or invalid media".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

    info!("User {} saved media {}", user.id, media_id);
    Ok(Json(json!({ "message": "Media saved" })))
}

/// Media the caller has bookmarked
pub async fn get_saved_media(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let items = state.bookmark_repository.list_saved(user.id).await?;
    Ok(Json(to_responses(&state, items)))
}

fn parse_media_id(raw: &str) -> ApiResult<i64> {
    raw.parse()
        .map_err(|_| ApiError::Validation("Invalid media id".to_string()))
}

fn to_responses(state: &AppState, items: Vec<MediaWithOwner>) -> Vec<MediaResponse> {
    items
        .into_iter()
        .map(|row| {
            let url = state.storage.resolve(&row.item.filename);
            MediaResponse::new(row.item, Some(row.username), url)
        })
        .collect()
}
