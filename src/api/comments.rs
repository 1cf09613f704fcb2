//! Comment API endpoints
//!
//! Handles HTTP requests for equipment comments:
//! - GET /api/comentarios/equipamento/{equipamento_id} - Comments for an item
//! - POST /api/comentarios - Leave a comment
//! - GET /api/comentarios/{id} - Fetch one comment
//! - PUT /api/comentarios/{id} - Edit a comment (author or admin)
//! - DELETE /api/comentarios/{id} - Remove a comment (author or admin)
//!
//! All routes require a session; ownership checks happen in the service.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState, CurrentUser};
use crate::api::responses::{CreatedResponse, MessageResponse};
use crate::models::{CommentWithAuthor, CreateCommentInput};
use crate::services::CommentServiceError;

/// Comment as presented in listings.
///
/// Listing rows omit the raw user and equipment ids; the client only needs
/// the author display fields.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub texto: String,
    pub data_inclusao: NaiveDate,
    pub usuario_login: String,
    pub usuario_perfil: String,
}

impl From<CommentWithAuthor> for CommentResponse {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            id: comment.id,
            texto: comment.text,
            data_inclusao: comment.created_on,
            usuario_login: comment.author_login,
            usuario_perfil: comment.author_profile,
        }
    }
}

/// Single comment with full references
#[derive(Debug, Serialize)]
pub struct CommentDetailResponse {
    pub id: i64,
    pub texto: String,
    pub data_inclusao: NaiveDate,
    pub usuario_id: i64,
    pub equipamento_id: i64,
    pub usuario_login: String,
    pub usuario_perfil: String,
}

impl From<CommentWithAuthor> for CommentDetailResponse {
    fn from(comment: CommentWithAuthor) -> Self {
        Self {
            id: comment.id,
            texto: comment.text,
            data_inclusao: comment.created_on,
            usuario_id: comment.user_id,
            equipamento_id: comment.equipment_id,
            usuario_login: comment.author_login,
            usuario_perfil: comment.author_profile,
        }
    }
}

/// Request body for leaving a comment.
///
/// Fields are optional at this level so missing ones surface as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub texto: Option<String>,
    pub equipamento_id: Option<i64>,
}

/// Request body for editing a comment
#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub texto: Option<String>,
}

fn map_service_error(e: CommentServiceError) -> ApiError {
    match e {
        CommentServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        CommentServiceError::EquipmentNotFound => ApiError::not_found("Equipment not found"),
        CommentServiceError::CommentNotFound => ApiError::not_found("Comment not found"),
        CommentServiceError::Forbidden(msg) => ApiError::forbidden(msg),
        CommentServiceError::InternalError(e) => {
            tracing::error!("Comment operation failed: {}", e);
            ApiError::internal_error("Internal server error")
        }
    }
}

/// Build the comment routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/equipamento/{equipamento_id}", get(list_comments))
        .route("/", post(create_comment))
        .route(
            "/{id}",
            get(get_comment).put(update_comment).delete(delete_comment),
        )
}

/// GET /api/comentarios/equipamento/{equipamento_id}
///
/// Newest first; an item without comments yields an empty list.
async fn list_comments(
    State(state): State<AppState>,
    Path(equipamento_id): Path<i64>,
) -> Result<Json<Vec<CommentResponse>>, ApiError> {
    let comments = state
        .comment_service
        .list_for_equipment(equipamento_id)
        .await
        .map_err(map_service_error)?;

    Ok(Json(
        comments.into_iter().map(CommentResponse::from).collect(),
    ))
}

/// POST /api/comentarios
async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CreateCommentInput {
        text: body.texto.unwrap_or_default(),
        equipment_id: body.equipamento_id,
    };

    let comment = state
        .comment_service
        .create(input, user.0.user_id)
        .await
        .map_err(map_service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(comment.id, "Comment created")),
    ))
}

/// GET /api/comentarios/{id}
async fn get_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CommentDetailResponse>, ApiError> {
    let comment = state
        .comment_service
        .get_by_id(id)
        .await
        .map_err(map_service_error)?;

    Ok(Json(comment.into()))
}

/// PUT /api/comentarios/{id}
///
/// Only the author or an administrator may edit.
async fn update_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(body): Json<UpdateCommentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let text = body.texto.unwrap_or_default();

    state
        .comment_service
        .update(id, &text, user.0.user_id, user.0.is_admin())
        .await
        .map_err(map_service_error)?;

    Ok(Json(MessageResponse::new("Comment updated")))
}

/// DELETE /api/comentarios/{id}
///
/// Only the author or an administrator may delete.
async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .comment_service
        .delete(id, user.0.user_id, user.0.is_admin())
        .await
        .map_err(map_service_error)?;

    Ok(Json(MessageResponse::new("Comment deleted")))
}
