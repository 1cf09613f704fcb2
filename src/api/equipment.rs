//! Equipment API endpoints
//!
//! Handles HTTP requests for the equipment catalog:
//! - GET /api/equipamentos - List the catalog
//! - GET /api/equipamentos/{id} - Fetch one item
//! - POST /api/equipamentos - Create an item (admin)
//! - PUT /api/equipamentos/{id} - Replace an item (admin)
//! - DELETE /api/equipamentos/{id} - Delete an item and its comments (admin)
//!
//! Read routes require a session; writes additionally require the
//! administrator profile. Both are enforced by the router middleware.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::api::responses::{CreatedResponse, MessageResponse};
use crate::models::{CreateEquipmentInput, Equipment, UpdateEquipmentInput};
use crate::services::EquipmentServiceError;

/// Equipment item as presented on the wire
#[derive(Debug, Serialize)]
pub struct EquipmentResponse {
    pub id: i64,
    pub nome: String,
    pub descricao: String,
    pub url_imagem: String,
    pub status_ativo: bool,
    pub data_inclusao: NaiveDate,
}

impl From<Equipment> for EquipmentResponse {
    fn from(equipment: Equipment) -> Self {
        Self {
            id: equipment.id,
            nome: equipment.name,
            descricao: equipment.description,
            url_imagem: equipment.image_url,
            status_ativo: equipment.active,
            data_inclusao: equipment.created_on,
        }
    }
}

/// Request body for creating equipment.
///
/// Fields are optional at this level so missing ones surface as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct CreateEquipmentRequest {
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub url_imagem: Option<String>,
    pub status_ativo: Option<bool>,
}

/// Request body for replacing an equipment item
#[derive(Debug, Deserialize)]
pub struct UpdateEquipmentRequest {
    pub nome: Option<String>,
    pub descricao: Option<String>,
    pub url_imagem: Option<String>,
    pub status_ativo: Option<bool>,
}

fn map_service_error(e: EquipmentServiceError) -> ApiError {
    match e {
        EquipmentServiceError::ValidationError(msg) => ApiError::validation_error(msg),
        EquipmentServiceError::NotFound => ApiError::not_found("Equipment not found"),
        EquipmentServiceError::InternalError(e) => {
            tracing::error!("Equipment operation failed: {}", e);
            ApiError::internal_error("Internal server error")
        }
    }
}

/// GET /api/equipamentos
pub async fn list_equipment(
    State(state): State<AppState>,
) -> Result<Json<Vec<EquipmentResponse>>, ApiError> {
    let items = state
        .equipment_service
        .list()
        .await
        .map_err(map_service_error)?;

    Ok(Json(
        items.into_iter().map(EquipmentResponse::from).collect(),
    ))
}

/// GET /api/equipamentos/{id}
pub async fn get_equipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<EquipmentResponse>, ApiError> {
    let equipment = state
        .equipment_service
        .get_by_id(id)
        .await
        .map_err(map_service_error)?;

    Ok(Json(equipment.into()))
}

/// POST /api/equipamentos
pub async fn create_equipment(
    State(state): State<AppState>,
    Json(body): Json<CreateEquipmentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CreateEquipmentInput {
        name: body.nome.unwrap_or_default(),
        description: body.descricao.unwrap_or_default(),
        image_url: body.url_imagem.unwrap_or_default(),
        active: body.status_ativo.unwrap_or(true),
    };

    let equipment = state
        .equipment_service
        .create(input)
        .await
        .map_err(map_service_error)?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse::new(equipment.id, "Equipment created")),
    ))
}

/// PUT /api/equipamentos/{id}
pub async fn update_equipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateEquipmentRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let input = UpdateEquipmentInput {
        name: body.nome.unwrap_or_default(),
        description: body.descricao.unwrap_or_default(),
        image_url: body.url_imagem.unwrap_or_default(),
        active: body.status_ativo,
    };

    state
        .equipment_service
        .update(id, input)
        .await
        .map_err(map_service_error)?;

    Ok(Json(MessageResponse::new("Equipment updated")))
}

/// DELETE /api/equipamentos/{id}
///
/// Removes the item together with every comment that references it.
pub async fn delete_equipment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .equipment_service
        .delete(id)
        .await
        .map_err(map_service_error)?;

    Ok(Json(MessageResponse::new("Equipment deleted")))
}
