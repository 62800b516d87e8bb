// ABOUTME: Dataset listing/creation, field definitions, and the access-management endpoint
// ABOUTME: Sharing and restriction rows are replaced wholesale in one transaction

use axum::{
    extract::{Path, State},
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use std::collections::HashSet;
use uuid::Uuid;

use crate::entities::dataset;
use crate::error::AppError;
use crate::types::{
    AccessUpdateRequest, CreateDatasetRequest, CreateDatasetResponse, CreateFieldRequest,
    CreateFieldResponse, DatasetInfo, DatasetListResponse, FieldInfo, FieldListResponse,
};
use crate::{AppState, access, session};

pub async fn list_datasets(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<DatasetListResponse>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;

    let datasets = state.storage.datasets_for_user(session_data.user_id).await?;
    let datasets = datasets
        .into_iter()
        .map(|model| DatasetInfo {
            id: model.id,
            name: model.name,
            description: model.description,
            owner_id: model.owner_id,
            created_at: model.created_at,
        })
        .collect();

    Ok(Json(DatasetListResponse { datasets }))
}

pub async fn create_dataset(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<CreateDatasetRequest>,
) -> Result<Json<CreateDatasetResponse>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;

    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Dataset name must not be empty".to_string()));
    }

    let dataset = state
        .storage
        .create_dataset(session_data.user_id, &req.name, &req.description)
        .await?;

    Ok(Json(CreateDatasetResponse {
        success: true,
        dataset_id: dataset.id,
    }))
}

pub async fn list_fields(
    State(state): State<AppState>,
    Path(dataset_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<Json<FieldListResponse>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;
    let dataset = load_dataset(&state, dataset_id).await?;

    let user_access = access::resolve(&state.storage, &dataset, session_data.user_id).await?;
    if user_access.is_denied() {
        return Err(AppError::Forbidden(
            "You do not have access to this dataset".to_string(),
        ));
    }

    let fields = state.storage.fields_for_dataset(dataset.id).await?;
    let fields = fields
        .into_iter()
        .map(|model| FieldInfo {
            id: model.id,
            name: model.name,
            field_type: model.field_type,
            position: model.position,
        })
        .collect();

    Ok(Json(FieldListResponse { fields }))
}

pub async fn create_field(
    State(state): State<AppState>,
    Path(dataset_id): Path<Uuid>,
    jar: CookieJar,
    Json(req): Json<CreateFieldRequest>,
) -> Result<Json<CreateFieldResponse>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;
    let dataset = load_dataset(&state, dataset_id).await?;
    access::ensure_owner(&dataset, session_data.user_id)?;

    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Field name must not be empty".to_string()));
    }

    let field = state
        .storage
        .create_field(dataset.id, &req.name, &req.field_type, req.position)
        .await?;

    Ok(Json(CreateFieldResponse {
        success: true,
        field_id: field.id,
    }))
}

/// Replaces the dataset's sharing lists and restriction rows. Owner-only;
/// selected mapping areas must belong to the dataset or the whole request is
/// rejected without partial state.
pub async fn update_access(
    State(state): State<AppState>,
    Path(dataset_id): Path<Uuid>,
    jar: CookieJar,
    Json(req): Json<AccessUpdateRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;
    let dataset = load_dataset(&state, dataset_id).await?;
    access::ensure_owner(&dataset, session_data.user_id)?;

    let mut referenced: Vec<Uuid> = req
        .users
        .iter()
        .flat_map(|entry| entry.mapping_areas.iter().copied())
        .chain(
            req.groups
                .iter()
                .flat_map(|entry| entry.mapping_areas.iter().copied()),
        )
        .collect();
    referenced.sort();
    referenced.dedup();

    let known = state.storage.mapping_areas_by_ids(&referenced).await?;
    let valid: HashSet<Uuid> = known
        .iter()
        .filter(|area| area.dataset_id == dataset.id)
        .map(|area| area.id)
        .collect();
    if let Some(unknown) = referenced.iter().find(|id| !valid.contains(id)) {
        return Err(AppError::BadRequest(format!(
            "Mapping area {} does not belong to this dataset",
            unknown
        )));
    }

    state
        .storage
        .replace_access(dataset.id, &req.users, &req.groups)
        .await?;

    Ok(Json(serde_json::json!({"success": true})))
}

async fn load_dataset(state: &AppState, dataset_id: Uuid) -> Result<dataset::Model, AppError> {
    state
        .storage
        .get_dataset(dataset_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Dataset {}", dataset_id)))
}
