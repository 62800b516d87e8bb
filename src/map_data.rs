// ABOUTME: Geometry-level endpoints with the visibility filter applied per request
// ABOUTME: Restricted users only see and touch points inside their permitted polygons

use axum::{
    extract::{Path, State},
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

use crate::access::{self, DatasetAccess};
use crate::entities::{dataset, geometry};
use crate::error::AppError;
use crate::types::{
    CreateGeometryRequest, CreateGeometryResponse, EntryValue, GeometryDetail,
    GeometryDetailResponse, MapDataPoint, MapDataResponse, SaveEntriesRequest,
    UpdateGeometryRequest,
};
use crate::{AppState, session};

pub async fn map_data(
    State(state): State<AppState>,
    Path(dataset_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<Json<MapDataResponse>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;
    let dataset = load_dataset(&state, dataset_id).await?;

    let user_access = access::resolve(&state.storage, &dataset, session_data.user_id).await?;
    if user_access.is_denied() {
        return Err(AppError::Forbidden(
            "You do not have access to this dataset".to_string(),
        ));
    }

    let geometries = state.storage.geometries_for_dataset(dataset.id).await?;
    let map_data = geometries
        .into_iter()
        .filter(|model| user_access.allows_point(model.lon, model.lat))
        .map(|model| MapDataPoint {
            id: model.id,
            id_kurz: model.id_kurz,
            address: model.address,
            lon: model.lon,
            lat: model.lat,
        })
        .collect();

    Ok(Json(MapDataResponse { map_data }))
}

pub async fn geometry_detail(
    State(state): State<AppState>,
    Path(geometry_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<Json<GeometryDetailResponse>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;
    let (model, _dataset, _user_access) =
        visible_geometry(&state, geometry_id, session_data.user_id).await?;

    let entries = state
        .storage
        .entries_for_geometry(model.id)
        .await?
        .into_iter()
        .map(|entry| EntryValue {
            field_id: entry.field_id,
            value: entry.value,
        })
        .collect();

    Ok(Json(GeometryDetailResponse {
        success: true,
        geometry: GeometryDetail {
            id: model.id,
            dataset_id: model.dataset_id,
            id_kurz: model.id_kurz,
            address: model.address,
            lon: model.lon,
            lat: model.lat,
            created_at: model.created_at,
            entries,
        },
    }))
}

pub async fn create_geometry(
    State(state): State<AppState>,
    Path(dataset_id): Path<Uuid>,
    jar: CookieJar,
    Json(req): Json<CreateGeometryRequest>,
) -> Result<Json<CreateGeometryResponse>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;
    let dataset = load_dataset(&state, dataset_id).await?;

    let user_access = access::resolve(&state.storage, &dataset, session_data.user_id).await?;
    if !user_access.allows_point(req.lon, req.lat) {
        return Err(AppError::Forbidden(
            "Location is outside your permitted mapping areas".to_string(),
        ));
    }

    let model = state
        .storage
        .create_geometry(dataset.id, &req.id_kurz, &req.address, req.lon, req.lat)
        .await?;

    Ok(Json(CreateGeometryResponse {
        success: true,
        geometry_id: model.id,
    }))
}

pub async fn update_geometry(
    State(state): State<AppState>,
    Path(geometry_id): Path<Uuid>,
    jar: CookieJar,
    Json(req): Json<UpdateGeometryRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;
    let (model, _dataset, user_access) =
        visible_geometry(&state, geometry_id, session_data.user_id).await?;

    // Moving a point requires the target location to be permitted as well,
    // otherwise a restricted user could push data out of their own view.
    let target_lon = req.lon.unwrap_or(model.lon);
    let target_lat = req.lat.unwrap_or(model.lat);
    if !user_access.allows_point(target_lon, target_lat) {
        return Err(AppError::Forbidden(
            "Target location is outside your permitted mapping areas".to_string(),
        ));
    }

    state.storage.update_geometry(model, &req).await?;

    Ok(Json(serde_json::json!({"success": true})))
}

pub async fn delete_geometry(
    State(state): State<AppState>,
    Path(geometry_id): Path<Uuid>,
    jar: CookieJar,
) -> Result<Json<serde_json::Value>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;
    let (model, _dataset, _user_access) =
        visible_geometry(&state, geometry_id, session_data.user_id).await?;

    state.storage.delete_geometry(model.id).await?;

    Ok(Json(serde_json::json!({"success": true})))
}

pub async fn save_entries(
    State(state): State<AppState>,
    Path(geometry_id): Path<Uuid>,
    jar: CookieJar,
    Json(req): Json<SaveEntriesRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session_data = session::extract_session_from_jar(&jar, &state.sessions)?;
    let (model, dataset, _user_access) =
        visible_geometry(&state, geometry_id, session_data.user_id).await?;

    let known_fields: Vec<Uuid> = state
        .storage
        .fields_for_dataset(dataset.id)
        .await?
        .into_iter()
        .map(|field| field.id)
        .collect();
    if let Some(unknown) = req
        .entries
        .iter()
        .find(|entry| !known_fields.contains(&entry.field_id))
    {
        return Err(AppError::BadRequest(format!(
            "Field {} does not belong to this dataset",
            unknown.field_id
        )));
    }

    let values: Vec<(Uuid, String)> = req
        .entries
        .into_iter()
        .map(|entry| (entry.field_id, entry.value))
        .collect();
    state.storage.save_entries(model.id, &values).await?;

    Ok(Json(serde_json::json!({"success": true})))
}

/// Loads a geometry and checks the requester may see it: the dataset access
/// level must allow the point's location. Out-of-area points are a 403, not
/// a 404: the geometry id is not secret, the data behind it is.
async fn visible_geometry(
    state: &AppState,
    geometry_id: Uuid,
    user_id: Uuid,
) -> Result<(geometry::Model, dataset::Model, DatasetAccess), AppError> {
    let model = state
        .storage
        .get_geometry(geometry_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Geometry {}", geometry_id)))?;

    let dataset = state
        .storage
        .get_dataset(model.dataset_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Dataset {}", model.dataset_id)))?;

    let user_access = access::resolve(&state.storage, &dataset, user_id).await?;
    if !user_access.allows_point(model.lon, model.lat) {
        return Err(AppError::Forbidden(
            "You do not have access to this geometry".to_string(),
        ));
    }

    Ok((model, dataset, user_access))
}

async fn load_dataset(state: &AppState, dataset_id: Uuid) -> Result<dataset::Model, AppError> {
    state
        .storage
        .get_dataset(dataset_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Dataset {}", dataset_id)))
}
