// ABOUTME: Type definitions for API requests, responses, and internal data structures
// ABOUTME: Includes auth payloads, mapping-area shapes, map-data rows, and entry values

use geojson::Geometry as GeoJsonGeometry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Auth related types
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub display_name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub success: bool,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user_id: Uuid,
}

// Dataset types
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDatasetRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateDatasetResponse {
    pub success: bool,
    pub dataset_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub owner_id: Uuid,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatasetListResponse {
    pub datasets: Vec<DatasetInfo>,
}

// Field types
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFieldRequest {
    pub name: String,
    pub field_type: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateFieldResponse {
    pub success: bool,
    pub field_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FieldInfo {
    pub id: Uuid,
    pub name: String,
    pub field_type: String,
    pub position: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FieldListResponse {
    pub fields: Vec<FieldInfo>,
}

// Mapping area types
#[derive(Debug, Serialize, Deserialize)]
pub struct MappingAreaPayload {
    pub name: String,
    pub geometry: GeoJsonGeometry,
    #[serde(default)]
    pub allocated_users: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MappingAreaInfo {
    pub id: Uuid,
    pub name: String,
    pub geometry: GeoJsonGeometry,
    pub allocated_users: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MappingAreaListResponse {
    pub success: bool,
    pub mapping_areas: Vec<MappingAreaInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MappingAreaResponse {
    pub success: bool,
    pub mapping_area: MappingAreaInfo,
}

// Access management types
#[derive(Debug, Serialize, Deserialize)]
pub struct UserAccessEntry {
    pub user_id: Uuid,
    #[serde(default)]
    pub mapping_areas: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupAccessEntry {
    pub group_id: Uuid,
    #[serde(default)]
    pub mapping_areas: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AccessUpdateRequest {
    #[serde(default)]
    pub users: Vec<UserAccessEntry>,
    #[serde(default)]
    pub groups: Vec<GroupAccessEntry>,
}

// Map data and geometry types
#[derive(Debug, Serialize, Deserialize)]
pub struct MapDataPoint {
    pub id: Uuid,
    pub id_kurz: String,
    pub address: String,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MapDataResponse {
    pub map_data: Vec<MapDataPoint>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGeometryRequest {
    pub id_kurz: String,
    #[serde(default)]
    pub address: String,
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGeometryResponse {
    pub success: bool,
    pub geometry_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateGeometryRequest {
    pub id_kurz: Option<String>,
    pub address: Option<String>,
    pub lon: Option<f64>,
    pub lat: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct EntryValue {
    pub field_id: Uuid,
    pub value: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SaveEntriesRequest {
    pub entries: Vec<EntryValue>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeometryDetail {
    pub id: Uuid,
    pub dataset_id: Uuid,
    pub id_kurz: String,
    pub address: String,
    pub lon: f64,
    pub lat: f64,
    pub created_at: i64,
    pub entries: Vec<EntryValue>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeometryDetailResponse {
    pub success: bool,
    pub geometry: GeometryDetail,
}
