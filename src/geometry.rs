// ABOUTME: GeoJSON parsing and validation helpers bridging the wire format and geo types
// ABOUTME: Mapping areas must be polygons; anything else is rejected before persistence

use anyhow::{Context, Result};
use geo::Polygon;
use geojson::{Geometry as GeoJsonGeometry, Value};

use crate::error::AppError;

/// Validates that a client-supplied GeoJSON geometry is a polygon and
/// converts it. Non-polygon kinds (points, lines, collections) are rejected
/// with the error surfaced as a 400.
pub fn polygon_from_geojson(geometry: &GeoJsonGeometry) -> Result<Polygon<f64>, AppError> {
    match &geometry.value {
        Value::Polygon(_) => Polygon::<f64>::try_from(geometry.value.clone())
            .map_err(|_| AppError::BadRequest("Invalid geometry".to_string())),
        _ => Err(AppError::BadRequest("Invalid geometry".to_string())),
    }
}

/// Parses a polygon from the GeoJSON text stored in the mapping_areas table.
pub fn parse_stored_polygon(raw: &str) -> Result<Polygon<f64>> {
    let geometry: GeoJsonGeometry = raw
        .parse()
        .context("stored mapping area polygon is not valid GeoJSON")?;
    let polygon = Polygon::<f64>::try_from(geometry.value)
        .context("stored mapping area geometry is not a polygon")?;
    Ok(polygon)
}

pub fn polygon_to_geojson(polygon: &Polygon<f64>) -> GeoJsonGeometry {
    GeoJsonGeometry::new(Value::from(polygon))
}

/// Canonical storage form: the validated polygon serialized back to GeoJSON
/// text, independent of any extra members the client sent.
pub fn polygon_storage_string(polygon: &Polygon<f64>) -> String {
    polygon_to_geojson(polygon).to_string()
}
