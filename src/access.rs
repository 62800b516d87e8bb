// ABOUTME: Mapping-area access decision and geometry visibility filter
// ABOUTME: Resolves (dataset, user) to full, denied, or polygon-restricted visibility

use anyhow::Result;
use geo::{Intersects, Point, Polygon};
use uuid::Uuid;

use crate::entities::dataset;
use crate::error::AppError;
use crate::geometry::parse_stored_polygon;
use crate::storage::Storage;

/// Effective visibility of one user within one dataset, computed per request
/// from current sharing and restriction rows.
#[derive(Debug, Clone)]
pub enum DatasetAccess {
    /// Not the owner and not shared, directly or via any group.
    Denied,
    /// Owner, or shared with no restriction rows in effect.
    Full,
    /// Restriction rows exist: visibility is the union of these polygons.
    Restricted(Vec<Polygon<f64>>),
}

impl DatasetAccess {
    pub fn is_denied(&self) -> bool {
        matches!(self, DatasetAccess::Denied)
    }

    /// Whether a point is visible under this access level. Containment is
    /// boundary inclusive: a point on a polygon edge counts as inside.
    pub fn allows_point(&self, lon: f64, lat: f64) -> bool {
        match self {
            DatasetAccess::Denied => false,
            DatasetAccess::Full => true,
            DatasetAccess::Restricted(polygons) => {
                let point = Point::new(lon, lat);
                polygons.iter().any(|polygon| polygon.intersects(&point))
            }
        }
    }
}

/// Computes the access level of `user_id` for `dataset`.
///
/// The owner always has full access. Anyone else must hold a share (direct
/// or through a group) or the result is `Denied`; restriction rows left
/// behind for an unshared user are inert. With a share in hand, the presence
/// of any restriction row for the user or one of their groups is the sole
/// narrowing trigger; the permitted set is the union of the referenced
/// polygons.
pub async fn resolve(
    storage: &Storage,
    dataset: &dataset::Model,
    user_id: Uuid,
) -> Result<DatasetAccess> {
    if dataset.owner_id == user_id {
        return Ok(DatasetAccess::Full);
    }

    let group_ids = storage.groups_of_user(user_id).await?;

    let shared_directly = storage.is_shared_with_user(dataset.id, user_id).await?;
    let shared_via_group = storage
        .is_shared_with_any_group(dataset.id, &group_ids)
        .await?;
    if !shared_directly && !shared_via_group {
        return Ok(DatasetAccess::Denied);
    }

    let mut area_ids = storage
        .user_restriction_area_ids(dataset.id, user_id)
        .await?;
    area_ids.extend(
        storage
            .group_restriction_area_ids(dataset.id, &group_ids)
            .await?,
    );
    if area_ids.is_empty() {
        return Ok(DatasetAccess::Full);
    }

    area_ids.sort();
    area_ids.dedup();

    let areas = storage.mapping_areas_by_ids(&area_ids).await?;
    let mut polygons = Vec::with_capacity(areas.len());
    for area in &areas {
        match parse_stored_polygon(&area.polygon) {
            Ok(polygon) => polygons.push(polygon),
            Err(err) => {
                // A corrupt polygon narrows visibility, it never widens it.
                tracing::warn!(
                    "skipping mapping area {} with unparseable polygon: {}",
                    area.id,
                    err
                );
            }
        }
    }

    Ok(DatasetAccess::Restricted(polygons))
}

/// Owner gate for mapping-area and access-management mutations.
pub fn ensure_owner(dataset: &dataset::Model, user_id: Uuid) -> Result<(), AppError> {
    if dataset.owner_id == user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the dataset owner may perform this action".to_string(),
        ))
    }
}
