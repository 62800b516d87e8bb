// ABOUTME: Tests for the mapping-area access decision and visibility filter
// ABOUTME: Covers owner/shared/denied levels, polygon unions, and boundary inclusion

#[cfg(test)]
mod tests {
    use crate::access::{self, DatasetAccess};
    use crate::entities::{dataset, dataset_user_mapping_area, mapping_area, user};
    use crate::storage::Storage;
    use crate::types::{GroupAccessEntry, UserAccessEntry};
    use sea_orm::{ActiveModelTrait, Set};
    use tempfile::TempDir;
    use uuid::Uuid;

    async fn create_test_storage() -> (Storage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        use sea_orm::Database;
        use sea_orm_migration::MigratorTrait;

        let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
        let db = Database::connect(&db_url).await.unwrap();
        crate::migration::Migrator::up(&db, None).await.unwrap();

        (Storage { db }, temp_dir)
    }

    async fn create_test_user(storage: &Storage, username: &str) -> user::Model {
        storage
            .create_user(username, username, "argon2-hash-placeholder")
            .await
            .unwrap()
    }

    fn box_polygon_geojson(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> String {
        let ring = vec![
            vec![min_lon, min_lat],
            vec![max_lon, min_lat],
            vec![max_lon, max_lat],
            vec![min_lon, max_lat],
            vec![min_lon, min_lat],
        ];
        geojson::Geometry::new(geojson::Value::Polygon(vec![ring])).to_string()
    }

    /// Owner, a shared member, a dataset, and a central ±0.1° mapping area.
    async fn central_area_scenario(
        storage: &Storage,
    ) -> (user::Model, user::Model, dataset::Model, mapping_area::Model) {
        let owner = create_test_user(storage, "owner").await;
        let member = create_test_user(storage, "member").await;
        let dataset = storage
            .create_dataset(owner.id, "Shared Dataset", "")
            .await
            .unwrap();
        let area = storage
            .create_mapping_area(
                dataset.id,
                "Central Area",
                &box_polygon_geojson(-0.1, -0.1, 0.1, 0.1),
                &[member.id],
            )
            .await
            .unwrap();

        (owner, member, dataset, area)
    }

    fn restricted_share(user_id: Uuid, area_id: Uuid) -> Vec<UserAccessEntry> {
        vec![UserAccessEntry {
            user_id,
            mapping_areas: vec![area_id],
        }]
    }

    #[tokio::test]
    async fn test_owner_has_full_access() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (owner, _member, dataset, area) = central_area_scenario(&storage).await;

        // Even restriction rows for the owner do not narrow anything
        storage
            .replace_access(dataset.id, &restricted_share(owner.id, area.id), &[])
            .await
            .unwrap();

        let result = access::resolve(&storage, &dataset, owner.id).await.unwrap();
        assert!(matches!(result, DatasetAccess::Full));
        assert!(result.allows_point(50.0, 50.0));
    }

    #[tokio::test]
    async fn test_unrelated_user_is_denied() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (_owner, _member, dataset, _area) = central_area_scenario(&storage).await;
        let stranger = create_test_user(&storage, "stranger").await;

        let result = access::resolve(&storage, &dataset, stranger.id)
            .await
            .unwrap();
        assert!(result.is_denied());
        assert!(!result.allows_point(0.0, 0.0));
    }

    #[tokio::test]
    async fn test_shared_user_without_restrictions_has_full_access() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (_owner, member, dataset, _area) = central_area_scenario(&storage).await;

        storage
            .replace_access(
                dataset.id,
                &[UserAccessEntry {
                    user_id: member.id,
                    mapping_areas: vec![],
                }],
                &[],
            )
            .await
            .unwrap();

        let result = access::resolve(&storage, &dataset, member.id).await.unwrap();
        assert!(matches!(result, DatasetAccess::Full));
        assert!(result.allows_point(1.0, 1.0));
    }

    #[tokio::test]
    async fn test_direct_restriction_limits_to_polygon() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (_owner, member, dataset, area) = central_area_scenario(&storage).await;

        storage
            .replace_access(dataset.id, &restricted_share(member.id, area.id), &[])
            .await
            .unwrap();

        let result = access::resolve(&storage, &dataset, member.id).await.unwrap();
        assert!(matches!(result, DatasetAccess::Restricted(_)));
        assert!(result.allows_point(0.0, 0.0));
        assert!(!result.allows_point(1.0, 1.0));
    }

    #[tokio::test]
    async fn test_boundary_point_counts_as_inside() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (_owner, member, dataset, area) = central_area_scenario(&storage).await;

        storage
            .replace_access(dataset.id, &restricted_share(member.id, area.id), &[])
            .await
            .unwrap();

        let result = access::resolve(&storage, &dataset, member.id).await.unwrap();
        // Exactly on the eastern edge of the ±0.1° box
        assert!(result.allows_point(0.1, 0.0));
        // Corner of the box
        assert!(result.allows_point(0.1, 0.1));
        // Just beyond it
        assert!(!result.allows_point(0.100001, 0.0));
    }

    #[tokio::test]
    async fn test_group_restriction_applies_to_members() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (_owner, member, dataset, area) = central_area_scenario(&storage).await;

        let surveyors = storage.create_group("surveyors").await.unwrap();
        storage
            .add_group_member(surveyors.id, member.id)
            .await
            .unwrap();
        storage
            .replace_access(
                dataset.id,
                &[],
                &[GroupAccessEntry {
                    group_id: surveyors.id,
                    mapping_areas: vec![area.id],
                }],
            )
            .await
            .unwrap();

        let result = access::resolve(&storage, &dataset, member.id).await.unwrap();
        assert!(matches!(result, DatasetAccess::Restricted(_)));
        assert!(result.allows_point(0.0, 0.0));
        assert!(!result.allows_point(1.0, 1.0));
    }

    #[tokio::test]
    async fn test_group_share_without_restrictions_is_full() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (_owner, member, dataset, _area) = central_area_scenario(&storage).await;

        let surveyors = storage.create_group("surveyors").await.unwrap();
        storage
            .add_group_member(surveyors.id, member.id)
            .await
            .unwrap();
        storage
            .replace_access(
                dataset.id,
                &[],
                &[GroupAccessEntry {
                    group_id: surveyors.id,
                    mapping_areas: vec![],
                }],
            )
            .await
            .unwrap();

        let result = access::resolve(&storage, &dataset, member.id).await.unwrap();
        assert!(matches!(result, DatasetAccess::Full));
    }

    #[tokio::test]
    async fn test_direct_and_group_polygons_union() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (_owner, member, dataset, central) = central_area_scenario(&storage).await;

        let eastern = storage
            .create_mapping_area(
                dataset.id,
                "Eastern Area",
                &box_polygon_geojson(0.9, 0.9, 1.1, 1.1),
                &[],
            )
            .await
            .unwrap();

        let surveyors = storage.create_group("surveyors").await.unwrap();
        storage
            .add_group_member(surveyors.id, member.id)
            .await
            .unwrap();
        storage
            .replace_access(
                dataset.id,
                &restricted_share(member.id, central.id),
                &[GroupAccessEntry {
                    group_id: surveyors.id,
                    mapping_areas: vec![eastern.id],
                }],
            )
            .await
            .unwrap();

        let result = access::resolve(&storage, &dataset, member.id).await.unwrap();
        // Visible through the direct row
        assert!(result.allows_point(0.0, 0.0));
        // Visible through the group row
        assert!(result.allows_point(1.0, 1.0));
        // In neither polygon
        assert!(!result.allows_point(0.5, 0.5));
    }

    #[tokio::test]
    async fn test_removing_restriction_restores_full_access() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (_owner, member, dataset, area) = central_area_scenario(&storage).await;

        storage
            .replace_access(dataset.id, &restricted_share(member.id, area.id), &[])
            .await
            .unwrap();
        let restricted = access::resolve(&storage, &dataset, member.id).await.unwrap();
        assert!(!restricted.allows_point(1.0, 1.0));

        // Re-share without any selected areas
        storage
            .replace_access(
                dataset.id,
                &[UserAccessEntry {
                    user_id: member.id,
                    mapping_areas: vec![],
                }],
                &[],
            )
            .await
            .unwrap();

        let restored = access::resolve(&storage, &dataset, member.id).await.unwrap();
        assert!(matches!(restored, DatasetAccess::Full));
        assert!(restored.allows_point(1.0, 1.0));
    }

    #[tokio::test]
    async fn test_stale_restriction_rows_without_share_are_inert() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (_owner, member, dataset, area) = central_area_scenario(&storage).await;

        // Restriction row inserted directly, with no share backing it
        let row = dataset_user_mapping_area::ActiveModel {
            id: Set(Uuid::new_v4()),
            dataset_id: Set(dataset.id),
            user_id: Set(member.id),
            mapping_area_id: Set(area.id),
        };
        row.insert(&storage.db).await.unwrap();

        let result = access::resolve(&storage, &dataset, member.id).await.unwrap();
        assert!(result.is_denied());
    }

    #[tokio::test]
    async fn test_corrupt_polygon_narrows_instead_of_widening() {
        let (storage, _temp_dir) = create_test_storage().await;
        let (_owner, member, dataset, central) = central_area_scenario(&storage).await;

        let corrupt = mapping_area::ActiveModel {
            id: Set(Uuid::new_v4()),
            dataset_id: Set(dataset.id),
            name: Set("Broken Area".to_string()),
            polygon: Set("not geojson at all".to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
        };
        let corrupt = corrupt.insert(&storage.db).await.unwrap();

        storage
            .replace_access(
                dataset.id,
                &[UserAccessEntry {
                    user_id: member.id,
                    mapping_areas: vec![central.id, corrupt.id],
                }],
                &[],
            )
            .await
            .unwrap();

        let result = access::resolve(&storage, &dataset, member.id).await.unwrap();
        match &result {
            DatasetAccess::Restricted(polygons) => assert_eq!(polygons.len(), 1),
            other => panic!("expected restricted access, got {:?}", other),
        }
        assert!(result.allows_point(0.0, 0.0));
        assert!(!result.allows_point(1.0, 1.0));
    }
}
