// ABOUTME: Comprehensive tests for the storage layer
// ABOUTME: Tests user/dataset operations, sharing replacement, cascades, and entry upserts

#[cfg(test)]
mod tests {
    use crate::storage::Storage;
    use crate::types::{UpdateGeometryRequest, UserAccessEntry};
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

    fn square_polygon() -> String {
        let ring = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![1.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 0.0],
        ];
        geojson::Geometry::new(geojson::Value::Polygon(vec![ring])).to_string()
    }

    #[tokio::test]
    async fn test_user_operations() {
        let (storage, _temp_dir) = create_test_storage().await;

        let user = storage
            .create_user("testuser", "Test User", "hash")
            .await
            .unwrap();

        let retrieved = storage
            .get_user_by_username("testuser")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(retrieved.id, user.id);
        assert_eq!(retrieved.display_name, "Test User");

        let by_id = storage.get_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "testuser");

        assert!(storage
            .get_user_by_username("nonexistent")
            .await
            .unwrap()
            .is_none());
        assert!(storage
            .get_user_by_id(Uuid::new_v4())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected() {
        let (storage, _temp_dir) = create_test_storage().await;

        storage.create_user("dupe", "First", "hash").await.unwrap();
        let result = storage.create_user("dupe", "Second", "hash").await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_group_membership_lookup() {
        let (storage, _temp_dir) = create_test_storage().await;

        let user = storage.create_user("member", "Member", "hash").await.unwrap();
        let group_a = storage.create_group("team-a").await.unwrap();
        let group_b = storage.create_group("team-b").await.unwrap();
        storage.add_group_member(group_a.id, user.id).await.unwrap();
        storage.add_group_member(group_b.id, user.id).await.unwrap();

        let mut groups = storage.groups_of_user(user.id).await.unwrap();
        groups.sort();
        let mut expected = vec![group_a.id, group_b.id];
        expected.sort();
        assert_eq!(groups, expected);

        let other = storage.create_user("other", "Other", "hash").await.unwrap();
        assert!(storage.groups_of_user(other.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_datasets_for_user_covers_all_share_paths() {
        let (storage, _temp_dir) = create_test_storage().await;

        let owner = storage.create_user("owner", "Owner", "hash").await.unwrap();
        let member = storage.create_user("member", "Member", "hash").await.unwrap();

        let owned = storage.create_dataset(member.id, "Owned", "").await.unwrap();
        let direct = storage.create_dataset(owner.id, "Direct", "").await.unwrap();
        let via_group = storage.create_dataset(owner.id, "Grouped", "").await.unwrap();
        let unrelated = storage.create_dataset(owner.id, "Private", "").await.unwrap();

        storage
            .replace_access(
                direct.id,
                &[UserAccessEntry {
                    user_id: member.id,
                    mapping_areas: vec![],
                }],
                &[],
            )
            .await
            .unwrap();

        let group = storage.create_group("field-team").await.unwrap();
        storage.add_group_member(group.id, member.id).await.unwrap();
        storage
            .replace_access(
                via_group.id,
                &[],
                &[crate::types::GroupAccessEntry {
                    group_id: group.id,
                    mapping_areas: vec![],
                }],
            )
            .await
            .unwrap();

        let datasets = storage.datasets_for_user(member.id).await.unwrap();
        let ids: Vec<Uuid> = datasets.iter().map(|d| d.id).collect();
        assert!(ids.contains(&owned.id));
        assert!(ids.contains(&direct.id));
        assert!(ids.contains(&via_group.id));
        assert!(!ids.contains(&unrelated.id));
    }

    #[tokio::test]
    async fn test_replace_access_is_wholesale() {
        let (storage, _temp_dir) = create_test_storage().await;

        let owner = storage.create_user("owner", "Owner", "hash").await.unwrap();
        let alice = storage.create_user("alice", "Alice", "hash").await.unwrap();
        let bob = storage.create_user("bob", "Bob", "hash").await.unwrap();
        let dataset = storage.create_dataset(owner.id, "Dataset", "").await.unwrap();
        let area = storage
            .create_mapping_area(dataset.id, "Area", &square_polygon(), &[])
            .await
            .unwrap();

        storage
            .replace_access(
                dataset.id,
                &[UserAccessEntry {
                    user_id: alice.id,
                    mapping_areas: vec![area.id],
                }],
                &[],
            )
            .await
            .unwrap();
        assert!(storage.is_shared_with_user(dataset.id, alice.id).await.unwrap());
        assert_eq!(
            storage
                .user_restriction_area_ids(dataset.id, alice.id)
                .await
                .unwrap(),
            vec![area.id]
        );

        // Replacing with bob only drops alice's share and restriction rows
        storage
            .replace_access(
                dataset.id,
                &[UserAccessEntry {
                    user_id: bob.id,
                    mapping_areas: vec![],
                }],
                &[],
            )
            .await
            .unwrap();
        assert!(!storage.is_shared_with_user(dataset.id, alice.id).await.unwrap());
        assert!(storage.is_shared_with_user(dataset.id, bob.id).await.unwrap());
        assert!(storage
            .user_restriction_area_ids(dataset.id, alice.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_mapping_area_lifecycle() {
        let (storage, _temp_dir) = create_test_storage().await;

        let owner = storage.create_user("owner", "Owner", "hash").await.unwrap();
        let worker = storage.create_user("worker", "Worker", "hash").await.unwrap();
        let dataset = storage.create_dataset(owner.id, "Dataset", "").await.unwrap();

        let area = storage
            .create_mapping_area(dataset.id, "North", &square_polygon(), &[worker.id])
            .await
            .unwrap();
        assert_eq!(
            storage.allocations_for_area(area.id).await.unwrap(),
            vec![worker.id]
        );

        // Update replaces name and allocation list wholesale
        let updated = storage
            .update_mapping_area(area.clone(), "North Field", &square_polygon(), &[])
            .await
            .unwrap();
        assert_eq!(updated.name, "North Field");
        assert!(storage.allocations_for_area(area.id).await.unwrap().is_empty());

        // Restriction rows referencing the area disappear with it
        storage
            .replace_access(
                dataset.id,
                &[UserAccessEntry {
                    user_id: worker.id,
                    mapping_areas: vec![area.id],
                }],
                &[],
            )
            .await
            .unwrap();
        assert_eq!(
            storage
                .user_restriction_area_ids(dataset.id, worker.id)
                .await
                .unwrap()
                .len(),
            1
        );

        storage.delete_mapping_area(area.id).await.unwrap();
        assert!(storage.get_mapping_area(area.id).await.unwrap().is_none());
        assert!(storage
            .user_restriction_area_ids(dataset.id, worker.id)
            .await
            .unwrap()
            .is_empty());
        // The share itself survives the area deletion
        assert!(storage.is_shared_with_user(dataset.id, worker.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_restriction_row_rejected() {
        let (storage, _temp_dir) = create_test_storage().await;

        let owner = storage.create_user("owner", "Owner", "hash").await.unwrap();
        let worker = storage.create_user("worker", "Worker", "hash").await.unwrap();
        let dataset = storage.create_dataset(owner.id, "Dataset", "").await.unwrap();
        let area = storage
            .create_mapping_area(dataset.id, "Area", &square_polygon(), &[])
            .await
            .unwrap();

        // The same area listed twice trips the unique (dataset, user, area) index
        let result = storage
            .replace_access(
                dataset.id,
                &[UserAccessEntry {
                    user_id: worker.id,
                    mapping_areas: vec![area.id, area.id],
                }],
                &[],
            )
            .await;
        assert!(result.is_err());

        // The failed transaction left no partial state behind
        assert!(!storage.is_shared_with_user(dataset.id, worker.id).await.unwrap());
        assert!(storage
            .user_restriction_area_ids(dataset.id, worker.id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_geometry_crud_and_update() {
        let (storage, _temp_dir) = create_test_storage().await;

        let owner = storage.create_user("owner", "Owner", "hash").await.unwrap();
        let dataset = storage.create_dataset(owner.id, "Dataset", "").await.unwrap();

        let point = storage
            .create_geometry(dataset.id, "A-001", "1 Main St", 0.5, 0.5)
            .await
            .unwrap();

        let listed = storage.geometries_for_dataset(dataset.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id_kurz, "A-001");

        let updated = storage
            .update_geometry(
                point.clone(),
                &UpdateGeometryRequest {
                    id_kurz: None,
                    address: Some("2 Side St".to_string()),
                    lon: Some(0.6),
                    lat: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.address, "2 Side St");
        assert_eq!(updated.lon, 0.6);
        assert_eq!(updated.lat, 0.5);
        assert_eq!(updated.id_kurz, "A-001");

        storage.delete_geometry(point.id).await.unwrap();
        assert!(storage.get_geometry(point.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_entry_upsert_replaces_value() {
        let (storage, _temp_dir) = create_test_storage().await;

        let owner = storage.create_user("owner", "Owner", "hash").await.unwrap();
        let dataset = storage.create_dataset(owner.id, "Dataset", "").await.unwrap();
        let field = storage
            .create_field(dataset.id, "Species", "text", 0)
            .await
            .unwrap();
        let point = storage
            .create_geometry(dataset.id, "A-001", "", 0.0, 0.0)
            .await
            .unwrap();

        storage
            .save_entries(point.id, &[(field.id, "oak".to_string())])
            .await
            .unwrap();
        storage
            .save_entries(point.id, &[(field.id, "birch".to_string())])
            .await
            .unwrap();

        let entries = storage.entries_for_geometry(point.id).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, "birch");
    }

    #[tokio::test]
    async fn test_fields_ordered_by_position() {
        let (storage, _temp_dir) = create_test_storage().await;

        let owner = storage.create_user("owner", "Owner", "hash").await.unwrap();
        let dataset = storage.create_dataset(owner.id, "Dataset", "").await.unwrap();

        storage.create_field(dataset.id, "Notes", "text", 2).await.unwrap();
        storage.create_field(dataset.id, "Species", "text", 0).await.unwrap();
        storage.create_field(dataset.id, "Height", "number", 1).await.unwrap();

        let fields = storage.fields_for_dataset(dataset.id).await.unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Species", "Height", "Notes"]);
    }

    #[tokio::test]
    async fn test_deleting_geometry_removes_entries() {
        let (storage, _temp_dir) = create_test_storage().await;

        let owner = storage.create_user("owner", "Owner", "hash").await.unwrap();
        let dataset = storage.create_dataset(owner.id, "Dataset", "").await.unwrap();
        let field = storage
            .create_field(dataset.id, "Species", "text", 0)
            .await
            .unwrap();
        let point = storage
            .create_geometry(dataset.id, "A-001", "", 0.0, 0.0)
            .await
            .unwrap();
        storage
            .save_entries(point.id, &[(field.id, "oak".to_string())])
            .await
            .unwrap();

        storage.delete_geometry(point.id).await.unwrap();
        assert!(storage.entries_for_geometry(point.id).await.unwrap().is_empty());
    }
}
