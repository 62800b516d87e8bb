// ABOUTME: SeaORM storage layer for users, groups, datasets, geometries, and access rows
// ABOUTME: All sharing and restriction mutations run inside a single transaction

use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, Database, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::{
    dataset, dataset_field, dataset_group_mapping_area, dataset_shared_group, dataset_shared_user,
    dataset_user_mapping_area, geometry, geometry_entry, group, group_member, mapping_area,
    mapping_area_allocation, user,
};
use crate::types::{GroupAccessEntry, UpdateGeometryRequest, UserAccessEntry};

pub struct Storage {
    pub db: DatabaseConnection,
}

impl Storage {
    pub async fn new() -> Result<Self> {
        let db_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite:fieldmap.db?mode=rwc".to_string());
        let db = Database::connect(&db_url)
            .await
            .context("failed to connect to database")?;

        use sea_orm_migration::MigratorTrait;
        crate::migration::Migrator::up(&db, None)
            .await
            .context("failed to run migrations")?;

        Ok(Self { db })
    }

    // ----- users -----

    pub async fn create_user(
        &self,
        username: &str,
        display_name: &str,
        password_hash: &str,
    ) -> Result<user::Model> {
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            display_name: Set(display_name.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
        };

        Ok(model.insert(&self.db).await?)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    pub async fn get_user_by_id(&self, user_id: Uuid) -> Result<Option<user::Model>> {
        Ok(user::Entity::find_by_id(user_id).one(&self.db).await?)
    }

    // ----- groups -----

    pub async fn create_group(&self, name: &str) -> Result<group::Model> {
        let model = group::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
        };

        Ok(model.insert(&self.db).await?)
    }

    pub async fn add_group_member(&self, group_id: Uuid, user_id: Uuid) -> Result<()> {
        let model = group_member::ActiveModel {
            group_id: Set(group_id),
            user_id: Set(user_id),
        };
        model.insert(&self.db).await?;

        Ok(())
    }

    /// Membership lookup used by the access decision. The access core only
    /// needs group ids, never group internals.
    pub async fn groups_of_user(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = group_member::Entity::find()
            .filter(group_member::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| row.group_id).collect())
    }

    // ----- datasets -----

    pub async fn create_dataset(
        &self,
        owner_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<dataset::Model> {
        let model = dataset::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            name: Set(name.to_string()),
            description: Set(description.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
        };

        Ok(model.insert(&self.db).await?)
    }

    pub async fn get_dataset(&self, dataset_id: Uuid) -> Result<Option<dataset::Model>> {
        Ok(dataset::Entity::find_by_id(dataset_id).one(&self.db).await?)
    }

    /// Datasets the user owns, is directly shared on, or reaches through a
    /// group share.
    pub async fn datasets_for_user(&self, user_id: Uuid) -> Result<Vec<dataset::Model>> {
        let group_ids = self.groups_of_user(user_id).await?;

        let shared_dataset_ids: Vec<Uuid> = dataset_shared_user::Entity::find()
            .filter(dataset_shared_user::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|row| row.dataset_id)
            .collect();

        let group_dataset_ids: Vec<Uuid> = if group_ids.is_empty() {
            Vec::new()
        } else {
            dataset_shared_group::Entity::find()
                .filter(dataset_shared_group::Column::GroupId.is_in(group_ids))
                .all(&self.db)
                .await?
                .into_iter()
                .map(|row| row.dataset_id)
                .collect()
        };

        let mut condition = Condition::any().add(dataset::Column::OwnerId.eq(user_id));
        if !shared_dataset_ids.is_empty() {
            condition = condition.add(dataset::Column::Id.is_in(shared_dataset_ids));
        }
        if !group_dataset_ids.is_empty() {
            condition = condition.add(dataset::Column::Id.is_in(group_dataset_ids));
        }

        Ok(dataset::Entity::find()
            .filter(condition)
            .order_by_asc(dataset::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    // ----- fields -----

    pub async fn create_field(
        &self,
        dataset_id: Uuid,
        name: &str,
        field_type: &str,
        position: i32,
    ) -> Result<dataset_field::Model> {
        let model = dataset_field::ActiveModel {
            id: Set(Uuid::new_v4()),
            dataset_id: Set(dataset_id),
            name: Set(name.to_string()),
            field_type: Set(field_type.to_string()),
            position: Set(position),
        };

        Ok(model.insert(&self.db).await?)
    }

    pub async fn fields_for_dataset(&self, dataset_id: Uuid) -> Result<Vec<dataset_field::Model>> {
        Ok(dataset_field::Entity::find()
            .filter(dataset_field::Column::DatasetId.eq(dataset_id))
            .order_by_asc(dataset_field::Column::Position)
            .all(&self.db)
            .await?)
    }

    // ----- geometries -----

    pub async fn create_geometry(
        &self,
        dataset_id: Uuid,
        id_kurz: &str,
        address: &str,
        lon: f64,
        lat: f64,
    ) -> Result<geometry::Model> {
        let model = geometry::ActiveModel {
            id: Set(Uuid::new_v4()),
            dataset_id: Set(dataset_id),
            id_kurz: Set(id_kurz.to_string()),
            address: Set(address.to_string()),
            lon: Set(lon),
            lat: Set(lat),
            created_at: Set(chrono::Utc::now().timestamp()),
        };

        Ok(model.insert(&self.db).await?)
    }

    pub async fn get_geometry(&self, geometry_id: Uuid) -> Result<Option<geometry::Model>> {
        Ok(geometry::Entity::find_by_id(geometry_id).one(&self.db).await?)
    }

    pub async fn geometries_for_dataset(&self, dataset_id: Uuid) -> Result<Vec<geometry::Model>> {
        Ok(geometry::Entity::find()
            .filter(geometry::Column::DatasetId.eq(dataset_id))
            .order_by_asc(geometry::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn update_geometry(
        &self,
        current: geometry::Model,
        changes: &UpdateGeometryRequest,
    ) -> Result<geometry::Model> {
        let mut model: geometry::ActiveModel = current.into();
        if let Some(id_kurz) = &changes.id_kurz {
            model.id_kurz = Set(id_kurz.clone());
        }
        if let Some(address) = &changes.address {
            model.address = Set(address.clone());
        }
        if let Some(lon) = changes.lon {
            model.lon = Set(lon);
        }
        if let Some(lat) = changes.lat {
            model.lat = Set(lat);
        }

        Ok(model.update(&self.db).await?)
    }

    pub async fn delete_geometry(&self, geometry_id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;

        geometry_entry::Entity::delete_many()
            .filter(geometry_entry::Column::GeometryId.eq(geometry_id))
            .exec(&txn)
            .await?;
        geometry::Entity::delete_by_id(geometry_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    pub async fn entries_for_geometry(
        &self,
        geometry_id: Uuid,
    ) -> Result<Vec<geometry_entry::Model>> {
        Ok(geometry_entry::Entity::find()
            .filter(geometry_entry::Column::GeometryId.eq(geometry_id))
            .all(&self.db)
            .await?)
    }

    /// Upserts field values for one geometry. Unique (geometry, field) rows:
    /// an existing entry is overwritten, a missing one inserted.
    pub async fn save_entries(&self, geometry_id: Uuid, values: &[(Uuid, String)]) -> Result<()> {
        let txn = self.db.begin().await?;
        let now = chrono::Utc::now().timestamp();

        for (field_id, value) in values {
            let existing = geometry_entry::Entity::find()
                .filter(geometry_entry::Column::GeometryId.eq(geometry_id))
                .filter(geometry_entry::Column::FieldId.eq(*field_id))
                .one(&txn)
                .await?;

            match existing {
                Some(entry) => {
                    let mut model: geometry_entry::ActiveModel = entry.into();
                    model.value = Set(value.clone());
                    model.updated_at = Set(now);
                    model.update(&txn).await?;
                }
                None => {
                    let model = geometry_entry::ActiveModel {
                        id: Set(Uuid::new_v4()),
                        geometry_id: Set(geometry_id),
                        field_id: Set(*field_id),
                        value: Set(value.clone()),
                        updated_at: Set(now),
                    };
                    model.insert(&txn).await?;
                }
            }
        }

        txn.commit().await?;
        Ok(())
    }

    // ----- sharing -----

    pub async fn shared_user_ids(&self, dataset_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = dataset_shared_user::Entity::find()
            .filter(dataset_shared_user::Column::DatasetId.eq(dataset_id))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| row.user_id).collect())
    }

    pub async fn shared_group_ids(&self, dataset_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = dataset_shared_group::Entity::find()
            .filter(dataset_shared_group::Column::DatasetId.eq(dataset_id))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| row.group_id).collect())
    }

    pub async fn is_shared_with_user(&self, dataset_id: Uuid, user_id: Uuid) -> Result<bool> {
        let row = dataset_shared_user::Entity::find()
            .filter(dataset_shared_user::Column::DatasetId.eq(dataset_id))
            .filter(dataset_shared_user::Column::UserId.eq(user_id))
            .one(&self.db)
            .await?;

        Ok(row.is_some())
    }

    pub async fn is_shared_with_any_group(
        &self,
        dataset_id: Uuid,
        group_ids: &[Uuid],
    ) -> Result<bool> {
        if group_ids.is_empty() {
            return Ok(false);
        }

        let row = dataset_shared_group::Entity::find()
            .filter(dataset_shared_group::Column::DatasetId.eq(dataset_id))
            .filter(dataset_shared_group::Column::GroupId.is_in(group_ids.to_vec()))
            .one(&self.db)
            .await?;

        Ok(row.is_some())
    }

    /// Replaces the dataset's sharing and restriction state wholesale:
    /// shares, then one restriction row per selected mapping area. A
    /// principal listed without areas keeps an unrestricted share.
    pub async fn replace_access(
        &self,
        dataset_id: Uuid,
        users: &[UserAccessEntry],
        groups: &[GroupAccessEntry],
    ) -> Result<()> {
        let txn = self.db.begin().await?;

        dataset_user_mapping_area::Entity::delete_many()
            .filter(dataset_user_mapping_area::Column::DatasetId.eq(dataset_id))
            .exec(&txn)
            .await?;
        dataset_group_mapping_area::Entity::delete_many()
            .filter(dataset_group_mapping_area::Column::DatasetId.eq(dataset_id))
            .exec(&txn)
            .await?;
        dataset_shared_user::Entity::delete_many()
            .filter(dataset_shared_user::Column::DatasetId.eq(dataset_id))
            .exec(&txn)
            .await?;
        dataset_shared_group::Entity::delete_many()
            .filter(dataset_shared_group::Column::DatasetId.eq(dataset_id))
            .exec(&txn)
            .await?;

        for entry in users {
            let share = dataset_shared_user::ActiveModel {
                dataset_id: Set(dataset_id),
                user_id: Set(entry.user_id),
            };
            share.insert(&txn).await?;

            for area_id in &entry.mapping_areas {
                let row = dataset_user_mapping_area::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    dataset_id: Set(dataset_id),
                    user_id: Set(entry.user_id),
                    mapping_area_id: Set(*area_id),
                };
                row.insert(&txn).await?;
            }
        }

        for entry in groups {
            let share = dataset_shared_group::ActiveModel {
                dataset_id: Set(dataset_id),
                group_id: Set(entry.group_id),
            };
            share.insert(&txn).await?;

            for area_id in &entry.mapping_areas {
                let row = dataset_group_mapping_area::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    dataset_id: Set(dataset_id),
                    group_id: Set(entry.group_id),
                    mapping_area_id: Set(*area_id),
                };
                row.insert(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(())
    }

    // ----- mapping areas -----

    pub async fn mapping_areas_for_dataset(
        &self,
        dataset_id: Uuid,
    ) -> Result<Vec<mapping_area::Model>> {
        Ok(mapping_area::Entity::find()
            .filter(mapping_area::Column::DatasetId.eq(dataset_id))
            .order_by_asc(mapping_area::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn get_mapping_area(&self, area_id: Uuid) -> Result<Option<mapping_area::Model>> {
        Ok(mapping_area::Entity::find_by_id(area_id).one(&self.db).await?)
    }

    pub async fn mapping_areas_by_ids(&self, ids: &[Uuid]) -> Result<Vec<mapping_area::Model>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(mapping_area::Entity::find()
            .filter(mapping_area::Column::Id.is_in(ids.to_vec()))
            .all(&self.db)
            .await?)
    }

    pub async fn allocations_for_area(&self, area_id: Uuid) -> Result<Vec<Uuid>> {
        let rows = mapping_area_allocation::Entity::find()
            .filter(mapping_area_allocation::Column::MappingAreaId.eq(area_id))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| row.user_id).collect())
    }

    pub async fn create_mapping_area(
        &self,
        dataset_id: Uuid,
        name: &str,
        polygon_geojson: &str,
        allocated_users: &[Uuid],
    ) -> Result<mapping_area::Model> {
        let txn = self.db.begin().await?;

        let model = mapping_area::ActiveModel {
            id: Set(Uuid::new_v4()),
            dataset_id: Set(dataset_id),
            name: Set(name.to_string()),
            polygon: Set(polygon_geojson.to_string()),
            created_at: Set(chrono::Utc::now().timestamp()),
        };
        let area = model.insert(&txn).await?;

        for user_id in allocated_users {
            let allocation = mapping_area_allocation::ActiveModel {
                mapping_area_id: Set(area.id),
                user_id: Set(*user_id),
            };
            allocation.insert(&txn).await?;
        }

        txn.commit().await?;
        Ok(area)
    }

    /// Updates name and polygon and replaces the allocation list wholesale.
    pub async fn update_mapping_area(
        &self,
        area: mapping_area::Model,
        name: &str,
        polygon_geojson: &str,
        allocated_users: &[Uuid],
    ) -> Result<mapping_area::Model> {
        let txn = self.db.begin().await?;
        let area_id = area.id;

        let mut model: mapping_area::ActiveModel = area.into();
        model.name = Set(name.to_string());
        model.polygon = Set(polygon_geojson.to_string());
        let updated = model.update(&txn).await?;

        mapping_area_allocation::Entity::delete_many()
            .filter(mapping_area_allocation::Column::MappingAreaId.eq(area_id))
            .exec(&txn)
            .await?;

        for user_id in allocated_users {
            let allocation = mapping_area_allocation::ActiveModel {
                mapping_area_id: Set(area_id),
                user_id: Set(*user_id),
            };
            allocation.insert(&txn).await?;
        }

        txn.commit().await?;
        Ok(updated)
    }

    /// Deletes a mapping area together with its allocations and every
    /// restriction row pointing at it.
    pub async fn delete_mapping_area(&self, area_id: Uuid) -> Result<()> {
        let txn = self.db.begin().await?;

        dataset_user_mapping_area::Entity::delete_many()
            .filter(dataset_user_mapping_area::Column::MappingAreaId.eq(area_id))
            .exec(&txn)
            .await?;
        dataset_group_mapping_area::Entity::delete_many()
            .filter(dataset_group_mapping_area::Column::MappingAreaId.eq(area_id))
            .exec(&txn)
            .await?;
        mapping_area_allocation::Entity::delete_many()
            .filter(mapping_area_allocation::Column::MappingAreaId.eq(area_id))
            .exec(&txn)
            .await?;
        mapping_area::Entity::delete_by_id(area_id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    // ----- restriction rows -----

    pub async fn user_restriction_area_ids(
        &self,
        dataset_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Uuid>> {
        let rows = dataset_user_mapping_area::Entity::find()
            .filter(dataset_user_mapping_area::Column::DatasetId.eq(dataset_id))
            .filter(dataset_user_mapping_area::Column::UserId.eq(user_id))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| row.mapping_area_id).collect())
    }

    pub async fn group_restriction_area_ids(
        &self,
        dataset_id: Uuid,
        group_ids: &[Uuid],
    ) -> Result<Vec<Uuid>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = dataset_group_mapping_area::Entity::find()
            .filter(dataset_group_mapping_area::Column::DatasetId.eq(dataset_id))
            .filter(dataset_group_mapping_area::Column::GroupId.is_in(group_ids.to_vec()))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| row.mapping_area_id).collect())
    }
}
