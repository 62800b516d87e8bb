// ABOUTME: Initial migration creating users, groups, datasets, geometries, and access tables
// ABOUTME: Sets up sharing, mapping areas, and the unique-per-triple restriction rows

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::DisplayName).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create groups table
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Groups::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Groups::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(Groups::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        // Create group_members table
        manager
            .create_table(
                Table::create()
                    .table(GroupMembers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GroupMembers::GroupId).uuid().not_null())
                    .col(ColumnDef::new(GroupMembers::UserId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(GroupMembers::GroupId)
                            .col(GroupMembers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_members_group_id")
                            .from(GroupMembers::Table, GroupMembers::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_members_user_id")
                            .from(GroupMembers::Table, GroupMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create datasets table
        manager
            .create_table(
                Table::create()
                    .table(Datasets::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Datasets::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Datasets::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(Datasets::Name).string().not_null())
                    .col(ColumnDef::new(Datasets::Description).string().not_null().default(""))
                    .col(ColumnDef::new(Datasets::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_datasets_owner_id")
                            .from(Datasets::Table, Datasets::OwnerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create dataset_fields table
        manager
            .create_table(
                Table::create()
                    .table(DatasetFields::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DatasetFields::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DatasetFields::DatasetId).uuid().not_null())
                    .col(ColumnDef::new(DatasetFields::Name).string().not_null())
                    .col(ColumnDef::new(DatasetFields::FieldType).string().not_null())
                    .col(ColumnDef::new(DatasetFields::Position).integer().not_null().default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dataset_fields_dataset_id")
                            .from(DatasetFields::Table, DatasetFields::DatasetId)
                            .to(Datasets::Table, Datasets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create geometries table
        manager
            .create_table(
                Table::create()
                    .table(Geometries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Geometries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Geometries::DatasetId).uuid().not_null())
                    .col(ColumnDef::new(Geometries::IdKurz).string().not_null())
                    .col(ColumnDef::new(Geometries::Address).string().not_null().default(""))
                    .col(ColumnDef::new(Geometries::Lon).double().not_null())
                    .col(ColumnDef::new(Geometries::Lat).double().not_null())
                    .col(ColumnDef::new(Geometries::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_geometries_dataset_id")
                            .from(Geometries::Table, Geometries::DatasetId)
                            .to(Datasets::Table, Datasets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create geometry_entries table
        manager
            .create_table(
                Table::create()
                    .table(GeometryEntries::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GeometryEntries::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(GeometryEntries::GeometryId).uuid().not_null())
                    .col(ColumnDef::new(GeometryEntries::FieldId).uuid().not_null())
                    .col(ColumnDef::new(GeometryEntries::Value).string().not_null())
                    .col(ColumnDef::new(GeometryEntries::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_geometry_entries_geometry_id")
                            .from(GeometryEntries::Table, GeometryEntries::GeometryId)
                            .to(Geometries::Table, Geometries::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_geometry_entries_field_id")
                            .from(GeometryEntries::Table, GeometryEntries::FieldId)
                            .to(DatasetFields::Table, DatasetFields::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_geometry_entry_unique")
                    .table(GeometryEntries::Table)
                    .col(GeometryEntries::GeometryId)
                    .col(GeometryEntries::FieldId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create dataset_shared_users table
        manager
            .create_table(
                Table::create()
                    .table(DatasetSharedUsers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DatasetSharedUsers::DatasetId).uuid().not_null())
                    .col(ColumnDef::new(DatasetSharedUsers::UserId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(DatasetSharedUsers::DatasetId)
                            .col(DatasetSharedUsers::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dataset_shared_users_dataset_id")
                            .from(DatasetSharedUsers::Table, DatasetSharedUsers::DatasetId)
                            .to(Datasets::Table, Datasets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dataset_shared_users_user_id")
                            .from(DatasetSharedUsers::Table, DatasetSharedUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create dataset_shared_groups table
        manager
            .create_table(
                Table::create()
                    .table(DatasetSharedGroups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DatasetSharedGroups::DatasetId).uuid().not_null())
                    .col(ColumnDef::new(DatasetSharedGroups::GroupId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(DatasetSharedGroups::DatasetId)
                            .col(DatasetSharedGroups::GroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dataset_shared_groups_dataset_id")
                            .from(DatasetSharedGroups::Table, DatasetSharedGroups::DatasetId)
                            .to(Datasets::Table, Datasets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_dataset_shared_groups_group_id")
                            .from(DatasetSharedGroups::Table, DatasetSharedGroups::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create mapping_areas table
        manager
            .create_table(
                Table::create()
                    .table(MappingAreas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MappingAreas::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(MappingAreas::DatasetId).uuid().not_null())
                    .col(ColumnDef::new(MappingAreas::Name).string().not_null())
                    .col(ColumnDef::new(MappingAreas::Polygon).text().not_null())
                    .col(ColumnDef::new(MappingAreas::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mapping_areas_dataset_id")
                            .from(MappingAreas::Table, MappingAreas::DatasetId)
                            .to(Datasets::Table, Datasets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create mapping_area_allocations table
        manager
            .create_table(
                Table::create()
                    .table(MappingAreaAllocations::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MappingAreaAllocations::MappingAreaId).uuid().not_null())
                    .col(ColumnDef::new(MappingAreaAllocations::UserId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(MappingAreaAllocations::MappingAreaId)
                            .col(MappingAreaAllocations::UserId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mapping_area_allocations_area_id")
                            .from(
                                MappingAreaAllocations::Table,
                                MappingAreaAllocations::MappingAreaId,
                            )
                            .to(MappingAreas::Table, MappingAreas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mapping_area_allocations_user_id")
                            .from(MappingAreaAllocations::Table, MappingAreaAllocations::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create dataset_user_mapping_areas table
        manager
            .create_table(
                Table::create()
                    .table(DatasetUserMappingAreas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DatasetUserMappingAreas::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DatasetUserMappingAreas::DatasetId).uuid().not_null())
                    .col(ColumnDef::new(DatasetUserMappingAreas::UserId).uuid().not_null())
                    .col(ColumnDef::new(DatasetUserMappingAreas::MappingAreaId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_restrictions_dataset_id")
                            .from(DatasetUserMappingAreas::Table, DatasetUserMappingAreas::DatasetId)
                            .to(Datasets::Table, Datasets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_restrictions_user_id")
                            .from(DatasetUserMappingAreas::Table, DatasetUserMappingAreas::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_restrictions_area_id")
                            .from(
                                DatasetUserMappingAreas::Table,
                                DatasetUserMappingAreas::MappingAreaId,
                            )
                            .to(MappingAreas::Table, MappingAreas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dataset_user_area_unique")
                    .table(DatasetUserMappingAreas::Table)
                    .col(DatasetUserMappingAreas::DatasetId)
                    .col(DatasetUserMappingAreas::UserId)
                    .col(DatasetUserMappingAreas::MappingAreaId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create dataset_group_mapping_areas table
        manager
            .create_table(
                Table::create()
                    .table(DatasetGroupMappingAreas::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DatasetGroupMappingAreas::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(DatasetGroupMappingAreas::DatasetId).uuid().not_null())
                    .col(ColumnDef::new(DatasetGroupMappingAreas::GroupId).uuid().not_null())
                    .col(ColumnDef::new(DatasetGroupMappingAreas::MappingAreaId).uuid().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_restrictions_dataset_id")
                            .from(
                                DatasetGroupMappingAreas::Table,
                                DatasetGroupMappingAreas::DatasetId,
                            )
                            .to(Datasets::Table, Datasets::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_restrictions_group_id")
                            .from(
                                DatasetGroupMappingAreas::Table,
                                DatasetGroupMappingAreas::GroupId,
                            )
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_group_restrictions_area_id")
                            .from(
                                DatasetGroupMappingAreas::Table,
                                DatasetGroupMappingAreas::MappingAreaId,
                            )
                            .to(MappingAreas::Table, MappingAreas::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_dataset_group_area_unique")
                    .table(DatasetGroupMappingAreas::Table)
                    .col(DatasetGroupMappingAreas::DatasetId)
                    .col(DatasetGroupMappingAreas::GroupId)
                    .col(DatasetGroupMappingAreas::MappingAreaId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DatasetGroupMappingAreas::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DatasetUserMappingAreas::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MappingAreaAllocations::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MappingAreas::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DatasetSharedGroups::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DatasetSharedUsers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GeometryEntries::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Geometries::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DatasetFields::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Datasets::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(GroupMembers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    DisplayName,
    PasswordHash,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    Id,
    Name,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GroupMembers {
    Table,
    GroupId,
    UserId,
}

#[derive(DeriveIden)]
enum Datasets {
    Table,
    Id,
    OwnerId,
    Name,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum DatasetFields {
    Table,
    Id,
    DatasetId,
    Name,
    FieldType,
    Position,
}

#[derive(DeriveIden)]
enum Geometries {
    Table,
    Id,
    DatasetId,
    IdKurz,
    Address,
    Lon,
    Lat,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GeometryEntries {
    Table,
    Id,
    GeometryId,
    FieldId,
    Value,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DatasetSharedUsers {
    Table,
    DatasetId,
    UserId,
}

#[derive(DeriveIden)]
enum DatasetSharedGroups {
    Table,
    DatasetId,
    GroupId,
}

#[derive(DeriveIden)]
enum MappingAreas {
    Table,
    Id,
    DatasetId,
    Name,
    Polygon,
    CreatedAt,
}

#[derive(DeriveIden)]
enum MappingAreaAllocations {
    Table,
    MappingAreaId,
    UserId,
}

#[derive(DeriveIden)]
enum DatasetUserMappingAreas {
    Table,
    Id,
    DatasetId,
    UserId,
    MappingAreaId,
}

#[derive(DeriveIden)]
enum DatasetGroupMappingAreas {
    Table,
    Id,
    DatasetId,
    GroupId,
    MappingAreaId,
}
