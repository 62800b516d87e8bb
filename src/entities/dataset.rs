// ABOUTME: Dataset entity owning fields, geometries, and mapping areas
// ABOUTME: The owner always retains full access regardless of restriction rows

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "datasets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub description: String,
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::OwnerId",
        to = "super::user::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::dataset_field::Entity")]
    Fields,
    #[sea_orm(has_many = "super::geometry::Entity")]
    Geometries,
    #[sea_orm(has_many = "super::mapping_area::Entity")]
    MappingAreas,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::dataset_field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Fields.def()
    }
}

impl Related<super::geometry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Geometries.def()
    }
}

impl Related<super::mapping_area::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MappingAreas.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
