// ABOUTME: Collected value for one field of one geometry
// ABOUTME: Unique per (geometry, field); saves replace the previous value

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "geometry_entries")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub geometry_id: Uuid,
    pub field_id: Uuid,
    pub value: String,
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::geometry::Entity",
        from = "Column::GeometryId",
        to = "super::geometry::Column::Id"
    )]
    Geometry,
    #[sea_orm(
        belongs_to = "super::dataset_field::Entity",
        from = "Column::FieldId",
        to = "super::dataset_field::Column::Id"
    )]
    Field,
}

impl Related<super::geometry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Geometry.def()
    }
}

impl Related<super::dataset_field::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Field.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
