// ABOUTME: SeaORM entities module for database models and relationships
// ABOUTME: Exports entity definitions for users, groups, datasets, geometries, and access control

pub mod user;
pub mod group;
pub mod group_member;
pub mod dataset;
pub mod dataset_field;
pub mod geometry;
pub mod geometry_entry;
pub mod dataset_shared_user;
pub mod dataset_shared_group;
pub mod mapping_area;
pub mod mapping_area_allocation;
pub mod dataset_user_mapping_area;
pub mod dataset_group_mapping_area;

pub use user::Entity as User;
pub use group::Entity as Group;
pub use group_member::Entity as GroupMember;
pub use dataset::Entity as Dataset;
pub use dataset_field::Entity as DatasetField;
pub use geometry::Entity as Geometry;
pub use geometry_entry::Entity as GeometryEntry;
pub use dataset_shared_user::Entity as DatasetSharedUser;
pub use dataset_shared_group::Entity as DatasetSharedGroup;
pub use mapping_area::Entity as MappingArea;
pub use mapping_area_allocation::Entity as MappingAreaAllocation;
pub use dataset_user_mapping_area::Entity as DatasetUserMappingArea;
pub use dataset_group_mapping_area::Entity as DatasetGroupMappingArea;
