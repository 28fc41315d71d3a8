//! Package entity: a bundle of channels sellable as a unit

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "packages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::channels::Entity> for Entity {
    fn to() -> RelationDef {
        super::package_channels::Relation::Channels.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::package_channels::Relation::Packages.def().rev())
    }
}

impl Related<super::tariffs::Entity> for Entity {
    fn to() -> RelationDef {
        super::tariff_packages::Relation::Tariffs.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::tariff_packages::Relation::Packages.def().rev())
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_packages::Relation::Users.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_packages::Relation::Packages.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
