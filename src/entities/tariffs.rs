//! Tariff entity: a bundle of packages

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tariffs")]
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

impl Related<super::packages::Entity> for Entity {
    fn to() -> RelationDef {
        super::tariff_packages::Relation::Packages.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::tariff_packages::Relation::Tariffs.def().rev())
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_tariffs::Relation::Users.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_tariffs::Relation::Tariffs.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
