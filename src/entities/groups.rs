//! Group entity
//!
//! Purely an administrative grouping and ordering aid. The playlist encoder
//! renders a channel's groups into the `group-title` attribute.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "groups")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub sort_order: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::channels::Entity> for Entity {
    fn to() -> RelationDef {
        super::channel_groups::Relation::Channels.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::channel_groups::Relation::Groups.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
