//! Channel entity
//!
//! Channels are sourced from the media server by the sync engine, which owns
//! `stream_name`, `tvg_name`, `display_name`, `catchup_days`, `sync_status`
//! and `last_seen_at`. The remaining attributes are curated by administrators
//! and must never be written by sync.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "channels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub stream_name: String,
    pub tvg_name: Option<String>,
    pub display_name: Option<String>,
    pub catchup_days: Option<i32>,
    pub tvg_id: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub tvg_logo: Option<String>,
    pub channel_number: Option<i32>,
    pub sort_order: i32,
    pub sync_status: SyncStatus,
    pub last_seen_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

/// Whether the channel was present in the most recent media-server listing
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    #[sea_orm(string_value = "synced")]
    Synced,
    #[sea_orm(string_value = "orphaned")]
    Orphaned,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::groups::Entity> for Entity {
    fn to() -> RelationDef {
        super::channel_groups::Relation::Groups.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::channel_groups::Relation::Channels.def().rev())
    }
}

impl Related<super::packages::Entity> for Entity {
    fn to() -> RelationDef {
        super::package_channels::Relation::Packages.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::package_channels::Relation::Channels.def().rev())
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_channels::Relation::Users.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_channels::Relation::Channels.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
