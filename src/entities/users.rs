//! Subscriber entity
//!
//! `agreement_number` is the external business key; `token` is the opaque
//! streaming credential carried in playlist URLs. `auth_token_id` is owned by
//! the authorization relay: set only after a successful remote create, and
//! cleared/recreated on token regeneration.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub agreement_number: String,
    pub status: UserStatus,
    pub max_sessions: i32,
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token: String,
    pub auth_token_id: Option<i64>,
    pub valid_from: Option<DateTimeUtc>,
    pub valid_until: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    #[sea_orm(string_value = "enabled")]
    Enabled,
    #[sea_orm(string_value = "disabled")]
    Disabled,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl Related<super::channels::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_channels::Relation::Channels.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_channels::Relation::Users.def().rev())
    }
}

impl Related<super::packages::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_packages::Relation::Packages.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_packages::Relation::Users.def().rev())
    }
}

impl Related<super::tariffs::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_tariffs::Relation::Tariffs.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_tariffs::Relation::Users.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
