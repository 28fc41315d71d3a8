//! Package <-> Channel association

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "package_channels")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub package_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub channel_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::packages::Entity",
        from = "Column::PackageId",
        to = "super::packages::Column::Id",
        on_delete = "Cascade"
    )]
    Packages,
    #[sea_orm(
        belongs_to = "super::channels::Entity",
        from = "Column::ChannelId",
        to = "super::channels::Column::Id",
        on_delete = "Cascade"
    )]
    Channels,
}

impl ActiveModelBehavior for ActiveModel {}
