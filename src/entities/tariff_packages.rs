//! Tariff <-> Package association

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "tariff_packages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub tariff_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub package_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::tariffs::Entity",
        from = "Column::TariffId",
        to = "super::tariffs::Column::Id",
        on_delete = "Cascade"
    )]
    Tariffs,
    #[sea_orm(
        belongs_to = "super::packages::Entity",
        from = "Column::PackageId",
        to = "super::packages::Column::Id",
        on_delete = "Cascade"
    )]
    Packages,
}

impl ActiveModelBehavior for ActiveModel {}
