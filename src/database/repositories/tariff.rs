//! Tariff repository

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;

use crate::entities::{
    prelude::{TariffPackages, Tariffs},
    tariff_packages, tariffs,
};
use crate::errors::{AppError, AppResult};

/// A tariff together with its package id list
#[derive(Debug, Clone, serde::Serialize)]
pub struct TariffWithPackages {
    #[serde(flatten)]
    pub tariff: tariffs::Model,
    pub package_ids: Vec<i32>,
}

#[derive(Clone)]
pub struct TariffRepository {
    connection: Arc<DatabaseConnection>,
}

impl TariffRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<tariffs::Model> {
        Tariffs::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| AppError::not_found("tariff", id))
    }

    pub async fn find_all(&self) -> AppResult<Vec<tariffs::Model>> {
        Ok(Tariffs::find()
            .order_by_asc(tariffs::Column::Name)
            .all(&*self.connection)
            .await?)
    }

    pub async fn find_with_packages(&self, id: i32) -> AppResult<TariffWithPackages> {
        let tariff = self.find_by_id(id).await?;
        let package_ids = TariffPackages::find()
            .filter(tariff_packages::Column::TariffId.eq(id))
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(|row| row.package_id)
            .collect();

        Ok(TariffWithPackages {
            tariff,
            package_ids,
        })
    }

    pub async fn create(&self, name: &str, description: Option<String>) -> AppResult<tariffs::Model> {
        self.check_name_unique(name, None).await?;

        let now = chrono::Utc::now();
        let active = tariffs::ActiveModel {
            name: Set(name.to_string()),
            description: Set(description.filter(|s| !s.is_empty())),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        Ok(active.insert(&*self.connection).await?)
    }

    pub async fn update(
        &self,
        id: i32,
        name: Option<String>,
        description: Option<String>,
    ) -> AppResult<tariffs::Model> {
        let tariff = self.find_by_id(id).await?;

        if let Some(new_name) = name.as_deref() {
            if new_name != tariff.name {
                self.check_name_unique(new_name, Some(id)).await?;
            }
        }

        let mut active: tariffs::ActiveModel = tariff.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(Some(description).filter(|s| !s.is_empty()));
        }
        active.updated_at = Set(chrono::Utc::now());
        Ok(active.update(&*self.connection).await?)
    }

    /// Delete a tariff; package and subscriber associations cascade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.find_by_id(id).await?;
        Tariffs::delete_by_id(id).exec(&*self.connection).await?;
        Ok(())
    }

    /// Replace the tariff's package list
    pub async fn set_packages(&self, tariff_id: i32, package_ids: &[i32]) -> AppResult<()> {
        self.find_by_id(tariff_id).await?;

        TariffPackages::delete_many()
            .filter(tariff_packages::Column::TariffId.eq(tariff_id))
            .exec(&*self.connection)
            .await?;

        if !package_ids.is_empty() {
            let rows = package_ids
                .iter()
                .map(|package_id| tariff_packages::ActiveModel {
                    tariff_id: Set(tariff_id),
                    package_id: Set(*package_id),
                });
            TariffPackages::insert_many(rows).exec(&*self.connection).await?;
        }

        Ok(())
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(Tariffs::find().count(&*self.connection).await?)
    }

    async fn check_name_unique(&self, name: &str, exclude_id: Option<i32>) -> AppResult<()> {
        let mut select = Tariffs::find().filter(tariffs::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            select = select.filter(tariffs::Column::Id.ne(id));
        }
        if select.one(&*self.connection).await?.is_some() {
            return Err(AppError::duplicate("tariff", name));
        }
        Ok(())
    }
}
