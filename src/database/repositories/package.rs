//! Package repository

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;

use crate::entities::{
    package_channels, packages,
    prelude::{PackageChannels, Packages},
};
use crate::errors::{AppError, AppResult};

/// A package together with its channel id list
#[derive(Debug, Clone, serde::Serialize)]
pub struct PackageWithChannels {
    #[serde(flatten)]
    pub package: packages::Model,
    pub channel_ids: Vec<i32>,
}

#[derive(Clone)]
pub struct PackageRepository {
    connection: Arc<DatabaseConnection>,
}

impl PackageRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<packages::Model> {
        Packages::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| AppError::not_found("package", id))
    }

    pub async fn find_all(&self) -> AppResult<Vec<packages::Model>> {
        Ok(Packages::find()
            .order_by_asc(packages::Column::Name)
            .all(&*self.connection)
            .await?)
    }

    pub async fn find_with_channels(&self, id: i32) -> AppResult<PackageWithChannels> {
        let package = self.find_by_id(id).await?;
        let channel_ids = PackageChannels::find()
            .filter(package_channels::Column::PackageId.eq(id))
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(|row| row.channel_id)
            .collect();

        Ok(PackageWithChannels {
            package,
            channel_ids,
        })
    }

    pub async fn create(&self, name: &str, description: Option<String>) -> AppResult<packages::Model> {
        self.check_name_unique(name, None).await?;

        let now = chrono::Utc::now();
        let active = packages::ActiveModel {
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
    ) -> AppResult<packages::Model> {
        let package = self.find_by_id(id).await?;

        if let Some(new_name) = name.as_deref() {
            if new_name != package.name {
                self.check_name_unique(new_name, Some(id)).await?;
            }
        }

        let mut active: packages::ActiveModel = package.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(description) = description {
            active.description = Set(Some(description).filter(|s| !s.is_empty()));
        }
        active.updated_at = Set(chrono::Utc::now());
        Ok(active.update(&*self.connection).await?)
    }

    /// Delete a package; channel, tariff and subscriber associations cascade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.find_by_id(id).await?;
        Packages::delete_by_id(id).exec(&*self.connection).await?;
        Ok(())
    }

    /// Replace the package's channel list
    pub async fn set_channels(&self, package_id: i32, channel_ids: &[i32]) -> AppResult<()> {
        self.find_by_id(package_id).await?;

        PackageChannels::delete_many()
            .filter(package_channels::Column::PackageId.eq(package_id))
            .exec(&*self.connection)
            .await?;

        if !channel_ids.is_empty() {
            let rows = channel_ids
                .iter()
                .map(|channel_id| package_channels::ActiveModel {
                    package_id: Set(package_id),
                    channel_id: Set(*channel_id),
                });
            PackageChannels::insert_many(rows).exec(&*self.connection).await?;
        }

        Ok(())
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(Packages::find().count(&*self.connection).await?)
    }

    async fn check_name_unique(&self, name: &str, exclude_id: Option<i32>) -> AppResult<()> {
        let mut select = Packages::find().filter(packages::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            select = select.filter(packages::Column::Id.ne(id));
        }
        if select.one(&*self.connection).await?.is_some() {
            return Err(AppError::duplicate("package", name));
        }
        Ok(())
    }
}
