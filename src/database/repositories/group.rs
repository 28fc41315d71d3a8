//! Group repository

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use std::sync::Arc;

use crate::entities::{groups, prelude::Groups};
use crate::errors::{AppError, AppResult};

#[derive(Clone)]
pub struct GroupRepository {
    connection: Arc<DatabaseConnection>,
}

impl GroupRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<groups::Model> {
        Groups::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| AppError::not_found("group", id))
    }

    pub async fn find_all(&self) -> AppResult<Vec<groups::Model>> {
        Ok(Groups::find()
            .order_by_asc(groups::Column::SortOrder)
            .order_by_asc(groups::Column::Name)
            .all(&*self.connection)
            .await?)
    }

    pub async fn create(&self, name: &str, sort_order: i32) -> AppResult<groups::Model> {
        self.check_name_unique(name, None).await?;

        let now = chrono::Utc::now();
        let active = groups::ActiveModel {
            name: Set(name.to_string()),
            sort_order: Set(sort_order),
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
        sort_order: Option<i32>,
    ) -> AppResult<groups::Model> {
        let group = self.find_by_id(id).await?;

        if let Some(new_name) = name.as_deref() {
            if new_name != group.name {
                self.check_name_unique(new_name, Some(id)).await?;
            }
        }

        let mut active: groups::ActiveModel = group.into();
        if let Some(name) = name {
            active.name = Set(name);
        }
        if let Some(sort_order) = sort_order {
            active.sort_order = Set(sort_order);
        }
        active.updated_at = Set(chrono::Utc::now());
        Ok(active.update(&*self.connection).await?)
    }

    /// Delete a group; channel associations cascade
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.find_by_id(id).await?;
        Groups::delete_by_id(id).exec(&*self.connection).await?;
        Ok(())
    }

    pub async fn reorder(&self, order: &[(i32, i32)]) -> AppResult<()> {
        for (id, sort_order) in order {
            if let Some(group) = Groups::find_by_id(*id).one(&*self.connection).await? {
                let mut active: groups::ActiveModel = group.into();
                active.sort_order = Set(*sort_order);
                active.updated_at = Set(chrono::Utc::now());
                active.update(&*self.connection).await?;
            }
        }
        Ok(())
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(Groups::find().count(&*self.connection).await?)
    }

    async fn check_name_unique(&self, name: &str, exclude_id: Option<i32>) -> AppResult<()> {
        let mut select = Groups::find().filter(groups::Column::Name.eq(name));
        if let Some(id) = exclude_id {
            select = select.filter(groups::Column::Id.ne(id));
        }
        if select.one(&*self.connection).await?.is_some() {
            return Err(AppError::duplicate("group", name));
        }
        Ok(())
    }
}
