//! Channel repository
//!
//! Curated-metadata updates only touch UI-managed fields; everything sourced
//! from the media server is written exclusively by the sync engine.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
    sea_query::{Condition, NullOrdering},
};
use std::sync::Arc;

use crate::entities::{
    channel_groups, channels,
    channels::SyncStatus,
    package_channels,
    prelude::{ChannelGroups, Channels, PackageChannels, UserChannels},
    user_channels,
};
use crate::errors::{AppError, AppResult};

/// UI-managed field updates; `None` leaves a field unchanged, an empty string
/// (or non-positive channel number) clears it
#[derive(Debug, Clone, Default)]
pub struct ChannelUpdateRequest {
    pub tvg_id: Option<String>,
    pub tvg_logo: Option<String>,
    pub channel_number: Option<i32>,
}

/// List filter and pagination parameters
#[derive(Debug, Clone, Default)]
pub struct ChannelListQuery {
    pub search: Option<String>,
    pub group_id: Option<i32>,
    pub sync_status: Option<SyncStatus>,
    pub page: u64,
    pub per_page: u64,
}

/// How many packages and subscribers reference a channel
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChannelCascadeInfo {
    pub packages: u64,
    pub users: u64,
}

#[derive(Clone)]
pub struct ChannelRepository {
    connection: Arc<DatabaseConnection>,
}

impl ChannelRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<channels::Model> {
        Channels::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| AppError::not_found("channel", id))
    }

    pub async fn find_by_stream_name(&self, stream_name: &str) -> AppResult<Option<channels::Model>> {
        Ok(Channels::find()
            .filter(channels::Column::StreamName.eq(stream_name))
            .one(&*self.connection)
            .await?)
    }

    /// Paginated listing ordered by channel number (nulls last), then sort
    /// order, then id
    pub async fn list(&self, query: &ChannelListQuery) -> AppResult<(Vec<channels::Model>, u64)> {
        let mut select = Channels::find();

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            select = select.filter(
                Condition::any()
                    .add(channels::Column::StreamName.like(&pattern))
                    .add(channels::Column::DisplayName.like(&pattern))
                    .add(channels::Column::TvgName.like(&pattern))
                    .add(channels::Column::TvgId.like(&pattern)),
            );
        }

        if let Some(group_id) = query.group_id {
            let channel_ids: Vec<i32> = ChannelGroups::find()
                .filter(channel_groups::Column::GroupId.eq(group_id))
                .select_only()
                .column(channel_groups::Column::ChannelId)
                .into_tuple()
                .all(&*self.connection)
                .await?;
            select = select.filter(channels::Column::Id.is_in(channel_ids));
        }

        if let Some(status) = query.sync_status {
            select = select.filter(channels::Column::SyncStatus.eq(status));
        }

        let select = select
            .order_by_with_nulls(
                channels::Column::ChannelNumber,
                Order::Asc,
                NullOrdering::Last,
            )
            .order_by_asc(channels::Column::SortOrder)
            .order_by_asc(channels::Column::Id);

        let per_page = query.per_page.clamp(1, 500);
        let paginator = select.paginate(&*self.connection, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(query.page).await?;

        Ok((items, total))
    }

    /// Update UI-managed fields only
    pub async fn update_curated(
        &self,
        id: i32,
        request: ChannelUpdateRequest,
    ) -> AppResult<channels::Model> {
        let channel = self.find_by_id(id).await?;
        let mut active: channels::ActiveModel = channel.into();

        if let Some(tvg_id) = request.tvg_id {
            active.tvg_id = Set(Some(tvg_id).filter(|s| !s.is_empty()));
        }
        if let Some(tvg_logo) = request.tvg_logo {
            active.tvg_logo = Set(Some(tvg_logo).filter(|s| !s.is_empty()));
        }
        if let Some(number) = request.channel_number {
            active.channel_number = Set(Some(number).filter(|n| *n > 0));
        }
        active.updated_at = Set(chrono::Utc::now());

        Ok(active.update(&*self.connection).await?)
    }

    /// Replace the channel's group memberships
    pub async fn set_groups(&self, channel_id: i32, group_ids: &[i32]) -> AppResult<()> {
        self.find_by_id(channel_id).await?;

        ChannelGroups::delete_many()
            .filter(channel_groups::Column::ChannelId.eq(channel_id))
            .exec(&*self.connection)
            .await?;

        if !group_ids.is_empty() {
            let rows = group_ids.iter().map(|group_id| channel_groups::ActiveModel {
                channel_id: Set(channel_id),
                group_id: Set(*group_id),
            });
            ChannelGroups::insert_many(rows).exec(&*self.connection).await?;
        }

        Ok(())
    }

    /// Replace the channel's package memberships
    pub async fn set_packages(&self, channel_id: i32, package_ids: &[i32]) -> AppResult<()> {
        self.find_by_id(channel_id).await?;

        PackageChannels::delete_many()
            .filter(package_channels::Column::ChannelId.eq(channel_id))
            .exec(&*self.connection)
            .await?;

        if !package_ids.is_empty() {
            let rows = package_ids
                .iter()
                .map(|package_id| package_channels::ActiveModel {
                    package_id: Set(*package_id),
                    channel_id: Set(channel_id),
                });
            PackageChannels::insert_many(rows).exec(&*self.connection).await?;
        }

        Ok(())
    }

    /// Batch sort-order update
    pub async fn reorder(&self, order: &[(i32, i32)]) -> AppResult<()> {
        for (id, sort_order) in order {
            if let Some(channel) = Channels::find_by_id(*id).one(&*self.connection).await? {
                let mut active: channels::ActiveModel = channel.into();
                active.sort_order = Set(*sort_order);
                active.updated_at = Set(chrono::Utc::now());
                active.update(&*self.connection).await?;
            }
        }
        Ok(())
    }

    /// Delete a channel. Non-orphaned channels are refused unless `force` is
    /// requested; association rows cascade.
    pub async fn delete(&self, id: i32, force: bool) -> AppResult<()> {
        let channel = self.find_by_id(id).await?;

        if !force && channel.sync_status != SyncStatus::Orphaned {
            return Err(AppError::validation(
                "only orphaned channels can be deleted without force",
            ));
        }

        Channels::delete_by_id(id).exec(&*self.connection).await?;
        Ok(())
    }

    pub async fn cascade_info(&self, id: i32) -> AppResult<ChannelCascadeInfo> {
        let packages = PackageChannels::find()
            .filter(package_channels::Column::ChannelId.eq(id))
            .count(&*self.connection)
            .await?;
        let users = UserChannels::find()
            .filter(user_channels::Column::ChannelId.eq(id))
            .count(&*self.connection)
            .await?;

        Ok(ChannelCascadeInfo { packages, users })
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(Channels::find().count(&*self.connection).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::migrations::Migrator;
    use sea_orm_migration::MigratorTrait;

    async fn setup() -> ChannelRepository {
        let connection = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&connection, None).await.unwrap();
        ChannelRepository::new(Arc::new(connection))
    }

    async fn seed(
        repo: &ChannelRepository,
        stream_name: &str,
        status: SyncStatus,
    ) -> channels::Model {
        let now = chrono::Utc::now();
        channels::ActiveModel {
            stream_name: Set(stream_name.to_string()),
            sort_order: Set(0),
            sync_status: Set(status),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&*repo.connection)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn synced_channel_delete_requires_force() {
        let repo = setup().await;
        let channel = seed(&repo, "live", SyncStatus::Synced).await;

        let err = repo.delete(channel.id, false).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { .. }));

        // Refused delete leaves the row in place
        repo.find_by_id(channel.id).await.unwrap();

        repo.delete(channel.id, true).await.unwrap();
        assert!(matches!(
            repo.find_by_id(channel.id).await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn orphaned_channel_deletes_without_force() {
        let repo = setup().await;
        let channel = seed(&repo, "gone", SyncStatus::Orphaned).await;

        repo.delete(channel.id, false).await.unwrap();
        assert!(matches!(
            repo.find_by_id(channel.id).await,
            Err(AppError::NotFound { .. })
        ));
    }
}
