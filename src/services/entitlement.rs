//! Entitlement resolver
//!
//! Computes the exact channel set a subscriber is entitled to from three
//! independent grant paths: direct channel grants, package grants, and tariff
//! grants (tariff -> packages -> channels). The union is deduplicated by
//! channel id and ordered deterministically: `channel_number` ascending with
//! nulls last, then `sort_order`, then `id`.
//!
//! Results are never cached; the playlist codec and the authorization relay
//! re-resolve on every call because grants can change between them.

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, Order, QueryFilter, QueryOrder,
    QuerySelect, sea_query::NullOrdering,
};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::entities::{
    channel_groups, channels, groups, package_channels,
    prelude::{Channels, PackageChannels, TariffPackages, UserChannels, UserPackages, UserTariffs, Users},
    tariff_packages, user_channels, user_packages, user_tariffs,
};
use crate::errors::{AppError, AppResult};

/// A resolved channel together with its groups, ready for playlist encoding
#[derive(Debug, Clone, serde::Serialize)]
pub struct ResolvedChannel {
    pub channel: channels::Model,
    pub groups: Vec<groups::Model>,
}

pub struct EntitlementResolver {
    connection: Arc<DatabaseConnection>,
}

impl EntitlementResolver {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Resolve the deduplicated, ordered channel set for a subscriber.
    ///
    /// An empty grant set is a valid result, not an error.
    pub async fn resolve_channels(&self, user_id: i32) -> AppResult<Vec<channels::Model>> {
        if Users::find_by_id(user_id)
            .one(&*self.connection)
            .await?
            .is_none()
        {
            return Err(AppError::not_found("user", user_id));
        }

        let channel_ids = self.collect_channel_ids(user_id).await?;
        if channel_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(Channels::find()
            .filter(channels::Column::Id.is_in(channel_ids))
            .order_by_with_nulls(
                channels::Column::ChannelNumber,
                Order::Asc,
                NullOrdering::Last,
            )
            .order_by_asc(channels::Column::SortOrder)
            .order_by_asc(channels::Column::Id)
            .all(&*self.connection)
            .await?)
    }

    /// Same as [`resolve_channels`](Self::resolve_channels) but with each
    /// channel's groups batch-loaded for the playlist encoder.
    pub async fn resolve_channels_with_groups(
        &self,
        user_id: i32,
    ) -> AppResult<Vec<ResolvedChannel>> {
        let channels = self.resolve_channels(user_id).await?;
        let groups = channels
            .load_many_to_many(groups::Entity, channel_groups::Entity, &*self.connection)
            .await?;

        Ok(channels
            .into_iter()
            .zip(groups)
            .map(|(channel, groups)| ResolvedChannel { channel, groups })
            .collect())
    }

    /// Union of the three grant paths, as a deduplicated id set.
    ///
    /// Each hop is one batched `IN` query, so the two-hop tariff path costs a
    /// fixed number of round trips regardless of grant counts.
    async fn collect_channel_ids(&self, user_id: i32) -> AppResult<BTreeSet<i32>> {
        let mut channel_ids: BTreeSet<i32> = UserChannels::find()
            .filter(user_channels::Column::UserId.eq(user_id))
            .select_only()
            .column(user_channels::Column::ChannelId)
            .into_tuple()
            .all(&*self.connection)
            .await?
            .into_iter()
            .collect();

        let mut package_ids: BTreeSet<i32> = UserPackages::find()
            .filter(user_packages::Column::UserId.eq(user_id))
            .select_only()
            .column(user_packages::Column::PackageId)
            .into_tuple()
            .all(&*self.connection)
            .await?
            .into_iter()
            .collect();

        let tariff_ids: Vec<i32> = UserTariffs::find()
            .filter(user_tariffs::Column::UserId.eq(user_id))
            .select_only()
            .column(user_tariffs::Column::TariffId)
            .into_tuple()
            .all(&*self.connection)
            .await?;

        if !tariff_ids.is_empty() {
            let tariff_package_ids: Vec<i32> = TariffPackages::find()
                .filter(tariff_packages::Column::TariffId.is_in(tariff_ids))
                .select_only()
                .column(tariff_packages::Column::PackageId)
                .into_tuple()
                .all(&*self.connection)
                .await?;
            package_ids.extend(tariff_package_ids);
        }

        if !package_ids.is_empty() {
            let package_channel_ids: Vec<i32> = PackageChannels::find()
                .filter(package_channels::Column::PackageId.is_in(package_ids))
                .select_only()
                .column(package_channels::Column::ChannelId)
                .into_tuple()
                .all(&*self.connection)
                .await?;
            channel_ids.extend(package_channel_ids);
        }

        Ok(channel_ids)
    }
}
