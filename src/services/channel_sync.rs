//! Channel synchronization engine
//!
//! Reconciles the local channel catalog against the media server's stream
//! list. The media server is authoritative for stream existence only:
//! media-sourced fields are overwritten, administrator-curated fields
//! (`tvg_id`, `tvg_logo`, `channel_number`, `sort_order`, memberships) are
//! never touched, and channels that have disappeared upstream are flagged
//! `Orphaned` rather than deleted.
//!
//! The whole reconciliation commits in one transaction; if the media server
//! is unreachable nothing is written.

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::clients::MediaServerApi;
use crate::entities::{channels, channels::SyncStatus, prelude::Channels};
use crate::errors::AppResult;

/// Result of one synchronization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Streams reported by the media server
    pub total: usize,
    /// Channels created this run
    pub new: usize,
    /// Channels refreshed this run
    pub updated: usize,
    /// Channels newly flagged orphaned this run
    pub orphaned: usize,
}

pub struct ChannelSyncEngine {
    connection: Arc<DatabaseConnection>,
    media_server: Arc<dyn MediaServerApi>,
}

impl ChannelSyncEngine {
    pub fn new(connection: Arc<DatabaseConnection>, media_server: Arc<dyn MediaServerApi>) -> Self {
        Self {
            connection,
            media_server,
        }
    }

    /// Run one reconciliation pass. Idempotent: rerunning against an
    /// unchanged stream list yields `new = 0` and `orphaned = 0`.
    pub async fn sync(&self) -> AppResult<SyncReport> {
        info!("starting channel sync from media server");

        let streams = self.media_server.list_streams().await?;

        let txn = self.connection.begin().await?;
        let now = chrono::Utc::now();

        // One read for the whole catalog; matched entries are removed so the
        // leftovers are the orphan candidates.
        let mut existing: HashMap<String, channels::Model> = Channels::find()
            .all(&txn)
            .await?
            .into_iter()
            .map(|channel| (channel.stream_name.clone(), channel))
            .collect();

        let mut new_count = 0;
        let mut updated_count = 0;

        for stream in &streams {
            match existing.remove(&stream.name) {
                Some(channel) => {
                    let mut active: channels::ActiveModel = channel.into();
                    active.tvg_name = Set(stream.title.clone());
                    active.display_name = Set(stream.title.clone());
                    active.catchup_days = Set(stream.dvr_days);
                    active.sync_status = Set(SyncStatus::Synced);
                    active.last_seen_at = Set(Some(now));
                    active.updated_at = Set(now);
                    active.update(&txn).await?;
                    updated_count += 1;
                }
                None => {
                    let active = channels::ActiveModel {
                        stream_name: Set(stream.name.clone()),
                        tvg_name: Set(stream.title.clone()),
                        display_name: Set(stream.title.clone()),
                        catchup_days: Set(stream.dvr_days),
                        sort_order: Set(0),
                        sync_status: Set(SyncStatus::Synced),
                        last_seen_at: Set(Some(now)),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    };
                    active.insert(&txn).await?;
                    new_count += 1;
                }
            }
        }

        // Whatever the upstream listing no longer mentions becomes orphaned
        let mut orphaned_count = 0;
        for channel in existing.into_values() {
            if channel.sync_status != SyncStatus::Orphaned {
                let mut active: channels::ActiveModel = channel.into();
                active.sync_status = Set(SyncStatus::Orphaned);
                active.updated_at = Set(now);
                active.update(&txn).await?;
                orphaned_count += 1;
            }
        }

        txn.commit().await?;

        let report = SyncReport {
            total: streams.len(),
            new: new_count,
            updated: updated_count,
            orphaned: orphaned_count,
        };
        info!(
            total = report.total,
            new = report.new,
            updated = report.updated,
            orphaned = report.orphaned,
            "channel sync complete"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MediaStream;
    use crate::database::migrations::Migrator;
    use crate::errors::AppError;
    use async_trait::async_trait;
    use sea_orm::{ColumnTrait, QueryFilter};
    use sea_orm_migration::MigratorTrait;
    use std::sync::Mutex;

    struct FakeMediaServer {
        streams: Mutex<Result<Vec<MediaStream>, String>>,
    }

    impl FakeMediaServer {
        fn with_streams(streams: Vec<MediaStream>) -> Arc<Self> {
            Arc::new(Self {
                streams: Mutex::new(Ok(streams)),
            })
        }

        fn unreachable() -> Arc<Self> {
            Arc::new(Self {
                streams: Mutex::new(Err("connection refused".to_string())),
            })
        }

        fn set_streams(&self, streams: Vec<MediaStream>) {
            *self.streams.lock().unwrap() = Ok(streams);
        }
    }

    #[async_trait]
    impl MediaServerApi for FakeMediaServer {
        async fn list_streams(&self) -> AppResult<Vec<MediaStream>> {
            self.streams
                .lock()
                .unwrap()
                .clone()
                .map_err(|message| AppError::upstream("media-server", message))
        }
    }

    fn stream(name: &str, title: Option<&str>, dvr: Option<i32>) -> MediaStream {
        MediaStream {
            name: name.to_string(),
            title: title.map(str::to_string),
            dvr_days: dvr,
        }
    }

    async fn test_connection() -> Arc<DatabaseConnection> {
        let connection = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&connection, None).await.unwrap();
        Arc::new(connection)
    }

    async fn channel_by_name(conn: &DatabaseConnection, name: &str) -> channels::Model {
        Channels::find()
            .filter(channels::Column::StreamName.eq(name))
            .one(conn)
            .await
            .unwrap()
            .unwrap()
    }

    #[tokio::test]
    async fn creates_channels_from_stream_list() {
        let conn = test_connection().await;
        let media = FakeMediaServer::with_streams(vec![
            stream("sport1", Some("Sport One"), Some(7)),
            stream("news", None, None),
        ]);
        let engine = ChannelSyncEngine::new(conn.clone(), media);

        let report = engine.sync().await.unwrap();
        assert_eq!(report.total, 2);
        assert_eq!(report.new, 2);
        assert_eq!(report.updated, 0);
        assert_eq!(report.orphaned, 0);

        let sport = channel_by_name(&conn, "sport1").await;
        assert_eq!(sport.tvg_name.as_deref(), Some("Sport One"));
        assert_eq!(sport.display_name.as_deref(), Some("Sport One"));
        assert_eq!(sport.catchup_days, Some(7));
        assert_eq!(sport.sync_status, SyncStatus::Synced);
        assert!(sport.last_seen_at.is_some());
    }

    #[tokio::test]
    async fn rerun_with_unchanged_list_is_idempotent() {
        let conn = test_connection().await;
        let media = FakeMediaServer::with_streams(vec![stream("a", Some("A"), None)]);
        let engine = ChannelSyncEngine::new(conn.clone(), media);

        engine.sync().await.unwrap();
        let second = engine.sync().await.unwrap();

        assert_eq!(second.new, 0);
        assert_eq!(second.updated, 1);
        assert_eq!(second.orphaned, 0);
    }

    #[tokio::test]
    async fn preserves_curated_fields_on_update() {
        let conn = test_connection().await;
        let media = FakeMediaServer::with_streams(vec![stream("movie", Some("Movies"), Some(3))]);
        let engine = ChannelSyncEngine::new(conn.clone(), media.clone());
        engine.sync().await.unwrap();

        // Administrator assigns curated metadata
        let channel = channel_by_name(&conn, "movie").await;
        let mut active: channels::ActiveModel = channel.into();
        active.tvg_id = Set(Some("movies.example".to_string()));
        active.tvg_logo = Set(Some("http://logo/movies.png".to_string()));
        active.channel_number = Set(Some(42));
        active.update(&*conn).await.unwrap();

        // Upstream changes its mind about title and DVR depth
        media.set_streams(vec![stream("movie", Some("Movie Channel"), Some(5))]);
        engine.sync().await.unwrap();

        let channel = channel_by_name(&conn, "movie").await;
        assert_eq!(channel.display_name.as_deref(), Some("Movie Channel"));
        assert_eq!(channel.catchup_days, Some(5));
        assert_eq!(channel.tvg_id.as_deref(), Some("movies.example"));
        assert_eq!(channel.tvg_logo.as_deref(), Some("http://logo/movies.png"));
        assert_eq!(channel.channel_number, Some(42));
    }

    #[tokio::test]
    async fn orphans_missing_channels_and_restores_them() {
        let conn = test_connection().await;
        let media = FakeMediaServer::with_streams(vec![
            stream("keep", Some("Keep"), None),
            stream("drop", Some("Drop"), None),
        ]);
        let engine = ChannelSyncEngine::new(conn.clone(), media.clone());
        engine.sync().await.unwrap();

        media.set_streams(vec![stream("keep", Some("Keep"), None)]);
        let report = engine.sync().await.unwrap();
        assert_eq!(report.orphaned, 1);
        assert_eq!(
            channel_by_name(&conn, "drop").await.sync_status,
            SyncStatus::Orphaned
        );

        // Already-orphaned channels are not counted again
        let report = engine.sync().await.unwrap();
        assert_eq!(report.orphaned, 0);

        // Reappearing upstream restores the channel
        media.set_streams(vec![
            stream("keep", Some("Keep"), None),
            stream("drop", Some("Drop"), None),
        ]);
        let report = engine.sync().await.unwrap();
        assert_eq!(report.new, 0);
        assert_eq!(
            channel_by_name(&conn, "drop").await.sync_status,
            SyncStatus::Synced
        );
    }

    #[tokio::test]
    async fn unreachable_media_server_commits_nothing() {
        let conn = test_connection().await;
        let engine = ChannelSyncEngine::new(conn.clone(), FakeMediaServer::unreachable());

        let err = engine.sync().await.unwrap_err();
        assert!(matches!(err, AppError::Upstream { .. }));

        let count = Channels::find().all(&*conn).await.unwrap().len();
        assert_eq!(count, 0);
    }
}
