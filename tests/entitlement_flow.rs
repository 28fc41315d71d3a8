//! End-to-end entitlement and playlist tests against an in-memory database.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;

use playlist_service::database::migrations::Migrator;
use playlist_service::database::repositories::user::UserCreateRequest;
use playlist_service::database::repositories::{
    GroupRepository, PackageRepository, TariffRepository, UserRepository,
};
use playlist_service::entities::{channel_groups, channels, users::UserStatus};
use playlist_service::services::{EntitlementResolver, PlaylistCodec};

async fn setup() -> Arc<DatabaseConnection> {
    let connection = sea_orm::Database::connect("sqlite::memory:")
        .await
        .expect("connect in-memory sqlite");
    Migrator::up(&connection, None).await.expect("run migrations");
    Arc::new(connection)
}

async fn seed_channel(
    connection: &DatabaseConnection,
    stream_name: &str,
    channel_number: Option<i32>,
    sort_order: i32,
) -> channels::Model {
    let now = Utc::now();
    channels::ActiveModel {
        stream_name: Set(stream_name.to_string()),
        display_name: Set(Some(stream_name.to_uppercase())),
        sort_order: Set(sort_order),
        channel_number: Set(channel_number),
        sync_status: Set(channels::SyncStatus::Synced),
        last_seen_at: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(connection)
    .await
    .expect("insert channel")
}

fn user_request(agreement: &str) -> UserCreateRequest {
    UserCreateRequest {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        agreement_number: agreement.to_string(),
        max_sessions: 2,
        status: UserStatus::Enabled,
        valid_from: None,
        valid_until: None,
        tariff_ids: vec![],
        package_ids: vec![],
        channel_ids: vec![],
    }
}

#[tokio::test]
async fn grants_union_without_duplicates() {
    let connection = setup().await;

    let a = seed_channel(&connection, "news", Some(1), 0).await;
    let b = seed_channel(&connection, "sports", Some(2), 0).await;
    let c = seed_channel(&connection, "movies", Some(3), 0).await;

    let packages = PackageRepository::new(connection.clone());
    let p1 = packages.create("basic", None).await.unwrap();
    let p2 = packages.create("extra", None).await.unwrap();
    packages.set_channels(p1.id, &[a.id, b.id]).await.unwrap();
    packages.set_channels(p2.id, &[b.id, c.id]).await.unwrap();

    let tariffs = TariffRepository::new(connection.clone());
    let tariff = tariffs.create("standard", None).await.unwrap();
    tariffs.set_packages(tariff.id, &[p1.id]).await.unwrap();

    // Tariff covers {news, sports}; direct package covers {sports, movies};
    // direct channel grant repeats news.
    let users = UserRepository::new(connection.clone());
    let mut request = user_request("A-100");
    request.tariff_ids = vec![tariff.id];
    request.package_ids = vec![p2.id];
    request.channel_ids = vec![a.id];
    let user = users.create(request, "tok".to_string()).await.unwrap();

    let resolver = EntitlementResolver::new(connection);
    let resolved = resolver.resolve_channels(user.id).await.unwrap();

    let names: Vec<&str> = resolved.iter().map(|c| c.stream_name.as_str()).collect();
    assert_eq!(names, vec!["news", "sports", "movies"]);
}

#[tokio::test]
async fn resolution_orders_numbered_channels_before_unnumbered() {
    let connection = setup().await;

    let unnumbered = seed_channel(&connection, "radio", None, 0).await;
    let five = seed_channel(&connection, "five", Some(5), 0).await;
    let two = seed_channel(&connection, "two", Some(2), 0).await;

    let users = UserRepository::new(connection.clone());
    let mut request = user_request("A-200");
    request.channel_ids = vec![unnumbered.id, five.id, two.id];
    let user = users.create(request, "tok".to_string()).await.unwrap();

    let resolver = EntitlementResolver::new(connection);
    let resolved = resolver.resolve_channels(user.id).await.unwrap();

    let numbers: Vec<Option<i32>> = resolved.iter().map(|c| c.channel_number).collect();
    assert_eq!(numbers, vec![Some(2), Some(5), None]);
}

#[tokio::test]
async fn empty_grant_set_resolves_to_empty_playlist() {
    let connection = setup().await;

    let users = UserRepository::new(connection.clone());
    let user = users
        .create(user_request("A-300"), "tok".to_string())
        .await
        .unwrap();

    let resolver = EntitlementResolver::new(connection);
    let resolved = resolver.resolve_channels_with_groups(user.id).await.unwrap();
    assert!(resolved.is_empty());

    let codec = PlaylistCodec::new("http://media.example.com");
    assert_eq!(codec.encode(&user, &resolved), "#EXTM3U\n");
}

#[tokio::test]
async fn playlist_renders_resolved_channels_with_groups() {
    let connection = setup().await;

    let channel = seed_channel(&connection, "news", Some(1), 0).await;

    let groups = GroupRepository::new(connection.clone());
    let group = groups.create("News", 0).await.unwrap();
    channel_groups::ActiveModel {
        channel_id: Set(channel.id),
        group_id: Set(group.id),
    }
    .insert(&*connection)
    .await
    .unwrap();

    let users = UserRepository::new(connection.clone());
    let mut request = user_request("A-400");
    request.channel_ids = vec![channel.id];
    let user = users
        .create(request, "secret-token".to_string())
        .await
        .unwrap();

    let resolver = EntitlementResolver::new(connection);
    let resolved = resolver.resolve_channels_with_groups(user.id).await.unwrap();
    assert_eq!(resolved.len(), 1);
    assert_eq!(resolved[0].groups.len(), 1);

    // The same resolved set is served as JSON by the subscriber API
    let payload = serde_json::to_value(&resolved).unwrap();
    assert_eq!(payload[0]["channel"]["stream_name"], "news");
    assert_eq!(payload[0]["groups"][0]["name"], "News");

    let codec = PlaylistCodec::new("http://media.example.com");
    let playlist = codec.encode(&user, &resolved);

    assert!(playlist.starts_with("#EXTM3U\n"));
    assert!(playlist.contains("group-title=\"News\""));
    assert!(playlist.contains("http://media.example.com/news/video.m3u8?token=secret-token"));

    assert_eq!(codec.filename(&user), "Doe_John_A-400.m3u8");
    assert!(codec.matches_stem(&user, "doe_john_a-400"));
}

#[tokio::test]
async fn agreement_numbers_are_unique() {
    let connection = setup().await;

    let users = UserRepository::new(connection.clone());
    users
        .create(user_request("A-500"), "tok-1".to_string())
        .await
        .unwrap();

    let error = users
        .create(user_request("A-500"), "tok-2".to_string())
        .await
        .unwrap_err();
    assert!(error.to_string().contains("already exists"));
}
