//! Web layer
//!
//! Thin axum handlers that delegate to the repositories and core services.
//! Errors are mapped to status codes in [`responses`]; authorization relay
//! calls are spawned after the local mutation commits so remote latency
//! never blocks a response.

use anyhow::Result;
use axum::{
    Router,
    routing::{get, post, put},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::{
    config::Config,
    database::Database,
    database::repositories::{
        ChannelRepository, GroupRepository, PackageRepository, TariffRepository, UserRepository,
    },
    services::{AuthRelay, ChannelSyncEngine, EntitlementResolver, PlaylistCodec},
};

pub mod handlers;
pub mod responses;

pub use responses::{ApiResponse, PaginatedResponse, handle_error, handle_result};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub channels: ChannelRepository,
    pub groups: GroupRepository,
    pub packages: PackageRepository,
    pub tariffs: TariffRepository,
    pub users: UserRepository,
    pub sync_engine: Arc<ChannelSyncEngine>,
    pub resolver: Arc<EntitlementResolver>,
    pub codec: Arc<PlaylistCodec>,
    pub relay: Arc<AuthRelay>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        database: &Database,
        sync_engine: Arc<ChannelSyncEngine>,
        relay: Arc<AuthRelay>,
    ) -> Self {
        let connection = database.connection();
        Self {
            codec: Arc::new(PlaylistCodec::new(config.media_server.stream_base_url())),
            config,
            channels: ChannelRepository::new(connection.clone()),
            groups: GroupRepository::new(connection.clone()),
            packages: PackageRepository::new(connection.clone()),
            tariffs: TariffRepository::new(connection.clone()),
            users: UserRepository::new(connection.clone()),
            resolver: Arc::new(EntitlementResolver::new(connection)),
            sync_engine,
            relay,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/playlist/{filename}", get(handlers::playlist::download))
        .route("/api/v1/dashboard", get(handlers::dashboard::counts))
        .route(
            "/api/v1/channels",
            get(handlers::channels::list),
        )
        .route("/api/v1/channels/sync", post(handlers::channels::sync))
        .route("/api/v1/channels/reorder", post(handlers::channels::reorder))
        .route(
            "/api/v1/channels/{id}",
            get(handlers::channels::get_one)
                .put(handlers::channels::update)
                .delete(handlers::channels::delete),
        )
        .route(
            "/api/v1/channels/{id}/groups",
            put(handlers::channels::set_groups),
        )
        .route(
            "/api/v1/channels/{id}/packages",
            put(handlers::channels::set_packages),
        )
        .route(
            "/api/v1/channels/{id}/cascade",
            get(handlers::channels::cascade_info),
        )
        .route(
            "/api/v1/groups",
            get(handlers::groups::list).post(handlers::groups::create),
        )
        .route("/api/v1/groups/reorder", post(handlers::groups::reorder))
        .route(
            "/api/v1/groups/{id}",
            put(handlers::groups::update).delete(handlers::groups::delete),
        )
        .route(
            "/api/v1/packages",
            get(handlers::packages::list).post(handlers::packages::create),
        )
        .route(
            "/api/v1/packages/{id}",
            get(handlers::packages::get_one)
                .put(handlers::packages::update)
                .delete(handlers::packages::delete),
        )
        .route(
            "/api/v1/packages/{id}/channels",
            put(handlers::packages::set_channels),
        )
        .route(
            "/api/v1/tariffs",
            get(handlers::tariffs::list).post(handlers::tariffs::create),
        )
        .route(
            "/api/v1/tariffs/{id}",
            get(handlers::tariffs::get_one)
                .put(handlers::tariffs::update)
                .delete(handlers::tariffs::delete),
        )
        .route(
            "/api/v1/tariffs/{id}/packages",
            put(handlers::tariffs::set_packages),
        )
        .route(
            "/api/v1/users",
            get(handlers::users::list).post(handlers::users::create),
        )
        .route(
            "/api/v1/users/{id}",
            get(handlers::users::get_one)
                .put(handlers::users::update)
                .delete(handlers::users::delete),
        )
        .route(
            "/api/v1/users/{id}/token",
            post(handlers::users::regenerate_token),
        )
        .route(
            "/api/v1/users/{id}/channels",
            get(handlers::users::resolved_channels),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
