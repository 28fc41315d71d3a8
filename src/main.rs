use anyhow::Result;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use playlist_service::{
    clients::{HttpAuthDirectoryClient, HttpMediaServerClient},
    config::Config,
    database::Database,
    database::repositories::UserRepository,
    services::{AuthRelay, ChannelSyncEngine, EntitlementResolver},
    web::{self, AppState},
};

#[derive(Parser)]
#[command(name = "playlist-service")]
#[command(version)]
#[command(about = "IPTV subscriber entitlement and playlist service")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Listening IP address
    #[arg(short = 'H', long, value_name = "IP")]
    host: Option<String>,

    /// Listening port
    #[arg(short, long, value_name = "PORT")]
    port: Option<u16>,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("playlist_service={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("starting playlist service v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("configuration loaded from: {}", cli.config);

    if let Some(host) = cli.host {
        config.web.host = host;
    }
    if let Some(port) = cli.port {
        config.web.port = port;
    }
    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }

    let database = Database::new(&config.database).await?;
    let connection = database.connection();

    let media_server = Arc::new(HttpMediaServerClient::new(&config.media_server)?);
    let auth_directory = Arc::new(HttpAuthDirectoryClient::new(&config.auth_directory)?);

    let sync_engine = Arc::new(ChannelSyncEngine::new(connection.clone(), media_server));
    let resolver = Arc::new(EntitlementResolver::new(connection.clone()));
    let relay = Arc::new(AuthRelay::new(
        auth_directory,
        resolver,
        UserRepository::new(connection),
    ));

    let config = Arc::new(config);
    let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
    let state = AppState::new(config, &database, sync_engine, relay);

    web::serve(state, addr).await
}
