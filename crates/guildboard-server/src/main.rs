use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use guildboard_api::state::{AppState, AppStateInner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guildboard=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("GUILDBOARD_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("GUILDBOARD_DB_PATH").unwrap_or_else(|_| "guildboard.db".into());
    let host = std::env::var("GUILDBOARD_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("GUILDBOARD_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let provider_api_base = std::env::var("DISCORD_API_BASE")
        .unwrap_or_else(|_| "https://discord.com/api/v10".into());
    let session_ttl_days: i64 = std::env::var("SESSION_TTL_DAYS")
        .unwrap_or_else(|_| "7".into())
        .parse()?;

    // Init database (read-mostly; the bot process populates it)
    let db = guildboard_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        provider_api_base,
        http: reqwest::Client::new(),
        session_ttl_days,
    });

    let app = guildboard_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Guildboard server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
