use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use voyage_server::auth::JwtKeys;
use voyage_server::config::Config;
use voyage_server::repository::PgStore;
use voyage_server::routes::create_routes;
use voyage_server::state::AppState;

const DEFAULT_LOG_FILTER: &str = "voyage_server=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let config = Config::from_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Successfully connected to database");

    sqlx::migrate!().run(&pool).await?;

    tracing::info!("Migrations run successfully");

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        JwtKeys::new(config.jwt_secret.as_bytes()),
        config.qr_min_size,
    );
    let app = create_routes(state, &config);

    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!("🚀 Server running at http://{}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
