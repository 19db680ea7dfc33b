use std::net::SocketAddr;

use social_feed::{app, config::Config, db, state::AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let pool = db::connect(&config.database_url, config.max_connections).await?;
    if !db::check_db_initialized(&pool).await {
        info!("Database is empty, creating schema");
    }
    db::init_db(&pool).await?;

    let state = AppState::from_config(pool, &config);
    let router = app(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Server listening on http://{}", addr);
    info!("API documentation: http://{}/docs", addr);

    axum::Server::try_bind(&addr)?
        .serve(router.into_make_service())
        .await?;

    Ok(())
}
