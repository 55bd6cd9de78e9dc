use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use api::{AppState, Settings};
use auth::jwt::{JwtConfig, JwtService};
use common::database::{DatabaseConfig, health_check, init_pool, migrate};
use media::{StorageConfig, build_storage};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    info!("Starting gallery API service");

    let settings = Settings::new()?;

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    migrate(&pool).await?;

    // Check database connectivity
    if health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    let jwt_config = JwtConfig::from_env();
    let jwt_service = JwtService::new(jwt_config);
    info!("Issued tokens expire after {}s", jwt_service.token_expiry());

    let storage_config = StorageConfig::from_env();
    let storage = build_storage(&storage_config).await?;

    let state = AppState::new(pool, jwt_service, storage);

    if state.user_repository.ensure_default_admin().await? {
        info!("Created bootstrap admin account");
    }

    let app = api::app(state, &settings, &storage_config);

    let listen_addr = settings.listen_addr();
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    info!("API service listening on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down API service");
        })
        .await?;

    Ok(())
}
