//! Reset the administrator password.
//!
//! Uses `ADMIN_PASSWORD` when set, otherwise the well-known default, and
//! creates the `admin` account if it does not exist.

use anyhow::Result;
use auth::repositories::{
    UserRepository,
    user::{ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD},
};
use common::database::{DatabaseConfig, init_pool, migrate};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let password = match std::env::var("ADMIN_PASSWORD") {
        Ok(password) if !password.is_empty() => password,
        _ => {
            warn!("ADMIN_PASSWORD is not set, using the default admin password");
            DEFAULT_ADMIN_PASSWORD.to_string()
        }
    };

    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;
    migrate(&pool).await?;

    UserRepository::new(pool).reset_admin(&password).await?;
    info!("Password for {} updated", ADMIN_USERNAME);

    Ok(())
}
