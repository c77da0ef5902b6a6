//! Connection pool utilities

use crate::config::DatabaseConfig;
use crate::error::{JoblyError, JoblyResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use tokio_postgres::NoTls;

/// Create a connection pool from configuration.
///
/// Uses `NoTls` and fast recycling. Connections are opened lazily, so this
/// does not touch the database.
///
/// # Example
///
/// ```ignore
/// let pool = jobly::create_pool(&DatabaseConfig::from_env()?)?;
/// let client = pool.get().await?;
/// let companies = jobly::company::find_all(&client, &Default::default()).await?;
/// ```
pub fn create_pool(config: &DatabaseConfig) -> JoblyResult<Pool> {
    let pg_config: tokio_postgres::Config = config
        .url
        .parse()
        .map_err(|e: tokio_postgres::Error| JoblyError::Connection(e.to_string()))?;

    let manager_config = ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    };
    let mgr = Manager::from_config(pg_config, NoTls, manager_config);
    let pool = Pool::builder(mgr)
        .max_size(config.max_pool_size)
        .build()
        .map_err(|e| JoblyError::Pool(e.to_string()))?;

    tracing::info!(max_size = config.max_pool_size, "database pool created");
    Ok(pool)
}
