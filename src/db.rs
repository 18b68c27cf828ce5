//! Connection establishment.

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::{info, warn};

use crate::Config;

/// Builds the pool options used for every connection the process opens.
pub fn connect_options(config: &Config) -> ConnectOptions {
    let mut opt = ConnectOptions::new(config.database_url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(10))
        .acquire_timeout(Duration::from_secs(10))
        .sqlx_logging(false);
    opt
}

/// Opens the connection pool, retrying while the database is not yet
/// accepting connections.
///
/// Attempts are spaced by `config.connect_retry_delay` and bounded by
/// `config.connect_attempts`; the last error is returned once they run out.
/// This only applies at startup. Queries on an open pool are never retried.
pub async fn connect(config: &Config) -> Result<DatabaseConnection, DbErr> {
    let attempts = config.connect_attempts.max(1);
    let mut attempt = 1;

    loop {
        match Database::connect(connect_options(config)).await {
            Ok(conn) => {
                if attempt > 1 {
                    info!(attempt, "database connection established after retry");
                }
                return Ok(conn);
            }
            Err(e) if attempt < attempts => {
                warn!(
                    attempt,
                    attempts,
                    delay_secs = config.connect_retry_delay.as_secs_f64(),
                    error = %e,
                    "database not ready, retrying"
                );
                tokio::time::sleep(config.connect_retry_delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
