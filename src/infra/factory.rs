use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::error::StartupError;
use crate::state::AppState;
use crate::infra::repositories::{
    postgres_manager_repo::PostgresManagerRepo, postgres_user_repo::PostgresUserRepo,
    sqlite_manager_repo::SqliteManagerRepo, sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> Result<AppState, StartupError> {
    let database_url = &config.database_url;

    if config.is_postgres() {
        info!("Initializing PostgreSQL connection...");

        let opts: PgConnectOptions = database_url.parse::<PgConnectOptions>()?
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(10))
            .connect_with(opts)
            .await?;

        run_postgres_migrations(&pool).await?;

        Ok(AppState::new(
            Arc::new(PostgresUserRepo::new(pool.clone())),
            Arc::new(PostgresManagerRepo::new(pool)),
        ))
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections.unwrap_or(5))
            .connect_with(opts)
            .await?;

        run_sqlite_migrations(&pool).await?;

        Ok(AppState::new(
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteManagerRepo::new(pool)),
        ))
    }
}

async fn run_postgres_migrations(pool: &PgPool) -> Result<(), StartupError> {
    sqlx::migrate!("./migrations/postgres").run(pool).await?;
    Ok(())
}

pub async fn run_sqlite_migrations(pool: &SqlitePool) -> Result<(), StartupError> {
    sqlx::migrate!("./migrations/sqlite").run(pool).await?;
    Ok(())
}
