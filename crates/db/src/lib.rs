use std::str::FromStr;

use sqlx::{
    Error, SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tracing::info;

pub mod models;

#[derive(Clone, Debug)]
pub struct DBService {
    pub pool: SqlitePool,
}

impl DBService {
    /// Open (creating if needed) the database at `database_url` and run pending migrations.
    pub async fn new(database_url: &str) -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;
        Self::run_migrations(&pool).await?;
        info!(database_url = %database_url, "Database ready");
        Ok(DBService { pool })
    }

    /// Private in-memory database. The pool is pinned to a single connection that never
    /// expires, since every new SQLite memory connection starts empty.
    pub async fn new_in_memory() -> Result<DBService, Error> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::run_migrations(&pool).await?;
        Ok(DBService { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<(), Error> {
        sqlx::migrate!("./migrations").run(pool).await?;
        Ok(())
    }
}
