//! PostgreSQL pool setup and table bootstrap

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::config::Config;
use crate::{ApiError, QueryStep, Result};

const CREATE_POSTS: &str = "CREATE TABLE IF NOT EXISTS posts(\
     id varchar(20) PRIMARY KEY, \
     cursor BIGSERIAL, \
     title varchar(200) NOT NULL, \
     text varchar(2000) NOT NULL, \
     author_id varchar(20), \
     date timestamptz NOT NULL)";

const CREATE_AUTHORS: &str = "CREATE TABLE IF NOT EXISTS authors(\
     id varchar(20) PRIMARY KEY, \
     name varchar(60))";

const SEED_AUTHORS: &str = "INSERT INTO authors(id, name) \
     VALUES ('1', 'Kony'), ('2', 'Tony'), ('3', 'Pony') \
     ON CONFLICT (id) DO NOTHING";

/// Open a connection pool against the configured database.
pub async fn connect(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await
        .map_err(|e| ApiError::data_access(QueryStep::Connect, e))
}

/// Create the posts and authors tables if they do not exist.
///
/// The `cursor` column is a sequence: strictly increasing in insertion order
/// and unique, which is what makes it usable as a pagination watermark.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(CREATE_POSTS)
        .execute(pool)
        .await
        .map_err(|e| ApiError::data_access(QueryStep::SchemaCreate, e))?;
    info!("posts table ready");
    sqlx::query(CREATE_AUTHORS)
        .execute(pool)
        .await
        .map_err(|e| ApiError::data_access(QueryStep::SchemaCreate, e))?;
    info!("authors table ready");
    Ok(())
}

/// Insert the starter authors; a no-op when they already exist.
pub async fn seed_authors(pool: &PgPool) -> Result<()> {
    sqlx::query(SEED_AUTHORS)
        .execute(pool)
        .await
        .map_err(|e| ApiError::data_access(QueryStep::AuthorSeed, e))?;
    info!("authors seeded");
    Ok(())
}
