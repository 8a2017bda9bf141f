//! One-shot bootstrap: create the posts/authors tables and seed authors.
//!
//! Meant to be run once against a fresh database to simplify testing.

use scribe_api::{config::Config, db};
use tracing_subscriber::prelude::*;

#[tokio::main]
async fn main() -> scribe_api::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let pool = db::connect(&config).await?;
    db::ensure_schema(&pool).await?;
    db::seed_authors(&pool).await?;
    Ok(())
}
