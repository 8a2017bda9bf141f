//! Service entry point

use std::sync::Arc;

use scribe_api::{config::Config, db, schema::build_schema, server, store::PgStore};
use tracing_subscriber::prelude::*;

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,scribe_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> scribe_api::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = Config::from_env()?;
    let pool = db::connect(&config).await?;
    let store = Arc::new(PgStore::new(pool));
    let schema = build_schema(store);

    server::serve(&config, schema).await
}
