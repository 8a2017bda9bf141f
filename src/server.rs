//! HTTP surface: GraphQL endpoint, GraphiQL playground, health probe

use async_graphql::http::GraphiQLSource;
use axum::{
    extract::Extension,
    response::Html,
    routing::get,
    Json, Router,
};
use tracing::info;

use crate::config::Config;
use crate::schema::AppSchema;
use crate::{ApiError, Result};

/// Execute a GraphQL request against the schema.
pub async fn graphql_handler(
    Extension(schema): Extension<AppSchema>,
    req: Json<async_graphql::Request>,
) -> Json<async_graphql::Response> {
    Json(schema.execute(req.0).await)
}

/// Interactive playground pointed at the endpoint.
pub async fn graphiql_handler() -> Html<String> {
    Html(GraphiQLSource::build().endpoint("/graphql").finish())
}

pub async fn health_handler() -> &'static str {
    "ok"
}

pub fn router(schema: AppSchema) -> Router {
    Router::new()
        .route("/graphql", get(graphiql_handler).post(graphql_handler))
        .route("/health", get(health_handler))
        .layer(Extension(schema))
}

/// Bind and serve until shutdown.
pub async fn serve(config: &Config, schema: AppSchema) -> Result<()> {
    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ApiError::Server(format!("cannot bind {addr}: {e}")))?;
    info!("Running a GraphQL API server at http://{addr}/graphql");
    axum::serve(listener, router(schema))
        .await
        .map_err(|e| ApiError::Server(e.to_string()))
}
