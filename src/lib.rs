//! # scribe-api
//!
//! GraphQL blog-post API backed by PostgreSQL.
//!
//! ## Features
//!
//! - **Cursor Pagination** - watermark-based infinite scrolling over posts
//! - **Post CRUD** - create/update mutations and lookup queries
//! - **Author Join** - posts carry their author via a LEFT JOIN
//! - **GraphiQL** - interactive playground served next to the endpoint
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scribe_api::{config::Config, db, schema, server, store::PgStore};
//!
//! # async fn run() -> scribe_api::Result<()> {
//! let config = Config::from_env()?;
//! let pool = db::connect(&config).await?;
//! let schema = schema::build_schema(Arc::new(PgStore::new(pool)));
//! server::serve(&config, schema).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod db;
pub mod model;
pub mod pagination;
pub mod schema;
pub mod server;
pub mod store;
pub mod types;

pub use model::{Author, NewPost, Post, PostInput, PostRecord, UpdatePostInput};
pub use pagination::{paginate, PostEdge, PostPage};
pub use schema::{build_schema, AppSchema, MutationRoot, QueryRoot};
pub use store::{BlogStore, DynStore, PgStore};
pub use types::DateTime;

use std::fmt;

use thiserror::Error;

/// The store query a failed operation was executing.
///
/// Every database round-trip is tagged so a propagated error names the step
/// that failed, not just the underlying driver message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStep {
    Connect,
    SchemaCreate,
    AuthorSeed,
    PageFetch,
    RemainingCount,
    TotalCount,
    PostList,
    PostWindow,
    PostLookup,
    PostInsert,
    PostUpdate,
    AuthorList,
}

impl fmt::Display for QueryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryStep::Connect => "connect",
            QueryStep::SchemaCreate => "schema-create",
            QueryStep::AuthorSeed => "author-seed",
            QueryStep::PageFetch => "page-fetch",
            QueryStep::RemainingCount => "remaining-count",
            QueryStep::TotalCount => "total-count",
            QueryStep::PostList => "post-list",
            QueryStep::PostWindow => "post-window",
            QueryStep::PostLookup => "post-lookup",
            QueryStep::PostInsert => "post-insert",
            QueryStep::PostUpdate => "post-update",
            QueryStep::AuthorList => "author-list",
        };
        f.write_str(name)
    }
}

/// API errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Rejected before any store access; never retried.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A store round-trip failed; `step` names the query.
    #[error("{step} query failed: {reason}")]
    DataAccess { step: QueryStep, reason: String },

    /// A requested post does not exist. Distinguishable from an empty page.
    #[error("post with id={0} is not found")]
    PostNotFound(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("server error: {0}")]
    Server(String),
}

impl ApiError {
    /// Tag a driver error with the step that was executing.
    pub fn data_access(step: QueryStep, err: sqlx::Error) -> Self {
        ApiError::DataAccess {
            step,
            reason: err.to_string(),
        }
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
