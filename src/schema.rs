//! GraphQL schema: query and mutation roots
//!
//! Resolvers reach the store through the `DynStore` in context data and
//! delegate all multi-step logic to `pagination::paginate`. Errors propagate
//! into the GraphQL response; nothing is logged-and-swallowed.

use async_graphql::{Context, EmptySubscription, Object, Schema, ID};

use crate::model::{Author, NewPost, Post, PostInput, UpdatePostInput};
use crate::pagination::{paginate, PostPage};
use crate::store::DynStore;
use crate::ApiError;

/// The executable schema served over /graphql.
pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

pub fn build_schema(store: DynStore) -> AppSchema {
    Schema::build(QueryRoot, MutationRoot, EmptySubscription)
        .data(store)
        .finish()
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// All posts joined with their authors, ordered by date.
    async fn get_all_posts(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Post>> {
        let store = ctx.data::<DynStore>()?;
        let records = store.list_posts().await?;
        Ok(records.into_iter().map(Post::from).collect())
    }

    /// A LIMIT/OFFSET window over posts, ordered by date.
    async fn get_paginated_posts(
        &self,
        ctx: &Context<'_>,
        limit: i64,
        offset: i64,
    ) -> async_graphql::Result<Vec<Post>> {
        if limit <= 0 {
            return Err(ApiError::InvalidArgument(format!(
                "limit must be greater than 0, got {limit}"
            ))
            .into());
        }
        if offset < 0 {
            return Err(ApiError::InvalidArgument(format!(
                "offset must not be negative, got {offset}"
            ))
            .into());
        }
        let store = ctx.data::<DynStore>()?;
        let records = store.list_window(limit, offset).await?;
        Ok(records.into_iter().map(Post::from).collect())
    }

    /// A single post by id; erroring when no such post exists.
    async fn get_post(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Post> {
        let store = ctx.data::<DynStore>()?;
        let record = store
            .find_post(id.as_str())
            .await?
            .ok_or_else(|| ApiError::PostNotFound(id.to_string()))?;
        Ok(record.into())
    }

    async fn get_all_authors(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<Author>> {
        let store = ctx.data::<DynStore>()?;
        Ok(store.list_authors().await?)
    }

    /// One page of posts with cursor greater than `last_cursor`.
    ///
    /// Omitting `last_cursor` starts at the beginning of the collection.
    async fn get_posts_infinitely(
        &self,
        ctx: &Context<'_>,
        num_of_posts: i64,
        last_cursor: Option<i64>,
    ) -> async_graphql::Result<PostPage> {
        let store = ctx.data::<DynStore>()?;
        Ok(paginate(store.as_ref(), num_of_posts, last_cursor).await?)
    }
}

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Create a post. The id and creation date are assigned here; the cursor
    /// is assigned by the store.
    async fn create_post(
        &self,
        ctx: &Context<'_>,
        input: PostInput,
    ) -> async_graphql::Result<Post> {
        let store = ctx.data::<DynStore>()?;
        let record = store.insert_post(NewPost::from_input(input)).await?;
        Ok(record.into())
    }

    /// Overwrite the provided fields of a post; erroring when no such post
    /// exists.
    async fn update_post(
        &self,
        ctx: &Context<'_>,
        id: ID,
        input: UpdatePostInput,
    ) -> async_graphql::Result<Post> {
        let store = ctx.data::<DynStore>()?;
        let record = store
            .update_post(id.as_str(), input)
            .await?
            .ok_or_else(|| ApiError::PostNotFound(id.to_string()))?;
        Ok(record.into())
    }
}
