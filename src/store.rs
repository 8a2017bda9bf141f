//! Store access for posts and authors
//!
//! `BlogStore` is the seam between resolvers and the database: resolvers and
//! the pagination pipeline only see the trait, so tests can run against an
//! in-memory implementation. `PgStore` is the PostgreSQL implementation;
//! every query is parameterized and every failure is tagged with the step
//! that was executing.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::model::{Author, NewPost, PostRecord, UpdatePostInput};
use crate::{ApiError, QueryStep, Result};

/// Behavioral boundary over the posts/authors store.
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Up to `limit` joined rows with cursor > `after_cursor`, ascending.
    async fn page_after(&self, after_cursor: i64, limit: i64) -> Result<Vec<PostRecord>>;

    /// True iff at least one post exists with cursor > `cursor`.
    async fn has_after(&self, cursor: i64) -> Result<bool>;

    /// Total post count. Not transactionally consistent with a page read.
    async fn total_posts(&self) -> Result<i64>;

    /// All posts joined with authors, ordered by date.
    async fn list_posts(&self) -> Result<Vec<PostRecord>>;

    /// A LIMIT/OFFSET window over posts, ordered by date.
    async fn list_window(&self, limit: i64, offset: i64) -> Result<Vec<PostRecord>>;

    async fn find_post(&self, id: &str) -> Result<Option<PostRecord>>;

    async fn insert_post(&self, post: NewPost) -> Result<PostRecord>;

    /// Overwrite the provided fields; `None` keeps the stored value.
    /// Returns `None` when no post has the id.
    async fn update_post(&self, id: &str, changes: UpdatePostInput)
        -> Result<Option<PostRecord>>;

    async fn list_authors(&self) -> Result<Vec<Author>>;
}

/// Shared trait object handed to the GraphQL schema as context data.
pub type DynStore = Arc<dyn BlogStore>;

const JOINED_COLUMNS: &str = "posts.id, posts.cursor, posts.title, posts.text, posts.date, \
     posts.author_id, authors.name AS author_name";

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

fn log_query(step: QueryStep, rows: usize, started: Instant) {
    debug!(
        step = %step,
        rows,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "executed query"
    );
}

#[async_trait]
impl BlogStore for PgStore {
    async fn page_after(&self, after_cursor: i64, limit: i64) -> Result<Vec<PostRecord>> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM posts \
             LEFT JOIN authors ON authors.id = posts.author_id \
             WHERE posts.cursor > $1 \
             ORDER BY posts.cursor ASC \
             LIMIT $2"
        );
        let started = Instant::now();
        let rows = sqlx::query_as::<_, PostRecord>(&sql)
            .bind(after_cursor)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApiError::data_access(QueryStep::PageFetch, e))?;
        log_query(QueryStep::PageFetch, rows.len(), started);
        Ok(rows)
    }

    async fn has_after(&self, cursor: i64) -> Result<bool> {
        let started = Instant::now();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE cursor > $1")
            .bind(cursor)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApiError::data_access(QueryStep::RemainingCount, e))?;
        log_query(QueryStep::RemainingCount, 1, started);
        Ok(count > 0)
    }

    async fn total_posts(&self) -> Result<i64> {
        let started = Instant::now();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ApiError::data_access(QueryStep::TotalCount, e))?;
        log_query(QueryStep::TotalCount, 1, started);
        Ok(count)
    }

    async fn list_posts(&self) -> Result<Vec<PostRecord>> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM posts \
             LEFT JOIN authors ON authors.id = posts.author_id \
             ORDER BY posts.date"
        );
        let started = Instant::now();
        let rows = sqlx::query_as::<_, PostRecord>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApiError::data_access(QueryStep::PostList, e))?;
        log_query(QueryStep::PostList, rows.len(), started);
        Ok(rows)
    }

    async fn list_window(&self, limit: i64, offset: i64) -> Result<Vec<PostRecord>> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM posts \
             LEFT JOIN authors ON authors.id = posts.author_id \
             ORDER BY posts.date \
             LIMIT $1 OFFSET $2"
        );
        let started = Instant::now();
        let rows = sqlx::query_as::<_, PostRecord>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApiError::data_access(QueryStep::PostWindow, e))?;
        log_query(QueryStep::PostWindow, rows.len(), started);
        Ok(rows)
    }

    async fn find_post(&self, id: &str) -> Result<Option<PostRecord>> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS} \
             FROM posts \
             LEFT JOIN authors ON authors.id = posts.author_id \
             WHERE posts.id = $1"
        );
        let started = Instant::now();
        let row = sqlx::query_as::<_, PostRecord>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ApiError::data_access(QueryStep::PostLookup, e))?;
        log_query(QueryStep::PostLookup, usize::from(row.is_some()), started);
        Ok(row)
    }

    async fn insert_post(&self, post: NewPost) -> Result<PostRecord> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, PostRecord>(
            "INSERT INTO posts(id, title, text, author_id, date) \
             VALUES($1, $2, $3, $4, $5) \
             RETURNING id, cursor, title, text, date, author_id, \
                 (SELECT name FROM authors WHERE authors.id = posts.author_id) AS author_name",
        )
        .bind(&post.id)
        .bind(&post.title)
        .bind(&post.text)
        .bind(&post.author_id)
        .bind(post.date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ApiError::data_access(QueryStep::PostInsert, e))?;
        log_query(QueryStep::PostInsert, 1, started);
        Ok(row)
    }

    async fn update_post(
        &self,
        id: &str,
        changes: UpdatePostInput,
    ) -> Result<Option<PostRecord>> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, PostRecord>(
            "UPDATE posts \
             SET title = COALESCE($1, title), text = COALESCE($2, text) \
             WHERE posts.id = $3 \
             RETURNING id, cursor, title, text, date, author_id, \
                 (SELECT name FROM authors WHERE authors.id = posts.author_id) AS author_name",
        )
        .bind(&changes.title)
        .bind(&changes.text)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| ApiError::data_access(QueryStep::PostUpdate, e))?;
        log_query(QueryStep::PostUpdate, usize::from(row.is_some()), started);
        Ok(row)
    }

    async fn list_authors(&self) -> Result<Vec<Author>> {
        let started = Instant::now();
        let rows = sqlx::query_as::<_, Author>("SELECT id, name FROM authors ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ApiError::data_access(QueryStep::AuthorList, e))?;
        log_query(QueryStep::AuthorList, rows.len(), started);
        Ok(rows)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    //! In-memory `BlogStore` used by unit tests.

    use std::sync::Mutex;

    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    /// Vec-backed store that records every step it executes and can be told
    /// to fail at a given step.
    #[derive(Default)]
    pub struct MemoryStore {
        posts: Mutex<Vec<PostRecord>>,
        authors: Mutex<Vec<Author>>,
        calls: Mutex<Vec<QueryStep>>,
        fail_on: Mutex<Option<QueryStep>>,
    }

    impl MemoryStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Store with `n` posts at cursors `1..=n`, dates one minute apart.
        pub fn with_posts(n: i64) -> Self {
            let store = Self::new();
            let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
            {
                let mut posts = store.posts.lock().unwrap();
                for cursor in 1..=n {
                    posts.push(PostRecord {
                        id: format!("{:020x}", cursor),
                        cursor,
                        title: format!("post {cursor}"),
                        text: format!("text {cursor}"),
                        date: base + Duration::minutes(cursor),
                        author_id: Some("1".to_string()),
                        author_name: Some("Kony".to_string()),
                    });
                }
            }
            store
        }

        pub fn push_post(&self, record: PostRecord) {
            self.posts.lock().unwrap().push(record);
        }

        pub fn push_author(&self, author: Author) {
            self.authors.lock().unwrap().push(author);
        }

        pub fn fail_on(&self, step: QueryStep) {
            *self.fail_on.lock().unwrap() = Some(step);
        }

        pub fn calls(&self) -> Vec<QueryStep> {
            self.calls.lock().unwrap().clone()
        }

        fn enter(&self, step: QueryStep) -> Result<()> {
            self.calls.lock().unwrap().push(step);
            if *self.fail_on.lock().unwrap() == Some(step) {
                return Err(ApiError::DataAccess {
                    step,
                    reason: "injected failure".to_string(),
                });
            }
            Ok(())
        }

        fn next_cursor(&self) -> i64 {
            self.posts
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.cursor)
                .max()
                .unwrap_or(0)
                + 1
        }

        fn author_name(&self, author_id: Option<&str>) -> Option<String> {
            let authors = self.authors.lock().unwrap();
            author_id
                .and_then(|id| authors.iter().find(|a| a.id == id))
                .and_then(|a| a.name.clone())
        }
    }

    #[async_trait]
    impl BlogStore for MemoryStore {
        async fn page_after(&self, after_cursor: i64, limit: i64) -> Result<Vec<PostRecord>> {
            self.enter(QueryStep::PageFetch)?;
            let mut rows: Vec<PostRecord> = self
                .posts
                .lock()
                .unwrap()
                .iter()
                .filter(|p| p.cursor > after_cursor)
                .cloned()
                .collect();
            rows.sort_by_key(|p| p.cursor);
            rows.truncate(limit.max(0) as usize);
            Ok(rows)
        }

        async fn has_after(&self, cursor: i64) -> Result<bool> {
            self.enter(QueryStep::RemainingCount)?;
            let posts = self.posts.lock().unwrap();
            Ok(posts.iter().any(|p| p.cursor > cursor))
        }

        async fn total_posts(&self) -> Result<i64> {
            self.enter(QueryStep::TotalCount)?;
            Ok(self.posts.lock().unwrap().len() as i64)
        }

        async fn list_posts(&self) -> Result<Vec<PostRecord>> {
            self.enter(QueryStep::PostList)?;
            let mut rows = self.posts.lock().unwrap().clone();
            rows.sort_by_key(|p| p.date);
            Ok(rows)
        }

        async fn list_window(&self, limit: i64, offset: i64) -> Result<Vec<PostRecord>> {
            self.enter(QueryStep::PostWindow)?;
            let mut rows = self.posts.lock().unwrap().clone();
            rows.sort_by_key(|p| p.date);
            Ok(rows
                .into_iter()
                .skip(offset.max(0) as usize)
                .take(limit.max(0) as usize)
                .collect())
        }

        async fn find_post(&self, id: &str) -> Result<Option<PostRecord>> {
            self.enter(QueryStep::PostLookup)?;
            let posts = self.posts.lock().unwrap();
            Ok(posts.iter().find(|p| p.id == id).cloned())
        }

        async fn insert_post(&self, post: NewPost) -> Result<PostRecord> {
            self.enter(QueryStep::PostInsert)?;
            let record = PostRecord {
                cursor: self.next_cursor(),
                author_name: self.author_name(post.author_id.as_deref()),
                id: post.id,
                title: post.title,
                text: post.text,
                date: post.date,
                author_id: post.author_id,
            };
            self.posts.lock().unwrap().push(record.clone());
            Ok(record)
        }

        async fn update_post(
            &self,
            id: &str,
            changes: UpdatePostInput,
        ) -> Result<Option<PostRecord>> {
            self.enter(QueryStep::PostUpdate)?;
            let mut posts = self.posts.lock().unwrap();
            let Some(post) = posts.iter_mut().find(|p| p.id == id) else {
                return Ok(None);
            };
            if let Some(title) = changes.title {
                post.title = title;
            }
            if let Some(text) = changes.text {
                post.text = text;
            }
            Ok(Some(post.clone()))
        }

        async fn list_authors(&self) -> Result<Vec<Author>> {
            self.enter(QueryStep::AuthorList)?;
            Ok(self.authors.lock().unwrap().clone())
        }
    }
}
