//! Cursor pagination over posts
//!
//! One paginated read composes three store queries: the page itself, a
//! remaining-count check relative to the new end cursor, and the total count.
//! The page fetch comes first because the other two depend on (or can be
//! skipped based on) its result; the two counts are independent of each other
//! and run concurrently.

use async_graphql::SimpleObject;

use crate::model::Post;
use crate::store::BlogStore;
use crate::{ApiError, Result};

/// A (cursor, post) pairing in a paginated listing.
#[derive(SimpleObject, Debug, Clone, PartialEq)]
pub struct PostEdge {
    pub cursor: i64,
    pub node: Post,
}

/// The aggregate result of one pagination request.
#[derive(SimpleObject, Debug, Clone, PartialEq)]
pub struct PostPage {
    /// Full collection size at read time. Concurrent writers may move it
    /// between this read and the page read.
    pub total_count: i64,
    pub edges: Vec<PostEdge>,
    /// Cursor of the last edge; absent when the page is empty.
    pub end_cursor: Option<i64>,
    pub has_next_page: bool,
}

/// Assemble one page of posts with cursor > `after_cursor`.
///
/// An absent watermark means the start of the collection. A failure at any
/// step aborts the request; no partial page is returned.
pub async fn paginate<S>(store: &S, page_size: i64, after_cursor: Option<i64>) -> Result<PostPage>
where
    S: BlogStore + ?Sized,
{
    if page_size <= 0 {
        return Err(ApiError::InvalidArgument(format!(
            "page size must be greater than 0, got {page_size}"
        )));
    }

    let watermark = after_cursor.unwrap_or(0);
    let records = store.page_after(watermark, page_size).await?;
    let end_cursor = records.last().map(|record| record.cursor);

    // An empty page has nothing to check the remaining count against.
    let (has_next_page, total_count) = match end_cursor {
        Some(cursor) => tokio::try_join!(store.has_after(cursor), store.total_posts())?,
        None => (false, store.total_posts().await?),
    };

    let edges = records
        .into_iter()
        .map(|record| PostEdge {
            cursor: record.cursor,
            node: Post::from(record),
        })
        .collect();

    Ok(PostPage {
        total_count,
        edges,
        end_cursor,
        has_next_page,
    })
}
