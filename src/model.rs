//! Domain types for posts and authors

use async_graphql::{InputObject, SimpleObject};
use chrono::Utc;
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::types::DateTime;

/// Number of random bytes in a post id; hex-encoded to twice this length.
const POST_ID_BYTES: usize = 10;

/// An author, seeded out-of-band and referenced by posts.
///
/// `name` is nullable: a post may reference an author id with no matching
/// row, and the post must still be returned.
#[derive(SimpleObject, Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Author {
    pub id: String,
    pub name: Option<String>,
}

/// A blog post as exposed through GraphQL.
#[derive(SimpleObject, Debug, Clone, PartialEq)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub text: String,
    pub author: Option<Author>,
    pub date: DateTime,
}

/// A joined posts/authors row as read from the store.
///
/// Carries the store-assigned cursor, which rides on pagination edges but is
/// not a field of the GraphQL `Post` object.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PostRecord {
    pub id: String,
    pub cursor: i64,
    pub title: String,
    pub text: String,
    pub date: chrono::DateTime<Utc>,
    pub author_id: Option<String>,
    pub author_name: Option<String>,
}

impl From<PostRecord> for Post {
    fn from(record: PostRecord) -> Self {
        let author = record.author_id.map(|id| Author {
            id,
            name: record.author_name,
        });
        Post {
            id: record.id,
            title: record.title,
            text: record.text,
            author,
            date: DateTime(record.date),
        }
    }
}

/// Input for creating a post.
#[derive(InputObject, Debug, Clone)]
pub struct PostInput {
    pub title: String,
    pub text: String,
    pub author_id: Option<String>,
}

/// Input for updating a post. Absent fields keep their stored value.
#[derive(InputObject, Debug, Clone)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub text: Option<String>,
}

/// A fully-determined post ready for insertion.
///
/// The id and creation date are fixed here, before the store is touched; the
/// cursor is assigned by the store on insert.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub id: String,
    pub title: String,
    pub text: String,
    pub author_id: Option<String>,
    pub date: chrono::DateTime<Utc>,
}

impl NewPost {
    pub fn from_input(input: PostInput) -> Self {
        NewPost {
            id: generate_post_id(),
            title: input.title,
            text: input.text,
            author_id: input.author_id,
            date: Utc::now(),
        }
    }
}

/// Generate an opaque post id: 10 bytes from the OS CSPRNG, lowercase hex.
pub fn generate_post_id() -> String {
    let mut bytes = [0u8; POST_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
