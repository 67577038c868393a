//! SurrealDB implementation of [`PostRepository`].
//!
//! Post ids come from the `counter:post` record. The counter increment
//! and the post insert run as one statement, so ids are strictly
//! increasing in creation order and never reused.

use chrono::{DateTime, Utc};
use pipit_core::error::PipitResult;
use pipit_core::models::post::{AuthoredPost, CreatePost, Post, PostId};
use pipit_core::repository::{MAX_WINDOW, PaginatedResult, PostPageRequest, PostRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, write_error};

const POST_FIELDS: &str =
    "meta::id(id) AS post_id, content, meta::id(owner) AS owner_id, created_at";

#[derive(Debug, SurrealValue)]
struct PostRow {
    post_id: i64,
    owner_id: String,
    content: String,
    created_at: DateTime<Utc>,
}

impl PostRow {
    fn try_into_post(self) -> Result<Post, DbError> {
        let owner_id = Uuid::parse_str(&self.owner_id)
            .map_err(|e| DbError::Corrupt(format!("invalid owner UUID: {e}")))?;
        Ok(Post {
            id: PostId(self.post_id),
            owner_id,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

/// Post row joined with the owner's username through the record link.
#[derive(Debug, SurrealValue)]
struct AuthoredPostRow {
    post_id: i64,
    owner_id: String,
    owner_username: Option<String>,
    content: String,
    created_at: DateTime<Utc>,
}

impl AuthoredPostRow {
    fn try_into_authored(self) -> Result<AuthoredPost, DbError> {
        let owner_username = self.owner_username.ok_or_else(|| {
            DbError::Corrupt(format!("post {} has no resolvable owner", self.post_id))
        })?;
        let post = PostRow {
            post_id: self.post_id,
            owner_id: self.owner_id,
            content: self.content,
            created_at: self.created_at,
        }
        .try_into_post()?;
        Ok(AuthoredPost {
            post,
            owner_username,
        })
    }
}

#[derive(Debug, SurrealValue)]
struct DeletedRow {
    #[allow(dead_code)]
    post_id: i64,
}

#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the Post repository.
#[derive(Clone)]
pub struct SurrealPostRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPostRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PostRepository for SurrealPostRepository<C> {
    async fn create(&self, input: CreatePost) -> PipitResult<Post> {
        let result = self
            .db
            .query(format!(
                "SELECT {POST_FIELDS} FROM (\
                     CREATE type::record('post', \
                         (UPSERT ONLY counter:post SET seq = (seq ?? 0) + 1).seq\
                     ) SET \
                     owner = type::record('user', $owner_id), \
                     content = $content\
                 )"
            ))
            .bind(("owner_id", input.owner_id.to_string()))
            .bind(("content", input.content))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(|e| write_error("post", e))?;

        let rows: Vec<PostRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "post".into(),
            id: format!("owner={}", input.owner_id),
        })?;

        let post = row.try_into_post()?;
        debug!(post_id = %post.id, owner_id = %post.owner_id, "Post stored");
        Ok(post)
    }

    async fn get_by_id(&self, id: PostId) -> PipitResult<Post> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {POST_FIELDS} FROM type::record('post', $id)"
            ))
            .bind(("id", id.0))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PostRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "post".into(),
            id: id.to_string(),
        })?;

        Ok(row.try_into_post()?)
    }

    async fn delete(&self, id: PostId) -> PipitResult<()> {
        let result = self
            .db
            .query(
                "SELECT meta::id(id) AS post_id FROM (\
                     DELETE type::record('post', $id) RETURN BEFORE\
                 )",
            )
            .bind(("id", id.0))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let removed: Vec<DeletedRow> = result.take(0).map_err(DbError::from)?;
        if removed.is_empty() {
            return Err(DbError::NotFound {
                entity: "post".into(),
                id: id.to_string(),
            }
            .into());
        }

        Ok(())
    }

    async fn list_page(
        &self,
        request: PostPageRequest,
    ) -> PipitResult<PaginatedResult<AuthoredPost>> {
        let pagination = request.pagination;

        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM post GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        // Past the end. Also keeps START inside the store's signed range.
        if pagination.offset >= total {
            return Ok(PaginatedResult {
                items: Vec::new(),
                total,
                offset: pagination.offset,
                limit: pagination.limit,
            });
        }

        // Direction comes from a closed enum, never from caller text.
        let direction = request.direction.as_sql();

        let mut result = self
            .db
            .query(format!(
                "SELECT {POST_FIELDS}, owner.username AS owner_username FROM post \
                 ORDER BY created_at {direction}, post_id {direction} \
                 LIMIT $limit START $offset"
            ))
            .bind(("limit", pagination.limit.min(MAX_WINDOW)))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AuthoredPostRow> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_authored())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
