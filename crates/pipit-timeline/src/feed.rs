//! Paginated, sorted public feed.
//!
//! The sort key is always the creation timestamp; only the direction is
//! chosen by the caller. Pages are zero-based offsets over the whole post
//! table, so a page past the end is empty but still reports totals.

use pipit_core::error::{PipitError, PipitResult};
use pipit_core::models::post::{AuthoredPost, PostId};
use pipit_core::repository::{
    MAX_WINDOW, Pagination, PostPageRequest, PostRepository, SortDirection,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Feed request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedQuery {
    /// Zero-based page index.
    pub page: u64,
    pub page_size: u64,
    pub sort: SortDirection,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortDirection::Desc,
        }
    }
}

impl FeedQuery {
    /// Build a query from optional raw parameters, filling defaults.
    ///
    /// `sort` accepts `asc` or `desc` in any case.
    pub fn from_params(
        page: Option<u64>,
        page_size: Option<u64>,
        sort: Option<&str>,
    ) -> PipitResult<Self> {
        let sort = match sort {
            Some(s) => s.parse()?,
            None => SortDirection::default(),
        };
        let query = Self {
            page: page.unwrap_or(0),
            page_size: page_size.unwrap_or(DEFAULT_PAGE_SIZE),
            sort,
        };
        query.to_request()?;
        Ok(query)
    }

    /// Translate to a repository page request.
    fn to_request(self) -> PipitResult<PostPageRequest> {
        if self.page_size == 0 {
            return Err(PipitError::InvalidPagination {
                reason: "page size must be at least 1".into(),
            });
        }
        if self.page_size > MAX_WINDOW {
            return Err(PipitError::InvalidPagination {
                reason: format!("page size must be at most {MAX_WINDOW}"),
            });
        }
        let offset =
            self.page
                .checked_mul(self.page_size)
                .ok_or_else(|| PipitError::InvalidPagination {
                    reason: format!("page {} of size {} is out of range", self.page, self.page_size),
                })?;

        Ok(PostPageRequest {
            pagination: Pagination {
                offset,
                limit: self.page_size,
            },
            direction: self.sort,
        })
    }
}

/// One post as shown in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub post_id: PostId,
    pub content: String,
    pub username: String,
}

impl From<AuthoredPost> for FeedEntry {
    fn from(authored: AuthoredPost) -> Self {
        Self {
            post_id: authored.post.id,
            content: authored.post.content,
            username: authored.owner_username,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    pub entries: Vec<FeedEntry>,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
    pub total_elements: u64,
}

/// Number of pages needed for `total` items, 0 when there are none.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size)
}

/// Assembles feed pages from the post store.
#[derive(Clone)]
pub struct FeedAssembler<P: PostRepository> {
    posts: P,
}

impl<P: PostRepository> FeedAssembler<P> {
    pub fn new(posts: P) -> Self {
        Self { posts }
    }

    pub async fn get_feed(&self, query: FeedQuery) -> PipitResult<FeedPage> {
        let request = query.to_request()?;
        let result = self.posts.list_page(request).await?;

        let page = FeedPage {
            entries: result.items.into_iter().map(FeedEntry::from).collect(),
            page: query.page,
            page_size: query.page_size,
            total_pages: total_pages(result.total, query.page_size),
            total_elements: result.total,
        };

        debug!(
            page = page.page,
            page_size = page.page_size,
            sort = %query.sort,
            returned = page.entries.len(),
            total = page.total_elements,
            "Feed assembled"
        );
        Ok(page)
    }
}
