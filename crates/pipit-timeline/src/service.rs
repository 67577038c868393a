//! The three timeline operations exposed to the transport boundary.

use pipit_core::error::PipitResult;
use pipit_core::models::post::PostId;
use pipit_core::repository::{PostRepository, UserRepository};

use crate::feed::{FeedAssembler, FeedPage, FeedQuery};
use crate::posts::PostService;

/// Facade over the feed assembler and the post mutation service.
///
/// Holds no mutable state; share it behind an `Arc`.
#[derive(Clone)]
pub struct TimelineService<U: UserRepository, P: PostRepository> {
    feed: FeedAssembler<P>,
    posts: PostService<U, P>,
}

impl<U: UserRepository, P: PostRepository + Clone> TimelineService<U, P> {
    pub fn new(users: U, posts: P) -> Self {
        Self {
            feed: FeedAssembler::new(posts.clone()),
            posts: PostService::new(users, posts),
        }
    }
}

impl<U: UserRepository, P: PostRepository> TimelineService<U, P> {
    pub async fn get_feed(&self, query: FeedQuery) -> PipitResult<FeedPage> {
        self.feed.get_feed(query).await
    }

    pub async fn create_post(&self, subject: &str, content: String) -> PipitResult<PostId> {
        self.posts.create(subject, content).await.map(|post| post.id)
    }

    pub async fn delete_post(&self, subject: &str, post_id: PostId) -> PipitResult<()> {
        self.posts.delete(subject, post_id).await
    }
}
