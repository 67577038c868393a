//! Post creation and deletion on behalf of a subject.
//!
//! Deletion order is fixed: resolve the actor, load the post, ask the
//! policy, then remove. A missing post is reported as `PostNotFound` to
//! every caller regardless of role.

use pipit_core::error::{PipitError, PipitResult};
use pipit_core::identity::IdentityResolver;
use pipit_core::models::post::{CreatePost, Post, PostId};
use pipit_core::policy;
use pipit_core::repository::{PostRepository, UserRepository};
use tracing::{info, warn};

#[derive(Clone)]
pub struct PostService<U: UserRepository, P: PostRepository> {
    identities: IdentityResolver<U>,
    posts: P,
}

impl<U: UserRepository, P: PostRepository> PostService<U, P> {
    pub fn new(users: U, posts: P) -> Self {
        Self {
            identities: IdentityResolver::new(users),
            posts,
        }
    }

    /// Publish `content` as a post owned by the subject.
    pub async fn create(&self, subject: &str, content: String) -> PipitResult<Post> {
        let actor = self.identities.resolve(subject).await?;
        if !policy::can_create(&actor) {
            return Err(PipitError::Forbidden {
                reason: format!("user {} may not create posts", actor.id),
            });
        }

        let post = self
            .posts
            .create(CreatePost {
                owner_id: actor.id,
                content,
            })
            .await?;

        info!(post_id = %post.id, owner_id = %actor.id, "Post created");
        Ok(post)
    }

    /// Delete a post if the subject owns it or holds ADMIN.
    pub async fn delete(&self, subject: &str, post_id: PostId) -> PipitResult<()> {
        let actor = self.identities.resolve(subject).await?;

        let post = self
            .posts
            .get_by_id(post_id)
            .await
            .map_err(|e| post_not_found(e, post_id))?;

        if let Err(e) = policy::ensure_can_delete(&actor, &post) {
            warn!(actor = %actor.id, post_id = %post.id, owner_id = %post.owner_id, "Delete denied");
            return Err(e);
        }

        // Another request may have removed it since the lookup.
        self.posts
            .delete(post_id)
            .await
            .map_err(|e| post_not_found(e, post_id))?;

        info!(post_id = %post_id, actor = %actor.id, "Post deleted");
        Ok(())
    }
}

fn post_not_found(err: PipitError, post_id: PostId) -> PipitError {
    match err {
        PipitError::NotFound { .. } => PipitError::PostNotFound { id: post_id.0 },
        other => other,
    }
}
