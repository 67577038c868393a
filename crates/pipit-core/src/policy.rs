//! Authorization policy for post mutations and admin-only reads.
//!
//! Every decision here is pure: the caller resolves the acting user and
//! loads the target before asking. A missing target must already have
//! been reported as not found.

use tracing::debug;

use crate::error::{PipitError, PipitResult};
use crate::models::post::Post;
use crate::models::user::User;

/// Any resolved user may create a post attributed to itself.
pub fn can_create(_actor: &User) -> bool {
    true
}

/// Allowed when the actor is an admin or owns the post.
pub fn can_delete(actor: &User, post: &Post) -> bool {
    actor.roles.is_admin() || post.owner_id == actor.id
}

pub fn can_list_users(actor: &User) -> bool {
    actor.roles.is_admin()
}

pub fn ensure_can_delete(actor: &User, post: &Post) -> PipitResult<()> {
    let allowed = can_delete(actor, post);
    debug!(actor = %actor.id, post = %post.id, allowed, "Delete decision");
    if allowed {
        Ok(())
    } else {
        Err(PipitError::Forbidden {
            reason: format!("user {} may not delete post {}", actor.id, post.id),
        })
    }
}

pub fn ensure_can_list_users(actor: &User) -> PipitResult<()> {
    if can_list_users(actor) {
        Ok(())
    } else {
        Err(PipitError::Forbidden {
            reason: "listing users requires the ADMIN role".into(),
        })
    }
}
