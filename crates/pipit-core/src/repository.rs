//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Implementations must make each
//! single-record insert or delete atomic; nothing above this layer takes
//! locks.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PipitError, PipitResult};
use crate::models::{
    post::{AuthoredPost, CreatePost, Post, PostId},
    role::{Role, RoleSet},
    user::{CreateUser, User},
};

/// Largest offset or limit a store window can express.
pub const MAX_WINDOW: u64 = i64::MAX as u64;

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Direction of the creation-timestamp ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for SortDirection {
    type Err = PipitError;

    /// Accepts `asc` or `desc` in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            d if d.eq_ignore_ascii_case("asc") => Ok(SortDirection::Asc),
            d if d.eq_ignore_ascii_case("desc") => Ok(SortDirection::Desc),
            other => Err(PipitError::InvalidPagination {
                reason: format!("invalid sort direction '{other}', expected ASC or DESC"),
            }),
        }
    }
}

/// A window of posts ordered by creation timestamp.
#[derive(Debug, Clone)]
pub struct PostPageRequest {
    pub pagination: Pagination,
    pub direction: SortDirection,
}

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = PipitResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = PipitResult<User>> + Send;
    fn get_by_username(&self, username: &str) -> impl Future<Output = PipitResult<User>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = PipitResult<PaginatedResult<User>>> + Send;
}

pub trait RoleRepository: Send + Sync {
    /// Look up seeded role reference data by name (case-insensitive).
    fn get_by_name(&self, name: &str) -> impl Future<Output = PipitResult<Role>> + Send;

    /// All seeded roles, ordered by identifier.
    fn list(&self) -> impl Future<Output = PipitResult<Vec<Role>>> + Send;

    fn get_user_roles(&self, user_id: Uuid) -> impl Future<Output = PipitResult<RoleSet>> + Send;

    /// Grant a role to a user. Granting a held role is a no-op.
    fn assign_to_user(
        &self,
        user_id: Uuid,
        role: Role,
    ) -> impl Future<Output = PipitResult<()>> + Send;

    /// Remove a role from a user. Fails with `Validation` when it is the
    /// user's last role.
    fn unassign_from_user(
        &self,
        user_id: Uuid,
        role: Role,
    ) -> impl Future<Output = PipitResult<()>> + Send;
}

pub trait PostRepository: Send + Sync {
    /// Persist a post; storage assigns the id and creation timestamp.
    fn create(&self, input: CreatePost) -> impl Future<Output = PipitResult<Post>> + Send;
    fn get_by_id(&self, id: PostId) -> impl Future<Output = PipitResult<Post>> + Send;

    /// Remove a post. Fails with `NotFound` when nothing was removed.
    fn delete(&self, id: PostId) -> impl Future<Output = PipitResult<()>> + Send;

    /// Posts joined with their owner's username, plus the total post count.
    fn list_page(
        &self,
        request: PostPageRequest,
    ) -> impl Future<Output = PipitResult<PaginatedResult<AuthoredPost>>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_direction_parses_any_case() {
        assert_eq!("asc".parse::<SortDirection>().unwrap(), SortDirection::Asc);
        assert_eq!("DESC".parse::<SortDirection>().unwrap(), SortDirection::Desc);
        assert_eq!(" Desc ".parse::<SortDirection>().unwrap(), SortDirection::Desc);
    }

    #[test]
    fn sort_direction_rejects_other_tokens() {
        let err = "10".parse::<SortDirection>().unwrap_err();
        assert!(matches!(err, PipitError::InvalidPagination { .. }));
    }

    #[test]
    fn sort_direction_defaults_to_desc() {
        assert_eq!(SortDirection::default(), SortDirection::Desc);
    }
}
