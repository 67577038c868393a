//! Resolution of an authenticated subject to a stored user.

use tracing::debug;
use uuid::Uuid;

use crate::error::{PipitError, PipitResult};
use crate::models::user::User;
use crate::repository::UserRepository;

/// Maps the subject asserted by a verified credential to the stored user
/// and its role set.
#[derive(Clone)]
pub struct IdentityResolver<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> IdentityResolver<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// The underlying user repository.
    pub fn users(&self) -> &U {
        &self.users
    }

    /// Resolve a subject string (a user UUID) to its user.
    ///
    /// An unparseable subject and an unknown user both fail with
    /// `IdentityNotFound`. Storage errors are passed through.
    pub async fn resolve(&self, subject: &str) -> PipitResult<User> {
        let id = Uuid::parse_str(subject.trim()).map_err(|_| PipitError::IdentityNotFound {
            subject: subject.to_string(),
        })?;

        match self.users.get_by_id(id).await {
            Ok(user) => {
                debug!(user_id = %user.id, roles = ?user.roles, "Resolved identity");
                Ok(user)
            }
            Err(PipitError::NotFound { .. }) => Err(PipitError::IdentityNotFound {
                subject: subject.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::Utc;

    use super::*;
    use crate::models::role::{Role, RoleSet};
    use crate::models::user::CreateUser;
    use crate::repository::{PaginatedResult, Pagination};

    struct FixedUsers(HashMap<Uuid, User>);

    impl UserRepository for FixedUsers {
        async fn create(&self, _input: CreateUser) -> PipitResult<User> {
            Err(PipitError::Internal("read-only".into()))
        }

        async fn get_by_id(&self, id: Uuid) -> PipitResult<User> {
            self.0.get(&id).cloned().ok_or_else(|| PipitError::NotFound {
                entity: "user".into(),
                id: id.to_string(),
            })
        }

        async fn get_by_username(&self, username: &str) -> PipitResult<User> {
            self.0
                .values()
                .find(|u| u.username == username)
                .cloned()
                .ok_or_else(|| PipitError::NotFound {
                    entity: "user".into(),
                    id: format!("username={username}"),
                })
        }

        async fn list(&self, pagination: Pagination) -> PipitResult<PaginatedResult<User>> {
            Ok(PaginatedResult {
                items: self.0.values().cloned().collect(),
                total: self.0.len() as u64,
                offset: pagination.offset,
                limit: pagination.limit,
            })
        }
    }

    fn resolver_with_alice() -> (IdentityResolver<FixedUsers>, Uuid) {
        let alice = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            password_hash: String::new(),
            roles: RoleSet::only(Role::Basic),
            created_at: Utc::now(),
        };
        let id = alice.id;
        let users = FixedUsers(HashMap::from([(id, alice)]));
        (IdentityResolver::new(users), id)
    }

    #[tokio::test]
    async fn resolves_existing_user() {
        let (resolver, id) = resolver_with_alice();
        let user = resolver.resolve(&id.to_string()).await.unwrap();
        assert_eq!(user.username, "alice");
        assert!(user.roles.contains(Role::Basic));
    }

    #[tokio::test]
    async fn unknown_user_is_identity_not_found() {
        let (resolver, _) = resolver_with_alice();
        let err = resolver
            .resolve(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, PipitError::IdentityNotFound { .. }), "got {err:?}");
    }

    #[tokio::test]
    async fn malformed_subject_is_identity_not_found() {
        let (resolver, _) = resolver_with_alice();
        let err = resolver.resolve("not-a-uuid").await.unwrap_err();
        match err {
            PipitError::IdentityNotFound { subject } => assert_eq!(subject, "not-a-uuid"),
            other => panic!("expected IdentityNotFound, got {other:?}"),
        }
    }
}
