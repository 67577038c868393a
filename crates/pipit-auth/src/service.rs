//! Account service: registration, login, bearer authentication and
//! the admin-only user listing.

use pipit_core::error::{PipitError, PipitResult};
use pipit_core::identity::IdentityResolver;
use pipit_core::models::role::{Role, RoleSet};
use pipit_core::models::user::{CreateUser, User};
use pipit_core::policy;
use pipit_core::repository::{PaginatedResult, Pagination, UserRepository};
use tracing::{info, warn};

use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::token;

/// Input for self-service registration.
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
}

/// Input for the login flow.
#[derive(Debug)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed JWT access token.
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: u64,
}

/// Account service.
///
/// Generic over the user repository so that the auth layer has no
/// dependency on the database crate.
pub struct AuthService<U: UserRepository> {
    identities: IdentityResolver<U>,
    config: AuthConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(user_repo: U, config: AuthConfig) -> Self {
        Self {
            identities: IdentityResolver::new(user_repo),
            config,
        }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Register a new account with the BASIC role.
    pub async fn register(&self, input: RegisterInput) -> PipitResult<User> {
        let username = input.username.trim();
        if username.is_empty() {
            return Err(PipitError::Validation {
                message: "username must not be empty".into(),
            });
        }
        if input.password.chars().count() < self.config.min_password_length {
            return Err(AuthError::PasswordTooShort {
                min: self.config.min_password_length,
            }
            .into());
        }

        match self.identities.users().get_by_username(username).await {
            Ok(_) => {
                warn!(username, "Registration rejected: username taken");
                return Err(PipitError::AlreadyExists {
                    entity: "user".into(),
                });
            }
            Err(PipitError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let user = self
            .identities
            .users()
            .create(CreateUser {
                username: username.to_string(),
                password: input.password,
                roles: RoleSet::only(Role::Basic),
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, "Account registered");
        Ok(user)
    }

    /// Verify username and password and issue an access token.
    ///
    /// An unknown username and a wrong password are indistinguishable to
    /// the caller.
    pub async fn login(&self, input: LoginInput) -> PipitResult<LoginOutput> {
        let user = match self.identities.users().get_by_username(&input.username).await {
            Ok(u) => u,
            Err(PipitError::NotFound { .. }) => {
                warn!(username = %input.username, "Login failed: unknown user");
                return Err(AuthError::InvalidCredentials.into());
            }
            Err(e) => return Err(e),
        };

        let valid = self
            .config
            .passwords
            .verify(&input.password, &user.password_hash)?;

        if !valid {
            warn!(user_id = %user.id, "Login failed: wrong password");
            return Err(AuthError::InvalidCredentials.into());
        }

        let access_token = token::issue_access_token(&user, &self.config)?;

        info!(user_id = %user.id, scope = %user.roles.to_scope(), "Login succeeded");
        Ok(LoginOutput {
            access_token,
            expires_in: self.config.access_token_lifetime_secs,
        })
    }

    /// Verify a bearer `Authorization` header and resolve the user it
    /// names. Roles come from storage, not from the token's scope.
    pub async fn authenticate(&self, authorization: &str) -> PipitResult<User> {
        let subject = token::bearer_subject(authorization, &self.config)?;
        self.identities.resolve(&subject).await
    }

    /// List all accounts. ADMIN only.
    pub async fn list_users(
        &self,
        subject: &str,
        pagination: Pagination,
    ) -> PipitResult<PaginatedResult<User>> {
        let actor = self.identities.resolve(subject).await?;
        if let Err(e) = policy::ensure_can_list_users(&actor) {
            warn!(actor = %actor.id, "User listing denied");
            return Err(e);
        }
        self.identities.users().list(pagination).await
    }
}
