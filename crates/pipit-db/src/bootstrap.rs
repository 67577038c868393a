//! First-boot seeding of the administrator account.
//!
//! Runs once at process start, outside any request path. Guarded by a
//! username lookup, so repeated runs leave existing state untouched.

use pipit_core::error::{PipitError, PipitResult};
use pipit_core::models::role::{Role, RoleSet};
use pipit_core::models::user::{CreateUser, User};
use pipit_core::repository::{RoleRepository, UserRepository};
use tracing::info;

/// Credentials for the seeded administrator.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub enum SeedOutcome {
    Created(User),
    AlreadyPresent(User),
}

/// Create the admin account with the ADMIN role unless a user with the
/// configured username already exists.
pub async fn seed_admin<U, R>(users: &U, roles: &R, seed: AdminSeed) -> PipitResult<SeedOutcome>
where
    U: UserRepository,
    R: RoleRepository,
{
    // Fails with NotFound if the role reference data was never migrated.
    let admin_role = roles.get_by_name(Role::Admin.name()).await?;

    match users.get_by_username(&seed.username).await {
        Ok(existing) => {
            info!(username = %existing.username, "Admin account already present");
            Ok(SeedOutcome::AlreadyPresent(existing))
        }
        Err(PipitError::NotFound { .. }) => {
            let user = users
                .create(CreateUser {
                    username: seed.username,
                    password: seed.password,
                    roles: RoleSet::only(admin_role),
                })
                .await?;
            info!(user_id = %user.id, username = %user.username, "Admin account seeded");
            Ok(SeedOutcome::Created(user))
        }
        Err(e) => Err(e),
    }
}
