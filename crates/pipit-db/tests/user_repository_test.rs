//! Integration tests for User and Role repositories using in-memory SurrealDB.

use pipit_core::error::PipitError;
use pipit_core::models::role::{Role, RoleSet};
use pipit_core::models::user::CreateUser;
use pipit_core::password::PasswordHashing;
use pipit_core::repository::{Pagination, RoleRepository, UserRepository};
use pipit_db::repository::{SurrealRoleRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem};

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    pipit_db::run_migrations(&db).await.unwrap();
    db
}

fn new_user(username: &str, roles: RoleSet) -> CreateUser {
    CreateUser {
        username: username.into(),
        password: "SuperSecret123!".into(),
        roles,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(new_user("alice", RoleSet::only(Role::Basic)))
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.roles, RoleSet::only(Role::Basic));

    // Password should be hashed, not stored in plaintext.
    assert_ne!(user.password_hash, "SuperSecret123!");
    assert!(user.password_hash.starts_with("$argon2id$"));

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.username, "alice");
    assert_eq!(fetched.roles, user.roles);
}

#[tokio::test]
async fn empty_role_set_defaults_to_basic() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo.create(new_user("bob", RoleSet::empty())).await.unwrap();
    assert_eq!(user.roles, RoleSet::only(Role::Basic));
}

#[tokio::test]
async fn get_by_username() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let admin_and_basic: RoleSet = [Role::Admin, Role::Basic].into_iter().collect();
    let created = repo.create(new_user("carol", admin_and_basic)).await.unwrap();

    let fetched = repo.get_by_username("carol").await.unwrap();
    assert_eq!(fetched.id, created.id);
    assert!(fetched.roles.is_admin());
    assert_eq!(fetched.roles.len(), 2);
}

#[tokio::test]
async fn get_nonexistent_user_returns_not_found() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let err = repo.get_by_id(uuid::Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PipitError::NotFound { .. }), "got {err:?}");

    let err = repo.get_by_username("nobody").await.unwrap_err();
    assert!(matches!(err, PipitError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn duplicate_username_is_rejected() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(new_user("dave", RoleSet::empty())).await.unwrap();
    let err = repo
        .create(new_user("dave", RoleSet::empty()))
        .await
        .unwrap_err();

    assert!(matches!(err, PipitError::AlreadyExists { .. }), "got {err:?}");

    // The failed create must not leave a second user behind.
    let page = repo.list(Pagination::default()).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn list_users_paginated() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    for name in ["u1", "u2", "u3"] {
        repo.create(new_user(name, RoleSet::empty())).await.unwrap();
    }

    let page = repo
        .list(Pagination {
            offset: 1,
            limit: 1,
        })
        .await
        .unwrap();

    assert_eq!(page.total, 3);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.offset, 1);
    assert_eq!(page.limit, 1);
}

#[tokio::test]
async fn list_users_with_window_beyond_signed_range() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);
    repo.create(new_user("u1", RoleSet::empty())).await.unwrap();

    let far = repo
        .list(Pagination {
            offset: u64::MAX,
            limit: u64::MAX,
        })
        .await
        .unwrap();
    assert!(far.items.is_empty());
    assert_eq!(far.total, 1);

    let all = repo
        .list(Pagination {
            offset: 0,
            limit: u64::MAX,
        })
        .await
        .unwrap();
    assert_eq!(all.items.len(), 1);
}

#[tokio::test]
async fn peppered_hash_verifies_only_with_the_same_pepper() {
    let db = setup().await;
    let pepper = PasswordHashing::new(Some("server-secret".into()));
    let peppered = SurrealUserRepository::with_passwords(db, pepper.clone());

    let user = peppered.create(new_user("frank", RoleSet::empty())).await.unwrap();

    assert!(user.password_hash.starts_with("$argon2id$"));
    assert!(pepper.verify("SuperSecret123!", &user.password_hash).unwrap());
    assert!(
        !PasswordHashing::default()
            .verify("SuperSecret123!", &user.password_hash)
            .unwrap()
    );
}

// -----------------------------------------------------------------------
// Role assignment
// -----------------------------------------------------------------------

#[tokio::test]
async fn role_lookup_by_name_is_case_insensitive() {
    let db = setup().await;
    let roles = SurrealRoleRepository::new(db);

    assert_eq!(roles.get_by_name("admin").await.unwrap(), Role::Admin);
    assert_eq!(roles.get_by_name("BASIC").await.unwrap(), Role::Basic);

    let err = roles.get_by_name("moderator").await.unwrap_err();
    assert!(matches!(err, PipitError::NotFound { .. }), "got {err:?}");
}

#[tokio::test]
async fn assign_and_unassign_roles() {
    let db = setup().await;
    let users = SurrealUserRepository::new(db.clone());
    let roles = SurrealRoleRepository::new(db);

    let user = users.create(new_user("gina", RoleSet::empty())).await.unwrap();

    roles.assign_to_user(user.id, Role::Admin).await.unwrap();
    // Assigning a held role is a no-op.
    roles.assign_to_user(user.id, Role::Admin).await.unwrap();

    let held = roles.get_user_roles(user.id).await.unwrap();
    assert_eq!(held.len(), 2);
    assert!(held.is_admin());

    roles.unassign_from_user(user.id, Role::Basic).await.unwrap();
    let reloaded = users.get_by_id(user.id).await.unwrap();
    assert_eq!(reloaded.roles, RoleSet::only(Role::Admin));
}

#[tokio::test]
async fn removing_last_role_is_rejected() {
    let db = setup().await;
    let users = SurrealUserRepository::new(db.clone());
    let roles = SurrealRoleRepository::new(db);

    let user = users.create(new_user("hank", RoleSet::empty())).await.unwrap();

    let err = roles
        .unassign_from_user(user.id, Role::Basic)
        .await
        .unwrap_err();
    assert!(matches!(err, PipitError::Validation { .. }), "got {err:?}");

    let held = roles.get_user_roles(user.id).await.unwrap();
    assert_eq!(held, RoleSet::only(Role::Basic));
}
