//! SurrealDB implementation of [`UserRepository`].
//!
//! Passwords are hashed with [`PasswordHashing`] before they reach the
//! store. A peppered repository must be paired with the same pepper at
//! login.
//!
//! Role membership lives in `has_role` edges and is read back with every
//! user as a list of role ids.

use chrono::{DateTime, Utc};
use pipit_core::error::PipitResult;
use pipit_core::models::role::{Role, RoleSet};
use pipit_core::models::user::{CreateUser, User};
use pipit_core::password::PasswordHashing;
use pipit_core::repository::{MAX_WINDOW, PaginatedResult, Pagination, UserRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use crate::error::{DbError, write_error};

/// Projection shared by every user read.
const USER_FIELDS: &str = "meta::id(id) AS record_id, username, password_hash, created_at, \
     (SELECT VALUE meta::id(out) FROM has_role WHERE in = $parent.id) AS role_ids";

#[derive(Debug, SurrealValue)]
struct UserRow {
    record_id: String,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    role_ids: Vec<i64>,
}

impl UserRow {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Corrupt(format!("invalid user UUID: {e}")))?;
        Ok(User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            roles: roles_from_ids(&self.role_ids)?,
            created_at: self.created_at,
        })
    }
}

pub(crate) fn roles_from_ids(ids: &[i64]) -> Result<RoleSet, DbError> {
    ids.iter()
        .map(|id| {
            Role::from_id(*id).ok_or_else(|| DbError::Corrupt(format!("unknown role id: {id}")))
        })
        .collect()
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
    passwords: PasswordHashing,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self::with_passwords(db, PasswordHashing::default())
    }

    pub fn with_passwords(db: Surreal<C>, passwords: PasswordHashing) -> Self {
        Self { db, passwords }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> PipitResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let password_hash = self.passwords.hash(&input.password)?;

        let roles = if input.roles.is_empty() {
            RoleSet::only(Role::Basic)
        } else {
            input.roles
        };

        // The user row and its role edges commit together.
        let mut query = String::from(
            "BEGIN TRANSACTION; \
             CREATE type::record('user', $id) SET \
             username = $username, \
             password_hash = $password_hash;",
        );
        for role in roles.iter() {
            query.push_str(&format!(
                " RELATE user:`{id_str}` -> has_role -> role:{};",
                role.id()
            ));
        }
        query.push_str(" COMMIT TRANSACTION;");

        self.db
            .query(query)
            .bind(("id", id_str))
            .bind(("username", input.username.clone()))
            .bind(("password_hash", password_hash))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| write_error("user", e))?;

        info!(user_id = %id, username = %input.username, roles = %roles.to_scope(), "User created");

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> PipitResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(format!(
                "SELECT {USER_FIELDS} FROM type::record('user', $id)"
            ))
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.try_into_user()?)
    }

    async fn get_by_username(&self, username: &str) -> PipitResult<User> {
        let mut result = self
            .db
            .query(format!(
                "SELECT {USER_FIELDS} FROM user WHERE username = $username"
            ))
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("username={username}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn list(&self, pagination: Pagination) -> PipitResult<PaginatedResult<User>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM user GROUP ALL")
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

        let mut result = self
            .db
            .query(format!(
                "SELECT {USER_FIELDS} FROM user \
                 ORDER BY created_at ASC \
                 LIMIT $limit START $offset"
            ))
            .bind(("limit", pagination.limit.min(MAX_WINDOW)))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
