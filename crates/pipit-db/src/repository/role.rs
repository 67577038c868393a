//! SurrealDB implementation of [`RoleRepository`].

use pipit_core::error::{PipitError, PipitResult};
use pipit_core::models::role::{Role, RoleSet};
use pipit_core::repository::RoleRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;
use uuid::Uuid;

use super::user::roles_from_ids;
use crate::error::{DbError, write_error};

#[derive(Debug, SurrealValue)]
struct RoleRow {
    role_id: i64,
    #[allow(dead_code)]
    name: String,
}

impl RoleRow {
    fn try_into_role(self) -> Result<Role, DbError> {
        Role::from_id(self.role_id)
            .ok_or_else(|| DbError::Corrupt(format!("unknown role id: {}", self.role_id)))
    }
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn get_by_name(&self, name: &str) -> PipitResult<Role> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS role_id, name FROM role \
                 WHERE string::uppercase(name) = string::uppercase($name)",
            )
            .bind(("name", name.trim().to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: format!("name={name}"),
        })?;

        Ok(row.try_into_role()?)
    }

    async fn list(&self) -> PipitResult<Vec<Role>> {
        let mut result = self
            .db
            .query("SELECT meta::id(id) AS role_id, name FROM role ORDER BY role_id ASC")
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;

        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }

    async fn get_user_roles(&self, user_id: Uuid) -> PipitResult<RoleSet> {
        let mut result = self
            .db
            .query(
                "SELECT VALUE meta::id(out) FROM has_role \
                 WHERE in = type::record('user', $user_id)",
            )
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let ids: Vec<i64> = result.take(0).map_err(DbError::from)?;
        Ok(roles_from_ids(&ids)?)
    }

    async fn assign_to_user(&self, user_id: Uuid, role: Role) -> PipitResult<()> {
        if self.get_user_roles(user_id).await?.contains(role) {
            return Ok(());
        }

        let query = format!(
            "RELATE user:`{user_id}` -> has_role -> role:{};",
            role.id()
        );

        self.db
            .query(query)
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| write_error("role assignment", e))?;

        info!(user_id = %user_id, role = %role, "Role assigned");
        Ok(())
    }

    async fn unassign_from_user(&self, user_id: Uuid, role: Role) -> PipitResult<()> {
        let mut roles = self.get_user_roles(user_id).await?;
        if !roles.remove(role) {
            return Ok(());
        }
        if roles.is_empty() {
            return Err(PipitError::Validation {
                message: format!("cannot remove {role}: a user must keep at least one role"),
            });
        }

        self.db
            .query(
                "DELETE has_role WHERE \
                 in = type::record('user', $user_id) AND \
                 out = type::record('role', $role_id)",
            )
            .bind(("user_id", user_id.to_string()))
            .bind(("role_id", role.id()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        info!(user_id = %user_id, role = %role, "Role unassigned");
        Ok(())
    }
}
