//! The migrated SurrealDB store and the repositories over it.
//!
//! A [`Store`] only exists once the schema is current: both constructors
//! run [`run_migrations`] before handing out repositories.

use std::fmt;

use pipit_core::error::PipitResult;
use pipit_core::password::PasswordHashing;
use serde::Deserialize;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use surrealdb::{Connection, Surreal};
use tracing::info;

use crate::bootstrap::{self, AdminSeed, SeedOutcome};
use crate::error::DbError;
use crate::repository::{SurrealPostRepository, SurrealRoleRepository, SurrealUserRepository};
use crate::schema::run_migrations;

/// Where the store lives and the root credentials used to reach it.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DbConfig {
    /// WebSocket address, e.g. `127.0.0.1:8000`.
    pub url: String,
    pub namespace: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "pipit".into(),
            database: "main".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("url", &self.url)
            .field("namespace", &self.namespace)
            .field("database", &self.database)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct Store<C: Connection> {
    users: SurrealUserRepository<C>,
    roles: SurrealRoleRepository<C>,
    posts: SurrealPostRepository<C>,
}

impl<C: Connection> Store<C> {
    /// Migrate an already selected namespace/database and wrap it.
    ///
    /// `passwords` hashes every account the user repository creates; login
    /// must verify with the same value.
    pub async fn attach(db: Surreal<C>, passwords: PasswordHashing) -> Result<Self, DbError> {
        run_migrations(&db).await?;
        Ok(Self {
            users: SurrealUserRepository::with_passwords(db.clone(), passwords),
            roles: SurrealRoleRepository::new(db.clone()),
            posts: SurrealPostRepository::new(db),
        })
    }

    pub fn users(&self) -> &SurrealUserRepository<C> {
        &self.users
    }

    pub fn roles(&self) -> &SurrealRoleRepository<C> {
        &self.roles
    }

    pub fn posts(&self) -> &SurrealPostRepository<C> {
        &self.posts
    }

    /// Create the administrator unless the username is already taken.
    pub async fn seed_admin(&self, seed: AdminSeed) -> PipitResult<SeedOutcome> {
        bootstrap::seed_admin(&self.users, &self.roles, seed).await
    }
}

impl Store<Client> {
    /// Open a WebSocket session as root, select the configured
    /// namespace and database, then migrate.
    pub async fn connect(config: &DbConfig, passwords: PasswordHashing) -> Result<Self, DbError> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(config.url.as_str()).await?;
        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;
        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        let store = Self::attach(db, passwords).await?;
        info!("SurrealDB store ready");
        Ok(store)
    }
}
