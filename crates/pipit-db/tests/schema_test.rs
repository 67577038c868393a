//! Integration tests for schema initialization using in-memory SurrealDB.

use pipit_core::models::role::Role;
use pipit_core::repository::RoleRepository;
use pipit_db::repository::SurrealRoleRepository;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

#[tokio::test]
async fn schema_migration_applies_successfully() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    pipit_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("INFO FOR DB").await.unwrap();
    let info: Option<surrealdb_types::Value> = result.take(0).unwrap();
    let info = info.expect("INFO FOR DB should return a value");
    let info_str = format!("{:?}", info);

    assert!(info_str.contains("user"), "missing user table");
    assert!(info_str.contains("role"), "missing role table");
    assert!(info_str.contains("post"), "missing post table");
    assert!(info_str.contains("counter"), "missing counter table");
    assert!(info_str.contains("has_role"), "missing has_role edge");
    assert!(info_str.contains("_migration"), "missing _migration table");
}

#[tokio::test]
async fn migrations_are_idempotent() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    pipit_db::run_migrations(&db).await.unwrap();
    pipit_db::run_migrations(&db).await.unwrap();

    let mut result = db.query("SELECT * FROM _migration").await.unwrap();
    let records: Vec<surrealdb_types::Value> = result.take(0).unwrap();
    assert_eq!(records.len(), 1, "expected exactly one migration record");
}

#[tokio::test]
async fn unique_index_prevents_duplicate_usernames() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    pipit_db::run_migrations(&db).await.unwrap();

    db.query("CREATE user SET username = 'alice', password_hash = 'x'")
        .await
        .unwrap()
        .check()
        .unwrap();

    let result = db
        .query("CREATE user SET username = 'alice', password_hash = 'y'")
        .await
        .unwrap()
        .check();

    assert!(result.is_err(), "duplicate username should be rejected");
}

#[tokio::test]
async fn roles_are_seeded_once() {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();

    pipit_db::run_migrations(&db).await.unwrap();
    pipit_db::run_migrations(&db).await.unwrap();

    let repo = SurrealRoleRepository::new(db);
    let roles = repo.list().await.unwrap();
    assert_eq!(roles, vec![Role::Admin, Role::Basic]);
}
