//! Pipit Database: the SurrealDB store behind the `pipit-core`
//! repository traits.
//!
//! This crate provides:
//! - The migrated store and its repositories ([`Store`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Repository implementations of the `pipit-core` traits ([`repository`])
//! - First-boot admin seeding ([`bootstrap`])
//! - Error types ([`DbError`])

pub mod bootstrap;
mod error;
pub mod repository;
mod schema;
mod store;

pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
pub use store::{DbConfig, Store};
