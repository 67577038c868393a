//! Pipit Core: Shared domain types, repository traits, and the
//! authorization core.
//!
//! This crate has no storage or transport dependencies. Persistence is
//! expressed through the traits in [`repository`]; `pipit-db` provides
//! the SurrealDB implementations.

pub mod error;
pub mod identity;
pub mod models;
pub mod password;
pub mod policy;
pub mod repository;
