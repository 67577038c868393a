//! Domain models for Pipit.
//!
//! These are the core types shared across all crates.

pub mod post;
pub mod role;
pub mod user;
