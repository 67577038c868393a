//! SurrealDB repository implementations.

mod post;
mod role;
mod user;

pub use post::SurrealPostRepository;
pub use role::SurrealRoleRepository;
pub use user::SurrealUserRepository;
