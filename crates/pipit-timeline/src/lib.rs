//! Pipit Timeline: feed assembly and post mutations on behalf of an
//! authenticated subject.

pub mod feed;
pub mod posts;
pub mod service;

pub use feed::{FeedAssembler, FeedEntry, FeedPage, FeedQuery};
pub use posts::PostService;
pub use service::TimelineService;
