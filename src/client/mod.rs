//! Embeddable client for the SafeQuest post API: a cached feed of posts with
//! optimistic like/comment mutations reconciled against the server.

pub mod api;
pub mod feed;

pub use api::{ClientError, HttpPostApi, PostApi};
pub use feed::PostFeed;
