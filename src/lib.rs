//! SafeQuest backend: a REST layer over MongoDB for a small educational blog
//! (posts, likes, comments) plus user accounts, and an embeddable client
//! (`client`) that keeps an optimistically-updated local feed reconciled
//! against the server.

pub mod client;
pub mod database;
pub mod middleware;
pub mod post;
pub mod router;
pub mod user;
pub mod utils;
