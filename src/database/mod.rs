pub mod db;

pub use db::connect_to_mongo;

/// Name of the application database on the shared Mongo deployment.
pub const DB_NAME: &str = "safequest";
