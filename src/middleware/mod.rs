pub mod actor;
pub mod not_found;
