pub mod auth;
pub mod reviews;
