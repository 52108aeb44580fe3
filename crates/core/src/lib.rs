//! Domain logic for ReviewGlobe.
//!
//! This crate has no I/O and no internal dependencies so that the database,
//! store and API layers can all share the same validation rules and the
//! filter/search engine.

pub mod error;
pub mod image;
pub mod review;
pub mod search;
pub mod types;
