//! Request extractors.
//!
//! - [`auth::AuthUser`] -- requires a valid Bearer token.
//! - [`auth::MaybeAuthUser`] -- accepts anonymous requests, rejects bad tokens.

pub mod auth;
