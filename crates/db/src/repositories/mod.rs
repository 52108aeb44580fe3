//! Repository structs, one per table. Each is a zero-sized type whose
//! associated functions take the pool explicitly.

mod review_repo;
mod session_repo;
mod user_repo;

pub use review_repo::ReviewRepo;
pub use session_repo::SessionRepo;
pub use user_repo::UserRepo;
