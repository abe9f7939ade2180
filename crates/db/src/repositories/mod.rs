//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods
//! that accept `&PgPool` as the first argument.

pub mod contact_repo;
pub mod notification_repo;
pub mod user_repo;
pub mod walk_session_repo;

pub use contact_repo::ContactRepo;
pub use notification_repo::NotificationRepo;
pub use user_repo::UserRepo;
pub use walk_session_repo::WalkSessionRepo;
