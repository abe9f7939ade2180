//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts where the API accepts one
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod contact;
pub mod notification;
pub mod user;
pub mod walk_session;
