//! SafeWalk domain logic.
//!
//! Pure types and functions shared by the persistence and HTTP layers. No
//! I/O happens in this crate.

pub mod contacts;
pub mod error;
pub mod geo;
pub mod guardian;
pub mod identity;
pub mod notification;
pub mod panic_alert;
pub mod types;
pub mod walk;
