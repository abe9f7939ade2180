//! Request handlers.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers delegate to the corresponding repository in `safewalk_db`, run
//! domain rules from `safewalk_core`, and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod contact;
pub mod notification;
pub mod walk;
