//! Emergency alert delivery.
//!
//! The [`PanicDispatcher`] turns one panic into a deduplicated set of
//! guardian notifications.

pub mod dispatcher;

pub use dispatcher::{PanicDispatcher, PanicOutcome};
