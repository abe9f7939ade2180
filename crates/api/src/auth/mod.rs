//! Caller identity primitives.
//!
//! Tokens are issued by the authentication service; this crate only needs
//! to validate them (and to mint them for local tooling and tests).
//!
//! - [`jwt`] -- JWT access-token generation and validation.

pub mod jwt;
