//! Application layer for the Piggy client.
//!
//! This crate provides the use cases that coordinate the remote auth API
//! with the token stores.

pub mod session;

pub use session::SessionManager;
