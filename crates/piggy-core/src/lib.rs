//! Domain layer for the Piggy client.
//!
//! Holds the types and traits shared by every other crate: the user profile,
//! the session record, the token store and remote API contracts, the shared
//! error type, password rules, and the configuration model.

pub mod auth;
pub mod config;
pub mod error;
pub mod password;
pub mod user;

// Re-export common error type
pub use error::PiggyError;
