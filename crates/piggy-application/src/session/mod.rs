//! Authentication session services.
//!
//! [`SessionManager`] owns the signed-in user and the credential lifecycle:
//! startup restore with silent refresh, login, registration, logout and the
//! password flows.

mod manager;

pub use manager::{NOT_AUTHENTICATED, SessionManager};
