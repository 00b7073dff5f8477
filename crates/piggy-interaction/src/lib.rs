//! Remote collaborators for the Piggy client.
//!
//! Currently the HTTP implementation of the authentication API.

pub mod envelope;
pub mod http_auth_api;

pub use http_auth_api::HttpAuthApi;
