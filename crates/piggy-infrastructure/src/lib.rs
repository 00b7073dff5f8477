//! Infrastructure layer for the Piggy client.
//!
//! Concrete token stores, path resolution, and configuration loading.

pub mod config_service;
pub mod file_token_store;
pub mod memory_token_store;
pub mod paths;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::file_token_store::FileTokenStore;
pub use crate::memory_token_store::MemoryTokenStore;
pub use crate::paths::PiggyPaths;
