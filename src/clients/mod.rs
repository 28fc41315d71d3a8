//! HTTP clients for external collaborators
//!
//! Both clients sit behind `async_trait` seams so the sync engine and the
//! authorization relay can be exercised against mocks.

pub mod auth_directory;
pub mod media_server;

pub use auth_directory::{AuthDirectoryApi, HttpAuthDirectoryClient, TokenCreate, TokenUpdate};
pub use media_server::{HttpMediaServerClient, MediaServerApi, MediaStream};
