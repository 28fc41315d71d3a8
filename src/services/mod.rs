//! Business logic services
//!
//! The four core subsystems: catalog synchronization, entitlement
//! resolution, playlist encoding, and the best-effort authorization relay.

pub mod auth_relay;
pub mod channel_sync;
pub mod entitlement;
pub mod playlist;

pub use auth_relay::AuthRelay;
pub use channel_sync::{ChannelSyncEngine, SyncReport};
pub use entitlement::EntitlementResolver;
pub use playlist::PlaylistCodec;
