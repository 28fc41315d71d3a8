//! SeaORM repositories
//!
//! Each repository wraps a shared [`DatabaseConnection`] and exposes the
//! explicit query plans the services need. Uniqueness checks on business keys
//! happen here and surface as `AppError::Duplicate`.

pub mod channel;
pub mod group;
pub mod package;
pub mod tariff;
pub mod user;

pub use channel::ChannelRepository;
pub use group::GroupRepository;
pub use package::PackageRepository;
pub use tariff::TariffRepository;
pub use user::UserRepository;
