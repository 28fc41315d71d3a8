//! SeaORM entity definitions for the subscriber entitlement catalog

pub mod channel_groups;
pub mod channels;
pub mod groups;
pub mod package_channels;
pub mod packages;
pub mod tariff_packages;
pub mod tariffs;
pub mod user_channels;
pub mod user_packages;
pub mod user_tariffs;
pub mod users;

pub mod prelude;
