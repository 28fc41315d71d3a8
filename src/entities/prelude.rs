pub use super::channel_groups::Entity as ChannelGroups;
pub use super::channels::Entity as Channels;
pub use super::groups::Entity as Groups;
pub use super::package_channels::Entity as PackageChannels;
pub use super::packages::Entity as Packages;
pub use super::tariff_packages::Entity as TariffPackages;
pub use super::tariffs::Entity as Tariffs;
pub use super::user_channels::Entity as UserChannels;
pub use super::user_packages::Entity as UserPackages;
pub use super::user_tariffs::Entity as UserTariffs;
pub use super::users::Entity as Users;
