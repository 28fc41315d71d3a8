use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create tables in order of dependencies
        self.create_channels_table(manager).await?;
        self.create_groups_table(manager).await?;
        self.create_packages_table(manager).await?;
        self.create_tariffs_table(manager).await?;
        self.create_users_table(manager).await?;
        self.create_channel_groups_table(manager).await?;
        self.create_package_channels_table(manager).await?;
        self.create_tariff_packages_table(manager).await?;
        self.create_user_channels_table(manager).await?;
        self.create_user_packages_table(manager).await?;
        self.create_user_tariffs_table(manager).await?;

        self.create_indexes(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(UserTariffs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserPackages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserChannels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(TariffPackages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PackageChannels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChannelGroups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Tariffs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Packages::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Groups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Channels::Table).to_owned())
            .await?;

        Ok(())
    }
}

impl Migration {
    async fn create_channels_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Channels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Channels::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Channels::StreamName)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Channels::TvgName).string_len(255))
                    .col(ColumnDef::new(Channels::DisplayName).string_len(255))
                    .col(ColumnDef::new(Channels::CatchupDays).integer())
                    .col(ColumnDef::new(Channels::TvgId).string_len(100))
                    .col(ColumnDef::new(Channels::TvgLogo).text())
                    .col(ColumnDef::new(Channels::ChannelNumber).integer())
                    .col(
                        ColumnDef::new(Channels::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Channels::SyncStatus)
                            .string_len(16)
                            .not_null()
                            .default("synced"),
                    )
                    .col(ColumnDef::new(Channels::LastSeenAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Channels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Channels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_groups_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Groups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Groups::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Groups::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Groups::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Groups::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Groups::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_packages_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Packages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Packages::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Packages::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Packages::Description).text())
                    .col(
                        ColumnDef::new(Packages::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Packages::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_tariffs_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tariffs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Tariffs::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Tariffs::Name)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Tariffs::Description).text())
                    .col(
                        ColumnDef::new(Tariffs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Tariffs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_users_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Users::AgreementNumber)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Status)
                            .string_len(16)
                            .not_null()
                            .default("enabled"),
                    )
                    .col(
                        ColumnDef::new(Users::MaxSessions)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Users::Token)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::AuthTokenId).big_integer())
                    .col(ColumnDef::new(Users::ValidFrom).timestamp_with_time_zone())
                    .col(ColumnDef::new(Users::ValidUntil).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_channel_groups_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChannelGroups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ChannelGroups::ChannelId).integer().not_null())
                    .col(ColumnDef::new(ChannelGroups::GroupId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ChannelGroups::ChannelId)
                            .col(ChannelGroups::GroupId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ChannelGroups::Table, ChannelGroups::ChannelId)
                            .to(Channels::Table, Channels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(ChannelGroups::Table, ChannelGroups::GroupId)
                            .to(Groups::Table, Groups::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_package_channels_table(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(PackageChannels::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PackageChannels::PackageId)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(PackageChannels::ChannelId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(PackageChannels::PackageId)
                            .col(PackageChannels::ChannelId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PackageChannels::Table, PackageChannels::PackageId)
                            .to(Packages::Table, Packages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(PackageChannels::Table, PackageChannels::ChannelId)
                            .to(Channels::Table, Channels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_tariff_packages_table(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TariffPackages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(TariffPackages::TariffId).integer().not_null())
                    .col(
                        ColumnDef::new(TariffPackages::PackageId)
                            .integer()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .col(TariffPackages::TariffId)
                            .col(TariffPackages::PackageId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TariffPackages::Table, TariffPackages::TariffId)
                            .to(Tariffs::Table, Tariffs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(TariffPackages::Table, TariffPackages::PackageId)
                            .to(Packages::Table, Packages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_user_channels_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserChannels::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserChannels::UserId).integer().not_null())
                    .col(ColumnDef::new(UserChannels::ChannelId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserChannels::UserId)
                            .col(UserChannels::ChannelId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserChannels::Table, UserChannels::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserChannels::Table, UserChannels::ChannelId)
                            .to(Channels::Table, Channels::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_user_packages_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserPackages::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserPackages::UserId).integer().not_null())
                    .col(ColumnDef::new(UserPackages::PackageId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserPackages::UserId)
                            .col(UserPackages::PackageId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserPackages::Table, UserPackages::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserPackages::Table, UserPackages::PackageId)
                            .to(Packages::Table, Packages::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_user_tariffs_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserTariffs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserTariffs::UserId).integer().not_null())
                    .col(ColumnDef::new(UserTariffs::TariffId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(UserTariffs::UserId)
                            .col(UserTariffs::TariffId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserTariffs::Table, UserTariffs::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(UserTariffs::Table, UserTariffs::TariffId)
                            .to(Tariffs::Table, Tariffs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_channels_sync_status")
                    .table(Channels::Table)
                    .col(Channels::SyncStatus)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_channels_tvg_id")
                    .table(Channels::Table)
                    .col(Channels::TvgId)
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_users_status")
                    .table(Users::Table)
                    .col(Users::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Channels {
    Table,
    Id,
    StreamName,
    TvgName,
    DisplayName,
    CatchupDays,
    TvgId,
    TvgLogo,
    ChannelNumber,
    SortOrder,
    SyncStatus,
    LastSeenAt,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Groups {
    Table,
    Id,
    Name,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Packages {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Tariffs {
    Table,
    Id,
    Name,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    FirstName,
    LastName,
    AgreementNumber,
    Status,
    MaxSessions,
    Token,
    AuthTokenId,
    ValidFrom,
    ValidUntil,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ChannelGroups {
    Table,
    ChannelId,
    GroupId,
}

#[derive(DeriveIden)]
enum PackageChannels {
    Table,
    PackageId,
    ChannelId,
}

#[derive(DeriveIden)]
enum TariffPackages {
    Table,
    TariffId,
    PackageId,
}

#[derive(DeriveIden)]
enum UserChannels {
    Table,
    UserId,
    ChannelId,
}

#[derive(DeriveIden)]
enum UserTariffs {
    Table,
    UserId,
    TariffId,
}

#[derive(DeriveIden)]
enum UserPackages {
    Table,
    UserId,
    PackageId,
}
