//! Subscriber repository
//!
//! Owns subscriber CRUD, grant replacement and the `auth_token_id` column.
//! Callers pass freshly generated tokens in; token material is never invented
//! here.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
    sea_query::Condition,
};
use std::sync::Arc;

use crate::entities::{
    prelude::{UserChannels, UserPackages, UserTariffs, Users},
    user_channels, user_packages, user_tariffs, users,
    users::UserStatus,
};
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct UserCreateRequest {
    pub first_name: String,
    pub last_name: String,
    pub agreement_number: String,
    pub max_sessions: i32,
    pub status: UserStatus,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub tariff_ids: Vec<i32>,
    pub package_ids: Vec<i32>,
    pub channel_ids: Vec<i32>,
}

/// Partial update; `None` leaves a field unchanged. The validity window is
/// cleared explicitly via the `clear_*` flags.
#[derive(Debug, Clone, Default)]
pub struct UserUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub agreement_number: Option<String>,
    pub max_sessions: Option<i32>,
    pub status: Option<UserStatus>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    pub clear_valid_from: bool,
    pub clear_valid_until: bool,
    pub tariff_ids: Option<Vec<i32>>,
    pub package_ids: Option<Vec<i32>>,
    pub channel_ids: Option<Vec<i32>>,
}

#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    pub page: u64,
    pub per_page: u64,
}

/// A subscriber together with its current grant id lists
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserWithGrants {
    #[serde(flatten)]
    pub user: users::Model,
    pub tariff_ids: Vec<i32>,
    pub package_ids: Vec<i32>,
    pub channel_ids: Vec<i32>,
}

#[derive(Clone)]
pub struct UserRepository {
    connection: Arc<DatabaseConnection>,
}

impl UserRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<users::Model> {
        Users::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| AppError::not_found("user", id))
    }

    pub async fn find_by_agreement(&self, agreement_number: &str) -> AppResult<Option<users::Model>> {
        Ok(Users::find()
            .filter(users::Column::AgreementNumber.eq(agreement_number))
            .one(&*self.connection)
            .await?)
    }

    pub async fn find_all(&self) -> AppResult<Vec<users::Model>> {
        Ok(Users::find()
            .order_by_asc(users::Column::Id)
            .all(&*self.connection)
            .await?)
    }

    pub async fn find_with_grants(&self, id: i32) -> AppResult<UserWithGrants> {
        let user = self.find_by_id(id).await?;
        let (tariff_ids, package_ids, channel_ids) = self.grant_ids(id).await?;
        Ok(UserWithGrants {
            user,
            tariff_ids,
            package_ids,
            channel_ids,
        })
    }

    pub async fn list(&self, query: &UserListQuery) -> AppResult<(Vec<users::Model>, u64)> {
        let mut select = Users::find();

        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{search}%");
            select = select.filter(
                Condition::any()
                    .add(users::Column::FirstName.like(&pattern))
                    .add(users::Column::LastName.like(&pattern))
                    .add(users::Column::AgreementNumber.like(&pattern)),
            );
        }

        if let Some(status) = query.status {
            select = select.filter(users::Column::Status.eq(status));
        }

        let select = select
            .order_by_asc(users::Column::LastName)
            .order_by_asc(users::Column::FirstName)
            .order_by_asc(users::Column::Id);

        let per_page = query.per_page.clamp(1, 500);
        let paginator = select.paginate(&*self.connection, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(query.page).await?;

        Ok((items, total))
    }

    pub async fn create(&self, request: UserCreateRequest, token: String) -> AppResult<users::Model> {
        self.check_agreement_unique(&request.agreement_number, None)
            .await?;

        let now = Utc::now();
        let active = users::ActiveModel {
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            agreement_number: Set(request.agreement_number),
            status: Set(request.status),
            max_sessions: Set(request.max_sessions),
            token: Set(token),
            auth_token_id: Set(None),
            valid_from: Set(request.valid_from),
            valid_until: Set(request.valid_until),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let user = active.insert(&*self.connection).await?;

        self.set_tariffs(user.id, &request.tariff_ids).await?;
        self.set_packages(user.id, &request.package_ids).await?;
        self.set_channels(user.id, &request.channel_ids).await?;

        Ok(user)
    }

    pub async fn update(&self, id: i32, request: UserUpdateRequest) -> AppResult<users::Model> {
        let user = self.find_by_id(id).await?;

        if let Some(agreement) = request.agreement_number.as_deref() {
            if agreement != user.agreement_number {
                self.check_agreement_unique(agreement, Some(id)).await?;
            }
        }

        let mut active: users::ActiveModel = user.into();
        if let Some(first_name) = request.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = request.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(agreement_number) = request.agreement_number {
            active.agreement_number = Set(agreement_number);
        }
        if let Some(max_sessions) = request.max_sessions {
            active.max_sessions = Set(max_sessions);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if let Some(valid_from) = request.valid_from {
            active.valid_from = Set(Some(valid_from));
        } else if request.clear_valid_from {
            active.valid_from = Set(None);
        }
        if let Some(valid_until) = request.valid_until {
            active.valid_until = Set(Some(valid_until));
        } else if request.clear_valid_until {
            active.valid_until = Set(None);
        }
        active.updated_at = Set(Utc::now());
        let user = active.update(&*self.connection).await?;

        if let Some(tariff_ids) = request.tariff_ids {
            self.set_tariffs(id, &tariff_ids).await?;
        }
        if let Some(package_ids) = request.package_ids {
            self.set_packages(id, &package_ids).await?;
        }
        if let Some(channel_ids) = request.channel_ids {
            self.set_channels(id, &channel_ids).await?;
        }

        Ok(user)
    }

    /// Delete a subscriber, returning the removed row so the authorization
    /// relay can clean up the remote token
    pub async fn delete(&self, id: i32) -> AppResult<users::Model> {
        let user = self.find_by_id(id).await?;
        Users::delete_by_id(id).exec(&*self.connection).await?;
        Ok(user)
    }

    /// Swap in a freshly generated token
    pub async fn replace_token(&self, id: i32, token: String) -> AppResult<users::Model> {
        let user = self.find_by_id(id).await?;
        let mut active: users::ActiveModel = user.into();
        active.token = Set(token);
        active.updated_at = Set(Utc::now());
        Ok(active.update(&*self.connection).await?)
    }

    pub async fn set_auth_token_id(&self, id: i32, auth_token_id: Option<i64>) -> AppResult<()> {
        let user = self.find_by_id(id).await?;
        let mut active: users::ActiveModel = user.into();
        active.auth_token_id = Set(auth_token_id);
        active.updated_at = Set(Utc::now());
        active.update(&*self.connection).await?;
        Ok(())
    }

    pub async fn count(&self) -> AppResult<u64> {
        Ok(Users::find().count(&*self.connection).await?)
    }

    async fn grant_ids(&self, user_id: i32) -> AppResult<(Vec<i32>, Vec<i32>, Vec<i32>)> {
        let tariff_ids = UserTariffs::find()
            .filter(user_tariffs::Column::UserId.eq(user_id))
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(|row| row.tariff_id)
            .collect();
        let package_ids = UserPackages::find()
            .filter(user_packages::Column::UserId.eq(user_id))
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(|row| row.package_id)
            .collect();
        let channel_ids = UserChannels::find()
            .filter(user_channels::Column::UserId.eq(user_id))
            .all(&*self.connection)
            .await?
            .into_iter()
            .map(|row| row.channel_id)
            .collect();

        Ok((tariff_ids, package_ids, channel_ids))
    }

    async fn set_tariffs(&self, user_id: i32, tariff_ids: &[i32]) -> AppResult<()> {
        UserTariffs::delete_many()
            .filter(user_tariffs::Column::UserId.eq(user_id))
            .exec(&*self.connection)
            .await?;
        if !tariff_ids.is_empty() {
            let rows = tariff_ids.iter().map(|tariff_id| user_tariffs::ActiveModel {
                user_id: Set(user_id),
                tariff_id: Set(*tariff_id),
            });
            UserTariffs::insert_many(rows).exec(&*self.connection).await?;
        }
        Ok(())
    }

    async fn set_packages(&self, user_id: i32, package_ids: &[i32]) -> AppResult<()> {
        UserPackages::delete_many()
            .filter(user_packages::Column::UserId.eq(user_id))
            .exec(&*self.connection)
            .await?;
        if !package_ids.is_empty() {
            let rows = package_ids.iter().map(|package_id| user_packages::ActiveModel {
                user_id: Set(user_id),
                package_id: Set(*package_id),
            });
            UserPackages::insert_many(rows).exec(&*self.connection).await?;
        }
        Ok(())
    }

    async fn set_channels(&self, user_id: i32, channel_ids: &[i32]) -> AppResult<()> {
        UserChannels::delete_many()
            .filter(user_channels::Column::UserId.eq(user_id))
            .exec(&*self.connection)
            .await?;
        if !channel_ids.is_empty() {
            let rows = channel_ids.iter().map(|channel_id| user_channels::ActiveModel {
                user_id: Set(user_id),
                channel_id: Set(*channel_id),
            });
            UserChannels::insert_many(rows).exec(&*self.connection).await?;
        }
        Ok(())
    }

    async fn check_agreement_unique(&self, agreement: &str, exclude_id: Option<i32>) -> AppResult<()> {
        let mut select = Users::find().filter(users::Column::AgreementNumber.eq(agreement));
        if let Some(id) = exclude_id {
            select = select.filter(users::Column::Id.ne(id));
        }
        if select.one(&*self.connection).await?.is_some() {
            return Err(AppError::duplicate("agreement number", agreement));
        }
        Ok(())
    }
}
