//! Authorization relay
//!
//! Keeps the external authorization directory in step with local entitlement
//! changes. Strictly best-effort: local state is authoritative, and every
//! remote failure is logged and swallowed so the triggering catalog mutation
//! always succeeds. The directory is expected to converge on a later
//! successful create or update call.
//!
//! Per-user state is keyed on `auth_token_id`: present means the subscriber
//! has a remote token, absent means unsynced. An update for an unsynced
//! subscriber self-heals by creating instead.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clients::{AuthDirectoryApi, TokenCreate, TokenUpdate};
use crate::database::repositories::UserRepository;
use crate::entities::users::{self, UserStatus};
use crate::errors::AppResult;
use crate::services::entitlement::EntitlementResolver;

pub struct AuthRelay {
    directory: Arc<dyn AuthDirectoryApi>,
    resolver: Arc<EntitlementResolver>,
    users: UserRepository,
}

impl AuthRelay {
    pub fn new(
        directory: Arc<dyn AuthDirectoryApi>,
        resolver: Arc<EntitlementResolver>,
        users: UserRepository,
    ) -> Self {
        Self {
            directory,
            resolver,
            users,
        }
    }

    pub async fn on_create(&self, user: &users::Model) {
        if let Err(e) = self.sync_create(user).await {
            warn!(user_id = user.id, error = %e, "auth directory create failed; will retry on next update");
        }
    }

    pub async fn on_update(&self, user: &users::Model) {
        if let Err(e) = self.sync_update(user).await {
            warn!(user_id = user.id, error = %e, "auth directory update failed; local state kept");
        }
    }

    pub async fn on_delete(&self, user: &users::Model) {
        if let Some(token_id) = user.auth_token_id {
            if let Err(e) = self.directory.delete_token(token_id).await {
                warn!(user_id = user.id, token_id, error = %e, "auth directory delete failed");
            }
        }
    }

    /// Token regeneration is a delete-then-create, never an in-place rotation
    pub async fn on_token_regenerate(&self, user: &users::Model) {
        if let Some(token_id) = user.auth_token_id {
            if let Err(e) = self.directory.delete_token(token_id).await {
                warn!(user_id = user.id, token_id, error = %e, "auth directory delete of stale token failed");
            }
            if let Err(e) = self.users.set_auth_token_id(user.id, None).await {
                warn!(user_id = user.id, error = %e, "failed to clear stale auth token id");
                return;
            }
        }
        if let Err(e) = self.sync_create(user).await {
            warn!(user_id = user.id, error = %e, "auth directory recreate after token regeneration failed");
        }
    }

    async fn sync_create(&self, user: &users::Model) -> AppResult<()> {
        let allowed_streams = self.allowed_streams(user.id).await?;

        let payload = TokenCreate {
            token: user.token.clone(),
            user_id: user.agreement_number.clone(),
            status: map_status(user.status),
            max_sessions: user.max_sessions,
            valid_from: user.valid_from,
            valid_until: user.valid_until,
            allowed_streams,
            meta: Some(meta(user)),
        };

        let token_id = self.directory.create_token(&payload).await?;
        self.users.set_auth_token_id(user.id, Some(token_id)).await?;
        info!(user_id = user.id, token_id, "auth directory token created");
        Ok(())
    }

    async fn sync_update(&self, user: &users::Model) -> AppResult<()> {
        let Some(token_id) = user.auth_token_id else {
            // Never synced (or a previous create failed); self-heal
            return self.sync_create(user).await;
        };

        let allowed_streams = self.allowed_streams(user.id).await?;

        let payload = TokenUpdate {
            status: map_status(user.status),
            max_sessions: user.max_sessions,
            valid_from: user.valid_from,
            valid_until: user.valid_until,
            allowed_streams,
            meta: Some(meta(user)),
        };

        self.directory.update_token(token_id, &payload).await?;
        Ok(())
    }

    async fn allowed_streams(&self, user_id: i32) -> AppResult<Vec<String>> {
        Ok(self
            .resolver
            .resolve_channels(user_id)
            .await?
            .into_iter()
            .map(|channel| channel.stream_name)
            .collect())
    }
}

fn map_status(status: UserStatus) -> String {
    match status {
        UserStatus::Enabled => "active".to_string(),
        UserStatus::Disabled => "suspended".to_string(),
    }
}

fn meta(user: &users::Model) -> HashMap<String, String> {
    HashMap::from([
        ("first_name".to_string(), user.first_name.clone()),
        ("last_name".to_string(), user.last_name.clone()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::migrations::Migrator;
    use crate::database::repositories::user::UserCreateRequest;
    use crate::errors::AppError;
    use async_trait::async_trait;
    use sea_orm::DatabaseConnection;
    use sea_orm_migration::MigratorTrait;
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Create(Vec<String>),
        Update(i64, Vec<String>),
        Delete(i64),
    }

    struct FakeDirectory {
        calls: Mutex<Vec<Call>>,
        fail: Mutex<bool>,
        next_id: i64,
    }

    impl FakeDirectory {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                fail: Mutex::new(false),
                next_id: 77,
            })
        }

        fn set_failing(&self, failing: bool) {
            *self.fail.lock().unwrap() = failing;
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn check_failure(&self) -> AppResult<()> {
            if *self.fail.lock().unwrap() {
                Err(AppError::upstream("auth-directory", "unreachable"))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait]
    impl AuthDirectoryApi for FakeDirectory {
        async fn create_token(&self, payload: &TokenCreate) -> AppResult<i64> {
            self.check_failure()?;
            self.calls
                .lock()
                .unwrap()
                .push(Call::Create(payload.allowed_streams.clone()));
            Ok(self.next_id)
        }

        async fn update_token(&self, token_id: i64, payload: &TokenUpdate) -> AppResult<()> {
            self.check_failure()?;
            self.calls
                .lock()
                .unwrap()
                .push(Call::Update(token_id, payload.allowed_streams.clone()));
            Ok(())
        }

        async fn delete_token(&self, token_id: i64) -> AppResult<()> {
            self.check_failure()?;
            self.calls.lock().unwrap().push(Call::Delete(token_id));
            Ok(())
        }
    }

    async fn setup() -> (Arc<DatabaseConnection>, UserRepository, Arc<FakeDirectory>, AuthRelay) {
        let connection = sea_orm::Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&connection, None).await.unwrap();
        let connection = Arc::new(connection);

        let users = UserRepository::new(connection.clone());
        let directory = FakeDirectory::new();
        let relay = AuthRelay::new(
            directory.clone(),
            Arc::new(EntitlementResolver::new(connection.clone())),
            users.clone(),
        );

        (connection, users, directory, relay)
    }

    fn create_request(agreement: &str) -> UserCreateRequest {
        UserCreateRequest {
            first_name: "Jo".to_string(),
            last_name: "Doe".to_string(),
            agreement_number: agreement.to_string(),
            max_sessions: 2,
            status: UserStatus::Enabled,
            valid_from: None,
            valid_until: None,
            tariff_ids: vec![],
            package_ids: vec![],
            channel_ids: vec![],
        }
    }

    #[tokio::test]
    async fn create_stores_remote_token_id() {
        let (_conn, users, directory, relay) = setup().await;
        let user = users.create(create_request("A-1"), "tok".to_string()).await.unwrap();

        relay.on_create(&user).await;

        assert_eq!(directory.calls(), vec![Call::Create(vec![])]);
        let user = users.find_by_id(user.id).await.unwrap();
        assert_eq!(user.auth_token_id, Some(77));
    }

    #[tokio::test]
    async fn create_failure_leaves_user_unsynced_and_update_self_heals() {
        let (_conn, users, directory, relay) = setup().await;
        let user = users.create(create_request("A-1"), "tok".to_string()).await.unwrap();

        directory.set_failing(true);
        relay.on_create(&user).await;

        // Local row survives the remote failure with no remote id
        let user = users.find_by_id(user.id).await.unwrap();
        assert_eq!(user.auth_token_id, None);

        // A later update performs a create instead of an update
        directory.set_failing(false);
        relay.on_update(&user).await;

        assert_eq!(directory.calls(), vec![Call::Create(vec![])]);
        let user = users.find_by_id(user.id).await.unwrap();
        assert_eq!(user.auth_token_id, Some(77));
    }

    #[tokio::test]
    async fn update_uses_existing_remote_id() {
        let (_conn, users, directory, relay) = setup().await;
        let user = users.create(create_request("A-1"), "tok".to_string()).await.unwrap();
        relay.on_create(&user).await;

        let user = users.find_by_id(user.id).await.unwrap();
        relay.on_update(&user).await;

        assert_eq!(
            directory.calls(),
            vec![Call::Create(vec![]), Call::Update(77, vec![])]
        );
    }

    #[tokio::test]
    async fn delete_skips_remote_call_when_never_synced() {
        let (_conn, users, directory, relay) = setup().await;
        let user = users.create(create_request("A-1"), "tok".to_string()).await.unwrap();

        relay.on_delete(&user).await;
        assert!(directory.calls().is_empty());
    }

    #[tokio::test]
    async fn token_regeneration_is_delete_then_create() {
        let (_conn, users, directory, relay) = setup().await;
        let user = users.create(create_request("A-1"), "tok".to_string()).await.unwrap();
        relay.on_create(&user).await;

        let user = users.find_by_id(user.id).await.unwrap();
        relay.on_token_regenerate(&user).await;

        assert_eq!(
            directory.calls(),
            vec![Call::Create(vec![]), Call::Delete(77), Call::Create(vec![])]
        );
        let user = users.find_by_id(user.id).await.unwrap();
        assert_eq!(user.auth_token_id, Some(77));
    }
}
