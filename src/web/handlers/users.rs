//! Subscriber handlers
//!
//! Subscriber mutations commit locally first, then hand the committed row to
//! the authorization relay on a spawned task. Remote directory latency or
//! failure never affects the HTTP response.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tokio::spawn;

use crate::database::repositories::user::{
    UserCreateRequest, UserListQuery, UserUpdateRequest,
};
use crate::entities::users::UserStatus;
use crate::utils::token::generate_token;
use crate::web::{AppState, PaginatedResponse, handle_result};

#[derive(Debug, Deserialize)]
pub struct UsersQuery {
    pub search: Option<String>,
    pub status: Option<UserStatus>,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_per_page() -> u64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct CreateUserPayload {
    pub first_name: String,
    pub last_name: String,
    pub agreement_number: String,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: i32,
    #[serde(default = "default_status")]
    pub status: UserStatus,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tariff_ids: Vec<i32>,
    #[serde(default)]
    pub package_ids: Vec<i32>,
    #[serde(default)]
    pub channel_ids: Vec<i32>,
}

fn default_max_sessions() -> i32 {
    1
}

fn default_status() -> UserStatus {
    UserStatus::Enabled
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub agreement_number: Option<String>,
    pub max_sessions: Option<i32>,
    pub status: Option<UserStatus>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_until: Option<DateTime<Utc>>,
    #[serde(default)]
    pub clear_valid_from: bool,
    #[serde(default)]
    pub clear_valid_until: bool,
    pub tariff_ids: Option<Vec<i32>>,
    pub package_ids: Option<Vec<i32>>,
    pub channel_ids: Option<Vec<i32>>,
}

pub async fn list(State(state): State<AppState>, Query(params): Query<UsersQuery>) -> Response {
    let query = UserListQuery {
        search: params.search,
        status: params.status,
        page: params.page,
        per_page: params.per_page,
    };
    let result = state.users.list(&query).await.map(|(items, total)| {
        PaginatedResponse::new(items, total, query.page, query.per_page)
    });
    handle_result(result)
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.users.find_with_grants(id).await)
}

pub async fn create(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateUserPayload>,
) -> Response {
    if payload.agreement_number.trim().is_empty() {
        return handle_result::<()>(Err(crate::errors::AppError::validation(
            "agreement number must not be empty",
        )));
    }

    let request = UserCreateRequest {
        first_name: payload.first_name,
        last_name: payload.last_name,
        agreement_number: payload.agreement_number,
        max_sessions: payload.max_sessions,
        status: payload.status,
        valid_from: payload.valid_from,
        valid_until: payload.valid_until,
        tariff_ids: payload.tariff_ids,
        package_ids: payload.package_ids,
        channel_ids: payload.channel_ids,
    };

    let token = generate_token(state.config.playlist.token_length);
    let result = state.users.create(request, token).await;

    if let Ok(user) = &result {
        let relay = state.relay.clone();
        let user = user.clone();
        spawn(async move { relay.on_create(&user).await });
    }

    handle_result(result)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    axum::Json(payload): axum::Json<UpdateUserPayload>,
) -> Response {
    let request = UserUpdateRequest {
        first_name: payload.first_name,
        last_name: payload.last_name,
        agreement_number: payload.agreement_number,
        max_sessions: payload.max_sessions,
        status: payload.status,
        valid_from: payload.valid_from,
        valid_until: payload.valid_until,
        clear_valid_from: payload.clear_valid_from,
        clear_valid_until: payload.clear_valid_until,
        tariff_ids: payload.tariff_ids,
        package_ids: payload.package_ids,
        channel_ids: payload.channel_ids,
    };

    let result = state.users.update(id, request).await;

    if let Ok(user) = &result {
        let relay = state.relay.clone();
        let user = user.clone();
        spawn(async move { relay.on_update(&user).await });
    }

    handle_result(result)
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let result = state.users.delete(id).await;

    if let Ok(user) = &result {
        let relay = state.relay.clone();
        let user = user.clone();
        spawn(async move { relay.on_delete(&user).await });
    }

    handle_result(result.map(|_| ()))
}

/// Issue a fresh streaming token, invalidating the previous one
pub async fn regenerate_token(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    let token = generate_token(state.config.playlist.token_length);
    let result = state.users.replace_token(id, token).await;

    if let Ok(user) = &result {
        let relay = state.relay.clone();
        let user = user.clone();
        spawn(async move { relay.on_token_regenerate(&user).await });
    }

    handle_result(result)
}

/// The channels this subscriber is entitled to, in playlist order
pub async fn resolved_channels(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.resolver.resolve_channels_with_groups(id).await)
}
