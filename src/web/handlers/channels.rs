//! Channel catalog handlers
//!
//! Admin-facing channel browsing, curated-metadata editing, and the explicit
//! sync trigger. Media-sourced fields are read-only here; only the sync
//! engine writes them.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use serde::Deserialize;

use crate::database::repositories::channel::{ChannelListQuery, ChannelUpdateRequest};
use crate::entities::channels::SyncStatus;
use crate::web::{AppState, PaginatedResponse, handle_result};

#[derive(Debug, Deserialize)]
pub struct ChannelsQuery {
    pub search: Option<String>,
    pub group_id: Option<i32>,
    pub sync_status: Option<SyncStatus>,
    #[serde(default)]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

fn default_per_page() -> u64 {
    50
}

#[derive(Debug, Deserialize)]
pub struct UpdateChannelPayload {
    pub tvg_id: Option<String>,
    pub tvg_logo: Option<String>,
    pub channel_number: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct IdListPayload {
    #[serde(default)]
    pub ids: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderEntry {
    pub id: i32,
    pub sort_order: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReorderPayload {
    pub order: Vec<ReorderEntry>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub force: bool,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ChannelsQuery>,
) -> Response {
    let query = ChannelListQuery {
        search: params.search,
        group_id: params.group_id,
        sync_status: params.sync_status,
        page: params.page,
        per_page: params.per_page,
    };
    let result = state.channels.list(&query).await.map(|(items, total)| {
        PaginatedResponse::new(items, total, query.page, query.per_page)
    });
    handle_result(result)
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.channels.find_by_id(id).await)
}

/// Trigger a reconciliation run against the media server
pub async fn sync(State(state): State<AppState>) -> Response {
    handle_result(state.sync_engine.sync().await)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    axum::Json(payload): axum::Json<UpdateChannelPayload>,
) -> Response {
    let request = ChannelUpdateRequest {
        tvg_id: payload.tvg_id,
        tvg_logo: payload.tvg_logo,
        channel_number: payload.channel_number,
    };
    handle_result(state.channels.update_curated(id, request).await)
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<DeleteQuery>,
) -> Response {
    handle_result(state.channels.delete(id, params.force).await)
}

pub async fn set_groups(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    axum::Json(payload): axum::Json<IdListPayload>,
) -> Response {
    handle_result(state.channels.set_groups(id, &payload.ids).await)
}

pub async fn set_packages(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    axum::Json(payload): axum::Json<IdListPayload>,
) -> Response {
    handle_result(state.channels.set_packages(id, &payload.ids).await)
}

pub async fn reorder(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<ReorderPayload>,
) -> Response {
    let order: Vec<(i32, i32)> = payload
        .order
        .iter()
        .map(|entry| (entry.id, entry.sort_order))
        .collect();
    handle_result(state.channels.reorder(&order).await)
}

pub async fn cascade_info(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.channels.cascade_info(id).await)
}
