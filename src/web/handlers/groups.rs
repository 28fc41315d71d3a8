//! Channel group handlers

use axum::{
    extract::{Path, State},
    response::Response,
};
use serde::Deserialize;

use crate::web::{AppState, handle_result};

#[derive(Debug, Deserialize)]
pub struct CreateGroupPayload {
    pub name: String,
    #[serde(default)]
    pub sort_order: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGroupPayload {
    pub name: Option<String>,
    pub sort_order: Option<i32>,
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

pub async fn list(State(state): State<AppState>) -> Response {
    handle_result(state.groups.find_all().await)
}

pub async fn create(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateGroupPayload>,
) -> Response {
    handle_result(state.groups.create(&payload.name, payload.sort_order).await)
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    axum::Json(payload): axum::Json<UpdateGroupPayload>,
) -> Response {
    handle_result(state.groups.update(id, payload.name, payload.sort_order).await)
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.groups.delete(id).await)
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
    handle_result(state.groups.reorder(&order).await)
}
