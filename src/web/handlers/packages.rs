//! Channel package handlers

use axum::{
    extract::{Path, State},
    response::Response,
};
use serde::Deserialize;

use crate::web::{AppState, handle_result};

#[derive(Debug, Deserialize)]
pub struct CreatePackagePayload {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub channel_ids: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePackagePayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdListPayload {
    #[serde(default)]
    pub ids: Vec<i32>,
}

pub async fn list(State(state): State<AppState>) -> Response {
    handle_result(state.packages.find_all().await)
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.packages.find_with_channels(id).await)
}

pub async fn create(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreatePackagePayload>,
) -> Response {
    let package = match state
        .packages
        .create(&payload.name, payload.description)
        .await
    {
        Ok(package) => package,
        Err(error) => return handle_result::<()>(Err(error)),
    };
    if !payload.channel_ids.is_empty() {
        if let Err(error) = state
            .packages
            .set_channels(package.id, &payload.channel_ids)
            .await
        {
            return handle_result::<()>(Err(error));
        }
    }
    handle_result(Ok(package))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    axum::Json(payload): axum::Json<UpdatePackagePayload>,
) -> Response {
    handle_result(
        state
            .packages
            .update(id, payload.name, payload.description)
            .await,
    )
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.packages.delete(id).await)
}

pub async fn set_channels(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    axum::Json(payload): axum::Json<IdListPayload>,
) -> Response {
    handle_result(state.packages.set_channels(id, &payload.ids).await)
}
