//! Tariff handlers

use axum::{
    extract::{Path, State},
    response::Response,
};
use serde::Deserialize;

use crate::web::{AppState, handle_result};

#[derive(Debug, Deserialize)]
pub struct CreateTariffPayload {
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub package_ids: Vec<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTariffPayload {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdListPayload {
    #[serde(default)]
    pub ids: Vec<i32>,
}

pub async fn list(State(state): State<AppState>) -> Response {
    handle_result(state.tariffs.find_all().await)
}

pub async fn get_one(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.tariffs.find_with_packages(id).await)
}

pub async fn create(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<CreateTariffPayload>,
) -> Response {
    let tariff = match state.tariffs.create(&payload.name, payload.description).await {
        Ok(tariff) => tariff,
        Err(error) => return handle_result::<()>(Err(error)),
    };
    if !payload.package_ids.is_empty() {
        if let Err(error) = state
            .tariffs
            .set_packages(tariff.id, &payload.package_ids)
            .await
        {
            return handle_result::<()>(Err(error));
        }
    }
    handle_result(Ok(tariff))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    axum::Json(payload): axum::Json<UpdateTariffPayload>,
) -> Response {
    handle_result(
        state
            .tariffs
            .update(id, payload.name, payload.description)
            .await,
    )
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i32>) -> Response {
    handle_result(state.tariffs.delete(id).await)
}

pub async fn set_packages(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    axum::Json(payload): axum::Json<IdListPayload>,
) -> Response {
    handle_result(state.tariffs.set_packages(id, &payload.ids).await)
}
