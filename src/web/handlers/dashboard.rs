//! Dashboard summary handler

use axum::{extract::State, response::Response};
use serde::Serialize;

use crate::errors::AppResult;
use crate::web::{AppState, handle_result};

#[derive(Debug, Serialize)]
pub struct DashboardCounts {
    pub channels: u64,
    pub groups: u64,
    pub packages: u64,
    pub tariffs: u64,
    pub users: u64,
}

pub async fn counts(State(state): State<AppState>) -> Response {
    handle_result(gather(&state).await)
}

async fn gather(state: &AppState) -> AppResult<DashboardCounts> {
    Ok(DashboardCounts {
        channels: state.channels.count().await?,
        groups: state.groups.count().await?,
        packages: state.packages.count().await?,
        tariffs: state.tariffs.count().await?,
        users: state.users.count().await?,
    })
}
