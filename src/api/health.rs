// SPDX-License-Identifier: AGPL-3.0-or-later

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::AppState;

/// Liveness and store-reachability report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    /// Number of registered users (proves the store document loads).
    pub users: usize,
    pub products: usize,
    pub orders: usize,
}

#[utoipa::path(
    get,
    path = "/v1/health",
    tag = "Health",
    responses((status = 200, body = HealthResponse))
)]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let doc = state.store.snapshot().await;
    Json(HealthResponse {
        status: "ok".to_string(),
        users: doc.users.len(),
        products: doc.products.len(),
        orders: doc.orders.len(),
    })
}
