// SPDX-License-Identifier: AGPL-3.0-or-later

//! Public catalog listing.

use axum::{extract::State, Json};

use crate::{models::Product, state::AppState};

#[utoipa::path(
    get,
    path = "/v1/products",
    tag = "Catalog",
    responses((status = 200, body = [Product]))
)]
pub async fn list_products(State(state): State<AppState>) -> Json<Vec<Product>> {
    let doc = state.store.snapshot().await;
    Json(doc.products.values().cloned().collect())
}
