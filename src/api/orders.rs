// SPDX-License-Identifier: AGPL-3.0-or-later

//! Order tracking endpoints.
//!
//! All lookups go through [`crate::orders::OrderTracker`], which enforces
//! ownership; a non-owner probing an order id sees a plain not-found.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::{
    auth::AuthenticatedUser,
    error::ShopError,
    models::OrderStatusResponse,
    state::AppState,
};

#[utoipa::path(
    get,
    path = "/v1/orders",
    tag = "Orders",
    responses((status = 200, body = [OrderStatusResponse]))
)]
pub async fn list_orders(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Json<Vec<OrderStatusResponse>> {
    Json(state.orders.history(&auth.user_id).await)
}

#[utoipa::path(
    get,
    path = "/v1/orders/{id}",
    params(("id" = u64, Path, description = "Order id")),
    tag = "Orders",
    responses(
        (status = 200, body = OrderStatusResponse),
        (status = 404, description = "No such order")
    )
)]
pub async fn get_order(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(order_id): Path<u64>,
) -> Result<Json<OrderStatusResponse>, ShopError> {
    let status = state.orders.status(order_id, &auth.user_id).await?;
    Ok(Json(status))
}

#[utoipa::path(
    get,
    path = "/v1/orders/{id}/address",
    params(("id" = u64, Path, description = "Order id")),
    tag = "Orders",
    responses(
        (status = 200, description = "Armored encrypted-address artifact"),
        (status = 404, description = "No such order")
    )
)]
pub async fn download_address(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(order_id): Path<u64>,
) -> Result<Response, ShopError> {
    let (filename, artifact) = state
        .orders
        .export_encrypted_address(order_id, &auth.user_id)
        .await?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        artifact,
    )
        .into_response())
}
