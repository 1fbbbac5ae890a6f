// SPDX-License-Identifier: AGPL-3.0-or-later

//! Checkout endpoints.
//!
//! Two-step flow mirroring the pipeline: trigger opens the session and
//! asks for the address, address submission completes it. The plaintext
//! address only passes through the submit handler into the pipeline.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::AuthenticatedUser,
    error::ShopError,
    models::{CheckoutAddressRequest, OrderConfirmation},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/v1/checkout",
    tag = "Checkout",
    responses(
        (status = 202, description = "Checkout started; submit the delivery address"),
        (status = 422, description = "Cart is empty")
    )
)]
pub async fn trigger(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<StatusCode, ShopError> {
    state.checkout.begin(&auth.user_id).await?;
    Ok(StatusCode::ACCEPTED)
}

#[utoipa::path(
    post,
    path = "/v1/checkout/address",
    request_body = CheckoutAddressRequest,
    tag = "Checkout",
    responses(
        (status = 201, body = OrderConfirmation),
        (status = 422, description = "No checkout awaiting an address")
    )
)]
pub async fn submit_address(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<CheckoutAddressRequest>,
) -> Result<(StatusCode, Json<OrderConfirmation>), ShopError> {
    if request.address.trim().is_empty() {
        return Err(ShopError::validation("address must not be empty"));
    }

    let confirmation = state.checkout.submit(&auth.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(confirmation)))
}
