// SPDX-License-Identifier: AGPL-3.0-or-later

//! Registration and profile endpoints.
//!
//! Registration is idempotent: re-sending an already-registered phrase is
//! a "welcome back", never an error and never a second account.

use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;

use crate::{
    auth::{AuthenticatedUser, SecretPhrase},
    checkout::COUPON_CODE,
    error::ShopError,
    models::{RegisterRequest, RegisterResponse, UpdateCountryRequest, User},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/v1/users/register",
    request_body = RegisterRequest,
    tag = "Users",
    responses(
        (status = 201, body = RegisterResponse),
        (status = 200, body = RegisterResponse, description = "Phrase already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ShopError> {
    let phrase = request.secret_phrase.trim();
    if phrase.is_empty() {
        return Err(ShopError::validation("secret_phrase must not be empty"));
    }
    let country = request.country.trim().to_string();
    if country.is_empty() {
        return Err(ShopError::validation("country must not be empty"));
    }

    let user_id = SecretPhrase::new(phrase).derive_user_id();

    let response = state
        .store
        .commit(move |doc| {
            if let Some(existing) = doc.users.get(&user_id) {
                return Ok(RegisterResponse {
                    user_id: existing.user_id.clone(),
                    country: existing.country.clone(),
                    returning: true,
                });
            }

            let user = User {
                user_id: user_id.clone(),
                country: country.clone(),
                coupon: None,
                created_at: Utc::now(),
            };
            doc.users.insert(user_id.clone(), user);

            Ok(RegisterResponse {
                user_id,
                country,
                returning: false,
            })
        })
        .await?;

    let status = if response.returning {
        StatusCode::OK
    } else {
        tracing::info!(user = %response.user_id, "user registered");
        StatusCode::CREATED
    };

    Ok((status, Json(response)))
}

#[utoipa::path(
    put,
    path = "/v1/users/country",
    request_body = UpdateCountryRequest,
    tag = "Users",
    responses((status = 200, body = User))
)]
pub async fn update_country(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<UpdateCountryRequest>,
) -> Result<Json<User>, ShopError> {
    let country = request.country.trim().to_string();
    if country.is_empty() {
        return Err(ShopError::validation("country must not be empty"));
    }

    let user = state
        .store
        .commit(move |doc| {
            let user = doc
                .users
                .get_mut(&auth.user_id)
                .ok_or_else(|| ShopError::not_found("User"))?;
            user.country = country;
            Ok(user.clone())
        })
        .await?;

    Ok(Json(user))
}

#[utoipa::path(
    post,
    path = "/v1/users/coupon",
    tag = "Users",
    responses((status = 200, body = User))
)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<User>, ShopError> {
    let user = state
        .store
        .commit(move |doc| {
            let user = doc
                .users
                .get_mut(&auth.user_id)
                .ok_or_else(|| ShopError::not_found("User"))?;
            user.coupon = Some(COUPON_CODE.to_string());
            Ok(user.clone())
        })
        .await?;

    Ok(Json(user))
}
