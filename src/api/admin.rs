// SPDX-License-Identifier: AGPL-3.0-or-later

//! Operator-only endpoints.
//!
//! Guarded by the [`Operator`] extractor; when no operator token is
//! configured the whole surface rejects. Address decryption lives here
//! and nowhere else.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::Operator,
    error::ShopError,
    models::{
        DecryptedAddressResponse, OrderStatusResponse, Product, UpdateOrderStatusRequest,
        UpsertProductRequest,
    },
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/v1/admin/products",
    request_body = UpsertProductRequest,
    tag = "Admin",
    responses((status = 201, body = Product))
)]
pub async fn upsert_product(
    State(state): State<AppState>,
    _operator: Operator,
    Json(request): Json<UpsertProductRequest>,
) -> Result<(StatusCode, Json<Product>), ShopError> {
    if request.name.trim().is_empty() {
        return Err(ShopError::validation("product name must not be empty"));
    }

    let product = Product {
        id: request.id.unwrap_or_else(Uuid::new_v4),
        name: request.name,
        description: request.description,
        price_cents: request.price_cents,
        stock: request.stock,
    };

    let stored = state
        .store
        .commit(move |doc| {
            doc.products.insert(product.id, product.clone());
            Ok(product)
        })
        .await?;

    tracing::info!(product = %stored.id, "catalog updated");
    Ok((StatusCode::CREATED, Json(stored)))
}

#[utoipa::path(
    put,
    path = "/v1/admin/orders/{id}/status",
    params(("id" = u64, Path, description = "Order id")),
    request_body = UpdateOrderStatusRequest,
    tag = "Admin",
    responses((status = 200, body = OrderStatusResponse))
)]
pub async fn update_order_status(
    State(state): State<AppState>,
    _operator: Operator,
    Path(order_id): Path<u64>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<OrderStatusResponse>, ShopError> {
    let response = state
        .store
        .commit(move |doc| {
            let order = doc
                .orders
                .iter_mut()
                .find(|order| order.id == order_id)
                .ok_or_else(|| ShopError::not_found("Order"))?;
            order.status = request.status;
            Ok(OrderStatusResponse::from(&*order))
        })
        .await?;

    tracing::info!(order = order_id, status = ?response.status, "order status updated");
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/v1/admin/orders/{id}/address/decrypt",
    params(("id" = u64, Path, description = "Order id")),
    tag = "Admin",
    responses((status = 200, body = DecryptedAddressResponse))
)]
pub async fn decrypt_address(
    State(state): State<AppState>,
    _operator: Operator,
    Path(order_id): Path<u64>,
) -> Result<Json<DecryptedAddressResponse>, ShopError> {
    let doc = state.store.snapshot().await;
    let order = doc
        .order(order_id)
        .ok_or_else(|| ShopError::not_found("Order"))?;

    let address = state.crypto.decrypt(&order.encrypted_address)?;

    Ok(Json(DecryptedAddressResponse { order_id, address }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;
    use crate::storage::StoragePaths;

    fn test_state() -> (tempfile::TempDir, AppState) {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::initialize(
            StoragePaths::new(dir.path()),
            Some("operator-token".into()),
        )
        .expect("state");
        (dir, state)
    }

    fn upsert_request(name: &str) -> UpsertProductRequest {
        UpsertProductRequest {
            id: None,
            name: name.to_string(),
            description: "desc".into(),
            price_cents: 4200,
            stock: 7,
        }
    }

    #[tokio::test]
    async fn upsert_creates_then_updates() {
        let (_dir, state) = test_state();

        let (status, Json(created)) = upsert_product(
            State(state.clone()),
            Operator,
            Json(upsert_request("Gadget")),
        )
        .await
        .expect("create");
        assert_eq!(status, StatusCode::CREATED);

        let (_, Json(updated)) = upsert_product(
            State(state.clone()),
            Operator,
            Json(UpsertProductRequest {
                id: Some(created.id),
                name: "Gadget v2".into(),
                description: "desc".into(),
                price_cents: 4300,
                stock: 9,
            }),
        )
        .await
        .expect("update");

        assert_eq!(updated.id, created.id);
        let doc = state.store.snapshot().await;
        assert_eq!(doc.products.len(), 1);
        assert_eq!(doc.products.get(&created.id).unwrap().name, "Gadget v2");
    }

    #[tokio::test]
    async fn status_update_on_missing_order_is_not_found() {
        let (_dir, state) = test_state();

        let result = update_order_status(
            State(state),
            Operator,
            Path(99),
            Json(UpdateOrderStatusRequest {
                status: OrderStatus::Shipped,
            }),
        )
        .await;

        assert!(matches!(result, Err(ShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn operator_decrypts_a_real_order_address() {
        use crate::checkout::CheckoutPipeline;
        use crate::models::{PaymentMethod, User, UserId};
        use chrono::Utc;

        let (_dir, state) = test_state();

        let user_id = UserId::from("admin-test-user");
        let seeded = User {
            user_id: user_id.clone(),
            country: "UK".into(),
            coupon: None,
            created_at: Utc::now(),
        };
        state
            .store
            .commit(move |doc| {
                doc.users.insert(seeded.user_id.clone(), seeded);
                Ok(())
            })
            .await
            .expect("seed user");

        let (_, Json(product)) = upsert_product(
            State(state.clone()),
            Operator,
            Json(upsert_request("Gadget")),
        )
        .await
        .expect("product");

        state.carts.add(&user_id, product.id, 1).await;
        let pipeline: &CheckoutPipeline = &state.checkout;
        pipeline.begin(&user_id).await.expect("begin");
        let confirmation = pipeline
            .submit(
                &user_id,
                crate::models::CheckoutAddressRequest {
                    address: "9 Harbour View".into(),
                    notes: String::new(),
                    payment_method: PaymentMethod::Btc,
                },
            )
            .await
            .expect("submit");

        let Json(decrypted) = decrypt_address(
            State(state),
            Operator,
            Path(confirmation.order_id),
        )
        .await
        .expect("decrypt");

        assert_eq!(decrypted.address, "9 Harbour View");
    }
}
