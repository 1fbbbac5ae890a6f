// SPDX-License-Identifier: AGPL-3.0-or-later

//! Cart endpoints.
//!
//! The cart itself holds only product ids and quantities; every view is
//! priced fresh against the current catalog. Lines whose product has been
//! removed from the catalog are skipped rather than priced at zero.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::AuthenticatedUser,
    error::ShopError,
    models::{AddCartItemRequest, CartLine, CartView},
    state::AppState,
};

async fn cart_view(state: &AppState, auth: &AuthenticatedUser) -> CartView {
    let items = state.carts.items(&auth.user_id).await;
    let doc = state.store.snapshot().await;

    let mut lines = Vec::with_capacity(items.len());
    let mut subtotal_cents = 0u64;
    for item in items {
        let Some(product) = doc.products.get(&item.product_id) else {
            continue;
        };
        let line_total = product.price_cents * u64::from(item.quantity);
        subtotal_cents += line_total;
        lines.push(CartLine {
            product_id: product.id,
            name: product.name.clone(),
            quantity: item.quantity,
            unit_price_cents: product.price_cents,
            line_total_cents: line_total,
        });
    }

    CartView {
        items: lines,
        subtotal_cents,
        coupon: doc
            .users
            .get(&auth.user_id)
            .and_then(|user| user.coupon.clone()),
    }
}

#[utoipa::path(
    get,
    path = "/v1/cart",
    tag = "Cart",
    responses((status = 200, body = CartView))
)]
pub async fn get_cart(State(state): State<AppState>, auth: AuthenticatedUser) -> Json<CartView> {
    Json(cart_view(&state, &auth).await)
}

#[utoipa::path(
    post,
    path = "/v1/cart/items",
    request_body = AddCartItemRequest,
    tag = "Cart",
    responses((status = 201, body = CartView))
)]
pub async fn add_item(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(request): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<CartView>), ShopError> {
    if request.quantity == 0 {
        return Err(ShopError::validation("quantity must be at least 1"));
    }

    let doc = state.store.snapshot().await;
    if !doc.products.contains_key(&request.product_id) {
        return Err(ShopError::not_found("Product"));
    }
    drop(doc);

    state
        .carts
        .add(&auth.user_id, request.product_id, request.quantity)
        .await;

    Ok((StatusCode::CREATED, Json(cart_view(&state, &auth).await)))
}

#[utoipa::path(
    delete,
    path = "/v1/cart/items/{product_id}",
    params(("product_id" = Uuid, Path, description = "Cart line to remove")),
    tag = "Cart",
    responses((status = 204))
)]
pub async fn remove_item(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(product_id): Path<Uuid>,
) -> Result<StatusCode, ShopError> {
    state.carts.remove(&auth.user_id, product_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/v1/cart",
    tag = "Cart",
    responses((status = 204))
)]
pub async fn clear_cart(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> StatusCode {
    state.carts.clear(&auth.user_id).await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Product, User, UserId};
    use crate::storage::StoragePaths;
    use chrono::Utc;

    async fn seeded_state() -> (tempfile::TempDir, AppState, AuthenticatedUser, Uuid) {
        let dir = tempfile::tempdir().expect("tempdir");
        let state = AppState::initialize(StoragePaths::new(dir.path()), None).expect("state");

        let user_id = UserId::from("cart-user");
        let product_id = Uuid::new_v4();
        let user = User {
            user_id: user_id.clone(),
            country: "UK".into(),
            coupon: None,
            created_at: Utc::now(),
        };
        let seeded_user = user.clone();
        state
            .store
            .commit(move |doc| {
                doc.users.insert(seeded_user.user_id.clone(), seeded_user);
                doc.products.insert(
                    product_id,
                    Product {
                        id: product_id,
                        name: "Widget".into(),
                        description: "A widget".into(),
                        price_cents: 1250,
                        stock: 5,
                    },
                );
                Ok(())
            })
            .await
            .expect("seed");

        let auth = AuthenticatedUser { user_id, user };
        (dir, state, auth, product_id)
    }

    #[tokio::test]
    async fn add_item_prices_the_view() {
        let (_dir, state, auth, product_id) = seeded_state().await;

        let (status, Json(view)) = add_item(
            State(state),
            auth,
            Json(AddCartItemRequest {
                product_id,
                quantity: 2,
            }),
        )
        .await
        .expect("add");

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(view.items.len(), 1);
        assert_eq!(view.items[0].line_total_cents, 2500);
        assert_eq!(view.subtotal_cents, 2500);
    }

    #[tokio::test]
    async fn add_unknown_product_is_rejected() {
        let (_dir, state, auth, _) = seeded_state().await;

        let result = add_item(
            State(state),
            auth,
            Json(AddCartItemRequest {
                product_id: Uuid::new_v4(),
                quantity: 1,
            }),
        )
        .await;

        assert!(matches!(result, Err(ShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let (_dir, state, auth, product_id) = seeded_state().await;

        let result = add_item(
            State(state),
            auth,
            Json(AddCartItemRequest {
                product_id,
                quantity: 0,
            }),
        )
        .await;

        assert!(matches!(result, Err(ShopError::Validation(_))));
    }

    #[tokio::test]
    async fn vanished_product_lines_are_skipped() {
        let (_dir, state, auth, product_id) = seeded_state().await;
        state.carts.add(&auth.user_id, product_id, 1).await;

        state
            .store
            .commit(move |doc| {
                doc.products.remove(&product_id);
                Ok(())
            })
            .await
            .expect("remove product");

        let Json(view) = get_cart(State(state), auth).await;
        assert!(view.items.is_empty());
        assert_eq!(view.subtotal_cents, 0);
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let (_dir, state, auth, product_id) = seeded_state().await;
        state.carts.add(&auth.user_id, product_id, 1).await;

        let status = remove_item(State(state.clone()), auth.clone(), Path(product_id))
            .await
            .expect("remove");
        assert_eq!(status, StatusCode::NO_CONTENT);

        state.carts.add(&auth.user_id, product_id, 1).await;
        let status = clear_cart(State(state.clone()), auth.clone()).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(state.carts.is_empty(&auth.user_id).await);
    }
}
