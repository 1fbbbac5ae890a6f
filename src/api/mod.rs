// SPDX-License-Identifier: AGPL-3.0-or-later

//! HTTP command surface.
//!
//! Thin handlers over the domain components: extract, validate, delegate,
//! serialize. Swagger UI is served at `/docs`.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AddCartItemRequest, CartLine, CartView, CheckoutAddressRequest, DecryptedAddressResponse,
        EncryptedAddress, LineItem, Order, OrderConfirmation, OrderStatus, OrderStatusResponse,
        PaymentMethod, Product, RegisterRequest, RegisterResponse, UpdateCountryRequest,
        UpdateOrderStatusRequest, UpsertProductRequest, User, UserId,
    },
    state::AppState,
};

pub mod admin;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod health;
pub mod orders;
pub mod users;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        .route("/health", get(health::health))
        .route("/users/register", post(users::register))
        .route("/users/country", put(users::update_country))
        .route("/users/coupon", post(users::apply_coupon))
        .route("/products", get(catalog::list_products))
        .route(
            "/cart",
            get(cart::get_cart).delete(cart::clear_cart),
        )
        .route("/cart/items", post(cart::add_item))
        .route("/cart/items/{product_id}", delete(cart::remove_item))
        .route("/checkout", post(checkout::trigger))
        .route("/checkout/address", post(checkout::submit_address))
        .route("/orders", get(orders::list_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/orders/{id}/address", get(orders::download_address))
        .route("/admin/products", post(admin::upsert_product))
        .route(
            "/admin/orders/{id}/status",
            put(admin::update_order_status),
        )
        .route(
            "/admin/orders/{id}/address/decrypt",
            post(admin::decrypt_address),
        )
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        users::register,
        users::update_country,
        users::apply_coupon,
        catalog::list_products,
        cart::get_cart,
        cart::add_item,
        cart::remove_item,
        cart::clear_cart,
        checkout::trigger,
        checkout::submit_address,
        orders::list_orders,
        orders::get_order,
        orders::download_address,
        admin::upsert_product,
        admin::update_order_status,
        admin::decrypt_address
    ),
    components(
        schemas(
            UserId,
            User,
            Product,
            CartLine,
            CartView,
            PaymentMethod,
            OrderStatus,
            EncryptedAddress,
            LineItem,
            Order,
            RegisterRequest,
            RegisterResponse,
            UpdateCountryRequest,
            AddCartItemRequest,
            CheckoutAddressRequest,
            OrderConfirmation,
            OrderStatusResponse,
            UpsertProductRequest,
            UpdateOrderStatusRequest,
            DecryptedAddressResponse,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Users", description = "Registration and profile"),
        (name = "Catalog", description = "Product listings"),
        (name = "Cart", description = "Cart management"),
        (name = "Checkout", description = "Checkout flow"),
        (name = "Orders", description = "Order tracking and artifacts"),
        (name = "Admin", description = "Operator-only management")
    )
)]
struct ApiDoc;
