// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Domain and API Data Models
//!
//! This module defines the persisted domain entities (users, products,
//! orders) and the request/response structures used by the command
//! surface. All types derive `Serialize`, `Deserialize`, and `ToSchema`
//! for JSON handling and OpenAPI documentation.
//!
//! ## Money
//!
//! All monetary amounts are integer cents (`u64`). Floats never touch a
//! price or a total.
//!
//! ## Snapshots
//!
//! An [`Order`] carries [`LineItem`] snapshots: product name and unit
//! price are copied at checkout time, so later catalog edits never change
//! a historical order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// =============================================================================
// User Identity
// =============================================================================

/// Derived user identifier.
///
/// The hex SHA-256 digest of the NFKC-normalized secret phrase. This is
/// the only form of user identity that ever reaches the persisted store;
/// raw phrases stay in memory at the request boundary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        UserId(value)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        UserId(value.to_string())
    }
}

/// A registered storefront user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct User {
    /// Derived identifier (never the raw secret phrase).
    pub user_id: UserId,
    /// Self-reported delivery country.
    pub country: String,
    /// Coupon code attached to the next checkout, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
    /// When the user first registered.
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Catalog Models
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Product {
    /// Unique product identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Short description shown in listings.
    pub description: String,
    /// Unit price in cents.
    pub price_cents: u64,
    /// Units in stock.
    pub stock: u32,
}

// =============================================================================
// Cart Models
// =============================================================================

/// One cart entry: a product reference and a quantity.
///
/// Cart items are volatile per-user state and are never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CartItem {
    /// The product being purchased.
    pub product_id: Uuid,
    /// Requested quantity.
    pub quantity: u32,
}

/// A priced cart line for display.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: u64,
    pub line_total_cents: u64,
}

/// The caller's cart, valued against the current catalog.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub subtotal_cents: u64,
    /// Coupon that will apply at checkout, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
}

// =============================================================================
// Order Models
// =============================================================================

/// Payment method accepted at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentMethod {
    Btc,
    Usdt,
}

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, awaiting payment/fulfilment.
    Pending,
    /// Handed to the carrier.
    Shipped,
    /// Confirmed delivered.
    Delivered,
    /// Cancelled by the operator.
    Cancelled,
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Armored ciphertext of a delivery address.
///
/// Produced once at order creation and never replaced. The inner string
/// is the PEM-armored envelope; it is safe to persist, display, and
/// export.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct EncryptedAddress(pub String);

impl EncryptedAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A snapshot of one purchased line at checkout time.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LineItem {
    pub product_id: Uuid,
    /// Product name at the time of the order.
    pub name: String,
    pub quantity: u32,
    /// Unit price at the time of the order, in cents.
    pub unit_price_cents: u64,
}

/// A persisted order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct Order {
    /// Monotonically assigned order id.
    pub id: u64,
    /// Owning user (derived id).
    pub user_id: UserId,
    /// Snapshotted purchase lines.
    pub items: Vec<LineItem>,
    pub subtotal_cents: u64,
    pub discount_cents: u64,
    pub total_cents: u64,
    /// Coupon consumed by this order, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<String>,
    pub payment_method: PaymentMethod,
    /// Free-text delivery notes (may be empty).
    pub notes: String,
    pub status: OrderStatus,
    /// Armored delivery address; set exactly once at creation.
    pub encrypted_address: EncryptedAddress,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Request / Response Models
// =============================================================================

/// Request to register (or re-identify) with a secret phrase.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// The opaque credential; never echoed back or persisted raw.
    pub secret_phrase: String,
    /// Delivery country.
    pub country: String,
}

/// Registration outcome.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterResponse {
    pub user_id: UserId,
    pub country: String,
    /// True when the phrase was already registered ("welcome back").
    pub returning: bool,
}

/// Request to change the registered country.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateCountryRequest {
    pub country: String,
}

/// Request to add a product to the cart.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddCartItemRequest {
    pub product_id: Uuid,
    /// Quantity to add (merged into any existing line).
    pub quantity: u32,
}

/// Address submission completing a checkout.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutAddressRequest {
    /// Plaintext delivery address. Encrypted immediately; never stored.
    pub address: String,
    /// Optional delivery notes.
    #[serde(default)]
    pub notes: String,
    pub payment_method: PaymentMethod,
}

/// Confirmation returned after a successful checkout commit.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderConfirmation {
    pub order_id: u64,
    pub subtotal_cents: u64,
    pub discount_cents: u64,
    pub total_cents: u64,
    pub payment_method: PaymentMethod,
    pub status: OrderStatus,
}

/// Order status as reported to its owner.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OrderStatusResponse {
    pub order_id: u64,
    pub status: OrderStatus,
    pub item_count: usize,
    pub total_cents: u64,
    pub created_at: DateTime<Utc>,
}

impl From<&Order> for OrderStatusResponse {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            status: order.status,
            item_count: order.items.len(),
            total_cents: order.total_cents,
            created_at: order.created_at,
        }
    }
}

/// Operator request to create or update a catalog product.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpsertProductRequest {
    /// Existing product id to update; omitted to create.
    #[serde(default)]
    pub id: Option<Uuid>,
    pub name: String,
    pub description: String,
    pub price_cents: u64,
    pub stock: u32,
}

/// Operator request to advance an order's status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}

/// Operator audit-path response carrying a decrypted address.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DecryptedAddressResponse {
    pub order_id: u64,
    pub address: String,
}
