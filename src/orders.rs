// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Order Tracking
//!
//! Read-only query surface over the store for order status, history, and
//! the encrypted-address artifact. Every lookup is ownership-checked:
//! a caller who does not own an order receives [`ShopError::Forbidden`],
//! which renders identically to not-found so order ids cannot be probed.
//!
//! This module never decrypts anything; decryption lives exclusively on
//! the operator path in `crypto::provider`.

use std::sync::Arc;

use crate::error::ShopError;
use crate::models::{Order, OrderStatusResponse, UserId};
use crate::storage::DocumentStore;

/// A stored entity with a single owning user.
pub trait OwnedResource {
    fn owner_user_id(&self) -> &UserId;

    /// Verify that `user_id` owns this resource.
    fn verify_ownership(&self, user_id: &UserId) -> Result<(), ShopError> {
        if self.owner_user_id() == user_id {
            Ok(())
        } else {
            Err(ShopError::Forbidden)
        }
    }
}

impl OwnedResource for Order {
    fn owner_user_id(&self) -> &UserId {
        &self.user_id
    }
}

/// Read-only order queries.
pub struct OrderTracker {
    store: Arc<DocumentStore>,
}

impl OrderTracker {
    pub fn new(store: Arc<DocumentStore>) -> Self {
        Self { store }
    }

    /// Status of one order, for its owner.
    pub async fn status(
        &self,
        order_id: u64,
        user_id: &UserId,
    ) -> Result<OrderStatusResponse, ShopError> {
        let order = self.find_owned(order_id, user_id).await?;
        Ok(OrderStatusResponse::from(&order))
    }

    /// The caller's orders, newest first.
    pub async fn history(&self, user_id: &UserId) -> Vec<OrderStatusResponse> {
        let doc = self.store.snapshot().await;
        let mut orders: Vec<OrderStatusResponse> = doc
            .orders
            .iter()
            .filter(|order| &order.user_id == user_id)
            .map(OrderStatusResponse::from)
            .collect();
        orders.sort_by(|a, b| b.order_id.cmp(&a.order_id));
        orders
    }

    /// The armored encrypted-address artifact, verbatim, for download.
    ///
    /// Returns the suggested filename and the artifact body.
    pub async fn export_encrypted_address(
        &self,
        order_id: u64,
        user_id: &UserId,
    ) -> Result<(String, String), ShopError> {
        let order = self.find_owned(order_id, user_id).await?;
        let filename = format!("order-{order_id}-address.asc");
        Ok((filename, order.encrypted_address.0))
    }

    async fn find_owned(&self, order_id: u64, user_id: &UserId) -> Result<Order, ShopError> {
        let doc = self.store.snapshot().await;
        let order = doc
            .order(order_id)
            .ok_or_else(|| ShopError::not_found("Order"))?;
        order.verify_ownership(user_id)?;
        Ok(order.clone())
    }
}
