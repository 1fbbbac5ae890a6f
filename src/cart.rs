// SPDX-License-Identifier: AGPL-3.0-or-later

//! Per-user volatile carts.
//!
//! Carts live in process memory only and are never persisted: they become
//! durable state solely by turning into an order at checkout. Entries are
//! keyed per user, so no cross-user locking is involved.

use std::collections::HashMap;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::ShopError;
use crate::models::{CartItem, UserId};

/// In-memory cart state for all users.
#[derive(Default)]
pub struct CartManager {
    carts: RwLock<HashMap<UserId, Vec<CartItem>>>,
}

impl CartManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a quantity of a product, merging into an existing line.
    pub async fn add(&self, user_id: &UserId, product_id: Uuid, quantity: u32) {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id.clone()).or_default();

        if let Some(line) = cart.iter_mut().find(|item| item.product_id == product_id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            cart.push(CartItem {
                product_id,
                quantity,
            });
        }
    }

    /// Remove a product line entirely.
    pub async fn remove(&self, user_id: &UserId, product_id: Uuid) -> Result<(), ShopError> {
        let mut carts = self.carts.write().await;
        let cart = carts.entry(user_id.clone()).or_default();

        let before = cart.len();
        cart.retain(|item| item.product_id != product_id);

        if cart.len() == before {
            Err(ShopError::not_found("Cart item"))
        } else {
            Ok(())
        }
    }

    /// The user's current cart lines.
    pub async fn items(&self, user_id: &UserId) -> Vec<CartItem> {
        self.carts
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn is_empty(&self, user_id: &UserId) -> bool {
        self.items(user_id).await.is_empty()
    }

    /// Drop the user's cart.
    pub async fn clear(&self, user_id: &UserId) {
        self.carts.write().await.remove(user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::from("user-a")
    }

    #[tokio::test]
    async fn add_merges_quantities() {
        let carts = CartManager::new();
        let product = Uuid::new_v4();

        carts.add(&user(), product, 2).await;
        carts.add(&user(), product, 3).await;

        let items = carts.items(&user()).await;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 5);
    }

    #[tokio::test]
    async fn remove_missing_line_errors() {
        let carts = CartManager::new();
        let result = carts.remove(&user(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(ShopError::NotFound(_))));
    }

    #[tokio::test]
    async fn carts_are_isolated_per_user() {
        let carts = CartManager::new();
        let product = Uuid::new_v4();
        let other = UserId::from("user-b");

        carts.add(&user(), product, 1).await;

        assert!(carts.is_empty(&other).await);
        assert!(!carts.is_empty(&user()).await);
    }

    #[tokio::test]
    async fn clear_empties_the_cart() {
        let carts = CartManager::new();
        carts.add(&user(), Uuid::new_v4(), 1).await;
        carts.clear(&user()).await;
        assert!(carts.is_empty(&user()).await);
    }
}
