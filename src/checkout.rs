// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Checkout Pipeline
//!
//! The stateful path from a mutable cart to an immutable persisted order:
//!
//! ```text
//! CartOpen -> AddressRequested -> AddressEncrypting -> OrderPersisted -> Complete
//!                 |                     |                    |
//!                 +---------------------+--------------------+--> Failed(reason)
//! ```
//!
//! Two hard rules hold throughout:
//!
//! - The plaintext address exists only inside [`CheckoutPipeline::submit`]
//!   and is consumed by the encryption call; it never reaches the store,
//!   a log line, or any state that outlives the call.
//! - Encryption happens strictly **before** the store commit begins, so a
//!   slow or hung encryption backend can never hold the store lock.
//!
//! Until the commit succeeds nothing durable changes, so a failed
//! checkout is always safe to retry. The cart is cleared only after the
//! commit has returned.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::cart::CartManager;
use crate::crypto::EncryptionProvider;
use crate::error::ShopError;
use crate::models::{
    CheckoutAddressRequest, LineItem, Order, OrderConfirmation, OrderStatus, UserId,
};
use crate::storage::DocumentStore;

/// Coupon code honoured at checkout (10% off).
pub const COUPON_CODE: &str = "SAVE10";

/// Where a user's checkout currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutStage {
    /// Checkout triggered; waiting for the delivery address.
    AddressRequested,
    /// Address received; encryption in flight.
    AddressEncrypting,
    /// Order committed to the store; confirmation pending.
    OrderPersisted,
    /// Confirmation delivered.
    Complete,
    /// Terminal failure; the user must trigger checkout again.
    Failed(String),
}

/// Orchestrates address capture, encryption, and the order commit.
pub struct CheckoutPipeline {
    store: Arc<DocumentStore>,
    carts: Arc<CartManager>,
    crypto: Arc<EncryptionProvider>,
    sessions: RwLock<HashMap<UserId, CheckoutStage>>,
}

impl CheckoutPipeline {
    pub fn new(
        store: Arc<DocumentStore>,
        carts: Arc<CartManager>,
        crypto: Arc<EncryptionProvider>,
    ) -> Self {
        Self {
            store,
            carts,
            crypto,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Current stage of the user's checkout, if one exists.
    pub async fn stage(&self, user_id: &UserId) -> Option<CheckoutStage> {
        self.sessions.read().await.get(user_id).cloned()
    }

    /// Trigger a checkout: `CartOpen -> AddressRequested`.
    ///
    /// # Errors
    /// [`ShopError::EmptyCart`] when the cart is empty; no state advances.
    pub async fn begin(&self, user_id: &UserId) -> Result<(), ShopError> {
        if self.carts.is_empty(user_id).await {
            return Err(ShopError::EmptyCart);
        }

        self.sessions
            .write()
            .await
            .insert(user_id.clone(), CheckoutStage::AddressRequested);

        tracing::debug!(user = %user_id, "checkout started, awaiting address");
        Ok(())
    }

    /// Complete a checkout with the submitted address.
    ///
    /// Prices are snapshotted against the catalog inside the commit, so a
    /// concurrent catalog edit cannot produce a half-updated order. On
    /// any failure before the commit returns, the store is untouched and
    /// the cart survives.
    pub async fn submit(
        &self,
        user_id: &UserId,
        request: CheckoutAddressRequest,
    ) -> Result<OrderConfirmation, ShopError> {
        match self.stage(user_id).await {
            Some(CheckoutStage::AddressRequested) => {}
            _ => return Err(ShopError::NoActiveCheckout),
        }

        let cart_items = self.carts.items(user_id).await;
        if cart_items.is_empty() {
            self.fail(user_id, "cart emptied before address").await;
            return Err(ShopError::EmptyCart);
        }

        // Encrypt before touching the store lock. `request.address` is
        // moved into the call and dropped there.
        self.set_stage(user_id, CheckoutStage::AddressEncrypting).await;

        let recipient = match self.crypto.public_key() {
            Ok(key) => key,
            Err(err) => {
                self.fail(user_id, "encryption unavailable").await;
                return Err(err.into());
            }
        };

        let encrypted_address = match self.crypto.encrypt(request.address, &recipient) {
            Ok(artifact) => artifact,
            Err(err) => {
                self.fail(user_id, "encryption failed").await;
                return Err(err.into());
            }
        };

        let payment_method = request.payment_method;
        let notes = request.notes;
        let owner = user_id.clone();

        let confirmation = self
            .store
            .commit(move |doc| {
                let mut items = Vec::with_capacity(cart_items.len());
                let mut subtotal_cents: u64 = 0;

                for cart_item in &cart_items {
                    let product = doc
                        .products
                        .get(&cart_item.product_id)
                        .ok_or_else(|| ShopError::not_found("Product"))?;

                    subtotal_cents +=
                        product.price_cents * u64::from(cart_item.quantity);
                    items.push(LineItem {
                        product_id: product.id,
                        name: product.name.clone(),
                        quantity: cart_item.quantity,
                        unit_price_cents: product.price_cents,
                    });
                }

                let user = doc
                    .users
                    .get_mut(&owner)
                    .ok_or_else(|| ShopError::not_found("User"))?;

                let coupon = user.coupon.take().filter(|code| code == COUPON_CODE);
                let discount_cents = if coupon.is_some() {
                    subtotal_cents / 10
                } else {
                    0
                };
                let total_cents = subtotal_cents - discount_cents;

                let id = doc.next_order_id;
                doc.next_order_id += 1;

                let order = Order {
                    id,
                    user_id: owner.clone(),
                    items,
                    subtotal_cents,
                    discount_cents,
                    total_cents,
                    coupon,
                    payment_method,
                    notes,
                    status: OrderStatus::Pending,
                    encrypted_address,
                    created_at: Utc::now(),
                };

                let confirmation = OrderConfirmation {
                    order_id: order.id,
                    subtotal_cents,
                    discount_cents,
                    total_cents,
                    payment_method,
                    status: order.status,
                };

                doc.orders.push(order);
                Ok(confirmation)
            })
            .await;

        let confirmation = match confirmation {
            Ok(confirmation) => confirmation,
            Err(err) => {
                // Pricing errors are recoverable: back to AddressRequested
                // would force re-sending the address, so fail the session
                // and let the user re-trigger checkout; nothing was
                // persisted.
                self.fail(user_id, "commit failed").await;
                return Err(err);
            }
        };

        self.set_stage(user_id, CheckoutStage::OrderPersisted).await;

        // Clear the cart only after the commit is durable.
        self.carts.clear(user_id).await;

        self.set_stage(user_id, CheckoutStage::Complete).await;
        tracing::info!(user = %user_id, order = confirmation.order_id, "order created");

        Ok(confirmation)
    }

    async fn set_stage(&self, user_id: &UserId, stage: CheckoutStage) {
        self.sessions
            .write()
            .await
            .insert(user_id.clone(), stage);
    }

    async fn fail(&self, user_id: &UserId, reason: &str) {
        tracing::warn!(user = %user_id, reason, "checkout failed");
        self.set_stage(user_id, CheckoutStage::Failed(reason.to_string()))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentMethod, Product, User};
    use crate::storage::StoragePaths;
    use uuid::Uuid;

    struct Fixture {
        _dir: tempfile::TempDir,
        store: Arc<DocumentStore>,
        carts: Arc<CartManager>,
        crypto: Arc<EncryptionProvider>,
        pipeline: CheckoutPipeline,
    }

    async fn fixture(init_keys: bool) -> Fixture {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = StoragePaths::new(dir.path());
        let store = Arc::new(DocumentStore::open(&paths).expect("open store"));
        let carts = Arc::new(CartManager::new());
        let crypto = Arc::new(EncryptionProvider::new(paths));
        if init_keys {
            crypto.ensure_keypair().expect("keypair");
        }

        let pipeline = CheckoutPipeline::new(
            Arc::clone(&store),
            Arc::clone(&carts),
            Arc::clone(&crypto),
        );

        Fixture {
            _dir: dir,
            store,
            carts,
            crypto,
            pipeline,
        }
    }

    async fn seed_user(fixture: &Fixture, user_id: &UserId, coupon: Option<&str>) {
        let user = User {
            user_id: user_id.clone(),
            country: "UK".into(),
            coupon: coupon.map(String::from),
            created_at: Utc::now(),
        };
        fixture
            .store
            .commit(|doc| {
                doc.users.insert(user.user_id.clone(), user);
                Ok(())
            })
            .await
            .expect("seed user");
    }

    async fn seed_product(fixture: &Fixture, price_cents: u64) -> Uuid {
        let product = Product {
            id: Uuid::new_v4(),
            name: "Widget".into(),
            description: "A widget".into(),
            price_cents,
            stock: 10,
        };
        let id = product.id;
        fixture
            .store
            .commit(move |doc| {
                doc.products.insert(product.id, product);
                Ok(())
            })
            .await
            .expect("seed product");
        id
    }

    fn address_request(address: &str) -> CheckoutAddressRequest {
        CheckoutAddressRequest {
            address: address.to_string(),
            notes: String::new(),
            payment_method: PaymentMethod::Btc,
        }
    }

    #[tokio::test]
    async fn empty_cart_checkout_does_not_mutate_store() {
        let fx = fixture(true).await;
        let user = UserId::from("user-a");
        seed_user(&fx, &user, None).await;

        let before = fx.store.snapshot().await;
        let result = fx.pipeline.begin(&user).await;

        assert!(matches!(result, Err(ShopError::EmptyCart)));
        assert_eq!(fx.store.snapshot().await, before);
        assert!(fx.pipeline.stage(&user).await.is_none());
    }

    #[tokio::test]
    async fn submit_without_begin_is_rejected() {
        let fx = fixture(true).await;
        let user = UserId::from("user-a");
        seed_user(&fx, &user, None).await;

        let before = fx.store.snapshot().await;
        let result = fx.pipeline.submit(&user, address_request("somewhere")).await;

        assert!(matches!(result, Err(ShopError::NoActiveCheckout)));
        assert_eq!(fx.store.snapshot().await, before);
    }

    #[tokio::test]
    async fn successful_checkout_creates_order_and_clears_cart() {
        let fx = fixture(true).await;
        let user = UserId::from("user-a");
        seed_user(&fx, &user, None).await;
        let product = seed_product(&fx, 1000).await;

        fx.carts.add(&user, product, 2).await;
        fx.pipeline.begin(&user).await.expect("begin");

        let confirmation = fx
            .pipeline
            .submit(&user, address_request("221B Baker St"))
            .await
            .expect("submit succeeds");

        assert_eq!(confirmation.total_cents, 2000);
        assert_eq!(confirmation.status, OrderStatus::Pending);
        assert!(fx.carts.is_empty(&user).await);
        assert_eq!(
            fx.pipeline.stage(&user).await,
            Some(CheckoutStage::Complete)
        );

        let doc = fx.store.snapshot().await;
        assert_eq!(doc.orders.len(), 1);
        let order = &doc.orders[0];
        assert_eq!(order.id, confirmation.order_id);
        assert_eq!(order.items[0].unit_price_cents, 1000);

        // The address round-trips through the operator path only.
        let decrypted = fx.crypto.decrypt(&order.encrypted_address).expect("decrypt");
        assert_eq!(decrypted, "221B Baker St");
    }

    #[tokio::test]
    async fn persisted_document_never_contains_the_plaintext_address() {
        let fx = fixture(true).await;
        let user = UserId::from("user-a");
        seed_user(&fx, &user, None).await;
        let product = seed_product(&fx, 500).await;

        fx.carts.add(&user, product, 1).await;
        fx.pipeline.begin(&user).await.expect("begin");
        fx.pipeline
            .submit(&user, address_request("742 Evergreen Terrace"))
            .await
            .expect("submit");

        let serialized =
            serde_json::to_string(&fx.store.snapshot().await).expect("serialize document");
        assert!(!serialized.contains("Evergreen"));
    }

    #[tokio::test]
    async fn coupon_discount_is_applied_and_consumed() {
        let fx = fixture(true).await;
        let user = UserId::from("user-a");
        seed_user(&fx, &user, Some(COUPON_CODE)).await;
        let product = seed_product(&fx, 1000).await;

        fx.carts.add(&user, product, 2).await;
        fx.pipeline.begin(&user).await.expect("begin");

        let confirmation = fx
            .pipeline
            .submit(&user, address_request("1 High St"))
            .await
            .expect("submit");

        assert_eq!(confirmation.subtotal_cents, 2000);
        assert_eq!(confirmation.discount_cents, 200);
        assert_eq!(confirmation.total_cents, 1800);

        let doc = fx.store.snapshot().await;
        assert_eq!(doc.orders[0].coupon.as_deref(), Some(COUPON_CODE));
        assert!(doc.users.get(&user).unwrap().coupon.is_none());
    }

    #[tokio::test]
    async fn encryption_failure_persists_nothing_and_keeps_cart() {
        // No key pair: the encryption backend is unavailable.
        let fx = fixture(false).await;
        let user = UserId::from("user-a");
        seed_user(&fx, &user, None).await;
        let product = seed_product(&fx, 1000).await;

        fx.carts.add(&user, product, 1).await;
        fx.pipeline.begin(&user).await.expect("begin");

        let before = fx.store.snapshot().await;
        let result = fx
            .pipeline
            .submit(&user, address_request("13 Elm St"))
            .await;

        assert!(result.is_err());
        assert_eq!(fx.store.snapshot().await, before);
        // The cart survives so the user can retry.
        assert!(!fx.carts.is_empty(&user).await);
        assert!(matches!(
            fx.pipeline.stage(&user).await,
            Some(CheckoutStage::Failed(_))
        ));
    }

    #[tokio::test]
    async fn vanished_product_aborts_before_persisting() {
        let fx = fixture(true).await;
        let user = UserId::from("user-a");
        seed_user(&fx, &user, None).await;
        let product = seed_product(&fx, 1000).await;

        fx.carts.add(&user, product, 1).await;
        fx.pipeline.begin(&user).await.expect("begin");

        // Product disappears between begin and submit.
        fx.store
            .commit(move |doc| {
                doc.products.remove(&product);
                Ok(())
            })
            .await
            .expect("remove product");

        let result = fx.pipeline.submit(&user, address_request("somewhere")).await;

        assert!(matches!(result, Err(ShopError::NotFound(_))));
        assert!(fx.store.snapshot().await.orders.is_empty());
        assert!(!fx.carts.is_empty(&user).await);
    }

    #[tokio::test]
    async fn concurrent_checkouts_get_unique_order_ids() {
        let fx = fixture(true).await;
        let user_a = UserId::from("user-a");
        let user_b = UserId::from("user-b");
        seed_user(&fx, &user_a, None).await;
        seed_user(&fx, &user_b, None).await;
        let product = seed_product(&fx, 700).await;

        fx.carts.add(&user_a, product, 1).await;
        fx.carts.add(&user_b, product, 3).await;
        fx.pipeline.begin(&user_a).await.expect("begin a");
        fx.pipeline.begin(&user_b).await.expect("begin b");

        let (a, b) = tokio::join!(
            fx.pipeline.submit(&user_a, address_request("addr a")),
            fx.pipeline.submit(&user_b, address_request("addr b")),
        );

        let a = a.expect("checkout a");
        let b = b.expect("checkout b");

        assert_ne!(a.order_id, b.order_id);

        let doc = fx.store.snapshot().await;
        assert_eq!(doc.orders.len(), 2);
        assert_eq!(doc.next_order_id, 3);
    }
}
