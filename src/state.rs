// SPDX-License-Identifier: AGPL-3.0-or-later

use std::sync::Arc;

use crate::cart::CartManager;
use crate::checkout::CheckoutPipeline;
use crate::crypto::EncryptionProvider;
use crate::error::ShopError;
use crate::orders::OrderTracker;
use crate::storage::{DocumentStore, StoragePaths};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DocumentStore>,
    pub carts: Arc<CartManager>,
    pub crypto: Arc<EncryptionProvider>,
    pub checkout: Arc<CheckoutPipeline>,
    pub orders: Arc<OrderTracker>,
    /// Shared token enabling the operator surface; `None` disables it.
    pub operator_token: Option<Arc<str>>,
}

impl AppState {
    /// Open the store, load-or-generate the operator key pair, and wire
    /// the components together.
    ///
    /// A corrupt store document surfaces here and must abort startup.
    pub fn initialize(
        paths: StoragePaths,
        operator_token: Option<String>,
    ) -> Result<Self, ShopError> {
        let store = Arc::new(DocumentStore::open(&paths)?);
        let carts = Arc::new(CartManager::new());

        let crypto = Arc::new(EncryptionProvider::new(paths));
        crypto.ensure_keypair()?;

        let checkout = Arc::new(CheckoutPipeline::new(
            Arc::clone(&store),
            Arc::clone(&carts),
            Arc::clone(&crypto),
        ));
        let orders = Arc::new(OrderTracker::new(Arc::clone(&store)));

        Ok(Self {
            store,
            carts,
            crypto,
            checkout,
            orders,
            operator_token: operator_token.map(Into::into),
        })
    }
}
