// SPDX-License-Identifier: AGPL-3.0-or-later

//! Storefront Server - Conversational Commerce Backend
//!
//! A small storefront service: secret-phrase registration, a product
//! catalog, per-user carts, a checkout pipeline that encrypts delivery
//! addresses before anything is persisted, and order tracking. All
//! durable state lives in one JSON document on disk.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Secret-phrase credentials and the operator guard
//! - `checkout` - The cart-to-order pipeline
//! - `crypto` - Envelope encryption for delivery addresses
//! - `storage` - The persisted store document

pub mod api;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod crypto;
pub mod error;
pub mod models;
pub mod orders;
pub mod state;
pub mod storage;
