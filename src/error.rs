// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Crate Error Taxonomy
//!
//! One error type, [`ShopError`], crosses every component boundary and
//! maps onto an HTTP response at the API surface. Internal subsystems
//! (storage, crypto) have their own `thiserror` enums and convert into
//! `ShopError` at the seam.
//!
//! Two rules shape the mapping:
//!
//! - `Forbidden` renders with the same status and body as `NotFound`, so
//!   an unauthorized caller cannot probe whether an order id exists.
//! - Error messages never contain secret phrases or plaintext addresses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::crypto::CryptoError;
use crate::storage::StoreError;

/// Application-wide error type.
#[derive(Debug)]
pub enum ShopError {
    /// Checkout was triggered with an empty cart.
    EmptyCart,
    /// An address was submitted without an active checkout session.
    NoActiveCheckout,
    /// Operator key pair could not be generated or persisted.
    KeyGeneration(String),
    /// The operator public key was requested before `ensure_keypair`.
    KeyNotInitialized,
    /// The encryption backend failed; checkout must abort.
    Encryption(String),
    /// Ciphertext was malformed or the private key is unavailable.
    Decryption(String),
    /// The persisted store document does not parse. Fatal at startup.
    CorruptStore(String),
    /// The requested entity does not exist.
    NotFound(String),
    /// The caller does not own the requested entity.
    Forbidden,
    /// Missing or unregistered credential.
    Unauthorized,
    /// The request payload failed validation.
    Validation(String),
    /// Underlying storage failure (I/O, serialization).
    Storage(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    error_code: String,
}

impl ShopError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Stable machine-readable code for this error.
    ///
    /// `Forbidden` deliberately reports `not_found`.
    pub fn error_code(&self) -> &'static str {
        match self {
            ShopError::EmptyCart => "empty_cart",
            ShopError::NoActiveCheckout => "no_active_checkout",
            ShopError::KeyGeneration(_) => "key_generation_failed",
            ShopError::KeyNotInitialized => "key_not_initialized",
            ShopError::Encryption(_) => "encryption_failed",
            ShopError::Decryption(_) => "decryption_failed",
            ShopError::CorruptStore(_) => "corrupt_store",
            ShopError::NotFound(_) | ShopError::Forbidden => "not_found",
            ShopError::Unauthorized => "unauthorized",
            ShopError::Validation(_) => "validation_failed",
            ShopError::Storage(_) => "storage_failure",
        }
    }

    /// HTTP status for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShopError::EmptyCart
            | ShopError::NoActiveCheckout
            | ShopError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ShopError::NotFound(_) | ShopError::Forbidden => StatusCode::NOT_FOUND,
            ShopError::Unauthorized => StatusCode::UNAUTHORIZED,
            ShopError::KeyGeneration(_)
            | ShopError::KeyNotInitialized
            | ShopError::Encryption(_)
            | ShopError::Decryption(_)
            | ShopError::CorruptStore(_)
            | ShopError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ShopError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShopError::EmptyCart => write!(f, "Cart is empty; add products before checkout"),
            ShopError::NoActiveCheckout => {
                write!(f, "No checkout in progress; trigger checkout first")
            }
            ShopError::KeyGeneration(msg) => write!(f, "Key generation failed: {msg}"),
            ShopError::KeyNotInitialized => write!(f, "Operator key pair is not initialized"),
            ShopError::Encryption(msg) => write!(f, "Address encryption failed: {msg}"),
            ShopError::Decryption(msg) => write!(f, "Decryption failed: {msg}"),
            ShopError::CorruptStore(msg) => write!(f, "Store document is corrupt: {msg}"),
            ShopError::NotFound(what) => write!(f, "{what} not found"),
            // Same wording as NotFound so existence is not leaked.
            ShopError::Forbidden => write!(f, "Order not found"),
            ShopError::Unauthorized => write!(f, "Unknown or missing secret phrase"),
            ShopError::Validation(msg) => write!(f, "{msg}"),
            ShopError::Storage(msg) => write!(f, "Storage failure: {msg}"),
        }
    }
}

impl std::error::Error for ShopError {}

impl From<StoreError> for ShopError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Corrupt(msg) => ShopError::CorruptStore(msg),
            other => ShopError::Storage(other.to_string()),
        }
    }
}

impl From<CryptoError> for ShopError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::KeyNotInitialized => ShopError::KeyNotInitialized,
            CryptoError::KeyGeneration(msg) => ShopError::KeyGeneration(msg),
            CryptoError::EncryptionFailed(msg) => ShopError::Encryption(msg),
            CryptoError::DecryptionFailed(msg) => ShopError::Decryption(msg),
        }
    }
}

impl IntoResponse for ShopError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
