// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Address Encryption Module
//!
//! Capability-isolated envelope encryption for delivery addresses. No
//! other module ever holds key material, and no other module holds a
//! plaintext address together with persisted state: the plaintext enters
//! [`provider::EncryptionProvider::encrypt`] by value and only armored
//! ciphertext comes out.
//!
//! ## Envelope format
//!
//! ```text
//! ephemeral X25519 public key (32 bytes)
//! || XChaCha20-Poly1305 nonce (24 bytes)
//! || ciphertext + tag
//! ```
//!
//! armored as a PEM block with tag `ENCRYPTED ADDRESS` so the artifact is
//! text-safe for chat display and file download.

pub mod armor;
pub mod provider;

pub use provider::EncryptionProvider;

/// Crypto-level error type.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// `public_key`/`decrypt` called before `ensure_keypair`.
    #[error("operator key pair is not initialized")]
    KeyNotInitialized,

    /// Key generation or key persistence failed.
    #[error("{0}")]
    KeyGeneration(String),

    /// The AEAD backend rejected the encryption. Never retried; checkout
    /// aborts instead of falling back to plaintext.
    #[error("{0}")]
    EncryptionFailed(String),

    /// Bad armor, truncated payload, AEAD failure, or missing key.
    #[error("{0}")]
    DecryptionFailed(String),
}
