// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Persisted Storage Module
//!
//! All durable state lives in **one JSON document** written wholesale on
//! every commit. There is no per-entity file layout and no database: the
//! deployment is single-process, single-writer, and the document is small.
//!
//! ## Storage Layout
//!
//! ```text
//! {DATA_DIR}/
//!   store.json       # users, products, orders, next_order_id
//!   keys/
//!     operator.pub   # operator public key (PEM)
//!     operator.key   # operator private key (PEM, mode 0600, crypto-only)
//! ```
//!
//! ## Guarantees
//!
//! - Commits are serialized behind one async mutex; a commit is read,
//!   mutate, write as a single critical section.
//! - Writes go to a temp file and are renamed into place, so a reader
//!   observes either the previous document or the new one, never a
//!   partial write.
//! - A document that fails to parse is **fatal**: it is surfaced as
//!   [`StoreError::Corrupt`] and never silently replaced, since resetting
//!   would destroy order history.
//! - No plaintext delivery address ever enters a commit; orders carry
//!   only armored ciphertext by the time they reach this module.

pub mod document;
pub mod paths;

pub use document::{Document, DocumentStore, StoreError};
pub use paths::StoragePaths;
