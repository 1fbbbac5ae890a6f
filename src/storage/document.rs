// SPDX-License-Identifier: AGPL-3.0-or-later

//! The persisted store document and its single-writer access path.
//!
//! [`DocumentStore`] keeps the current [`Document`] in memory and funnels
//! every mutation through [`DocumentStore::commit`], which serializes
//! read-mutate-write cycles behind an async mutex. The mutation runs
//! against a clone, so a failing mutation leaves both the file and the
//! in-memory document exactly as they were.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::ShopError;
use crate::models::{Order, Product, User, UserId};

use super::StoragePaths;

/// Storage-level error type.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted bytes do not parse as a store document. This is
    /// fatal: the document is never auto-reset.
    #[error("{0}")]
    Corrupt(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn first_order_id() -> u64 {
    1
}

/// The single persisted document: every durable collection in one place.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Registered users, keyed by derived user id.
    #[serde(default)]
    pub users: BTreeMap<UserId, User>,
    /// Catalog products, keyed by product id.
    #[serde(default)]
    pub products: BTreeMap<Uuid, Product>,
    /// All orders, append-only.
    #[serde(default)]
    pub orders: Vec<Order>,
    /// Next order id to assign. Monotonic; only advanced inside commits.
    #[serde(default = "first_order_id")]
    pub next_order_id: u64,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            users: BTreeMap::new(),
            products: BTreeMap::new(),
            orders: Vec::new(),
            next_order_id: first_order_id(),
        }
    }
}

impl Document {
    /// Find an order by id.
    pub fn order(&self, order_id: u64) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }
}

/// Single-writer handle over the persisted document.
pub struct DocumentStore {
    path: PathBuf,
    doc: Mutex<Document>,
}

impl DocumentStore {
    /// Open the store: load the existing document or start from the empty
    /// default when no file exists yet.
    ///
    /// # Errors
    /// [`StoreError::Corrupt`] if the file exists but does not parse.
    /// Callers must treat this as fatal.
    pub fn open(paths: &StoragePaths) -> Result<Self, StoreError> {
        fs::create_dir_all(paths.root())?;
        let path = paths.store_file();
        let doc = Self::load(&path)?;
        Ok(Self {
            path,
            doc: Mutex::new(doc),
        })
    }

    fn load(path: &PathBuf) -> Result<Document, StoreError> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Document::default());
            }
            Err(err) => return Err(err.into()),
        };

        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|err| StoreError::Corrupt(err.to_string()))
    }

    /// Read-only clone of the current document.
    pub async fn snapshot(&self) -> Document {
        self.doc.lock().await.clone()
    }

    /// Apply a mutation atomically.
    ///
    /// The mutation runs on a clone of the current document. If it
    /// returns an error, nothing is written and the in-memory document is
    /// untouched. If it succeeds, the clone is written to a temp file,
    /// renamed into place, and only then swapped in as the current
    /// document. Commits are fully serialized; every commit is
    /// write-through, so shutdown needs no separate flush.
    pub async fn commit<T, F>(&self, mutation: F) -> Result<T, ShopError>
    where
        F: FnOnce(&mut Document) -> Result<T, ShopError>,
    {
        let mut guard = self.doc.lock().await;

        let mut draft = guard.clone();
        let value = mutation(&mut draft)?;

        self.write_document(&draft).map_err(ShopError::from)?;
        *guard = draft;

        Ok(value)
    }

    /// Write the document to a temp file, then rename for atomicity.
    fn write_document(&self, doc: &Document) -> Result<(), StoreError> {
        let temp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, doc)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}
