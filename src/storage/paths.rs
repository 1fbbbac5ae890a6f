// SPDX-License-Identifier: AGPL-3.0-or-later

//! Path utilities for the data directory layout.

use std::path::{Path, PathBuf};

use crate::config::DEFAULT_DATA_DIR;

/// Storage path utilities rooted at the data directory.
#[derive(Debug, Clone)]
pub struct StoragePaths {
    root: PathBuf,
}

impl Default for StoragePaths {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_DIR)
    }
}

impl StoragePaths {
    /// Create a new `StoragePaths` with a custom root (useful for testing).
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Root directory for all persisted data.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to the persisted store document.
    pub fn store_file(&self) -> PathBuf {
        self.root.join("store.json")
    }

    /// Protected directory holding the operator key pair.
    ///
    /// Only `crypto::provider` reads or writes inside this directory.
    pub fn keys_dir(&self) -> PathBuf {
        self.root.join("keys")
    }

    /// Path to the operator public key (PEM).
    pub fn public_key_file(&self) -> PathBuf {
        self.keys_dir().join("operator.pub")
    }

    /// Path to the operator private key (PEM).
    pub fn private_key_file(&self) -> PathBuf {
        self.keys_dir().join("operator.key")
    }
}
