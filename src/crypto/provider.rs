// SPDX-License-Identifier: AGPL-3.0-or-later

//! Operator key lifecycle and address envelope encryption.
//!
//! The provider exclusively owns the key material under
//! `{DATA_DIR}/keys/`. Encryption uses an ephemeral X25519 agreement
//! against the operator's static public key, so encrypting requires no
//! secret at all; decryption is the operator-facing audit path and is the
//! only operation that touches the private key.

use std::fs;
use std::path::Path;
use std::sync::RwLock;

use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::{rngs::OsRng, RngCore};
use x25519_dalek::{EphemeralSecret, PublicKey, StaticSecret};

use crate::models::EncryptedAddress;
use crate::storage::StoragePaths;

use super::{armor, CryptoError};

/// Domain-separation context for the envelope KDF.
const KDF_CONTEXT_ENVELOPE: &str = "storefront-server 2026-08 address envelope v1";

/// XChaCha20-Poly1305 nonce size.
const NONCE_SIZE: usize = 24;

/// X25519 key size.
const KEY_SIZE: usize = 32;

/// Poly1305 tag size; the shortest valid sealed payload is an empty
/// plaintext plus this tag.
const TAG_SIZE: usize = 16;

const PRIVATE_KEY_TAG: &str = "X25519 PRIVATE KEY";
const PUBLIC_KEY_TAG: &str = "X25519 PUBLIC KEY";

struct OperatorKeys {
    secret: StaticSecret,
    public: PublicKey,
}

/// Public-key encryption capability for delivery addresses.
pub struct EncryptionProvider {
    paths: StoragePaths,
    keys: RwLock<Option<OperatorKeys>>,
}

impl EncryptionProvider {
    /// Create a provider over the given storage layout. No key material
    /// is touched until [`Self::ensure_keypair`] runs.
    pub fn new(paths: StoragePaths) -> Self {
        Self {
            paths,
            keys: RwLock::new(None),
        }
    }

    /// Idempotently load or generate the operator key pair.
    ///
    /// On first run the pair is generated and persisted under the
    /// protected keys directory (`0700`, private key `0600`). Subsequent
    /// calls load the existing pair and never generate a second one.
    pub fn ensure_keypair(&self) -> Result<(), CryptoError> {
        let mut guard = self
            .keys
            .write()
            .map_err(|_| CryptoError::KeyGeneration("key lock poisoned".into()))?;

        if guard.is_some() {
            return Ok(());
        }

        let private_path = self.paths.private_key_file();
        let keys = if private_path.exists() {
            self.load_keys(&private_path)?
        } else {
            self.generate_keys()?
        };

        *guard = Some(keys);
        Ok(())
    }

    /// The operator's public key, for encryption use.
    ///
    /// # Errors
    /// [`CryptoError::KeyNotInitialized`] before `ensure_keypair`.
    pub fn public_key(&self) -> Result<PublicKey, CryptoError> {
        let guard = self
            .keys
            .read()
            .map_err(|_| CryptoError::KeyNotInitialized)?;
        guard
            .as_ref()
            .map(|keys| keys.public)
            .ok_or(CryptoError::KeyNotInitialized)
    }

    /// Encrypt a plaintext address for the recipient key.
    ///
    /// Takes the plaintext by value: it lives only inside this call and
    /// drops when the function returns. The plaintext is never logged.
    pub fn encrypt(
        &self,
        plaintext: String,
        recipient: &PublicKey,
    ) -> Result<EncryptedAddress, CryptoError> {
        let ephemeral = EphemeralSecret::random_from_rng(OsRng);
        let ephemeral_public = PublicKey::from(&ephemeral);
        let shared = ephemeral.diffie_hellman(recipient);

        let key = derive_envelope_key(
            shared.as_bytes(),
            ephemeral_public.as_bytes(),
            recipient.as_bytes(),
        );

        let mut nonce = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let cipher = XChaCha20Poly1305::new((&key).into());
        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext.as_bytes())
            .map_err(|_| CryptoError::EncryptionFailed("AEAD seal failed".into()))?;

        let mut payload = Vec::with_capacity(KEY_SIZE + NONCE_SIZE + ciphertext.len());
        payload.extend_from_slice(ephemeral_public.as_bytes());
        payload.extend_from_slice(&nonce);
        payload.extend_from_slice(&ciphertext);

        Ok(EncryptedAddress(armor::armor(&payload)))
    }

    /// Decrypt an armored artifact. Operator audit path only; the general
    /// user flow never calls this.
    pub fn decrypt(&self, artifact: &EncryptedAddress) -> Result<String, CryptoError> {
        let guard = self
            .keys
            .read()
            .map_err(|_| CryptoError::KeyNotInitialized)?;
        let keys = guard.as_ref().ok_or(CryptoError::KeyNotInitialized)?;

        let payload = armor::dearmor(artifact.as_str())?;
        if payload.len() < KEY_SIZE + NONCE_SIZE + TAG_SIZE {
            return Err(CryptoError::DecryptionFailed("payload too short".into()));
        }

        let (ephemeral_bytes, rest) = payload.split_at(KEY_SIZE);
        let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

        let mut ephemeral_public = [0u8; KEY_SIZE];
        ephemeral_public.copy_from_slice(ephemeral_bytes);
        let ephemeral_public = PublicKey::from(ephemeral_public);

        let shared = keys.secret.diffie_hellman(&ephemeral_public);
        let key = derive_envelope_key(
            shared.as_bytes(),
            ephemeral_public.as_bytes(),
            keys.public.as_bytes(),
        );

        let cipher = XChaCha20Poly1305::new((&key).into());
        let plaintext = cipher
            .decrypt(XNonce::from_slice(nonce_bytes), ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed("AEAD open failed".into()))?;

        String::from_utf8(plaintext)
            .map_err(|_| CryptoError::DecryptionFailed("plaintext is not UTF-8".into()))
    }

    fn generate_keys(&self) -> Result<OperatorKeys, CryptoError> {
        let secret = StaticSecret::random_from_rng(OsRng);
        let public = PublicKey::from(&secret);

        let keys_dir = self.paths.keys_dir();
        fs::create_dir_all(&keys_dir)
            .map_err(|err| CryptoError::KeyGeneration(err.to_string()))?;
        restrict_permissions(&keys_dir, 0o700)?;

        let private_pem = pem::encode(&pem::Pem::new(PRIVATE_KEY_TAG, secret.to_bytes().to_vec()));
        let public_pem = pem::encode(&pem::Pem::new(PUBLIC_KEY_TAG, public.as_bytes().to_vec()));

        let private_path = self.paths.private_key_file();
        fs::write(&private_path, private_pem)
            .map_err(|err| CryptoError::KeyGeneration(err.to_string()))?;
        restrict_permissions(&private_path, 0o600)?;

        fs::write(self.paths.public_key_file(), public_pem)
            .map_err(|err| CryptoError::KeyGeneration(err.to_string()))?;

        tracing::info!(dir = %keys_dir.display(), "generated operator key pair");
        Ok(OperatorKeys { secret, public })
    }

    fn load_keys(&self, private_path: &Path) -> Result<OperatorKeys, CryptoError> {
        let pem_text = fs::read_to_string(private_path)
            .map_err(|err| CryptoError::KeyGeneration(err.to_string()))?;
        let block = pem::parse(&pem_text)
            .map_err(|err| CryptoError::KeyGeneration(format!("bad private key PEM: {err}")))?;

        if block.tag() != PRIVATE_KEY_TAG {
            return Err(CryptoError::KeyGeneration(format!(
                "unexpected private key tag: {}",
                block.tag()
            )));
        }

        let contents = block.contents();
        let secret_bytes: [u8; KEY_SIZE] = contents
            .try_into()
            .map_err(|_| CryptoError::KeyGeneration("private key is not 32 bytes".into()))?;

        let secret = StaticSecret::from(secret_bytes);
        let public = PublicKey::from(&secret);
        Ok(OperatorKeys { secret, public })
    }
}

/// BLAKE3 KDF with domain separation; binds the envelope key to both
/// public keys of the exchange.
fn derive_envelope_key(
    shared_secret: &[u8],
    ephemeral_public: &[u8],
    recipient_public: &[u8],
) -> [u8; KEY_SIZE] {
    let mut hasher = blake3::Hasher::new_derive_key(KDF_CONTEXT_ENVELOPE);
    hasher.update(shared_secret);
    hasher.update(ephemeral_public);
    hasher.update(recipient_public);
    let hash = hasher.finalize();

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&hash.as_bytes()[..KEY_SIZE]);
    key
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> Result<(), CryptoError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|err| CryptoError::KeyGeneration(err.to_string()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> Result<(), CryptoError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_provider() -> (tempfile::TempDir, EncryptionProvider) {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = EncryptionProvider::new(StoragePaths::new(dir.path()));
        (dir, provider)
    }

    #[test]
    fn public_key_before_ensure_fails() {
        let (_dir, provider) = test_provider();
        assert!(matches!(
            provider.public_key(),
            Err(CryptoError::KeyNotInitialized)
        ));
    }

    #[test]
    fn ensure_keypair_is_idempotent() {
        let (_dir, provider) = test_provider();

        provider.ensure_keypair().expect("first ensure");
        let first = provider.public_key().expect("public key");

        provider.ensure_keypair().expect("second ensure");
        let second = provider.public_key().expect("public key");

        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn keypair_survives_restart() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paths = StoragePaths::new(dir.path());

        let provider = EncryptionProvider::new(paths.clone());
        provider.ensure_keypair().expect("ensure");
        let original = provider.public_key().expect("public key");

        let reloaded = EncryptionProvider::new(paths);
        reloaded.ensure_keypair().expect("ensure after restart");
        let restored = reloaded.public_key().expect("public key");

        assert_eq!(original.as_bytes(), restored.as_bytes());
    }

    #[test]
    fn encrypt_decrypt_round_trip() {
        let (_dir, provider) = test_provider();
        provider.ensure_keypair().expect("ensure");

        let recipient = provider.public_key().expect("public key");
        let artifact = provider
            .encrypt("221B Baker St".to_string(), &recipient)
            .expect("encrypt");

        assert!(artifact.as_str().contains("BEGIN ENCRYPTED ADDRESS"));
        // The armor must not contain the plaintext.
        assert!(!artifact.as_str().contains("Baker"));

        let plaintext = provider.decrypt(&artifact).expect("decrypt");
        assert_eq!(plaintext, "221B Baker St");
    }

    #[test]
    fn tampered_artifact_fails_to_decrypt() {
        let (_dir, provider) = test_provider();
        provider.ensure_keypair().expect("ensure");

        let recipient = provider.public_key().expect("public key");
        let artifact = provider
            .encrypt("10 Downing St".to_string(), &recipient)
            .expect("encrypt");

        let mut payload = armor::dearmor(artifact.as_str()).expect("dearmor");
        let last = payload.len() - 1;
        payload[last] ^= 0xFF;
        let tampered = EncryptedAddress(armor::armor(&payload));

        assert!(matches!(
            provider.decrypt(&tampered),
            Err(CryptoError::DecryptionFailed(_))
        ));
    }

    #[test]
    fn decrypt_without_keys_fails() {
        let (_dir, provider) = test_provider();
        let artifact = EncryptedAddress("junk".into());
        assert!(matches!(
            provider.decrypt(&artifact),
            Err(CryptoError::KeyNotInitialized)
        ));
    }

    #[test]
    fn truncated_payload_is_rejected() {
        let (_dir, provider) = test_provider();
        provider.ensure_keypair().expect("ensure");

        let short = EncryptedAddress(armor::armor(&[0u8; 40]));
        assert!(matches!(
            provider.decrypt(&short),
            Err(CryptoError::DecryptionFailed(_))
        ));
    }
}
