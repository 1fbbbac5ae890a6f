// SPDX-License-Identifier: AGPL-3.0-or-later

//! Armored-text framing for binary ciphertext.
//!
//! PEM framing keeps artifacts portable through chat transports and file
//! downloads: `-----BEGIN ENCRYPTED ADDRESS-----`, base64 body, matching
//! end line.

use super::CryptoError;

/// PEM tag used for encrypted-address artifacts.
pub const ADDRESS_TAG: &str = "ENCRYPTED ADDRESS";

/// Armor a binary payload into portable text.
pub fn armor(payload: &[u8]) -> String {
    pem::encode(&pem::Pem::new(ADDRESS_TAG, payload))
}

/// Recover the binary payload from armored text.
///
/// # Errors
/// [`CryptoError::DecryptionFailed`] when the text is not valid PEM or
/// carries an unexpected tag.
pub fn dearmor(text: &str) -> Result<Vec<u8>, CryptoError> {
    let block = pem::parse(text)
        .map_err(|err| CryptoError::DecryptionFailed(format!("invalid armor: {err}")))?;

    if block.tag() != ADDRESS_TAG {
        return Err(CryptoError::DecryptionFailed(format!(
            "unexpected armor tag: {}",
            block.tag()
        )));
    }

    Ok(block.into_contents())
}
