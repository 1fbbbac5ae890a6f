// SPDX-License-Identifier: AGPL-3.0-or-later

//! # Secret-Phrase Credentials
//!
//! Users identify with a secret phrase instead of a username. The phrase
//! is an opaque credential: it has equality, no structure, and a redacted
//! `Debug`. Identity and credential are split at this boundary — the rest
//! of the system (and the persisted store) only ever sees the derived
//! [`UserId`], the hex SHA-256 digest of the NFKC-normalized phrase.
//!
//! The [`AuthenticatedUser`] extractor resolves the `X-Secret-Phrase`
//! header to a registered user; the [`Operator`] extractor guards the
//! operator-only surface with a shared token from the environment.

use axum::{extract::FromRequestParts, http::request::Parts};
use sha2::{Digest, Sha256};
use unicode_normalization::UnicodeNormalization;

use crate::error::ShopError;
use crate::models::{User, UserId};
use crate::state::AppState;

/// Header carrying the caller's secret phrase.
pub const SECRET_PHRASE_HEADER: &str = "x-secret-phrase";

/// Header carrying the operator token for admin endpoints.
pub const OPERATOR_TOKEN_HEADER: &str = "x-operator-token";

/// An opaque user credential.
///
/// Never logged, never persisted, never echoed back. The only derived
/// form that leaves this type is the one-way [`UserId`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecretPhrase(String);

impl SecretPhrase {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Derive the persistent user identifier from the phrase.
    ///
    /// NFKC normalization first, so visually identical phrases with
    /// different Unicode encodings resolve to the same user.
    pub fn derive_user_id(&self) -> UserId {
        let normalized: String = self.0.nfkc().collect();
        let digest = Sha256::digest(normalized.as_bytes());
        let hex: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        UserId(hex)
    }
}

impl std::fmt::Debug for SecretPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretPhrase(<redacted>)")
    }
}

/// A request credential resolved to a registered user.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub user: User,
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ShopError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let phrase = parts
            .headers
            .get(SECRET_PHRASE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(ShopError::Unauthorized)?;

        let user_id = SecretPhrase::new(phrase).derive_user_id();

        let doc = state.store.snapshot().await;
        let user = doc
            .users
            .get(&user_id)
            .cloned()
            .ok_or(ShopError::Unauthorized)?;

        Ok(Self { user_id, user })
    }
}

/// Marker extractor for the operator-only surface.
///
/// Requests must carry `X-Operator-Token` matching `OPERATOR_TOKEN` from
/// the environment. When the variable is unset the whole operator surface
/// is disabled.
#[derive(Debug, Clone, Copy)]
pub struct Operator;

impl FromRequestParts<AppState> for Operator {
    type Rejection = ShopError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let expected = state
            .operator_token
            .as_deref()
            .ok_or(ShopError::Unauthorized)?;

        let presented = parts
            .headers
            .get(OPERATOR_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok())
            .ok_or(ShopError::Unauthorized)?;

        if presented == expected {
            Ok(Operator)
        } else {
            Err(ShopError::Unauthorized)
        }
    }
}
