// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret store access: service credential, per-user keys, route storage.

mod credential;
mod vault;

pub use credential::{CredentialCache, ServiceCredential, REFRESH_SKEW};
pub use vault::{VaultPaths, VaultSecrets};

use async_trait::async_trait;
use tb_core::{RouteInfo, TrainId};
use thiserror::Error;

/// Errors from secret store operations
#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("secret not found: {0}")]
    NotFound(String),
    #[error("service credential unavailable: {0}")]
    Credential(String),
    #[error("secret store request failed: {0}")]
    Transport(String),
    #[error("unexpected secret store response: {0}")]
    Malformed(String),
    #[error("invalid secret store URL: {0}")]
    Url(#[from] crate::http::UrlError),
}

impl From<reqwest::Error> for SecretsError {
    fn from(e: reqwest::Error) -> Self {
        SecretsError::Transport(e.to_string())
    }
}

/// Cryptographic material registered for one user.
#[derive(Clone, PartialEq, Eq)]
pub struct UserKeys {
    /// Hex-encoded PEM or DER RSA public key used to verify train signatures
    pub public_key: String,
    /// Homomorphic-encryption public key, if the user registered one
    pub he_key: Option<String>,
}

impl std::fmt::Debug for UserKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserKeys")
            .field("public_key", &tb_core::short(&self.public_key, 12))
            .field("he_key", &self.he_key.is_some())
            .finish()
    }
}

/// Client for the secret store
#[async_trait]
pub trait SecretsClient: Clone + Send + Sync + 'static {
    /// A valid service credential. Cached; never returned expired.
    async fn service_credential(&self) -> Result<ServiceCredential, SecretsError>;

    /// Keys registered for `user_id`. Fails with `NotFound` if absent.
    async fn user_keys(&self, user_id: &str) -> Result<UserKeys, SecretsError>;

    /// Store routing data for the downstream router, keyed by train id.
    async fn store_route(&self, train_id: &TrainId, route: &RouteInfo)
        -> Result<(), SecretsError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeSecrets;
