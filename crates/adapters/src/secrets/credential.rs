// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service credential and its refresh-serializing cache.

use std::future::Future;
use std::time::{Duration, Instant};

use tb_core::Clock;
use tokio::sync::Mutex;

use super::SecretsError;

/// A credential this close to expiry counts as stale.
pub const REFRESH_SKEW: Duration = Duration::from_secs(30);

/// Short-lived token authorizing secret-store calls.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceCredential {
    pub token: String,
    /// Who the token was issued to (token accessor)
    pub identity: String,
    pub expires_at: Instant,
}

impl ServiceCredential {
    pub fn issued(token: String, identity: String, now: Instant, ttl: Duration) -> Self {
        Self { token, identity, expires_at: now + ttl }
    }

    /// Check if the credential is still usable at `now`, allowing for [`REFRESH_SKEW`].
    pub fn is_fresh(&self, now: Instant) -> bool {
        now + REFRESH_SKEW < self.expires_at
    }
}

impl std::fmt::Debug for ServiceCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCredential")
            .field("token", &"<redacted>")
            .field("identity", &self.identity)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Holds at most one credential and refreshes it when stale.
///
/// The slot lock is held across the refresh, so callers that find the
/// credential stale at the same time queue behind a single refresh and then
/// read its result.
pub struct CredentialCache<C: Clock> {
    slot: Mutex<Option<ServiceCredential>>,
    clock: C,
}

impl<C: Clock> CredentialCache<C> {
    pub fn new(clock: C) -> Self {
        Self { slot: Mutex::new(None), clock }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Return the cached credential, calling `refresh` first if it is missing or stale.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<ServiceCredential, SecretsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ServiceCredential, SecretsError>>,
    {
        let mut slot = self.slot.lock().await;
        if let Some(cred) = slot.as_ref() {
            if cred.is_fresh(self.clock.now()) {
                return Ok(cred.clone());
            }
            tracing::info!(identity = %cred.identity, "service credential stale, refreshing");
        }

        let fresh = refresh().await?;
        if !fresh.is_fresh(self.clock.now()) {
            *slot = None;
            return Err(SecretsError::Credential("issued credential is already expired".into()));
        }
        tracing::info!(identity = %fresh.identity, "service credential issued");
        *slot = Some(fresh.clone());
        Ok(fresh)
    }

    /// Drop the cached credential, e.g. after the store rejected it.
    pub async fn invalidate(&self) {
        *self.slot.lock().await = None;
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
