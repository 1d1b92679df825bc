// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory secret store for tests.

#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tb_core::{RouteInfo, TrainId};

use super::{SecretsClient, SecretsError, ServiceCredential, UserKeys};

#[derive(Default)]
struct FakeSecretsState {
    keys: HashMap<String, UserKeys>,
    routes: Vec<(TrainId, RouteInfo)>,
    fail_credential: bool,
    fail_store_route: bool,
    credential_calls: usize,
    key_lookups: Vec<String>,
}

/// Fake secret store. Clones share state.
#[derive(Clone, Default)]
pub struct FakeSecrets {
    inner: Arc<Mutex<FakeSecretsState>>,
}

impl FakeSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register keys for a user
    pub fn with_user(self, user_id: &str, public_key: &str, he_key: Option<&str>) -> Self {
        self.inner.lock().keys.insert(
            user_id.to_string(),
            UserKeys { public_key: public_key.to_string(), he_key: he_key.map(String::from) },
        );
        self
    }

    pub fn fail_credential(&self, fail: bool) {
        self.inner.lock().fail_credential = fail;
    }

    pub fn fail_store_route(&self, fail: bool) {
        self.inner.lock().fail_store_route = fail;
    }

    /// Routes stored so far, in call order
    pub fn routes(&self) -> Vec<(TrainId, RouteInfo)> {
        self.inner.lock().routes.clone()
    }

    pub fn route(&self, train_id: &str) -> Option<RouteInfo> {
        self.inner.lock().routes.iter().rev().find(|(id, _)| id == train_id).map(|(_, r)| r.clone())
    }

    pub fn credential_calls(&self) -> usize {
        self.inner.lock().credential_calls
    }

    /// User ids looked up so far, in call order
    pub fn key_lookups(&self) -> Vec<String> {
        self.inner.lock().key_lookups.clone()
    }
}

#[async_trait]
impl SecretsClient for FakeSecrets {
    async fn service_credential(&self) -> Result<ServiceCredential, SecretsError> {
        let mut state = self.inner.lock();
        state.credential_calls += 1;
        if state.fail_credential {
            return Err(SecretsError::Credential("approle login: 403 Forbidden".into()));
        }
        Ok(ServiceCredential::issued(
            "fake-token".into(),
            "fake-accessor".into(),
            Instant::now(),
            Duration::from_secs(3600),
        ))
    }

    async fn user_keys(&self, user_id: &str) -> Result<UserKeys, SecretsError> {
        let mut state = self.inner.lock();
        state.key_lookups.push(user_id.to_string());
        state
            .keys
            .get(user_id)
            .cloned()
            .ok_or_else(|| SecretsError::NotFound(format!("user_pks/{}", user_id)))
    }

    async fn store_route(
        &self,
        train_id: &TrainId,
        route: &RouteInfo,
    ) -> Result<(), SecretsError> {
        let mut state = self.inner.lock();
        if state.fail_store_route {
            return Err(SecretsError::Transport("kv-pht-routes: 503 Service Unavailable".into()));
        }
        state.routes.push((train_id.clone(), route.clone()));
        Ok(())
    }
}
