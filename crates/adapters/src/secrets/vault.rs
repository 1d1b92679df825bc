// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Vault-backed secret store.
//!
//! The bootstrap token only reads the builder's AppRole secret. Every other
//! call uses the short-lived token obtained from the AppRole login, cached in
//! a [`CredentialCache`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use tb_core::{Clock, RouteInfo, SystemClock, TrainId};

use super::{CredentialCache, SecretsClient, SecretsError, ServiceCredential, UserKeys};
use crate::http::{self, join_path, parse_base_url};

const TOKEN_HEADER: &str = "X-Vault-Token";

/// Lease assumed when the login response reports none (non-expiring role).
const DEFAULT_LEASE: Duration = Duration::from_secs(24 * 60 * 60);

/// Secret paths, relative to `{vault}/v1/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultPaths {
    /// KV v1 secret holding the builder's `role_id` and `secret_id`
    pub service_secret: String,
    pub approle_login: String,
    /// KV v1 mount of per-user key material
    pub user_keys_mount: String,
    /// KV v2 mount receiving route records
    pub routes_mount: String,
}

impl Default for VaultPaths {
    fn default() -> Self {
        Self {
            service_secret: "services/tb".to_string(),
            approle_login: "auth/approle/login".to_string(),
            user_keys_mount: "user_pks".to_string(),
            routes_mount: "kv-pht-routes".to_string(),
        }
    }
}

/// [`SecretsClient`] talking to Vault's HTTP API.
#[derive(Clone)]
pub struct VaultSecrets<C: Clock = SystemClock> {
    client: Client,
    base_url: Url,
    bootstrap_token: String,
    paths: VaultPaths,
    cache: Arc<CredentialCache<C>>,
}

impl VaultSecrets<SystemClock> {
    pub fn new(base_url: &str, bootstrap_token: &str) -> Result<Self, SecretsError> {
        Self::with_clock(base_url, bootstrap_token, VaultPaths::default(), SystemClock)
    }
}

impl<C: Clock> VaultSecrets<C> {
    pub fn with_clock(
        base_url: &str,
        bootstrap_token: &str,
        paths: VaultPaths,
        clock: C,
    ) -> Result<Self, SecretsError> {
        Ok(Self {
            client: http::client()?,
            base_url: parse_base_url(base_url)?,
            bootstrap_token: bootstrap_token.to_string(),
            paths,
            cache: Arc::new(CredentialCache::new(clock)),
        })
    }

    /// `{vault}/v1/{path}`, then `ids` as single encoded segments.
    fn url(&self, path: &str, ids: &[&str]) -> Result<Url, SecretsError> {
        Ok(join_path(&self.base_url, &format!("v1/{}", path), ids)?)
    }

    async fn login(&self) -> Result<ServiceCredential, SecretsError> {
        let secret = self
            .client
            .get(self.url(&self.paths.service_secret, &[])?)
            .header(TOKEN_HEADER, &self.bootstrap_token)
            .send()
            .await?;
        if !secret.status().is_success() {
            let detail = http::error_body(secret).await;
            return Err(SecretsError::Credential(format!("reading service secret: {}", detail)));
        }
        let (role_id, secret_id) = parse_service_secret(&secret.json::<Value>().await?)?;

        let login = self
            .client
            .post(self.url(&self.paths.approle_login, &[])?)
            .json(&json!({ "role_id": role_id, "secret_id": secret_id }))
            .send()
            .await?;
        if !login.status().is_success() {
            let detail = http::error_body(login).await;
            return Err(SecretsError::Credential(format!("approle login: {}", detail)));
        }
        let login = parse_login(&login.json::<Value>().await?)?;
        Ok(ServiceCredential::issued(
            login.client_token,
            login.accessor,
            self.cache.clock().now(),
            login.lease,
        ))
    }

    /// Map a non-success response, dropping the cached credential if Vault rejected it.
    async fn failure(&self, response: reqwest::Response, what: &str) -> SecretsError {
        let status = response.status();
        let detail = http::error_body(response).await;
        match status {
            StatusCode::NOT_FOUND => SecretsError::NotFound(what.to_string()),
            StatusCode::FORBIDDEN | StatusCode::UNAUTHORIZED => {
                self.cache.invalidate().await;
                SecretsError::Credential(format!("{}: {}", what, detail))
            }
            _ => SecretsError::Transport(format!("{}: {}", what, detail)),
        }
    }
}

#[async_trait]
impl<C: Clock> SecretsClient for VaultSecrets<C> {
    async fn service_credential(&self) -> Result<ServiceCredential, SecretsError> {
        self.cache.get_or_refresh(|| self.login()).await
    }

    async fn user_keys(&self, user_id: &str) -> Result<UserKeys, SecretsError> {
        let credential = self.service_credential().await?;
        let url = self.url(&self.paths.user_keys_mount, &[user_id])?;
        let path = url.path().to_string();
        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, &credential.token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.failure(response, &path).await);
        }
        parse_user_keys(&response.json::<Value>().await?)
    }

    async fn store_route(
        &self,
        train_id: &TrainId,
        route: &RouteInfo,
    ) -> Result<(), SecretsError> {
        let credential = self.service_credential().await?;
        let mount = format!("{}/data", self.paths.routes_mount);
        let url = self.url(&mount, &[train_id.as_str()])?;
        let path = url.path().to_string();
        let response = self
            .client
            .post(url)
            .header(TOKEN_HEADER, &credential.token)
            .json(&json!({ "data": route }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(self.failure(response, &path).await);
        }
        tracing::debug!(train_id = %train_id, stations = route.stations.len(), "route stored");
        Ok(())
    }
}

/// Token issued by an AppRole login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Login {
    pub client_token: String,
    pub accessor: String,
    pub lease: Duration,
}

#[derive(Deserialize)]
struct LoginBody {
    auth: LoginAuth,
}

#[derive(Deserialize)]
struct LoginAuth {
    client_token: String,
    #[serde(default)]
    accessor: String,
    #[serde(default)]
    lease_duration: u64,
}

pub(crate) fn parse_login(body: &Value) -> Result<Login, SecretsError> {
    let body = LoginBody::deserialize(body)
        .map_err(|e| SecretsError::Malformed(format!("approle login: {}", e)))?;
    if body.auth.client_token.is_empty() {
        return Err(SecretsError::Malformed("approle login: empty client_token".into()));
    }
    let lease = match body.auth.lease_duration {
        0 => DEFAULT_LEASE,
        secs => Duration::from_secs(secs),
    };
    Ok(Login { client_token: body.auth.client_token, accessor: body.auth.accessor, lease })
}

#[derive(Deserialize)]
struct ServiceSecretBody {
    data: ServiceSecret,
}

#[derive(Deserialize)]
struct ServiceSecret {
    role_id: String,
    secret_id: String,
}

/// Extract `(role_id, secret_id)` from the service secret.
pub(crate) fn parse_service_secret(body: &Value) -> Result<(String, String), SecretsError> {
    let body = ServiceSecretBody::deserialize(body)
        .map_err(|e| SecretsError::Malformed(format!("service secret: {}", e)))?;
    Ok((body.data.role_id, body.data.secret_id))
}

#[derive(Deserialize)]
struct UserKeysBody {
    data: StoredUserKeys,
}

#[derive(Deserialize)]
struct StoredUserKeys {
    #[serde(rename = "rsa_public_key", alias = "public_key")]
    public_key: String,
    #[serde(default, alias = "paillier_public_key")]
    he_key: Option<String>,
}

pub(crate) fn parse_user_keys(body: &Value) -> Result<UserKeys, SecretsError> {
    let body = UserKeysBody::deserialize(body)
        .map_err(|e| SecretsError::Malformed(format!("user keys: {}", e)))?;
    let he_key = body.data.he_key.filter(|k| !k.trim().is_empty());
    Ok(UserKeys { public_key: body.data.public_key.trim().to_string(), he_key })
}

#[cfg(test)]
#[path = "vault_tests.rs"]
mod tests;
