// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Naming and labelling of train images.

use std::collections::BTreeMap;

use tb_wire::BuildRequest;

use crate::BuildError;

/// Registry project holding the master images.
pub const MASTER_PROJECT: &str = "master";

/// Tag suffix of a freshly built, not yet executed train.
pub const BASE_TAG: &str = "base";

/// Label keys attached to every train image.
pub mod labels {
    pub const TRAIN_ID: &str = "pht.train_id";
    pub const PROPOSAL_ID: &str = "pht.proposal_id";
    pub const SESSION_ID: &str = "pht.session_id";
    pub const HASH: &str = "pht.hash";
    pub const HASH_SIGNED: &str = "pht.hash_signed";
    pub const USER_HE_KEY: &str = "pht.user_he_key";
    pub const API_URL: &str = "pht.api_url";
}

/// `{registry}/master/{master_image}`
pub fn base_image(registry: &str, master_image: &str) -> String {
    format!("{}/{}/{}", registry, MASTER_PROJECT, master_image.trim_matches('/'))
}

/// First path segment of the master image, e.g. `python` for `python/base`.
pub fn namespace(master_image: &str) -> Result<&str, BuildError> {
    match master_image.trim().split('/').next() {
        Some(ns) if !ns.is_empty() => Ok(ns),
        _ => Err(BuildError::InvalidMasterImage(master_image.to_string())),
    }
}

/// `{registry}/{namespace}/{train_id}:base`
pub fn image_tag(registry: &str, request: &BuildRequest) -> Result<String, BuildError> {
    Ok(format!(
        "{}/{}/{}:{}",
        registry,
        namespace(&request.master_image)?,
        request.train_id,
        BASE_TAG
    ))
}

/// Labels recording where the train came from and how to reach the API.
pub fn image_labels(
    request: &BuildRequest,
    he_key: Option<&str>,
    api_url: &str,
) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    map.insert(labels::TRAIN_ID.to_string(), request.train_id.to_string());
    map.insert(labels::PROPOSAL_ID.to_string(), request.proposal_id.to_string());
    map.insert(labels::SESSION_ID.to_string(), request.session_id.clone());
    map.insert(labels::HASH.to_string(), request.hash.clone());
    map.insert(labels::HASH_SIGNED.to_string(), request.hash_signed.clone());
    if let Some(key) = he_key {
        map.insert(labels::USER_HE_KEY.to_string(), key.to_string());
    }
    map.insert(labels::API_URL.to_string(), api_url.to_string());
    map
}

#[cfg(test)]
#[path = "image_spec_tests.rs"]
mod tests;
