// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared HTTP helpers for the secret-store and bus clients.

use std::time::Duration;

use reqwest::Url;
use thiserror::Error;

/// Default timeout for a single HTTP request to a collaborator.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Ensure a base URL ends with a path separator so relative paths append.
pub fn normalize_base_url(url: &str) -> String {
    let url = url.trim();
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

/// Errors from building a collaborator URL
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("invalid URL {url:?}: {detail}")]
    Parse { url: String, detail: String },
    #[error("{0} cannot carry a path")]
    NotABase(String),
}

/// Parse a collaborator's base URL.
pub fn parse_base_url(raw: &str) -> Result<Url, UrlError> {
    let raw = raw.trim();
    let url = Url::parse(raw)
        .map_err(|e| UrlError::Parse { url: raw.to_string(), detail: e.to_string() })?;
    if url.cannot_be_a_base() {
        return Err(UrlError::NotABase(url.to_string()));
    }
    Ok(url)
}

/// `base` extended by the slash-separated `path`, then by each of `segments`.
///
/// Each entry of `segments` becomes exactly one percent-encoded path segment,
/// so a `/` inside a user id or vhost cannot change the route.
pub fn join_path(base: &Url, path: &str, segments: &[&str]) -> Result<Url, UrlError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| UrlError::NotABase(base.to_string()))?
        .pop_if_empty()
        .extend(path.split('/').filter(|s| !s.is_empty()))
        .extend(segments);
    Ok(url)
}

/// Build a client with the default request timeout.
pub fn client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()
}

/// Read a response body for an error message, truncated to keep log lines short.
pub async fn error_body(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body = tb_core::short(body.trim(), 300);
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
