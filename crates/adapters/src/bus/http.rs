// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event publishing through the RabbitMQ management HTTP API.
//!
//! Only publishing goes over HTTP. The command queue is consumed over AMQP
//! by [`super::AmqpSource`], since the management API cannot hold a message
//! unacknowledged while it is handled.

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::{Client, Url};
use serde_json::{json, Value};

use super::{BusError, EventPublisher, PublishError};
use crate::http::{self, join_path, parse_base_url, UrlError};

/// Where the bus lives and which exchange and queue the builder uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusEndpoint {
    /// Management API base URL, with or without credentials in its userinfo
    pub url: String,
    pub vhost: String,
    pub exchange: String,
    pub queue: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Credentials {
    user: String,
    password: Option<String>,
}

/// [`EventPublisher`] over the management API.
#[derive(Clone)]
pub struct HttpBus {
    client: Client,
    publish_url: Url,
    credentials: Option<Credentials>,
}

impl std::fmt::Debug for HttpBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpBus").field("publish_url", &self.publish_url.as_str()).finish()
    }
}

impl HttpBus {
    pub fn new(endpoint: &BusEndpoint) -> Result<Self, BusError> {
        let (base_url, credentials) = split_credentials(&endpoint.url)?;
        let publish_url = join_path(
            &base_url,
            "api/exchanges",
            &[endpoint.vhost.as_str(), endpoint.exchange.as_str(), "publish"],
        )
        .map_err(|e| BusError::Endpoint(e.to_string()))?;
        let client = http::client().map_err(|e| BusError::Transport(e.to_string()))?;
        Ok(Self { client, publish_url, credentials })
    }

    fn post(&self, body: &Value) -> reqwest::RequestBuilder {
        let request = self.client.post(self.publish_url.clone()).json(body);
        match &self.credentials {
            Some(c) => request.basic_auth(&c.user, c.password.as_deref()),
            None => request,
        }
    }
}

#[async_trait]
impl EventPublisher for HttpBus {
    async fn publish(&self, routing_key: &str, payload: &Value) -> Result<(), PublishError> {
        let body = publish_body(routing_key, payload);
        let response = self
            .post(&body)
            .send()
            .await
            .map_err(|e| PublishError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(PublishError::Rejected {
                routing_key: routing_key.to_string(),
                detail: http::error_body(response).await,
            });
        }
        let ack: Value =
            response.json().await.map_err(|e| PublishError::Transport(e.to_string()))?;
        if ack.get("routed").and_then(Value::as_bool) == Some(false) {
            return Err(PublishError::NotRouted(routing_key.to_string()));
        }
        Ok(())
    }
}

pub(crate) fn publish_body(routing_key: &str, payload: &Value) -> Value {
    json!({
        "properties": { "content_type": "application/json" },
        "routing_key": routing_key,
        "payload": payload.to_string(),
        "payload_encoding": "string",
    })
}

/// Split userinfo out of a management URL, returning the bare base URL.
///
/// The URL keeps userinfo percent-encoded, so both parts are decoded before
/// they go into the `Authorization` header.
fn split_credentials(raw: &str) -> Result<(Url, Option<Credentials>), BusError> {
    let mut url = parse_base_url(raw).map_err(|e| match e {
        UrlError::Parse { detail, .. } => BusError::Endpoint(detail),
        UrlError::NotABase(_) => BusError::Endpoint("management URL cannot carry a path".into()),
    })?;
    let credentials = if url.username().is_empty() {
        None
    } else {
        Some(Credentials {
            user: decode_userinfo(url.username())?,
            password: url.password().map(decode_userinfo).transpose()?,
        })
    };
    let strip = |_| BusError::Endpoint("cannot strip credentials from management URL".into());
    url.set_username("").map_err(strip)?;
    url.set_password(None).map_err(strip)?;
    Ok((url, credentials))
}

fn decode_userinfo(encoded: &str) -> Result<String, BusError> {
    percent_decode_str(encoded)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| BusError::Endpoint(format!("credentials are not UTF-8: {}", e)))
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
