// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message bus: outgoing events and the inbound command queue.

mod amqp;
mod http;

pub use self::amqp::AmqpSource;
pub use self::http::{BusEndpoint, HttpBus};

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors from publishing an outgoing message
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("publish transport failed: {0}")]
    Transport(String),
    #[error("publish to {routing_key} rejected: {detail}")]
    Rejected { routing_key: String, detail: String },
    #[error("no queue bound for routing key {0}")]
    NotRouted(String),
}

/// Errors from consuming the command queue
#[derive(Debug, Error)]
pub enum BusError {
    #[error("bus transport failed: {0}")]
    Transport(String),
    #[error("bus request rejected: {0}")]
    Rejected(String),
    #[error("unexpected bus response: {0}")]
    Malformed(String),
    #[error("invalid bus endpoint: {0}")]
    Endpoint(String),
    #[error("channel of delivery {0} closed before the ack; the broker redelivers it")]
    ChannelClosed(u64),
}

/// Identifies a delivery to the broker for acknowledgement.
///
/// Tags are only meaningful on the channel that issued them, so the tag
/// carries that channel's generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryTag {
    pub channel: u64,
    pub tag: u64,
}

/// One message taken off the command queue, unacknowledged until
/// [`MessageSource::ack`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub payload: Vec<u8>,
    pub routing_key: String,
    pub redelivered: bool,
    pub tag: DeliveryTag,
}

impl Delivery {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            payload: payload.into(),
            routing_key: String::new(),
            redelivered: false,
            tag: DeliveryTag::default(),
        }
    }
}

/// Publishes outgoing JSON messages to an audience identified by routing key
#[async_trait]
pub trait EventPublisher: Clone + Send + Sync + 'static {
    async fn publish(&self, routing_key: &str, payload: &Value) -> Result<(), PublishError>;
}

/// Source of inbound command messages
#[async_trait]
pub trait MessageSource: Clone + Send + Sync + 'static {
    /// Take the next message, or `None` if the queue is empty.
    ///
    /// The message stays on the broker, invisible to other consumers, until
    /// it is acknowledged. If the connection drops first it is requeued.
    async fn fetch(&self) -> Result<Option<Delivery>, BusError>;

    /// Acknowledge a message once it has been handled, removing it for good.
    async fn ack(&self, delivery: &Delivery) -> Result<(), BusError>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakePublisher, FakeSource, PublishedMessage};
