// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(coverage_nightly, coverage(off))]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{BusError, Delivery, DeliveryTag, EventPublisher, MessageSource, PublishError};

/// Recorded publish
#[derive(Debug, Clone, PartialEq)]
pub struct PublishedMessage {
    pub routing_key: String,
    pub payload: Value,
}

impl PublishedMessage {
    /// The message's `type` field, if any
    pub fn kind(&self) -> Option<&str> {
        self.payload.get("type").and_then(Value::as_str)
    }
}

#[derive(Default)]
struct FakePublisherState {
    messages: Vec<PublishedMessage>,
    fail: bool,
}

/// Fake publisher for testing. Clones share state.
#[derive(Clone, Default)]
pub struct FakePublisher {
    inner: Arc<Mutex<FakePublisherState>>,
}

impl FakePublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make publishes fail (the attempt is still recorded)
    pub fn fail(&self, fail: bool) {
        self.inner.lock().fail = fail;
    }

    /// All publish attempts, in order
    pub fn messages(&self) -> Vec<PublishedMessage> {
        self.inner.lock().messages.clone()
    }

    /// Attempts on one routing key, in order
    pub fn on(&self, routing_key: &str) -> Vec<PublishedMessage> {
        self.inner
            .lock()
            .messages
            .iter()
            .filter(|m| m.routing_key == routing_key)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl EventPublisher for FakePublisher {
    async fn publish(&self, routing_key: &str, payload: &Value) -> Result<(), PublishError> {
        let mut state = self.inner.lock();
        state.messages.push(PublishedMessage {
            routing_key: routing_key.to_string(),
            payload: payload.clone(),
        });
        if state.fail {
            return Err(PublishError::Transport("connection reset".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct FakeSourceState {
    queue: VecDeque<Delivery>,
    unacked: Vec<Delivery>,
    acked: Vec<Delivery>,
    next_tag: u64,
    channel: u64,
    fetch_error: Option<String>,
}

/// In-memory command queue with broker ack semantics. Clones share state.
///
/// A fetched message moves to the unacked set until it is acked. Dropping
/// the connection puts unacked messages back at the head of the queue,
/// marked redelivered.
#[derive(Clone, Default)]
pub struct FakeSource {
    inner: Arc<Mutex<FakeSourceState>>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, payload: impl Into<Vec<u8>>) {
        self.inner.lock().queue.push_back(Delivery::new(payload));
    }

    /// Make the next fetch fail once
    pub fn fail_next_fetch(&self, detail: &str) {
        self.inner.lock().fetch_error = Some(detail.to_string());
    }

    /// Simulate the consumer's connection dying: requeue everything unacked.
    pub fn drop_connection(&self) {
        let mut state = self.inner.lock();
        state.channel += 1;
        let unacked = std::mem::take(&mut state.unacked);
        for mut delivery in unacked.into_iter().rev() {
            delivery.redelivered = true;
            delivery.tag = DeliveryTag::default();
            state.queue.push_front(delivery);
        }
    }

    /// Messages waiting on the queue
    pub fn pending(&self) -> usize {
        self.inner.lock().queue.len()
    }

    /// Messages fetched but not yet acked
    pub fn unacked(&self) -> Vec<Delivery> {
        self.inner.lock().unacked.clone()
    }

    pub fn acked(&self) -> Vec<Delivery> {
        self.inner.lock().acked.clone()
    }
}

#[async_trait]
impl MessageSource for FakeSource {
    async fn fetch(&self) -> Result<Option<Delivery>, BusError> {
        let mut state = self.inner.lock();
        if let Some(detail) = state.fetch_error.take() {
            return Err(BusError::Transport(detail));
        }
        let Some(mut delivery) = state.queue.pop_front() else {
            return Ok(None);
        };
        state.next_tag += 1;
        delivery.tag = DeliveryTag { channel: state.channel, tag: state.next_tag };
        state.unacked.push(delivery.clone());
        Ok(Some(delivery))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), BusError> {
        let mut state = self.inner.lock();
        let Some(index) = state.unacked.iter().position(|d| d.tag == delivery.tag) else {
            return Err(BusError::ChannelClosed(delivery.tag.tag));
        };
        let delivery = state.unacked.remove(index);
        state.acked.push(delivery);
        Ok(())
    }
}
