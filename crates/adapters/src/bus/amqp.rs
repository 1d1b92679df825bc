// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command queue consumer over AMQP.
//!
//! Messages are taken with `basic.get` in manual-ack mode. The broker keeps
//! each one unacknowledged on our channel until [`MessageSource::ack`] sends
//! `basic.ack`, so a process that dies mid-build leaves the command to be
//! redelivered instead of losing it.
//!
//! One connection and channel are shared by every clone. A failed call drops
//! them; the next fetch reconnects on a new channel generation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lapin::options::{BasicAckOptions, BasicGetOptions};
use lapin::uri::AMQPUri;
use lapin::{Channel, Connection, ConnectionProperties};
use tokio::sync::Mutex;

use super::{BusError, Delivery, DeliveryTag, MessageSource};

struct Session {
    connection: Connection,
    channel: Channel,
    generation: u64,
}

impl Session {
    /// Close the connection. The broker requeues anything still unacked.
    async fn close(self) {
        if let Err(e) = self.connection.close(200, "reconnecting").await {
            tracing::debug!(generation = self.generation, error = %e, "closing stale connection");
        }
    }
}

/// [`MessageSource`] reading one queue over AMQP.
#[derive(Clone)]
pub struct AmqpSource {
    uri: AMQPUri,
    queue: String,
    session: Arc<Mutex<Option<Session>>>,
    generations: Arc<AtomicU64>,
}

impl std::fmt::Debug for AmqpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmqpSource")
            .field("host", &self.uri.authority.host)
            .field("port", &self.uri.authority.port)
            .field("vhost", &self.uri.vhost)
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl AmqpSource {
    /// Parse `url` (`amqp://` or `amqps://`) and consume `queue` in `vhost`.
    ///
    /// Nothing connects until the first fetch.
    pub fn new(url: &str, vhost: &str, queue: &str) -> Result<Self, BusError> {
        let mut uri: AMQPUri = url
            .trim()
            .parse()
            .map_err(|e: String| BusError::Endpoint(format!("AMQP URL: {}", e)))?;
        uri.vhost = vhost.to_string();
        Ok(Self {
            uri,
            queue: queue.to_string(),
            session: Arc::new(Mutex::new(None)),
            generations: Arc::new(AtomicU64::new(0)),
        })
    }

    async fn connect(&self) -> Result<Session, BusError> {
        let properties = ConnectionProperties::default();
        let connection =
            Connection::connect_uri(self.uri.clone(), properties).await.map_err(transport)?;
        let channel = connection.create_channel().await.map_err(transport)?;
        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(
            host = %self.uri.authority.host,
            vhost = %self.uri.vhost,
            queue = %self.queue,
            generation,
            "connected to command queue"
        );
        Ok(Session { connection, channel, generation })
    }
}

fn transport(e: lapin::Error) -> BusError {
    BusError::Transport(e.to_string())
}

#[async_trait]
impl MessageSource for AmqpSource {
    async fn fetch(&self) -> Result<Option<Delivery>, BusError> {
        let mut session = self.session.lock().await;
        if !session.as_ref().is_some_and(|s| s.channel.status().connected()) {
            if let Some(stale) = session.take() {
                stale.close().await;
            }
            *session = Some(self.connect().await?);
        }
        let Some(current) = session.as_ref() else {
            return Ok(None);
        };
        let generation = current.generation;

        let fetched =
            current.channel.basic_get(&self.queue, BasicGetOptions { no_ack: false }).await;
        match fetched {
            Ok(Some(mut message)) => Ok(Some(Delivery {
                payload: std::mem::take(&mut message.delivery.data),
                routing_key: message.delivery.routing_key.as_str().to_string(),
                redelivered: message.delivery.redelivered,
                tag: DeliveryTag { channel: generation, tag: message.delivery.delivery_tag },
            })),
            Ok(None) => Ok(None),
            Err(e) => {
                if let Some(stale) = session.take() {
                    stale.close().await;
                }
                Err(transport(e))
            }
        }
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), BusError> {
        let mut session = self.session.lock().await;
        let Some(current) = session.as_ref().filter(|s| s.generation == delivery.tag.channel)
        else {
            return Err(BusError::ChannelClosed(delivery.tag.tag));
        };
        let acked = current.channel.basic_ack(delivery.tag.tag, BasicAckOptions::default()).await;
        if let Err(e) = acked {
            if let Some(stale) = session.take() {
                stale.close().await;
            }
            return Err(transport(e));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "amqp_tests.rs"]
mod tests;
