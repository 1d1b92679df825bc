// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command queue consumer.
//!
//! Pulls messages off the bus and hands each one to the orchestrator on its
//! own task. A semaphore bounds how many messages are handled at once; the
//! loop does not fetch again until a permit is free, so excess commands wait
//! on the broker rather than in memory.
//!
//! A message is acked only after the orchestrator has answered it. Anything
//! in flight when the process dies is redelivered by the broker.

use std::sync::Arc;
use std::time::Duration;

use tb_adapters::{Delivery, EventPublisher, ImageAssembler, MessageSource, SecretsClient};
use tb_engine::Orchestrator;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Pulls commands from `M` and runs them through the orchestrator.
pub struct Consumer<M, S, I, P> {
    source: M,
    orchestrator: Orchestrator<S, I, P>,
    permits: Arc<Semaphore>,
    poll_interval: Duration,
}

impl<M, S, I, P> Consumer<M, S, I, P>
where
    M: MessageSource,
    S: SecretsClient,
    I: ImageAssembler,
    P: EventPublisher,
{
    pub fn new(
        source: M,
        orchestrator: Orchestrator<S, I, P>,
        max_concurrent: usize,
        poll_interval: Duration,
    ) -> Self {
        Self {
            source,
            orchestrator,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            poll_interval,
        }
    }

    /// Consume until `shutdown` fires, then wait for handlers still running.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut tasks = JoinSet::new();
        info!(
            max_concurrent = self.permits.available_permits(),
            poll_ms = self.poll_interval.as_millis() as u64,
            "consumer started"
        );

        loop {
            while let Some(result) = tasks.try_join_next() {
                reap(result);
            }

            let permit = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                permit = Arc::clone(&self.permits).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            match self.source.fetch().await {
                Ok(Some(delivery)) => {
                    tasks.spawn(handle(
                        self.orchestrator.clone(),
                        self.source.clone(),
                        delivery,
                        permit,
                    ));
                }
                Ok(None) => {
                    drop(permit);
                    if self.idle(&shutdown).await {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "fetching from command queue failed");
                    drop(permit);
                    if self.idle(&shutdown).await {
                        break;
                    }
                }
            }
        }

        info!(in_flight = tasks.len(), "consumer stopping, waiting for running builds");
        while let Some(result) = tasks.join_next().await {
            reap(result);
        }
        info!("consumer stopped");
    }

    /// Sleep one poll interval. Returns true if shutdown fired meanwhile.
    async fn idle(&self, shutdown: &CancellationToken) -> bool {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => true,
            _ = tokio::time::sleep(self.poll_interval) => false,
        }
    }
}

async fn handle<M, S, I, P>(
    orchestrator: Orchestrator<S, I, P>,
    source: M,
    delivery: Delivery,
    _permit: OwnedSemaphorePermit,
) where
    M: MessageSource,
    S: SecretsClient,
    I: ImageAssembler,
    P: EventPublisher,
{
    if delivery.redelivered {
        info!(tag = delivery.tag.tag, "handling redelivered message");
    }
    let response = orchestrator.handle_message(&delivery.payload).await;
    debug!(
        kind = %response.kind,
        redelivered = delivery.redelivered,
        "message handled"
    );
    if let Err(e) = source.ack(&delivery).await {
        warn!(error = %e, "acknowledging message failed");
    }
}

fn reap(result: Result<(), tokio::task::JoinError>) {
    if let Err(e) = result {
        error!(error = %e, "message handler task failed");
    }
}

#[cfg(test)]
#[path = "consumer_tests.rs"]
mod tests;
