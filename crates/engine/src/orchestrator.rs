// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message handling: dispatch by command and the START build pipeline.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tb_adapters::{
    EventPublisher, ImageAssembler, ImageBuild, SecretsClient, SecretsError, UserKeys,
};
use tb_core::{BuildStatus, RecordStatus, RouteInfo, TrainId};
use tb_storage::StatusStore;
use tb_wire::{
    parse_message, BuildCommand, BuildRequest, Envelope, Inbound, MessageError, RouterNotice,
};

use crate::image_spec::{base_image, image_labels, image_tag};
use crate::in_flight::InFlight;
use crate::integrity::{verify_train_signature, IntegrityError, ServiceKey};
use crate::BuildError;

/// Build log lines included in a success message.
pub const LOG_SUMMARY_LINES: usize = 10;

/// Collaborators the orchestrator drives
pub struct OrchestratorDeps<S, I, P> {
    pub secrets: S,
    pub images: I,
    pub publisher: P,
    pub store: Arc<dyn StatusStore>,
}

/// Deployment-specific settings.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Registry host, without scheme, e.g. `harbor.example.org`
    pub registry: String,
    /// Externally reachable API base URL, baked into image labels
    pub api_url: String,
    pub ui_routing_key: String,
    pub router_routing_key: String,
    /// When set, every inbound START must carry a valid service signature
    pub service_key: Option<ServiceKey>,
}

impl OrchestratorConfig {
    pub fn new(registry: impl Into<String>, api_url: impl Into<String>) -> Self {
        Self {
            registry: registry.into(),
            api_url: api_url.into(),
            ui_routing_key: "ui.tb.event".to_string(),
            router_routing_key: "tr".to_string(),
            service_key: None,
        }
    }
}

/// What a successful pipeline produced
#[derive(Debug)]
struct Built {
    tag: String,
    message: String,
}

/// Handles build commands. Clones share collaborators and in-flight state.
pub struct Orchestrator<S, I, P> {
    inner: Arc<Inner<S, I, P>>,
}

impl<S, I, P> Clone for Orchestrator<S, I, P> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

struct Inner<S, I, P> {
    deps: OrchestratorDeps<S, I, P>,
    config: OrchestratorConfig,
    in_flight: InFlight,
}

impl<S, I, P> Orchestrator<S, I, P>
where
    S: SecretsClient,
    I: ImageAssembler,
    P: EventPublisher,
{
    pub fn new(deps: OrchestratorDeps<S, I, P>, config: OrchestratorConfig) -> Self {
        Self { inner: Arc::new(Inner { deps, config, in_flight: InFlight::new() }) }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.inner.in_flight
    }

    /// Handle one raw bus message.
    ///
    /// Publishes exactly one response to the UI audience and returns it. A
    /// START that passes the integrity check additionally publishes STARTED
    /// before the response, and a successful build notifies the router.
    pub async fn handle_message(&self, body: &[u8]) -> Envelope {
        let response = match parse_message(body) {
            Ok(inbound) => self.dispatch(inbound).await,
            Err(e) => rejection(e),
        };
        self.publish(&self.inner.config.ui_routing_key, &response.to_value()).await;
        response
    }

    async fn dispatch(&self, inbound: Inbound) -> Envelope {
        let Inbound { envelope, command } = inbound;
        tracing::info!(kind = %command.kind(), train_id = %command.train_id(), "command received");
        match command {
            BuildCommand::Start(request) => self.start(envelope, *request).await,
            BuildCommand::Stop { train_id } => self.stop(&train_id),
            BuildCommand::Status { train_id } => self.status(&train_id),
        }
    }

    async fn start(&self, envelope: Envelope, request: BuildRequest) -> Envelope {
        let train_id = request.train_id.clone();
        let Some(_guard) = self.inner.in_flight.try_claim(&train_id) else {
            tracing::warn!(train_id = %train_id, "build already in progress, rejecting START");
            return envelope.completion(
                BuildStatus::Failed,
                format!("Build for train {} is already in progress", train_id),
            );
        };

        let start = Instant::now();
        let keys = match self.check_integrity(&envelope, &request).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!(train_id = %train_id, error = %e, "integrity check failed");
                return self.finish(envelope, &train_id, Err(e.into()));
            }
        };

        self.store().set(&train_id, RecordStatus::Started, None);
        let started = Envelope::status(BuildStatus::Started, &train_id);
        self.publish(&self.inner.config.ui_routing_key, &started.to_value()).await;

        let result = self.build(&request, keys.he_key).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(built) => {
                tracing::info!(train_id = %train_id, tag = %built.tag, elapsed_ms, "train built");
                let notice = RouterNotice::train_built(&train_id);
                self.publish(&self.inner.config.router_routing_key, &notice.to_value()).await;
            }
            Err(e) => tracing::error!(train_id = %train_id, error = %e, elapsed_ms, "build failed"),
        }
        self.finish(envelope, &train_id, result)
    }

    /// Verify the envelope and the train signature. Returns the owner's keys.
    async fn check_integrity(
        &self,
        envelope: &Envelope,
        request: &BuildRequest,
    ) -> Result<UserKeys, IntegrityError> {
        if let Some(service_key) = &self.inner.config.service_key {
            service_key.verify_envelope(envelope)?;
        }
        let user_id = request.user_id.as_ref().ok_or(IntegrityError::MissingUser)?.to_string();
        let keys = match self.inner.deps.secrets.user_keys(&user_id).await {
            Ok(keys) => keys,
            Err(SecretsError::NotFound(_)) => return Err(IntegrityError::UnknownUser(user_id)),
            Err(e) => return Err(IntegrityError::KeyLookup(e)),
        };
        verify_train_signature(&keys.public_key, &request.hash, &request.hash_signed)?;
        Ok(keys)
    }

    /// Assemble, push and route the train image.
    async fn build(
        &self,
        request: &BuildRequest,
        stored_he_key: Option<String>,
    ) -> Result<Built, BuildError> {
        let config = &self.inner.config;
        let deps = &self.inner.deps;

        let credential = deps.secrets.service_credential().await?;
        tracing::debug!(
            train_id = %request.train_id,
            identity = %credential.identity,
            "service credential ready"
        );
        let he_key = request.user_he_key.clone().or(stored_he_key);

        let recipe = deps.images.render_recipe(
            &base_image(&config.registry, &request.master_image),
            &request.entrypoint_executable,
            request.entrypoint_args.as_deref(),
            &request.entrypoint_path,
        );
        let tag = image_tag(&config.registry, request)?;
        let build = ImageBuild {
            recipe,
            tag: tag.clone(),
            labels: image_labels(request, he_key.as_deref(), &config.api_url),
        };

        let mut log = deps.images.build(&build).await?;
        log.extend(deps.images.push(&tag).await?);

        let route = RouteInfo::single_pass(&request.train_id, &request.stations);
        deps.secrets.store_route(&request.train_id, &route).await?;

        let message = format!("Train image pushed to {}\n{}", tag, log.summary(LOG_SUMMARY_LINES));
        Ok(Built { tag, message })
    }

    /// Record the terminal status and shape the completion response.
    fn finish(
        &self,
        envelope: Envelope,
        train_id: &TrainId,
        result: Result<Built, BuildError>,
    ) -> Envelope {
        let (status, message) = match result {
            Ok(built) => (RecordStatus::Finished, built.message),
            Err(e) => (RecordStatus::Failed, e.to_string()),
        };
        self.store().set(train_id, status, Some(message.clone()));
        envelope.completion(status.into(), message)
    }

    fn stop(&self, train_id: &TrainId) -> Envelope {
        if self.inner.in_flight.contains(train_id) {
            tracing::info!(train_id = %train_id, "stop requested while building; build continues");
        }
        self.store().set(train_id, RecordStatus::Stopped, None);
        Envelope::status(BuildStatus::Stopped, train_id)
    }

    fn status(&self, train_id: &TrainId) -> Envelope {
        match self.store().get(train_id) {
            Some(record) => Envelope::status(record.build_status(), train_id)
                .with_build_message(record.message.as_deref()),
            None => Envelope::status(BuildStatus::NotFound, train_id),
        }
    }

    fn store(&self) -> &dyn StatusStore {
        self.inner.deps.store.as_ref()
    }

    async fn publish(&self, routing_key: &str, payload: &Value) {
        if let Err(e) = self.inner.deps.publisher.publish(routing_key, payload).await {
            tracing::warn!(routing_key, error = %e, "failed to publish message");
        }
    }
}

/// FAILED response for a message that never became a command.
fn rejection(error: MessageError) -> Envelope {
    match error {
        MessageError::InvalidJson(detail) => {
            tracing::warn!(error = %detail, "received malformed JSON");
            Envelope::malformed_json()
        }
        MessageError::Malformed(detail) => {
            tracing::warn!(error = %detail, "received malformed message");
            Envelope::failure_notice(None, format!("Malformed message: {}", detail))
        }
        MessageError::UnrecognizedCommand { kind, envelope } => {
            tracing::warn!(%kind, "received unrecognized action type");
            (*envelope).completion(BuildStatus::Failed, format!("Unrecognized action type: {}", kind))
        }
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
