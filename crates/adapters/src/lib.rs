// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the train builder's external collaborators: the secret
//! store, the container build engine and the message bus.

pub mod bus;
pub mod http;
pub mod image;
pub mod secrets;
pub mod subprocess;

pub use bus::{
    AmqpSource, BusEndpoint, BusError, Delivery, DeliveryTag, EventPublisher, HttpBus,
    MessageSource, PublishError,
};
pub use image::{render_recipe, BuildLog, DockerAssembler, ImageAssembler, ImageBuild, ImageError};
pub use secrets::{
    CredentialCache, SecretsClient, SecretsError, ServiceCredential, UserKeys, VaultPaths,
    VaultSecrets, REFRESH_SKEW,
};

#[cfg(any(test, feature = "test-support"))]
pub use bus::{FakePublisher, FakeSource, PublishedMessage};
#[cfg(any(test, feature = "test-support"))]
pub use image::{BuildGate, FakeImageAssembler};
#[cfg(any(test, feature = "test-support"))]
pub use secrets::FakeSecrets;
