// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tb-engine: Train build orchestration
//!
//! The [`Orchestrator`] turns inbound bus messages into status responses,
//! running the verify, build, push and route pipeline for START commands.

mod error;
pub mod image_spec;
mod in_flight;
pub mod integrity;
mod orchestrator;

pub use error::BuildError;
pub use in_flight::{InFlight, InFlightGuard};
pub use integrity::{IntegrityError, ServiceKey};
pub use orchestrator::{Orchestrator, OrchestratorConfig, OrchestratorDeps, LOG_SUMMARY_LINES};
