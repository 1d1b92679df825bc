// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Behavioral specs for the train builder.
//!
//! Each scenario drives the orchestrator through raw bus messages with fake
//! collaborators and checks what the outside world observes: published
//! events, the status store, and calls into the secret store and image engine.

#![allow(clippy::panic, clippy::unwrap_used, clippy::expect_used)]

#[path = "specs/prelude.rs"]
mod prelude;

#[path = "specs/build.rs"]
mod build;
#[path = "specs/commands.rs"]
mod commands;
#[path = "specs/credentials.rs"]
mod credentials;
