// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Train builder daemon library
//!
//! Wiring for the `tbd` binary: environment configuration, logging setup and
//! the command queue consumer.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod consumer;
pub mod env;
pub mod logging;

pub use consumer::Consumer;
pub use env::{Config, ConfigError};
