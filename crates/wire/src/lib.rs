// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message schema for the train builder bus protocol.
//!
//! Wire format: one JSON object per bus message, `{type, data, metadata}`.
//! Inbound bodies go through [`parse_message`], which never panics and maps
//! every failure onto [`MessageError`]. Outgoing messages reuse the same
//! [`Envelope`] shape, except the router notice.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod envelope;
mod outgoing;
mod request;

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

pub use envelope::{
    parse_message, parse_value, BuildCommand, CommandKind, Envelope, Inbound, MessageError,
};
pub use outgoing::{RouterNotice, RouterNoticeData, BUILD_MESSAGE_KEY, MALFORMED_JSON, TRAIN_BUILT};
pub use request::{BuildRequest, UserId};
