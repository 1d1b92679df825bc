// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tb_adapters::{ImageError, SecretsError};
use thiserror::Error;

use crate::integrity::IntegrityError;

/// Why a START did not produce a routed train image
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("integrity check failed: {0}")]
    Integrity(#[from] IntegrityError),
    #[error("secret store: {0}")]
    Secrets(#[from] SecretsError),
    #[error("image: {0}")]
    Image(#[from] ImageError),
    #[error("invalid master image: {0:?}")]
    InvalidMasterImage(String),
}
